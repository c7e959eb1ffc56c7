use abtest::{
    cli::{Cli, OutputFormat},
    config::AnalysisConfig,
    pipeline,
};
use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    // File settings first, then command-line overrides
    let base = match &args.config {
        Some(path) => AnalysisConfig::from_toml(path)?,
        None => AnalysisConfig::default(),
    };
    let config = args.apply_overrides(base);
    tracing::debug!("Effective configuration: {:?}", config);

    let report = pipeline::run(&config, !args.no_chart)?;

    match args.format {
        OutputFormat::Text => print!("{}", report.to_text()),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }

    Ok(())
}
