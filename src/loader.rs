//! Experiment data loading
//!
//! Reads the control and test sheets either from a workbook (xlsx, xls, ods
//! via calamine) or from a directory holding one `<sheet name>.csv` per
//! sheet, then merges them into a single labelled [`Dataset`].

use crate::config::AnalysisConfig;
use crate::dataset::{Dataset, Group, Metric, Observation};
use calamine::{open_workbook_auto, Data, Reader, Sheets};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while reading experiment data
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Input not found: {0}")]
    InputNotFound(PathBuf),

    #[error("Failed to open workbook {path}: {source}")]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("Failed to read CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Sheet '{sheet}' not found (available: {available})")]
    SheetNotFound { sheet: String, available: String },

    #[error("Sheet '{0}' is empty")]
    EmptySheet(String),

    #[error("Sheet '{sheet}' has no '{column}' column")]
    MissingColumn { sheet: String, column: String },

    #[error("Sheet '{sheet}', row {row}: '{column}' is not numeric ({value:?})")]
    NonNumeric {
        sheet: String,
        row: usize,
        column: String,
        value: String,
    },
}

/// Result type for loading operations
pub type Result<T> = std::result::Result<T, LoadError>;

/// A single cell, independent of the source format
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    fn from_text(field: &str) -> Self {
        let field = field.trim();
        if field.is_empty() {
            Cell::Empty
        } else if let Ok(value) = field.parse::<f64>() {
            Cell::Number(value)
        } else {
            Cell::Text(field.to_string())
        }
    }

    fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::String(s) => Cell::from_text(s),
            other => Cell::Text(other.to_string()),
        }
    }
}

/// Raw tabular content of one sheet: a header row plus data rows
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    /// Convert rows to observations, locating the metric columns by header
    ///
    /// Headers match case-insensitively after trimming; extra columns are
    /// ignored. Fully blank rows are skipped.
    pub fn to_observations(&self, group: Group) -> Result<Vec<Observation>> {
        let mut columns = [0usize; 4];
        for (slot, metric) in columns.iter_mut().zip(Metric::ALL) {
            *slot = self
                .headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(metric.column_name()))
                .ok_or_else(|| LoadError::MissingColumn {
                    sheet: self.name.clone(),
                    column: metric.column_name().to_string(),
                })?;
        }

        let mut observations = Vec::with_capacity(self.rows.len());
        for (index, row) in self.rows.iter().enumerate() {
            if row.iter().all(Cell::is_empty) {
                continue;
            }

            let mut values = [None; 4];
            for ((value, &column), metric) in values.iter_mut().zip(&columns).zip(Metric::ALL) {
                *value = match row.get(column).unwrap_or(&Cell::Empty) {
                    Cell::Empty => None,
                    Cell::Number(n) => Some(*n),
                    Cell::Text(text) => {
                        return Err(LoadError::NonNumeric {
                            sheet: self.name.clone(),
                            // 1-based, counting the header row
                            row: index + 2,
                            column: metric.column_name().to_string(),
                            value: text.clone(),
                        })
                    }
                };
            }

            let [impression, click, purchase, earning] = values;
            observations.push(Observation {
                impression,
                click,
                purchase,
                earning,
                group,
            });
        }

        Ok(observations)
    }
}

/// Anything that can hand out sheets by name
pub trait SheetSource {
    fn sheet(&mut self, name: &str) -> Result<Sheet>;
}

/// Spreadsheet file (xlsx, xlsm, xlsb, xls, ods)
pub struct Workbook {
    path: PathBuf,
    sheets: Sheets<BufReader<File>>,
}

impl Workbook {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let sheets = open_workbook_auto(&path).map_err(|source| LoadError::Workbook {
            path: path.clone(),
            source,
        })?;
        Ok(Self { path, sheets })
    }
}

impl SheetSource for Workbook {
    fn sheet(&mut self, name: &str) -> Result<Sheet> {
        let names = self.sheets.sheet_names();
        if !names.iter().any(|n| n == name) {
            return Err(LoadError::SheetNotFound {
                sheet: name.to_string(),
                available: names.join(", "),
            });
        }

        let range = self
            .sheets
            .worksheet_range(name)
            .map_err(|source| LoadError::Workbook {
                path: self.path.clone(),
                source,
            })?;

        let mut rows = range.rows();
        let headers: Vec<String> = rows
            .next()
            .ok_or_else(|| LoadError::EmptySheet(name.to_string()))?
            .iter()
            .map(ToString::to_string)
            .collect();
        let rows = rows
            .map(|row| row.iter().map(Cell::from).collect())
            .collect();

        Ok(Sheet {
            name: name.to_string(),
            headers,
            rows,
        })
    }
}

/// Directory with one `<sheet name>.csv` file per sheet
pub struct CsvDirectory {
    root: PathBuf,
}

impl CsvDirectory {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn sheet_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.csv", name))
    }

    fn available(&self) -> String {
        let mut names: Vec<String> = std::fs::read_dir(&self.root)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.path())
                    .filter(|p| p.extension().is_some_and(|ext| ext == "csv"))
                    .filter_map(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names.join(", ")
    }
}

impl SheetSource for CsvDirectory {
    fn sheet(&mut self, name: &str) -> Result<Sheet> {
        let path = self.sheet_path(name);
        if !path.is_file() {
            return Err(LoadError::SheetNotFound {
                sheet: name.to_string(),
                available: self.available(),
            });
        }

        let csv_err = |source| LoadError::Csv {
            path: path.clone(),
            source,
        };

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&path)
            .map_err(csv_err)?;

        let headers: Vec<String> = reader
            .headers()
            .map_err(csv_err)?
            .iter()
            .map(str::to_string)
            .collect();
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(LoadError::EmptySheet(name.to_string()));
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(csv_err)?;
            rows.push(record.iter().map(Cell::from_text).collect());
        }

        Ok(Sheet {
            name: name.to_string(),
            headers,
            rows,
        })
    }
}

/// Pick the reader for `path`: directories are CSV sheet sets, files are workbooks
pub fn open_source<P: AsRef<Path>>(path: P) -> Result<Box<dyn SheetSource>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(LoadError::InputNotFound(path.to_path_buf()));
    }

    if path.is_dir() {
        tracing::debug!("Reading CSV sheets from directory {}", path.display());
        Ok(Box::new(CsvDirectory::new(path)))
    } else {
        tracing::debug!("Reading workbook {}", path.display());
        Ok(Box::new(Workbook::open(path)?))
    }
}

/// Load both groups named in `config` and merge them
pub fn load_experiment(config: &AnalysisConfig) -> Result<Dataset> {
    let mut source = open_source(&config.input)?;
    load_from_source(source.as_mut(), &config.control_sheet, &config.test_sheet)
}

/// Load and merge the control and test sheets from an open source
pub fn load_from_source(
    source: &mut dyn SheetSource,
    control_sheet: &str,
    test_sheet: &str,
) -> Result<Dataset> {
    let control = source.sheet(control_sheet)?.to_observations(Group::Control)?;
    tracing::info!("Loaded {} rows from '{}'", control.len(), control_sheet);

    let test = source.sheet(test_sheet)?.to_observations(Group::Test)?;
    tracing::info!("Loaded {} rows from '{}'", test.len(), test_sheet);

    Ok(Dataset::merge(control, test))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const HEADER: &str = "Impression,Click,Purchase,Earning";

    fn write_sheet(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(format!("{}.csv", name)), body).unwrap();
    }

    #[test]
    fn test_csv_directory_loads_and_merges() {
        let dir = tempfile::tempdir().unwrap();
        write_sheet(
            dir.path(),
            "Control Group",
            &format!("{HEADER}\n100000.5,5000.1,550.2,2000.9\n90000,4000,480,1900\n"),
        );
        write_sheet(
            dir.path(),
            "Test Group",
            &format!("{HEADER}\n120000,3900,600.75,2500\n"),
        );

        let mut source = CsvDirectory::new(dir.path());
        let dataset = load_from_source(&mut source, "Control Group", "Test Group").unwrap();

        assert_eq!(dataset.len(), 3);
        assert_eq!(
            dataset.sample(Group::Control, Metric::Purchase).unwrap(),
            vec![550.2, 480.0]
        );
        assert_eq!(
            dataset.sample(Group::Test, Metric::Earning).unwrap(),
            vec![2500.0]
        );
    }

    #[test]
    fn test_columns_located_by_name() {
        let sheet = Sheet {
            name: "Control Group".to_string(),
            headers: vec![
                " purchase ".to_string(),
                "Extra".to_string(),
                "EARNING".to_string(),
                "Click".to_string(),
                "Impression".to_string(),
            ],
            rows: vec![vec![
                Cell::Number(7.0),
                Cell::Text("ignored".to_string()),
                Cell::Number(70.0),
                Cell::Number(3.0),
                Cell::Number(300.0),
            ]],
        };

        let rows = sheet.to_observations(Group::Control).unwrap();
        assert_eq!(
            rows,
            vec![Observation::new(Group::Control, 300.0, 3.0, 7.0, 70.0)]
        );
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let sheet = Sheet {
            name: "Test Group".to_string(),
            headers: vec!["Impression".into(), "Click".into(), "Earning".into()],
            rows: vec![],
        };
        match sheet.to_observations(Group::Test) {
            Err(LoadError::MissingColumn { column, .. }) => assert_eq!(column, "Purchase"),
            other => panic!("Expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_cells_become_none_and_blank_rows_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_sheet(
            dir.path(),
            "Control Group",
            &format!("{HEADER}\n1,2,,4\n,,,\n5,6,7,8\n"),
        );

        let sheet = CsvDirectory::new(dir.path()).sheet("Control Group").unwrap();
        let rows = sheet.to_observations(Group::Control).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].purchase, None);
        assert_eq!(rows[1].purchase, Some(7.0));
    }

    #[test]
    fn test_non_numeric_cell_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write_sheet(
            dir.path(),
            "Control Group",
            &format!("{HEADER}\n1,2,3,4\n1,2,many,4\n"),
        );

        let sheet = CsvDirectory::new(dir.path()).sheet("Control Group").unwrap();
        match sheet.to_observations(Group::Control) {
            Err(LoadError::NonNumeric {
                row, column, value, ..
            }) => {
                assert_eq!(row, 3);
                assert_eq!(column, "Purchase");
                assert_eq!(value, "many");
            }
            other => panic!("Expected NonNumeric, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_sheet_lists_available() {
        let dir = tempfile::tempdir().unwrap();
        write_sheet(dir.path(), "Control Group", &format!("{HEADER}\n1,2,3,4\n"));

        let err = CsvDirectory::new(dir.path())
            .sheet("Test Group")
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Test Group"));
        assert!(message.contains("Control Group"));
    }

    #[test]
    fn test_missing_input_is_fatal() {
        let config = AnalysisConfig {
            input: PathBuf::from("/nonexistent/ab_testing.xlsx"),
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            load_experiment(&config),
            Err(LoadError::InputNotFound(_))
        ));
    }

    #[test]
    fn test_corrupt_workbook_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ab_testing.xlsx");
        fs::write(&path, b"not a zip archive").unwrap();

        assert!(matches!(
            Workbook::open(&path),
            Err(LoadError::Workbook { .. })
        ));
    }

    #[test]
    fn test_cell_from_calamine_data() {
        assert_eq!(Cell::from(&Data::Int(3)), Cell::Number(3.0));
        assert_eq!(Cell::from(&Data::Float(2.5)), Cell::Number(2.5));
        assert_eq!(Cell::from(&Data::Empty), Cell::Empty);
        assert_eq!(Cell::from(&Data::String(" 4.5 ".into())), Cell::Number(4.5));
        assert_eq!(
            Cell::from(&Data::String("n/a".into())),
            Cell::Text("n/a".to_string())
        );
    }
}
