/*!
 * Panel file reader
 *
 * Reads the doctor panel from a CSV file or, with the `xlsx` feature, from
 * the first worksheet of an Excel/ODS workbook. Both paths turn rows into
 * text cells and share one row parser.
 */

use std::fs::File;
use std::path::Path;
use std::time::Instant;
use csv::ReaderBuilder;
use log::{info, warn};

#[cfg(feature = "progress")]
use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    Result, FinderError, ErrorContext,
    data_types::*,
    schema::{ColumnMap, PanelSchema},
};

/// Number of skipped-row warnings logged before going quiet
const MAX_SKIP_WARNINGS: usize = 10;

/// Supported panel file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelFormat {
    Csv,
    Workbook,
}

impl PanelFormat {
    /// Pick the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" | "txt" => Ok(PanelFormat::Csv),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(PanelFormat::Workbook),
            _ => Err(FinderError::Custom {
                message: format!("Unsupported panel file '{}'", path.display()),
                suggestion: Some("Use a .xlsx, .xls, .ods or .csv file".to_string()),
            }),
        }
    }
}

/// Outcome of reading a panel file
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub records: Vec<DoctorRecord>,
    /// Rows dropped because they could not be parsed
    pub skipped_rows: usize,
}

/// Reader for doctor panel files
pub struct PanelReader {
    /// Whether to skip invalid rows (true) or fail on the first one (false)
    skip_invalid_records: bool,
    /// Whether to show a spinner while reading
    #[cfg(feature = "progress")]
    show_progress_bar: bool,
}

impl Default for PanelReader {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelReader {
    /// Create a new reader with default settings
    pub fn new() -> Self {
        Self {
            skip_invalid_records: false,
            #[cfg(feature = "progress")]
            show_progress_bar: true,
        }
    }

    /// Enable or disable skipping invalid rows
    pub fn with_skip_invalid_records(mut self, skip: bool) -> Self {
        self.skip_invalid_records = skip;
        self
    }

    #[cfg(feature = "progress")]
    /// Enable or disable the progress spinner
    pub fn with_progress_bar(mut self, show: bool) -> Self {
        self.show_progress_bar = show;
        self
    }

    /// Load every doctor record from a panel file
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<LoadReport> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(FinderError::file_not_found_with_suggestion(path.to_path_buf()));
        }

        let start_time = Instant::now();
        let report = match PanelFormat::from_path(path)? {
            PanelFormat::Csv => self.load_csv(path)?,
            PanelFormat::Workbook => self.load_workbook(path)?,
        };

        info!(
            "Loaded {} doctor records from {} in {:.2}s",
            report.records.len(),
            path.display(),
            start_time.elapsed().as_secs_f64()
        );
        if report.skipped_rows > 0 {
            warn!("Skipped {} invalid rows", report.skipped_rows);
        }

        Ok(report)
    }

    /// Load a CSV panel
    pub fn load_csv<P: AsRef<Path>>(&self, path: P) -> Result<LoadReport> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| FinderError::Io {
            message: format!("Cannot open {}: {}", path.display(), e),
            source: e,
            context: ErrorContext::for_file(path),
        })?;

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let headers: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();
        let columns = PanelSchema::resolve(&headers)?;

        let mut sink = RowSink::new(self, path, columns);
        for (index, result) in reader.records().enumerate() {
            let row_number = index + 1;
            match result {
                Ok(row) => {
                    let cells: Vec<&str> = row.iter().collect();
                    sink.push(&cells, row_number)?;
                }
                Err(e) => {
                    let error = FinderError::CsvParse {
                        message: format!("CSV error: {}", e),
                        line: e.position().map(|p| p.line() as usize),
                        context: ErrorContext::for_file(path).at_row(row_number),
                    };
                    sink.reject(error, row_number)?;
                }
            }
        }

        Ok(sink.finish())
    }

    /// Load the first worksheet of an Excel or ODS workbook
    #[cfg(feature = "xlsx")]
    pub fn load_workbook<P: AsRef<Path>>(&self, path: P) -> Result<LoadReport> {
        use calamine::{open_workbook_auto, Reader};

        let path = path.as_ref();
        let mut workbook = open_workbook_auto(path)?;
        let range = workbook.worksheet_range_at(0)
            .ok_or_else(|| FinderError::Spreadsheet {
                message: "Workbook contains no worksheets".to_string(),
                context: ErrorContext::for_file(path),
            })??;

        let mut rows = range.rows();
        let headers: Vec<String> = match rows.next() {
            Some(header_row) => header_row.iter().map(cell_text).collect(),
            None => Vec::new(),
        };
        let columns = PanelSchema::resolve(&headers)?;

        let mut sink = RowSink::new(self, path, columns);
        for (index, row) in rows.enumerate() {
            let cells: Vec<String> = row.iter().map(cell_text).collect();
            if cells.iter().all(|c| c.trim().is_empty()) {
                continue;
            }
            sink.push(&cells, index + 1)?;
        }

        Ok(sink.finish())
    }

    #[cfg(not(feature = "xlsx"))]
    pub fn load_workbook<P: AsRef<Path>>(&self, path: P) -> Result<LoadReport> {
        Err(FinderError::Custom {
            message: format!("Cannot read workbook '{}': the 'xlsx' feature is not enabled", path.as_ref().display()),
            suggestion: Some("Rebuild with `--features xlsx` or convert the panel to CSV".to_string()),
        })
    }
}

/// Text rendering of a workbook cell
#[cfg(feature = "xlsx")]
fn cell_text(cell: &calamine::Data) -> String {
    use calamine::Data;

    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        other => other.to_string(),
    }
}

/// Parse one data row into a record
pub fn parse_row<S: AsRef<str>>(cells: &[S], columns: &ColumnMap, row_number: usize) -> Result<DoctorRecord> {
    let cell = |index: usize| cells.get(index).map(|c| c.as_ref().trim()).unwrap_or("");

    let npi_raw = cell(columns.npi);
    let npi = Npi::parse(npi_raw).ok_or_else(|| {
        FinderError::invalid_value(PanelSchema::NPI, npi_raw, row_number, "is not a whole number")
    })?;

    let usage_raw = cell(columns.usage_time);
    let usage_minutes = usage_raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| {
            FinderError::invalid_value(PanelSchema::USAGE_TIME, usage_raw, row_number, "is not a number")
        })?;

    Ok(DoctorRecord {
        npi,
        state: cell(columns.state).to_string(),
        usage_minutes,
        region: cell(columns.region).to_string(),
        specialty: cell(columns.speciality).to_string(),
    })
}

/// Collects parsed rows, applying the skip-invalid policy and progress display
struct RowSink<'r> {
    reader: &'r PanelReader,
    path: &'r Path,
    columns: ColumnMap,
    records: Vec<DoctorRecord>,
    skipped_rows: usize,
    #[cfg(feature = "progress")]
    progress_bar: Option<ProgressBar>,
}

impl<'r> RowSink<'r> {
    fn new(reader: &'r PanelReader, path: &'r Path, columns: ColumnMap) -> Self {
        #[cfg(feature = "progress")]
        let progress_bar = if reader.show_progress_bar {
            let pb = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg} [{elapsed}]") {
                pb.set_style(style);
            }
            pb.set_message(format!("Reading {}", path.display()));
            Some(pb)
        } else {
            None
        };

        Self {
            reader,
            path,
            columns,
            records: Vec::new(),
            skipped_rows: 0,
            #[cfg(feature = "progress")]
            progress_bar,
        }
    }

    fn push<S: AsRef<str>>(&mut self, cells: &[S], row_number: usize) -> Result<()> {
        #[cfg(feature = "progress")]
        if let Some(ref pb) = self.progress_bar {
            pb.inc(1);
        }

        match parse_row(cells, &self.columns, row_number) {
            Ok(record) => {
                self.records.push(record);
                Ok(())
            }
            Err(e) => self.reject(e, row_number),
        }
    }

    fn reject(&mut self, error: FinderError, row_number: usize) -> Result<()> {
        let error = error.with_file(self.path);
        if !self.reader.skip_invalid_records {
            return Err(error);
        }
        self.skipped_rows += 1;
        if self.skipped_rows <= MAX_SKIP_WARNINGS {
            warn!("Skipping invalid row {} in {}: {}", row_number, self.path.display(), error);
        }
        Ok(())
    }

    fn finish(self) -> LoadReport {
        #[cfg(feature = "progress")]
        if let Some(pb) = self.progress_bar {
            pb.finish_and_clear();
        }

        LoadReport {
            records: self.records,
            skipped_rows: self.skipped_rows,
        }
    }
}
