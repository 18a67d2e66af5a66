/*!
 * Error handling for doctor panel lookups
 *
 * Provides detailed error types with context, suggestions, and a severity
 * classification that tells the caller whether the session can continue.
 */

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use serde::{Serialize, Deserialize};

/// Doctor finder result type
pub type Result<T> = std::result::Result<T, FinderError>;

/// Error types with context and suggestions
#[derive(Error, Debug)]
pub enum FinderError {
    /// File I/O errors with context
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
        context: ErrorContext,
    },

    /// CSV parsing errors with location information
    #[error("CSV parsing error at line {line:?}: {message}")]
    CsvParse {
        message: String,
        line: Option<usize>,
        context: ErrorContext,
    },

    /// Workbook errors raised while reading a spreadsheet
    #[error("Spreadsheet error: {message}")]
    Spreadsheet {
        message: String,
        context: ErrorContext,
    },

    /// A row holds a value that cannot be interpreted
    #[error("Data validation error: {message}")]
    DataValidation {
        message: String,
        field: Option<String>,
        value: Option<String>,
        context: ErrorContext,
    },

    /// Dataset file not found with suggestions
    #[error("File not found: {path}")]
    FileNotFound {
        path: PathBuf,
        suggestion: String,
    },

    /// Required column missing from the header row
    #[error("Schema mismatch: {message}")]
    SchemaMismatch {
        message: String,
        missing_columns: Vec<String>,
        found_columns: Vec<String>,
    },

    /// The specialty was left blank
    #[error("Please select a specialty.")]
    MissingSpecialty,

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        suggestion: Option<String>,
    },

    /// Export errors
    #[error("Export error: {message}")]
    Export {
        message: String,
        format: OutputFormat,
        suggestion: Option<String>,
    },

    /// Generic errors with custom message
    #[error("{message}")]
    Custom {
        message: String,
        suggestion: Option<String>,
    },
}

/// Error context providing additional information
#[derive(Debug, Default, Clone)]
pub struct ErrorContext {
    pub file_path: Option<PathBuf>,
    pub row_number: Option<usize>,
    pub column_name: Option<String>,
}

impl ErrorContext {
    /// Context pointing at a file
    pub fn for_file(path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: Some(path.into()),
            ..Default::default()
        }
    }

    /// Attach a 1-based data row number
    pub fn at_row(mut self, row: usize) -> Self {
        self.row_number = Some(row);
        self
    }

    /// Attach the column the problem was found in
    pub fn in_column(mut self, column: &str) -> Self {
        self.column_name = Some(column.to_string());
        self
    }

    /// Human-readable location, `None` when nothing is known
    pub fn describe(&self) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(path) = &self.file_path {
            parts.push(path.display().to_string());
        }
        if let Some(row) = self.row_number {
            parts.push(format!("row {}", row));
        }
        if let Some(column) = &self.column_name {
            parts.push(format!("column '{}'", column));
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

/// Output format for results and exports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "JSON"),
            OutputFormat::Csv => write!(f, "CSV"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = FinderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "table" | "text" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(FinderError::Configuration {
                message: format!("Unknown output format '{}'", other),
                suggestion: Some("Use one of: table, json, csv".to_string()),
            }),
        }
    }
}

impl FinderError {
    /// Create a file not found error with helpful suggestion
    pub fn file_not_found_with_suggestion(path: PathBuf) -> Self {
        let suggestion = if path.extension().is_none() {
            format!(
                "'{}' has no extension. Point --data at the panel file itself, e.g. 'panel_data.xlsx' or 'panel_data.csv'.",
                path.display()
            )
        } else {
            format!(
                "Check if the file exists at '{}'. Make sure the path is correct and you have read permissions. \
                The path can also be set with DOCFINDER_DATA_PATH or 'data_path' in the config file.",
                path.display()
            )
        };

        Self::FileNotFound { path, suggestion }
    }

    /// Create a schema mismatch error listing the columns that could not be found
    pub fn missing_columns(missing: Vec<String>, found: Vec<String>) -> Self {
        Self::SchemaMismatch {
            message: format!("Missing required column(s): {}", missing.join(", ")),
            missing_columns: missing,
            found_columns: found,
        }
    }

    /// Create a validation error for a single cell
    pub fn invalid_value(column: &str, value: &str, row: usize, reason: &str) -> Self {
        Self::DataValidation {
            message: format!("Row {}: {} value '{}' {}", row, column, value, reason),
            field: Some(column.to_string()),
            value: Some(value.to_string()),
            context: ErrorContext::default().at_row(row).in_column(column),
        }
    }

    /// Whether the error ends the session
    ///
    /// Missing input and export failures let the user resubmit; anything that
    /// prevents the dataset from loading does not.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::MissingSpecialty | Self::Export { .. })
    }

    /// Process exit status: 1 for fatal errors, 2 when the user can resubmit
    pub fn exit_code(&self) -> i32 {
        if self.is_fatal() { 1 } else { 2 }
    }

    /// Record the file an error came from, keeping any location already set
    pub fn with_file(mut self, path: &Path) -> Self {
        if let Some(context) = self.context_mut() {
            if context.file_path.is_none() {
                context.file_path = Some(path.to_path_buf());
            }
        }
        self
    }

    /// Location details, for variants that carry them
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Self::Io { context, .. }
            | Self::CsvParse { context, .. }
            | Self::Spreadsheet { context, .. }
            | Self::DataValidation { context, .. } => Some(context),
            _ => None,
        }
    }

    fn context_mut(&mut self) -> Option<&mut ErrorContext> {
        match self {
            Self::Io { context, .. }
            | Self::CsvParse { context, .. }
            | Self::Spreadsheet { context, .. }
            | Self::DataValidation { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Get a user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        let mut message = match self {
            Self::FileNotFound { suggestion, .. } => {
                format!("{}\n\nSuggestion: {}", self, suggestion)
            }
            Self::SchemaMismatch { found_columns, .. } => {
                format!("{}\n\nColumns found: {}", self, found_columns.join(", "))
            }
            Self::Configuration { suggestion: Some(sug), .. }
            | Self::Export { suggestion: Some(sug), .. }
            | Self::Custom { suggestion: Some(sug), .. } => {
                format!("{}\n\nSuggestion: {}", self, sug)
            }
            _ => self.to_string(),
        };

        if let Some(location) = self.context().and_then(ErrorContext::describe) {
            message.push_str("\n\nLocation: ");
            message.push_str(&location);
        }
        message
    }
}

// Convenience conversions
impl From<std::io::Error> for FinderError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: err,
            context: ErrorContext::default(),
        }
    }
}

impl From<csv::Error> for FinderError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|pos| pos.line() as usize);

        Self::CsvParse {
            message: err.to_string(),
            line,
            context: ErrorContext::default(),
        }
    }
}

#[cfg(feature = "xlsx")]
impl From<calamine::Error> for FinderError {
    fn from(err: calamine::Error) -> Self {
        Self::Spreadsheet {
            message: err.to_string(),
            context: ErrorContext::default(),
        }
    }
}

impl From<serde_json::Error> for FinderError {
    fn from(err: serde_json::Error) -> Self {
        FinderError::Export {
            message: err.to_string(),
            format: OutputFormat::Json,
            suggestion: Some("Check if the data is serializable to JSON.".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity() {
        assert!(!FinderError::MissingSpecialty.is_fatal());
        assert!(FinderError::file_not_found_with_suggestion(PathBuf::from("panel_data.xlsx")).is_fatal());
        assert!(FinderError::missing_columns(vec!["Region".into()], vec![]).is_fatal());
    }

    #[test]
    fn test_user_message_includes_suggestion() {
        let err = FinderError::file_not_found_with_suggestion(PathBuf::from("panel_data.xlsx"));
        let msg = err.user_message();
        assert!(msg.starts_with("File not found: panel_data.xlsx"));
        assert!(msg.contains("Suggestion:"));
    }

    #[test]
    fn test_exit_codes_follow_severity() {
        assert_eq!(FinderError::MissingSpecialty.exit_code(), 2);
        let export = FinderError::Export {
            message: "disk full".to_string(),
            format: OutputFormat::Csv,
            suggestion: None,
        };
        assert_eq!(export.exit_code(), 2);
        assert_eq!(FinderError::file_not_found_with_suggestion(PathBuf::from("panel.csv")).exit_code(), 1);
    }

    #[test]
    fn test_user_message_shows_location() {
        let err = FinderError::invalid_value("NPI", "abc", 4, "is not a whole number")
            .with_file(Path::new("panel.csv"));
        let msg = err.user_message();
        assert!(msg.contains("Location: panel.csv, row 4, column 'NPI'"), "{}", msg);
    }

    #[test]
    fn test_with_file_keeps_existing_path() {
        let err = FinderError::Spreadsheet {
            message: "bad sheet".to_string(),
            context: ErrorContext::for_file("first.xlsx"),
        }
        .with_file(Path::new("second.xlsx"));
        assert_eq!(err.context().and_then(|c| c.file_path.clone()), Some(PathBuf::from("first.xlsx")));
        assert!(FinderError::MissingSpecialty.context().is_none());
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Table);
        assert!("parquet".parse::<OutputFormat>().is_err());
    }
}
