use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading the record store or writing reports.
///
/// Aggregation itself never fails: empty subsets produce empty or
/// zero-filled tables instead of an error.
#[derive(Error, Debug)]
pub enum ReportError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV file has no header row.
    #[error("File {0} is empty")]
    EmptyFile(PathBuf),

    /// A required canonical field has no source column after mapping.
    #[error("Required field '{field}' not found (expected column '{column}')")]
    MissingField { field: &'static str, column: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_missing_field() {
        let err = ReportError::MissingField {
            field: "quantity",
            column: "Quantidade".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Required field 'quantity' not found (expected column 'Quantidade')"
        );
    }

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = ReportError::FileRead {
            path: PathBuf::from("/data/Material-CSVANUAL.csv"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("Material-CSVANUAL.csv"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_empty_file() {
        let err = ReportError::EmptyFile(PathBuf::from("empty.csv"));
        assert_eq!(err.to_string(), "File empty.csv is empty");
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let err: ReportError = json_err.into();
        assert!(err.to_string().contains("Failed to parse JSON"));
    }
}
