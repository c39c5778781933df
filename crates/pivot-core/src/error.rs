use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the pivot table generator.
#[derive(Error, Debug)]
pub enum PivotError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file could not be created or written.
    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV text could not be decoded or encoded.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A profile document could not be parsed or serialised.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the pivot crates.
pub type Result<T> = std::result::Result<T, PivotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = PivotError::FileRead {
            path: PathBuf::from("/some/input.csv"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/some/input.csv"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_file_write() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err = PivotError::FileWrite {
            path: PathBuf::from("/out/pivot.csv"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Failed to write file /out/pivot.csv"));
        assert!(msg.contains("read-only"));
    }

    #[test]
    fn test_error_display_config() {
        let err = PivotError::Config("row dimension is required".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: row dimension is required"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: PivotError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let err: PivotError = json_err.into();
        assert!(err.to_string().contains("Failed to parse JSON"));
    }
}
