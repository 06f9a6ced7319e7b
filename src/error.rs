// ⚠️ Error taxonomy for the ingestion engine
// Format errors abort one source, configuration errors abort before any row,
// not-found is the recoverable lookup miss.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Malformed row, unexpected column or unparseable number
    #[error("{format} format error on or near line {line}: {message}")]
    Format {
        format: &'static str,
        line: usize,
        message: String,
    },

    /// Column mapping, language code or filter value is unusable
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Missing year, language, measure or area
    #[error("Not found: {0}")]
    NotFound(String),

    /// Stream could not be opened or read
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Structured output could not be serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failure while ingesting a specific file
    #[error("{}: {source}", path.display())]
    Source {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub fn format(format: &'static str, line: usize, message: impl Into<String>) -> Self {
        Self::Format {
            format,
            line,
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Attach the path of the file being ingested
    pub fn in_source(self, path: impl Into<PathBuf>) -> Self {
        Self::Source {
            path: path.into(),
            source: Box::new(self),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_message() {
        let err = Error::format("AuthorityByYearCSV", 4, "could not parse 'abc'");
        assert_eq!(
            err.to_string(),
            "AuthorityByYearCSV format error on or near line 4: could not parse 'abc'"
        );
    }

    #[test]
    fn test_source_error_wraps_path() {
        let err = Error::not_found("area W06000099").in_source("datasets/areas.csv");
        assert!(err.to_string().starts_with("datasets/areas.csv: Not found"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_io_error_keeps_message_and_source() {
        use std::error::Error as _;

        let err = Error::io(
            "Failed to open file areas.csv",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert_eq!(err.to_string(), "I/O error: Failed to open file areas.csv");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_is_not_found() {
        assert!(Error::not_found("year 1999").is_not_found());
        assert!(!Error::configuration("bad").is_not_found());
    }
}
