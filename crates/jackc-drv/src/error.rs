use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no .jack files found under {0}")]
    NoInputFiles(PathBuf),

    #[error("{path}: {source}")]
    Lex {
        path: PathBuf,
        #[source]
        source: jackc_lex::LexError,
    },

    #[error("{path}: {source}")]
    Compile {
        path: PathBuf,
        #[source]
        source: jackc_core::ParseError,
    },

    #[error("failed to initialize logging: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, DriverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_input_files_display() {
        let err = DriverError::NoInputFiles(PathBuf::from("/tmp/empty"));
        assert_eq!(err.to_string(), "no .jack files found under /tmp/empty");
    }

    #[test]
    fn read_error_display_includes_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = DriverError::Read {
            path: PathBuf::from("a.jack"),
            source: io_err,
        };
        assert!(err.to_string().starts_with("failed to read a.jack:"));
    }
}
