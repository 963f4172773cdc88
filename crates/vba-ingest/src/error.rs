//! Error types for source discovery.

use std::path::PathBuf;

use thiserror::Error;
use vba_project::ValidationError;

/// Errors raised while turning source files into a project.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    // === Input location ===
    /// Source directory or manifest does not exist.
    #[error("source not found: {path}")]
    NotFound { path: PathBuf },

    /// Source path exists but is not a directory.
    #[error("source path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Nothing to build from.
    #[error(
        "no VBA source files found in {path}; expected Modules/, ClassModules/, Objects/ or Forms/"
    )]
    NoInput { path: PathBuf },

    // === File system ===
    /// Failed to list a directory.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read a source file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Content ===
    /// Source bytes are neither UTF-8 nor valid in the project codepage.
    #[error("{path} is not valid UTF-8 or codepage {codepage} text")]
    Undecodable { path: PathBuf, codepage: u16 },

    /// Manifest is not valid JSON of the expected shape.
    #[error("invalid manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// File name cannot become a module (bad identifier, duplicate name).
    #[error("cannot add {path}: {source}")]
    InvalidModule {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },

    /// Project settings rejected (e.g. a project name that is not an identifier).
    #[error("invalid project settings: {0}")]
    Project(#[from] ValidationError),
}

impl DiscoveryError {
    pub(crate) fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid_module(path: impl Into<PathBuf>, source: ValidationError) -> Self {
        Self::InvalidModule {
            path: path.into(),
            source,
        }
    }
}

/// Result type for discovery operations.
pub type Result<T> = std::result::Result<T, DiscoveryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DiscoveryError::NotFound {
            path: PathBuf::from("missing"),
        };
        assert_eq!(format!("{err}"), "source not found: missing");

        let err = DiscoveryError::invalid_module(
            "Modules/1st.bas",
            ValidationError::invalid_identifier("1st"),
        );
        assert!(format!("{err}").contains("'1st' is not a valid VBA identifier"));
    }
}
