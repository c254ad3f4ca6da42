//! Temp-resource options and top-level error types.

use std::path::PathBuf;

////////////////////////////////////////////////////////////////////////////////
// #region Options

/// Naming and placement of spooled temp resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecTempResourceOptions {
    /// Prefix for both the temp directory and the temp file.
    pub prefix: String,
    /// Suffix (usually an extension such as `.xlsx`) for the temp file.
    pub suffix: String,
    /// Parent directory; the system temp directory when `None`.
    pub dir_parent: Option<PathBuf>,
}

impl Default for SpecTempResourceOptions {
    fn default() -> Self {
        Self {
            prefix: "rowkit-".to_string(),
            suffix: String::new(),
            dir_parent: None,
        }
    }
}

impl SpecTempResourceOptions {
    /// Default options with a file suffix.
    pub fn with_suffix(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
            ..Self::default()
        }
    }

    /// Resolve the parent directory temp resources are created in.
    pub fn derive_dir_parent(&self) -> PathBuf {
        self.dir_parent
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Failure to acquire a temp resource.
#[derive(Debug, thiserror::Error)]
pub enum TempResourceError {
    /// Temp directory could not be created.
    #[error("failed to create temp directory under {path}: {source}")]
    CreateDir {
        /// Parent directory.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// Temp file could not be created inside the temp directory.
    #[error("failed to create temp file in {path}: {source}")]
    CreateFile {
        /// Temp directory.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// Copying the input stream into the temp file failed.
    #[error("failed to spool input into {path}: {source}")]
    Spool {
        /// Temp file.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
