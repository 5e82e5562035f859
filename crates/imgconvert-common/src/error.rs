//! Error types shared by every imgconvert component.
//!
//! Configuration and path errors abort a whole operation before anything is
//! dispatched. Format and remote errors belong to a single job and are
//! reported alongside the outcomes of its siblings.

use std::fmt;
use std::path::{Path, PathBuf};

/// How a configuration field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorKind {
    /// The raw value could not be read as the field's type.
    WrongType,
    /// The value has the right type but lies outside the allowed range.
    OutOfRange,
    /// The value is unusable for another reason (empty credential, unknown field).
    Invalid,
}

impl fmt::Display for ConfigErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongType => write!(f, "wrong type"),
            Self::OutOfRange => write!(f, "out of range"),
            Self::Invalid => write!(f, "invalid value"),
        }
    }
}

/// A rejected settings field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {kind}: {message}")]
pub struct ConfigurationError {
    /// Name of the offending field.
    pub field: String,
    /// Category of the failure.
    pub kind: ConfigErrorKind,
    /// Human-readable description of the constraint.
    pub message: String,
}

impl ConfigurationError {
    pub fn wrong_type(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: ConfigErrorKind::WrongType,
            message: message.into(),
        }
    }

    pub fn out_of_range(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: ConfigErrorKind::OutOfRange,
            message: message.into(),
        }
    }

    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: ConfigErrorKind::Invalid,
            message: message.into(),
        }
    }
}

/// Unified error type covering all failure modes in imgconvert.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A settings field was rejected.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// The path is neither an existing file nor an existing directory.
    #[error("Path error [{}]: {message}", .path.display())]
    Path {
        /// The path that was resolved.
        path: PathBuf,
        /// Why it could not be used.
        message: String,
    },

    /// The source or target format is outside the supported sets.
    #[error("{}", describe_unsupported(.file, .source_format, .target_format))]
    UnsupportedFormat {
        /// File name of the rejected input, empty when only the requested
        /// target format was rejected.
        file: String,
        /// Extension of the input file.
        source_format: String,
        /// Requested destination format.
        target_format: String,
    },

    /// The remote conversion service failed. Code and message are passed
    /// through as reported.
    #[error("Remote conversion error{}: {message}", .code.map(|c| format!(" [{c}]")).unwrap_or_default())]
    RemoteConversion {
        /// Service error code, when the service returned one.
        code: Option<i64>,
        /// Service or transport error message.
        message: String,
    },

    /// A local filesystem operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Convenience constructor for [`Error::Path`].
    pub fn path(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Error::Path {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::UnsupportedFormat`].
    pub fn unsupported_format(
        file: impl Into<String>,
        source_format: impl Into<String>,
        target_format: impl Into<String>,
    ) -> Self {
        Error::UnsupportedFormat {
            file: file.into(),
            source_format: source_format.into(),
            target_format: target_format.into(),
        }
    }

    /// A requested target format that is not a destination format,
    /// rejected before any file is looked at.
    pub fn unsupported_target(target_format: impl Into<String>) -> Self {
        Error::UnsupportedFormat {
            file: String::new(),
            source_format: String::new(),
            target_format: target_format.into(),
        }
    }

    /// Convenience constructor for [`Error::RemoteConversion`].
    pub fn remote(code: Option<i64>, message: impl Into<String>) -> Self {
        Error::RemoteConversion {
            code,
            message: message.into(),
        }
    }

    /// Whether this error aborts a whole operation rather than a single job.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Configuration(_) | Error::Path { .. })
    }
}

fn describe_unsupported(file: &str, source_format: &str, target_format: &str) -> String {
    if file.is_empty() {
        format!("Unsupported target format {target_format:?}")
    } else {
        format!("Unsupported conversion format for {file}: {source_format} -> {target_format}")
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
