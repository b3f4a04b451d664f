//! Error types for reading, writing and reshaping .bvh data.

use thiserror::Error;

/// Result type for bvh operations.
pub type BvhResult<T> = Result<T, BvhError>;

/// Errors that can occur while handling a .bvh document.
#[derive(Debug, Error)]
pub enum BvhError {
    /// Input ended before the `MOTION` marker was found.
    #[error("not a valid bvh document: no MOTION section found")]
    NotBvh,

    /// A line of the document could not be understood.
    #[error("line {line}: {message}")]
    Format {
        /// 1-based line number of the offending line.
        line: usize,
        /// What was wrong with it.
        message: String,
    },

    /// Channel mode string is not one of `POSITION`, `ROTATION` or `ALL`.
    #[error("unsupported channel mode {0:?} (available modes are \"POSITION\", \"ROTATION\" or \"ALL\")")]
    UnsupportedMode(String),

    /// Position and rotation matrices do not have the same number of frames.
    #[error("position and rotation must have the same number of frames (got {position} and {rotation})")]
    SizeMismatch {
        /// Rows in the position matrix.
        position: usize,
        /// Rows in the rotation matrix.
        rotation: usize,
    },

    /// Column layout does not fit the per-joint block convention.
    #[error("invalid column count: {message}")]
    ColumnCount {
        /// Description of the mismatch.
        message: String,
    },

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialized output was not valid UTF-8.
    #[error("string conversion error: {0}")]
    FromUtf8(#[from] std::string::FromUtf8Error),

    /// A line pattern failed to compile.
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl BvhError {
    /// Create a `Format` error for the given line.
    #[must_use]
    pub fn format(line: usize, message: impl Into<String>) -> Self {
        Self::Format {
            line,
            message: message.into(),
        }
    }

    /// Create a `ColumnCount` error with the given message.
    #[must_use]
    pub fn column_count(message: impl Into<String>) -> Self {
        Self::ColumnCount {
            message: message.into(),
        }
    }
}
