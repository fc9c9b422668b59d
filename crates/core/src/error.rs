//! Error types surfaced by the adapter
//!
//! All failures propagate synchronously to the caller; nothing is retried or
//! recovered internally.

use std::path::PathBuf;

use thiserror::Error;

/// Failure while reading or parsing a `RiverTools` RTI header file.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Header file could not be read
    #[error("failed to read header '{}': {source}", path.display())]
    Io {
        /// Path of the header file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
    /// A key-value line had a `:` delimiter but nothing in front of it
    #[error("header '{}' line {line}: malformed key-value pair", path.display())]
    MalformedLine {
        /// Path of the header file
        path: PathBuf,
        /// One-based line number
        line: usize,
    },
    /// A required header field was absent
    #[error("header '{}' is missing required field '{field}'", path.display())]
    MissingField {
        /// Path of the header file
        path: PathBuf,
        /// Name of the missing field
        field: &'static str,
    },
    /// A required header field did not parse as its expected type
    #[error("header '{}' field '{field}' has invalid value '{value}'", path.display())]
    InvalidField {
        /// Path of the header file
        path: PathBuf,
        /// Name of the offending field
        field: &'static str,
        /// Raw value as read from the file
        value: String,
    },
}

/// Unrecognized parameter representation tag.
///
/// Raised when a `*_ptype` value is none of `Scalar`, `Time_Series`, `Grid`,
/// or `Grid_Sequence`. Fatal during grid-sequence expansion, never a default.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized parameter type '{0}'")]
pub struct InvalidParameterTypeError(pub String);

/// Failure while resolving parameters or materializing grid files.
#[derive(Debug, Error)]
pub enum MaterializeError {
    /// RTI header failure
    #[error(transparent)]
    Header(#[from] ParseError),
    /// Unrecognized `*_ptype` tag
    #[error(transparent)]
    InvalidParameterType(#[from] InvalidParameterTypeError),
    /// A parameter required by the operation is absent from the environment
    #[error("parameter '{0}' is not set")]
    MissingParameter(String),
    /// A parameter expected to be numeric was not
    #[error("parameter '{key}' value '{value}' is not numeric")]
    NotANumber {
        /// Environment key
        key: String,
        /// Value as found in the environment
        value: String,
    },
    /// A parameter expected to hold text (a file name or tag) did not
    #[error("parameter '{key}' value '{value}' is not a string")]
    NotText {
        /// Environment key
        key: String,
        /// Value as found in the environment
        value: String,
    },
    /// A time-series file held fewer values than the requested step count
    #[error("time series '{}' holds {found} values but {needed} steps are required", path.display())]
    SeriesTooShort {
        /// Path of the series file
        path: PathBuf,
        /// Steps requested via `n_steps`
        needed: usize,
        /// Values actually present
        found: usize,
    },
    /// A time-series file contained a token that is not a number
    #[error("time series '{}' contains non-numeric entry '{token}'", path.display())]
    BadSeriesValue {
        /// Path of the series file
        path: PathBuf,
        /// Offending token
        token: String,
    },
    /// An RTG file's byte count disagreed with the header dimensions
    #[error("grid file '{}' holds {found} bytes, expected {expected} for a {rows}x{columns} grid", path.display())]
    GridSizeMismatch {
        /// Path of the grid file
        path: PathBuf,
        /// Declared row count
        rows: usize,
        /// Declared column count
        columns: usize,
        /// Expected byte count (rows x columns x 4)
        expected: usize,
        /// Byte count actually found
        found: usize,
    },
    /// File I/O failure while reading or writing grid data
    #[error("failed to {action} '{}': {source}", path.display())]
    Io {
        /// What was being attempted (`create`, `read`, `write`)
        action: &'static str,
        /// Path involved
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}
