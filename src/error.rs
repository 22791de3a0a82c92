//! Error types for decoding console records.
//!
//! Unknown status/type/level codes are never errors. Only malformed numeric
//! or timestamp input ends up here.

use thiserror::Error;

/// Placeholder rendered in a view field whose source value failed to decode.
pub const INVALID_PLACEHOLDER: &str = "invalid";

/// Failure to decode a single value from a console record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// A packed file mode was negative or wider than 32 bits
    #[error("file mode out of range: {0}")]
    InvalidMode(i64),

    /// A byte count or other size field was negative
    #[error("negative value for {field}: {value}")]
    NegativeValue { field: &'static str, value: i64 },

    /// A numeric field carried text that is not an integer
    #[error("non-numeric value for {field}: {value:?}")]
    NotNumeric { field: &'static str, value: String },

    /// A timestamp did not match "YYYY-MM-DD HH:MM:SS"
    #[error("invalid timestamp: {0:?}")]
    InvalidTimestamp(String),

    /// An epoch timestamp too far from now to measure an age against
    #[error("timestamp out of range: {0}")]
    TimestampOutOfRange(i64),

    /// A status/type/level field was not a single character
    #[error("invalid {field} code: {value:?}")]
    InvalidCode { field: &'static str, value: String },
}

/// Error reported by the backup console inside its response envelope,
/// or an envelope that could not be understood.
#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("console returned error {code}: {message}")]
    Remote { code: i64, message: String },

    #[error("response has no {0:?} member")]
    MissingMember(&'static str),

    #[error("failed to parse console response: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DecodeError>;
