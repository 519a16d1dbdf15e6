//! Error types for hdrkit

use thiserror::Error;

/// Result type alias for hdrkit operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for hdrkit
///
/// Decoding never produces one of these; only encoding and symbol
/// parsing can fail.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Header field could not be serialized
    #[error("Encoding error in {field}: {reason}")]
    Encoding { field: &'static str, reason: String },

    /// Symbolic name not present in a lookup table
    #[error("Unknown {table} '{symbol}'")]
    UnknownSymbol { table: &'static str, symbol: String },

    /// Malformed caller input (hex strings, link types, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Not implemented
    #[error("Feature not implemented: {0}")]
    NotImplemented(String),
}

impl Error {
    /// Create an encoding error for the named field
    pub fn encoding<S: Into<String>>(field: &'static str, reason: S) -> Self {
        Error::Encoding {
            field,
            reason: reason.into(),
        }
    }

    /// Create an unknown symbol error for the given table
    pub fn unknown_symbol<S: Into<String>>(table: &'static str, symbol: S) -> Self {
        Error::UnknownSymbol {
            table,
            symbol: symbol.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create a not implemented error
    pub fn not_implemented<S: Into<String>>(what: S) -> Self {
        Error::NotImplemented(what.into())
    }
}
