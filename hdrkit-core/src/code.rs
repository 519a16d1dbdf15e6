//! Lookup-table codes
//!
//! Several header fields carry a small integer that names a member of a
//! fixed table (pflog actions, reasons, directions). Decoding maps the
//! integer through the table; codes the table does not know are kept as
//! [`Code::Unknown`] so the original value survives a round-trip.

use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// A member of a fixed code table.
///
/// Implementations must be exact inverses: `from_code(s.code()) == Some(s)`
/// and `from_name(s.name()) == Some(s)` for every symbol `s`.
pub trait Symbol: Copy + Eq + fmt::Debug + 'static {
    /// Table name used in error messages
    const TABLE: &'static str;

    /// Every symbol in code order
    const ALL: &'static [Self];

    /// Wire code for this symbol
    fn code(self) -> u8;

    /// Canonical name for this symbol
    fn name(self) -> &'static str;

    /// Forward lookup
    fn from_code(code: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.code() == code)
    }

    /// Lookup by canonical name
    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.name() == name)
    }
}

/// A decoded table code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Code<T> {
    /// Code present in the table
    Known(T),
    /// Code absent from the table, kept verbatim
    Unknown(u8),
}

impl<T: Symbol> Code<T> {
    /// Translate a raw wire code
    pub fn from_code(code: u8) -> Self {
        match T::from_code(code) {
            Some(symbol) => Code::Known(symbol),
            None => Code::Unknown(code),
        }
    }

    /// Reverse lookup for encoding.
    ///
    /// Fails when an `Unknown` value holds a code the table defines: such a
    /// value never comes out of decode, and accepting it would give one
    /// code two representations.
    pub fn to_code(self) -> Result<u8> {
        match self {
            Code::Known(symbol) => Ok(symbol.code()),
            Code::Unknown(code) => match T::from_code(code) {
                Some(symbol) => Err(Error::encoding(
                    T::TABLE,
                    format!("code {} must be written as '{}'", code, symbol.name()),
                )),
                None => Ok(code),
            },
        }
    }

    /// The symbol, if the code was known
    pub fn known(self) -> Option<T> {
        match self {
            Code::Known(symbol) => Some(symbol),
            Code::Unknown(_) => None,
        }
    }

    /// Whether the code was found in the table
    pub fn is_known(&self) -> bool {
        matches!(self, Code::Known(_))
    }
}

impl<T> From<T> for Code<T> {
    fn from(symbol: T) -> Self {
        Code::Known(symbol)
    }
}

impl<T: Symbol> Default for Code<T> {
    /// The value a zero byte decodes to
    fn default() -> Self {
        Code::from_code(0)
    }
}

impl<T: Symbol> fmt::Display for Code<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Code::Known(symbol) => f.write_str(symbol.name()),
            Code::Unknown(code) => write!(f, "unknown({})", code),
        }
    }
}

impl<T: Symbol> FromStr for Code<T> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        T::from_name(s)
            .map(Code::Known)
            .ok_or_else(|| Error::unknown_symbol(T::TABLE, s))
    }
}
