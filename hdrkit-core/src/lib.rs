//! hdrkit Core Library
//!
//! This crate provides the error handling and shared types used by the
//! hdrkit header codecs.

pub mod code;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use code::{Code, Symbol};
pub use error::{Error, Result};
pub use types::*;
