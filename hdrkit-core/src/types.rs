//! Common types used throughout hdrkit

use std::fmt;
use std::str::FromStr;

/// MAC Address (6 bytes)
///
/// Renders as 12 lowercase hex digits with no separators, e.g. `001122aabbcc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    /// Create a new MAC address
    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    /// Broadcast MAC address (ffffffffffff)
    pub const fn broadcast() -> Self {
        Self([0xff, 0xff, 0xff, 0xff, 0xff, 0xff])
    }

    /// Zero MAC address (000000000000)
    pub const fn zero() -> Self {
        Self([0x00, 0x00, 0x00, 0x00, 0x00, 0x00])
    }

    /// Get bytes as slice
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Convert to array
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// Lowercase hex rendering without separators
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<[u8; 6]> for MacAddr {
    fn from(bytes: [u8; 6]) -> Self {
        MacAddr(bytes)
    }
}

impl FromStr for MacAddr {
    type Err = crate::Error;

    /// Accepts both the bare 12-digit form and the colon-separated form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits: String = s.chars().filter(|&c| c != ':').collect();
        let mut bytes = [0u8; 6];
        hex::decode_to_slice(&digits, &mut bytes)
            .map_err(|e| crate::Error::invalid_input(format!("MAC address '{}': {}", s, e)))?;
        Ok(MacAddr(bytes))
    }
}
