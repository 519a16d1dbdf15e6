//! Checksum and byte-order helpers for network headers
//!
//! This module provides the Internet Checksum (RFC 1071) used by ICMP and
//! the rest of the IP family, plus 16-bit host/network order conversion.

/// Calculates the Internet Checksum as defined in RFC 1071.
///
/// The data is treated as a sequence of big-endian 16-bit words. An odd
/// trailing byte is padded with a zero byte. Carries are folded back into
/// the low 16 bits and the one's complement of the sum is returned.
///
/// # Examples
///
/// ```
/// use hdrkit_packet::checksum::internet_checksum;
///
/// // ICMP echo request header with a zeroed checksum field
/// assert_eq!(internet_checksum(&[0x08, 0x00, 0x00, 0x00]), 0xF7FF);
/// ```
pub fn internet_checksum(data: &[u8]) -> u16 {
    !(checksum_accumulate(data) as u16)
}

/// Validates an Internet checksum.
///
/// Sums the entire packet including the checksum field. A correctly
/// checksummed buffer folds to exactly `0xFFFF`; an all-zero buffer sums to
/// zero and is rejected.
pub fn validate_checksum(data: &[u8]) -> bool {
    checksum_accumulate(data) == 0xFFFF
}

/// Returns the folded one's-complement sum before the final complement.
///
/// A buffer carrying a correct checksum sums to `0xFFFF`.
pub fn checksum_accumulate(data: &[u8]) -> u32 {
    let mut sum: u32 = 0;

    let mut chunks = data.chunks_exact(2);
    for chunk in &mut chunks {
        let word = u16::from_be_bytes([chunk[0], chunk[1]]);
        sum += word as u32;
        // Fold eagerly so arbitrarily long buffers cannot overflow
        if sum > 0xFFFF {
            sum = (sum & 0xFFFF) + (sum >> 16);
        }
    }

    if let Some(&byte) = chunks.remainder().first() {
        sum += (byte as u32) << 8;
    }

    while (sum >> 16) != 0 {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }

    sum
}

/// Converts a 16-bit value from host to network (big-endian) byte order.
///
/// The in-memory bytes of the result are the big-endian serialization of
/// `value`; on little-endian hosts this swaps the bytes.
#[inline]
pub fn host_to_network_16(value: u16) -> u16 {
    value.to_be()
}

/// Converts a 16-bit value from network (big-endian) to host byte order.
#[inline]
pub fn network_to_host_16(value: u16) -> u16 {
    u16::from_be(value)
}
