//! Ethernet II frame decoding
//!
//! This module decodes the 14-byte Ethernet II header. Frames are never
//! re-encoded; [`EthernetPacket::encode`] always reports
//! [`Error::NotImplemented`].

use std::fmt;
use std::sync::Arc;

use hdrkit_core::{Error, MacAddr, Result};
use tracing::{debug, warn};

use crate::field::FieldReader;
use crate::layer::{downgrade, Decode, Layer, ParentRef};

/// Well-known EtherType values
pub mod ether_types {
    pub const IP: u16 = 0x0800;
    pub const ARP: u16 = 0x0806;
    pub const APPLETALK: u16 = 0x809b;
    pub const RARP: u16 = 0x8035;
    pub const SNMP: u16 = 0x814c;
    pub const IPV6: u16 = 0x86dd;
    pub const PPP: u16 = 0x880b;
}

/// EtherType of the encapsulated protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EtherType {
    /// IPv4 (0x0800)
    IPv4,
    /// ARP (0x0806)
    ARP,
    /// AppleTalk (0x809B)
    AppleTalk,
    /// Reverse ARP (0x8035)
    RARP,
    /// SNMP over Ethernet (0x814C)
    SNMP,
    /// IPv6 (0x86DD)
    IPv6,
    /// PPP (0x880B)
    PPP,
    /// Any other value, kept verbatim
    Custom(u16),
}

impl Default for EtherType {
    /// Value of a zeroed (or missing) ethertype field
    fn default() -> Self {
        EtherType::Custom(0)
    }
}

impl EtherType {
    /// Convert EtherType to u16 value
    pub fn to_u16(self) -> u16 {
        match self {
            EtherType::IPv4 => ether_types::IP,
            EtherType::ARP => ether_types::ARP,
            EtherType::AppleTalk => ether_types::APPLETALK,
            EtherType::RARP => ether_types::RARP,
            EtherType::SNMP => ether_types::SNMP,
            EtherType::IPv6 => ether_types::IPV6,
            EtherType::PPP => ether_types::PPP,
            EtherType::Custom(val) => val,
        }
    }

    /// Create EtherType from u16 value
    pub fn from_u16(value: u16) -> Self {
        match value {
            ether_types::IP => EtherType::IPv4,
            ether_types::ARP => EtherType::ARP,
            ether_types::APPLETALK => EtherType::AppleTalk,
            ether_types::RARP => EtherType::RARP,
            ether_types::SNMP => EtherType::SNMP,
            ether_types::IPV6 => EtherType::IPv6,
            ether_types::PPP => EtherType::PPP,
            val => EtherType::Custom(val),
        }
    }
}

impl fmt::Display for EtherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EtherType::IPv4 => write!(f, "IPv4"),
            EtherType::ARP => write!(f, "ARP"),
            EtherType::AppleTalk => write!(f, "AppleTalk"),
            EtherType::RARP => write!(f, "RARP"),
            EtherType::SNMP => write!(f, "SNMP"),
            EtherType::IPv6 => write!(f, "IPv6"),
            EtherType::PPP => write!(f, "PPP"),
            EtherType::Custom(val) => write!(f, "0x{:04x}", val),
        }
    }
}

/// Fixed Ethernet II header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EthernetHeader {
    /// Destination MAC address
    pub dest_mac: MacAddr,
    /// Source MAC address
    pub src_mac: MacAddr,
    /// EtherType of the payload
    pub ethertype: EtherType,
}

impl fmt::Display for EthernetHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Ethernet")?;
        writeln!(f, "dst: {}", self.dest_mac)?;
        writeln!(f, "src: {}", self.src_mac)?;
        write!(f, "type: 0x{:04x} ({})", self.ethertype.to_u16(), self.ethertype)
    }
}

/// A decoded Ethernet II frame
#[derive(Debug, Clone, Default)]
pub struct EthernetPacket {
    pub header: EthernetHeader,
    /// Bytes following the header
    pub payload: Vec<u8>,
    /// The buffer this frame was decoded from
    pub raw_frame: Vec<u8>,
    /// Enclosing layer, if any
    pub parent: Option<ParentRef>,
}

impl EthernetPacket {
    /// Ethernet header size (dst + src + type)
    pub const HEADER_SIZE: usize = 14;

    /// Decode an Ethernet frame. Missing header bytes decode as zero.
    pub fn decode(data: &[u8], parent: Option<&Arc<Layer>>) -> Self {
        let mut reader = FieldReader::new(data);
        let header = EthernetHeader {
            dest_mac: MacAddr(reader.bytes::<6>()),
            src_mac: MacAddr(reader.bytes::<6>()),
            ethertype: EtherType::from_u16(reader.u16_be()),
        };
        if reader.missing() > 0 {
            debug!(
                "Truncated Ethernet header ({} of {} bytes), {} fields defaulted",
                data.len(),
                Self::HEADER_SIZE,
                reader.missing()
            );
        }

        EthernetPacket {
            header,
            payload: reader.rest(),
            raw_frame: data.to_vec(),
            parent: downgrade(parent),
        }
    }

    /// Decode and return only the payload
    pub fn strip(data: &[u8]) -> Vec<u8> {
        <Self as Decode>::strip(data)
    }

    /// Ethernet frames cannot be encoded.
    pub fn encode(&self) -> Result<Vec<u8>> {
        warn!("Refusing to encode Ethernet frame");
        Err(Error::not_implemented("Ethernet frame encoding"))
    }

    /// The enclosing layer, if it is still alive
    pub fn parent(&self) -> Option<Arc<Layer>> {
        self.parent.as_ref().and_then(|p| p.upgrade())
    }
}

impl Decode for EthernetPacket {
    const HEADER_LEN: usize = Self::HEADER_SIZE;

    fn decode(data: &[u8], parent: Option<&Arc<Layer>>) -> Self {
        EthernetPacket::decode(data, parent)
    }

    fn payload(&self) -> &[u8] {
        &self.payload
    }

    fn into_layer(self) -> Layer {
        Layer::Ethernet(self)
    }
}

impl fmt::Display for EthernetPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header)?;
        write!(f, "payload: {} bytes", self.payload.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame() -> Vec<u8> {
        vec![
            0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF, // dst
            0x00, 0x11, 0x22, 0x33, 0x44, 0x55, // src
            0x08, 0x00, // IPv4
            0x01, 0x02, 0x03, 0x04, // payload
        ]
    }

    #[test]
    fn test_ethertype_conversion() {
        assert_eq!(EtherType::IPv4.to_u16(), 0x0800);
        assert_eq!(EtherType::ARP.to_u16(), 0x0806);
        assert_eq!(EtherType::AppleTalk.to_u16(), 0x809b);
        assert_eq!(EtherType::RARP.to_u16(), 0x8035);
        assert_eq!(EtherType::SNMP.to_u16(), 0x814c);
        assert_eq!(EtherType::IPv6.to_u16(), 0x86dd);
        assert_eq!(EtherType::PPP.to_u16(), 0x880b);
        assert_eq!(EtherType::from_u16(0x0800), EtherType::IPv4);
        assert_eq!(EtherType::from_u16(0x88cc), EtherType::Custom(0x88cc));
        assert_eq!(EtherType::from_u16(0x88cc).to_u16(), 0x88cc);
    }

    #[test]
    fn test_ethernet_decode() {
        let data = sample_frame();
        let frame = EthernetPacket::decode(&data, None);

        assert_eq!(frame.header.dest_mac.to_string(), "aabbccddeeff");
        assert_eq!(frame.header.src_mac.to_string(), "001122334455");
        assert_eq!(frame.header.ethertype, EtherType::IPv4);
        assert_eq!(frame.payload, vec![0x01, 0x02, 0x03, 0x04]);
        assert_eq!(frame.raw_frame, data);
        assert!(frame.parent.is_none());
    }

    #[test]
    fn test_ethernet_payload_length() {
        let mut data = sample_frame();
        data.extend_from_slice(&[0u8; 100]);
        let frame = EthernetPacket::decode(&data, None);
        assert_eq!(frame.payload.len(), data.len() - EthernetPacket::HEADER_SIZE);
    }

    #[test]
    fn test_ethernet_decode_empty() {
        let frame = EthernetPacket::decode(&[], None);
        assert_eq!(frame.header, EthernetHeader::default());
        assert_eq!(frame.header.dest_mac.to_string(), "000000000000");
        assert_eq!(frame.header.ethertype.to_u16(), 0);
        assert!(frame.payload.is_empty());
        assert!(frame.raw_frame.is_empty());
    }

    #[test]
    fn test_ethernet_decode_truncated() {
        let data = sample_frame();
        // Both MACs present, ethertype cut in half
        let frame = EthernetPacket::decode(&data[..13], None);
        assert_eq!(frame.header.dest_mac.octets(), [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);
        assert_eq!(frame.header.src_mac.octets(), [0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
        assert_eq!(frame.header.ethertype, EtherType::Custom(0));
        assert!(frame.payload.is_empty());
    }

    #[test]
    fn test_ethernet_header_only() {
        let data = sample_frame();
        let frame = EthernetPacket::decode(&data[..14], None);
        assert_eq!(frame.header.ethertype, EtherType::IPv4);
        assert!(frame.payload.is_empty());
    }

    #[test]
    fn test_ethernet_strip() {
        assert_eq!(EthernetPacket::strip(&sample_frame()), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_ethernet_encode_not_implemented() {
        let frame = EthernetPacket::decode(&sample_frame(), None);
        assert!(matches!(frame.encode(), Err(Error::NotImplemented(_))));
    }

    #[test]
    fn test_ethernet_display() {
        let frame = EthernetPacket::decode(&sample_frame(), None);
        let text = frame.to_string();
        assert!(text.starts_with("Ethernet\n"));
        assert!(text.contains("dst: aabbccddeeff"));
        assert!(text.contains("type: 0x0800 (IPv4)"));
        assert!(text.ends_with("payload: 4 bytes"));
    }
}
