//! ICMP message encoding and decoding
//!
//! Covers the 4-byte ICMP header (type, code, checksum). Everything after
//! it is carried as an opaque payload, including the identifier and
//! sequence words of echo messages.

use std::fmt;
use std::sync::Arc;

use bytes::{BufMut, BytesMut};
use tracing::{debug, trace};

use crate::checksum::internet_checksum;
use crate::field::FieldReader;
use crate::layer::{downgrade, Decode, Layer, ParentRef};

/// Well-known ICMP message type values
pub mod icmp_types {
    pub const ECHOREPLY: u8 = 0;
    pub const UNREACH: u8 = 3;
    pub const SOURCEQUENCH: u8 = 4;
    pub const REDIRECT: u8 = 5;
    pub const ECHO: u8 = 8;
    pub const ROUTERADVERT: u8 = 9;
    pub const ROUTERSOLICIT: u8 = 10;
    pub const TIMXCEED: u8 = 11;
    pub const PARAMPROB: u8 = 12;
    pub const TSTAMP: u8 = 13;
    pub const TSTAMPREPLY: u8 = 14;
    pub const IREQ: u8 = 15;
    pub const IREQREPLY: u8 = 16;
    pub const MASKREQ: u8 = 17;
    pub const MASKREPLY: u8 = 18;
}

/// ICMP Message Types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IcmpType {
    EchoReply,
    DestinationUnreachable,
    SourceQuench,
    Redirect,
    EchoRequest,
    RouterAdvertisement,
    RouterSolicitation,
    TimeExceeded,
    ParameterProblem,
    Timestamp,
    TimestampReply,
    InformationRequest,
    InformationReply,
    AddressMaskRequest,
    AddressMaskReply,
    /// Any other type, kept verbatim
    Other(u8),
}

impl IcmpType {
    pub fn to_u8(self) -> u8 {
        use self::icmp_types::*;
        match self {
            IcmpType::EchoReply => ECHOREPLY,
            IcmpType::DestinationUnreachable => UNREACH,
            IcmpType::SourceQuench => SOURCEQUENCH,
            IcmpType::Redirect => REDIRECT,
            IcmpType::EchoRequest => ECHO,
            IcmpType::RouterAdvertisement => ROUTERADVERT,
            IcmpType::RouterSolicitation => ROUTERSOLICIT,
            IcmpType::TimeExceeded => TIMXCEED,
            IcmpType::ParameterProblem => PARAMPROB,
            IcmpType::Timestamp => TSTAMP,
            IcmpType::TimestampReply => TSTAMPREPLY,
            IcmpType::InformationRequest => IREQ,
            IcmpType::InformationReply => IREQREPLY,
            IcmpType::AddressMaskRequest => MASKREQ,
            IcmpType::AddressMaskReply => MASKREPLY,
            IcmpType::Other(val) => val,
        }
    }

    pub fn from_u8(value: u8) -> Self {
        use self::icmp_types::*;
        match value {
            ECHOREPLY => IcmpType::EchoReply,
            UNREACH => IcmpType::DestinationUnreachable,
            SOURCEQUENCH => IcmpType::SourceQuench,
            REDIRECT => IcmpType::Redirect,
            ECHO => IcmpType::EchoRequest,
            ROUTERADVERT => IcmpType::RouterAdvertisement,
            ROUTERSOLICIT => IcmpType::RouterSolicitation,
            TIMXCEED => IcmpType::TimeExceeded,
            PARAMPROB => IcmpType::ParameterProblem,
            TSTAMP => IcmpType::Timestamp,
            TSTAMPREPLY => IcmpType::TimestampReply,
            IREQ => IcmpType::InformationRequest,
            IREQREPLY => IcmpType::InformationReply,
            MASKREQ => IcmpType::AddressMaskRequest,
            MASKREPLY => IcmpType::AddressMaskReply,
            val => IcmpType::Other(val),
        }
    }
}

impl Default for IcmpType {
    /// Type 0, the value a missing type byte decodes to
    fn default() -> Self {
        IcmpType::EchoReply
    }
}

impl fmt::Display for IcmpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IcmpType::EchoReply => "echo reply",
            IcmpType::DestinationUnreachable => "destination unreachable",
            IcmpType::SourceQuench => "source quench",
            IcmpType::Redirect => "redirect",
            IcmpType::EchoRequest => "echo request",
            IcmpType::RouterAdvertisement => "router advertisement",
            IcmpType::RouterSolicitation => "router solicitation",
            IcmpType::TimeExceeded => "time exceeded",
            IcmpType::ParameterProblem => "parameter problem",
            IcmpType::Timestamp => "timestamp",
            IcmpType::TimestampReply => "timestamp reply",
            IcmpType::InformationRequest => "information request",
            IcmpType::InformationReply => "information reply",
            IcmpType::AddressMaskRequest => "address mask request",
            IcmpType::AddressMaskReply => "address mask reply",
            IcmpType::Other(val) => return write!(f, "type {}", val),
        };
        f.write_str(name)
    }
}

/// Fixed ICMP header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IcmpHeader {
    pub icmp_type: IcmpType,
    pub code: u8,
    /// Checksum in host order
    pub checksum: u16,
}

impl fmt::Display for IcmpHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ICMP")?;
        writeln!(f, "type: {} ({})", self.icmp_type.to_u8(), self.icmp_type)?;
        writeln!(f, "code: {}", self.code)?;
        write!(f, "checksum: 0x{:04x}", self.checksum)
    }
}

/// ICMP Packet
#[derive(Debug, Clone, Default)]
pub struct IcmpPacket {
    pub header: IcmpHeader,
    /// Message body following the header
    pub payload: Vec<u8>,
    /// The buffer this message was decoded from; empty for built packets
    pub raw_frame: Vec<u8>,
    /// Enclosing layer, if any
    pub parent: Option<ParentRef>,
}

impl IcmpPacket {
    /// ICMP header size (type + code + checksum)
    pub const HEADER_SIZE: usize = 4;

    /// Create a packet from scratch. The checksum is filled in on encode.
    pub fn new(icmp_type: IcmpType, code: u8, payload: Vec<u8>) -> Self {
        Self {
            header: IcmpHeader {
                icmp_type,
                code,
                checksum: 0,
            },
            payload,
            ..Default::default()
        }
    }

    /// Create ICMP Echo Request (Ping)
    pub fn echo_request(id: u16, seq: u16, data: &[u8]) -> Self {
        let mut payload = Vec::with_capacity(4 + data.len());
        payload.extend_from_slice(&id.to_be_bytes());
        payload.extend_from_slice(&seq.to_be_bytes());
        payload.extend_from_slice(data);

        let mut packet = Self::new(IcmpType::EchoRequest, 0, payload);
        packet.checksum();
        packet
    }

    /// Parse an ICMP message. Missing header bytes decode as zero.
    pub fn decode(data: &[u8], parent: Option<&Arc<Layer>>) -> Self {
        let mut reader = FieldReader::new(data);
        let header = IcmpHeader {
            icmp_type: IcmpType::from_u8(reader.u8()),
            code: reader.u8(),
            checksum: reader.u16_be(),
        };
        if reader.missing() > 0 {
            debug!(
                "Truncated ICMP header ({} of {} bytes), {} fields defaulted",
                data.len(),
                Self::HEADER_SIZE,
                reader.missing()
            );
        }

        IcmpPacket {
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

    fn serialize(&self, checksum: u16) -> Vec<u8> {
        let mut buffer = BytesMut::with_capacity(Self::HEADER_SIZE + self.payload.len());
        buffer.put_u8(self.header.icmp_type.to_u8());
        buffer.put_u8(self.header.code);
        buffer.put_u16(checksum);
        buffer.put_slice(&self.payload);
        buffer.to_vec()
    }

    /// Recalculate and set the checksum over type, code, a zeroed checksum
    /// field and the payload.
    pub fn checksum(&mut self) {
        self.header.checksum = internet_checksum(&self.serialize(0));
        trace!("ICMP checksum set to 0x{:04x}", self.header.checksum);
    }

    /// Encode packet to bytes. The checksum is always recomputed first.
    pub fn encode(&mut self) -> Vec<u8> {
        self.checksum();
        self.serialize(self.header.checksum)
    }

    /// Whether the stored checksum matches the packet contents
    pub fn verify(&self) -> bool {
        internet_checksum(&self.serialize(0)) == self.header.checksum
    }

    /// The enclosing layer, if it is still alive
    pub fn parent(&self) -> Option<Arc<Layer>> {
        self.parent.as_ref().and_then(|p| p.upgrade())
    }
}

impl Decode for IcmpPacket {
    const HEADER_LEN: usize = Self::HEADER_SIZE;

    fn decode(data: &[u8], parent: Option<&Arc<Layer>>) -> Self {
        IcmpPacket::decode(data, parent)
    }

    fn payload(&self) -> &[u8] {
        &self.payload
    }

    fn into_layer(self) -> Layer {
        Layer::Icmp(self)
    }
}

impl fmt::Display for IcmpPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header)?;
        write!(f, "payload: {} bytes", self.payload.len())
    }
}
