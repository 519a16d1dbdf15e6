//! OpenBSD pflog(4) header encoding and decoding
//!
//! The packet filter prepends a fixed 64-byte header to every logged
//! packet describing the rule that matched it and what was done. The
//! logged IPv4/IPv6 packet follows as payload.
//!
//! ```text
//! length:u8 | af:u8 | action:u8 | reason:u8 | ifname:[16] | ruleset:[16] |
//! rulenr:u32 | subrulenr:i32 | uid:u32 | pid:i32 | rule_uid:u32 |
//! rule_pid:i32 | dir:u8 | pad:[3]
//! ```
//!
//! Multi-byte fields are big-endian.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use bytes::{BufMut, BytesMut};
use hdrkit_core::{Code, Error, Result, Symbol};
use tracing::debug;

use crate::field::FieldReader;
use crate::layer::{downgrade, Decode, Layer, ParentRef};

/// Link-layer type for pflog captures
pub const DLT_PFLOG: u32 = 117;

/// Size of the pflog header in bytes
pub const PFLOG_HDRLEN: usize = 64;

/// Width of the interface and ruleset name fields
pub const PFLOG_NAME_LEN: usize = 16;

/// Action taken by the matching rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Pass,
    Block,
    Scrub,
}

impl Symbol for Action {
    const TABLE: &'static str = "pflog action";
    const ALL: &'static [Self] = &[Action::Pass, Action::Block, Action::Scrub];

    fn code(self) -> u8 {
        match self {
            Action::Pass => 0,
            Action::Block => 1,
            Action::Scrub => 2,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Action::Pass => "pass",
            Action::Block => "block",
            Action::Scrub => "scrub",
        }
    }
}

/// Why the packet was logged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reason {
    Match,
    BadOffset,
    Fragment,
    Short,
    Normalize,
    Memory,
    BadTimestamp,
    Congestion,
    IpOptions,
    ProtoChecksum,
    StateMismatch,
    StateInsert,
    StateLimit,
    SrcLimit,
    SynProxy,
}

impl Symbol for Reason {
    const TABLE: &'static str = "pflog reason";
    const ALL: &'static [Self] = &[
        Reason::Match,
        Reason::BadOffset,
        Reason::Fragment,
        Reason::Short,
        Reason::Normalize,
        Reason::Memory,
        Reason::BadTimestamp,
        Reason::Congestion,
        Reason::IpOptions,
        Reason::ProtoChecksum,
        Reason::StateMismatch,
        Reason::StateInsert,
        Reason::StateLimit,
        Reason::SrcLimit,
        Reason::SynProxy,
    ];

    fn code(self) -> u8 {
        match self {
            Reason::Match => 0,
            Reason::BadOffset => 1,
            Reason::Fragment => 2,
            Reason::Short => 3,
            Reason::Normalize => 4,
            Reason::Memory => 5,
            Reason::BadTimestamp => 6,
            Reason::Congestion => 7,
            Reason::IpOptions => 8,
            Reason::ProtoChecksum => 9,
            Reason::StateMismatch => 10,
            Reason::StateInsert => 11,
            Reason::StateLimit => 12,
            Reason::SrcLimit => 13,
            Reason::SynProxy => 14,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Reason::Match => "match",
            Reason::BadOffset => "bad-offset",
            Reason::Fragment => "fragment",
            Reason::Short => "short",
            Reason::Normalize => "normalize",
            Reason::Memory => "memory",
            Reason::BadTimestamp => "bad-timestamp",
            Reason::Congestion => "congestion",
            Reason::IpOptions => "ip-options",
            Reason::ProtoChecksum => "proto-cksum",
            Reason::StateMismatch => "state-mismatch",
            Reason::StateInsert => "state-insert",
            Reason::StateLimit => "state-limit",
            Reason::SrcLimit => "src-limit",
            Reason::SynProxy => "syn-proxy",
        }
    }
}

/// Direction the packet was travelling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    In,
    Out,
}

impl Symbol for Direction {
    const TABLE: &'static str = "pflog direction";
    const ALL: &'static [Self] = &[Direction::In, Direction::Out];

    fn code(self) -> u8 {
        match self {
            Direction::In => 1,
            Direction::Out => 2,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
        }
    }
}

macro_rules! symbol_str_impls {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.name())
                }
            }

            impl FromStr for $ty {
                type Err = Error;

                fn from_str(s: &str) -> Result<Self> {
                    <$ty>::from_name(s).ok_or_else(|| Error::unknown_symbol(<$ty>::TABLE, s))
                }
            }
        )*
    };
}

symbol_str_impls!(Action, Reason, Direction);

/// Fixed pflog header
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PflogHeader {
    /// Header length as recorded by the kernel
    pub length: u8,
    /// Raw address family of the logged packet
    pub address_family: u8,
    pub action: Code<Action>,
    pub reason: Code<Reason>,
    /// Interface name, word characters only
    pub interface_name: String,
    /// Anchor/ruleset name, word characters only
    pub ruleset_name: String,
    pub rule_number: u32,
    pub subrule_number: i32,
    pub uid: u32,
    pub pid: i32,
    pub rule_uid: u32,
    pub rule_pid: i32,
    pub direction: Code<Direction>,
    /// Opaque padding, preserved for round-trips
    pub pad: [u8; 3],
}

/// Keeps ASCII letters, digits and underscore; drops everything else,
/// including NUL padding.
fn strip_name(field: &[u8]) -> String {
    field
        .iter()
        .filter(|b| b.is_ascii_alphanumeric() || **b == b'_')
        .map(|&b| char::from(b))
        .collect()
}

/// Writes a name NUL-padded to 16 bytes. Only bytes that `strip_name`
/// keeps are accepted, so the name decodes back unchanged.
fn put_name(buffer: &mut BytesMut, field: &'static str, name: &str) -> Result<()> {
    let bytes = name.as_bytes();
    if bytes.len() > PFLOG_NAME_LEN {
        return Err(Error::encoding(
            field,
            format!("'{}' exceeds {} bytes", name, PFLOG_NAME_LEN),
        ));
    }
    if let Some(&bad) = bytes
        .iter()
        .find(|b| !(b.is_ascii_alphanumeric() || **b == b'_'))
    {
        return Err(Error::encoding(
            field,
            format!(
                "'{}' contains byte 0x{:02x} outside [A-Za-z0-9_]",
                name.escape_debug(),
                bad
            ),
        ));
    }
    buffer.put_slice(bytes);
    buffer.put_bytes(0, PFLOG_NAME_LEN - bytes.len());
    Ok(())
}

impl PflogHeader {
    fn read(reader: &mut FieldReader<'_>) -> Self {
        PflogHeader {
            length: reader.u8(),
            address_family: reader.u8(),
            action: Code::from_code(reader.u8()),
            reason: Code::from_code(reader.u8()),
            interface_name: strip_name(&reader.bytes::<PFLOG_NAME_LEN>()),
            ruleset_name: strip_name(&reader.bytes::<PFLOG_NAME_LEN>()),
            rule_number: reader.u32_be(),
            subrule_number: reader.i32_be(),
            uid: reader.u32_be(),
            pid: reader.i32_be(),
            rule_uid: reader.u32_be(),
            rule_pid: reader.i32_be(),
            direction: Code::from_code(reader.u8()),
            pad: reader.bytes::<3>(),
        }
    }

    /// Serialize the 64-byte header
    pub fn write(&self, buffer: &mut BytesMut) -> Result<()> {
        let action = self.action.to_code()?;
        let reason = self.reason.to_code()?;
        let direction = self.direction.to_code()?;

        buffer.put_u8(self.length);
        buffer.put_u8(self.address_family);
        buffer.put_u8(action);
        buffer.put_u8(reason);
        put_name(buffer, "interface name", &self.interface_name)?;
        put_name(buffer, "ruleset name", &self.ruleset_name)?;
        buffer.put_u32(self.rule_number);
        buffer.put_i32(self.subrule_number);
        buffer.put_u32(self.uid);
        buffer.put_i32(self.pid);
        buffer.put_u32(self.rule_uid);
        buffer.put_i32(self.rule_pid);
        buffer.put_u8(direction);
        buffer.put_slice(&self.pad);
        Ok(())
    }
}

impl fmt::Display for PflogHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PFLog")?;
        writeln!(f, "length: {}", self.length)?;
        writeln!(f, "af: {}", self.address_family)?;
        writeln!(f, "action: {}", self.action)?;
        writeln!(f, "reason: {}", self.reason)?;
        writeln!(f, "ifname: {}", self.interface_name)?;
        writeln!(f, "ruleset: {}", self.ruleset_name)?;
        writeln!(f, "rulenr: {}", self.rule_number)?;
        writeln!(f, "subrulenr: {}", self.subrule_number)?;
        writeln!(f, "uid: {}", self.uid)?;
        writeln!(f, "pid: {}", self.pid)?;
        writeln!(f, "rule_uid: {}", self.rule_uid)?;
        writeln!(f, "rule_pid: {}", self.rule_pid)?;
        write!(f, "dir: {}", self.direction)
    }
}

/// A decoded pflog record
#[derive(Debug, Clone, Default)]
pub struct PflogPacket {
    pub header: PflogHeader,
    /// The logged IP/IPv6 packet
    pub payload: Vec<u8>,
    /// The buffer this record was decoded from
    pub raw_frame: Vec<u8>,
    /// Enclosing layer, if any
    pub parent: Option<ParentRef>,
}

impl PflogPacket {
    /// Decode a pflog record. Missing header fields decode as zero or empty.
    pub fn decode(data: &[u8], parent: Option<&Arc<Layer>>) -> Self {
        let mut reader = FieldReader::new(data);
        let header = PflogHeader::read(&mut reader);
        if reader.missing() > 0 {
            debug!(
                "Truncated pflog header ({} of {} bytes), {} fields defaulted",
                data.len(),
                PFLOG_HDRLEN,
                reader.missing()
            );
        }

        PflogPacket {
            header,
            payload: reader.rest(),
            raw_frame: data.to_vec(),
            parent: downgrade(parent),
        }
    }

    /// Decode and return only the logged packet
    pub fn strip(data: &[u8]) -> Vec<u8> {
        <Self as Decode>::strip(data)
    }

    /// Encode the header followed by `ip` as the logged packet.
    ///
    /// Fails if a table field holds a value that does not map back to a
    /// unique code, or if a name does not fit its 16-byte field.
    pub fn encode(&self, ip: &[u8]) -> Result<Vec<u8>> {
        let mut buffer = BytesMut::with_capacity(PFLOG_HDRLEN + ip.len());
        self.header.write(&mut buffer)?;
        buffer.put_slice(ip);
        Ok(buffer.to_vec())
    }

    /// The enclosing layer, if it is still alive
    pub fn parent(&self) -> Option<Arc<Layer>> {
        self.parent.as_ref().and_then(|p| p.upgrade())
    }
}

impl Decode for PflogPacket {
    const HEADER_LEN: usize = PFLOG_HDRLEN;

    fn decode(data: &[u8], parent: Option<&Arc<Layer>>) -> Self {
        PflogPacket::decode(data, parent)
    }

    fn payload(&self) -> &[u8] {
        &self.payload
    }

    fn into_layer(self) -> Layer {
        Layer::Pflog(self)
    }
}

impl fmt::Display for PflogPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header)?;
        write!(f, "payload: {} bytes", self.payload.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AF_INET: u8 = 2;
    const AF_INET6: u8 = 24;

    fn sample_header() -> PflogHeader {
        PflogHeader {
            length: 61,
            address_family: AF_INET,
            action: Code::Known(Action::Block),
            reason: Code::Known(Reason::Match),
            interface_name: "em0".to_string(),
            ruleset_name: "main_anchor".to_string(),
            rule_number: 12,
            subrule_number: -1,
            uid: 0,
            pid: 31337,
            rule_uid: u32::MAX,
            rule_pid: -1,
            direction: Code::Known(Direction::In),
            pad: [0xA1, 0xB2, 0xC3],
        }
    }

    fn roundtrip(header: &PflogHeader, ip: &[u8]) -> PflogPacket {
        let packet = PflogPacket {
            header: header.clone(),
            ..Default::default()
        };
        let bytes = packet.encode(ip).unwrap();
        assert_eq!(bytes.len(), PFLOG_HDRLEN + ip.len());
        PflogPacket::decode(&bytes, None)
    }

    #[test]
    fn test_constants() {
        assert_eq!(DLT_PFLOG, 117);
        assert_eq!(PFLOG_HDRLEN, 64);
        assert_eq!(1 + 1 + 1 + 1 + 16 + 16 + 4 * 6 + 1 + 3, PFLOG_HDRLEN);
    }

    #[test]
    fn test_tables_are_inverse() {
        for action in Action::ALL {
            assert_eq!(Action::from_code(action.code()), Some(*action));
            assert_eq!(action.name().parse::<Action>().unwrap(), *action);
        }
        for reason in Reason::ALL {
            assert_eq!(Reason::from_code(reason.code()), Some(*reason));
            assert_eq!(reason.name().parse::<Reason>().unwrap(), *reason);
        }
        for direction in Direction::ALL {
            assert_eq!(Direction::from_code(direction.code()), Some(*direction));
            assert_eq!(direction.name().parse::<Direction>().unwrap(), *direction);
        }
        assert_eq!(Reason::ALL.len(), 15);
        assert_eq!(Reason::SynProxy.code(), 14);
        assert_eq!(Reason::ProtoChecksum.name(), "proto-cksum");
    }

    #[test]
    fn test_decode_fixed_layout() {
        let mut data = vec![0u8; PFLOG_HDRLEN];
        data[0] = 61;
        data[1] = AF_INET6;
        data[2] = 2; // scrub
        data[3] = 4; // normalize
        data[4..8].copy_from_slice(b"vio0");
        data[20..24].copy_from_slice(b"ssh\0");
        data[36..40].copy_from_slice(&7u32.to_be_bytes());
        data[40..44].copy_from_slice(&(-1i32).to_be_bytes());
        data[44..48].copy_from_slice(&1000u32.to_be_bytes());
        data[48..52].copy_from_slice(&4242i32.to_be_bytes());
        data[52..56].copy_from_slice(&0u32.to_be_bytes());
        data[56..60].copy_from_slice(&(-7i32).to_be_bytes());
        data[60] = 2; // out
        data[61..64].copy_from_slice(&[1, 2, 3]);
        data.extend_from_slice(&[0x60, 0x00]);

        let packet = PflogPacket::decode(&data, None);
        let h = &packet.header;
        assert_eq!(h.length, 61);
        assert_eq!(h.address_family, AF_INET6);
        assert_eq!(h.action, Code::Known(Action::Scrub));
        assert_eq!(h.reason, Code::Known(Reason::Normalize));
        assert_eq!(h.interface_name, "vio0");
        assert_eq!(h.ruleset_name, "ssh");
        assert_eq!(h.rule_number, 7);
        assert_eq!(h.subrule_number, -1);
        assert_eq!(h.uid, 1000);
        assert_eq!(h.pid, 4242);
        assert_eq!(h.rule_uid, 0);
        assert_eq!(h.rule_pid, -7);
        assert_eq!(h.direction, Code::Known(Direction::Out));
        assert_eq!(h.pad, [1, 2, 3]);
        assert_eq!(packet.payload, vec![0x60, 0x00]);
        assert_eq!(packet.raw_frame, data);
    }

    #[test]
    fn test_name_stripping() {
        assert_eq!(strip_name(b"eth0\0\0\0\0\0\0\0\0\0\0\0\0"), "eth0");
        assert_eq!(strip_name(b"a-b.c/d_e\0f g\0\0\0"), "abcd_efg");
        assert_eq!(strip_name(&[0u8; 16]), "");
        assert_eq!(strip_name(&[0xE9, b'x', 0xFF]), "x");
    }

    #[test]
    fn test_roundtrip_sample() {
        let header = sample_header();
        let ip = [0x45, 0x00, 0x00, 0x14, 0xDE, 0xAD];
        let decoded = roundtrip(&header, &ip);
        assert_eq!(decoded.header, header);
        assert_eq!(decoded.payload, ip);
    }

    #[test]
    fn test_roundtrip_every_action() {
        for action in Action::ALL {
            let header = PflogHeader {
                action: Code::Known(*action),
                ..sample_header()
            };
            assert_eq!(roundtrip(&header, &[]).header, header);
        }
    }

    #[test]
    fn test_roundtrip_every_reason() {
        for code in 0..=14u8 {
            let header = PflogHeader {
                reason: Code::from_code(code),
                ..sample_header()
            };
            assert!(header.reason.is_known());
            let decoded = roundtrip(&header, &[0x45]);
            assert_eq!(decoded.header, header);
            assert_eq!(decoded.header.reason.to_code().unwrap(), code);
        }
    }

    #[test]
    fn test_roundtrip_every_direction() {
        for direction in Direction::ALL {
            let header = PflogHeader {
                direction: Code::Known(*direction),
                ..sample_header()
            };
            assert_eq!(roundtrip(&header, &[]).header, header);
        }
    }

    #[test]
    fn test_unknown_codes_survive_roundtrip() {
        let mut data = vec![0u8; PFLOG_HDRLEN];
        data[2] = 9; // no such action
        data[3] = 200; // no such reason
        data[60] = 0; // no such direction

        let decoded = PflogPacket::decode(&data, None);
        assert_eq!(decoded.header.action, Code::Unknown(9));
        assert_eq!(decoded.header.reason, Code::Unknown(200));
        assert_eq!(decoded.header.direction, Code::Unknown(0));

        let bytes = decoded.encode(&[]).unwrap();
        assert_eq!(bytes, data);
    }

    #[test]
    fn test_encode_rejects_ambiguous_code() {
        let packet = PflogPacket {
            header: PflogHeader {
                action: Code::Unknown(1),
                ..sample_header()
            },
            ..Default::default()
        };
        assert!(matches!(
            packet.encode(&[]),
            Err(Error::Encoding {
                field: "pflog action",
                ..
            })
        ));
    }

    #[test]
    fn test_encode_rejects_long_name() {
        let packet = PflogPacket {
            header: PflogHeader {
                interface_name: "a_very_long_interface".to_string(),
                ..sample_header()
            },
            ..Default::default()
        };
        assert!(matches!(
            packet.encode(&[]),
            Err(Error::Encoding {
                field: "interface name",
                ..
            })
        ));
    }

    #[test]
    fn test_encode_rejects_non_word_name() {
        for ruleset in ["outer/inner", "a-b", "v1.2", "nul\0"] {
            let packet = PflogPacket {
                header: PflogHeader {
                    ruleset_name: ruleset.to_string(),
                    ..sample_header()
                },
                ..Default::default()
            };
            assert!(
                matches!(
                    packet.encode(&[]),
                    Err(Error::Encoding {
                        field: "ruleset name",
                        ..
                    })
                ),
                "ruleset {:?} should be rejected",
                ruleset
            );
        }

        let header = PflogHeader {
            interface_name: "pflog0".to_string(),
            ruleset_name: "outer_inner".to_string(),
            ..sample_header()
        };
        let packet = PflogPacket {
            header: header.clone(),
            ..Default::default()
        };
        let bytes = packet.encode(&[]).unwrap();
        assert_eq!(PflogPacket::decode(&bytes, None).header, header);
    }

    #[test]
    fn test_unknown_symbol_name() {
        let err = "drop".parse::<Action>().unwrap_err();
        assert!(matches!(
            err,
            Error::UnknownSymbol {
                table: "pflog action",
                ..
            }
        ));
        assert!("sideways".parse::<Code<Direction>>().is_err());
    }

    #[test]
    fn test_decode_empty() {
        let packet = PflogPacket::decode(&[], None);
        assert_eq!(packet.header, PflogHeader::default());
        assert_eq!(packet.header.action, Code::Known(Action::Pass));
        assert_eq!(packet.header.direction, Code::Unknown(0));
        assert_eq!(packet.header.interface_name, "");
        assert!(packet.payload.is_empty());
    }

    #[test]
    fn test_decode_truncated() {
        let packet = PflogPacket {
            header: sample_header(),
            ..Default::default()
        };
        let bytes = packet.encode(&[0x45, 0x00]).unwrap();

        // Cut inside the rule number: names survive, the rest defaults
        let decoded = PflogPacket::decode(&bytes[..38], None);
        assert_eq!(decoded.header.action, Code::Known(Action::Block));
        assert_eq!(decoded.header.interface_name, "em0");
        assert_eq!(decoded.header.ruleset_name, "main_anchor");
        assert_eq!(decoded.header.rule_number, 0);
        assert_eq!(decoded.header.rule_pid, 0);
        assert_eq!(decoded.header.direction, Code::Unknown(0));
        assert_eq!(decoded.header.pad, [0, 0, 0]);
        assert!(decoded.payload.is_empty());

        // One byte short of the full header
        let decoded = PflogPacket::decode(&bytes[..63], None);
        assert_eq!(decoded.header.direction, Code::Known(Direction::In));
        assert_eq!(decoded.header.pad, [0, 0, 0]);
        assert!(decoded.payload.is_empty());
    }

    #[test]
    fn test_strip() {
        let packet = PflogPacket {
            header: sample_header(),
            ..Default::default()
        };
        let bytes = packet.encode(&[9, 9, 9]).unwrap();
        assert_eq!(PflogPacket::strip(&bytes), vec![9, 9, 9]);
    }

    #[test]
    fn test_display() {
        let text = PflogPacket {
            header: sample_header(),
            ..Default::default()
        }
        .to_string();
        assert!(text.starts_with("PFLog\n"));
        assert!(text.contains("action: block"));
        assert!(text.contains("ifname: em0"));
        assert!(text.contains("dir: in"));
    }
}
