//! Header codecs for hdrkit
//!
//! This crate decodes (and where supported, encodes) fixed-layout binary
//! headers from raw byte buffers:
//!
//! - **Ethernet II** frames (decode only)
//! - **ICMP** messages, with checksum calculation
//! - **pflog(4)** records written by OpenBSD's packet filter
//!
//! # Architecture
//!
//! - [`ethernet`] - Ethernet II header decoding
//! - [`icmp`] - ICMP header encoding and decoding
//! - [`pflog`] - pflog header encoding and decoding
//! - [`layer`] - chaining decoded payloads into the next decoder
//! - [`checksum`] - Internet checksum and byte-order helpers
//!
//! Decoding never fails. A buffer shorter than a header decodes with the
//! missing fields set to zero or empty and an empty payload; validation is
//! left to the caller.
//!
//! # Quick Start
//!
//! ```rust
//! use hdrkit_packet::icmp::{IcmpPacket, IcmpType};
//!
//! let mut packet = IcmpPacket::decode(&[0x08, 0x00, 0x00, 0x00], None);
//! assert_eq!(packet.header.icmp_type, IcmpType::EchoRequest);
//!
//! let bytes = packet.encode();
//! assert_eq!(bytes, vec![0x08, 0x00, 0xF7, 0xFF]);
//! ```
//!
//! ## Following a pflog record into its payload
//!
//! ```rust
//! use hdrkit_packet::layer::{decode_child, decode_link, LinkType};
//! use hdrkit_packet::icmp::IcmpPacket;
//!
//! let mut frame = vec![0u8; 64];
//! frame.extend_from_slice(&[0x00, 0x00, 0xFF, 0xFF]);
//!
//! let outer = decode_link(LinkType::Pflog, &frame);
//! let inner: IcmpPacket = decode_child(&outer);
//! assert!(inner.parent().is_some());
//! ```

pub mod checksum;
pub mod ethernet;
mod field;
pub mod icmp;
pub mod layer;
pub mod pflog;

// Re-export commonly used types for convenience
pub use checksum::{host_to_network_16, internet_checksum, network_to_host_16};
pub use ethernet::{EtherType, EthernetHeader, EthernetPacket};
pub use icmp::{IcmpHeader, IcmpPacket, IcmpType};
pub use layer::{decode_child, decode_link, Decode, Layer, LinkType, ParentRef};
pub use pflog::{Action, Direction, PflogHeader, PflogPacket, Reason, DLT_PFLOG, PFLOG_HDRLEN};
