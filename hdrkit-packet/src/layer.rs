//! Layer chaining
//!
//! Every codec exposes the bytes after its header as an untouched payload.
//! Handing that payload to the next decoder is the only way layers are
//! composed. A decoded packet keeps a weak link to the layer it was carried
//! in, so nested layers never keep each other alive.

use std::fmt;
use std::sync::{Arc, Weak};

use hdrkit_core::{Error, Result};
use tracing::debug;

use crate::ethernet::EthernetPacket;
use crate::icmp::IcmpPacket;
use crate::pflog::{PflogPacket, DLT_PFLOG};

/// Link-layer type for Ethernet captures (DLT_EN10MB)
pub const DLT_EN10MB: u32 = 1;

/// Non-owning handle to an enclosing layer
pub type ParentRef = Weak<Layer>;

/// A decoded protocol layer
#[derive(Debug, Clone)]
pub enum Layer {
    Ethernet(EthernetPacket),
    Icmp(IcmpPacket),
    Pflog(PflogPacket),
}

impl Layer {
    /// Short protocol name
    pub fn name(&self) -> &'static str {
        match self {
            Layer::Ethernet(_) => "ethernet",
            Layer::Icmp(_) => "icmp",
            Layer::Pflog(_) => "pflog",
        }
    }

    /// Bytes following this layer's header
    pub fn payload(&self) -> &[u8] {
        match self {
            Layer::Ethernet(p) => &p.payload,
            Layer::Icmp(p) => &p.payload,
            Layer::Pflog(p) => &p.payload,
        }
    }

    /// The buffer this layer was decoded from
    pub fn raw_frame(&self) -> &[u8] {
        match self {
            Layer::Ethernet(p) => &p.raw_frame,
            Layer::Icmp(p) => &p.raw_frame,
            Layer::Pflog(p) => &p.raw_frame,
        }
    }

    /// The enclosing layer, if it is still alive
    pub fn parent(&self) -> Option<Arc<Layer>> {
        let parent = match self {
            Layer::Ethernet(p) => p.parent.as_ref(),
            Layer::Icmp(p) => p.parent.as_ref(),
            Layer::Pflog(p) => p.parent.as_ref(),
        };
        parent.and_then(Weak::upgrade)
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layer::Ethernet(p) => fmt::Display::fmt(p, f),
            Layer::Icmp(p) => fmt::Display::fmt(p, f),
            Layer::Pflog(p) => fmt::Display::fmt(p, f),
        }
    }
}

/// A fixed-layout header decoder.
pub trait Decode: Sized {
    /// Size of the fixed header in bytes
    const HEADER_LEN: usize;

    /// Decodes `data`, never failing. Missing bytes yield default fields.
    fn decode(data: &[u8], parent: Option<&Arc<Layer>>) -> Self;

    /// Bytes following the header
    fn payload(&self) -> &[u8];

    /// Wraps the packet for chaining
    fn into_layer(self) -> Layer;

    /// Decodes `data` and returns only its payload
    fn strip(data: &[u8]) -> Vec<u8> {
        Self::decode(data, None).payload().to_vec()
    }
}

pub(crate) fn downgrade(parent: Option<&Arc<Layer>>) -> Option<ParentRef> {
    parent.map(Arc::downgrade)
}

/// Decodes the payload of `parent` as a `T`, linking the result back to it.
pub fn decode_child<T: Decode>(parent: &Arc<Layer>) -> T {
    T::decode(parent.payload(), Some(parent))
}

/// Link-layer header types the codecs can start from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkType {
    /// Ethernet II (DLT_EN10MB)
    Ethernet,
    /// OpenBSD pflog(4) (DLT_PFLOG)
    Pflog,
}

impl LinkType {
    /// Map a capture file's DLT value
    pub fn from_dlt(dlt: u32) -> Result<Self> {
        match dlt {
            DLT_EN10MB => Ok(LinkType::Ethernet),
            DLT_PFLOG => Ok(LinkType::Pflog),
            other => Err(Error::invalid_input(format!(
                "unsupported link type {}",
                other
            ))),
        }
    }

    /// The DLT value for this link type
    pub fn dlt(self) -> u32 {
        match self {
            LinkType::Ethernet => DLT_EN10MB,
            LinkType::Pflog => DLT_PFLOG,
        }
    }
}

/// Decodes the outermost layer of a captured frame.
pub fn decode_link(link: LinkType, data: &[u8]) -> Arc<Layer> {
    debug!("Decoding {} byte frame as {:?}", data.len(), link);
    let layer = match link {
        LinkType::Ethernet => EthernetPacket::decode(data, None).into_layer(),
        LinkType::Pflog => PflogPacket::decode(data, None).into_layer(),
    };
    Arc::new(layer)
}
