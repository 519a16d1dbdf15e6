//! Command implementations
//!
//! Each command renders its result as text so it can be printed by the
//! binary or checked directly in tests.

use std::fs;

use hdrkit_core::{Error, Result};
use hdrkit_packet::{
    checksum::checksum_accumulate, decode_link, internet_checksum, Decode, EthernetPacket,
    IcmpPacket, LinkType, PflogPacket,
};
use tracing::{debug, info};

use crate::args::{Commands, Input, LayerKind};

/// Parse a hex string, ignoring whitespace and ':' separators
pub fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let digits: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    hex::decode(&digits).map_err(|e| Error::invalid_input(format!("hex input: {}", e)))
}

/// Load the raw bytes named by `input`
pub fn read_input(input: &Input) -> Result<Vec<u8>> {
    match (&input.hex, &input.file) {
        (Some(text), _) => parse_hex(text),
        (None, Some(path)) => {
            debug!("Reading raw bytes from {}", path.display());
            Ok(fs::read(path)?)
        }
        (None, None) => Err(Error::invalid_input("no input given")),
    }
}

fn decode_as(layer: LayerKind, data: &[u8]) -> String {
    match layer {
        LayerKind::Ethernet => EthernetPacket::decode(data, None).into_layer().to_string(),
        LayerKind::Icmp => IcmpPacket::decode(data, None).into_layer().to_string(),
        LayerKind::Pflog => PflogPacket::decode(data, None).into_layer().to_string(),
    }
}

/// Run a parsed command and return its output
pub fn run(command: &Commands) -> Result<String> {
    match command {
        Commands::Decode { layer, input } => {
            let data = read_input(input)?;
            info!("Decoding {} bytes as {:?}", data.len(), layer);
            Ok(decode_as(*layer, &data))
        }
        Commands::Link { dlt, input } => {
            let link = LinkType::from_dlt(*dlt)?;
            let data = read_input(input)?;
            Ok(decode_link(link, &data).to_string())
        }
        Commands::Checksum { input } => {
            let data = read_input(input)?;
            Ok(format!(
                "checksum: 0x{:04x} (sum 0x{:04x})",
                internet_checksum(&data),
                checksum_accumulate(&data)
            ))
        }
        Commands::Echo { id, seq, data } => {
            let data = match data {
                Some(text) => parse_hex(text)?,
                None => Vec::new(),
            };
            let mut packet = IcmpPacket::echo_request(*id, *seq, &data);
            Ok(hex::encode(packet.encode()))
        }
    }
}
