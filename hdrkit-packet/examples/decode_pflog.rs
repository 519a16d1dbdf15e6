//! Example: Building and decoding a pflog record
//!
//! This example builds a pflog record around an ICMP echo request, then
//! decodes it again the way a capture tool would for DLT_PFLOG traffic.

use hdrkit_core::Code;
use hdrkit_packet::pflog::{Action, Direction, PflogHeader, PflogPacket, Reason};
use hdrkit_packet::{decode_link, IcmpPacket, Layer, LinkType, DLT_PFLOG};

fn main() {
    // Logged packet (kept minimal: a bare ICMP echo request)
    let mut icmp = IcmpPacket::echo_request(0x0100, 1, b"hdrkit");
    let logged = icmp.encode();

    let record = PflogPacket {
        header: PflogHeader {
            length: 61,
            address_family: 2, // AF_INET
            action: Code::Known(Action::Block),
            reason: Code::Known(Reason::Match),
            interface_name: "em0".to_string(),
            rule_number: 3,
            subrule_number: -1,
            rule_uid: u32::MAX,
            rule_pid: -1,
            direction: Code::Known(Direction::In),
            ..Default::default()
        },
        ..Default::default()
    };

    let bytes = record
        .encode(&logged)
        .expect("Failed to encode pflog record");
    println!("pflog record: {} bytes", bytes.len());

    let link = LinkType::from_dlt(DLT_PFLOG).expect("pflog link type");
    let outer = decode_link(link, &bytes);
    println!("{}", outer);

    if let Layer::Pflog(pflog) = outer.as_ref() {
        println!("rule {} on {}", pflog.header.rule_number, pflog.header.interface_name);
    }

    let inner: IcmpPacket = hdrkit_packet::decode_child(&outer);
    println!("{}", inner);
    println!("checksum valid: {}", inner.verify());
}
