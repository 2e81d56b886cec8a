//! Hand-built frames for unit tests.

use pcap_parser::Linktype;

use crate::duration::Duration;
use crate::frame::RawFrame;

/// Wrap raw bytes as an ethernet frame captured on `test0`.
pub(crate) fn raw_frame(data: &[u8]) -> RawFrame<'_> {
    RawFrame {
        interface: "test0",
        ts: Duration::new(1234, 5678),
        link_type: Linktype::ETHERNET,
        data,
        caplen: data.len() as u32,
        origlen: data.len() as u32,
        index: 1,
    }
}

/// Ethernet / IPv4 / TCP frame 192.168.1.10:49152 -> 10.0.0.1:80
/// carrying `payload`. Checksums are not filled in, the decoder does
/// not verify them.
pub(crate) fn ether_ipv4_tcp_frame(payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::new();
    // ethernet: dst, src, ethertype IPv4
    frame.extend_from_slice(&[0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
    frame.extend_from_slice(&[0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb]);
    frame.extend_from_slice(&[0x08, 0x00]);
    frame.extend_from_slice(&ipv4_tcp(payload));
    frame
}

/// Same TCP segment behind a single 802.1Q tag.
pub(crate) fn vlan_ipv4_tcp_frame(payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::new();
    frame.extend_from_slice(&[0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
    frame.extend_from_slice(&[0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb]);
    frame.extend_from_slice(&[0x81, 0x00]);
    // priority 0, VID 42, inner ethertype IPv4
    frame.extend_from_slice(&[0x00, 0x2a, 0x08, 0x00]);
    frame.extend_from_slice(&ipv4_tcp(payload));
    frame
}

/// A minimal ARP request (who-has), no IP layer at all.
pub(crate) fn arp_frame() -> Vec<u8> {
    let mut frame = Vec::new();
    frame.extend_from_slice(&[0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);
    frame.extend_from_slice(&[0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb]);
    frame.extend_from_slice(&[0x08, 0x06]);
    frame.extend_from_slice(&[
        0x00, 0x01, // hardware type: ethernet
        0x08, 0x00, // protocol type: IPv4
        0x06, 0x04, // hardware size, protocol size
        0x00, 0x01, // opcode: request
        0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, // sender MAC
        0xc0, 0xa8, 0x01, 0x0a, // sender IP
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // target MAC
        0x0a, 0x00, 0x00, 0x01, // target IP
    ]);
    frame
}

fn ipv4_tcp(payload: &[u8]) -> Vec<u8> {
    let total_len = (20 + 20 + payload.len()) as u16;
    let mut data = Vec::new();
    // IPv4 header, no options
    data.push(0x45); // version 4, IHL 5
    data.push(0x00); // DSCP/ECN
    data.extend_from_slice(&total_len.to_be_bytes());
    data.extend_from_slice(&[0x00, 0x01]); // identification
    data.extend_from_slice(&[0x00, 0x00]); // flags, fragment offset
    data.push(64); // TTL
    data.push(6); // protocol: TCP
    data.extend_from_slice(&[0x00, 0x00]); // checksum (unchecked)
    data.extend_from_slice(&[192, 168, 1, 10]); // src
    data.extend_from_slice(&[10, 0, 0, 1]); // dst
    // TCP header, no options
    data.extend_from_slice(&49152u16.to_be_bytes()); // src port
    data.extend_from_slice(&80u16.to_be_bytes()); // dst port
    data.extend_from_slice(&[0x00, 0x00, 0x00, 0x01]); // seq
    data.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]); // ack
    data.push(0x50); // data offset 5 words
    data.push(0x18); // flags: PSH|ACK
    data.extend_from_slice(&[0xff, 0xff]); // window
    data.extend_from_slice(&[0x00, 0x00]); // checksum (unchecked)
    data.extend_from_slice(&[0x00, 0x00]); // urgent pointer
    data.extend_from_slice(payload);
    data
}
