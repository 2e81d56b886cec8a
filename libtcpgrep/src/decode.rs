use std::cmp::min;
use std::net::IpAddr;

use pcap_parser::data::{get_packetdata, PacketData};
use pnet_base::MacAddr;
use pnet_packet::ethernet::{EtherTypes, EthernetPacket};
use pnet_packet::ip::IpNextHeaderProtocols;
use pnet_packet::ipv4::Ipv4Packet;
use pnet_packet::ipv6::Ipv6Packet;
use pnet_packet::tcp::TcpPacket;
use pnet_packet::vlan::VlanPacket;

use crate::duration::Duration;
use crate::five_tuple::FiveTuple;
use crate::frame::RawFrame;
use crate::three_tuple::ThreeTuple;

/// Decoded view over a [`RawFrame`].
///
/// Every layer is optional: decoding is best effort and a layer that
/// does not parse is simply absent, along with the layers above it.
/// All slices borrow the frame buffer, nothing is copied.
#[derive(Debug, PartialEq)]
pub struct DecodedFrame<'a> {
    /// Name of the capture interface (or input file)
    pub interface: &'a str,
    /// Capture timestamp
    pub ts: Duration,
    /// Ethernet source address, when the link layer is ethernet
    pub src_mac: Option<MacAddr>,
    /// Ethernet destination address, when the link layer is ethernet
    pub dst_mac: Option<MacAddr>,
    /// EtherType of the network layer, when known
    pub l3_proto: Option<u16>,
    /// IP addresses and L4 protocol, when the IP header parsed
    pub three_tuple: Option<ThreeTuple>,
    /// Full TCP endpoint pair, when the TCP header parsed
    pub five_tuple: Option<FiveTuple>,
    /// TCP payload bytes, empty when absent
    pub payload: &'a [u8],
}

/// Decode the link, IP and TCP layers of a captured frame.
///
/// This is a total function: a garbled frame must not abort the
/// capture loop, so any unparseable layer yields absent fields
/// instead of an error. A TCP segment without payload decodes to an
/// empty payload slice.
pub fn decode_frame<'a>(frame: &RawFrame<'a>) -> DecodedFrame<'a> {
    let mut decoded = DecodedFrame {
        interface: frame.interface,
        ts: frame.ts,
        src_mac: None,
        dst_mac: None,
        l3_proto: None,
        three_tuple: None,
        five_tuple: None,
        payload: &[],
    };
    let caplen = min(frame.caplen as usize, frame.data.len());
    match get_packetdata(frame.data, frame.link_type, caplen) {
        Some(PacketData::L2(data)) => decode_l2(data, &mut decoded),
        Some(PacketData::L3(ethertype, data)) => decode_l3(ethertype, data, &mut decoded),
        Some(PacketData::L4(proto, data)) => {
            // no headers at this link type, only the transport payload
            if proto == IpNextHeaderProtocols::Tcp.0 {
                decoded.payload = data;
            }
        }
        Some(PacketData::Unsupported(_)) | None => {
            trace!("unsupported link type {:?}", frame.link_type);
        }
    }
    decoded
}

fn decode_l2<'a>(data: &'a [u8], decoded: &mut DecodedFrame<'a>) {
    let eth = match EthernetPacket::new(data) {
        Some(eth) => eth,
        None => return,
    };
    decoded.src_mac = Some(eth.get_source());
    decoded.dst_mac = Some(eth.get_destination());
    let mut ethertype = eth.get_ethertype();
    let mut offset = EthernetPacket::minimum_packet_size();
    // a single 802.1Q level; QinQ frames keep only the outer tag
    if ethertype == EtherTypes::Vlan {
        let vlan = match VlanPacket::new(&data[offset..]) {
            Some(vlan) => vlan,
            None => return,
        };
        ethertype = vlan.get_ethertype();
        offset += VlanPacket::minimum_packet_size();
    }
    decode_l3(ethertype.0, &data[offset..], decoded);
}

fn decode_l3<'a>(ethertype: u16, data: &'a [u8], decoded: &mut DecodedFrame<'a>) {
    decoded.l3_proto = Some(ethertype);
    match ethertype {
        t if t == EtherTypes::Ipv4.0 => decode_ipv4(data, decoded),
        t if t == EtherTypes::Ipv6.0 => decode_ipv6(data, decoded),
        _ => {
            trace!("layer 3 not IP (ethertype 0x{ethertype:04x})");
        }
    }
}

fn decode_ipv4<'a>(data: &'a [u8], decoded: &mut DecodedFrame<'a>) {
    let ipv4 = match Ipv4Packet::new(data) {
        Some(ipv4) => ipv4,
        None => return,
    };
    let header_len = ipv4.get_header_length() as usize * 4;
    if header_len < Ipv4Packet::minimum_packet_size() || header_len > data.len() {
        return;
    }
    let t3 = ThreeTuple {
        proto: ipv4.get_next_level_protocol().0,
        src: IpAddr::V4(ipv4.get_source()),
        dst: IpAddr::V4(ipv4.get_destination()),
    };
    // trim the ethernet trailer/padding using the IP total length
    let total_len = min(ipv4.get_total_length() as usize, data.len());
    let l4_data = if total_len >= header_len {
        &data[header_len..total_len]
    } else {
        &data[header_len..]
    };
    // a non-first fragment carries no TCP header
    if ipv4.get_next_level_protocol() == IpNextHeaderProtocols::Tcp
        && ipv4.get_fragment_offset() == 0
    {
        decode_tcp(l4_data, &t3, decoded);
    }
    decoded.three_tuple = Some(t3);
}

fn decode_ipv6<'a>(data: &'a [u8], decoded: &mut DecodedFrame<'a>) {
    let ipv6 = match Ipv6Packet::new(data) {
        Some(ipv6) => ipv6,
        None => return,
    };
    let t3 = ThreeTuple {
        proto: ipv6.get_next_header().0,
        src: IpAddr::V6(ipv6.get_source()),
        dst: IpAddr::V6(ipv6.get_destination()),
    };
    // extension headers are not walked: only a TCP header directly
    // following the fixed header is decoded
    if ipv6.get_next_header() == IpNextHeaderProtocols::Tcp {
        let header_len = Ipv6Packet::minimum_packet_size();
        if data.len() > header_len {
            let payload_len = min(ipv6.get_payload_length() as usize, data.len() - header_len);
            decode_tcp(&data[header_len..header_len + payload_len], &t3, decoded);
        }
    }
    decoded.three_tuple = Some(t3);
}

fn decode_tcp<'a>(data: &'a [u8], t3: &ThreeTuple, decoded: &mut DecodedFrame<'a>) {
    let tcp = match TcpPacket::new(data) {
        Some(tcp) => tcp,
        None => return,
    };
    let data_offset = tcp.get_data_offset() as usize * 4;
    if data_offset < TcpPacket::minimum_packet_size() || data_offset > data.len() {
        return;
    }
    decoded.five_tuple = Some(FiveTuple::from_three_tuple(
        t3,
        tcp.get_source(),
        tcp.get_destination(),
    ));
    decoded.payload = &data[data_offset..];
}
