#![allow(dead_code)]

use pktscope_utils::checksum::{self, IpPair};

pub const SRC_MAC: [u8; 6] = [0x00, 0x1c, 0x42, 0x00, 0x00, 0x08];
pub const DST_MAC: [u8; 6] = [0x00, 0x1c, 0x42, 0x00, 0x00, 0x09];
pub const SRC_V4: [u8; 4] = [192, 168, 0, 1];
pub const DST_V4: [u8; 4] = [192, 168, 0, 2];

pub fn ethernet(ether_type: u16) -> Vec<u8> {
    let mut buf = DST_MAC.to_vec();
    buf.extend_from_slice(&SRC_MAC);
    buf.extend_from_slice(&ether_type.to_be_bytes());
    buf
}

pub fn vlan(tci: u16, ether_type: u16) -> Vec<u8> {
    let mut buf = tci.to_be_bytes().to_vec();
    buf.extend_from_slice(&ether_type.to_be_bytes());
    buf
}

/// IPv4 header without options and with a correct checksum
pub fn ipv4(protocol: u8, payload_len: usize, flags_frag: u16) -> Vec<u8> {
    let total_len = (20 + payload_len) as u16;
    let mut buf = vec![0x45, 0x00];
    buf.extend_from_slice(&total_len.to_be_bytes());
    buf.extend_from_slice(&[0x1c, 0x46]);
    buf.extend_from_slice(&flags_frag.to_be_bytes());
    buf.push(64);
    buf.push(protocol);
    buf.extend_from_slice(&[0x00, 0x00]);
    buf.extend_from_slice(&SRC_V4);
    buf.extend_from_slice(&DST_V4);
    let csum = checksum::checksum(&buf);
    buf[10..12].copy_from_slice(&csum.to_be_bytes());
    buf
}

pub fn v6_addrs() -> ([u8; 16], [u8; 16]) {
    let mut src = [0u8; 16];
    src[0] = 0x20;
    src[1] = 0x01;
    src[2] = 0x0d;
    src[3] = 0xb8;
    src[15] = 1;
    let mut dst = src;
    dst[15] = 2;
    (src, dst)
}

pub fn ipv6(next_header: u8, payload_len: usize) -> Vec<u8> {
    let (src, dst) = v6_addrs();
    let mut buf = vec![0x60, 0x00, 0x00, 0x00];
    buf.extend_from_slice(&(payload_len as u16).to_be_bytes());
    buf.push(next_header);
    buf.push(64);
    buf.extend_from_slice(&src);
    buf.extend_from_slice(&dst);
    buf
}

/// TCP header without options, checksum left zero
pub fn tcp(src_port: u16, dst_port: u16, flags: u16) -> Vec<u8> {
    let mut buf = src_port.to_be_bytes().to_vec();
    buf.extend_from_slice(&dst_port.to_be_bytes());
    buf.extend_from_slice(&0x0102_0304u32.to_be_bytes());
    buf.extend_from_slice(&0x0a0b_0c0du32.to_be_bytes());
    buf.extend_from_slice(&(0x5000 | flags).to_be_bytes());
    buf.extend_from_slice(&0xfaf0u16.to_be_bytes());
    buf.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
    buf
}

/// UDP header, checksum left zero
pub fn udp(src_port: u16, dst_port: u16, payload_len: usize) -> Vec<u8> {
    let mut buf = src_port.to_be_bytes().to_vec();
    buf.extend_from_slice(&dst_port.to_be_bytes());
    buf.extend_from_slice(&((8 + payload_len) as u16).to_be_bytes());
    buf.extend_from_slice(&[0x00, 0x00]);
    buf
}

/// Fill in the checksum at `offset` of an upper layer segment
pub fn fill_pseudo_checksum(segment: &mut [u8], offset: usize, addrs: &IpPair, protocol: u8) {
    segment[offset] = 0;
    segment[offset + 1] = 0;
    let pseudo = checksum::pseudo_header(addrs, protocol, segment.len() as u32);
    let csum = !checksum::combine(&[pseudo, checksum::sum(segment)]);
    segment[offset..offset + 2].copy_from_slice(&csum.to_be_bytes());
}

/// Standard query for example.com with id 0xbeef
pub fn dns_query() -> Vec<u8> {
    let mut buf = vec![
        0xbe, 0xef, 0x01, 0x20, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    ];
    buf.extend_from_slice(b"\x07example\x03com\x00\x00\x01\x00\x01");
    buf
}

/// Ethernet + IPv4 + TCP carrying `payload`, all checksums valid
pub fn eth_ipv4_tcp(src_port: u16, dst_port: u16, flags: u16, payload: &[u8]) -> Vec<u8> {
    let mut segment = tcp(src_port, dst_port, flags);
    segment.extend_from_slice(payload);
    let addrs = IpPair::V4 {
        src: SRC_V4,
        dst: DST_V4,
    };
    fill_pseudo_checksum(&mut segment, 16, &addrs, 6);

    let mut frame = ethernet(0x0800);
    frame.extend_from_slice(&ipv4(6, segment.len(), 0x4000));
    frame.extend_from_slice(&segment);
    frame
}
