//! RFC 1071 Internet checksum

use serde::Serialize;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
/// Source and destination addresses of the enclosing IP header, as needed by the
/// TCP, UDP and ICMPv6 pseudo header
pub enum IpPair {
    V4 { src: [u8; 4], dst: [u8; 4] },
    V6 { src: [u8; 16], dst: [u8; 16] },
}

#[inline]
fn propagate_carries(mut sum: u64) -> u16 {
    while sum >> 16 != 0 {
        sum = (sum >> 16) + (sum & 0xffff);
    }
    sum as u16
}

/// One's complement sum of `data` as big endian 16 bit words, without the final
/// complement. An odd trailing byte is padded with a zero low byte.
pub fn sum(data: &[u8]) -> u16 {
    let mut accum: u64 = 0;

    let mut words = data.chunks_exact(2);
    for word in &mut words {
        accum += u16::from_be_bytes([word[0], word[1]]) as u64;
    }

    if let [last] = words.remainder() {
        accum += (*last as u64) << 8;
    }

    propagate_carries(accum)
}

/// Fold several partial sums into one
pub fn combine(sums: &[u16]) -> u16 {
    let accum = sums.iter().map(|s| *s as u64).sum();
    propagate_carries(accum)
}

/// Internet checksum of `data`
///
/// Computed over a header whose checksum field is zeroed this yields the value to store;
/// computed over a header with a correct checksum in place it yields zero.
#[inline]
pub fn checksum(data: &[u8]) -> u16 {
    !sum(data)
}

/// Whether a region that embeds its own checksum field checks out
#[inline]
pub fn verify(data: &[u8]) -> bool {
    checksum(data) == 0
}

/// Partial sum of the pseudo header for an upper layer `protocol` carrying `length` bytes
pub fn pseudo_header(addrs: &IpPair, protocol: u8, length: u32) -> u16 {
    match addrs {
        IpPair::V4 { src, dst } => {
            let mut proto_len = [0u8; 4];
            proto_len[1] = protocol;
            proto_len[2..4].copy_from_slice(&(length as u16).to_be_bytes());

            combine(&[sum(src), sum(dst), sum(&proto_len)])
        }
        IpPair::V6 { src, dst } => {
            let mut proto_len = [0u8; 8];
            proto_len[0..4].copy_from_slice(&length.to_be_bytes());
            proto_len[7] = protocol;

            combine(&[sum(src), sum(dst), sum(&proto_len)])
        }
    }
}

/// Verify an upper layer segment (header and payload, checksum field in place)
pub fn verify_with_pseudo_header(addrs: &IpPair, protocol: u8, segment: &[u8]) -> bool {
    let pseudo = pseudo_header(addrs, protocol, segment.len() as u32);
    !combine(&[pseudo, sum(segment)]) == 0
}
