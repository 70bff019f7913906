use serde::Serialize;

use super::{ip_proto, Context, Dissected, Error, Header, Next};
use crate::checksum;
use crate::dissectors::reader::{high_nibble, low_nibble, Cursor};
use pktscope_api::packet::Validation;

pub const MIN_HEADER_LEN: usize = 20;

pub const FLAG_DONT_FRAGMENT: u8 = 0b010;
pub const FLAG_MORE_FRAGMENTS: u8 = 0b001;

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Ipv4<'a> {
    pub version: u8,
    /// Header length in 32 bit words
    pub ihl: u8,
    pub dscp: u8,
    pub ecn: u8,
    pub total_len: u16,
    pub identification: u16,
    /// Reserved, DF and MF: `(word & 0xe000) >> 13`
    pub flags: u8,
    /// In 8 byte units: `word & 0x1fff`
    pub fragment_offset: u16,
    pub ttl: u8,
    pub protocol: u8,
    pub checksum: u16,
    pub src: [u8; 4],
    pub dst: [u8; 4],
    pub options: &'a [u8],
}

impl<'a> Ipv4<'a> {
    #[inline]
    pub fn header_len(&self) -> usize {
        self.ihl as usize * 4
    }

    #[inline]
    pub fn dont_fragment(&self) -> bool {
        self.flags & FLAG_DONT_FRAGMENT != 0
    }

    #[inline]
    pub fn more_fragments(&self) -> bool {
        self.flags & FLAG_MORE_FRAGMENTS != 0
    }

    #[inline]
    pub fn is_fragment(&self) -> bool {
        self.more_fragments() || self.fragment_offset != 0
    }
}

pub fn dissect<'a>(cursor: &mut Cursor<'a>, ctx: &Context) -> Result<Dissected<'a>, Error> {
    if cursor.remaining_len() < MIN_HEADER_LEN {
        return Err(Error::Truncated);
    }
    let region = cursor.remaining();

    let vhl = cursor.u8()?;
    let version = high_nibble(vhl);
    if version != 4 {
        return Err(Error::Malformed("IPv4 version is not 4"));
    }

    let ihl = low_nibble(vhl);
    let hdr_len = ihl as usize * 4;
    if hdr_len < MIN_HEADER_LEN {
        return Err(Error::Malformed("IPv4 header length shorter than 20 bytes"));
    }
    if region.len() < hdr_len {
        return Err(Error::Truncated);
    }

    let tos = cursor.u8()?;
    let total_len = cursor.be_u16()?;
    let identification = cursor.be_u16()?;
    let flags_frag = cursor.be_u16()?;
    let ttl = cursor.u8()?;
    let protocol = cursor.u8()?;
    let csum = cursor.be_u16()?;
    let src = cursor.array()?;
    let dst = cursor.array()?;
    let options = cursor.bytes(hdr_len - MIN_HEADER_LEN)?;

    if (total_len as usize) < hdr_len {
        return Err(Error::Malformed("IPv4 total length shorter than its header"));
    }
    if total_len as usize > region.len() {
        return Err(Error::Malformed("IPv4 total length exceeds captured bytes"));
    }
    cursor.limit(total_len as usize - hdr_len)?;

    let ip = Ipv4 {
        version,
        ihl,
        dscp: tos >> 2,
        ecn: tos & 0x03,
        total_len,
        identification,
        flags: ((flags_frag & 0xe000) >> 13) as u8,
        fragment_offset: flags_frag & 0x1fff,
        ttl,
        protocol,
        checksum: csum,
        src,
        dst,
        options,
    };

    let checksum = if ctx.config.verify_checksums {
        Validation::from_check(checksum::verify(&region[..hdr_len]))
    } else {
        Validation::Unchecked
    };

    // Only the first fragment carries the upper layer header
    let next = if ip.fragment_offset != 0 {
        Next::End
    } else {
        ip_proto::next_protocol(protocol, false)
    };

    Ok(Dissected::new(Header::Ipv4(ip), next).with_checksum(checksum))
}
