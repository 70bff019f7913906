use serde::Serialize;

use super::{ip_proto, Context, Dissected, Error, Header, IpProto, Next};
use crate::dissectors::reader::Cursor;

pub const HEADER_LEN: usize = 40;
const FRAGMENT_HEADER_LEN: usize = 8;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Ipv6 {
    /// `(word & 0xf000_0000) >> 28`
    pub version: u8,
    /// `(word & 0x0ff0_0000) >> 20`
    pub traffic_class: u8,
    /// `word & 0x000f_ffff`
    pub flow_label: u32,
    pub payload_len: u16,
    pub next_header: u8,
    pub hop_limit: u8,
    pub src: [u8; 16],
    pub dst: [u8; 16],
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Ipv6Fragment {
    /// In 8 byte units
    pub offset: u16,
    pub more: bool,
    pub identification: u32,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
/// Hop-by-hop, routing, fragment or destination options header
pub struct Ipv6Extension<'a> {
    /// Protocol number this header was selected by
    pub kind: u8,
    pub next_header: u8,
    /// Total header length in bytes
    pub length: usize,
    /// Header bytes after next header and length, opaque
    pub data: &'a [u8],
    pub fragment: Option<Ipv6Fragment>,
}

pub fn dissect<'a>(cursor: &mut Cursor<'a>, _: &Context) -> Result<Dissected<'a>, Error> {
    if cursor.remaining_len() < HEADER_LEN {
        return Err(Error::Truncated);
    }

    let word = cursor.be_u32()?;
    let version = ((word & 0xf000_0000) >> 28) as u8;
    if version != 6 {
        return Err(Error::Malformed("IPv6 version is not 6"));
    }

    let payload_len = cursor.be_u16()?;
    let next_header = cursor.u8()?;
    let hop_limit = cursor.u8()?;
    let src = cursor.array()?;
    let dst = cursor.array()?;

    // Zero is a jumbogram, its real length lives in a hop-by-hop option
    if payload_len != 0 {
        if payload_len as usize > cursor.remaining_len() {
            return Err(Error::Malformed("IPv6 payload length exceeds captured bytes"));
        }
        cursor.limit(payload_len as usize)?;
    }

    Ok(Dissected::new(
        Header::Ipv6(Ipv6 {
            version,
            traffic_class: ((word & 0x0ff0_0000) >> 20) as u8,
            flow_label: word & 0x000f_ffff,
            payload_len,
            next_header,
            hop_limit,
            src,
            dst,
        }),
        ip_proto::next_protocol(next_header, true),
    ))
}

pub fn dissect_extension<'a>(
    cursor: &mut Cursor<'a>,
    ctx: &Context,
) -> Result<Dissected<'a>, Error> {
    let kind = ctx
        .ipv6_next_header
        .ok_or(Error::Malformed("IPv6 extension header outside of IPv6"))?;

    let (ext, next) = if kind == IpProto::FRAGMENT as u8 {
        if cursor.remaining_len() < FRAGMENT_HEADER_LEN {
            return Err(Error::Truncated);
        }

        let next_header = cursor.u8()?;
        cursor.skip(1)?;
        let offset_flags = cursor.be_u16()?;
        let identification = cursor.be_u32()?;
        let fragment = Ipv6Fragment {
            offset: offset_flags >> 3,
            more: offset_flags & 0x0001 != 0,
            identification,
        };

        let next = if fragment.offset != 0 {
            Next::End
        } else {
            ip_proto::next_protocol(next_header, true)
        };
        let ext = Ipv6Extension {
            kind,
            next_header,
            length: FRAGMENT_HEADER_LEN,
            data: &[],
            fragment: Some(fragment),
        };
        (ext, next)
    } else {
        let next_header = cursor.u8()?;
        let length = (cursor.u8()? as usize + 1) * 8;
        let data = cursor.bytes(length - 2)?;

        let ext = Ipv6Extension {
            kind,
            next_header,
            length,
            data,
            fragment: None,
        };
        (ext, ip_proto::next_protocol(next_header, true))
    };

    Ok(Dissected::new(Header::Ipv6Extension(ext), next))
}
