use serde::Serialize;

use super::{next_by_port, Context, Dissected, Error, Header, IpProto};
use crate::checksum::IpPair;
use crate::dissectors::reader::Cursor;
use pktscope_api::packet::Validation;

pub const HEADER_LEN: usize = 8;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Udp {
    pub src_port: u16,
    pub dst_port: u16,
    /// Header plus payload
    pub length: u16,
    pub checksum: u16,
}

pub fn dissect<'a>(cursor: &mut Cursor<'a>, ctx: &Context) -> Result<Dissected<'a>, Error> {
    if cursor.remaining_len() < HEADER_LEN {
        return Err(Error::Truncated);
    }
    let region = cursor.remaining();

    let src_port = cursor.be_u16()?;
    let dst_port = cursor.be_u16()?;
    let length = cursor.be_u16()?;
    let checksum = cursor.be_u16()?;

    if (length as usize) < HEADER_LEN {
        return Err(Error::Malformed("UDP length shorter than its header"));
    }
    // A first fragment carries only the start of the datagram
    let (end, length_check) = if length as usize > region.len() {
        if !ctx.fragmented {
            return Err(Error::Malformed("UDP length exceeds IP payload"));
        }
        (region.len(), Validation::Unchecked)
    } else {
        (
            length as usize,
            Validation::from_check(length as usize == region.len()),
        )
    };
    cursor.limit(end - HEADER_LEN)?;

    let checksum_check = match ctx.addrs {
        // Not computed by the sender
        Some(IpPair::V4 { .. }) if checksum == 0 => Validation::Unchecked,
        _ => ctx.verify_pseudo(IpProto::UDP as u8, &region[..end]),
    };

    let udp = Udp {
        src_port,
        dst_port,
        length,
        checksum,
    };
    let next = next_by_port(ctx, src_port, dst_port, cursor.remaining());

    Ok(Dissected::new(Header::Udp(udp), next)
        .with_checksum(checksum_check)
        .with_length(length_check))
}
