use serde::Serialize;

use super::{Context, Dissected, Error, Header, IpProto, Next};
use crate::dissectors::reader::Cursor;

pub const HEADER_LEN: usize = 8;

pub const TYPE_PACKET_TOO_BIG: u8 = 2;
pub const TYPE_PARAMETER_PROBLEM: u8 = 4;
pub const TYPE_ECHO_REQUEST: u8 = 128;
pub const TYPE_ECHO_REPLY: u8 = 129;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Icmpv6Data {
    Echo { id: u16, sequence: u16 },
    Mtu(u32),
    Pointer(u32),
    Raw(u32),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct Icmpv6 {
    pub icmp_type: u8,
    pub code: u8,
    pub checksum: u16,
    pub data: Icmpv6Data,
}

impl Icmpv6 {
    /// Types below 128 report errors
    #[inline]
    pub fn is_error(&self) -> bool {
        self.icmp_type < 128
    }
}

pub fn dissect<'a>(cursor: &mut Cursor<'a>, ctx: &Context) -> Result<Dissected<'a>, Error> {
    if cursor.remaining_len() < HEADER_LEN {
        return Err(Error::Truncated);
    }
    let message = cursor.remaining();

    let icmp_type = cursor.u8()?;
    let code = cursor.u8()?;
    let checksum = cursor.be_u16()?;
    let word = cursor.be_u32()?;

    let data = match icmp_type {
        TYPE_ECHO_REQUEST | TYPE_ECHO_REPLY => Icmpv6Data::Echo {
            id: (word >> 16) as u16,
            sequence: (word & 0xffff) as u16,
        },
        TYPE_PACKET_TOO_BIG => Icmpv6Data::Mtu(word),
        TYPE_PARAMETER_PROBLEM => Icmpv6Data::Pointer(word),
        _ => Icmpv6Data::Raw(word),
    };

    let icmp = Icmpv6 {
        icmp_type,
        code,
        checksum,
        data,
    };

    Ok(Dissected::new(Header::Icmpv6(icmp), Next::End)
        .with_checksum(ctx.verify_pseudo(IpProto::ICMPV6 as u8, message)))
}
