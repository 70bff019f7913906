use num_traits::FromPrimitive;
use serde::Serialize;

use super::{Context, Dissected, Error, Header, Next};
use crate::dissectors::reader::Cursor;

pub const HEADER_LEN: usize = 8;

#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Primitive)]
pub enum IcmpType {
    EchoReply = 0,
    DestUnreachable = 3,
    SourceQuench = 4,
    Redirect = 5,
    EchoRequest = 8,
    RouterAdvertisement = 9,
    RouterSolicitation = 10,
    TimeExceeded = 11,
    ParameterProblem = 12,
    Timestamp = 13,
    TimestampReply = 14,
    InfoRequest = 15,
    InfoReply = 16,
    AddressMaskRequest = 17,
    AddressMaskReply = 18,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
/// Interpretation of the 4 bytes after the checksum, selected by type and code
pub enum IcmpData {
    Echo { id: u16, sequence: u16 },
    Gateway([u8; 4]),
    NextHopMtu(u16),
    Raw(u32),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct Icmpv4 {
    pub icmp_type: u8,
    pub code: u8,
    pub checksum: u16,
    pub data: IcmpData,
}

impl Icmpv4 {
    #[inline]
    pub fn kind(&self) -> Option<IcmpType> {
        IcmpType::from_u8(self.icmp_type)
    }
}

fn data(icmp_type: u8, code: u8, rest: [u8; 4]) -> IcmpData {
    match (icmp_type, code) {
        (0, _) | (8, _) | (13..=18, _) => IcmpData::Echo {
            id: u16::from_be_bytes([rest[0], rest[1]]),
            sequence: u16::from_be_bytes([rest[2], rest[3]]),
        },
        (5, _) => IcmpData::Gateway(rest),
        // fragmentation needed and DF set
        (3, 4) => IcmpData::NextHopMtu(u16::from_be_bytes([rest[2], rest[3]])),
        _ => IcmpData::Raw(u32::from_be_bytes(rest)),
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
    let rest = cursor.array()?;

    let icmp = Icmpv4 {
        icmp_type,
        code,
        checksum,
        data: data(icmp_type, code, rest),
    };

    Ok(Dissected::new(Header::Icmpv4(icmp), Next::End).with_checksum(ctx.verify_region(message)))
}
