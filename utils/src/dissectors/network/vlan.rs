use serde::Serialize;

use super::{Context, Dissected, Error, Header};
use crate::dissectors::etype;
use crate::dissectors::reader::Cursor;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
/// IEEE 802.1Q / 802.1ad tag
pub struct Vlan {
    /// Priority code point: `(tci & 0xe000) >> 13`
    pub pcp: u8,
    /// Drop eligible indicator: `tci & 0x1000`
    pub dei: bool,
    /// VLAN identifier: `tci & 0x0fff`
    pub vid: u16,
    pub ether_type: u16,
}

impl Vlan {
    pub fn from_tci(tci: u16, ether_type: u16) -> Self {
        Self {
            pcp: ((tci & 0xe000) >> 13) as u8,
            dei: tci & 0x1000 != 0,
            vid: tci & 0x0fff,
            ether_type,
        }
    }
}

pub fn dissect<'a>(cursor: &mut Cursor<'a>, _: &Context) -> Result<Dissected<'a>, Error> {
    if cursor.remaining_len() < 4 {
        return Err(Error::Truncated);
    }

    let tci = cursor.be_u16()?;
    let ether_type = cursor.be_u16()?;

    Ok(Dissected::new(
        Header::Vlan(Vlan::from_tci(tci, ether_type)),
        etype::next_protocol(ether_type),
    ))
}
