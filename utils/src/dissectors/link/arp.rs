use std::convert::TryFrom;

use num_traits::FromPrimitive;
use serde::Serialize;

use super::{Context, Dissected, Error, Header, Next};
use crate::dissectors::reader::Cursor;

/// Hardware type, protocol type, both address lengths and the opcode
const FIXED_LEN: usize = 8;

pub const HTYPE_ETHERNET: u16 = 1;
pub const PTYPE_IPV4: u16 = 0x0800;

#[repr(u16)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Primitive)]
pub enum ArpOp {
    Request = 1,
    Reply = 2,
    RarpRequest = 3,
    RarpReply = 4,
    InArpRequest = 8,
    InArpReply = 9,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
/// ARP packet, addresses are as long as the header says they are
pub struct Arp<'a> {
    pub hardware_type: u16,
    pub protocol_type: u16,
    pub hardware_len: u8,
    pub protocol_len: u8,
    pub opcode: u16,
    pub sender_hw: &'a [u8],
    pub sender_proto: &'a [u8],
    pub target_hw: &'a [u8],
    pub target_proto: &'a [u8],
}

impl<'a> Arp<'a> {
    #[inline]
    pub fn op(&self) -> Option<ArpOp> {
        ArpOp::from_u16(self.opcode)
    }

    /// Ethernet/IPv4 ARP, the only combination seen in practice
    pub fn is_ethernet_ipv4(&self) -> bool {
        self.hardware_type == HTYPE_ETHERNET
            && self.protocol_type == PTYPE_IPV4
            && self.hardware_len == 6
            && self.protocol_len == 4
    }

    pub fn sender_mac(&self) -> Option<[u8; 6]> {
        <[u8; 6]>::try_from(self.sender_hw).ok()
    }

    pub fn target_mac(&self) -> Option<[u8; 6]> {
        <[u8; 6]>::try_from(self.target_hw).ok()
    }

    pub fn sender_ipv4(&self) -> Option<[u8; 4]> {
        <[u8; 4]>::try_from(self.sender_proto).ok()
    }

    pub fn target_ipv4(&self) -> Option<[u8; 4]> {
        <[u8; 4]>::try_from(self.target_proto).ok()
    }
}

pub fn dissect<'a>(cursor: &mut Cursor<'a>, _: &Context) -> Result<Dissected<'a>, Error> {
    if cursor.remaining_len() < FIXED_LEN {
        return Err(Error::Truncated);
    }

    let hardware_type = cursor.be_u16()?;
    let protocol_type = cursor.be_u16()?;
    let hardware_len = cursor.u8()?;
    let protocol_len = cursor.u8()?;
    let opcode = cursor.be_u16()?;

    let addrs_len = 2 * (hardware_len as usize + protocol_len as usize);
    if cursor.remaining_len() < addrs_len {
        return Err(Error::Truncated);
    }

    let sender_hw = cursor.bytes(hardware_len as usize)?;
    let sender_proto = cursor.bytes(protocol_len as usize)?;
    let target_hw = cursor.bytes(hardware_len as usize)?;
    let target_proto = cursor.bytes(protocol_len as usize)?;

    Ok(Dissected::new(
        Header::Arp(Arp {
            hardware_type,
            protocol_type,
            hardware_len,
            protocol_len,
            opcode,
            sender_hw,
            sender_proto,
            target_hw,
            target_proto,
        }),
        Next::End,
    ))
}
