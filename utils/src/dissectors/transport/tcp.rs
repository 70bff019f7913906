use serde::{Serialize, Serializer};

use super::{next_by_port, Context, Dissected, Error, Header, IpProto};
use crate::dissectors::application::dns;
use crate::dissectors::reader::Cursor;
use crate::dissectors::{Next, Protocol};

pub const MIN_HEADER_LEN: usize = 20;

bitflags! {
    /// Low 9 bits of the data offset/flags word
    pub struct TcpFlags: u16 {
        const FIN = 0x001;
        const SYN = 0x002;
        const RST = 0x004;
        const PSH = 0x008;
        const ACK = 0x010;
        const URG = 0x020;
        const ECE = 0x040;
        const CWR = 0x080;
        const NS = 0x100;
    }
}

impl Serialize for TcpFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.bits())
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Tcp<'a> {
    pub src_port: u16,
    pub dst_port: u16,
    pub seq: u32,
    pub ack: u32,
    /// Header length in 32 bit words: `(word & 0xf000) >> 12`
    pub data_offset: u8,
    pub flags: TcpFlags,
    pub window: u16,
    pub checksum: u16,
    pub urgent_ptr: u16,
    pub options: &'a [u8],
}

impl<'a> Tcp<'a> {
    #[inline]
    pub fn header_len(&self) -> usize {
        self.data_offset as usize * 4
    }
}

pub fn dissect<'a>(cursor: &mut Cursor<'a>, ctx: &Context) -> Result<Dissected<'a>, Error> {
    if cursor.remaining_len() < MIN_HEADER_LEN {
        return Err(Error::Truncated);
    }
    let segment = cursor.remaining();

    let src_port = cursor.be_u16()?;
    let dst_port = cursor.be_u16()?;
    let seq = cursor.be_u32()?;
    let ack = cursor.be_u32()?;
    let word = cursor.be_u16()?;
    let data_offset = ((word & 0xf000) >> 12) as u8;
    if (data_offset as usize * 4) < MIN_HEADER_LEN {
        return Err(Error::Malformed("TCP data offset shorter than 20 bytes"));
    }
    let window = cursor.be_u16()?;
    let checksum = cursor.be_u16()?;
    let urgent_ptr = cursor.be_u16()?;
    let options = cursor.bytes(data_offset as usize * 4 - MIN_HEADER_LEN)?;

    let tcp = Tcp {
        src_port,
        dst_port,
        seq,
        ack,
        data_offset,
        flags: TcpFlags::from_bits_truncate(word & 0x01ff),
        window,
        checksum,
        urgent_ptr,
        options,
    };

    let next = match next_by_port(ctx, src_port, dst_port, cursor.remaining()) {
        Next::Protocol(Protocol::DNS) if !starts_dns_message(cursor.remaining()) => Next::End,
        next => next,
    };
    Ok(Dissected::new(Header::Tcp(tcp), next)
        .with_checksum(ctx.verify_pseudo(IpProto::TCP as u8, segment)))
}

/// A segment opening a DNS message starts with a length prefix covering at least a
/// DNS header. Anything else continues an earlier message.
fn starts_dns_message(payload: &[u8]) -> bool {
    match payload {
        [hi, lo, ..] => u16::from_be_bytes([*hi, *lo]) as usize >= dns::HEADER_LEN,
        _ => false,
    }
}
