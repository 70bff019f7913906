use num_traits::FromPrimitive;
use serde::{Serialize, Serializer};

use super::{Context, Dissected, Error, Header, Next, Protocol};
use crate::dissectors::reader::Cursor;

pub const HEADER_LEN: usize = 12;

bitflags! {
    /// Single bit fields of the flags word
    pub struct DnsFlags: u16 {
        const RESPONSE = 0x8000;
        const AUTHORITATIVE_ANSWER = 0x0400;
        const TRUNCATED = 0x0200;
        const RECURSION_DESIRED = 0x0100;
        const RECURSION_AVAILABLE = 0x0080;
        const Z = 0x0040;
        const AUTHENTIC_DATA = 0x0020;
        const CHECKING_DISABLED = 0x0010;
    }
}

impl Serialize for DnsFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.bits())
    }
}

#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Primitive)]
pub enum OpCode {
    Query = 0,
    IQuery = 1,
    Status = 2,
    Notify = 4,
    Update = 5,
    Dso = 6,
}

#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Primitive)]
pub enum RCode {
    NoError = 0,
    FormErr = 1,
    ServFail = 2,
    NxDomain = 3,
    NotImp = 4,
    Refused = 5,
    YxDomain = 6,
    YxRrSet = 7,
    NxRrSet = 8,
    NotAuth = 9,
    NotZone = 10,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct Dns {
    /// Message length prefix, only present over TCP
    pub length: Option<u16>,
    pub id: u16,
    pub flags: DnsFlags,
    /// `(word & 0x7800) >> 11`
    pub opcode: u8,
    /// `word & 0x000f`
    pub rcode: u8,
    pub qd_count: u16,
    pub an_count: u16,
    pub ns_count: u16,
    pub ar_count: u16,
}

impl Dns {
    #[inline]
    pub fn is_response(&self) -> bool {
        self.flags.contains(DnsFlags::RESPONSE)
    }

    #[inline]
    pub fn op_code(&self) -> Option<OpCode> {
        OpCode::from_u8(self.opcode)
    }

    #[inline]
    pub fn reply_code(&self) -> Option<RCode> {
        RCode::from_u8(self.rcode)
    }
}

pub fn dissect<'a>(cursor: &mut Cursor<'a>, ctx: &Context) -> Result<Dissected<'a>, Error> {
    let length = if ctx.transport == Some(Protocol::TCP) {
        let length = cursor.be_u16()?;
        if (length as usize) < HEADER_LEN {
            return Err(Error::Malformed("DNS message length shorter than its header"));
        }
        // The segment may hold only the start of the message
        if length as usize <= cursor.remaining_len() {
            cursor.limit(length as usize)?;
        }
        Some(length)
    } else {
        None
    };

    if cursor.remaining_len() < HEADER_LEN {
        return Err(Error::Truncated);
    }

    let id = cursor.be_u16()?;
    let word = cursor.be_u16()?;
    let qd_count = cursor.be_u16()?;
    let an_count = cursor.be_u16()?;
    let ns_count = cursor.be_u16()?;
    let ar_count = cursor.be_u16()?;

    let dns = Dns {
        length,
        id,
        flags: DnsFlags::from_bits_truncate(word),
        opcode: ((word & 0x7800) >> 11) as u8,
        rcode: (word & 0x000f) as u8,
        qd_count,
        an_count,
        ns_count,
        ar_count,
    };

    Ok(Dissected::new(Header::Dns(dns), Next::End))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pktscope_api::config::Config;

    // id 0xe039, standard query, recursion desired, one question for www.github.com
    const QUERY: [u8; 32] = [
        0xe0, 0x39, 0x01, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03, 0x77, 0x77,
        0x77, 0x06, 0x67, 0x69, 0x74, 0x68, 0x75, 0x62, 0x03, 0x63, 0x6f, 0x6d, 0x00, 0x00, 0x01,
        0x00, 0x01,
    ];

    #[test]
    fn query() {
        let config = Config::default();
        let mut cursor = Cursor::new(&QUERY);
        let d = dissect(&mut cursor, &Context::new(&config)).unwrap();
        assert_eq!(d.next, Next::End);
        assert_eq!(cursor.remaining_len(), 20);
        match d.header {
            Header::Dns(dns) => {
                assert_eq!(dns.id, 0xe039);
                assert_eq!(dns.length, None);
                assert!(!dns.is_response());
                assert_eq!(dns.flags, DnsFlags::RECURSION_DESIRED);
                assert_eq!(dns.op_code(), Some(OpCode::Query));
                assert_eq!(dns.reply_code(), Some(RCode::NoError));
                assert_eq!(dns.qd_count, 1);
                assert_eq!(dns.an_count, 0);
            }
            _ => panic!("not a dns header"),
        }
    }

    #[test]
    fn flag_order() {
        // QR, opcode 5 (update), AA, TC, RD, RA, Z, AD, CD, rcode 3 (nxdomain)
        let mut buf = QUERY;
        buf[2] = 0xaf;
        buf[3] = 0xf3;
        let config = Config::default();
        let d = dissect(&mut Cursor::new(&buf), &Context::new(&config)).unwrap();
        match d.header {
            Header::Dns(dns) => {
                assert!(dns.is_response());
                assert_eq!(dns.flags, DnsFlags::all());
                assert_eq!(dns.opcode, 5);
                assert_eq!(dns.op_code(), Some(OpCode::Update));
                assert_eq!(dns.rcode, 3);
                assert_eq!(dns.reply_code(), Some(RCode::NxDomain));
            }
            _ => panic!("not a dns header"),
        }
    }

    #[test]
    fn opcode_does_not_leak_into_flags() {
        let mut buf = QUERY;
        buf[2] = 0x78;
        buf[3] = 0x0f;
        let config = Config::default();
        let d = dissect(&mut Cursor::new(&buf), &Context::new(&config)).unwrap();
        match d.header {
            Header::Dns(dns) => {
                assert!(dns.flags.is_empty());
                assert_eq!(dns.opcode, 15);
                assert_eq!(dns.op_code(), None);
                assert_eq!(dns.rcode, 15);
                assert_eq!(dns.reply_code(), None);
            }
            _ => panic!("not a dns header"),
        }
    }

    #[test]
    fn over_tcp() {
        let mut buf = vec![0x00, 0x20];
        buf.extend_from_slice(&QUERY);
        let config = Config::default();
        let mut ctx = Context::new(&config);
        ctx.transport = Some(Protocol::TCP);
        let mut cursor = Cursor::new(&buf);
        let d = dissect(&mut cursor, &ctx).unwrap();
        assert_eq!(cursor.offset(), 14);
        assert_eq!(cursor.remaining_len(), 20);
        assert!(matches!(
            d.header,
            Header::Dns(Dns {
                length: Some(32),
                id: 0xe039,
                ..
            })
        ));
    }

    #[test]
    fn over_tcp_bad_length() {
        let mut buf = vec![0x00, 0x04];
        buf.extend_from_slice(&QUERY);
        let config = Config::default();
        let mut ctx = Context::new(&config);
        ctx.transport = Some(Protocol::TCP);
        let result = dissect(&mut Cursor::new(&buf), &ctx);
        assert!(matches!(result, Err(Error::Malformed(_))));
    }

    #[test]
    fn truncated() {
        let config = Config::default();
        let result = dissect(&mut Cursor::new(&QUERY[..11]), &Context::new(&config));
        assert!(matches!(result, Err(Error::Truncated)));
    }
}
