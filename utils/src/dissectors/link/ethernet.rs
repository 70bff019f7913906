use serde::Serialize;

use super::{Context, Dissected, Error, Header};
use crate::dissectors::etype;
use crate::dissectors::reader::Cursor;

pub const HEADER_LEN: usize = 14;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Ethernet {
    pub dst: [u8; 6],
    pub src: [u8; 6],
    pub ether_type: u16,
}

impl Ethernet {
    /// Group bit of the destination address
    #[inline]
    pub fn is_multicast(&self) -> bool {
        self.dst[0] & 0x01 != 0
    }

    #[inline]
    pub fn is_broadcast(&self) -> bool {
        self.dst == [0xff; 6]
    }
}

pub fn dissect<'a>(cursor: &mut Cursor<'a>, _: &Context) -> Result<Dissected<'a>, Error> {
    if cursor.remaining_len() < HEADER_LEN {
        return Err(Error::Truncated);
    }

    let dst = cursor.array()?;
    let src = cursor.array()?;
    let ether_type = cursor.be_u16()?;

    Ok(Dissected::new(
        Header::Ethernet(Ethernet {
            dst,
            src,
            ether_type,
        }),
        etype::next_protocol(ether_type),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dissectors::{Next, Protocol};
    use pktscope_api::config::Config;

    #[test]
    fn ok() {
        let buf = [
            0x01, 0x80, 0xc2, 0x00, 0x00, 0x00, 0xcc, 0x04, 0x0d, 0x5c, 0xf0, 0x00, 0x08, 0x00,
        ];
        let config = Config::default();
        let mut cursor = Cursor::new(&buf);
        let d = dissect(&mut cursor, &Context::new(&config)).unwrap();
        assert_eq!(d.next, Next::Protocol(Protocol::IPV4));
        assert_eq!(cursor.offset(), HEADER_LEN);
        match d.header {
            Header::Ethernet(eth) => {
                assert_eq!(eth.dst, [0x01, 0x80, 0xc2, 0x00, 0x00, 0x00]);
                assert_eq!(eth.src, [0xcc, 0x04, 0x0d, 0x5c, 0xf0, 0x00]);
                assert!(eth.is_multicast());
                assert!(!eth.is_broadcast());
            }
            _ => panic!("not an ethernet header"),
        }
    }

    #[test]
    fn pkt_too_short() {
        let buf = [
            0x01, 0x80, 0xc2, 0x00, 0x00, 0x00, 0xcc, 0x04, 0x0d, 0x5c, 0xf0, 0x00,
        ];
        let config = Config::default();
        let mut cursor = Cursor::new(&buf);
        let result = dissect(&mut cursor, &Context::new(&config));
        assert!(matches!(result, Err(Error::Truncated)));
        assert_eq!(cursor.offset(), 0);
    }

    #[test]
    fn unknown_etype() {
        let buf = [
            0x01, 0x80, 0xc2, 0x00, 0x00, 0x00, 0xcc, 0x04, 0x0d, 0x5c, 0xf0, 0x00, 0x88, 0xcc,
        ];
        let config = Config::default();
        let d = dissect(&mut Cursor::new(&buf), &Context::new(&config)).unwrap();
        assert!(matches!(d.next, Next::Unknown(0x88cc)));
    }

    #[test]
    fn llc_length_field() {
        let buf = [
            0x01, 0x80, 0xc2, 0x00, 0x00, 0x00, 0xcc, 0x04, 0x0d, 0x5c, 0xf0, 0x00, 0x00, 0x26,
        ];
        let config = Config::default();
        let d = dissect(&mut Cursor::new(&buf), &Context::new(&config)).unwrap();
        assert!(matches!(d.next, Next::Unsupported(_)));
    }
}
