use serde::Serialize;

use super::{Context, Dissected, Error, Header, Next};
use crate::dissectors::reader::Cursor;

pub const HEADER_LEN: usize = 8;
/// IGMPv3 queries carry at least resv/S/QRV, QQIC and the source count
const V3_QUERY_MIN_LEN: usize = 12;

pub const TYPE_MEMBERSHIP_QUERY: u8 = 0x11;
pub const TYPE_V1_REPORT: u8 = 0x12;
pub const TYPE_V2_REPORT: u8 = 0x16;
pub const TYPE_V2_LEAVE: u8 = 0x17;
pub const TYPE_V3_REPORT: u8 = 0x22;

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgmpMessage<'a> {
    Query {
        group: [u8; 4],
    },
    QueryV3 {
        group: [u8; 4],
        /// Suppress router-side processing: `(byte & 0x08) >> 3`
        suppress: bool,
        /// Querier's robustness variable: `byte & 0x07`
        qrv: u8,
        qqic: u8,
        source_count: u16,
        sources: &'a [u8],
    },
    /// v1/v2 report and v2 leave
    Group {
        group: [u8; 4],
    },
    ReportV3 {
        record_count: u16,
        /// Group records, opaque
        records: &'a [u8],
    },
    Other(u32),
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Igmp<'a> {
    pub igmp_type: u8,
    pub max_resp_code: u8,
    pub checksum: u16,
    /// Protocol version implied by type, code and length, 0 if unknown
    pub version: u8,
    pub message: IgmpMessage<'a>,
}

impl<'a> Igmp<'a> {
    /// Source addresses of an IGMPv3 query
    pub fn sources(&self) -> impl Iterator<Item = [u8; 4]> + 'a {
        let sources: &'a [u8] = match self.message {
            IgmpMessage::QueryV3 { sources, .. } => sources,
            _ => &[],
        };
        sources
            .chunks_exact(4)
            .map(|c| [c[0], c[1], c[2], c[3]])
    }
}

pub fn dissect<'a>(cursor: &mut Cursor<'a>, ctx: &Context) -> Result<Dissected<'a>, Error> {
    if cursor.remaining_len() < HEADER_LEN {
        return Err(Error::Truncated);
    }
    let message_bytes = cursor.remaining();

    let igmp_type = cursor.u8()?;
    let max_resp_code = cursor.u8()?;
    let checksum = cursor.be_u16()?;

    let (version, message) = match igmp_type {
        TYPE_MEMBERSHIP_QUERY => {
            let group = cursor.array()?;
            if message_bytes.len() >= V3_QUERY_MIN_LEN {
                let flags = cursor.u8()?;
                let qqic = cursor.u8()?;
                let source_count = cursor.be_u16()?;
                let sources = cursor.bytes(source_count as usize * 4)?;
                let message = IgmpMessage::QueryV3 {
                    group,
                    suppress: (flags & 0x08) >> 3 == 1,
                    qrv: flags & 0x07,
                    qqic,
                    source_count,
                    sources,
                };
                (3, message)
            } else if max_resp_code == 0 {
                (1, IgmpMessage::Query { group })
            } else {
                (2, IgmpMessage::Query { group })
            }
        }
        TYPE_V1_REPORT => (1, IgmpMessage::Group { group: cursor.array()? }),
        TYPE_V2_REPORT | TYPE_V2_LEAVE => (2, IgmpMessage::Group { group: cursor.array()? }),
        TYPE_V3_REPORT => {
            cursor.skip(2)?;
            let record_count = cursor.be_u16()?;
            let records = cursor.remaining();
            cursor.skip(records.len())?;
            (
                3,
                IgmpMessage::ReportV3 {
                    record_count,
                    records,
                },
            )
        }
        _ => (0, IgmpMessage::Other(cursor.be_u32()?)),
    };

    let igmp = Igmp {
        igmp_type,
        max_resp_code,
        checksum,
        version,
        message,
    };

    Ok(Dissected::new(Header::Igmp(igmp), Next::End)
        .with_checksum(ctx.verify_region(message_bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pktscope_api::config::Config;
    use pktscope_api::packet::Validation;

    fn with_checksum(mut buf: Vec<u8>) -> Vec<u8> {
        let csum = crate::checksum::checksum(&buf);
        buf[2..4].copy_from_slice(&csum.to_be_bytes());
        buf
    }

    fn run(buf: &[u8]) -> Dissected<'_> {
        let config = Config::default();
        dissect(&mut Cursor::new(buf), &Context::new(&config)).unwrap()
    }

    #[test]
    fn general_query_versions() {
        let v1 = with_checksum(vec![0x11, 0x00, 0x00, 0x00, 0, 0, 0, 0]);
        let d = run(&v1);
        assert_eq!(d.checksum, Validation::Ok);
        assert!(matches!(d.header, Header::Igmp(Igmp { version: 1, .. })));

        let v2 = with_checksum(vec![0x11, 0x64, 0x00, 0x00, 0, 0, 0, 0]);
        assert!(matches!(run(&v2).header, Header::Igmp(Igmp { version: 2, .. })));
    }

    #[test]
    fn v3_query_with_sources() {
        let buf = with_checksum(vec![
            0x11, 0x64, 0x00, 0x00, 0xe0, 0x00, 0x00, 0xfb, 0x0a, 0x7d, 0x00, 0x02, 0x0a, 0x00,
            0x00, 0x01, 0x0a, 0x00, 0x00, 0x02,
        ]);
        let d = run(&buf);
        assert_eq!(d.checksum, Validation::Ok);
        match d.header {
            Header::Igmp(igmp) => {
                assert_eq!(igmp.version, 3);
                let sources: Vec<_> = igmp.sources().collect();
                assert_eq!(sources, vec![[10, 0, 0, 1], [10, 0, 0, 2]]);
                match igmp.message {
                    IgmpMessage::QueryV3 {
                        group,
                        suppress,
                        qrv,
                        qqic,
                        source_count,
                        ..
                    } => {
                        assert_eq!(group, [224, 0, 0, 251]);
                        assert!(suppress);
                        assert_eq!(qrv, 2);
                        assert_eq!(qqic, 125);
                        assert_eq!(source_count, 2);
                    }
                    _ => panic!("not a v3 query"),
                }
            }
            _ => panic!("not an igmp header"),
        }
    }

    #[test]
    fn v3_query_sources_truncated() {
        let buf = [
            0x11, 0x64, 0x00, 0x00, 0xe0, 0x00, 0x00, 0xfb, 0x02, 0x7d, 0x00, 0x03, 0x0a, 0x00,
            0x00, 0x01,
        ];
        let config = Config::default();
        let result = dissect(&mut Cursor::new(&buf), &Context::new(&config));
        assert!(matches!(result, Err(Error::Truncated)));
    }

    #[test]
    fn reports_and_leave() {
        let buf = [0x16, 0x00, 0x00, 0x00, 0xef, 0xff, 0xff, 0xfa];
        let d = run(&buf);
        assert_eq!(d.checksum, Validation::Mismatch);
        assert!(matches!(
            d.header,
            Header::Igmp(Igmp {
                version: 2,
                message: IgmpMessage::Group {
                    group: [239, 255, 255, 250]
                },
                ..
            })
        ));

        let buf = [0x17, 0x00, 0x00, 0x00, 0xef, 0xff, 0xff, 0xfa];
        assert!(matches!(run(&buf).header, Header::Igmp(Igmp { version: 2, .. })));

        let buf = [0x12, 0x00, 0x00, 0x00, 0xef, 0xff, 0xff, 0xfa];
        assert!(matches!(run(&buf).header, Header::Igmp(Igmp { version: 1, .. })));
    }

    #[test]
    fn v3_report() {
        let buf = [
            0x22, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x04, 0x00, 0x00, 0x00, 0xe0, 0x00,
            0x00, 0xfb,
        ];
        let config = Config::default();
        let mut cursor = Cursor::new(&buf);
        let d = dissect(&mut cursor, &Context::new(&config)).unwrap();
        assert_eq!(cursor.remaining_len(), 0);
        match d.header {
            Header::Igmp(Igmp {
                version: 3,
                message:
                    IgmpMessage::ReportV3 {
                        record_count,
                        records,
                    },
                ..
            }) => {
                assert_eq!(record_count, 1);
                assert_eq!(records.len(), 8);
            }
            _ => panic!("not a v3 report"),
        }
    }

    #[test]
    fn unknown_type() {
        let buf = [0x30, 0x00, 0x00, 0x00, 0x01, 0x02, 0x03, 0x04];
        assert!(matches!(
            run(&buf).header,
            Header::Igmp(Igmp {
                version: 0,
                message: IgmpMessage::Other(0x01020304),
                ..
            })
        ));
    }
}
