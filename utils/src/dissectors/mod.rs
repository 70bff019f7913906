use std::fmt::{Display, Formatter};
use std::ops::Range;
use std::path::Path;

use nom::error::{ErrorKind, ParseError};
use serde::Serialize;

use pktscope_api as api;
use api::config::Config;
use api::packet::{Frame, Protocol, Status, Validation};

use crate::checksum::IpPair;

pub mod application;
mod etype;
pub mod link;
pub mod network;
pub mod reader;
pub mod transport;
pub mod vendor;

pub use etype::EtherType;
pub use network::IpProto;
use reader::Cursor;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// Fewer bytes remain than the header needs
    Truncated,
    /// A structural invariant of the header does not hold
    Malformed(&'static str),
    Nom(ErrorKind),
}

impl Error {
    /// Terminal status for a dissection that failed while decoding `protocol`
    pub fn into_status(self, protocol: Protocol) -> Status {
        match self {
            Error::Truncated => Status::Truncated { protocol },
            Error::Malformed(reason) => Status::Malformed { protocol, reason },
            Error::Nom(_) => Status::Malformed {
                protocol,
                reason: "Unexpected parser error",
            },
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Truncated => write!(f, "Truncated packet"),
            Error::Malformed(s) => write!(f, "{}", s),
            Error::Nom(kind) => write!(f, "Nom parse error: {}", kind.description()),
        }
    }
}

impl<I> ParseError<I> for Error {
    fn from_error_kind(_: I, kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Eof => Error::Truncated,
            kind => Error::Nom(kind),
        }
    }

    fn append(_: I, _: ErrorKind, other: Self) -> Self {
        other
    }
}

impl std::error::Error for Error {}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
/// Decoded header of a single layer
pub enum Header<'a> {
    Ethernet(link::ethernet::Ethernet),
    Vlan(network::vlan::Vlan),
    Arp(link::arp::Arp<'a>),
    Ipv4(network::ipv4::Ipv4<'a>),
    Ipv6(network::ipv6::Ipv6),
    Ipv6Extension(network::ipv6::Ipv6Extension<'a>),
    Icmpv4(network::icmp::Icmpv4),
    Icmpv6(network::icmpv6::Icmpv6),
    Igmp(network::igmp::Igmp<'a>),
    Tcp(transport::tcp::Tcp<'a>),
    Udp(transport::udp::Udp),
    Dns(application::dns::Dns),
    HomePlugAv(vendor::homeplug::HomePlugAv),
    HomePlug(vendor::homeplug::HomePlug),
    Lltd(vendor::lltd::Lltd),
    Profinet(vendor::profinet::Profinet),
    Ieee1905(vendor::ieee1905::Ieee1905),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
/// What follows a decoded header
pub enum Next {
    Protocol(Protocol),
    /// Protocol identifier with no registered dissector
    Unknown(u32),
    /// Recognized encoding that is deliberately not decoded
    Unsupported(&'static str),
    /// Nothing to decode, the rest is opaque payload
    End,
}

#[derive(Clone, Debug, PartialEq)]
/// Result of a single protocol dissector
pub struct Dissected<'a> {
    pub header: Header<'a>,
    pub next: Next,
    pub checksum: Validation,
    pub length: Validation,
}

impl<'a> Dissected<'a> {
    pub fn new(header: Header<'a>, next: Next) -> Self {
        Self {
            header,
            next,
            checksum: Validation::Unchecked,
            length: Validation::Unchecked,
        }
    }

    pub fn with_checksum(mut self, checksum: Validation) -> Self {
        self.checksum = checksum;
        self
    }

    pub fn with_length(mut self, length: Validation) -> Self {
        self.length = length;
        self
    }
}

/// Facts about enclosing layers that inner dissectors depend on
#[derive(Clone, Debug)]
pub struct Context<'c> {
    pub config: &'c Config,
    /// Addresses of the innermost IP header, for pseudo header checksums
    pub addrs: Option<IpPair>,
    /// The innermost IP datagram is a fragment
    pub fragmented: bool,
    /// Protocol number that selected the current IPv6 extension header
    pub ipv6_next_header: Option<u8>,
    pub transport: Option<Protocol>,
}

impl<'c> Context<'c> {
    pub fn new(config: &'c Config) -> Self {
        Self {
            config,
            addrs: None,
            fragmented: false,
            ipv6_next_header: None,
            transport: None,
        }
    }

    /// Whether upper layer checksums can and should be verified
    #[inline]
    pub fn verify_upper(&self) -> bool {
        self.config.verify_checksums && !self.fragmented
    }

    /// Verify an upper layer checksum that covers a pseudo header
    pub fn verify_pseudo(&self, ip_proto: u8, segment: &[u8]) -> Validation {
        match &self.addrs {
            Some(addrs) if self.verify_upper() => Validation::from_check(
                crate::checksum::verify_with_pseudo_header(addrs, ip_proto, segment),
            ),
            _ => Validation::Unchecked,
        }
    }

    /// Verify a checksum that covers exactly `region`
    pub fn verify_region(&self, region: &[u8]) -> Validation {
        if self.verify_upper() {
            Validation::from_check(crate::checksum::verify(region))
        } else {
            Validation::Unchecked
        }
    }

    fn update(&mut self, header: &Header) {
        match header {
            Header::Ipv4(ip) => {
                self.addrs = Some(IpPair::V4 {
                    src: ip.src,
                    dst: ip.dst,
                });
                self.fragmented = ip.more_fragments() || ip.fragment_offset != 0;
                self.ipv6_next_header = None;
            }
            Header::Ipv6(ip) => {
                self.addrs = Some(IpPair::V6 {
                    src: ip.src,
                    dst: ip.dst,
                });
                self.fragmented = false;
                self.ipv6_next_header = Some(ip.next_header);
            }
            Header::Ipv6Extension(ext) => {
                if ext.fragment.is_some() {
                    self.fragmented = true;
                }
                self.ipv6_next_header = Some(ext.next_header);
            }
            Header::Tcp(_) => self.transport = Some(Protocol::TCP),
            Header::Udp(_) => self.transport = Some(Protocol::UDP),
            _ => {}
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
/// A decoded header together with where it sits in the frame and what its checks said
pub struct Layer<'a> {
    pub protocol: Protocol,
    /// Header bytes within the frame
    pub range: Range<usize>,
    pub header: Header<'a>,
    pub checksum: Validation,
    pub length: Validation,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Dissection<'a> {
    /// Decoded layers, outermost first
    pub layers: Vec<Layer<'a>>,
    /// Bytes after the last decoded header
    pub payload: &'a [u8],
    pub status: Status,
    /// The capture source cut the frame short of its on-wire length
    pub truncated: bool,
}

impl<'a> Dissection<'a> {
    /// First layer of the given protocol
    pub fn layer(&self, protocol: Protocol) -> Option<&Layer<'a>> {
        self.layers.iter().find(|l| l.protocol == protocol)
    }

    #[inline]
    pub fn protocols(&self) -> Vec<Protocol> {
        self.layers.iter().map(|l| l.protocol).collect()
    }

    /// Any layer whose checksum or length check failed
    pub fn has_mismatch(&self) -> bool {
        self.layers
            .iter()
            .any(|l| l.checksum.is_mismatch() || l.length.is_mismatch())
    }
}

/// Stateless protocol dissector, safe to share between threads
#[derive(Clone, Debug, Default)]
pub struct Dissector {
    config: Config,
}

impl Dissector {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn from_config_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Ok(Self::new(Config::from_file(path)?))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Dissect a single link layer frame, starting from its Ethernet header
    pub fn dissect<'a>(&self, frame: &Frame<'a>) -> Dissection<'a> {
        let mut ctx = Context::new(&self.config);
        let mut dissection = Dissection {
            layers: Vec::with_capacity(4),
            payload: frame.raw(),
            status: Status::Complete,
            truncated: frame.is_truncated(),
        };

        let mut consumed = 0;
        let mut data = frame.raw();
        let mut protocol = Protocol::ETHERNET;

        loop {
            if dissection.layers.len() >= self.config.max_layers as usize {
                dissection.status = Status::Malformed {
                    protocol,
                    reason: "Too many protocol layers",
                };
                break;
            }

            let mut cursor = Cursor::new(data);
            let dissected = match dissect_layer(protocol, &mut cursor, &ctx) {
                Ok(d) => d,
                Err(e) => {
                    log::debug!(
                        "{} dissection stopped at offset {}: {}",
                        protocol,
                        consumed,
                        e
                    );
                    dissection.status = e.into_status(protocol);
                    break;
                }
            };

            let len = cursor.offset();
            log::trace!("{} header at {}..{}", protocol, consumed, consumed + len);
            ctx.update(&dissected.header);
            dissection.layers.push(Layer {
                protocol,
                range: consumed..consumed + len,
                header: dissected.header,
                checksum: dissected.checksum,
                length: dissected.length,
            });
            consumed += len;
            data = cursor.remaining();
            dissection.payload = data;

            match dissected.next {
                Next::Protocol(p) => protocol = p,
                Next::End => break,
                Next::Unknown(id) => {
                    log::debug!("{} carries unknown protocol {:#x}", protocol, id);
                    dissection.status = Status::UnknownProtocol { protocol, id };
                    break;
                }
                Next::Unsupported(reason) => {
                    dissection.status = Status::Unsupported { protocol, reason };
                    break;
                }
            }
        }

        dissection
    }
}

/// Closed dispatch table, one dissector per protocol
fn dissect_layer<'a>(
    protocol: Protocol,
    cursor: &mut Cursor<'a>,
    ctx: &Context,
) -> Result<Dissected<'a>, Error> {
    match protocol {
        Protocol::ETHERNET => link::ethernet::dissect(cursor, ctx),
        Protocol::VLAN => network::vlan::dissect(cursor, ctx),
        Protocol::ARP => link::arp::dissect(cursor, ctx),
        Protocol::HOMEPLUG => vendor::homeplug::dissect_legacy(cursor, ctx),
        Protocol::HOMEPLUG_AV => vendor::homeplug::dissect(cursor, ctx),
        Protocol::LLTD => vendor::lltd::dissect(cursor, ctx),
        Protocol::PROFINET => vendor::profinet::dissect(cursor, ctx),
        Protocol::IEEE_1905 => vendor::ieee1905::dissect(cursor, ctx),
        Protocol::IPV4 => network::ipv4::dissect(cursor, ctx),
        Protocol::IPV6 => network::ipv6::dissect(cursor, ctx),
        Protocol::IPV6_EXT => network::ipv6::dissect_extension(cursor, ctx),
        Protocol::ICMP => network::icmp::dissect(cursor, ctx),
        Protocol::ICMPV6 => network::icmpv6::dissect(cursor, ctx),
        Protocol::IGMP => network::igmp::dissect(cursor, ctx),
        Protocol::TCP => transport::tcp::dissect(cursor, ctx),
        Protocol::UDP => transport::udp::dissect(cursor, ctx),
        Protocol::DNS => application::dns::dissect(cursor, ctx),
        Protocol::UNKNOWN => Err(Error::Malformed("No dissector for unknown protocol")),
    }
}

/// Port based dispatch shared by TCP and UDP
pub(crate) fn next_by_port(ctx: &Context, src_port: u16, dst_port: u16, payload: &[u8]) -> Next {
    if !payload.is_empty() && (ctx.config.is_dns_port(src_port) || ctx.config.is_dns_port(dst_port))
    {
        Next::Protocol(Protocol::DNS)
    } else {
        Next::End
    }
}
