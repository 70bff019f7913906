use num_traits::FromPrimitive;

use super::{Next, Protocol};

#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Primitive)]
#[allow(non_camel_case_types)]
pub enum IpProto {
    /// IPv6 hop-by-hop options
    HOPOPT = 0,
    ICMP = 1,
    IGMP = 2,
    /// IPv4 encapsulation
    IPV4 = 4,
    TCP = 6,
    UDP = 17,
    /// IPv6 encapsulation
    IPV6 = 41,
    ROUTING = 43,
    FRAGMENT = 44,
    ICMPV6 = 58,
    /// IPv6 no next header
    NONE = 59,
    DSTOPTS = 60,
}

impl IpProto {
    /// IPv6 extension headers, only valid as the next header of IPv6 or another extension
    #[inline]
    pub fn is_ipv6_extension(&self) -> bool {
        matches!(
            self,
            IpProto::HOPOPT | IpProto::ROUTING | IpProto::FRAGMENT | IpProto::DSTOPTS
        )
    }
}

/// Protocol selected by an IPv4 protocol or IPv6 next header field
pub fn next_protocol(proto: u8, ipv6: bool) -> Next {
    let ip_proto = match IpProto::from_u8(proto) {
        Some(p) => p,
        None => return Next::Unknown(proto as u32),
    };

    match ip_proto {
        IpProto::ICMP => Next::Protocol(Protocol::ICMP),
        IpProto::IGMP => Next::Protocol(Protocol::IGMP),
        IpProto::IPV4 => Next::Protocol(Protocol::IPV4),
        IpProto::TCP => Next::Protocol(Protocol::TCP),
        IpProto::UDP => Next::Protocol(Protocol::UDP),
        IpProto::IPV6 => Next::Protocol(Protocol::IPV6),
        IpProto::ICMPV6 => Next::Protocol(Protocol::ICMPV6),
        IpProto::NONE if ipv6 => Next::End,
        p if ipv6 && p.is_ipv6_extension() => Next::Protocol(Protocol::IPV6_EXT),
        _ => Next::Unknown(proto as u32),
    }
}
