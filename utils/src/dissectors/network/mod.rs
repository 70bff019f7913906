use super::{Context, Dissected, Error, Header, Next, Protocol};

pub mod icmp;
pub mod icmpv6;
pub mod igmp;
pub mod ip_proto;
pub mod ipv4;
pub mod ipv6;
pub mod vlan;

pub use ip_proto::IpProto;
