use super::{next_by_port, Context, Dissected, Error, Header, IpProto};

pub mod tcp;
pub mod udp;
