use super::{Context, Dissected, Error, Header, Next};

pub mod arp;
pub mod ethernet;
