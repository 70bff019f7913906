use super::{Context, Dissected, Error, Header, Next, Protocol};

pub mod dns;
