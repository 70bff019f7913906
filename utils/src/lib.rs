#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate enum_primitive_derive;
#[macro_use]
extern crate strum;

pub mod checksum;
pub mod dissectors;

pub use dissectors::{Dissection, Dissector};
