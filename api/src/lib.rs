#[macro_use]
extern crate strum;

pub mod config;
pub mod packet;
