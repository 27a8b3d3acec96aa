#![allow(dead_code)]

pub mod dns_wire;
pub mod frames;
pub mod sinks;

pub use dns_wire::*;
pub use frames::*;
pub use sinks::*;
