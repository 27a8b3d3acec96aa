//! Ferrous PDNS Application Layer
pub mod ports;
