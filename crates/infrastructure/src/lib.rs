pub mod capture;
pub mod defrag;
pub mod dns;
pub mod flow;
pub mod output;
pub mod packet;
pub mod pdns;
pub mod pipeline;
