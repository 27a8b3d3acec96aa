pub mod decoder;

pub use decoder::{DecodeError, DecodedAnswer, DecodedMessage, DecodedQuestion, DnsDecoder};
