use compact_str::CompactString;
use ferrous_pdns_domain::{DnsClass, RecordType};
use hickory_proto::op::{Message, MessageType};
use hickory_proto::rr::RData;
use thiserror::Error;
use tracing::trace;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Empty DNS payload")]
    Empty,

    #[error("Failed to parse DNS message: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedQuestion {
    /// Owner name as it appeared on the wire (case preserved, trailing dot).
    pub name: CompactString,
    pub qtype: u16,
    pub type_name: CompactString,
    pub qclass: DnsClass,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAnswer {
    pub name: CompactString,
    pub rtype: u16,
    pub class: DnsClass,
    pub ttl: u32,
    /// Presentation-format rdata.
    pub rdata: String,
}

impl DecodedAnswer {
    pub fn record_type(&self) -> Option<RecordType> {
        RecordType::from_u16(self.rtype)
    }
}

/// The subset of a DNS message the passive cache consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMessage {
    pub id: u16,
    pub is_response: bool,
    pub truncated: bool,
    pub rcode: u16,
    pub question: Option<DecodedQuestion>,
    pub answers: Vec<DecodedAnswer>,
}

pub struct DnsDecoder;

impl DnsDecoder {
    pub fn decode(payload: &[u8]) -> Result<DecodedMessage, DecodeError> {
        if payload.is_empty() {
            return Err(DecodeError::Empty);
        }

        let message =
            Message::from_vec(payload).map_err(|e| DecodeError::Malformed(e.to_string()))?;

        let question = message.queries().first().map(|query| {
            let qtype = u16::from(query.query_type());
            DecodedQuestion {
                name: CompactString::from(query.name().to_ascii()),
                qtype,
                type_name: type_mnemonic(qtype, || query.query_type().to_string()),
                qclass: DnsClass(u16::from(query.query_class())),
            }
        });

        let answers: Vec<DecodedAnswer> = message
            .answers()
            .iter()
            .map(|record| DecodedAnswer {
                name: CompactString::from(record.name().to_ascii()),
                rtype: u16::from(record.record_type()),
                class: DnsClass(u16::from(record.dns_class())),
                ttl: record.ttl(),
                rdata: render_rdata(record.data()),
            })
            .collect();

        let decoded = DecodedMessage {
            id: message.id(),
            is_response: message.message_type() == MessageType::Response,
            truncated: message.truncated(),
            rcode: u16::from(message.response_code()),
            question,
            answers,
        };

        trace!(
            id = decoded.id,
            response = decoded.is_response,
            rcode = decoded.rcode,
            answers = decoded.answers.len(),
            "DNS message decoded"
        );

        Ok(decoded)
    }
}

/// Presentation-format rdata with embedded names kept in their ASCII (punycode)
/// wire form, so a CNAME target keys the same way as a question name.
fn render_rdata(data: &RData) -> String {
    match data {
        RData::CNAME(name) => name.0.to_ascii(),
        RData::NS(name) => name.0.to_ascii(),
        RData::PTR(name) => name.0.to_ascii(),
        RData::ANAME(name) => name.0.to_ascii(),
        RData::MX(mx) => format!("{} {}", mx.preference(), mx.exchange().to_ascii()),
        RData::SRV(srv) => format!(
            "{} {} {} {}",
            srv.priority(),
            srv.weight(),
            srv.port(),
            srv.target().to_ascii()
        ),
        other => other.to_string(),
    }
}

/// Mnemonic for a record type code; types outside the tracked set fall back
/// to the wire library's rendering.
pub fn type_mnemonic(code: u16, fallback: impl FnOnce() -> String) -> CompactString {
    match RecordType::from_u16(code) {
        Some(record_type) => CompactString::from(record_type.as_str()),
        None => CompactString::from(fallback()),
    }
}
