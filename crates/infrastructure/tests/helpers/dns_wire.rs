use std::net::{Ipv4Addr, Ipv6Addr};

pub const TYPE_A: u16 = 1;
pub const TYPE_CNAME: u16 = 5;
pub const TYPE_MX: u16 = 15;
pub const TYPE_AAAA: u16 = 28;
pub const CLASS_IN: u16 = 1;

pub const RCODE_SERVFAIL: u16 = 2;
pub const RCODE_NXDOMAIN: u16 = 3;

const FLAG_QR: u16 = 0x8000;
const FLAG_TC: u16 = 0x0200;
const FLAG_RD: u16 = 0x0100;
const FLAG_RA: u16 = 0x0080;

pub fn encode_name(name: &str) -> Vec<u8> {
    let mut out = Vec::new();
    for label in name.split('.').filter(|label| !label.is_empty()) {
        out.push(label.len() as u8);
        out.extend_from_slice(label.as_bytes());
    }
    out.push(0x00); // root label
    out
}

/// One answer resource record with raw rdata.
#[derive(Clone)]
pub struct WireAnswer {
    pub name: String,
    pub rtype: u16,
    pub ttl: u32,
    pub rdata: Vec<u8>,
}

pub fn a_record(name: &str, ttl: u32, addr: Ipv4Addr) -> WireAnswer {
    WireAnswer {
        name: name.to_string(),
        rtype: TYPE_A,
        ttl,
        rdata: addr.octets().to_vec(),
    }
}

pub fn aaaa_record(name: &str, ttl: u32, addr: Ipv6Addr) -> WireAnswer {
    WireAnswer {
        name: name.to_string(),
        rtype: TYPE_AAAA,
        ttl,
        rdata: addr.octets().to_vec(),
    }
}

pub fn cname_record(name: &str, ttl: u32, target: &str) -> WireAnswer {
    WireAnswer {
        name: name.to_string(),
        rtype: TYPE_CNAME,
        ttl,
        rdata: encode_name(target),
    }
}

pub fn mx_record(name: &str, ttl: u32, preference: u16, exchange: &str) -> WireAnswer {
    let mut rdata = preference.to_be_bytes().to_vec();
    rdata.extend_from_slice(&encode_name(exchange));
    WireAnswer {
        name: name.to_string(),
        rtype: TYPE_MX,
        ttl,
        rdata,
    }
}

fn header(id: u16, flags: u16, qdcount: u16, ancount: u16) -> Vec<u8> {
    let mut buf = Vec::with_capacity(12);
    buf.extend_from_slice(&id.to_be_bytes());
    buf.extend_from_slice(&flags.to_be_bytes());
    buf.extend_from_slice(&qdcount.to_be_bytes());
    buf.extend_from_slice(&ancount.to_be_bytes());
    buf.extend_from_slice(&[0x00, 0x00]); // NSCOUNT
    buf.extend_from_slice(&[0x00, 0x00]); // ARCOUNT
    buf
}

fn question(buf: &mut Vec<u8>, name: &str, qtype: u16) {
    buf.extend_from_slice(&encode_name(name));
    buf.extend_from_slice(&qtype.to_be_bytes());
    buf.extend_from_slice(&CLASS_IN.to_be_bytes());
}

pub fn build_query(id: u16, name: &str, qtype: u16) -> Vec<u8> {
    let mut buf = header(id, FLAG_RD, 1, 0);
    question(&mut buf, name, qtype);
    buf
}

fn build_response_with_flags(
    id: u16,
    name: &str,
    qtype: u16,
    extra_flags: u16,
    rcode: u16,
    answers: &[WireAnswer],
) -> Vec<u8> {
    let flags = FLAG_QR | FLAG_RD | FLAG_RA | extra_flags | (rcode & 0x000f);
    let mut buf = header(id, flags, 1, answers.len() as u16);
    question(&mut buf, name, qtype);
    for answer in answers {
        buf.extend_from_slice(&encode_name(&answer.name));
        buf.extend_from_slice(&answer.rtype.to_be_bytes());
        buf.extend_from_slice(&CLASS_IN.to_be_bytes());
        buf.extend_from_slice(&answer.ttl.to_be_bytes());
        buf.extend_from_slice(&(answer.rdata.len() as u16).to_be_bytes());
        buf.extend_from_slice(&answer.rdata);
    }
    buf
}

pub fn build_response(id: u16, name: &str, qtype: u16, answers: &[WireAnswer]) -> Vec<u8> {
    build_response_with_flags(id, name, qtype, 0, 0, answers)
}

pub fn build_error_response(id: u16, name: &str, qtype: u16, rcode: u16) -> Vec<u8> {
    build_response_with_flags(id, name, qtype, 0, rcode, &[])
}

pub fn build_truncated_response(id: u16, name: &str, qtype: u16) -> Vec<u8> {
    build_response_with_flags(id, name, qtype, FLAG_TC, 0, &[])
}
