use std::fmt;
use std::str::FromStr;

/// Resource-record types a passive sensor can be told to track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    A,
    AAAA,
    CNAME,
    DNAME,
    NAPTR,
    SOA,
    LOC,
    SPF,
    HINFO,
    PTR,
    RP,
    SRV,
    TXT,
    MX,
    NS,
}

impl RecordType {
    pub const ALL: [RecordType; 15] = [
        RecordType::A,
        RecordType::AAAA,
        RecordType::CNAME,
        RecordType::DNAME,
        RecordType::NAPTR,
        RecordType::SOA,
        RecordType::LOC,
        RecordType::SPF,
        RecordType::HINFO,
        RecordType::PTR,
        RecordType::RP,
        RecordType::SRV,
        RecordType::TXT,
        RecordType::MX,
        RecordType::NS,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::AAAA => "AAAA",
            RecordType::CNAME => "CNAME",
            RecordType::DNAME => "DNAME",
            RecordType::NAPTR => "NAPTR",
            RecordType::SOA => "SOA",
            RecordType::LOC => "LOC",
            RecordType::SPF => "SPF",
            RecordType::HINFO => "HINFO",
            RecordType::PTR => "PTR",
            RecordType::RP => "RP",
            RecordType::SRV => "SRV",
            RecordType::TXT => "TXT",
            RecordType::MX => "MX",
            RecordType::NS => "NS",
        }
    }

    pub fn to_u16(&self) -> u16 {
        match self {
            RecordType::A => 1,
            RecordType::NS => 2,
            RecordType::CNAME => 5,
            RecordType::SOA => 6,
            RecordType::PTR => 12,
            RecordType::HINFO => 13,
            RecordType::MX => 15,
            RecordType::TXT => 16,
            RecordType::RP => 17,
            RecordType::AAAA => 28,
            RecordType::LOC => 29,
            RecordType::SRV => 33,
            RecordType::NAPTR => 35,
            RecordType::DNAME => 39,
            RecordType::SPF => 99,
        }
    }

    pub fn from_u16(code: u16) -> Option<Self> {
        match code {
            1 => Some(RecordType::A),
            2 => Some(RecordType::NS),
            5 => Some(RecordType::CNAME),
            6 => Some(RecordType::SOA),
            12 => Some(RecordType::PTR),
            13 => Some(RecordType::HINFO),
            15 => Some(RecordType::MX),
            16 => Some(RecordType::TXT),
            17 => Some(RecordType::RP),
            28 => Some(RecordType::AAAA),
            29 => Some(RecordType::LOC),
            33 => Some(RecordType::SRV),
            35 => Some(RecordType::NAPTR),
            39 => Some(RecordType::DNAME),
            99 => Some(RecordType::SPF),
            _ => None,
        }
    }

    /// Single-character selector used in `--record-types` flag strings.
    pub fn flag(&self) -> char {
        match self {
            RecordType::A => '4',
            RecordType::AAAA => '6',
            RecordType::CNAME => 'C',
            RecordType::DNAME => 'D',
            RecordType::NAPTR => 'N',
            RecordType::SOA => 'O',
            RecordType::LOC => 'L',
            RecordType::SPF => 'F',
            RecordType::HINFO => 'I',
            RecordType::PTR => 'P',
            RecordType::RP => 'R',
            RecordType::SRV => 'S',
            RecordType::TXT => 'T',
            RecordType::MX => 'M',
            RecordType::NS => 'n',
        }
    }

    pub fn from_flag(flag: char) -> Option<Self> {
        Self::ALL.iter().copied().find(|rt| rt.flag() == flag)
    }

    pub(crate) fn bit(&self) -> u32 {
        1 << (*self as u32)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|rt| rt.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown record type: {}", s))
    }
}
