use std::fmt;

/// Non-zero DNS response codes that can be logged as error observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    FormErr,
    ServFail,
    NxDomain,
    NotImp,
    Refused,
    YxDomain,
    YxRrSet,
    NxRrSet,
    NotAuth,
    NotZone,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 10] = [
        ErrorCode::FormErr,
        ErrorCode::ServFail,
        ErrorCode::NxDomain,
        ErrorCode::NotImp,
        ErrorCode::Refused,
        ErrorCode::YxDomain,
        ErrorCode::YxRrSet,
        ErrorCode::NxRrSet,
        ErrorCode::NotAuth,
        ErrorCode::NotZone,
    ];

    pub fn from_rcode(rcode: u16) -> Option<Self> {
        match rcode {
            1 => Some(ErrorCode::FormErr),
            2 => Some(ErrorCode::ServFail),
            3 => Some(ErrorCode::NxDomain),
            4 => Some(ErrorCode::NotImp),
            5 => Some(ErrorCode::Refused),
            6 => Some(ErrorCode::YxDomain),
            7 => Some(ErrorCode::YxRrSet),
            8 => Some(ErrorCode::NxRrSet),
            9 => Some(ErrorCode::NotAuth),
            10 => Some(ErrorCode::NotZone),
            _ => None,
        }
    }

    pub fn mnemonic(&self) -> &'static str {
        match self {
            ErrorCode::FormErr => "FORMERR",
            ErrorCode::ServFail => "SERVFAIL",
            ErrorCode::NxDomain => "NXDOMAIN",
            ErrorCode::NotImp => "NOTIMPL",
            ErrorCode::Refused => "REFUSED",
            ErrorCode::YxDomain => "YXDOMAIN",
            ErrorCode::YxRrSet => "YXRRSET",
            ErrorCode::NxRrSet => "NXRRSET",
            ErrorCode::NotAuth => "NOTAUTH",
            ErrorCode::NotZone => "NOTZONE",
        }
    }

    pub fn flag(&self) -> char {
        match self {
            ErrorCode::FormErr => 'f',
            ErrorCode::ServFail => 's',
            ErrorCode::NxDomain => 'x',
            ErrorCode::NotImp => 'o',
            ErrorCode::Refused => 'r',
            ErrorCode::YxDomain => 'y',
            ErrorCode::YxRrSet => 'e',
            ErrorCode::NxRrSet => 't',
            ErrorCode::NotAuth => 'a',
            ErrorCode::NotZone => 'z',
        }
    }

    pub fn from_flag(flag: char) -> Option<Self> {
        Self::ALL.iter().copied().find(|code| code.flag() == flag)
    }

    pub(crate) fn bit(&self) -> u32 {
        1 << (*self as u32)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
