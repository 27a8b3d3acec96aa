use super::{ErrorCode, RecordType};
use crate::errors::DomainError;

/// Set of record types selected by a flag string such as `46CDNPRS`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordTypeFilter {
    bits: u32,
}

impl RecordTypeFilter {
    pub fn from_flags(flags: &str) -> Result<Self, DomainError> {
        let mut bits = 0;
        for flag in flags.chars().filter(|c| !c.is_whitespace()) {
            let record_type =
                RecordType::from_flag(flag).ok_or(DomainError::InvalidRecordTypeFlag(flag))?;
            bits |= record_type.bit();
        }
        Ok(Self { bits })
    }

    pub fn all() -> Self {
        Self {
            bits: RecordType::ALL.iter().fold(0, |acc, rt| acc | rt.bit()),
        }
    }

    pub fn contains(&self, record_type: RecordType) -> bool {
        self.bits & record_type.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn flags(&self) -> String {
        RecordType::ALL
            .iter()
            .filter(|rt| self.contains(**rt))
            .map(|rt| rt.flag())
            .collect()
    }
}

/// Set of response error codes selected by a flag string such as `xs`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorCodeFilter {
    bits: u32,
}

impl ErrorCodeFilter {
    pub fn from_flags(flags: &str) -> Result<Self, DomainError> {
        let mut bits = 0;
        for flag in flags.chars().filter(|c| !c.is_whitespace()) {
            let code = ErrorCode::from_flag(flag).ok_or(DomainError::InvalidErrorCodeFlag(flag))?;
            bits |= code.bit();
        }
        Ok(Self { bits })
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn contains(&self, code: ErrorCode) -> bool {
        self.bits & code.bit() != 0
    }

    /// Resolves a raw rcode to an enabled error code, if tracked.
    pub fn matches(&self, rcode: u16) -> Option<ErrorCode> {
        ErrorCode::from_rcode(rcode).filter(|code| self.contains(*code))
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn flags(&self) -> String {
        ErrorCode::ALL
            .iter()
            .filter(|code| self.contains(**code))
            .map(|code| code.flag())
            .collect()
    }
}
