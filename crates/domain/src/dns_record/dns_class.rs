use std::fmt;

/// Raw DNS class code with the conventional mnemonic rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DnsClass(pub u16);

impl DnsClass {
    pub const IN: DnsClass = DnsClass(1);

    pub fn code(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for DnsClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            1 => f.write_str("IN"),
            3 => f.write_str("CH"),
            4 => f.write_str("HS"),
            254 => f.write_str("NONE"),
            255 => f.write_str("ANY"),
            other => write!(f, "CLASS{}", other),
        }
    }
}
