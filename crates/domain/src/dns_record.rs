pub mod dns_class;
pub mod error_code;
pub mod filter;
pub mod record_type;

pub use dns_class::DnsClass;
pub use error_code::ErrorCode;
pub use filter::{ErrorCodeFilter, RecordTypeFilter};
pub use record_type::RecordType;
