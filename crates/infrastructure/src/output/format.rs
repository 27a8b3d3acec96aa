use ferrous_pdns_domain::config::OutputFormat;
use ferrous_pdns_domain::{DomainError, PdnsEntry};

pub fn format_entry(entry: &PdnsEntry, format: OutputFormat) -> Result<String, DomainError> {
    match format {
        OutputFormat::Pipe => Ok(entry.to_string()),
        OutputFormat::Json => serde_json::to_string(entry)
            .map_err(|e| DomainError::OutputError(format!("Failed to serialize entry: {}", e))),
    }
}
