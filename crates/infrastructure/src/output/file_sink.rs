use super::format::format_entry;
use ferrous_pdns_application::ports::PdnsSink;
use ferrous_pdns_domain::config::OutputFormat;
use ferrous_pdns_domain::{DomainError, PdnsEntry};
use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use tracing::info;

const STDOUT_PATH: &str = "-";

/// Line-oriented sink over a file (opened for append) or stdout.
pub struct FileSink {
    writer: BufWriter<Box<dyn Write + Send>>,
    format: OutputFormat,
    label: String,
}

impl FileSink {
    pub fn open(path: &str, format: OutputFormat) -> Result<Self, DomainError> {
        if path == STDOUT_PATH {
            return Ok(Self::from_writer(Box::new(io::stdout()), format, "stdout"));
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| DomainError::OutputError(format!("Failed to open {}: {}", path, e)))?;

        info!(path = %path, format = ?format, "Output log opened");
        Ok(Self::from_writer(Box::new(file), format, path))
    }

    pub fn from_writer(writer: Box<dyn Write + Send>, format: OutputFormat, label: &str) -> Self {
        Self {
            writer: BufWriter::new(writer),
            format,
            label: label.to_string(),
        }
    }
}

impl PdnsSink for FileSink {
    fn emit(&mut self, entry: &PdnsEntry) -> Result<(), DomainError> {
        let line = format_entry(entry, self.format)?;
        writeln!(self.writer, "{}", line).map_err(|e| {
            DomainError::OutputError(format!("Failed to write to {}: {}", self.label, e))
        })
    }

    fn flush(&mut self) -> Result<(), DomainError> {
        self.writer.flush().map_err(|e| {
            DomainError::OutputError(format!("Failed to flush {}: {}", self.label, e))
        })
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}
