use super::file_sink::FileSink;
use ferrous_pdns_application::ports::PdnsSink;
use ferrous_pdns_domain::config::OutputConfig;
use ferrous_pdns_domain::{DomainError, PdnsEntry};

/// Answer sink plus an optional dedicated sink for error-code lines.
pub struct PdnsOutput {
    answers: Box<dyn PdnsSink>,
    errors: Option<Box<dyn PdnsSink>>,
}

impl PdnsOutput {
    pub fn new(answers: Box<dyn PdnsSink>, errors: Option<Box<dyn PdnsSink>>) -> Self {
        Self { answers, errors }
    }

    pub fn single(sink: Box<dyn PdnsSink>) -> Self {
        Self::new(sink, None)
    }

    pub fn emit(&mut self, entry: &PdnsEntry) -> Result<(), DomainError> {
        match (&mut self.errors, entry.is_error()) {
            (Some(errors), true) => errors.emit(entry),
            _ => self.answers.emit(entry),
        }
    }

    pub fn flush(&mut self) -> Result<(), DomainError> {
        self.answers.flush()?;
        if let Some(errors) = &mut self.errors {
            errors.flush()?;
        }
        Ok(())
    }
}

/// Opens the configured answer and error logs. An error log pointing at the
/// same path as the answer log shares its sink.
pub fn open_outputs(config: &OutputConfig) -> Result<PdnsOutput, DomainError> {
    let answers = FileSink::open(&config.log_file, config.format)?;
    let errors = match &config.error_log_file {
        Some(path) if *path != config.log_file => {
            Some(Box::new(FileSink::open(path, config.format)?) as Box<dyn PdnsSink>)
        }
        _ => None,
    };
    Ok(PdnsOutput::new(Box::new(answers), errors))
}
