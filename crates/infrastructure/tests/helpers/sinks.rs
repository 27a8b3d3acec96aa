use ferrous_pdns_application::ports::PdnsSink;
use ferrous_pdns_domain::{DomainError, PdnsEntry};
use ferrous_pdns_infrastructure::output::PdnsOutput;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Sink that keeps every entry in memory; clones share the same buffer.
#[derive(Clone, Default)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<PdnsEntry>>>,
    flushes: Arc<AtomicUsize>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<PdnsEntry> {
        self.entries.lock().unwrap().clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.entries().iter().map(|entry| entry.to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }
}

impl PdnsSink for MemorySink {
    fn emit(&mut self, entry: &PdnsEntry) -> Result<(), DomainError> {
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DomainError> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Sink whose writes always fail.
pub struct FailingSink;

impl PdnsSink for FailingSink {
    fn emit(&mut self, _entry: &PdnsEntry) -> Result<(), DomainError> {
        Err(DomainError::OutputError("disk full".to_string()))
    }

    fn flush(&mut self) -> Result<(), DomainError> {
        Err(DomainError::OutputError("disk full".to_string()))
    }
}

pub fn memory_output() -> (PdnsOutput, MemorySink) {
    let sink = MemorySink::new();
    (PdnsOutput::single(Box::new(sink.clone())), sink)
}

pub fn split_output() -> (PdnsOutput, MemorySink, MemorySink) {
    let answers = MemorySink::new();
    let errors = MemorySink::new();
    let output = PdnsOutput::new(Box::new(answers.clone()), Some(Box::new(errors.clone())));
    (output, answers, errors)
}
