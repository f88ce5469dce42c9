use crate::report::Reporter;
use std::collections::VecDeque;
use std::sync::{Arc, RwLock, RwLockWriteGuard};
use tracing_subscriber::fmt::MakeWriter;

const DEFAULT_CAPACITY: usize = 100;

/// A bounded, shareable record of report lines.
///
/// Clones share the same buffer, so one handle can be given to a stopwatch or
/// a `tracing` subscriber while another reads what was written.
#[derive(Clone)]
pub struct Transcript {
    lines: Arc<RwLock<VecDeque<String>>>,
    capacity: usize,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl Transcript {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: Arc::new(RwLock::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    pub fn read(&self) -> Vec<String> {
        match self.lines.read() {
            Ok(guard) => guard.iter().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn push(&self, line: &str) {
        let mut guard = self.lock();

        // Oldest lines are dropped once full.
        if guard.len() == self.capacity {
            guard.pop_front();
        }

        guard.push_back(line.trim_end_matches('\n').to_string());
    }

    fn lock(&self) -> RwLockWriteGuard<'_, VecDeque<String>> {
        self.lines.write().unwrap_or_else(|e| {
            let mut guard = e.into_inner();
            guard.clear();
            guard
        })
    }
}

impl Reporter for Transcript {
    fn report(&self, line: &str) {
        self.push(line);
    }
}

impl std::io::Write for Transcript {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let text = std::str::from_utf8(buf)
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidData, "invalid utf-8"))?;

        for line in text.lines() {
            self.push(line);
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Transcript {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn drops_oldest_lines_when_full() {
        let transcript = Transcript::with_capacity(2);

        transcript.report("first");
        transcript.report("second");
        transcript.report("third");

        assert_eq!(transcript.read(), vec!["second", "third"]);
    }

    #[test]
    fn clones_share_the_buffer() {
        let transcript = Transcript::default();
        let mut writer = transcript.make_writer();

        writer.write_all(b"one\ntwo\n").unwrap();

        assert_eq!(transcript.read(), vec!["one", "two"]);

        transcript.clear();
        assert!(transcript.read().is_empty());
    }

    #[test]
    fn captures_tracing_output() {
        let transcript = Transcript::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(transcript.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("lap recorded");
        });

        let lines = transcript.read();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("INFO"));
        assert!(lines[0].contains("lap recorded"));
    }
}
