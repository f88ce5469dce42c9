use std::io::Write;

/// A sink for the one-line elapsed-time reports a [`crate::Stopwatch`] emits.
///
/// Reporting is fire-and-forget: implementations swallow their own write
/// failures.
pub trait Reporter {
    fn report(&self, line: &str);
}

/// Writes each report as a line on standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct Stdout;

impl Reporter for Stdout {
    fn report(&self, line: &str) {
        let _ = writeln!(std::io::stdout().lock(), "{line}");
    }
}

/// Emits each report as an INFO event to the installed `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct Log;

impl Reporter for Log {
    fn report(&self, line: &str) {
        tracing::info!("{line}");
    }
}

impl<F: Fn(&str)> Reporter for F {
    fn report(&self, line: &str) {
        self(line)
    }
}
