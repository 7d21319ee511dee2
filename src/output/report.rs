//! Plain-text output: the sorted URL listing of print mode and the
//! tab-separated audit lines.

use crate::sitemap::UrlEntry;
use crate::state::PrimeOutcome;
use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Status column used when no response was received
pub const NO_STATUS: &str = "ERR";

/// Writes one URL per line, in the given order
///
/// The output is meant to be piped, e.g. into `xargs curl -I`.
pub fn write_url_listing<W: Write>(out: &mut W, urls: &[UrlEntry]) -> io::Result<()> {
    for entry in urls {
        writeln!(out, "{}", entry.location)?;
    }
    out.flush()
}

/// Formats an audit line: `<status>\t<elapsed-ms>\t<url>`
///
/// # Example
///
/// ```
/// use cache_primer::output::format_audit_line;
/// use cache_primer::PrimeOutcome;
/// use std::time::Duration;
///
/// let line = format_audit_line(
///     &PrimeOutcome::Primed { status: 200 },
///     Duration::from_millis(87),
///     "https://example.com/",
/// );
/// assert_eq!(line, "200\t87\thttps://example.com/");
/// ```
pub fn format_audit_line(outcome: &PrimeOutcome, elapsed: Duration, location: &str) -> String {
    let status = outcome
        .status()
        .map(|status| status.to_string())
        .unwrap_or_else(|| NO_STATUS.to_string());

    format!("{}\t{}\t{}", status, elapsed.as_millis(), location)
}

/// Destination of audit lines, shared by every priming task of a run
///
/// Each line is written and flushed under a lock, so lines from concurrent
/// tasks never interleave.
#[derive(Clone)]
pub struct AuditLog {
    writer: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl AuditLog {
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Writes the audit line of one request
    pub fn record(&self, outcome: &PrimeOutcome, elapsed: Duration, location: &str) {
        let line = format_audit_line(outcome, elapsed, location);
        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Err(e) = writeln!(writer, "{}", line).and_then(|_| writer.flush()) {
            tracing::error!("Failed to write audit line for {}: {}", location, e);
        }
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::stdout()
    }
}

impl fmt::Debug for AuditLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditLog").finish_non_exhaustive()
    }
}
