//! Backend Options Module
//!
//! Construction options shared by both backends.

use std::fmt;
use std::io::Write;
use std::sync::{Arc, Mutex};

// == Debug Sink ==
/// Optional write-only stream receiving human-readable trace lines.
#[derive(Clone, Default)]
pub struct DebugSink {
    writer: Option<Arc<Mutex<Box<dyn Write + Send>>>>,
}

impl DebugSink {
    /// Wraps a writer.
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Some(Arc::new(Mutex::new(Box::new(writer)))),
        }
    }

    /// Writes one line. Write failures are dropped.
    pub(crate) fn line(&self, args: fmt::Arguments<'_>) {
        if let Some(writer) = &self.writer {
            if let Ok(mut w) = writer.lock() {
                let _ = writeln!(w, "{}", args);
            }
        }
    }
}

impl fmt::Debug for DebugSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugSink")
            .field("enabled", &self.writer.is_some())
            .finish()
    }
}

// == Cache Options ==
/// Options consumed once at backend construction.
#[derive(Debug, Clone, Default)]
pub struct CacheOptions {
    /// Skip TLS certificate verification (networked backend only)
    pub skip_tls_verify: bool,
    /// Trace line destination
    pub debug_sink: DebugSink,
    /// Use incremental SCAN with this COUNT hint instead of KEYS
    pub scan_count: Option<usize>,
}

impl CacheOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_skip_tls_verify(mut self, skip: bool) -> Self {
        self.skip_tls_verify = skip;
        self
    }

    pub fn with_debug_sink<W: Write + Send + 'static>(mut self, writer: W) -> Self {
        self.debug_sink = DebugSink::new(writer);
        self
    }

    pub fn with_scan_count(mut self, count: usize) -> Self {
        self.scan_count = Some(count);
        self
    }
}
