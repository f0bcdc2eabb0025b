//! NDJSON (newline-delimited JSON) signal store.
//!
//! Each signal is serialized straight into the buffered writer, one line per
//! signal, using the frontend's action type constants as the `type` tag.
//!
//! ```ignore
//! let store = Arc::new(JsonStreamStore::stdout());
//! let dispatcher = AccessTokenDispatcher::new(service, store.clone(), navigator);
//! dispatcher.list_tokens(Query::default()).await?;
//! ```

use super::Store;
use heimdall_core::Signal;
use std::io::{self, BufWriter, Write};
use std::sync::Mutex;

struct Inner<W: Write> {
    writer: BufWriter<W>,
    rows_written: usize,
}

/// Writes every dispatched signal as an NDJSON row.
///
/// `dispatch` cannot return an error, so write failures are logged and the
/// signal is skipped.
pub struct JsonStreamStore<W: Write> {
    inner: Mutex<Inner<W>>,
}

impl JsonStreamStore<io::Stdout> {
    /// Write NDJSON to stdout.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> JsonStreamStore<W> {
    /// Create a store wrapping any writer (file, Vec<u8>, etc.).
    pub fn new(writer: W) -> Self {
        Self {
            inner: Mutex::new(Inner {
                writer: BufWriter::with_capacity(64 * 1024, writer),
                rows_written: 0,
            }),
        }
    }

    /// Write one signal row.
    pub fn write_signal(&self, signal: &Signal) -> io::Result<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| io::Error::other("ndjson store lock poisoned"))?;
        serde_json::to_writer(&mut inner.writer, signal).map_err(io::Error::other)?;
        inner.writer.write_all(b"\n")?;
        inner.rows_written += 1;
        Ok(())
    }

    /// Flush and return how many rows were written.
    pub fn finish(self) -> io::Result<usize> {
        let mut inner = self
            .inner
            .into_inner()
            .map_err(|_| io::Error::other("ndjson store lock poisoned"))?;
        inner.writer.flush()?;
        Ok(inner.rows_written)
    }

    /// Flush buffered rows without consuming the store.
    pub fn flush(&self) -> io::Result<()> {
        self.inner
            .lock()
            .map_err(|_| io::Error::other("ndjson store lock poisoned"))?
            .writer
            .flush()
    }

    /// Number of rows written so far.
    pub fn rows_written(&self) -> usize {
        self.inner.lock().map(|i| i.rows_written).unwrap_or(0)
    }
}

impl<W: Write + Send> Store for JsonStreamStore<W> {
    fn dispatch(&self, signal: Signal) {
        if let Err(e) = self.write_signal(&signal) {
            tracing::warn!(signal = signal.name(), error = %e, "ndjson store write failed");
        }
    }
}
