//! Logging and tracing configuration
//!
//! Two sinks exist:
//! 1. Process diagnostics go through the global `tracing` subscriber set up
//!    by [`init_cli`].
//! 2. Test runs write request and result events to a durable, size-rotated
//!    log file through an explicitly constructed [`TestLog`] handle. The
//!    handle carries its own dispatcher, so it never touches global state.

use std::borrow::Cow;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{dispatcher, Dispatch, Level};
use tracing_subscriber::{
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use super::Result;

/// Rotate the request log once it would grow past this many bytes
pub const DEFAULT_MAX_BYTES: u64 = 1_000_000;

/// Number of rotated request log files kept next to the live one
pub const DEFAULT_BACKUP_COUNT: usize = 10;

/// Initialize tracing for the CLI (stderr logging)
///
/// Logs are controlled by the `RUST_LOG` environment variable.
/// Default level is INFO for this crate, WARN for dependencies.
pub fn init_cli() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("svcprobe=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// Append-only file that rolls over to `<name>.1 .. <name>.N` by size
#[derive(Debug)]
struct RotatingFile {
    path: PathBuf,
    file: File,
    size: u64,
    max_bytes: u64,
    backups: usize,
}

impl RotatingFile {
    fn open(path: &Path, max_bytes: u64, backups: usize) -> io::Result<Self> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let size = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            file,
            size,
            max_bytes,
            backups,
        })
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(format!(".{index}"));
        PathBuf::from(name)
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        if self.backups > 0 {
            for index in (1..self.backups).rev() {
                let from = self.backup_path(index);
                if from.exists() {
                    std::fs::rename(&from, self.backup_path(index + 1))?;
                }
            }
            std::fs::rename(&self.path, self.backup_path(1))?;
            self.file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)?;
        } else {
            self.file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&self.path)?;
        }

        self.size = 0;
        Ok(())
    }

    fn append(&mut self, buf: &[u8]) -> io::Result<()> {
        if self.max_bytes > 0 && self.size > 0 && self.size + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }

        self.file.write_all(buf)?;
        self.size += buf.len() as u64;
        Ok(())
    }
}

/// Shared handle to a [`RotatingFile`], usable as a `tracing` writer
#[derive(Debug, Clone)]
struct RotatingWriter {
    inner: Arc<Mutex<RotatingFile>>,
}

impl RotatingWriter {
    fn lock(&self) -> io::Result<MutexGuard<'_, RotatingFile>> {
        self.inner
            .lock()
            .map_err(|_| io::Error::other("request log lock poisoned"))
    }
}

impl Write for RotatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock()?.append(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock()?.file.flush()
    }
}

impl<'a> MakeWriter<'a> for RotatingWriter {
    type Writer = RotatingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Durable log for a test run
///
/// Each event is one line: timestamp, severity and message. The caller owns
/// the lifecycle: open it before building a harness, [`close`](Self::close)
/// it once the run is over.
#[derive(Clone)]
pub struct TestLog {
    dispatch: Dispatch,
    writer: RotatingWriter,
    path: PathBuf,
}

impl std::fmt::Debug for TestLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestLog").field("path", &self.path).finish()
    }
}

impl TestLog {
    /// Open (or create) a request log with the default rotation limits
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_limits(path, DEFAULT_MAX_BYTES, DEFAULT_BACKUP_COUNT)
    }

    /// Open a request log that keeps `backups` rotated files of `max_bytes` each
    pub fn with_limits(path: impl AsRef<Path>, max_bytes: u64, backups: usize) -> Result<Self> {
        let path = path.as_ref();
        let writer = RotatingWriter {
            inner: Arc::new(Mutex::new(RotatingFile::open(path, max_bytes, backups)?)),
        };

        let subscriber = tracing_subscriber::fmt()
            .with_writer(writer.clone())
            .with_ansi(false)
            .with_target(false)
            .with_max_level(Level::INFO)
            .finish();

        Ok(Self {
            dispatch: Dispatch::new(subscriber),
            writer,
            path: path.to_path_buf(),
        })
    }

    /// Path of the live log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn info(&self, message: &str) {
        dispatcher::with_default(&self.dispatch, || {
            tracing::info!("{}", single_line(message))
        });
    }

    pub fn warn(&self, message: &str) {
        dispatcher::with_default(&self.dispatch, || {
            tracing::warn!("{}", single_line(message))
        });
    }

    pub fn error(&self, message: &str) {
        dispatcher::with_default(&self.dispatch, || {
            tracing::error!("{}", single_line(message))
        });
    }

    /// Flush buffered data to disk
    pub fn flush(&self) -> Result<()> {
        self.writer.clone().flush()?;
        Ok(())
    }

    /// Flush and release this handle
    pub fn close(self) -> Result<()> {
        self.flush()
    }
}

/// Escape line breaks so one event stays on one log line
fn single_line(message: &str) -> Cow<'_, str> {
    if message.contains(['\n', '\r']) {
        Cow::Owned(
            message
                .replace("\r\n", "\\n")
                .replace(['\n', '\r'], "\\n"),
        )
    } else {
        Cow::Borrowed(message)
    }
}
