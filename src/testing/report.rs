//! Operator-facing output for test runs
//!
//! Every line goes to the output channel as
//! `<timestamp> - [ TAG   ] - <message>`; events that matter after the run
//! (requests, results, errors) are also appended to the [`TestLog`].

use std::fmt;
use std::io::{self, IsTerminal, Write};
use std::sync::{Arc, Mutex};

use colored::Colorize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::common::logging::TestLog;

use super::runner::RunResult;

const SEPARATOR: &str = "------------------------";

/// Severity tag shown on each output line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Info,
    Error,
    Pass,
    Fail,
    Warn,
    Critical,
}

impl Tag {
    fn label(self) -> &'static str {
        match self {
            Tag::Info => "[ INFO  ]",
            Tag::Error => "[ ERROR ]",
            Tag::Pass => "[ PASS  ]",
            Tag::Fail => "[ FAIL  ]",
            Tag::Warn => "[ WARN  ]",
            Tag::Critical => "[ XXXXX ]",
        }
    }

    fn colored(self) -> String {
        let label = self.label();
        match self {
            Tag::Info => label.cyan().to_string(),
            Tag::Error => label.red().to_string(),
            Tag::Pass => label.green().bold().to_string(),
            Tag::Fail => label.red().bold().to_string(),
            Tag::Warn => label.yellow().to_string(),
            Tag::Critical => label.white().on_red().bold().to_string(),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Formats progress and results for one harness
#[derive(Clone)]
pub struct Reporter {
    out: Arc<Mutex<dyn Write + Send>>,
    log: Option<TestLog>,
    color: bool,
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter")
            .field("log", &self.log)
            .field("color", &self.color)
            .finish()
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::stdout()
    }
}

impl Reporter {
    /// Report to stdout, coloured when stdout is a terminal
    pub fn stdout() -> Self {
        Self {
            out: Arc::new(Mutex::new(io::stdout())),
            log: None,
            color: io::stdout().is_terminal(),
        }
    }

    /// Report to an arbitrary writer without colours
    pub fn to_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            out: Arc::new(Mutex::new(writer)),
            log: None,
            color: false,
        }
    }

    /// Also append selected events to a durable log
    pub fn with_log(mut self, log: TestLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn log(&self) -> Option<&TestLog> {
        self.log.as_ref()
    }

    /// Write a raw line to the output channel; write errors are dropped
    pub fn line(&self, text: &str) {
        if let Ok(mut out) = self.out.lock() {
            let _ = writeln!(out, "{text}");
        }
    }

    fn emit(&self, tag: Tag, message: &str, durable: bool) {
        let timestamp = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default();
        let label = if self.color {
            tag.colored()
        } else {
            tag.label().to_string()
        };
        self.line(&format!("{timestamp} - {label} - {message}"));

        if !durable {
            return;
        }
        if let Some(log) = &self.log {
            match tag {
                Tag::Info => log.info(message),
                Tag::Warn => log.warn(message),
                Tag::Error => log.error(message),
                Tag::Pass => log.info(&format!("{} - {message}", Tag::Pass)),
                Tag::Fail => log.error(&format!("{} - {message}", Tag::Fail)),
                Tag::Critical => log.error(&format!("[ CRITICAL ] - {message}")),
            }
        }
    }

    /// Informational line, output channel only
    pub fn info(&self, message: &str) {
        self.emit(Tag::Info, message, false);
    }

    /// Informational line that is also kept in the durable log
    pub fn note(&self, message: &str) {
        self.emit(Tag::Info, message, true);
    }

    pub fn error(&self, message: &str) {
        self.emit(Tag::Error, message, true);
    }

    pub fn warn(&self, message: &str) {
        self.emit(Tag::Warn, message, true);
    }

    pub fn pass(&self, message: &str) {
        self.emit(Tag::Pass, message, true);
    }

    pub fn fail(&self, message: &str) {
        self.emit(Tag::Fail, message, true);
    }

    pub fn critical(&self, message: &str) {
        self.emit(Tag::Critical, message, true);
    }

    /// Header printed before any test runs
    pub fn banner(&self, service: &str, runnable: &[String], selected: &[String]) {
        self.line("--------------[ T E S T S ]--------------");
        self.line(&format!("Service Name: {}", service.to_uppercase()));
        self.line(SEPARATOR);
        self.line(&format!("Following tests are runnable: {runnable:?}"));
        self.line(&format!("Following tests will be run  : {selected:?}"));
        self.line(SEPARATOR);
    }

    /// Final tally, always the last line of a completed run
    pub fn summary(&self, result: &RunResult) {
        self.line(SEPARATOR);
        self.line(&result.to_string());
        if let Some(log) = &self.log {
            log.info(&result.to_string());
        }
    }
}

/// In-memory output channel, handy for asserting on what a run printed
#[derive(Debug, Clone, Default)]
pub struct CapturedOutput {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl CapturedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far
    pub fn contents(&self) -> String {
        self.buffer
            .lock()
            .map(|buf| String::from_utf8_lossy(&buf).into_owned())
            .unwrap_or_default()
    }

    /// A reporter writing into this buffer
    pub fn reporter(&self) -> Reporter {
        Reporter::to_writer(self.clone())
    }
}

impl Write for CapturedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer
            .lock()
            .map_err(|_| io::Error::other("capture buffer lock poisoned"))?
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
