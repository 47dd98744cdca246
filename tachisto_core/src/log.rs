// Copyright 2026 the Tachisto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Log sink contract and flip-deferred logging.
//!
//! A [`LogSink`] receives `(message, level, timestamp, context)` tuples. The
//! sink owns formatting and storage; the core only decides *when* a message is
//! stamped.
//!
//! Messages passed to [`Window::log_on_flip`] are not stamped when they are
//! queued. They wait in a [`DeferredLogQueue`] until the next frame has been
//! rendered and synchronized, and are then delivered with a single timestamp
//! shared by the whole batch. All entries flushed by one frame carry the exact
//! same time.
//!
//! [`Logger`] pairs a sink with the reference [`Clock`] and is what the rest
//! of the crate logs through.
//!
//! [`Window::log_on_flip`]: crate::window::Window::log_on_flip

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::time::{Clock, HostTime, Timebase};

/// Severity of a log message.
///
/// The numeric values (see [`severity`](Self::severity)) follow the classic
/// experiment-logging scale, where `Data` and `Exp` sit between `Warning` and
/// `Info`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    /// Diagnostic detail.
    Debug,
    /// General information.
    Info,
    /// Experiment-structure events (routine starts, trial ends).
    Exp,
    /// Participant data (responses, stimulus onsets).
    Data,
    /// Something unexpected that did not stop the session.
    Warning,
    /// A failure that was contained.
    Error,
    /// A failure the session cannot recover from.
    Critical,
}

impl LogLevel {
    /// Numeric severity.
    #[must_use]
    pub const fn severity(self) -> u8 {
        match self {
            Self::Debug => 10,
            Self::Info => 20,
            Self::Exp => 22,
            Self::Data => 25,
            Self::Warning => 30,
            Self::Error => 40,
            Self::Critical => 50,
        }
    }

    /// Uppercase label used by text sinks.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Exp => "EXP",
            Self::Data => "DATA",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Receives log messages.
pub trait LogSink {
    /// Records one message.
    fn log(&mut self, message: &str, level: LogLevel, timestamp: HostTime, context: Option<&str>);
}

/// A [`LogSink`] that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl LogSink for NullSink {
    fn log(&mut self, message: &str, level: LogLevel, timestamp: HostTime, context: Option<&str>) {
        _ = (message, level, timestamp, context);
    }
}

/// A message waiting for the next flip.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingLogEntry {
    /// The message text.
    pub message: String,
    /// Severity.
    pub level: LogLevel,
    /// Optional name of the object the message is about.
    pub context: Option<String>,
}

impl PendingLogEntry {
    /// Creates an entry without context.
    #[must_use]
    pub fn new(message: impl Into<String>, level: LogLevel) -> Self {
        Self {
            message: message.into(),
            level,
            context: None,
        }
    }

    /// Attaches a context to the entry.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// FIFO of messages to be stamped at the next flip.
#[derive(Clone, Debug, Default)]
pub struct DeferredLogQueue {
    entries: Vec<PendingLogEntry>,
}

impl DeferredLogQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an entry. Never flushes.
    pub fn enqueue(&mut self, entry: PendingLogEntry) {
        self.entries.push(entry);
    }

    /// Delivers every queued entry to `sink` with the same `timestamp`, in
    /// enqueue order, and empties the queue.
    ///
    /// Returns the number of entries delivered.
    pub fn flush(&mut self, timestamp: HostTime, sink: &mut dyn LogSink) -> usize {
        let count = self.entries.len();
        for entry in self.entries.drain(..) {
            sink.log(
                &entry.message,
                entry.level,
                timestamp,
                entry.context.as_deref(),
            );
        }
        count
    }

    /// Number of queued entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A [`LogSink`] bundled with the reference clock.
pub struct Logger {
    sink: Box<dyn LogSink>,
    clock: Box<dyn Clock>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("timebase", &self.clock.timebase())
            .finish_non_exhaustive()
    }
}

impl Logger {
    /// Creates a logger writing to `sink` and stamping with `clock`.
    #[must_use]
    pub fn new(sink: impl LogSink + 'static, clock: impl Clock + 'static) -> Self {
        Self {
            sink: Box::new(sink),
            clock: Box::new(clock),
        }
    }

    /// Reads the reference clock.
    #[must_use]
    pub fn now(&self) -> HostTime {
        self.clock.now()
    }

    /// The timebase of the reference clock.
    #[must_use]
    pub fn timebase(&self) -> Timebase {
        self.clock.timebase()
    }

    /// The underlying sink.
    pub fn sink_mut(&mut self) -> &mut dyn LogSink {
        &mut *self.sink
    }

    /// Logs with an explicit timestamp.
    pub fn log_at(
        &mut self,
        message: &str,
        level: LogLevel,
        timestamp: HostTime,
        context: Option<&str>,
    ) {
        self.sink.log(message, level, timestamp, context);
    }

    /// Logs stamped with the current time.
    pub fn log(&mut self, message: &str, level: LogLevel, context: Option<&str>) {
        let now = self.clock.now();
        self.sink.log(message, level, now, context);
    }

    /// Logs a [`LogLevel::Debug`] message stamped now.
    pub fn debug(&mut self, message: &str, context: Option<&str>) {
        self.log(message, LogLevel::Debug, context);
    }

    /// Logs a [`LogLevel::Warning`] message stamped now.
    pub fn warn(&mut self, message: &str, context: Option<&str>) {
        self.log(message, LogLevel::Warning, context);
    }
}

/// Forwards messages to the [`log`](https://docs.rs/log) facade.
///
/// Timestamps are rendered as raw host ticks in the record text; the `log`
/// backend adds its own wall-clock time.
#[cfg(feature = "log")]
#[derive(Clone, Copy, Debug, Default)]
pub struct LogFacadeSink;

#[cfg(feature = "log")]
impl LogSink for LogFacadeSink {
    fn log(&mut self, message: &str, level: LogLevel, timestamp: HostTime, context: Option<&str>) {
        let level = match level {
            LogLevel::Critical | LogLevel::Error => ::log::Level::Error,
            LogLevel::Warning => ::log::Level::Warn,
            LogLevel::Data | LogLevel::Exp | LogLevel::Info => ::log::Level::Info,
            LogLevel::Debug => ::log::Level::Debug,
        };
        match context {
            Some(ctx) => ::log::log!(target: "tachisto", level, "[{}] {message} ({ctx})", timestamp.ticks()),
            None => ::log::log!(target: "tachisto", level, "[{}] {message}", timestamp.ticks()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingSink;

    #[test]
    fn flush_stamps_every_entry_with_one_timestamp_in_order() {
        let mut queue = DeferredLogQueue::new();
        queue.enqueue(PendingLogEntry::new("first", LogLevel::Exp));
        queue.enqueue(PendingLogEntry::new("second", LogLevel::Data).with_context("stim"));
        queue.enqueue(PendingLogEntry::new("third", LogLevel::Info));

        let mut sink = RecordingSink::default();
        assert_eq!(queue.flush(HostTime(777), &mut sink), 3);
        assert!(queue.is_empty());

        let records = sink.records();
        let messages: Vec<&str> = records.iter().map(|r| r.message.as_str()).collect();
        assert_eq!(messages, ["first", "second", "third"]);
        assert!(records.iter().all(|r| r.timestamp == HostTime(777)));
        assert_eq!(records[1].context.as_deref(), Some("stim"));
        assert_eq!(records[1].level, LogLevel::Data);
    }

    #[test]
    fn flush_of_empty_queue_is_a_no_op() {
        let mut queue = DeferredLogQueue::new();
        let mut sink = RecordingSink::default();
        assert_eq!(queue.flush(HostTime(1), &mut sink), 0);
        assert!(sink.records().is_empty());
    }

    #[test]
    fn enqueue_does_not_deliver() {
        let mut queue = DeferredLogQueue::new();
        queue.enqueue(PendingLogEntry::new("later", LogLevel::Info));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn logger_stamps_with_clock() {
        let sink = RecordingSink::default();
        let mut logger = Logger::new(sink.clone(), || HostTime(99));
        logger.warn("careful", Some("window"));
        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].timestamp, HostTime(99));
        assert_eq!(records[0].level, LogLevel::Warning);
    }

    #[test]
    fn levels_are_ordered_by_severity() {
        assert!(LogLevel::Debug < LogLevel::Exp);
        assert!(LogLevel::Exp < LogLevel::Data);
        assert!(LogLevel::Data < LogLevel::Warning);
        assert_eq!(LogLevel::Data.severity(), 25);
        assert_eq!(LogLevel::Critical.label(), "CRITICAL");
    }
}
