// Copyright 2026 the Tachisto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tab-separated experiment log files.
//!
//! [`WriterLogSink`] implements [`LogSink`] and writes one line per message:
//!
//! ```text
//! 12.3457 \tEXP \ttext: autoDraw = True
//! 12.3457 \tDATA \tkeypress: space
//! ```
//!
//! Times are seconds since the sink's origin, rendered with four decimals.
//! Messages with a context are prefixed with `context: `. Messages below the
//! sink's threshold are dropped.

use std::io::Write;

use tachisto_core::log::{LogLevel, LogSink};
use tachisto_core::time::{HostTime, Timebase};

/// Writes experiment log lines to a [`Write`](std::io::Write) destination.
pub struct WriterLogSink<W: Write = Box<dyn Write>> {
    writer: W,
    timebase: Timebase,
    origin: HostTime,
    threshold: LogLevel,
}

impl<W: Write> std::fmt::Debug for WriterLogSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriterLogSink")
            .field("timebase", &self.timebase)
            .field("origin", &self.origin)
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

impl WriterLogSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr(timebase: Timebase) -> Self {
        Self::with_writer(Box::new(std::io::stderr()), timebase)
    }
}

impl<W: Write> WriterLogSink<W> {
    /// Creates a sink that writes every level to the given destination, with
    /// times measured from host time zero.
    #[must_use]
    pub fn with_writer(writer: W, timebase: Timebase) -> Self {
        Self {
            writer,
            timebase,
            origin: HostTime(0),
            threshold: LogLevel::Debug,
        }
    }

    /// Measures times from `origin` instead of host time zero.
    #[must_use]
    pub fn with_origin(mut self, origin: HostTime) -> Self {
        self.origin = origin;
        self
    }

    /// Drops messages less severe than `threshold`.
    #[must_use]
    pub fn with_threshold(mut self, threshold: LogLevel) -> Self {
        self.threshold = threshold;
        self
    }

    /// Consumes the sink and returns the destination.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> LogSink for WriterLogSink<W> {
    fn log(&mut self, message: &str, level: LogLevel, timestamp: HostTime, context: Option<&str>) {
        if level < self.threshold {
            return;
        }
        let seconds = timestamp
            .saturating_duration_since(self.origin)
            .to_nanos(self.timebase) as f64
            / 1e9;
        let _ = match context {
            Some(context) => writeln!(
                self.writer,
                "{seconds:.4} \t{level} \t{context}: {message}"
            ),
            None => writeln!(self.writer, "{seconds:.4} \t{level} \t{message}"),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(sink: WriterLogSink<Vec<u8>>) -> Vec<String> {
        String::from_utf8(sink.into_inner())
            .unwrap()
            .lines()
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn writes_tab_separated_lines() {
        let mut sink = WriterLogSink::with_writer(Vec::new(), Timebase::MICROS)
            .with_origin(HostTime(1_000_000));
        sink.log("start", LogLevel::Exp, HostTime(3_500_000), None);
        sink.log("space", LogLevel::Data, HostTime(3_512_345), Some("key_resp"));

        assert_eq!(
            lines(sink),
            ["2.5000 \tEXP \tstart", "2.5123 \tDATA \tkey_resp: space"]
        );
    }

    #[test]
    fn threshold_drops_less_severe_messages() {
        let mut sink =
            WriterLogSink::with_writer(Vec::new(), Timebase::NANOS).with_threshold(LogLevel::Exp);
        sink.log("noise", LogLevel::Debug, HostTime(0), None);
        sink.log("info", LogLevel::Info, HostTime(0), None);
        sink.log("routine", LogLevel::Exp, HostTime(0), None);
        sink.log("careful", LogLevel::Warning, HostTime(0), Some("window"));

        let lines = lines(sink);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("routine"));
        assert!(lines[1].contains("WARNING"));
    }

    #[test]
    fn flushed_batch_shares_the_flip_time() {
        use tachisto_core::log::{DeferredLogQueue, PendingLogEntry};

        let mut queue = DeferredLogQueue::new();
        queue.enqueue(PendingLogEntry::new("onset", LogLevel::Exp));
        queue.enqueue(PendingLogEntry::new("target", LogLevel::Data).with_context("stim"));

        let mut sink = WriterLogSink::with_writer(Vec::new(), Timebase::NANOS);
        queue.flush(HostTime(2_000_000_000), &mut sink);

        let lines = lines(sink);
        assert!(lines.iter().all(|line| line.starts_with("2.0000 \t")));
    }
}
