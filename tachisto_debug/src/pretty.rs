// Copyright 2026 the Tachisto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Timestamps
//! are converted to microseconds using a [`Timebase`].

use std::io::Write;

use tachisto_core::time::{HostTime, Timebase};
use tachisto_core::trace::{
    FlipEvent, FrameBeginEvent, FrameSummary, FullscreenEvent, PhaseBeginEvent, PhaseEndEvent,
    PhaseKind, ResizeEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    timebase: Timebase,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("timebase", &self.timebase)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr(timebase: Timebase) -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
            timebase,
        }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }

    /// Consumes the sink and returns the destination.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn ticks_to_us(&self, ticks: u64) -> f64 {
        self.timebase.ticks_to_nanos(ticks) as f64 / 1000.0
    }

    fn host_us(&self, t: HostTime) -> f64 {
        self.ticks_to_us(t.ticks())
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[frame] frame={} at {:.1}µs nodes={}",
            e.frame_index,
            self.host_us(e.timestamp),
            e.nodes,
        );
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:begin] frame={} {} at {:.1}µs",
            e.frame_index,
            e.phase.name(),
            self.host_us(e.timestamp),
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:end] frame={} {} at {:.1}µs",
            e.frame_index,
            e.phase.name(),
            self.host_us(e.timestamp),
        );
    }

    fn on_flip(&mut self, e: &FlipEvent) {
        let _ = writeln!(
            self.writer,
            "[flip] frame={} at {:.1}µs logs={} callbacks={} failed={}",
            e.frame_index,
            self.host_us(e.flip_time),
            e.logs_flushed,
            e.callbacks_run,
            e.callbacks_failed,
        );
    }

    fn on_resize(&mut self, e: &ResizeEvent) {
        let _ = writeln!(
            self.writer,
            "[resize] {:?} -> {}x{} at {:.1}µs",
            e.cause,
            e.size.width,
            e.size.height,
            self.host_us(e.timestamp),
        );
    }

    fn on_fullscreen(&mut self, e: &FullscreenEvent) {
        let verb = if e.entering { "request" } else { "exit" };
        let _ = writeln!(
            self.writer,
            "[fullscreen:{verb}] {} via {} at {:.1}µs",
            e.outcome.label(),
            e.outcome.api().unwrap_or("-"),
            self.host_us(e.timestamp),
        );
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        let _ = write!(self.writer, "[summary] frame={}", s.frame_index);
        for phase in PhaseKind::ALL {
            let _ = write!(
                self.writer,
                " {}={:.1}µs",
                phase.name(),
                self.ticks_to_us(s.ticks(phase))
            );
        }
        let _ = writeln!(
            self.writer,
            " updated={} skipped={} failed={}",
            s.drawables_updated, s.drawables_skipped, s.callbacks_failed,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tachisto_core::surface::FullscreenOutcome;
    use tachisto_core::trace::FrameSummaryBuilder;

    fn output(sink: PrettyPrintSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn pretty_print_flip() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new(), Timebase::NANOS);
        sink.on_flip(&FlipEvent {
            frame_index: 1,
            flip_time: HostTime(1_000_000),
            logs_flushed: 2,
            callbacks_run: 1,
            callbacks_failed: 0,
        });
        let output = output(sink);
        assert!(output.contains("[flip]"), "got: {output}");
        assert!(output.contains("frame=1"), "got: {output}");
        assert!(output.contains("1000.0µs"), "got: {output}");
    }

    #[test]
    fn pretty_print_fullscreen_and_summary() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new(), Timebase::NANOS);
        sink.on_fullscreen(&FullscreenEvent {
            entering: false,
            outcome: FullscreenOutcome::Exited("moz"),
            timestamp: HostTime(0),
        });
        sink.on_frame_summary(
            &FrameSummaryBuilder::new(&FrameBeginEvent {
                frame_index: 3,
                timestamp: HostTime(0),
                nodes: 0,
            })
            .finish(),
        );
        let output = output(sink);
        assert!(output.contains("[fullscreen:exit] exited via moz"), "got: {output}");
        assert!(output.contains("wait_idle=0.0µs"), "got: {output}");
        assert_eq!(output.lines().count(), 2, "got: {output}");
    }
}
