// Copyright 2026 the Tachisto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the frame loop.
//!
//! [`TraceSink`] has one method per event, each defaulting to a no-op, so a
//! sink only implements the events it cares about.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. Without the `trace`
//! feature every `Tracer` method compiles to nothing. With it, each call is a
//! single `Option` branch before dispatch.
//!
//! [`FrameSummaryBuilder`] collects phase timestamps while a frame runs and
//! produces a [`FrameSummary`] at the end.

use kurbo::Size;

use crate::backend::HostEvent;
use crate::surface::FullscreenOutcome;
use crate::time::HostTime;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which phase of [`Window::render`](crate::window::Window::render) is being
/// measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// Submitting the scene graph to the renderer.
    Render,
    /// Waiting for the submission to complete on the device.
    Barrier,
    /// Draining the device pipeline (`wait_blanking` only).
    WaitIdle,
    /// Flushing deferred log entries.
    LogFlush,
    /// Running flip callbacks.
    Callbacks,
    /// Rebuilding dirty drawables for the next frame.
    Refresh,
}

impl PhaseKind {
    /// Every phase, in execution order.
    pub const ALL: [Self; 6] = [
        Self::Render,
        Self::Barrier,
        Self::WaitIdle,
        Self::LogFlush,
        Self::Callbacks,
        Self::Refresh,
    ];

    /// Short lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Render => "render",
            Self::Barrier => "barrier",
            Self::WaitIdle => "wait_idle",
            Self::LogFlush => "log_flush",
            Self::Callbacks => "callbacks",
            Self::Refresh => "refresh",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Render => 0,
            Self::Barrier => 1,
            Self::WaitIdle => 2,
            Self::LogFlush => 3,
            Self::Callbacks => 4,
            Self::Refresh => 5,
        }
    }
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a frame starts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameBeginEvent {
    /// Frame counter, already incremented for this frame.
    pub frame_index: u64,
    /// Host time at the start of the frame.
    pub timestamp: HostTime,
    /// Number of nodes attached to the scene graph.
    pub nodes: usize,
}

/// Marks the beginning of a frame-loop phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseBeginEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which phase is starting.
    pub phase: PhaseKind,
    /// Host time at the start of the phase.
    pub timestamp: HostTime,
}

/// Marks the end of a frame-loop phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseEndEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which phase is ending.
    pub phase: PhaseKind,
    /// Host time at the end of the phase.
    pub timestamp: HostTime,
}

/// Emitted once the flip timestamp is known and post-flip work is done.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlipEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// The single timestamp shared by this frame's flushed log entries.
    pub flip_time: HostTime,
    /// Number of deferred log entries flushed.
    pub logs_flushed: usize,
    /// Number of callbacks run.
    pub callbacks_run: usize,
    /// Number of callbacks that returned an error.
    pub callbacks_failed: usize,
}

/// Emitted after the surface geometry has been recomputed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResizeEvent {
    /// What triggered the resize.
    pub cause: HostEvent,
    /// The new surface size.
    pub size: Size,
    /// Host time of the resize.
    pub timestamp: HostTime,
}

/// Emitted after a fullscreen transition attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FullscreenEvent {
    /// `true` for a request, `false` for an exit.
    pub entering: bool,
    /// What happened.
    pub outcome: FullscreenOutcome,
    /// Host time of the attempt.
    pub timestamp: HostTime,
}

/// Per-frame timing summary produced by [`FrameSummaryBuilder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameSummary {
    /// Frame counter.
    pub frame_index: u64,
    /// Host time at the start of the frame.
    pub begin: HostTime,
    /// The flip timestamp, if the frame got that far.
    pub flip_time: Option<HostTime>,
    /// Duration of each phase in ticks, indexed like [`PhaseKind::ALL`]
    /// (0 if not measured).
    pub phase_ticks: [u64; 6],
    /// Drawables rebuilt during the refresh.
    pub drawables_updated: usize,
    /// Dirty drawables skipped for lack of a node.
    pub drawables_skipped: usize,
    /// Callbacks that returned an error.
    pub callbacks_failed: usize,
}

impl FrameSummary {
    /// Duration of `phase` in ticks.
    #[must_use]
    pub const fn ticks(&self, phase: PhaseKind) -> u64 {
        self.phase_ticks[phase.index()]
    }

    /// Ticks from frame start to flip, if the flip time is known.
    #[must_use]
    pub fn begin_to_flip_ticks(&self) -> Option<u64> {
        self.flip_time
            .map(|flip| flip.saturating_duration_since(self.begin).ticks())
    }
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the frame loop.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a frame starts.
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        _ = e;
    }

    /// Called at the beginning of a frame-loop phase.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a frame-loop phase.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called once post-flip work is done.
    fn on_flip(&mut self, e: &FlipEvent) {
        _ = e;
    }

    /// Called after the surface is resized.
    fn on_resize(&mut self, e: &ResizeEvent) {
        _ = e;
    }

    /// Called after a fullscreen transition attempt.
    fn on_fullscreen(&mut self, e: &FullscreenEvent) {
        _ = e;
    }

    /// Called with a per-frame timing summary.
    fn on_frame_summary(&mut self, s: &FrameSummary) {
        _ = s;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// Without the `trace` feature, every method compiles to nothing.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

macro_rules! dispatch {
    ($(#[$doc:meta])* $name:ident => $method:ident($ty:ty)) => {
        $(#[$doc])*
        #[inline]
        pub fn $name(&mut self, e: &$ty) {
            #[cfg(feature = "trace")]
            if let Some(s) = &mut self.sink {
                s.$method(e);
            }
            #[cfg(not(feature = "trace"))]
            {
                _ = e;
            }
        }
    };
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Whether events reach a sink.
    ///
    /// Lets callers skip reading the clock for phase boundaries when nobody
    /// is listening.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        #[cfg(feature = "trace")]
        {
            self.sink.is_some()
        }
        #[cfg(not(feature = "trace"))]
        {
            false
        }
    }

    dispatch!(
        /// Emits a [`FrameBeginEvent`].
        frame_begin => on_frame_begin(FrameBeginEvent)
    );
    dispatch!(
        /// Emits a [`PhaseBeginEvent`].
        phase_begin => on_phase_begin(PhaseBeginEvent)
    );
    dispatch!(
        /// Emits a [`PhaseEndEvent`].
        phase_end => on_phase_end(PhaseEndEvent)
    );
    dispatch!(
        /// Emits a [`FlipEvent`].
        flip => on_flip(FlipEvent)
    );
    dispatch!(
        /// Emits a [`ResizeEvent`].
        resize => on_resize(ResizeEvent)
    );
    dispatch!(
        /// Emits a [`FullscreenEvent`].
        fullscreen => on_fullscreen(FullscreenEvent)
    );
    dispatch!(
        /// Emits a [`FrameSummary`].
        frame_summary => on_frame_summary(FrameSummary)
    );
}

// ---------------------------------------------------------------------------
// FrameSummaryBuilder
// ---------------------------------------------------------------------------

/// Collects phase timestamps during a frame and produces a [`FrameSummary`].
#[derive(Debug)]
pub struct FrameSummaryBuilder {
    frame_index: u64,
    begin: HostTime,
    flip_time: Option<HostTime>,
    phase_starts: [Option<HostTime>; 6],
    phase_ends: [Option<HostTime>; 6],
    drawables_updated: usize,
    drawables_skipped: usize,
    callbacks_failed: usize,
}

impl FrameSummaryBuilder {
    /// Starts building a summary for the given frame.
    #[must_use]
    pub fn new(begin: &FrameBeginEvent) -> Self {
        Self {
            frame_index: begin.frame_index,
            begin: begin.timestamp,
            flip_time: None,
            phase_starts: [None; 6],
            phase_ends: [None; 6],
            drawables_updated: 0,
            drawables_skipped: 0,
            callbacks_failed: 0,
        }
    }

    /// Records the start of a phase.
    pub fn phase_begin(&mut self, phase: PhaseKind, t: HostTime) {
        self.phase_starts[phase.index()] = Some(t);
    }

    /// Records the end of a phase.
    pub fn phase_end(&mut self, phase: PhaseKind, t: HostTime) {
        self.phase_ends[phase.index()] = Some(t);
    }

    /// Records the flip outcome.
    pub fn set_flip(&mut self, e: &FlipEvent) {
        self.flip_time = Some(e.flip_time);
        self.callbacks_failed = e.callbacks_failed;
    }

    /// Records the refresh outcome.
    pub fn set_refresh(&mut self, updated: usize, skipped: usize) {
        self.drawables_updated = updated;
        self.drawables_skipped = skipped;
    }

    /// Consumes the builder and produces the final [`FrameSummary`].
    #[must_use]
    pub fn finish(self) -> FrameSummary {
        FrameSummary {
            frame_index: self.frame_index,
            begin: self.begin,
            flip_time: self.flip_time,
            phase_ticks: PhaseKind::ALL.map(|phase| self.phase_duration(phase)),
            drawables_updated: self.drawables_updated,
            drawables_skipped: self.drawables_skipped,
            callbacks_failed: self.callbacks_failed,
        }
    }

    fn phase_duration(&self, phase: PhaseKind) -> u64 {
        let idx = phase.index();
        match (self.phase_starts[idx], self.phase_ends[idx]) {
            (Some(start), Some(end)) => end.saturating_duration_since(start).ticks(),
            _ => 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_begin() -> FrameBeginEvent {
        FrameBeginEvent {
            frame_index: 42,
            timestamp: HostTime(1_000_000),
            nodes: 3,
        }
    }

    #[test]
    fn phase_indices_follow_execution_order() {
        for (i, phase) in PhaseKind::ALL.into_iter().enumerate() {
            assert_eq!(phase.index(), i);
        }
        assert_eq!(PhaseKind::WaitIdle.name(), "wait_idle");
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_frame_begin(&sample_begin());
        sink.on_fullscreen(&FullscreenEvent {
            entering: true,
            outcome: FullscreenOutcome::Unsupported,
            timestamp: HostTime(0),
        });
        sink.on_frame_summary(&FrameSummaryBuilder::new(&sample_begin()).finish());
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        assert!(!tracer.is_active());
        tracer.frame_begin(&sample_begin());
        tracer.resize(&ResizeEvent {
            cause: HostEvent::Resize,
            size: Size::new(1.0, 1.0),
            timestamp: HostTime(0),
        });
    }

    #[test]
    fn summary_builder_computes_durations() {
        let mut builder = FrameSummaryBuilder::new(&sample_begin());

        builder.phase_begin(PhaseKind::Render, HostTime(1_000_000));
        builder.phase_end(PhaseKind::Render, HostTime(1_000_400));
        builder.phase_begin(PhaseKind::Barrier, HostTime(1_000_400));
        builder.phase_end(PhaseKind::Barrier, HostTime(1_016_000));
        builder.phase_begin(PhaseKind::Refresh, HostTime(1_016_100));
        builder.phase_end(PhaseKind::Refresh, HostTime(1_016_150));
        builder.set_flip(&FlipEvent {
            frame_index: 42,
            flip_time: HostTime(1_016_050),
            logs_flushed: 2,
            callbacks_run: 1,
            callbacks_failed: 1,
        });
        builder.set_refresh(2, 1);

        let summary = builder.finish();
        assert_eq!(summary.ticks(PhaseKind::Render), 400);
        assert_eq!(summary.ticks(PhaseKind::Barrier), 15_600);
        assert_eq!(summary.ticks(PhaseKind::Refresh), 50);
        assert_eq!(summary.ticks(PhaseKind::WaitIdle), 0);
        assert_eq!(summary.begin_to_flip_ticks(), Some(16_050));
        assert_eq!(summary.callbacks_failed, 1);
        assert_eq!(summary.drawables_updated, 2);
        assert_eq!(summary.frame_index, 42);
    }

    #[test]
    fn summary_builder_missing_phases_are_zero() {
        let summary = FrameSummaryBuilder::new(&sample_begin()).finish();
        assert_eq!(summary.phase_ticks, [0; 6]);
        assert_eq!(summary.flip_time, None);
        assert_eq!(summary.begin_to_flip_ticks(), None);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct Frames {
            seen: Vec<u64>,
        }
        impl TraceSink for Frames {
            fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
                self.seen.push(e.frame_index);
            }
        }

        let mut sink = Frames { seen: Vec::new() };
        let mut tracer = Tracer::new(&mut sink);
        assert!(tracer.is_active());
        tracer.frame_begin(&sample_begin());
        drop(tracer);
        assert_eq!(sink.seen, [42]);
    }
}
