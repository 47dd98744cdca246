// Copyright 2026 the Tachisto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-frame coordinator.
//!
//! A [`Window`] owns the display surface, the draw list, and the two
//! flip-synchronized queues. The host drives it by calling
//! [`render`](Window::render) once per display refresh:
//!
//! ```text
//!   render()
//!     │  frame_count += 1, apply pending background
//!     ▼
//!   Renderer::render(scene) ──► Renderer::barrier() ──► [wait_idle()]
//!                                                            │
//!                 ┌──────────────────────────────────────────┘
//!                 ▼
//!   flip time = clock.now()
//!     │
//!     ├─► DeferredLogQueue::flush(flip time)
//!     ├─► flip callbacks, in enqueue order
//!     ▼
//!   DrawList::refresh()   (scene for the next frame)
//! ```
//!
//! Everything runs synchronously on the host's thread. Host resize and
//! orientation events are delivered through
//! [`handle_host_event`](Window::handle_host_event), which needs `&mut Window`
//! and so can never interleave with a frame.

use alloc::boxed::Box;
use alloc::format;
use core::fmt;

use kurbo::Size;

use crate::backend::{HostEvent, InputManager, Platform, Renderer};
use crate::color::Color;
use crate::config::{Units, WindowConfig};
use crate::draw_list::{DrawList, DrawableId, RefreshStats, SharedDrawable};
use crate::error::{CallbackError, Error};
use crate::flip::{Flip, FlipCallback, FlipQueue};
use crate::log::{DeferredLogQueue, LogLevel, Logger, PendingLogEntry};
use crate::scene::SceneGraph;
use crate::surface::{FullscreenOutcome, SurfaceManager};
use crate::time::HostTime;
use crate::trace::{
    FlipEvent, FrameBeginEvent, FrameSummaryBuilder, FullscreenEvent, PhaseBeginEvent,
    PhaseEndEvent, PhaseKind, ResizeEvent, Tracer,
};

/// Refresh rate assumed for the display.
///
/// Hosts do not expose the real rate; this is the conventional default.
const ASSUMED_FRAME_RATE: f64 = 60.0;

/// Where the frame loop currently is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FrameState {
    /// Between frames.
    #[default]
    Idle,
    /// Submitting and synchronizing the frame.
    Rendering,
    /// Flushing logs, running callbacks, and refreshing the scene.
    PostFlip,
}

/// What happened during one [`Window::render`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameReport {
    /// Frame counter value of this frame.
    pub frame_index: u64,
    /// The timestamp shared by every log entry flushed this frame.
    pub flip_time: HostTime,
    /// Deferred log entries flushed.
    pub logs_flushed: usize,
    /// Flip callbacks run.
    pub callbacks_run: usize,
    /// Flip callbacks that returned an error.
    pub callbacks_failed: usize,
    /// Outcome of the post-flip scene refresh.
    pub refresh: RefreshStats,
}

/// Coordinates rendering, GPU synchronization, and flip-time bookkeeping for
/// one display surface.
pub struct Window<R: Renderer, P: Platform> {
    config: WindowConfig,
    surface: SurfaceManager<R, P>,
    draw_list: DrawList<R::Node>,
    logs: DeferredLogQueue,
    callbacks: FlipQueue,
    frame_count: u64,
    state: FrameState,
    logger: Logger,
}

impl<R: Renderer, P: Platform> fmt::Debug for Window<R, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("name", &self.config.name)
            .field("size", &self.surface.size())
            .field("frame_count", &self.frame_count)
            .field("state", &self.state)
            .field("draw_list", &self.draw_list)
            .field("pending_logs", &self.logs.len())
            .field("pending_callbacks", &self.callbacks.len())
            .finish_non_exhaustive()
    }
}

impl<R: Renderer, P: Platform> Window<R, P> {
    /// Sets up the surface and returns an idle window with an empty draw list.
    ///
    /// If `config.fullscreen` is set, fullscreen is requested right away; an
    /// unsupported host only produces a warning.
    pub fn new(
        config: WindowConfig,
        renderer: R,
        platform: P,
        mut logger: Logger,
    ) -> Result<Self, Error> {
        let mut draw_list = DrawList::new();
        let surface = SurfaceManager::initialize(
            renderer,
            platform,
            &config,
            draw_list.scene_mut(),
            &mut logger,
        )?;

        let mut window = Self {
            config,
            surface,
            draw_list,
            logs: DeferredLogQueue::new(),
            callbacks: FlipQueue::new(),
            frame_count: 0,
            state: FrameState::Idle,
            logger,
        };
        if window.config.fullscreen {
            window.request_fullscreen();
        }
        Ok(window)
    }

    /// Hands the renderer to an input manager so it can install pointer and
    /// touch listeners.
    pub fn connect_input(&self, input: &mut impl InputManager<R>) {
        input.attach(self.surface.renderer());
    }

    // -- Frame loop ---------------------------------------------------------

    /// Renders one frame. See the [module docs](self) for the sequence.
    pub fn render(&mut self) -> FrameReport {
        self.render_traced(&mut Tracer::none())
    }

    /// Renders one frame, reporting each phase to `tracer`.
    pub fn render_traced(&mut self, tracer: &mut Tracer<'_>) -> FrameReport {
        self.frame_count += 1;
        let frame_index = self.frame_count;
        self.state = FrameState::Rendering;

        let mut trace = FrameTrace::start(
            tracer,
            frame_index,
            &self.logger,
            self.draw_list.scene().len(),
        );

        self.surface.apply_pending_color_change();

        trace.begin(PhaseKind::Render, &self.logger);
        self.surface.renderer_mut().render(self.draw_list.scene());
        trace.end(PhaseKind::Render, &self.logger);

        trace.begin(PhaseKind::Barrier, &self.logger);
        self.surface.renderer_mut().barrier();
        trace.end(PhaseKind::Barrier, &self.logger);

        if self.config.wait_blanking {
            trace.begin(PhaseKind::WaitIdle, &self.logger);
            self.surface.renderer_mut().wait_idle();
            trace.end(PhaseKind::WaitIdle, &self.logger);
        }

        // The only clock read that is observable outside of tracing.
        let flip_time = self.logger.now();
        self.state = FrameState::PostFlip;

        trace.begin(PhaseKind::LogFlush, &self.logger);
        let logs_flushed = self.logs.flush(flip_time, self.logger.sink_mut());
        trace.end(PhaseKind::LogFlush, &self.logger);

        trace.begin(PhaseKind::Callbacks, &self.logger);
        let (callbacks_run, callbacks_failed) = self.run_flip_callbacks(frame_index, flip_time);
        trace.end(PhaseKind::Callbacks, &self.logger);

        trace.flip(&FlipEvent {
            frame_index,
            flip_time,
            logs_flushed,
            callbacks_run,
            callbacks_failed,
        });

        trace.begin(PhaseKind::Refresh, &self.logger);
        let refresh = self.refresh();
        trace.end(PhaseKind::Refresh, &self.logger);

        trace.finish(refresh);
        self.state = FrameState::Idle;

        FrameReport {
            frame_index,
            flip_time,
            logs_flushed,
            callbacks_run,
            callbacks_failed,
            refresh,
        }
    }

    fn run_flip_callbacks(&mut self, frame_index: u64, flip_time: HostTime) -> (usize, usize) {
        // Callbacks queued while these run land in the fresh queue.
        let callbacks = self.callbacks.take();
        let run = callbacks.len();
        let mut failed = 0;
        for callback in callbacks {
            let mut flip = Flip::new(frame_index, flip_time, &mut self.callbacks, &mut self.logs);
            if let Err(err) = callback(&mut flip) {
                failed += 1;
                self.logger.log_at(
                    &format!("flip callback failed: {err}"),
                    LogLevel::Error,
                    flip_time,
                    Some(&self.config.name),
                );
            }
        }
        (run, failed)
    }

    fn refresh(&mut self) -> RefreshStats {
        self.surface.apply_pending_color_change();
        self.draw_list.refresh()
    }

    /// Forces every drawable and the surface itself to be rebuilt now.
    pub fn full_refresh(&mut self) -> RefreshStats {
        self.surface.mark_needs_update();
        self.draw_list.refresh_all();
        self.refresh()
    }

    // -- Flip-synchronized queues -------------------------------------------

    /// Queues a message to be logged with the next flip's timestamp.
    pub fn log_on_flip(&mut self, entry: PendingLogEntry) {
        self.logs.enqueue(entry);
    }

    /// Queues a callback to run once, right after the next flip.
    pub fn call_on_flip(
        &mut self,
        callback: impl FnOnce(&mut Flip<'_>) -> Result<(), CallbackError> + 'static,
    ) {
        self.callbacks.push(Box::new(callback));
    }

    /// Queues a callback together with the arguments it will be called with.
    pub fn call_on_flip_with<A: 'static>(
        &mut self,
        callback: impl FnOnce(&mut Flip<'_>, A) -> Result<(), CallbackError> + 'static,
        args: A,
    ) {
        let bound: FlipCallback = Box::new(move |flip: &mut Flip<'_>| callback(flip, args));
        self.callbacks.push(bound);
    }

    // -- Host integration ---------------------------------------------------

    /// Reacts to a host resize or orientation change.
    ///
    /// The new size is read from the platform, the origin is re-centered, and
    /// everything is fully refreshed, even if the size did not change.
    pub fn handle_host_event(&mut self, event: HostEvent) -> Size {
        self.handle_host_event_traced(event, &mut Tracer::none())
    }

    /// [`handle_host_event`](Self::handle_host_event), reporting to `tracer`.
    pub fn handle_host_event_traced(&mut self, event: HostEvent, tracer: &mut Tracer<'_>) -> Size {
        let size =
            self.surface
                .on_host_resize(event, self.draw_list.scene_mut(), &mut self.logger);
        self.full_refresh();
        if tracer.is_active() {
            tracer.resize(&ResizeEvent {
                cause: event,
                size,
                timestamp: self.logger.now(),
            });
        }
        size
    }

    /// Attempts to take the host fullscreen.
    ///
    /// On success, the surface and every drawable are flagged for update.
    pub fn request_fullscreen(&mut self) -> FullscreenOutcome {
        self.request_fullscreen_traced(&mut Tracer::none())
    }

    /// [`request_fullscreen`](Self::request_fullscreen), reporting to
    /// `tracer`.
    pub fn request_fullscreen_traced(&mut self, tracer: &mut Tracer<'_>) -> FullscreenOutcome {
        let outcome = self.surface.request_fullscreen(&mut self.logger);
        if matches!(outcome, FullscreenOutcome::Entered(_)) {
            self.draw_list.mark_all_needs_update();
        }
        self.trace_fullscreen(tracer, true, outcome);
        outcome
    }

    /// Leaves fullscreen, unless the host was already fullscreen before the
    /// session started.
    pub fn exit_fullscreen(&mut self) -> FullscreenOutcome {
        self.exit_fullscreen_traced(&mut Tracer::none())
    }

    /// [`exit_fullscreen`](Self::exit_fullscreen), reporting to `tracer`.
    pub fn exit_fullscreen_traced(&mut self, tracer: &mut Tracer<'_>) -> FullscreenOutcome {
        let outcome = self.surface.exit_fullscreen(&mut self.logger);
        self.trace_fullscreen(tracer, false, outcome);
        outcome
    }

    fn trace_fullscreen(&self, tracer: &mut Tracer<'_>, entering: bool, outcome: FullscreenOutcome) {
        if tracer.is_active() {
            tracer.fullscreen(&FullscreenEvent {
                entering,
                outcome,
                timestamp: self.logger.now(),
            });
        }
    }

    /// Detaches the surface from the host and removes the host listeners.
    ///
    /// Calling it again does nothing. Queued logs and callbacks are kept and
    /// are delivered by a later [`render`](Self::render).
    pub fn close(&mut self) {
        if self.surface.teardown() && self.config.auto_log {
            self.logger.debug("closed window", Some(&self.config.name));
        }
    }

    /// Changes the background color, effective from the next frame.
    pub fn set_background_color(&mut self, color: Color) {
        self.surface.set_background_color(color);
    }

    // -- Draw list ----------------------------------------------------------

    /// Adds a drawable at the front of the draw order.
    ///
    /// Adding the same drawable twice returns its existing handle.
    pub fn add(&mut self, drawable: SharedDrawable<R::Node>) -> DrawableId {
        self.draw_list.add(drawable)
    }

    /// Removes a drawable from the draw list.
    pub fn remove(&mut self, id: DrawableId) -> bool {
        self.draw_list.remove(id)
    }

    /// Retries realizing a drawable that had no node when it was added.
    pub fn realize(&mut self, id: DrawableId) -> bool {
        self.draw_list.realize(id)
    }

    // -- Accessors ----------------------------------------------------------

    /// Window name, used as log context.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// The configuration the window was created with.
    #[must_use]
    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    /// Stimulus units.
    #[must_use]
    pub fn units(&self) -> Units {
        self.config.units
    }

    /// Current surface size in device pixels.
    #[must_use]
    pub fn size(&self) -> Size {
        self.surface.size()
    }

    /// Estimated display refresh rate in Hz.
    #[must_use]
    pub fn actual_frame_rate(&self) -> f64 {
        ASSUMED_FRAME_RATE
    }

    /// Seconds per display refresh.
    #[must_use]
    pub fn monitor_frame_period(&self) -> f64 {
        1.0 / self.actual_frame_rate()
    }

    /// Number of frames rendered so far.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Where the frame loop currently is.
    #[must_use]
    pub fn frame_state(&self) -> FrameState {
        self.state
    }

    /// The draw list.
    #[must_use]
    pub fn draw_list(&self) -> &DrawList<R::Node> {
        &self.draw_list
    }

    /// The scene graph built from the draw list.
    #[must_use]
    pub fn scene(&self) -> &SceneGraph<R::Node> {
        self.draw_list.scene()
    }

    /// The surface manager.
    #[must_use]
    pub fn surface(&self) -> &SurfaceManager<R, P> {
        &self.surface
    }

    /// The surface manager, mutably.
    pub fn surface_mut(&mut self) -> &mut SurfaceManager<R, P> {
        &mut self.surface
    }

    /// The logger, for immediate (non-deferred) messages.
    pub fn logger_mut(&mut self) -> &mut Logger {
        &mut self.logger
    }

    /// Number of messages waiting for the next flip.
    #[must_use]
    pub fn pending_logs(&self) -> usize {
        self.logs.len()
    }

    /// Number of callbacks waiting for the next flip.
    #[must_use]
    pub fn pending_callbacks(&self) -> usize {
        self.callbacks.len()
    }
}

/// Per-frame tracing state.
///
/// Reads the clock for phase boundaries only when a sink is listening.
struct FrameTrace<'t, 'a> {
    tracer: &'t mut Tracer<'a>,
    frame_index: u64,
    summary: Option<FrameSummaryBuilder>,
}

impl<'t, 'a> FrameTrace<'t, 'a> {
    fn start(tracer: &'t mut Tracer<'a>, frame_index: u64, logger: &Logger, nodes: usize) -> Self {
        let summary = tracer.is_active().then(|| {
            let begin = FrameBeginEvent {
                frame_index,
                timestamp: logger.now(),
                nodes,
            };
            tracer.frame_begin(&begin);
            FrameSummaryBuilder::new(&begin)
        });
        Self {
            tracer,
            frame_index,
            summary,
        }
    }

    fn begin(&mut self, phase: PhaseKind, logger: &Logger) {
        if let Some(summary) = &mut self.summary {
            let timestamp = logger.now();
            summary.phase_begin(phase, timestamp);
            self.tracer.phase_begin(&PhaseBeginEvent {
                frame_index: self.frame_index,
                phase,
                timestamp,
            });
        }
    }

    fn end(&mut self, phase: PhaseKind, logger: &Logger) {
        if let Some(summary) = &mut self.summary {
            let timestamp = logger.now();
            summary.phase_end(phase, timestamp);
            self.tracer.phase_end(&PhaseEndEvent {
                frame_index: self.frame_index,
                phase,
                timestamp,
            });
        }
    }

    fn flip(&mut self, e: &FlipEvent) {
        if let Some(summary) = &mut self.summary {
            summary.set_flip(e);
            self.tracer.flip(e);
        }
    }

    fn finish(self, refresh: RefreshStats) {
        if let Some(mut summary) = self.summary {
            summary.set_refresh(refresh.updated, refresh.skipped);
            self.tracer.frame_summary(&summary.finish());
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::cell::{Cell, RefCell};

    use super::*;
    use crate::test_support::{
        CounterStim, FakePlatform, FakeRenderer, RecordingSink, logger_with, shared,
    };

    type TestWindow = Window<FakeRenderer, FakePlatform>;

    fn window_with(config: WindowConfig, platform: FakePlatform) -> (TestWindow, RecordingSink) {
        let sink = RecordingSink::default();
        let window = Window::new(config, FakeRenderer::default(), platform, logger_with(&sink))
            .unwrap();
        (window, sink)
    }

    /// A quiet window: only deferred entries, warnings, and errors reach the
    /// sink.
    fn window() -> (TestWindow, RecordingSink) {
        window_with(
            WindowConfig::default().with_auto_log(false),
            FakePlatform::new(800.0, 600.0),
        )
    }

    fn last_frame(window: &TestWindow) -> Vec<char> {
        window
            .surface()
            .renderer()
            .frames
            .last()
            .cloned()
            .unwrap_or_default()
    }

    #[test]
    fn new_window_is_idle_and_empty() {
        let (window, _) = window();
        assert_eq!(window.frame_count(), 0);
        assert_eq!(window.frame_state(), FrameState::Idle);
        assert_eq!(window.size(), Size::new(800.0, 600.0));
        assert!(window.draw_list().is_empty());
        assert!((window.monitor_frame_period() - 1.0 / 60.0).abs() < 1e-12);
        assert_eq!(window.name(), "window");
    }

    #[test]
    fn subscribe_failure_detaches_and_errors() {
        let mut platform = FakePlatform::new(100.0, 100.0);
        platform.fail_subscribe = true;
        let result = Window::new(
            WindowConfig::default(),
            FakeRenderer::default(),
            platform,
            logger_with(&RecordingSink::default()),
        );
        assert!(matches!(result, Err(Error::Subscribe(_))));
    }

    #[test]
    fn render_sequence_and_frame_counter() {
        let (mut window, _) = window();
        window.render();
        window.render();
        let renderer = window.surface().renderer();
        assert_eq!(window.frame_count(), 2);
        assert_eq!(renderer.calls, ["render", "barrier", "render", "barrier"]);
        assert_eq!(window.frame_state(), FrameState::Idle);
    }

    #[test]
    fn wait_blanking_drains_once_per_frame() {
        let config = WindowConfig::default().with_wait_blanking(true);
        let (mut window, _) = window_with(config, FakePlatform::new(100.0, 100.0));
        for expected in 1..=3 {
            let report = window.render();
            assert_eq!(report.frame_index, expected);
        }
        let renderer = window.surface().renderer();
        assert_eq!(renderer.count("wait_idle"), 3);
        assert_eq!(
            &renderer.calls[..3],
            ["render", "barrier", "wait_idle"].as_slice()
        );
        assert_eq!(window.frame_count(), 3);
    }

    #[test]
    fn deferred_logs_share_one_timestamp() {
        let (mut window, sink) = window();
        window.log_on_flip(PendingLogEntry::new("onset", LogLevel::Exp));
        window.log_on_flip(PendingLogEntry::new("resp", LogLevel::Data).with_context("key"));
        window.log_on_flip(PendingLogEntry::new("note", LogLevel::Info));
        assert!(sink.records().is_empty(), "nothing logged before the flip");

        let report = window.render();
        assert_eq!(report.logs_flushed, 3);
        assert_eq!(window.pending_logs(), 0);

        let records = sink.records();
        let messages: Vec<_> = records.iter().map(|r| r.message.as_str()).collect();
        assert_eq!(messages, ["onset", "resp", "note"]);
        assert!(records.iter().all(|r| r.timestamp == report.flip_time));
    }

    #[test]
    fn callbacks_run_once_in_order_after_the_flush() {
        let (mut window, sink) = window();
        let order = Rc::new(RefCell::new(Vec::new()));
        for n in 0..3 {
            let order = Rc::clone(&order);
            window.call_on_flip(move |_| {
                order.borrow_mut().push(n);
                Ok(())
            });
        }
        window.log_on_flip(PendingLogEntry::new("before callbacks", LogLevel::Exp));

        let seen_logs = Rc::new(Cell::new(usize::MAX));
        {
            let sink = sink.clone();
            let seen_logs = Rc::clone(&seen_logs);
            window.call_on_flip(move |_| {
                seen_logs.set(sink.records().len());
                Ok(())
            });
        }

        let report = window.render();
        assert_eq!(report.callbacks_run, 4);
        assert_eq!(*order.borrow(), [0, 1, 2]);
        assert_eq!(seen_logs.get(), 1, "logs are flushed before callbacks run");
        assert_eq!(window.pending_callbacks(), 0);

        window.render();
        assert_eq!(*order.borrow(), [0, 1, 2], "callbacks are one-shot");
    }

    #[test]
    fn failing_callback_is_logged_and_isolated() {
        let (mut window, sink) = window();
        let ran = Rc::new(Cell::new(0));
        let first = Rc::clone(&ran);
        let third = Rc::clone(&ran);
        window.call_on_flip(move |_| {
            first.set(first.get() + 1);
            Ok(())
        });
        window.call_on_flip(|_| Err(CallbackError::new("stimulus not ready")));
        window.call_on_flip(move |_| {
            third.set(third.get() + 1);
            Ok(())
        });
        window.add(shared(CounterStim::new('A')));

        let report = window.render();
        assert_eq!(ran.get(), 2);
        assert_eq!(report.callbacks_failed, 1);

        let errors = sink.at_level(LogLevel::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("stimulus not ready"));
        assert_eq!(errors[0].timestamp, report.flip_time);
        assert_eq!(last_frame(&window), ['A']);
    }

    #[test]
    fn callbacks_queued_during_flip_wait_for_next_frame() {
        let (mut window, _) = window();
        let frames = Rc::new(RefCell::new(Vec::new()));
        let outer = Rc::clone(&frames);
        window.call_on_flip(move |flip| {
            outer.borrow_mut().push(flip.frame_index());
            let inner = Rc::clone(&outer);
            flip.call_on_flip(move |flip| {
                inner.borrow_mut().push(flip.frame_index());
                Ok(())
            });
            flip.log_on_flip(PendingLogEntry::new("queued in callback", LogLevel::Exp));
            Ok(())
        });

        let first = window.render();
        assert_eq!(*frames.borrow(), [1]);
        assert_eq!(first.logs_flushed, 0);
        assert_eq!(window.pending_callbacks(), 1);
        assert_eq!(window.pending_logs(), 1);

        let second = window.render();
        assert_eq!(*frames.borrow(), [1, 2]);
        assert_eq!(second.logs_flushed, 1);
        assert_eq!(window.pending_callbacks(), 0);
    }

    #[test]
    fn call_on_flip_with_passes_arguments() {
        let (mut window, _) = window();
        let got = Rc::new(RefCell::new(String::new()));
        let out = Rc::clone(&got);
        window.call_on_flip_with(
            move |flip, (name, n): (&'static str, u32)| {
                *out.borrow_mut() = format!("{name}:{n}@{}", flip.frame_index());
                Ok(())
            },
            ("trial", 7),
        );
        window.render();
        assert_eq!(*got.borrow(), "trial:7@1");
    }

    #[test]
    fn refresh_after_flip_keeps_untouched_order() {
        let (mut window, _) = window();
        let stims: Vec<_> = ['A', 'B', 'C']
            .into_iter()
            .map(|label| shared(CounterStim::new(label)))
            .collect();
        for stim in &stims {
            window.add(stim.clone());
        }
        window.render();
        assert_eq!(last_frame(&window), ['A', 'B', 'C']);

        stims[0].borrow_mut().needs_update = true;
        let report = window.render();
        assert_eq!(last_frame(&window), ['A', 'B', 'C'], "drawn before refresh");
        assert_eq!(report.refresh.updated, 1);

        window.render();
        assert_eq!(last_frame(&window), ['B', 'C', 'A']);
    }

    #[test]
    fn resize_is_idempotent_and_always_fully_refreshes() {
        let (mut window, _) = window();
        let a = shared(CounterStim::new('A'));
        window.add(a.clone());

        let first = window.handle_host_event(HostEvent::Resize);
        let second = window.handle_host_event(HostEvent::OrientationChange);
        assert_eq!(first, second);
        assert_eq!(window.size(), Size::new(800.0, 600.0));
        assert_eq!(a.borrow().full_refreshes, 2);
        assert_eq!(a.borrow().updates, 2);

        window.surface_mut().platform_mut().viewport = Size::new(300.0, 200.0);
        assert_eq!(
            window.handle_host_event(HostEvent::Resize),
            Size::new(300.0, 200.0)
        );
        assert_eq!(
            window.scene().root_transform() * kurbo::Point::ORIGIN,
            kurbo::Point::new(150.0, 100.0)
        );
    }

    #[test]
    fn fullscreen_success_flags_everything_for_update() {
        let (mut window, _) = window();
        let a = shared(CounterStim::new('A'));
        window.add(a.clone());

        assert_eq!(
            window.request_fullscreen(),
            FullscreenOutcome::Entered("standard")
        );
        assert!(a.borrow().needs_update);
        assert!(window.surface().needs_update());

        window.render();
        assert_eq!(a.borrow().updates, 1);
        assert!(!window.surface().needs_update());
    }

    #[test]
    fn fullscreen_from_config_and_unsupported_host() {
        let mut platform = FakePlatform::new(100.0, 100.0);
        platform.supported.clear();
        let config = WindowConfig::default().with_fullscreen(true);
        let (window, sink) = window_with(config, platform);
        assert!(!window.surface().fullscreen_state().requested);
        assert_eq!(sink.at_level(LogLevel::Warning).len(), 1);
    }

    #[test]
    fn preexisting_fullscreen_is_never_revoked() {
        let mut platform = FakePlatform::new(100.0, 100.0);
        platform.fullscreen = true;
        let (mut window, _) = window_with(WindowConfig::default(), platform);
        window.request_fullscreen();
        assert_eq!(window.exit_fullscreen(), FullscreenOutcome::HostOwned);
        assert!(window.surface().platform().fullscreen);
    }

    #[test]
    fn background_change_applies_on_next_frame() {
        let (mut window, _) = window();
        window.set_background_color(Color::GREY);
        assert_eq!(window.surface().renderer().backgrounds, [Color::BLACK]);
        window.render();
        assert_eq!(
            window.surface().renderer().backgrounds,
            [Color::BLACK, Color::GREY]
        );
        assert_eq!(
            window.surface().platform().page_backgrounds.last(),
            Some(&Color::GREY)
        );
    }

    #[test]
    fn close_is_idempotent_and_keeps_queues() {
        let (mut window, sink) = window();
        window.log_on_flip(PendingLogEntry::new("late", LogLevel::Info));
        window.close();
        window.close();
        assert!(!window.surface().is_attached());
        assert_eq!(window.surface().platform().detach_calls, 1);

        window.render();
        assert!(sink.records().iter().any(|r| r.message == "late"));
    }

    #[test]
    fn auto_log_off_silences_diagnostics() {
        let config = WindowConfig::default().with_auto_log(false);
        let (mut window, sink) = window_with(config, FakePlatform::new(100.0, 100.0));
        window.handle_host_event(HostEvent::Resize);
        window.request_fullscreen();
        window.close();
        assert!(sink.at_level(LogLevel::Debug).is_empty());

        let (mut chatty, sink) = window_with(WindowConfig::default(), FakePlatform::new(100.0, 100.0));
        let created = sink.at_level(LogLevel::Debug).len();
        assert_eq!(created, 1);
        chatty.handle_host_event(HostEvent::Resize);
        assert_eq!(sink.at_level(LogLevel::Debug).len(), created + 1);
    }

    #[test]
    fn input_manager_receives_renderer() {
        struct Input {
            attached_sizes: Vec<Size>,
        }
        impl InputManager<FakeRenderer> for Input {
            fn attach(&mut self, renderer: &FakeRenderer) {
                self.attached_sizes = renderer.sizes.clone();
            }
        }

        let (window, _) = window();
        let mut input = Input {
            attached_sizes: vec![],
        };
        window.connect_input(&mut input);
        assert_eq!(input.attached_sizes, [Size::new(800.0, 600.0)]);
    }

    #[test]
    fn start_of_routine_scenario() {
        let (mut window, sink) = window();
        let a = shared(CounterStim::new('A'));
        let b = shared(CounterStim::new('B'));
        window.add(a);
        window.add(b);

        let clock_resets = Rc::new(Cell::new(0));
        let resets = Rc::clone(&clock_resets);
        window.call_on_flip(move |_| {
            resets.set(resets.get() + 1);
            Ok(())
        });
        window.log_on_flip(PendingLogEntry::new("start", LogLevel::Exp));

        window.render();

        assert_eq!(window.frame_count(), 1);
        assert_eq!(clock_resets.get(), 1);
        let starts = sink
            .records()
            .iter()
            .filter(|r| r.message == "start")
            .count();
        assert_eq!(starts, 1);
        assert_eq!(last_frame(&window), ['A', 'B']);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn traced_frame_reports_phases_in_order() {
        use crate::trace::{FrameSummary, TraceSink};

        #[derive(Default)]
        struct Phases {
            begun: Vec<PhaseKind>,
            flips: Vec<FlipEvent>,
            summaries: Vec<FrameSummary>,
        }
        impl TraceSink for Phases {
            fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
                self.begun.push(e.phase);
            }
            fn on_flip(&mut self, e: &FlipEvent) {
                self.flips.push(*e);
            }
            fn on_frame_summary(&mut self, s: &FrameSummary) {
                self.summaries.push(*s);
            }
        }

        let config = WindowConfig::default().with_wait_blanking(true);
        let (mut window, _) = window_with(config, FakePlatform::new(100.0, 100.0));
        window.log_on_flip(PendingLogEntry::new("x", LogLevel::Info));

        let mut sink = Phases::default();
        let report = window.render_traced(&mut Tracer::new(&mut sink));

        assert_eq!(sink.begun, PhaseKind::ALL);
        assert_eq!(sink.flips.len(), 1);
        assert_eq!(sink.flips[0].flip_time, report.flip_time);
        assert_eq!(sink.flips[0].logs_flushed, 1);
        assert_eq!(sink.summaries.len(), 1);
        assert_eq!(sink.summaries[0].flip_time, Some(report.flip_time));
    }
}
