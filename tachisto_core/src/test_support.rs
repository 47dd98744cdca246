// Copyright 2026 the Tachisto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless doubles shared by the unit tests.

use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;
use core::cell::{Cell, Ref, RefCell};

use kurbo::Size;

use crate::backend::{FullscreenApi, Platform, Renderer};
use crate::color::Color;
use crate::draw_list::Drawable;
use crate::error::PlatformError;
use crate::log::{LogLevel, LogSink, Logger};
use crate::scene::SceneGraph;
use crate::time::{Clock, HostTime};

/// One message seen by a [`RecordingSink`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Record {
    pub(crate) message: String,
    pub(crate) level: LogLevel,
    pub(crate) timestamp: HostTime,
    pub(crate) context: Option<String>,
}

/// Sink whose clones share one record buffer.
#[derive(Clone, Debug, Default)]
pub(crate) struct RecordingSink {
    records: Rc<RefCell<Vec<Record>>>,
}

impl RecordingSink {
    pub(crate) fn records(&self) -> Ref<'_, Vec<Record>> {
        self.records.borrow()
    }

    pub(crate) fn at_level(&self, level: LogLevel) -> Vec<Record> {
        self.records
            .borrow()
            .iter()
            .filter(|r| r.level == level)
            .cloned()
            .collect()
    }
}

impl LogSink for RecordingSink {
    fn log(&mut self, message: &str, level: LogLevel, timestamp: HostTime, context: Option<&str>) {
        self.records.borrow_mut().push(Record {
            message: message.to_string(),
            level,
            timestamp,
            context: context.map(ToString::to_string),
        });
    }
}

/// Clock that advances by a fixed step on every read.
#[derive(Clone, Debug)]
pub(crate) struct ManualClock {
    next: Rc<Cell<u64>>,
    step: u64,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            next: Rc::new(Cell::new(1_000)),
            step: 1_000,
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> HostTime {
        let now = self.next.get();
        self.next.set(now + self.step);
        HostTime(now)
    }
}

pub(crate) fn logger_with(sink: &RecordingSink) -> Logger {
    Logger::new(sink.clone(), ManualClock::default())
}

/// Renderer that draws `char` labels into a transcript.
#[derive(Debug, Default)]
pub(crate) struct FakeRenderer {
    pub(crate) sizes: Vec<Size>,
    pub(crate) backgrounds: Vec<Color>,
    /// Back-to-front labels of each rendered frame.
    pub(crate) frames: Vec<Vec<char>>,
    /// Every device call, in order.
    pub(crate) calls: Vec<&'static str>,
}

impl FakeRenderer {
    pub(crate) fn count(&self, call: &str) -> usize {
        self.calls.iter().filter(|c| **c == call).count()
    }
}

impl Renderer for FakeRenderer {
    type Node = char;

    fn resize(&mut self, size: Size) {
        self.sizes.push(size);
    }

    fn set_background(&mut self, color: Color) {
        self.backgrounds.push(color);
    }

    fn render(&mut self, scene: &SceneGraph<char>) {
        self.frames.push(scene.iter().map(|(_, label)| *label).collect());
        self.calls.push("render");
    }

    fn barrier(&mut self) {
        self.calls.push("barrier");
    }

    fn wait_idle(&mut self) {
        self.calls.push("wait_idle");
    }
}

/// Host double with a three-entry fullscreen table.
#[derive(Debug)]
pub(crate) struct FakePlatform {
    pub(crate) viewport: Size,
    pub(crate) attached: bool,
    pub(crate) listening: bool,
    pub(crate) fullscreen: bool,
    /// Names of the fullscreen capabilities the host supports.
    pub(crate) supported: Vec<String>,
    pub(crate) fail_attach: bool,
    pub(crate) fail_subscribe: bool,
    pub(crate) fail_request: bool,
    pub(crate) page_backgrounds: Vec<Color>,
    pub(crate) detach_calls: usize,
    /// Fullscreen calls as `request:<api>` or `exit:<api>`.
    pub(crate) calls: Vec<String>,
    apis: Vec<FullscreenApi<Self>>,
}

impl FakePlatform {
    pub(crate) fn new(width: f64, height: f64) -> Self {
        Self {
            viewport: Size::new(width, height),
            attached: false,
            listening: false,
            fullscreen: false,
            supported: vec!["standard".into(), "moz".into(), "webkit".into()],
            fail_attach: false,
            fail_subscribe: false,
            fail_request: false,
            page_backgrounds: Vec::new(),
            detach_calls: 0,
            calls: Vec::new(),
            apis: vec![
                FullscreenApi::<Self> {
                    name: "standard",
                    probe: |p| p.supports("standard"),
                    request: |p| p.enter("standard"),
                    exit: |p| p.leave("standard"),
                },
                FullscreenApi::<Self> {
                    name: "moz",
                    probe: |p| p.supports("moz"),
                    request: |p| p.enter("moz"),
                    exit: |p| p.leave("moz"),
                },
                FullscreenApi::<Self> {
                    name: "webkit",
                    probe: |p| p.supports("webkit"),
                    request: |p| p.enter("webkit"),
                    exit: |p| p.leave("webkit"),
                },
            ],
        }
    }

    fn supports(&self, api: &str) -> bool {
        self.supported.iter().any(|s| s == api)
    }

    fn enter(&mut self, api: &str) -> Result<(), PlatformError> {
        self.calls.push(["request:", api].concat());
        if self.fail_request {
            return Err(PlatformError::new("request denied"));
        }
        self.fullscreen = true;
        Ok(())
    }

    fn leave(&mut self, api: &str) -> Result<(), PlatformError> {
        self.calls.push(["exit:", api].concat());
        self.fullscreen = false;
        Ok(())
    }
}

impl Platform for FakePlatform {
    fn viewport_size(&self) -> Size {
        self.viewport
    }

    fn attach_surface(&mut self) -> Result<(), PlatformError> {
        if self.fail_attach {
            return Err(PlatformError::new("no document body"));
        }
        self.attached = true;
        Ok(())
    }

    fn detach_surface(&mut self) -> bool {
        self.detach_calls += 1;
        core::mem::replace(&mut self.attached, false)
    }

    fn set_page_background(&mut self, color: Color) {
        self.page_backgrounds.push(color);
    }

    fn subscribe_host_events(&mut self) -> Result<(), PlatformError> {
        if self.fail_subscribe {
            return Err(PlatformError::new("listeners unavailable"));
        }
        self.listening = true;
        Ok(())
    }

    fn unsubscribe_host_events(&mut self) {
        self.listening = false;
    }

    fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    fn fullscreen_apis(&self) -> &[FullscreenApi<Self>] {
        &self.apis
    }
}

/// Drawable that renders as its label and counts updates.
#[derive(Debug)]
pub(crate) struct CounterStim {
    pub(crate) label: char,
    pub(crate) needs_update: bool,
    pub(crate) realizable: bool,
    pub(crate) updates: usize,
    pub(crate) full_refreshes: usize,
}

impl CounterStim {
    pub(crate) fn new(label: char) -> Self {
        Self {
            label,
            needs_update: false,
            realizable: true,
            updates: 0,
            full_refreshes: 0,
        }
    }

    pub(crate) fn unrealizable(label: char) -> Self {
        Self {
            realizable: false,
            ..Self::new(label)
        }
    }
}

impl Drawable<char> for CounterStim {
    fn needs_update(&self) -> bool {
        self.needs_update
    }

    fn set_needs_update(&mut self) {
        self.needs_update = true;
    }

    fn realize(&mut self) -> Option<char> {
        self.realizable.then_some(self.label)
    }

    fn update_if_needed(&mut self, node: &mut char) {
        if !self.needs_update {
            return;
        }
        *node = self.label;
        self.updates += 1;
        self.needs_update = false;
    }

    fn refresh(&mut self) {
        self.full_refreshes += 1;
        self.needs_update = true;
    }
}

pub(crate) fn shared(stim: CounterStim) -> Rc<RefCell<CounterStim>> {
    Rc::new(RefCell::new(stim))
}
