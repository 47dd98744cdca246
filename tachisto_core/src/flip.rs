// Copyright 2026 the Tachisto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One-shot callbacks run right after a flip.
//!
//! A callback queued with [`Window::call_on_flip`] runs once, immediately
//! after the next frame has been rendered and synchronized. This is where
//! timers and clocks are reset so that they start at stimulus onset rather
//! than at submission.
//!
//! At flush time the whole queue is taken out and replaced with an empty one
//! before any callback runs. Callbacks receive a [`Flip`] context through
//! which they may queue further callbacks or log messages; those land in the
//! fresh queues and are handled by the *next* frame.
//!
//! [`Window::call_on_flip`]: crate::window::Window::call_on_flip

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use crate::error::CallbackError;
use crate::log::{DeferredLogQueue, PendingLogEntry};
use crate::time::HostTime;

/// A boxed one-shot flip callback.
pub type FlipCallback = Box<dyn FnOnce(&mut Flip<'_>) -> Result<(), CallbackError>>;

/// FIFO of one-shot callbacks.
#[derive(Default)]
pub struct FlipQueue {
    callbacks: Vec<FlipCallback>,
}

impl fmt::Debug for FlipQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlipQueue")
            .field("len", &self.callbacks.len())
            .finish()
    }
}

impl FlipQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a callback.
    pub fn push(&mut self, callback: FlipCallback) {
        self.callbacks.push(callback);
    }

    /// Takes every queued callback, leaving the queue empty.
    #[must_use]
    pub fn take(&mut self) -> Vec<FlipCallback> {
        core::mem::take(&mut self.callbacks)
    }

    /// Number of queued callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

/// Context handed to a flip callback.
pub struct Flip<'a> {
    frame_index: u64,
    flip_time: HostTime,
    callbacks: &'a mut FlipQueue,
    logs: &'a mut DeferredLogQueue,
}

impl fmt::Debug for Flip<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flip")
            .field("frame_index", &self.frame_index)
            .field("flip_time", &self.flip_time)
            .finish_non_exhaustive()
    }
}

impl<'a> Flip<'a> {
    pub(crate) fn new(
        frame_index: u64,
        flip_time: HostTime,
        callbacks: &'a mut FlipQueue,
        logs: &'a mut DeferredLogQueue,
    ) -> Self {
        Self {
            frame_index,
            flip_time,
            callbacks,
            logs,
        }
    }

    /// The frame counter value of the frame that just flipped.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// The timestamp shared by this frame's flushed log entries.
    #[must_use]
    pub fn flip_time(&self) -> HostTime {
        self.flip_time
    }

    /// Queues a callback for the next flip.
    pub fn call_on_flip(
        &mut self,
        callback: impl FnOnce(&mut Flip<'_>) -> Result<(), CallbackError> + 'static,
    ) {
        self.callbacks.push(Box::new(callback));
    }

    /// Queues a message for the next flip.
    pub fn log_on_flip(&mut self, entry: PendingLogEntry) {
        self.logs.enqueue(entry);
    }
}
