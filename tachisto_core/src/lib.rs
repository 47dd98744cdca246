// Copyright 2026 the Tachisto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-synchronized stimulus presentation.
//!
//! `tachisto_core` coordinates what happens around each display refresh of an
//! experiment window: drawing the current stimuli, waiting for the GPU to
//! finish so that "now" really means "on screen", stamping queued log
//! messages with that moment, and running one-shot callbacks that reset
//! response clocks at stimulus onset. It is `no_std` compatible (with
//! `alloc`) and talks to the host only through backend traits.
//!
//! # Architecture
//!
//! ```text
//!   Host (display refresh)          Host (resize / orientation)
//!       │                                   │
//!       ▼                                   ▼
//!   Window::render()             Window::handle_host_event()
//!       │                                   │
//!       ├─► Renderer::render/barrier        ├─► SurfaceManager::on_host_resize
//!       ├─► DeferredLogQueue::flush         └─► Window::full_refresh
//!       ├─► flip callbacks
//!       └─► DrawList::refresh ──► SceneGraph (next frame)
//! ```
//!
//! **[`window`]**: The [`Window`](window::Window) frame loop and its public
//! surface.
//!
//! **[`surface`]**: Surface lifecycle, coordinate origin, background color,
//! and fullscreen handling with a latched "host was already fullscreen" flag.
//!
//! **[`draw_list`]**: Insertion-ordered drawables and the per-frame rebuild of
//! dirty nodes.
//!
//! **[`scene`]**: Arena-backed scene graph with generational handles and an
//! explicit draw order.
//!
//! **[`flip`]** and **[`log`]**: The two flip-synchronized queues.
//!
//! **[`backend`]**: The [`Renderer`](backend::Renderer) and
//! [`Platform`](backend::Platform) traits that backends implement.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! frame-loop instrumentation, with a zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `log` (disabled by default): Adds
//!   [`LogFacadeSink`](log::LogFacadeSink), which forwards to the `log`
//!   crate.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod backend;
pub mod color;
pub mod config;
pub mod draw_list;
pub mod error;
pub mod flip;
pub mod log;
pub mod scene;
pub mod surface;
pub mod time;
pub mod trace;
pub mod window;

#[cfg(test)]
mod test_support;
