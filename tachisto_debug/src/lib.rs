// Copyright 2026 the Tachisto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text logging, recording, pretty-printing, and Chrome trace export for
//! tachisto sessions.
//!
//! Sinks for the two observation channels of `tachisto_core`:
//!
//! - [`log_sink::WriterLogSink`]: a [`LogSink`](tachisto_core::log::LogSink)
//!   writing tab-separated experiment log lines.
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event trace
//!   output.
//! - [`recorder::RecorderSink`]: compact binary trace recording with
//!   [`recorder::decode`] for playback.
//! - [`chrome::export`]: writes Chrome Trace Event Format JSON from recorded
//!   bytes.

pub mod chrome;
pub mod log_sink;
pub mod pretty;
pub mod recorder;
