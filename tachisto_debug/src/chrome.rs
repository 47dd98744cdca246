// Copyright 2026 the Tachisto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//! Frame phases become duration events on one track; flips, resizes, and
//! fullscreen transitions become instant events.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use tachisto_core::time::Timebase;
use tachisto_core::trace::PhaseKind;

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Timestamps are converted to microseconds using the provided [`Timebase`].
pub fn export(bytes: &[u8], timebase: Timebase, writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::FrameBegin(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "FrameBegin",
                    "cat": "Frame",
                    "ts": ticks_to_us(e.timestamp.ticks(), timebase),
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "nodes": e.nodes,
                    }
                }));
            }
            RecordedEvent::PhaseBegin(e) => {
                events.push(json!({
                    "ph": "B",
                    "name": e.phase.name(),
                    "cat": "Frame",
                    "ts": ticks_to_us(e.timestamp.ticks(), timebase),
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_index": e.frame_index,
                    }
                }));
            }
            RecordedEvent::PhaseEnd(e) => {
                events.push(json!({
                    "ph": "E",
                    "name": e.phase.name(),
                    "cat": "Frame",
                    "ts": ticks_to_us(e.timestamp.ticks(), timebase),
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_index": e.frame_index,
                    }
                }));
            }
            RecordedEvent::Flip(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Flip",
                    "cat": "Frame",
                    "ts": ticks_to_us(e.flip_time.ticks(), timebase),
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "frame_index": e.frame_index,
                        "logs_flushed": e.logs_flushed,
                        "callbacks_run": e.callbacks_run,
                        "callbacks_failed": e.callbacks_failed,
                    }
                }));
            }
            RecordedEvent::Resize(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Resize",
                    "cat": "Host",
                    "ts": ticks_to_us(e.timestamp.ticks(), timebase),
                    "pid": 0,
                    "tid": 1,
                    "s": "p",
                    "args": {
                        "cause": format!("{:?}", e.cause),
                        "width": e.size.width,
                        "height": e.size.height,
                    }
                }));
            }
            RecordedEvent::Fullscreen {
                entering,
                outcome,
                api,
                timestamp,
            } => {
                let name = if entering {
                    "RequestFullscreen"
                } else {
                    "ExitFullscreen"
                };
                events.push(json!({
                    "ph": "i",
                    "name": name,
                    "cat": "Host",
                    "ts": ticks_to_us(timestamp.ticks(), timebase),
                    "pid": 0,
                    "tid": 1,
                    "s": "p",
                    "args": {
                        "outcome": outcome,
                        "api": api,
                    }
                }));
            }
            RecordedEvent::FrameSummary(s) => {
                let mut args = serde_json::Map::new();
                args.insert("frame_index".into(), s.frame_index.into());
                for phase in PhaseKind::ALL {
                    args.insert(
                        format!("{}_us", phase.name()),
                        ticks_to_us(s.ticks(phase), timebase).into(),
                    );
                }
                args.insert(
                    "begin_to_flip_us".into(),
                    s.begin_to_flip_ticks()
                        .map_or(Value::Null, |t| ticks_to_us(t, timebase).into()),
                );
                args.insert("drawables_updated".into(), s.drawables_updated.into());
                args.insert("drawables_skipped".into(), s.drawables_skipped.into());
                args.insert("callbacks_failed".into(), s.callbacks_failed.into());

                events.push(json!({
                    "ph": "i",
                    "name": "FrameSummary",
                    "cat": "Summary",
                    "ts": ticks_to_us(s.begin.ticks(), timebase),
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": args,
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn ticks_to_us(ticks: u64, timebase: Timebase) -> f64 {
    timebase.ticks_to_nanos(ticks) as f64 / 1000.0
}
