// Copyright 2026 the Tachisto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as little-endian records, each led by a one-byte tag. [`decode`]
//! reads them back as an iterator of [`RecordedEvent`].
//!
//! Fullscreen events keep the capability name as a length-prefixed UTF-8
//! string, so they decode to owned data rather than to a
//! [`FullscreenEvent`].

use kurbo::Size;
use tachisto_core::backend::HostEvent;
use tachisto_core::surface::FullscreenOutcome;
use tachisto_core::time::HostTime;
use tachisto_core::trace::{
    FlipEvent, FrameBeginEvent, FrameSummary, FullscreenEvent, PhaseBeginEvent, PhaseEndEvent,
    PhaseKind, ResizeEvent, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_FRAME_BEGIN: u8 = 1;
const TAG_PHASE_BEGIN: u8 = 2;
const TAG_PHASE_END: u8 = 3;
const TAG_FLIP: u8 = 4;
const TAG_RESIZE: u8 = 5;
const TAG_FULLSCREEN: u8 = 6;
const TAG_FRAME_SUMMARY: u8 = 7;

/// Outcome labels, indexed by their encoded byte.
const OUTCOME_LABELS: [&str; 7] = [
    "entered",
    "exited",
    "already_fullscreen",
    "not_fullscreen",
    "host_owned",
    "unsupported",
    "failed",
];

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_count(&mut self, n: usize) {
        self.write_u64(u64::try_from(n).unwrap_or(u64::MAX));
    }

    fn write_option_u64(&mut self, v: Option<u64>) {
        match v {
            Some(val) => {
                self.write_u8(1);
                self.write_u64(val);
            }
            None => {
                self.write_u8(0);
                self.write_u64(0);
            }
        }
    }

    fn write_str(&mut self, s: &str) {
        // Longer names are cut at 255 bytes.
        let len = u8::try_from(s.len()).unwrap_or(u8::MAX);
        self.write_u8(len);
        self.buf.extend_from_slice(&s.as_bytes()[..usize::from(len)]);
    }

    fn write_phase(&mut self, p: PhaseKind) {
        self.write_u8(match p {
            PhaseKind::Render => 0,
            PhaseKind::Barrier => 1,
            PhaseKind::WaitIdle => 2,
            PhaseKind::LogFlush => 3,
            PhaseKind::Callbacks => 4,
            PhaseKind::Refresh => 5,
        });
    }

    fn write_outcome(&mut self, outcome: FullscreenOutcome) {
        let code = OUTCOME_LABELS
            .iter()
            .position(|label| *label == outcome.label())
            .and_then(|code| u8::try_from(code).ok())
            .unwrap_or(u8::MAX);
        self.write_u8(code);
        self.write_str(outcome.api().unwrap_or(""));
    }
}

impl TraceSink for RecorderSink {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        self.write_u8(TAG_FRAME_BEGIN);
        self.write_u64(e.frame_index);
        self.write_u64(e.timestamp.ticks());
        self.write_count(e.nodes);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.write_u8(TAG_PHASE_BEGIN);
        self.write_u64(e.frame_index);
        self.write_phase(e.phase);
        self.write_u64(e.timestamp.ticks());
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.write_u8(TAG_PHASE_END);
        self.write_u64(e.frame_index);
        self.write_phase(e.phase);
        self.write_u64(e.timestamp.ticks());
    }

    fn on_flip(&mut self, e: &FlipEvent) {
        self.write_u8(TAG_FLIP);
        self.write_u64(e.frame_index);
        self.write_u64(e.flip_time.ticks());
        self.write_count(e.logs_flushed);
        self.write_count(e.callbacks_run);
        self.write_count(e.callbacks_failed);
    }

    fn on_resize(&mut self, e: &ResizeEvent) {
        self.write_u8(TAG_RESIZE);
        self.write_u8(match e.cause {
            HostEvent::Resize => 0,
            HostEvent::OrientationChange => 1,
        });
        self.write_f64(e.size.width);
        self.write_f64(e.size.height);
        self.write_u64(e.timestamp.ticks());
    }

    fn on_fullscreen(&mut self, e: &FullscreenEvent) {
        self.write_u8(TAG_FULLSCREEN);
        self.write_u8(u8::from(e.entering));
        self.write_outcome(e.outcome);
        self.write_u64(e.timestamp.ticks());
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        self.write_u8(TAG_FRAME_SUMMARY);
        self.write_u64(s.frame_index);
        self.write_u64(s.begin.ticks());
        self.write_option_u64(s.flip_time.map(HostTime::ticks));
        for ticks in s.phase_ticks {
            self.write_u64(ticks);
        }
        self.write_count(s.drawables_updated);
        self.write_count(s.drawables_skipped);
        self.write_count(s.callbacks_failed);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedEvent {
    /// A [`FrameBeginEvent`].
    FrameBegin(FrameBeginEvent),
    /// A [`PhaseBeginEvent`].
    PhaseBegin(PhaseBeginEvent),
    /// A [`PhaseEndEvent`].
    PhaseEnd(PhaseEndEvent),
    /// A [`FlipEvent`].
    Flip(FlipEvent),
    /// A [`ResizeEvent`].
    Resize(ResizeEvent),
    /// A [`FullscreenEvent`], with the capability name owned.
    Fullscreen {
        /// `true` for a request, `false` for an exit.
        entering: bool,
        /// [`FullscreenOutcome::label`] of the outcome.
        outcome: &'static str,
        /// Capability involved, if any.
        api: Option<String>,
        /// Host time of the attempt.
        timestamp: HostTime,
    },
    /// A [`FrameSummary`].
    FrameSummary(FrameSummary),
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn read_bytes(&mut self, n: usize) -> Option<&[u8]> {
        let bytes = self.data.get(self.pos..self.pos.checked_add(n)?)?;
        self.pos += n;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        Some(self.read_bytes(1)?[0])
    }

    fn read_u64(&mut self) -> Option<u64> {
        Some(u64::from_le_bytes(self.read_bytes(8)?.try_into().ok()?))
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.read_u64().map(f64::from_bits)
    }

    fn read_count(&mut self) -> Option<usize> {
        Some(usize::try_from(self.read_u64()?).unwrap_or(usize::MAX))
    }

    fn read_option_u64(&mut self) -> Option<Option<u64>> {
        let present = self.read_u8()?;
        let val = self.read_u64()?;
        Some((present != 0).then_some(val))
    }

    fn read_str(&mut self) -> Option<String> {
        let len = usize::from(self.read_u8()?);
        let bytes = self.read_bytes(len)?;
        Some(String::from_utf8_lossy(bytes).into_owned())
    }

    fn read_phase(&mut self) -> Option<PhaseKind> {
        PhaseKind::ALL.get(usize::from(self.read_u8()?)).copied()
    }

    fn read_time(&mut self) -> Option<HostTime> {
        self.read_u64().map(HostTime)
    }

    fn decode_frame_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameBegin(FrameBeginEvent {
            frame_index: self.read_u64()?,
            timestamp: self.read_time()?,
            nodes: self.read_count()?,
        }))
    }

    fn decode_phase_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseBegin(PhaseBeginEvent {
            frame_index: self.read_u64()?,
            phase: self.read_phase()?,
            timestamp: self.read_time()?,
        }))
    }

    fn decode_phase_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseEnd(PhaseEndEvent {
            frame_index: self.read_u64()?,
            phase: self.read_phase()?,
            timestamp: self.read_time()?,
        }))
    }

    fn decode_flip(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Flip(FlipEvent {
            frame_index: self.read_u64()?,
            flip_time: self.read_time()?,
            logs_flushed: self.read_count()?,
            callbacks_run: self.read_count()?,
            callbacks_failed: self.read_count()?,
        }))
    }

    fn decode_resize(&mut self) -> Option<RecordedEvent> {
        let cause = match self.read_u8()? {
            0 => HostEvent::Resize,
            _ => HostEvent::OrientationChange,
        };
        Some(RecordedEvent::Resize(ResizeEvent {
            cause,
            size: Size::new(self.read_f64()?, self.read_f64()?),
            timestamp: self.read_time()?,
        }))
    }

    fn decode_fullscreen(&mut self) -> Option<RecordedEvent> {
        let entering = self.read_u8()? != 0;
        let outcome = OUTCOME_LABELS.get(usize::from(self.read_u8()?)).copied()?;
        let api = self.read_str()?;
        Some(RecordedEvent::Fullscreen {
            entering,
            outcome,
            api: (!api.is_empty()).then_some(api),
            timestamp: self.read_time()?,
        })
    }

    fn decode_frame_summary(&mut self) -> Option<RecordedEvent> {
        let frame_index = self.read_u64()?;
        let begin = self.read_time()?;
        let flip_time = self.read_option_u64()?.map(HostTime);
        let mut phase_ticks = [0; 6];
        for ticks in &mut phase_ticks {
            *ticks = self.read_u64()?;
        }
        Some(RecordedEvent::FrameSummary(FrameSummary {
            frame_index,
            begin,
            flip_time,
            phase_ticks,
            drawables_updated: self.read_count()?,
            drawables_skipped: self.read_count()?,
            callbacks_failed: self.read_count()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_FRAME_BEGIN => self.decode_frame_begin(),
            TAG_PHASE_BEGIN => self.decode_phase_begin(),
            TAG_PHASE_END => self.decode_phase_end(),
            TAG_FLIP => self.decode_flip(),
            TAG_RESIZE => self.decode_resize(),
            TAG_FULLSCREEN => self.decode_fullscreen(),
            TAG_FRAME_SUMMARY => self.decode_frame_summary(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
