//! Framed telemetry outbox for the controller link.
//!
//! Implements [`TelemetrySink`] by encoding each [`NodeEvent`] with
//! `postcard` and COBS framing (zero-delimited, so the transport can
//! resynchronise after a dropped byte).  Frames wait in a bounded queue
//! until the transport drains them; when the queue is full the oldest frame
//! is discarded so the controller always sees the latest status.

use heapless::{Deque, Vec};
use log::warn;

use crate::app::events::NodeEvent;
use crate::app::ports::TelemetrySink;

/// Largest encoded frame, including the COBS overhead and terminator.
pub const FRAME_MAX: usize = 128;

pub type Frame = Vec<u8, FRAME_MAX>;

/// Bounded queue of encoded frames.
pub struct FrameOutbox<const N: usize> {
    frames: Deque<Frame, N>,
    dropped: u32,
}

impl<const N: usize> Default for FrameOutbox<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> FrameOutbox<N> {
    pub fn new() -> Self {
        Self {
            frames: Deque::new(),
            dropped: 0,
        }
    }

    /// Next frame for the transport, oldest first.
    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop_front()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames discarded because the queue was full or encoding failed.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    fn encode(event: &NodeEvent) -> Option<Frame> {
        let mut buf = [0u8; FRAME_MAX];
        let used = match postcard::to_slice_cobs(event, &mut buf) {
            Ok(used) => used.len(),
            Err(e) => {
                warn!("Outbox: encode failed: {e}");
                return None;
            }
        };
        Frame::from_slice(&buf[..used]).ok()
    }
}

impl<const N: usize> TelemetrySink for FrameOutbox<N> {
    fn emit(&mut self, event: &NodeEvent) {
        let Some(frame) = Self::encode(event) else {
            self.dropped = self.dropped.wrapping_add(1);
            return;
        };
        if self.frames.is_full() {
            self.frames.pop_front();
            self.dropped = self.dropped.wrapping_add(1);
        }
        // Cannot fail: a slot was freed above if needed.
        let _ = self.frames.push_back(frame);
    }
}

/// Decode one COBS frame (terminator included) back into an event.
pub fn decode_frame(frame: &mut [u8]) -> Result<NodeEvent, postcard::Error> {
    postcard::from_bytes_cobs(frame)
}
