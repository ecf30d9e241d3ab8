//! frame_buffer.rs
//! State shared between frame producers and the output worker.
//!
//! Two independent critical sections:
//! - `FrameBuffer`: latest frame, replaced wholesale (last write wins, no queue)
//! - `TerminationFlag`: one-shot stop request, checked once per cycle
//!
//! Neither lock is ever taken while the other is held.

use parking_lot::Mutex;

use crate::dmx::frame::DmxFrame;

/// Latest frame submitted by any producer.
#[derive(Default)]
pub struct FrameBuffer {
    frame: Mutex<DmxFrame>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the shared frame. Never waits on the worker beyond one frame copy.
    pub fn write_frame(&self, frame: &DmxFrame) {
        self.frame.lock().clone_from(frame);
    }

    /// Copies the shared frame into the worker's own buffer.
    pub fn snapshot_into(&self, local: &mut DmxFrame) {
        local.clone_from(&self.frame.lock());
    }
}

/// Stop request: false until `request` is called, then true forever.
#[derive(Default)]
pub struct TerminationFlag {
    set: Mutex<bool>,
}

impl TerminationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        *self.set.lock() = true;
    }

    pub fn is_set(&self) -> bool {
        *self.set.lock()
    }
}

/// Everything the controller and the worker both touch.
#[derive(Default)]
pub struct SharedOutput {
    pub frame: FrameBuffer,
    pub terminate: TerminationFlag,
}

impl SharedOutput {
    pub fn new() -> Self {
        Self::default()
    }
}
