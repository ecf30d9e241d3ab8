// DMX512 data model: the frame itself and the lock-protected hand-off
// between producers and the output worker.

pub mod frame;
pub mod frame_buffer;

pub use frame::{DmxFrame, DMX_NULL_START, DMX_UNIVERSE_SIZE};
pub use frame_buffer::{FrameBuffer, SharedOutput, TerminationFlag};
