//! frame.rs
//! One DMX512 universe worth of slot values.
//! - stored inline (513 bytes incl. length), so worker snapshots never allocate
//! - channels are addressed 1..=512 like a lighting desk does

use std::fmt;

use crate::error::{DmxError, Result};

/// Slots in a full universe.
pub const DMX_UNIVERSE_SIZE: usize = 512;
/// Start code sent before the slots of a dimmer frame.
pub const DMX_NULL_START: u8 = 0x00;

#[derive(Clone, PartialEq, Eq)]
pub struct DmxFrame {
    slots: [u8; DMX_UNIVERSE_SIZE],
    len: usize,
}

impl DmxFrame {
    pub const fn new() -> Self {
        Self {
            slots: [0; DMX_UNIVERSE_SIZE],
            len: 0,
        }
    }

    /// Full universe, every channel at zero.
    pub const fn blackout() -> Self {
        Self {
            slots: [0; DMX_UNIVERSE_SIZE],
            len: DMX_UNIVERSE_SIZE,
        }
    }

    /// Copies `data` into a new frame; anything past slot 512 is dropped.
    pub fn from_slice(data: &[u8]) -> Self {
        let mut frame = Self::new();
        frame.set_from_slice(data);
        frame
    }

    /// Replaces the whole frame with `data`, truncated to one universe.
    pub fn set_from_slice(&mut self, data: &[u8]) {
        let len = data.len().min(DMX_UNIVERSE_SIZE);
        self.slots[..len].copy_from_slice(&data[..len]);
        self.slots[len..].fill(0);
        self.len = len;
    }

    /// Sets a 1-based channel. The frame grows to cover the channel, new slots are zero.
    pub fn set_channel(&mut self, channel: u16, value: u8) -> Result<()> {
        let idx = Self::index(channel)?;
        self.slots[idx] = value;
        if idx >= self.len {
            self.len = idx + 1;
        }
        Ok(())
    }

    /// Value of a 1-based channel, `None` past the end of the frame.
    pub fn channel(&self, channel: u16) -> Option<u8> {
        let idx = Self::index(channel).ok()?;
        (idx < self.len).then(|| self.slots[idx])
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.slots[..self.len]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn index(channel: u16) -> Result<usize> {
        match channel as usize {
            1..=DMX_UNIVERSE_SIZE => Ok(channel as usize - 1),
            _ => Err(DmxError::InvalidChannel(channel)),
        }
    }
}

impl Default for DmxFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DmxFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DmxFrame")
            .field("len", &self.len)
            .field("slots", &self.as_slice())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_slice_truncates_to_one_universe() {
        let data = vec![7u8; 600];
        let frame = DmxFrame::from_slice(&data);
        assert_eq!(frame.len(), DMX_UNIVERSE_SIZE);
        assert!(frame.as_slice().iter().all(|&v| v == 7));
    }

    #[test]
    fn shorter_replace_clears_stale_slots() {
        let mut frame = DmxFrame::from_slice(&[255; 10]);
        frame.set_from_slice(&[1, 2, 3]);
        assert_eq!(frame.as_slice(), &[1, 2, 3]);

        // growing again must not resurrect the old 255s
        frame.set_channel(5, 9).unwrap();
        assert_eq!(frame.as_slice(), &[1, 2, 3, 0, 9]);
    }

    #[test]
    fn channels_are_one_based() {
        let mut frame = DmxFrame::new();
        frame.set_channel(1, 10).unwrap();
        frame.set_channel(512, 20).unwrap();

        assert_eq!(frame.channel(1), Some(10));
        assert_eq!(frame.channel(512), Some(20));
        assert_eq!(frame.channel(2), Some(0));
        assert_eq!(frame.len(), 512);
    }

    #[test]
    fn out_of_range_channels_are_rejected() {
        let mut frame = DmxFrame::new();
        assert!(matches!(frame.set_channel(0, 1), Err(DmxError::InvalidChannel(0))));
        assert!(matches!(frame.set_channel(513, 1), Err(DmxError::InvalidChannel(513))));
        assert_eq!(frame.channel(0), None);
        assert_eq!(frame.channel(3), None);
    }

    #[test]
    fn blackout_is_full_and_dark() {
        let frame = DmxFrame::blackout();
        assert_eq!(frame.len(), DMX_UNIVERSE_SIZE);
        assert!(frame.as_slice().iter().all(|&v| v == 0));
    }
}
