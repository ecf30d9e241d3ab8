// Helpers outside the real-time path.
pub mod export;
