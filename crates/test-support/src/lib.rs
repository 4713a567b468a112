//! Shared test plumbing for the pty-journal workspace.
//!
//! Sinks are exercised against real descriptors, so the helpers here wrap
//! the small amount of pipe and bookkeeping code the test suites would
//! otherwise repeat: a `pipe2` wrapper with explicit ownership transfer, a
//! poll loop that records deregistrations, and a writer that records each
//! write call so tests can assert on the exact forward sequence.

#[cfg(unix)]
mod support;

#[cfg(unix)]
pub use support::{ChunkRecorder, Pipe, RecordingPollLoop, SeqPacketPair, WarningCounter};
