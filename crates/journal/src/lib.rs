#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! crates/journal/src/lib.rs
//!
//! # Overview
//!
//! `journal` owns the destination side of the container log relay: mapping a
//! configured priority name onto the syslog ordinal scale and opening a
//! tagged, write-only stream to systemd-journald. The sink crate drains PTY
//! descriptors into whatever [`Destination`] this crate hands it; journald
//! performs line splitting and structured-entry framing on its side of the
//! socket.
//!
//! # Design
//!
//! [`JournalStream`] speaks journald's native stdout-stream protocol over a
//! `UnixStream`: a seven-field header carrying the container identifier and
//! the resolved [`Priority`], followed by raw bytes. This replaces a
//! `sd_journal_stream_fd()` call without linking against libsystemd, and
//! keeps the conduit an ordinary [`std::io::Write`] implementor.
//!
//! [`Destination`] is the fallback-aware wrapper: when the journal socket
//! cannot be reached the constructor degrades to `/dev/null` (and, as a last
//! resort, to an in-process byte drop) so the owning sink stays constructible
//! and operational. Losing log visibility must never take a container down
//! with it.
//!
//! # Invariants
//!
//! - A [`Destination`], once constructed, is valid for its entire lifetime
//!   and is closed exactly once, on drop.
//! - Priority is resolved before the stream header is sent and never changes
//!   for the lifetime of the connection.
//! - Construction never fails; every degradation is reported through a
//!   `tracing` diagnostic instead of an error return.
//!
//! # Errors
//!
//! [`JournalStreamError`] distinguishes connect failures from header-send
//! failures. It is consumed by [`Destination::journal`] during fallback and
//! only surfaces to callers that open a [`JournalStream`] directly.

mod priority;

#[cfg(unix)]
mod destination;
#[cfg(unix)]
mod stream;

pub use priority::Priority;

#[cfg(unix)]
pub use destination::Destination;
#[cfg(unix)]
pub use stream::{JOURNAL_STDOUT_SOCKET, JournalStream, JournalStreamError};
