#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! crates/sink/src/lib.rs
//!
//! # Overview
//!
//! `sink` implements the container side of the log relay: per-container
//! logging sinks that an external poll loop drives with readiness events.
//! The journald sink drains a container's PTY descriptor into the
//! [`journal::Destination`] it acquired at construction, tagging every entry
//! with the container identity and the configured severity.
//!
//! # Design
//!
//! The poll loop owns the (descriptor → sink) registration table and the
//! epoll-style machinery; this crate only defines the boundary it calls
//! through ([`PollLoop`], [`PollEvent`]) and the capability contract it
//! consumes ([`LoggingSink`]). A sink is shared as `Arc<dyn LoggingSink>`,
//! so every operation takes `&self` and serializes access to its one
//! transfer buffer and destination internally.
//!
//! Two call paths feed the same buffer: event-driven forwarding
//! ([`LoggingSink::on_event`]) and one-shot backlog drains
//! ([`LoggingSink::dump`]). A startup dump may race live dispatch from
//! another thread, which is exactly what the access lock exists for.
//!
//! # Errors
//!
//! None. Every operation is best effort: read and write failures become
//! `tracing` diagnostics carrying the container identity, and the sink stays
//! usable for subsequent events. Logging infrastructure must never be the
//! reason a container fails.

#[cfg(unix)]
mod fd;
#[cfg(unix)]
mod hangup;
#[cfg(unix)]
mod journald;
#[cfg(unix)]
mod null;
mod options;
#[cfg(unix)]
mod poll;
#[cfg(unix)]
mod sink;

pub use options::LoggingOptions;

#[cfg(unix)]
pub use journald::{JournaldSink, PTY_BUFFER_SIZE};
#[cfg(unix)]
pub use null::NullSink;
#[cfg(unix)]
pub use poll::{EventKind, PollEvent, PollLoop};
#[cfg(unix)]
pub use sink::{LoggingSink, SinkKind, sink_for};
