use std::os::fd::RawFd;
use std::sync::Arc;

use crate::journald::JournaldSink;
use crate::null::NullSink;
use crate::options::LoggingOptions;
use crate::poll::{PollEvent, PollLoop};

/// Capability contract a logging sink exposes to the poll loop and the
/// plugin host.
///
/// Every operation is best effort and infallible from the caller's side:
/// implementations absorb their own I/O failures into diagnostics. Sinks are
/// shared as `Arc<dyn LoggingSink>` between the registration table and the
/// plugin host, so all operations take `&self`; implementations must stay
/// safe when `dump` and `on_event` race from different threads.
pub trait LoggingSink: Send + Sync {
    /// Drains an already-readable `source` completely into the sink's
    /// destination.
    ///
    /// Ownership of `source` remains with the caller; the sink never closes
    /// it.
    fn dump(&self, source: RawFd);

    /// Applies a fresh logging options snapshot.
    fn configure(&self, options: LoggingOptions);

    /// Handles one readiness notification dispatched by `poll_loop`.
    ///
    /// On hangup the sink deregisters itself from `poll_loop` and closes the
    /// event's descriptor; no further events for that descriptor follow.
    fn on_event(&self, poll_loop: &dyn PollLoop, event: PollEvent);
}

/// Sink backends selectable by container configuration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SinkKind {
    /// Route container output to the host journal.
    Journald,
    /// Drop container output.
    Null,
}

/// Builds the sink matching `kind` for one container.
pub fn sink_for(
    kind: SinkKind,
    container_id: impl Into<String>,
    options: LoggingOptions,
) -> Arc<dyn LoggingSink> {
    match kind {
        SinkKind::Journald => Arc::new(JournaldSink::new(container_id, options)),
        SinkKind::Null => Arc::new(NullSink::new(container_id)),
    }
}
