use std::io::Write;
use std::os::fd::RawFd;
use std::sync::{Mutex, PoisonError};

use journal::{Destination, Priority};

use crate::fd::{self, ReadOutcome};
use crate::hangup::HangupRegistry;
use crate::options::LoggingOptions;
use crate::poll::{EventKind, PollEvent, PollLoop};
use crate::sink::LoggingSink;

/// Size of the fixed transfer window used when draining a PTY descriptor.
///
/// One reused buffer of this size is the only buffering the sink performs;
/// anything the descriptor holds beyond it is drained across further reads
/// within the same call.
pub const PTY_BUFFER_SIZE: usize = 4096;

/// Relays a container's PTY output into the host journal.
///
/// One sink exists per container. It owns its [`Destination`] and transfer
/// buffer exclusively; the PTY descriptor stays with the poll loop and only
/// transfers to the sink for closing at hangup.
///
/// The writer parameter exists so tests can observe the exact write sequence;
/// production sinks use the [`Destination`] default via [`JournaldSink::new`].
pub struct JournaldSink<W: Write + Send = Destination> {
    container_id: String,
    options: Mutex<LoggingOptions>,
    shared: Mutex<Shared<W>>,
    hangups: HangupRegistry,
}

/// State serialized by the access lock: the shared transfer buffer and the
/// shared write path to the destination.
struct Shared<W> {
    destination: W,
    buffer: Box<[u8; PTY_BUFFER_SIZE]>,
}

impl JournaldSink {
    /// Builds the sink for `container_id`, acquiring its journald stream.
    ///
    /// Severity is resolved from `options` here and fixed for the sink's
    /// lifetime. Construction never fails: if the journal facility is
    /// unavailable the sink degrades to a discard destination and keeps
    /// servicing calls.
    pub fn new(container_id: impl Into<String>, options: LoggingOptions) -> Self {
        let container_id = container_id.into();
        let priority = Priority::resolve(options.priority.as_deref());
        let destination = Destination::journal(&container_id, priority);
        Self::with_destination(container_id, options, destination)
    }
}

impl<W: Write + Send> JournaldSink<W> {
    /// Builds a sink around an already-acquired destination writer.
    pub fn with_destination(
        container_id: impl Into<String>,
        options: LoggingOptions,
        destination: W,
    ) -> Self {
        Self {
            container_id: container_id.into(),
            options: Mutex::new(options),
            shared: Mutex::new(Shared {
                destination,
                buffer: Box::new([0u8; PTY_BUFFER_SIZE]),
            }),
            hangups: HangupRegistry::new(),
        }
    }

    /// Returns the container identity this sink tags its entries with.
    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    /// Returns the current logging options snapshot.
    pub fn options(&self) -> LoggingOptions {
        self.options
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn drain_backlog(&self, source: RawFd) {
        let mut guard = self.shared.lock().unwrap_or_else(PoisonError::into_inner);
        let shared = &mut *guard;
        loop {
            match fd::read_available(source, &mut shared.buffer[..]) {
                ReadOutcome::Data(n) => shared.forward(&self.container_id, n),
                ReadOutcome::EndOfData | ReadOutcome::NoDataYet => return,
                ReadOutcome::Failed(error) => {
                    tracing::warn!(
                        container_id = %self.container_id,
                        fd = source,
                        error = %error,
                        "read from log backlog failed"
                    );
                    return;
                }
            }
        }
    }

    fn forward_readable(&self, source: RawFd) {
        let mut guard = self.shared.lock().unwrap_or_else(PoisonError::into_inner);
        let shared = &mut *guard;
        loop {
            match fd::read_available(source, &mut shared.buffer[..]) {
                ReadOutcome::Data(n) => shared.forward(&self.container_id, n),
                // The descriptor's backlog is exhausted (or the peer is
                // gone); dispatch returns and waits for the next event.
                ReadOutcome::NoDataYet | ReadOutcome::EndOfData => return,
                ReadOutcome::Failed(error) => {
                    tracing::warn!(
                        container_id = %self.container_id,
                        fd = source,
                        error = %error,
                        "read from container pty failed"
                    );
                    return;
                }
            }
        }
    }
}

impl<W> Shared<W>
where
    W: Write + Send,
{
    /// Writes the first `n` buffered bytes to the destination.
    ///
    /// Write failures are logged, not propagated; forwarding continues with
    /// the next read.
    fn forward(&mut self, container_id: &str, n: usize) {
        if let Err(error) = self.destination.write_all(&self.buffer[..n]) {
            tracing::warn!(
                container_id,
                error = %error,
                "write to journald stream failed"
            );
        }
    }
}

impl<W: Write + Send> LoggingSink for JournaldSink<W> {
    fn dump(&self, source: RawFd) {
        self.drain_backlog(source);
    }

    fn configure(&self, options: LoggingOptions) {
        // The journald stream keeps the severity it was opened with; the
        // snapshot is replaced so later diagnostics reflect current config.
        let mut current = self.options.lock().unwrap_or_else(PoisonError::into_inner);
        if options.priority != current.priority {
            tracing::debug!(
                container_id = %self.container_id,
                "logging options updated; established stream severity is unchanged"
            );
        }
        *current = options;
    }

    fn on_event(&self, poll_loop: &dyn PollLoop, event: PollEvent) {
        match event.kind {
            EventKind::Readable => {
                // A readable fd we previously tore down is a recycled number
                // for a fresh stream, not a ghost of the old one.
                self.hangups.reopened(event.fd);
                self.forward_readable(event.fd);
            }
            EventKind::Hangup => self.hangups.hangup(poll_loop, event.fd, &self.container_id),
            EventKind::Other => {}
        }
    }
}
