use std::os::fd::RawFd;

use crate::fd::{self, ReadOutcome};
use crate::hangup::HangupRegistry;
use crate::journald::PTY_BUFFER_SIZE;
use crate::options::LoggingOptions;
use crate::poll::{EventKind, PollEvent, PollLoop};
use crate::sink::LoggingSink;

/// A sink that drops all container output.
///
/// Selected when a container's configuration asks for no log routing. The
/// sink still consumes its sources: callers rely on `dump` draining a
/// backlog completely, and the hangup transition must keep the poll loop's
/// registration table consistent whichever sink kind a container uses.
pub struct NullSink {
    container_id: String,
    hangups: HangupRegistry,
}

impl NullSink {
    /// Builds the discard sink for `container_id`.
    pub fn new(container_id: impl Into<String>) -> Self {
        Self {
            container_id: container_id.into(),
            hangups: HangupRegistry::new(),
        }
    }

    fn drain(&self, source: RawFd) {
        let mut buffer = [0u8; PTY_BUFFER_SIZE];
        loop {
            match fd::read_available(source, &mut buffer) {
                ReadOutcome::Data(_) => {}
                ReadOutcome::EndOfData | ReadOutcome::NoDataYet => return,
                ReadOutcome::Failed(error) => {
                    tracing::warn!(
                        container_id = %self.container_id,
                        fd = source,
                        error = %error,
                        "read from discarded log source failed"
                    );
                    return;
                }
            }
        }
    }
}

impl LoggingSink for NullSink {
    fn dump(&self, source: RawFd) {
        self.drain(source);
    }

    fn configure(&self, _options: LoggingOptions) {}

    fn on_event(&self, poll_loop: &dyn PollLoop, event: PollEvent) {
        match event.kind {
            EventKind::Readable => {
                self.hangups.reopened(event.fd);
                self.drain(event.fd);
            }
            EventKind::Hangup => self.hangups.hangup(poll_loop, event.fd, &self.container_id),
            EventKind::Other => {}
        }
    }
}
