use std::os::fd::RawFd;

/// Readiness notification kinds a poll loop dispatches to sinks.
///
/// Collapsed from the underlying epoll-style event mask: data available,
/// peer hangup, or anything else (which sinks ignore).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EventKind {
    /// The descriptor has bytes ready to read.
    Readable,
    /// The peer side of the descriptor has hung up.
    Hangup,
    /// Any other event; not handled by sinks.
    Other,
}

/// One readiness notification for a registered descriptor.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PollEvent {
    /// The descriptor that became ready.
    pub fd: RawFd,
    /// What kind of readiness was reported.
    pub kind: EventKind,
}

impl PollEvent {
    /// A data-ready event for `fd`.
    pub const fn readable(fd: RawFd) -> Self {
        Self {
            fd,
            kind: EventKind::Readable,
        }
    }

    /// A hangup event for `fd`.
    pub const fn hangup(fd: RawFd) -> Self {
        Self {
            fd,
            kind: EventKind::Hangup,
        }
    }
}

/// Deregistration half of the poll loop's registration contract.
///
/// The loop owns the (descriptor → sink) table; sinks only ever ask to be
/// removed from it, which happens when their descriptor hangs up.
pub trait PollLoop: Send + Sync {
    /// Removes `fd` from the registration table.
    ///
    /// After this returns no further events for `fd` are dispatched, and the
    /// caller may reclaim the descriptor.
    fn deregister(&self, fd: RawFd);
}
