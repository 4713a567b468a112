use std::os::fd::RawFd;
use std::sync::{Mutex, PoisonError};

use crate::fd;
use crate::poll::PollLoop;

/// Tracks descriptors a sink has already torn down.
///
/// Hangup is the terminal transition for a descriptor: deregister it from
/// the poll loop, close it, and never touch it again. Dispatch can deliver a
/// second hangup for the same descriptor before deregistration takes effect,
/// and a double close could hit an unrelated fd the number was recycled for,
/// so the registry makes the observable calls happen exactly once.
///
/// The kernel can recycle a closed descriptor number for a new stream the
/// poll loop registers with the same sink. A readable event for a recorded
/// fd is proof of exactly that, so [`HangupRegistry::reopened`] clears the
/// entry and the replacement descriptor gets its own hangup transition.
///
/// Deliberately a separate lock from the transfer-buffer lock: hangup does
/// not touch the buffer or the destination, so it never contends with a
/// concurrent dump or forward.
pub(crate) struct HangupRegistry {
    closed: Mutex<Vec<RawFd>>,
}

impl HangupRegistry {
    pub(crate) const fn new() -> Self {
        Self {
            closed: Mutex::new(Vec::new()),
        }
    }

    /// Deregisters and closes `fd` unless this registry already did so.
    pub(crate) fn hangup(&self, poll_loop: &dyn PollLoop, fd: RawFd, container_id: &str) {
        let mut closed = self.closed.lock().unwrap_or_else(PoisonError::into_inner);
        if closed.contains(&fd) {
            return;
        }
        closed.push(fd);

        poll_loop.deregister(fd);
        if let Err(error) = fd::close(fd) {
            tracing::warn!(
                container_id,
                fd,
                error = %error,
                "failed to close container pty fd"
            );
        }
    }

    /// Forgets `fd` so a later hangup for it runs the full teardown again.
    ///
    /// Called when a readable event arrives for the descriptor: the number
    /// has been recycled for a live stream, so the old entry must not
    /// suppress the new stream's hangup.
    pub(crate) fn reopened(&self, fd: RawFd) {
        self.closed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|&closed| closed != fd);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_support::Pipe;

    /// Local stand-in for `test_support::RecordingPollLoop`: `test-support`
    /// links its own copy of `sink`, so its impl targets a different
    /// `PollLoop` trait than the one these unit tests exercise.
    #[derive(Default)]
    struct RecordingPollLoop {
        deregistered: Mutex<Vec<RawFd>>,
    }

    impl RecordingPollLoop {
        fn deregistered(&self) -> Vec<RawFd> {
            self.deregistered.lock().expect("poll loop lock poisoned").clone()
        }
    }

    impl PollLoop for RecordingPollLoop {
        fn deregister(&self, fd: RawFd) {
            self.deregistered
                .lock()
                .expect("poll loop lock poisoned")
                .push(fd);
        }
    }

    #[test]
    fn second_hangup_for_same_fd_is_a_no_op() {
        let mut pipe = Pipe::nonblocking();
        let fd = pipe.release_read();

        let registry = HangupRegistry::new();
        let poll_loop = RecordingPollLoop::default();
        registry.hangup(&poll_loop, fd, "ctr");
        registry.hangup(&poll_loop, fd, "ctr");

        assert_eq!(poll_loop.deregistered(), vec![fd]);
    }

    #[test]
    fn distinct_fds_are_each_torn_down() {
        let mut first = Pipe::nonblocking();
        let mut second = Pipe::nonblocking();
        let fd_a = first.release_read();
        let fd_b = second.release_read();

        let registry = HangupRegistry::new();
        let poll_loop = RecordingPollLoop::default();
        registry.hangup(&poll_loop, fd_a, "ctr");
        registry.hangup(&poll_loop, fd_b, "ctr");

        assert_eq!(poll_loop.deregistered(), vec![fd_a, fd_b]);
    }

    /// A descriptor number reported readable again is a recycled number:
    /// its next hangup must run the full teardown once more.
    #[test]
    fn reopened_fd_hangs_up_again() {
        let mut pipe = Pipe::nonblocking();
        let fd = pipe.release_read();

        let registry = HangupRegistry::new();
        let poll_loop = RecordingPollLoop::default();
        // Created while `fd` is still open so pipe2 cannot hand its read end
        // the same number, which would make the dup2 below a no-op and the
        // pipe's drop a double close.
        let replacement = Pipe::nonblocking();
        registry.hangup(&poll_loop, fd, "ctr");

        // Reuse the number, as the kernel would for a new stream.
        // SAFETY: `fd` was closed by the hangup above; dup2 atomically makes
        // it refer to the replacement pipe's read end.
        let duped = unsafe { libc::dup2(replacement.read_fd(), fd) };
        assert_eq!(duped, fd);

        registry.reopened(fd);
        registry.hangup(&poll_loop, fd, "ctr");

        assert_eq!(poll_loop.deregistered(), vec![fd, fd]);
    }

    /// Reopening a never-hung-up descriptor leaves the registry unchanged.
    #[test]
    fn reopened_is_a_no_op_for_unknown_fds() {
        let mut pipe = Pipe::nonblocking();
        let fd = pipe.release_read();

        let registry = HangupRegistry::new();
        let poll_loop = RecordingPollLoop::default();
        registry.reopened(fd);
        registry.hangup(&poll_loop, fd, "ctr");
        registry.hangup(&poll_loop, fd, "ctr");

        assert_eq!(poll_loop.deregistered(), vec![fd]);
    }
}
