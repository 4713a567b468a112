// Raw descriptor helpers shared by the forwarding loops.
//
// The PTY and backlog descriptors arrive from the poll loop / container
// plumbing as raw fds, so the read side stays at the libc level rather than
// borrowing them into `File` wrappers that would close on drop.

use std::io;
use std::os::fd::RawFd;

/// Outcome of one read attempt against a poll-loop descriptor.
pub(crate) enum ReadOutcome {
    /// `n` bytes were read into the buffer.
    Data(usize),
    /// The descriptor reported end of data.
    EndOfData,
    /// A non-blocking descriptor has nothing available right now.
    NoDataYet,
    /// The read failed for some other reason.
    Failed(io::Error),
}

/// Reads from `fd` into `buf`, retrying automatically when a signal
/// interrupts the call.
pub(crate) fn read_available(fd: RawFd, buf: &mut [u8]) -> ReadOutcome {
    loop {
        // SAFETY: `buf` is a valid writable slice for the duration of the
        // call and the requested byte count never exceeds its length. The
        // descriptor stays open across the call: it is owned by the poll
        // loop (or the dump caller) until hangup hands it to the sink.
        let ret = unsafe { libc::read(fd, buf.as_mut_ptr().cast::<libc::c_void>(), buf.len()) };
        if ret > 0 {
            #[allow(clippy::cast_sign_loss)]
            return ReadOutcome::Data(ret as usize);
        }
        if ret == 0 {
            return ReadOutcome::EndOfData;
        }
        let error = io::Error::last_os_error();
        match error.kind() {
            io::ErrorKind::Interrupted => {}
            io::ErrorKind::WouldBlock => return ReadOutcome::NoDataYet,
            _ => return ReadOutcome::Failed(error),
        }
    }
}

/// Closes a descriptor whose ownership has transferred to the sink.
pub(crate) fn close(fd: RawFd) -> io::Result<()> {
    // SAFETY: callers only pass descriptors that are open and that the sink
    // now owns (the hangup transition); the fd is not used again afterwards.
    if unsafe { libc::close(fd) } == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_support::Pipe;

    #[test]
    fn read_available_returns_data_then_no_data_on_nonblocking_pipe() {
        let pipe = Pipe::nonblocking();
        pipe.write_all(b"abc");

        let mut buf = [0u8; 16];
        match read_available(pipe.read_fd(), &mut buf) {
            ReadOutcome::Data(3) => assert_eq!(&buf[..3], b"abc"),
            _ => panic!("expected three bytes"),
        }
        assert!(matches!(
            read_available(pipe.read_fd(), &mut buf),
            ReadOutcome::NoDataYet
        ));
    }

    #[test]
    fn read_available_reports_end_of_data_after_writer_closes() {
        let mut pipe = Pipe::nonblocking();
        pipe.close_write();

        let mut buf = [0u8; 16];
        assert!(matches!(
            read_available(pipe.read_fd(), &mut buf),
            ReadOutcome::EndOfData
        ));
    }

    #[test]
    fn read_available_reports_hard_errors() {
        let mut buf = [0u8; 16];
        assert!(matches!(read_available(-1, &mut buf), ReadOutcome::Failed(_)));
    }

    #[test]
    fn close_rejects_invalid_descriptor() {
        assert!(close(-1).is_err());
    }
}
