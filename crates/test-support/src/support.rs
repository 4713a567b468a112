use std::io::{self, Write};
use std::os::fd::{AsRawFd, FromRawFd, IntoRawFd, OwnedFd, RawFd};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use sink::PollLoop;
use tracing::span::{Attributes, Id, Record};
use tracing::{Event, Level, Metadata, Subscriber};

/// A `pipe2` pair with explicit ownership handling.
///
/// Both ends close on drop unless released. Tests that hand the read end to
/// a sink's hangup path must call [`Pipe::release_read`] so the descriptor
/// is not closed twice.
pub struct Pipe {
    read: Option<OwnedFd>,
    write: Option<OwnedFd>,
}

impl Pipe {
    /// Creates a pipe whose reads block until data or end of data.
    pub fn blocking() -> Self {
        Self::with_flags(libc::O_CLOEXEC)
    }

    /// Creates a pipe whose empty reads return `EWOULDBLOCK`.
    pub fn nonblocking() -> Self {
        Self::with_flags(libc::O_CLOEXEC | libc::O_NONBLOCK)
    }

    fn with_flags(flags: libc::c_int) -> Self {
        let mut fds = [0 as RawFd; 2];
        // SAFETY: `fds` points at two writable descriptor slots.
        let ret = unsafe { libc::pipe2(fds.as_mut_ptr(), flags) };
        assert_eq!(ret, 0, "pipe2 failed: {}", io::Error::last_os_error());
        // SAFETY: pipe2 returned two freshly opened descriptors we now own.
        unsafe {
            Self {
                read: Some(OwnedFd::from_raw_fd(fds[0])),
                write: Some(OwnedFd::from_raw_fd(fds[1])),
            }
        }
    }

    /// The read end's descriptor, still owned by the pipe.
    pub fn read_fd(&self) -> RawFd {
        self.read.as_ref().expect("read end released").as_raw_fd()
    }

    /// Writes `bytes` fully into the pipe.
    ///
    /// Panics on failure; test fixtures never exceed the pipe's capacity.
    pub fn write_all(&self, bytes: &[u8]) {
        let fd = self.write.as_ref().expect("write end closed").as_raw_fd();
        let mut remaining = bytes;
        while !remaining.is_empty() {
            // SAFETY: `remaining` is a valid readable slice and `fd` is an
            // open descriptor owned by this pipe.
            let ret = unsafe {
                libc::write(fd, remaining.as_ptr().cast::<libc::c_void>(), remaining.len())
            };
            assert!(ret > 0, "pipe write failed: {}", io::Error::last_os_error());
            #[allow(clippy::cast_sign_loss)]
            let written = ret as usize;
            remaining = &remaining[written..];
        }
    }

    /// Closes the write end so readers observe end of data.
    pub fn close_write(&mut self) {
        self.write = None;
    }

    /// Releases ownership of the read end to the caller.
    pub fn release_read(&mut self) -> RawFd {
        self.read.take().expect("read end already released").into_raw_fd()
    }
}

/// A `socketpair` whose reads preserve message boundaries.
///
/// `SOCK_SEQPACKET` returns exactly one sent packet per `read(2)`, so tests
/// can dictate the byte counts a drain loop observes on each read; pipes
/// coalesce consecutive writes and cannot. End of data is still a zero-byte
/// read once the write side closes.
pub struct SeqPacketPair {
    read: Option<OwnedFd>,
    write: Option<OwnedFd>,
}

impl SeqPacketPair {
    /// Creates a connected sequenced-packet pair.
    pub fn new() -> Self {
        let mut fds = [0 as RawFd; 2];
        // SAFETY: `fds` points at two writable descriptor slots.
        let ret = unsafe {
            libc::socketpair(
                libc::AF_UNIX,
                libc::SOCK_SEQPACKET | libc::SOCK_CLOEXEC,
                0,
                fds.as_mut_ptr(),
            )
        };
        assert_eq!(ret, 0, "socketpair failed: {}", io::Error::last_os_error());
        // SAFETY: socketpair returned two freshly opened descriptors we own.
        unsafe {
            Self {
                read: Some(OwnedFd::from_raw_fd(fds[0])),
                write: Some(OwnedFd::from_raw_fd(fds[1])),
            }
        }
    }

    /// The read end's descriptor, still owned by the pair.
    pub fn read_fd(&self) -> RawFd {
        self.read.as_ref().expect("read end released").as_raw_fd()
    }

    /// Sends `bytes` as one packet, observed by exactly one read.
    pub fn send(&self, bytes: &[u8]) {
        let fd = self.write.as_ref().expect("write end closed").as_raw_fd();
        // SAFETY: `bytes` is a valid readable slice and `fd` is an open
        // descriptor owned by this pair.
        let ret = unsafe { libc::write(fd, bytes.as_ptr().cast::<libc::c_void>(), bytes.len()) };
        #[allow(clippy::cast_possible_wrap)]
        let expected = bytes.len() as libc::ssize_t;
        assert_eq!(
            ret,
            expected,
            "seqpacket send failed: {}",
            io::Error::last_os_error()
        );
    }

    /// Closes the write end so readers observe end of data.
    pub fn close_write(&mut self) {
        self.write = None;
    }
}

impl Default for SeqPacketPair {
    fn default() -> Self {
        Self::new()
    }
}

/// Poll loop stand-in that records every deregistration request.
#[derive(Default)]
pub struct RecordingPollLoop {
    deregistered: Mutex<Vec<RawFd>>,
}

impl RecordingPollLoop {
    /// Descriptors deregistered so far, in call order.
    pub fn deregistered(&self) -> Vec<RawFd> {
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

/// Destination writer that records each write call as one chunk.
///
/// Clones share the same recording, so a test can keep one handle while the
/// sink owns another.
#[derive(Clone, Default)]
pub struct ChunkRecorder {
    chunks: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl ChunkRecorder {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded chunks, in write order.
    pub fn chunks(&self) -> Vec<Vec<u8>> {
        self.chunks.lock().expect("recorder lock poisoned").clone()
    }

    /// The recorded chunks concatenated into one byte sequence.
    pub fn concatenated(&self) -> Vec<u8> {
        self.chunks
            .lock()
            .expect("recorder lock poisoned")
            .iter()
            .flatten()
            .copied()
            .collect()
    }
}

impl Write for ChunkRecorder {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.chunks
            .lock()
            .expect("recorder lock poisoned")
            .push(buf.to_vec());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Minimal subscriber counting warning-level diagnostics.
///
/// Install a clone with `tracing::subscriber::with_default` around the code
/// under test, then read [`WarningCounter::warnings`] from the handle kept
/// outside. Spans are accepted and ignored; only `WARN` events count.
#[derive(Clone, Default)]
pub struct WarningCounter {
    warnings: Arc<AtomicUsize>,
}

impl WarningCounter {
    /// Warning events observed so far.
    pub fn warnings(&self) -> usize {
        self.warnings.load(Ordering::Relaxed)
    }
}

impl Subscriber for WarningCounter {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn new_span(&self, _attributes: &Attributes<'_>) -> Id {
        Id::from_u64(1)
    }

    fn record(&self, _id: &Id, _record: &Record<'_>) {}

    fn record_follows_from(&self, _id: &Id, _follows: &Id) {}

    fn event(&self, event: &Event<'_>) {
        if *event.metadata().level() == Level::WARN {
            self.warnings.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn enter(&self, _id: &Id) {}

    fn exit(&self, _id: &Id) {}
}
