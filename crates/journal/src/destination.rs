use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

use crate::priority::Priority;
use crate::stream::{JOURNAL_STDOUT_SOCKET, JournalStream};

/// A destination stream with its fail-safe fallbacks made explicit.
///
/// The journald connection is attempted once, at construction. When it cannot
/// be established the destination degrades to `/dev/null`, and if even that
/// fails, to an in-process byte drop. Whatever variant construction lands on
/// stays in place for the destination's whole lifetime and is closed exactly
/// once, on drop.
#[derive(Debug)]
pub enum Destination {
    /// Live journald stream connection.
    Journal(JournalStream),
    /// `/dev/null` stand-in used when the journal facility is unavailable.
    Discard(File),
    /// Last-resort stand-in when `/dev/null` itself cannot be opened.
    Null,
}

impl Destination {
    /// Opens a journald destination for `identifier`, degrading on failure.
    ///
    /// Never fails: a sink must stay constructible and operational even when
    /// log visibility is lost.
    pub fn journal(identifier: &str, priority: Priority) -> Self {
        Self::journal_at(Path::new(JOURNAL_STDOUT_SOCKET), identifier, priority)
    }

    /// Like [`Destination::journal`] with an explicit stream socket path.
    pub fn journal_at(socket: &Path, identifier: &str, priority: Priority) -> Self {
        match JournalStream::connect_path(socket, identifier, priority) {
            Ok(stream) => Self::Journal(stream),
            Err(error) => {
                tracing::warn!(
                    identifier,
                    error = %error,
                    "journald stream unavailable, container output will be discarded"
                );
                Self::discard()
            }
        }
    }

    /// Opens the discard fallback directly.
    pub fn discard() -> Self {
        match OpenOptions::new()
            .write(true)
            .custom_flags(libc::O_CLOEXEC)
            .open("/dev/null")
        {
            Ok(file) => Self::Discard(file),
            Err(error) => {
                tracing::warn!(error = %error, "failed to open /dev/null for discard destination");
                Self::Null
            }
        }
    }

    /// Reports whether writes actually reach the journal facility.
    pub const fn is_journal(&self) -> bool {
        matches!(self, Self::Journal(_))
    }
}

impl Write for Destination {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Journal(stream) => stream.write(buf),
            Self::Discard(file) => file.write(buf),
            Self::Null => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Journal(stream) => stream.flush(),
            Self::Discard(file) => file.flush(),
            Self::Null => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;
    use std::os::unix::net::UnixListener;

    use super::*;

    #[test]
    fn unreachable_socket_degrades_to_discard() {
        let dir = tempfile::tempdir().expect("create scratch directory");
        let missing = dir.path().join("no-journald-here");

        let mut destination = Destination::journal_at(&missing, "ctr-7", Priority::Info);
        assert!(!destination.is_journal());

        // Writes are accepted and dropped rather than reported as failures.
        assert_eq!(destination.write(b"lost output\n").expect("write"), 12);
        destination.flush().expect("flush");
    }

    #[test]
    fn unreachable_socket_warns_exactly_once() {
        let dir = tempfile::tempdir().expect("create scratch directory");
        let missing = dir.path().join("no-journald-here");

        let counter = test_support::WarningCounter::default();
        let destination = tracing::subscriber::with_default(counter.clone(), || {
            Destination::journal_at(&missing, "ctr-7", Priority::Info)
        });

        assert!(!destination.is_journal());
        assert_eq!(counter.warnings(), 1);
    }

    #[test]
    fn reachable_socket_yields_a_journal_destination() {
        let dir = tempfile::tempdir().expect("create scratch directory");
        let path = dir.path().join("stdout");
        let listener = UnixListener::bind(&path).expect("bind stream socket");

        let mut destination = Destination::journal_at(&path, "ctr-8", Priority::Debug);
        assert!(destination.is_journal());

        let (mut accepted, _) = listener.accept().expect("accept stream connection");
        let mut header = vec![0u8; b"ctr-8\n\n7\n1\n0\n0\n0\n".len()];
        accepted.read_exact(&mut header).expect("read header");
        assert_eq!(header, b"ctr-8\n\n7\n1\n0\n0\n0\n");

        destination.write_all(b"line\n").expect("relay");
        let mut payload = vec![0u8; 5];
        accepted.read_exact(&mut payload).expect("read payload");
        assert_eq!(payload, b"line\n");
    }

    #[test]
    fn discard_accepts_all_writes() {
        let mut destination = Destination::discard();
        assert!(!destination.is_journal());
        destination.write_all(&[0u8; 8192]).expect("write to /dev/null");
    }

    #[test]
    fn null_variant_swallows_bytes() {
        let mut destination = Destination::Null;
        assert_eq!(destination.write(b"abc").expect("write"), 3);
        destination.flush().expect("flush");
    }
}
