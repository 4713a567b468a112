// journald native stream transport.
//
// systemd exposes a stream socket (the same one `sd_journal_stream_fd()`
// connects to) that accepts a short header describing the stream followed by
// raw bytes. journald splits the byte stream on newlines and records one
// entry per line, tagged with the identifier and priority from the header.
// Speaking the protocol directly keeps the crate free of a libsystemd link
// dependency while producing identical journal entries.

use std::io::{self, Write};
use std::net::Shutdown;
use std::os::unix::net::UnixStream;
use std::path::Path;

use thiserror::Error;

use crate::priority::Priority;

/// Socket journald listens on for native stream connections.
pub const JOURNAL_STDOUT_SOCKET: &str = "/run/systemd/journal/stdout";

/// Errors from establishing a journald stream connection.
#[derive(Debug, Error)]
pub enum JournalStreamError {
    /// The stream socket could not be connected.
    #[error("failed to connect journald stream socket: {0}")]
    Connect(#[source] io::Error),
    /// The connection opened but the stream header could not be sent.
    #[error("failed to send journald stream header: {0}")]
    Header(#[source] io::Error),
}

/// A write-only conduit to journald, tagged with an identifier and priority.
///
/// Each newline-terminated run of bytes written to the stream becomes one
/// journal entry; journald performs the line splitting, so callers relay PTY
/// output verbatim. The connection is closed when the stream is dropped.
#[derive(Debug)]
pub struct JournalStream {
    socket: UnixStream,
}

impl JournalStream {
    /// Connects to the default journald stream socket.
    ///
    /// `identifier` tags every resulting journal entry (`SYSLOG_IDENTIFIER`)
    /// and `priority` sets their severity. Embedded newlines in the
    /// identifier would terminate a header field early, so they are replaced
    /// with spaces.
    pub fn connect(identifier: &str, priority: Priority) -> Result<Self, JournalStreamError> {
        Self::connect_path(Path::new(JOURNAL_STDOUT_SOCKET), identifier, priority)
    }

    /// Connects to a journald stream socket at an explicit path.
    ///
    /// Exists so tests can stand up their own listener; production callers
    /// use [`JournalStream::connect`].
    pub fn connect_path(
        path: &Path,
        identifier: &str,
        priority: Priority,
    ) -> Result<Self, JournalStreamError> {
        let mut socket = UnixStream::connect(path).map_err(JournalStreamError::Connect)?;
        // Data only ever flows towards journald.
        let _ = socket.shutdown(Shutdown::Read);
        socket
            .write_all(&stream_header(identifier, priority))
            .map_err(JournalStreamError::Header)?;
        Ok(Self { socket })
    }
}

impl Write for JournalStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.socket.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.socket.flush()
    }
}

/// Renders the seven-field stream header.
///
/// Fields, each newline-terminated: identifier, unit id (empty), priority
/// ordinal, level-prefix flag, then the forward-to-syslog/kmsg/console
/// flags. The level-prefix flag is set so journald honours `<N>` severity
/// prefixes in the stream, matching how the relay has always requested its
/// stream descriptor.
fn stream_header(identifier: &str, priority: Priority) -> Vec<u8> {
    let identifier = identifier.replace('\n', " ");
    let mut header = Vec::with_capacity(identifier.len() + 16);
    header.extend_from_slice(identifier.as_bytes());
    header.extend_from_slice(b"\n\n");
    header.extend_from_slice(priority.as_ordinal().to_string().as_bytes());
    header.extend_from_slice(b"\n1\n0\n0\n0\n");
    header
}

#[cfg(test)]
mod tests {
    use std::io::Read;
    use std::os::unix::net::UnixListener;
    use std::path::PathBuf;

    use super::*;

    fn listener_in_tempdir() -> (tempfile::TempDir, UnixListener, PathBuf) {
        let dir = tempfile::tempdir().expect("create scratch directory");
        let path = dir.path().join("stdout");
        let listener = UnixListener::bind(&path).expect("bind stream socket");
        (dir, listener, path)
    }

    #[test]
    fn header_carries_identifier_priority_and_flags() {
        let header = stream_header("container-1", Priority::Error);
        assert_eq!(header, b"container-1\n\n3\n1\n0\n0\n0\n");
    }

    #[test]
    fn header_replaces_embedded_newlines_in_identifier() {
        let header = stream_header("bad\nname", Priority::Info);
        assert_eq!(header, b"bad name\n\n6\n1\n0\n0\n0\n");
    }

    #[test]
    fn connect_path_sends_header_then_payload() {
        let (_dir, listener, path) = listener_in_tempdir();

        let mut stream = JournalStream::connect_path(&path, "ctr-42", Priority::Warning)
            .expect("connect to test listener");
        let (mut accepted, _) = listener.accept().expect("accept stream connection");

        let expected_header = b"ctr-42\n\n4\n1\n0\n0\n0\n";
        let mut header = vec![0u8; expected_header.len()];
        accepted.read_exact(&mut header).expect("read header");
        assert_eq!(header, expected_header);

        stream.write_all(b"hello from the pty\n").expect("relay bytes");
        let mut payload = vec![0u8; 19];
        accepted.read_exact(&mut payload).expect("read payload");
        assert_eq!(payload, b"hello from the pty\n");
    }

    #[test]
    fn connect_path_reports_missing_socket_as_connect_error() {
        let dir = tempfile::tempdir().expect("create scratch directory");
        let missing = dir.path().join("no-such-socket");

        let error = JournalStream::connect_path(&missing, "ctr", Priority::Info)
            .expect_err("connect must fail");
        assert!(matches!(error, JournalStreamError::Connect(_)));
    }

    #[test]
    fn error_display_names_the_failing_stage() {
        let error = JournalStreamError::Connect(io::Error::from(io::ErrorKind::NotFound));
        assert!(error.to_string().contains("connect"));

        let error = JournalStreamError::Header(io::Error::from(io::ErrorKind::BrokenPipe));
        assert!(error.to_string().contains("header"));
    }
}
