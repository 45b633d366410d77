//! Control socket client.
//!
//! The daemon speaks a line protocol: every reply line starts with a four-digit code followed
//! by `-` when more lines of the reply follow, or by a space on the final line. Lines starting
//! with a single space continue the previous line. Codes `8xxx` and `9xxx` report run-time
//! and syntax errors.
//!
//! ```text
//! 0001 BIRD 2.0.12 ready.
//! show route table master6 count
//! 0014 197991 of 440662 routes for 220785 networks in table master6
//! ```
//!
//! Each query opens its own connection, so concurrent queries against one socket never share
//! a connection.

use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::time::Duration;

use super::{Querier, TransportError};

/// Default cap on a single reply.
///
/// A full-table listing on a DFZ-sized table runs to several hundred MiB, so sampling through
/// a table listing needs a larger cap, see [`UnixSocketQuerier::with_max_reply_bytes`].
pub const DEFAULT_MAX_REPLY_BYTES: usize = 256 * 1024 * 1024;

/// [`Querier`] that treats the channel identifier as the path of a Unix control socket.
#[derive(Debug, Clone)]
pub struct UnixSocketQuerier {
    timeout: Option<Duration>,
    max_reply_bytes: usize,
}

impl UnixSocketQuerier {
    /// Creates a querier whose reads and writes each time out after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            max_reply_bytes: DEFAULT_MAX_REPLY_BYTES,
        }
    }

    /// Caps the size of a single reply; longer replies fail as oversized.
    pub fn with_max_reply_bytes(mut self, max_reply_bytes: usize) -> Self {
        self.max_reply_bytes = max_reply_bytes;
        self
    }

    fn exchange(&self, path: &Path, command: &str) -> std::io::Result<String> {
        let stream = UnixStream::connect(path)?;
        stream.set_read_timeout(self.timeout)?;
        stream.set_write_timeout(self.timeout)?;

        let mut reader = BufReader::new(stream.try_clone()?);
        let mut writer = stream;

        let welcome = read_reply(&mut reader, self.max_reply_bytes)?;
        log::trace!("connected to {}: {}", path.display(), welcome.trim_end());

        writer.write_all(command.trim_end_matches('\n').as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        read_reply(&mut reader, self.max_reply_bytes)
    }
}

impl Querier for UnixSocketQuerier {
    fn query(&self, channel: &str, command: &str) -> Result<String, TransportError> {
        let before = std::time::Instant::now();
        let reply = self
            .exchange(Path::new(channel), command)
            .map_err(|source| TransportError::new(channel, command, source))?;
        log::trace!(
            "`{}` on {} returned {} bytes in {} ms",
            command,
            channel,
            reply.len(),
            before.elapsed().as_millis()
        );
        Ok(reply)
    }
}

/// Returns the reply code if `line` is the final line of a reply.
fn final_line_code(line: &str) -> Option<&str> {
    let bytes = line.as_bytes();
    if bytes.len() < 4 || !bytes[..4].iter().all(u8::is_ascii_digit) {
        return None;
    }
    match bytes.get(4) {
        None | Some(b' ') | Some(b'\n') | Some(b'\r') => Some(&line[..4]),
        _ => None,
    }
}

/// Reads lines until the final line of a reply and returns them verbatim.
fn read_reply<R: BufRead>(reader: &mut R, max_reply_bytes: usize) -> std::io::Result<String> {
    let mut reply = String::new();
    loop {
        let start = reply.len();
        if reader.read_line(&mut reply)? == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "connection closed before end of reply",
            ));
        }
        if reply.len() > max_reply_bytes {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("reply exceeds {max_reply_bytes} bytes"),
            ));
        }

        let line = &reply[start..];
        if let Some(code) = final_line_code(line) {
            if code.starts_with('8') || code.starts_with('9') {
                return Err(std::io::Error::other(format!(
                    "daemon error: {}",
                    line.trim_end()
                )));
            }
            return Ok(reply);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::os::unix::net::UnixListener;
    use std::path::PathBuf;
    use std::thread::JoinHandle;

    /// Accepts one connection, sends the welcome, records the command and answers `reply`.
    fn spawn_fake_daemon(path: &Path, reply: &'static str) -> JoinHandle<String> {
        let listener = UnixListener::bind(path).unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            stream.write_all(b"0001 BIRD 2.0.12 ready.\n").unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut command = String::new();
            reader.read_line(&mut command).unwrap();
            stream.write_all(reply.as_bytes()).unwrap();
            command
        })
    }

    fn socket_path(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join("bird.ctl")
    }

    #[test]
    fn test_query_returns_full_reply() {
        let dir = tempfile::tempdir().unwrap();
        let path = socket_path(&dir);
        let daemon = spawn_fake_daemon(
            &path,
            "1007-10.0.0.0/8 unicast [bgp1 12:34:56] * (100)\n \tvia 192.0.2.1 on eth0\n0000 \n",
        );

        let querier = UnixSocketQuerier::new(Duration::from_secs(5));
        let reply = querier
            .query(path.to_str().unwrap(), "show route protocol bgp1")
            .unwrap();

        assert_eq!(daemon.join().unwrap(), "show route protocol bgp1\n");
        assert!(reply.starts_with("1007-10.0.0.0/8"));
        assert!(reply.ends_with("0000 \n"));
    }

    #[test]
    fn test_daemon_error_is_transport_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = socket_path(&dir);
        let daemon = spawn_fake_daemon(&path, "9001 syntax error, unexpected CF_SYM_UNDEFINED\n");

        let querier = UnixSocketQuerier::new(Duration::from_secs(5));
        let err = querier
            .query(path.to_str().unwrap(), "show route bogus")
            .unwrap_err();
        daemon.join().unwrap();

        assert_eq!(err.command, "show route bogus");
        assert!(err.source.to_string().contains("9001"));
    }

    #[test]
    fn test_missing_socket() {
        let dir = tempfile::tempdir().unwrap();
        let path = socket_path(&dir);

        let querier = UnixSocketQuerier::new(Duration::from_secs(1));
        let err = querier
            .query(path.to_str().unwrap(), "show route count")
            .unwrap_err();

        assert_eq!(err.channel, path.to_str().unwrap());
        assert_eq!(err.source.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn test_oversized_reply() {
        let dir = tempfile::tempdir().unwrap();
        let path = socket_path(&dir);
        let daemon = spawn_fake_daemon(&path, "1007-10.0.0.0/8 unicast\n1007-10.1.0.0/16 unicast\n0000 \n");

        let querier = UnixSocketQuerier::new(Duration::from_secs(5)).with_max_reply_bytes(30);
        let err = querier
            .query(path.to_str().unwrap(), "show route")
            .unwrap_err();
        daemon.join().unwrap();

        assert_eq!(err.source.kind(), std::io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_connection_closed_mid_reply() {
        let dir = tempfile::tempdir().unwrap();
        let path = socket_path(&dir);
        let daemon = spawn_fake_daemon(&path, "1007-10.0.0.0/8 unicast\n");

        let querier = UnixSocketQuerier::new(Duration::from_secs(5));
        let err = querier
            .query(path.to_str().unwrap(), "show route")
            .unwrap_err();
        daemon.join().unwrap();

        assert_eq!(err.source.kind(), std::io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let path = socket_path(&dir);
        let listener = UnixListener::bind(&path).unwrap();
        let daemon = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            stream.write_all(b"0001 BIRD 2.0.12 ready.\n").unwrap();
            // never answer, wait for the client to give up and hang up
            let mut buf = Vec::new();
            let _ = stream.read_to_end(&mut buf);
        });

        let querier = UnixSocketQuerier::new(Duration::from_millis(100));
        let err = querier
            .query(path.to_str().unwrap(), "show route")
            .unwrap_err();
        daemon.join().unwrap();

        assert!(matches!(
            err.source.kind(),
            std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
        ));
    }

    #[test]
    fn test_final_line_code() {
        assert_eq!(final_line_code("0000 \n"), Some("0000"));
        assert_eq!(final_line_code("0000\n"), Some("0000"));
        assert_eq!(final_line_code("1007-10.0.0.0/8\n"), None);
        assert_eq!(final_line_code(" continuation\n"), None);
        assert_eq!(final_line_code("2001:db8::/32\n"), None);
    }
}
