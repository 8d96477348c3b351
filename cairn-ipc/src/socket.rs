//! Helper for blocking communication over the control socket.

use std::env;
use std::io::{self, BufRead, BufReader, Write};
use std::net::Shutdown;
use std::os::unix::net::UnixStream;
use std::path::Path;

use crate::{Event, Reply, Request};

/// Name of the environment variable containing the socket path.
pub const SOCKET_PATH_ENV: &str = "CAIRN_SOCKET";

/// Helper for blocking communication over the control socket.
#[derive(Debug)]
pub struct Socket {
    stream: BufReader<UnixStream>,
}

impl Socket {
    /// Connects to the socket at `$CAIRN_SOCKET`.
    pub fn connect() -> io::Result<Self> {
        let socket_path = env::var_os(SOCKET_PATH_ENV).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{SOCKET_PATH_ENV} is not set, are you running this within cairn?"),
            )
        })?;
        Self::connect_to(socket_path)
    }

    /// Connects to the socket at the given path.
    pub fn connect_to(path: impl AsRef<Path>) -> io::Result<Self> {
        let stream = UnixStream::connect(path.as_ref())?;
        Ok(Self {
            stream: BufReader::new(stream),
        })
    }

    /// Sends a request and reads the reply.
    ///
    /// The connection stays open, so several requests can be sent over one socket.
    pub fn send(&mut self, request: Request) -> io::Result<Reply> {
        let mut buf = serde_json::to_string(&request)?;
        buf.push('\n');
        self.stream.get_mut().write_all(buf.as_bytes())?;

        buf.clear();
        self.stream.read_line(&mut buf)?;
        if buf.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "compositor closed the connection",
            ));
        }

        let reply = serde_json::from_str(&buf)?;
        Ok(reply)
    }

    /// Turns this socket into an event reader after a successful [`Request::EventStream`].
    pub fn read_events(mut self) -> impl FnMut() -> io::Result<Event> {
        let _ = self.stream.get_mut().shutdown(Shutdown::Write);

        let mut buf = String::new();
        move || {
            buf.clear();
            self.stream.read_line(&mut buf)?;
            if buf.is_empty() {
                return Err(io::Error::from(io::ErrorKind::UnexpectedEof));
            }
            let event = serde_json::from_str(&buf)?;
            Ok(event)
        }
    }
}
