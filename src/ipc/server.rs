//! Control socket server.
//!
//! Socket I/O happens on helper threads: one accepts connections and each connection gets its own
//! thread reading JSON-line requests. Requests travel to the event loop over a calloop channel and
//! are answered through a per-request reply channel, so state only changes on the main thread.
//!
//! After [`Request::EventStream`] the connection is handed to the event loop, which writes
//! [`Event`]s to it as they happen.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;
use std::{env, fs, process, thread};

use anyhow::{anyhow, Context};
use cairn_ipc::{Event, Reply, Request, Response, SOCKET_PATH_ENV};
use calloop::channel::{self, Sender};
use calloop::LoopHandle;
use directories::BaseDirs;
use tracing::{debug, info, trace, warn};

use crate::state::State;

/// Upper bound on how long a reply write may block a connection thread.
const WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Longest accepted request line, in bytes.
const MAX_REQUEST_LEN: u64 = 64 * 1024;

enum Message {
    Request {
        request: Request,
        reply: mpsc::SyncSender<Reply>,
    },
    /// A connection that switched to receiving events.
    Subscribe(UnixStream),
}

pub struct IpcServer {
    pub socket_path: PathBuf,
    /// Event stream clients. Non-blocking; a client that can't keep up is dropped.
    subscribers: Vec<UnixStream>,
}

impl IpcServer {
    /// Binds the socket, starts the listener thread and exports `$CAIRN_SOCKET`.
    pub fn start(
        event_loop: &LoopHandle<'static, State>,
        socket_path: Option<PathBuf>,
    ) -> anyhow::Result<Self> {
        let _span = tracy_client::span!("IpcServer::start");

        let socket_path = socket_path.unwrap_or_else(default_socket_path);
        if socket_path.exists() {
            fs::remove_file(&socket_path).with_context(|| {
                format!("error removing stale socket at {}", socket_path.display())
            })?;
        }
        let listener = UnixListener::bind(&socket_path)
            .with_context(|| format!("error binding socket at {}", socket_path.display()))?;

        let (to_main, from_threads) = channel::channel();
        event_loop
            .insert_source(from_threads, |event, _, state| match event {
                channel::Event::Msg(message) => state.on_ipc_message(message),
                channel::Event::Closed => (),
            })
            .map_err(|err| err.error)
            .context("error inserting IPC channel source")?;

        thread::Builder::new()
            .name("IPC listener".to_owned())
            .spawn(move || accept_loop(listener, to_main))
            .context("error spawning IPC listener thread")?;

        env::set_var(SOCKET_PATH_ENV, &socket_path);
        info!("listening on {}", socket_path.display());

        Ok(Self {
            socket_path,
            subscribers: Vec::new(),
        })
    }

    /// Writes an event to every event stream client.
    pub fn send_event(&mut self, event: &Event) {
        if self.subscribers.is_empty() {
            return;
        }

        let mut buf = match serde_json::to_vec(event) {
            Ok(buf) => buf,
            Err(err) => {
                warn!("error serializing IPC event: {err}");
                return;
            }
        };
        buf.push(b'\n');

        self.subscribers
            .retain_mut(|stream| match stream.write_all(&buf) {
                Ok(()) => true,
                Err(err) => {
                    debug!("dropping event stream client: {err}");
                    false
                }
            });
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.socket_path);
    }
}

impl State {
    fn on_ipc_message(&mut self, message: Message) {
        match message {
            Message::Request { request, reply } => {
                let result = self.handle_ipc_request(request);
                if reply.send(result).is_err() {
                    debug!("IPC client went away before the reply");
                }
            }
            Message::Subscribe(stream) => {
                if let Some(server) = &mut self.ipc_server {
                    debug!("new event stream client");
                    server.subscribers.push(stream);
                }
            }
        }
    }
}

fn default_socket_path() -> PathBuf {
    let dir = BaseDirs::new()
        .and_then(|dirs| dirs.runtime_dir().map(Path::to_path_buf))
        .unwrap_or_else(env::temp_dir);
    dir.join(format!("cairn.{}.sock", process::id()))
}

fn accept_loop(listener: UnixListener, to_main: Sender<Message>) {
    for stream in listener.incoming() {
        let stream = match stream {
            Ok(stream) => stream,
            Err(err) => {
                warn!("error accepting IPC connection: {err}");
                continue;
            }
        };

        let to_main = to_main.clone();
        let res = thread::Builder::new()
            .name("IPC connection".to_owned())
            .spawn(move || {
                if let Err(err) = serve_client(stream, to_main) {
                    debug!("IPC client error: {err:?}");
                }
            });
        if let Err(err) = res {
            warn!("error spawning IPC connection thread: {err}");
        }
    }
}

fn serve_client(stream: UnixStream, to_main: Sender<Message>) -> anyhow::Result<()> {
    stream.set_write_timeout(Some(WRITE_TIMEOUT))?;
    let mut reader = BufReader::new(stream.try_clone().context("error cloning stream")?);
    let mut writer = stream;

    let mut line = Vec::new();
    loop {
        line.clear();
        let read = (&mut reader)
            .take(MAX_REQUEST_LEN)
            .read_until(b'\n', &mut line)?;
        if read == 0 {
            return Ok(());
        }
        if !line.ends_with(b"\n") && read as u64 == MAX_REQUEST_LEN {
            // The rest of the line is still unread, so there is no way to find the next request.
            let reply = Err(format!("request is longer than {MAX_REQUEST_LEN} bytes"));
            write_reply(&mut writer, &reply)?;
            return Ok(());
        }

        let (reply, subscribe) = match serde_json::from_slice::<Request>(&line) {
            Ok(Request::EventStream) => (Ok(Response::Handled), true),
            Ok(request) => (forward(&to_main, request), false),
            Err(err) => (Err(format!("error parsing request: {err}")), false),
        };
        write_reply(&mut writer, &reply)?;

        if subscribe {
            writer.set_nonblocking(true)?;
            to_main
                .send(Message::Subscribe(writer))
                .map_err(|_| anyhow!("event loop is gone"))?;
            return Ok(());
        }
    }
}

fn forward(to_main: &Sender<Message>, request: Request) -> Reply {
    trace!("forwarding {request:?} to the event loop");

    let (reply, rx) = mpsc::sync_channel(1);
    if to_main.send(Message::Request { request, reply }).is_err() {
        return Err(String::from("compositor is shutting down"));
    }
    rx.recv()
        .unwrap_or_else(|_| Err(String::from("compositor dropped the request")))
}

fn write_reply(writer: &mut impl Write, reply: &Reply) -> io::Result<()> {
    let mut buf = serde_json::to_vec(reply)?;
    buf.push(b'\n');
    writer.write_all(&buf)?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(subscribers: Vec<UnixStream>) -> IpcServer {
        IpcServer {
            socket_path: env::temp_dir().join("cairn-test-never-bound.sock"),
            subscribers,
        }
    }

    #[test]
    fn events_reach_subscribers_as_lines() {
        let (ours, mut theirs) = UnixStream::pair().unwrap();
        let mut server = server(vec![ours]);

        server.send_event(&Event::WorkspaceActivated { id: 2 });
        server.send_event(&Event::WindowFocusChanged { id: None });
        drop(server);

        let mut buf = String::new();
        theirs.read_to_string(&mut buf).unwrap();
        let events: Vec<Event> = buf
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(
            events,
            [
                Event::WorkspaceActivated { id: 2 },
                Event::WindowFocusChanged { id: None },
            ]
        );
    }

    #[test]
    fn closed_subscriber_is_dropped() {
        let (ours, theirs) = UnixStream::pair().unwrap();
        let mut server = server(vec![ours]);
        drop(theirs);

        server.send_event(&Event::ConfigLoaded { failed: false });
        assert!(server.subscribers.is_empty());
    }

    fn read_reply(reader: &mut impl BufRead) -> Reply {
        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        serde_json::from_str(&line).unwrap()
    }

    #[test]
    fn malformed_request_keeps_connection_open() {
        let (ours, theirs) = UnixStream::pair().unwrap();
        let (to_main, _from_client) = channel::channel();
        let server = thread::spawn(move || serve_client(ours, to_main));

        let mut writer = theirs.try_clone().unwrap();
        writer.write_all(b"\xff\xfe\n\"EventStream\"\n").unwrap();

        let mut reader = BufReader::new(theirs);
        let err = read_reply(&mut reader).unwrap_err();
        assert!(err.starts_with("error parsing request"), "{err}");
        assert_eq!(read_reply(&mut reader), Ok(Response::Handled));

        server.join().unwrap().unwrap();
    }

    #[test]
    fn overlong_request_is_refused() {
        let (ours, theirs) = UnixStream::pair().unwrap();
        let (to_main, _from_client) = channel::channel();
        let server = thread::spawn(move || serve_client(ours, to_main));

        let mut writer = theirs.try_clone().unwrap();
        let flood = thread::spawn(move || {
            // The server hangs up partway through.
            let _ = writer.write_all(&vec![b'a'; MAX_REQUEST_LEN as usize + 100]);
        });

        let mut reader = BufReader::new(theirs);
        let err = read_reply(&mut reader).unwrap_err();
        assert_eq!(err, "request is longer than 65536 bytes");

        server.join().unwrap().unwrap();
        flood.join().unwrap();
    }

    #[test]
    fn replies_are_json_lines() {
        let mut buf = Vec::new();
        write_reply(&mut buf, &Ok(Response::Handled)).unwrap();
        write_reply(&mut buf, &Err(String::from("no window with id 3"))).unwrap();
        let text = String::from_utf8(buf).unwrap();
        insta::assert_snapshot!(text.trim_end(), @r#"{"Ok":"Handled"}
{"Err":"no window with id 3"}"#);
    }
}
