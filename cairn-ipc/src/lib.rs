//! Types for communicating with cairn via its control socket.
//!
//! The socket path is in the `$CAIRN_SOCKET` environment variable. Each request is a single line
//! of JSON; the compositor answers each line with a single line of JSON containing a [`Reply`].
//! After a successful [`Request::EventStream`] the connection switches to a stream of [`Event`]s,
//! one per line.
#![warn(missing_docs)]

use serde::{Deserialize, Serialize};

mod socket;
pub use socket::{Socket, SOCKET_PATH_ENV};

/// Request from a client to the compositor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Request {
    /// Request the version string of the running compositor.
    Version,
    /// Request information about all windows.
    Windows,
    /// Request information about all workspaces.
    Workspaces,
    /// Request information about the focused window.
    FocusedWindow,
    /// Perform an action.
    Action(Action),
    /// Start continuously receiving events from the compositor.
    EventStream,
}

/// Reply from the compositor: success or an error message.
pub type Reply = Result<Response, String>;

/// Successful response from the compositor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Response {
    /// The request was handled and produced no data.
    Handled,
    /// Version of the running compositor.
    Version(String),
    /// Information about all windows.
    Windows(Vec<Window>),
    /// Information about all workspaces.
    Workspaces(Vec<Workspace>),
    /// Information about the focused window.
    FocusedWindow(Option<Window>),
}

/// Actions that the compositor can perform on request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "clap", derive(clap::Subcommand))]
#[cfg_attr(feature = "clap", command(subcommand_value_name = "ACTION"))]
#[cfg_attr(feature = "clap", command(subcommand_help_heading = "Actions"))]
pub enum Action {
    /// Re-run the tiling layout for the active workspace.
    ArrangeWindows {},
    /// Switch to a workspace, creating it if needed.
    SwitchToWorkspace {
        /// Id of the workspace.
        #[cfg_attr(feature = "clap", arg())]
        id: u32,
    },
    /// Reload the config file, re-applying layout parameters.
    ReloadConfig {},
    /// Focus a window by id and raise it to the front of its workspace.
    FocusWindow {
        /// Id of the window.
        #[cfg_attr(feature = "clap", arg(long))]
        id: u64,
    },
    /// Ask a window to close.
    CloseWindow {
        /// Id of the window.
        #[cfg_attr(feature = "clap", arg(long))]
        id: u64,
    },
    /// Exit the compositor.
    Quit {},
}

/// Geometry of a window in the global compositor space.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Geometry {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width.
    pub width: i32,
    /// Height.
    pub height: i32,
}

/// A toplevel window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Window {
    /// Unique id of this window.
    ///
    /// Ids are never reused while the compositor runs.
    pub id: u64,
    /// Title, if set.
    pub title: Option<String>,
    /// Application ID, if set.
    pub app_id: Option<String>,
    /// Id of the workspace this window is on, if any.
    pub workspace_id: Option<u32>,
    /// Whether this window has keyboard focus.
    pub is_focused: bool,
    /// Current on-screen geometry, including animation progress.
    pub geometry: Geometry,
}

/// A workspace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Workspace {
    /// Id of the workspace.
    pub id: u32,
    /// Name of the workspace.
    pub name: String,
    /// Whether this is the single active workspace.
    pub is_active: bool,
    /// Member window ids, most recently focused first.
    pub windows: Vec<u64>,
    /// Id of the master window, if one is recorded.
    pub master_window_id: Option<u64>,
}

/// A compositor event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Event {
    /// Keyboard focus moved to a window, or away from all windows.
    WindowFocusChanged {
        /// Id of the newly focused window, if any.
        id: Option<u64>,
    },
    /// A workspace became the active one.
    WorkspaceActivated {
        /// Id of the workspace.
        id: u32,
    },
    /// A window was mapped or its title/app-id changed.
    WindowOpenedOrChanged {
        /// The new window state.
        window: Window,
    },
    /// A window was destroyed.
    WindowClosed {
        /// Id of the removed window.
        id: u64,
    },
    /// The config was (re)loaded.
    ConfigLoaded {
        /// Whether loading failed and the previous config stays active.
        failed: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_wire_format() {
        let request = Request::Action(Action::SwitchToWorkspace { id: 2 });
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"Action":{"SwitchToWorkspace":{"id":2}}}"#);
        assert_eq!(serde_json::from_str::<Request>(&json).unwrap(), request);
    }

    #[test]
    fn error_reply_wire_format() {
        let reply: Reply = Err(String::from("no such window"));
        let json = serde_json::to_string(&reply).unwrap();
        assert_eq!(json, r#"{"Err":"no such window"}"#);
    }
}
