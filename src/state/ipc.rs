//! Control socket requests, executed on the event loop.

use cairn_ipc::{Action, Geometry, Reply, Request, Response};
use tracing::{debug, warn};

use super::State;
use crate::protocol::ClientRequest;
use crate::window::WindowId;
use crate::workspace::Workspace;

impl State {
    /// Answers a control socket request.
    ///
    /// [`Request::EventStream`] is handled by the connection itself and never reaches this point.
    pub fn handle_ipc_request(&mut self, request: Request) -> Reply {
        let _span = tracy_client::span!("State::handle_ipc_request");
        debug!("IPC request: {request:?}");

        let reply = match request {
            Request::Version => Ok(Response::Version(env!("CARGO_PKG_VERSION").to_owned())),
            Request::Windows => {
                let windows = self
                    .registry
                    .windows
                    .keys()
                    .filter_map(|id| self.ipc_window(id))
                    .collect();
                Ok(Response::Windows(windows))
            }
            Request::Workspaces => {
                let active = self.workspaces.active_id();
                let workspaces = self
                    .workspaces
                    .iter()
                    .map(|ws| ipc_workspace(ws, ws.id() == active))
                    .collect();
                Ok(Response::Workspaces(workspaces))
            }
            Request::FocusedWindow => {
                let window = self.focus.window.and_then(|id| self.ipc_window(id));
                Ok(Response::FocusedWindow(window))
            }
            Request::Action(action) => self.do_ipc_action(action).map(|()| Response::Handled),
            Request::EventStream => Err(String::from("event stream must be requested by a client")),
        };

        self.flush_layout();
        reply
    }

    fn do_ipc_action(&mut self, action: Action) -> Result<(), String> {
        match action {
            Action::ArrangeWindows {} => self.arrange_windows(),
            Action::SwitchToWorkspace { id } => {
                if id == 0 {
                    return Err(String::from("workspace ids start at 1"));
                }
                self.switch_to_workspace(id);
            }
            Action::ReloadConfig {} => {
                self.reload_config()
                    .map_err(|err| format!("error loading config: {err:#}"))?;
            }
            Action::FocusWindow { id } => {
                let window = self.mapped_window(id)?;
                if let Some(ws) = self.workspaces.workspace_of(window) {
                    if ws != self.workspaces.active_id() {
                        self.switch_to_workspace(ws.0);
                    }
                }
                let surface = self.registry.windows[window].surface();
                self.focus_view(window, surface, true);
            }
            Action::CloseWindow { id } => {
                let window = self.mapped_window(id)?;
                let surface = self.registry.windows[window].surface();
                self.send(ClientRequest::Close { surface });
            }
            Action::Quit {} => {
                warn!("quit requested over IPC");
                self.stop();
            }
        }
        Ok(())
    }

    fn mapped_window(&self, id: u64) -> Result<WindowId, String> {
        let window = WindowId::from_u64(id);
        match self.registry.windows.get(window) {
            Some(win) if win.is_mapped() => Ok(window),
            _ => Err(format!("no window with id {id}")),
        }
    }

    /// IPC description of a mapped window.
    pub(crate) fn ipc_window(&self, id: WindowId) -> Option<cairn_ipc::Window> {
        let win = self.registry.windows.get(id)?;
        if !win.is_mapped() {
            return None;
        }

        let geo = win.geometry().to_i32_round();
        Some(cairn_ipc::Window {
            id: id.to_u64(),
            title: win.title.clone(),
            app_id: win.app_id.clone(),
            workspace_id: win.workspace.map(|ws| ws.0),
            is_focused: self.focus.window == Some(id),
            geometry: Geometry {
                x: geo.loc.x,
                y: geo.loc.y,
                width: geo.size.w,
                height: geo.size.h,
            },
        })
    }
}

fn ipc_workspace(ws: &Workspace, is_active: bool) -> cairn_ipc::Workspace {
    cairn_ipc::Workspace {
        id: ws.id().0,
        name: ws.name.clone(),
        is_active,
        windows: ws.windows().iter().map(|id| id.to_u64()).collect(),
        master_window_id: ws.master().map(WindowId::to_u64),
    }
}
