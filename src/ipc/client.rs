use anyhow::{bail, Context};
use cairn_ipc::{Event, Geometry, Request, Response, Socket, Window, Workspace};
use serde_json::json;

use crate::cli::Msg;

pub fn handle_msg(msg: Msg, json: bool) -> anyhow::Result<()> {
    let request = match &msg {
        Msg::Version => Request::Version,
        Msg::Windows => Request::Windows,
        Msg::Workspaces => Request::Workspaces,
        Msg::FocusedWindow => Request::FocusedWindow,
        Msg::Action { action } => Request::Action(action.clone()),
        Msg::EventStream => Request::EventStream,
    };

    let mut socket = Socket::connect().context("error connecting to the cairn socket")?;

    let reply = socket
        .send(request)
        .context("error communicating with cairn")?;

    let response = match reply {
        Ok(response) => response,
        Err(err_msg) => {
            // Check for CLI-server version mismatch to add helpful context.
            let compositor_version = match socket.send(Request::Version) {
                Ok(Ok(Response::Version(version))) => Some(version),
                _ => None,
            };
            match compositor_version {
                Some(version) if version != version_string() => bail!(
                    "cairn returned an error: {err_msg}\n\n\
                     Note: the compositor is version {version}, this CLI is {}",
                    version_string()
                ),
                _ => bail!("cairn returned an error: {err_msg}"),
            }
        }
    };

    match msg {
        Msg::Version => {
            let Response::Version(version) = response else {
                bail!("unexpected response: expected Version, got {response:?}");
            };

            if json {
                let output = json!({
                    "cli": version_string(),
                    "compositor": version,
                });
                println!("{}", serde_json::to_string(&output)?);
                return Ok(());
            }

            println!("Compositor version: {version}");
            println!("CLI version: {}", version_string());
        }
        Msg::Windows => {
            let Response::Windows(mut windows) = response else {
                bail!("unexpected response: expected Windows, got {response:?}");
            };

            if json {
                println!("{}", serde_json::to_string(&windows)?);
                return Ok(());
            }

            windows.sort_unstable_by(|a, b| a.id.cmp(&b.id));
            for window in windows {
                print_window(&window);
                println!();
            }
        }
        Msg::Workspaces => {
            let Response::Workspaces(mut workspaces) = response else {
                bail!("unexpected response: expected Workspaces, got {response:?}");
            };

            if json {
                println!("{}", serde_json::to_string(&workspaces)?);
                return Ok(());
            }

            if workspaces.is_empty() {
                println!("No workspaces.");
                return Ok(());
            }

            workspaces.sort_unstable_by_key(|ws| ws.id);
            for ws in &workspaces {
                print_workspace(ws);
            }
        }
        Msg::FocusedWindow => {
            let Response::FocusedWindow(window) = response else {
                bail!("unexpected response: expected FocusedWindow, got {response:?}");
            };

            if json {
                println!("{}", serde_json::to_string(&window)?);
                return Ok(());
            }

            match window {
                Some(window) => print_window(&window),
                None => println!("No window is focused."),
            }
        }
        Msg::Action { .. } => {
            let Response::Handled = response else {
                bail!("unexpected response: expected Handled, got {response:?}");
            };
        }
        Msg::EventStream => {
            let Response::Handled = response else {
                bail!("unexpected response: expected Handled, got {response:?}");
            };

            if !json {
                println!("Started reading events.");
            }

            let mut read_event = socket.read_events();
            loop {
                let event = read_event().context("error reading event from cairn")?;

                if json {
                    println!("{}", serde_json::to_string(&event)?);
                    continue;
                }

                println!("{}", describe_event(&event));
            }
        }
    }

    Ok(())
}

fn version_string() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

fn print_window(window: &Window) {
    println!("Window ID {}:", window.id);

    if let Some(title) = &window.title {
        println!("  Title: \"{title}\"");
    } else {
        println!("  Title: (unset)");
    }

    if let Some(app_id) = &window.app_id {
        println!("  App ID: \"{app_id}\"");
    } else {
        println!("  App ID: (unset)");
    }

    if let Some(id) = window.workspace_id {
        println!("  Workspace ID: {id}");
    }
    if window.is_focused {
        println!("  Focused");
    }

    let Geometry {
        x,
        y,
        width,
        height,
    } = window.geometry;
    println!("  Geometry: {width} × {height} at ({x}, {y})");
}

fn print_workspace(ws: &Workspace) {
    let is_active = if ws.is_active { " * " } else { "   " };
    let name = if ws.name.is_empty() {
        String::new()
    } else {
        format!(" \"{}\"", ws.name)
    };
    let count = ws.windows.len();
    let master = match ws.master_window_id {
        Some(id) => format!(", master {id}"),
        None => String::new(),
    };
    println!("{is_active}{}{name} ({count} windows{master})", ws.id);
}

fn describe_event(event: &Event) -> String {
    match event {
        Event::WindowFocusChanged { id: Some(id) } => format!("Window focus changed: {id}"),
        Event::WindowFocusChanged { id: None } => String::from("Window focus changed: None"),
        Event::WorkspaceActivated { id } => format!("Workspace activated: {id}"),
        Event::WindowOpenedOrChanged { window } => {
            format!("Window opened or changed: {}", window.id)
        }
        Event::WindowClosed { id } => format!("Window closed: {id}"),
        Event::ConfigLoaded { failed: false } => String::from("Config loaded successfully"),
        Event::ConfigLoaded { failed: true } => String::from("Config loaded with an error"),
    }
}
