//! Keyboard focus.
//!
//! At most one window is activated at a time: the one holding keyboard focus. Focusing a window
//! always deactivates the previous one first.

use cairn_ipc::Event;
use tracing::debug;

use crate::protocol::{ClientRequest, SurfaceId};
use crate::state::State;
use crate::window::WindowId;

/// Keyboard focus state container.
#[derive(Debug, Default)]
pub struct FocusState {
    /// Window holding keyboard focus.
    pub window: Option<WindowId>,
    /// Surface that received keyboard enter.
    pub surface: Option<SurfaceId>,
}

impl FocusState {
    pub fn new() -> Self {
        Self::default()
    }
}

impl State {
    /// Gives keyboard focus to `surface` of `window`.
    ///
    /// With `reorder`, the window also moves to the front of its workspace and layout re-runs, so
    /// clicking a window makes it the next master candidate. Hover focus passes `false` and never
    /// re-arranges.
    pub fn focus_view(&mut self, window: WindowId, surface: SurfaceId, reorder: bool) {
        if self.focus.surface == Some(surface) {
            return;
        }
        match self.registry.windows.get(window) {
            Some(win) if win.is_mapped() => (),
            _ => return,
        }

        debug!("focusing {window:?}, reorder: {reorder}");
        self.unfocus_current();

        if reorder {
            self.promote_in_stack(window);
        }

        let border = &self.config.layout.border;
        let win = &mut self.registry.windows[window];
        win.set_activated(&mut self.scene, true, border);
        win.raise(&mut self.scene);

        self.focus.window = Some(window);
        self.focus.surface = Some(surface);

        let modifiers = self.input.modifiers;
        self.send(ClientRequest::SetActivated {
            surface,
            activated: true,
        });
        self.send(ClientRequest::KeyboardEnter { surface, modifiers });
        self.emit(Event::WindowFocusChanged {
            id: Some(window.to_u64()),
        });
    }

    /// Moves a window to the front of its workspace stack, making it the next master candidate.
    pub fn promote_in_stack(&mut self, window: WindowId) {
        if self.workspaces.move_to_front(window).is_some() {
            self.queue_layout();
        }
    }

    /// Drops keyboard focus without focusing anything else.
    pub fn clear_focus(&mut self) {
        if self.focus.window.is_none() && self.focus.surface.is_none() {
            return;
        }
        self.unfocus_current();
        self.emit(Event::WindowFocusChanged { id: None });
    }

    /// Focuses the front window of the active workspace, or clears focus if it is empty.
    pub fn focus_fallback(&mut self) {
        let front = self
            .workspaces
            .active()
            .windows()
            .iter()
            .copied()
            .find(|id| self.registry.windows.get(*id).is_some_and(|w| w.is_mapped()));

        match front {
            Some(window) => {
                let surface = self.registry.windows[window].surface();
                self.focus_view(window, surface, false);
            }
            None => self.clear_focus(),
        }
    }

    /// Deactivates the focused window, if it still exists, and sends keyboard leave.
    pub(crate) fn unfocus_current(&mut self) {
        let surface = self.focus.surface.take();
        let Some(previous) = self.focus.window.take() else {
            return;
        };

        let border = &self.config.layout.border;
        let Some(win) = self.registry.windows.get_mut(previous) else {
            return;
        };
        win.set_activated(&mut self.scene, false, border);
        let toplevel = win.surface();

        self.send(ClientRequest::SetActivated {
            surface: toplevel,
            activated: false,
        });
        if let Some(surface) = surface {
            self.send(ClientRequest::KeyboardLeave { surface });
        }
    }
}
