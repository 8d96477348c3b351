//! Pointer and keyboard routing.
//!
//! The pointer runs a small state machine: in passthrough it follows whatever surface is under
//! the cursor; an interactive move or resize grab takes over motion until the button is released.

use bitflags::bitflags;

use crate::protocol::{CursorIcon, SurfaceId};
use crate::state::State;
use crate::utils::{Point, Rectangle, ResizeEdge};
use crate::window::WindowId;

mod keyboard;
mod pointer;

use keyboard::KeyboardInput;
use pointer::PointerInput;

pub use pointer::resize_geometry;

bitflags! {
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const CTRL = 1;
        const SHIFT = 1 << 1;
        const ALT = 1 << 2;
        const SUPER = 1 << 3;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Pressed,
    Released,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Pressed,
    Released,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Vertical,
    Horizontal,
}

/// Events from the input collaborator. Times are in milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerMotion {
        time: u32,
        delta: Point<f64>,
    },
    PointerMotionAbsolute {
        time: u32,
        position: Point<f64>,
    },
    PointerButton {
        time: u32,
        button: u32,
        state: ButtonState,
    },
    PointerAxis {
        time: u32,
        axis: Axis,
        amount: f64,
    },
    KeyboardKey {
        time: u32,
        keycode: u32,
        state: KeyState,
    },
    Modifiers {
        modifiers: Modifiers,
    },
}

/// State captured when a resize grab starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeGrab {
    pub edges: ResizeEdge,
    /// Cursor position relative to the grabbed edges.
    pub anchor: Point<f64>,
    /// Window geometry when the grab started.
    pub initial: Rectangle<f64>,
}

impl ResizeGrab {
    pub fn new(edges: ResizeEdge, cursor: Point<f64>, initial: Rectangle<f64>) -> Self {
        let mut edge = initial.loc;
        if edges.contains(ResizeEdge::RIGHT) {
            edge.x += initial.size.w;
        }
        if edges.contains(ResizeEdge::BOTTOM) {
            edge.y += initial.size.h;
        }

        Self {
            edges,
            anchor: cursor - edge,
            initial,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerMode {
    Passthrough,
    Moving {
        window: WindowId,
        /// Cursor position relative to the window origin.
        anchor: Point<f64>,
    },
    Resizing {
        window: WindowId,
        grab: ResizeGrab,
    },
}

impl PointerMode {
    pub fn window(&self) -> Option<WindowId> {
        match self {
            PointerMode::Passthrough => None,
            PointerMode::Moving { window, .. } | PointerMode::Resizing { window, .. } => {
                Some(*window)
            }
        }
    }
}

#[derive(Debug)]
pub struct InputRouter {
    pub cursor: Point<f64>,
    pub mode: PointerMode,
    /// Surface that last received pointer enter.
    pub pointer_focus: Option<SurfaceId>,
    pub modifiers: Modifiers,
    /// Last icon requested from the input collaborator.
    pub cursor_icon: Option<CursorIcon>,
    /// A layout pass left the grabbed window where the grab put it.
    pub layout_deferred: bool,
}

impl InputRouter {
    pub fn new() -> Self {
        Self {
            cursor: Point::default(),
            mode: PointerMode::Passthrough,
            pointer_focus: None,
            modifiers: Modifiers::empty(),
            cursor_icon: None,
            layout_deferred: false,
        }
    }
}

impl State {
    pub fn handle_input_event(&mut self, event: InputEvent) {
        let _span = tracy_client::span!("State::handle_input_event");

        match event {
            InputEvent::PointerMotion { time, delta } => self.on_pointer_motion(time, delta),
            InputEvent::PointerMotionAbsolute { time, position } => {
                self.on_pointer_motion_absolute(time, position)
            }
            InputEvent::PointerButton {
                time,
                button,
                state,
            } => self.on_pointer_button(time, button, state),
            InputEvent::PointerAxis { time, axis, amount } => {
                self.on_pointer_axis(time, axis, amount)
            }
            InputEvent::KeyboardKey {
                time,
                keycode,
                state,
            } => self.on_keyboard_key(time, keycode, state),
            InputEvent::Modifiers { modifiers } => self.on_modifiers(modifiers),
        }

        self.flush_layout();
    }

    /// Asks the input collaborator for a cursor image, skipping repeats.
    pub fn set_cursor_icon(&mut self, icon: CursorIcon) {
        if self.input.cursor_icon == Some(icon) {
            return;
        }
        self.input.cursor_icon = Some(icon);
        self.send(crate::protocol::ClientRequest::SetCursor { icon });
    }
}
