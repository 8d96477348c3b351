//! Keyboard input event handling.
//!
//! Keys arrive already translated by the input collaborator; the core only forwards them to the
//! surface with keyboard focus.

use tracing::trace;

use super::{KeyState, Modifiers};
use crate::protocol::ClientRequest;
use crate::state::State;

/// Trait for keyboard input event handling, implemented by [`State`].
pub(crate) trait KeyboardInput {
    fn on_keyboard_key(&mut self, time: u32, keycode: u32, state: KeyState);

    fn on_modifiers(&mut self, modifiers: Modifiers);
}

impl KeyboardInput for State {
    fn on_keyboard_key(&mut self, time: u32, keycode: u32, state: KeyState) {
        let Some(surface) = self.focus.surface else {
            trace!("key {keycode} without keyboard focus");
            return;
        };

        self.send(ClientRequest::KeyboardKey {
            surface,
            time,
            keycode,
            state,
        });
    }

    fn on_modifiers(&mut self, modifiers: Modifiers) {
        if self.input.modifiers == modifiers {
            return;
        }
        self.input.modifiers = modifiers;

        if let Some(surface) = self.focus.surface {
            self.send(ClientRequest::KeyboardModifiers { surface, modifiers });
        }
    }
}
