//! Per-frame animation ticks.

use std::time::Duration;

use calloop::timer::{TimeoutAction, Timer};
use tracing::{trace, warn};

use super::State;

/// Period of the timer that keeps the loop awake while animations run.
const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(1);

impl State {
    /// Whether the next display refresh has anything to advance.
    pub fn needs_frame(&self) -> bool {
        !self.animations.is_empty()
    }

    /// Advances animations to `now` and pushes the new geometry to the scene.
    ///
    /// Called once per display refresh.
    pub fn on_frame(&mut self, now: Duration) {
        let _span = tracy_client::span!("State::on_frame");

        let border = &self.config.layout.border;
        for step in self.animations.tick(now) {
            // Destroying a window retires its animation, but stay defensive about ordering.
            let Some(win) = self.registry.windows.get_mut(step.window) else {
                continue;
            };
            win.set_geometry(&mut self.scene, step.geometry, border);
            if step.done {
                trace!("animation of {:?} done at {}", step.window, step.geometry);
            }
        }
    }

    /// Registers the keep-alive timer if animations are running and it is not registered yet.
    ///
    /// The timer does no work; the ticks themselves come from display refresh.
    pub(super) fn ensure_animation_keepalive(&mut self) {
        if self.animations.is_empty() || self.animation_keepalive.is_some() {
            return;
        }
        let Some(event_loop) = &self.event_loop else {
            return;
        };

        let timer = Timer::from_duration(KEEPALIVE_INTERVAL);
        let result = event_loop.insert_source(timer, |_, _, state| {
            if state.animations.is_empty() {
                state.animation_keepalive = None;
                TimeoutAction::Drop
            } else {
                TimeoutAction::ToDuration(KEEPALIVE_INTERVAL)
            }
        });

        match result {
            Ok(token) => self.animation_keepalive = Some(token),
            Err(err) => warn!("error inserting animation keep-alive timer: {}", err.error),
        }
    }
}
