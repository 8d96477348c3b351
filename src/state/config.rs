//! Configuration reloading.
//!
//! A reload re-applies layout and animation parameters and workspace names. Windows keep their
//! identity, workspace and stack position.

use std::mem;
use std::time::Duration;

use anyhow::{anyhow, bail};
use cairn_config::Config;
use cairn_ipc::Event;
use calloop::timer::{TimeoutAction, Timer};
use tracing::{info, warn};

use super::State;
use crate::animation::SpringParams;
use crate::utils::watcher::{Watcher, POLL_INTERVAL_MS};

impl State {
    /// Reloads the config file. On failure the current config stays active.
    pub fn reload_config(&mut self) -> anyhow::Result<()> {
        let _span = tracy_client::span!("State::reload_config");

        let Some(path) = self.config_path.clone() else {
            warn!("no config file to reload");
            bail!("no config file to reload");
        };

        match Config::load(&path) {
            Ok(config) => {
                self.apply_config(config);
                Ok(())
            }
            Err(err) => {
                warn!("error loading config, keeping the current one: {err:?}");
                self.emit(Event::ConfigLoaded { failed: true });
                // Flattened to one line for IPC replies.
                let causes: Vec<String> = err.chain().map(ToString::to_string).collect();
                Err(anyhow!(causes.join(": ")))
            }
        }
    }

    /// Replaces the config and re-applies everything that depends on it.
    pub fn apply_config(&mut self, config: Config) {
        let old = mem::replace(&mut self.config, config);

        self.apply_named_workspaces_config();
        self.apply_animation_config();
        if old.layout != self.config.layout {
            self.apply_layout_config();
        }

        info!("config applied");
        self.emit(Event::ConfigLoaded { failed: false });
        self.flush_layout();
    }

    fn apply_named_workspaces_config(&mut self) {
        let names: Vec<String> = self
            .config
            .workspaces
            .iter()
            .map(|ws| ws.name.clone())
            .collect();
        self.workspaces.apply_names(&names);
    }

    fn apply_animation_config(&mut self) {
        let animations = &self.config.animations;
        self.animations.set_params(
            SpringParams::from(animations.window_movement.spring),
            animations.off,
        );
    }

    fn apply_layout_config(&mut self) {
        let border = &self.config.layout.border;
        for win in self.registry.windows.values() {
            win.update_border(&mut self.scene, border);
        }
        self.queue_layout();
    }

    /// Polls the config file from a timer and reloads it when it changes.
    pub fn start_config_watcher(&mut self) {
        if self.config_watcher.is_some() {
            return;
        }
        let Some(path) = self.config_path.clone() else {
            return;
        };
        let Some(event_loop) = &self.event_loop else {
            return;
        };

        let interval = Duration::from_millis(POLL_INTERVAL_MS);
        let mut watcher = Watcher::new(path);
        let result = event_loop.insert_source(Timer::from_duration(interval), move |_, _, state| {
            if watcher.check() {
                info!("{} changed, reloading", watcher.path().display());
                // Errors are logged and reported over IPC by reload_config.
                let _ = state.reload_config();
            }
            TimeoutAction::ToDuration(interval)
        });

        match result {
            Ok(token) => self.config_watcher = Some(token),
            Err(err) => warn!("error starting config watcher: {}", err.error),
        }
    }
}
