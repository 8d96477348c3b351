//! Compositor state.
//!
//! One [`State`] value holds every piece of mutable state: registries, scene, workspaces,
//! animations, input and focus. All handlers run on the event loop thread and take `&mut State`.

pub mod config;
mod frame;
pub mod hit_test;
mod ipc;
mod surfaces;

use std::path::PathBuf;

use cairn_config::Config;
use cairn_ipc::Event;
use calloop::{LoopHandle, LoopSignal, RegistrationToken};
use tracing::{debug, info};

use crate::animation::{AnimationEngine, Clock, SpringParams};
use crate::focus::FocusState;
use crate::input::InputRouter;
use crate::ipc::server::IpcServer;
use crate::layer::exclusive_zone;
use crate::layout;
use crate::output::{Output, OutputId};
use crate::protocol::{ClientRequest, ProtocolHandle};
use crate::registry::Registry;
use crate::scene::Scene;
use crate::utils::Rectangle;
use crate::window::WindowId;
use crate::workspace::{WorkspaceId, WorkspaceManager};

pub struct State {
    pub config: Config,
    pub config_path: Option<PathBuf>,

    pub registry: Registry,
    pub scene: Scene,
    pub workspaces: WorkspaceManager,
    pub animations: AnimationEngine,
    pub input: InputRouter,
    pub focus: FocusState,
    pub clock: Clock,

    protocol: Box<dyn ProtocolHandle>,

    /// Set by handlers that change what layout would produce; cleared by [`State::flush_layout`].
    layout_dirty: bool,

    /// IPC events produced since the last flush.
    pub pending_events: Vec<Event>,
    pub ipc_server: Option<IpcServer>,

    pub event_loop: Option<LoopHandle<'static, State>>,
    pub stop_signal: Option<LoopSignal>,
    /// Keeps the loop awake while animations are in flight.
    animation_keepalive: Option<RegistrationToken>,
    config_watcher: Option<RegistrationToken>,
}

impl State {
    pub fn new(
        config: Config,
        config_path: Option<PathBuf>,
        protocol: Box<dyn ProtocolHandle>,
        clock: Clock,
    ) -> Self {
        let names: Vec<String> = config.workspaces.iter().map(|ws| ws.name.clone()).collect();
        let animations = &config.animations;
        let engine = AnimationEngine::new(
            SpringParams::from(animations.window_movement.spring),
            animations.off,
        );

        Self {
            registry: Registry::new(),
            scene: Scene::new(),
            workspaces: WorkspaceManager::new(&names),
            animations: engine,
            input: InputRouter::new(),
            focus: FocusState::new(),
            clock,
            protocol,
            layout_dirty: false,
            pending_events: Vec::new(),
            ipc_server: None,
            event_loop: None,
            stop_signal: None,
            animation_keepalive: None,
            config_watcher: None,
            config,
            config_path,
        }
    }

    /// Hooks the state up to a running event loop.
    pub fn attach(&mut self, handle: LoopHandle<'static, State>, signal: LoopSignal) {
        self.event_loop = Some(handle);
        self.stop_signal = Some(signal);
    }

    pub fn send(&mut self, request: ClientRequest) {
        self.protocol.send(request);
    }

    pub fn emit(&mut self, event: Event) {
        self.pending_events.push(event);
    }

    /// Hands pending IPC events to event-stream subscribers.
    pub fn flush_events(&mut self) {
        let events = std::mem::take(&mut self.pending_events);
        if let Some(server) = &mut self.ipc_server {
            for event in &events {
                server.send_event(event);
            }
        }
    }

    /// Called by the event loop after every dispatch.
    pub fn refresh_and_flush(&mut self) {
        self.flush_layout();
        self.flush_events();
    }

    pub fn stop(&mut self) {
        info!("stopping");
        if let Some(signal) = &self.stop_signal {
            signal.stop();
        }
    }

    pub fn add_output(&mut self, name: String, geometry: Rectangle<i32>) -> OutputId {
        info!("adding output {name} at {geometry}");
        let first = self.registry.outputs.is_empty();
        let id = self.registry.outputs.insert(Output::new(name, geometry));

        if first {
            self.input.cursor = geometry.center();
        }
        self.update_reserved(id);
        self.queue_layout();
        self.flush_layout();
        id
    }

    /// Recomputes reserved margins of an output. Layout is queued when they change.
    pub fn update_reserved(&mut self, output: OutputId) {
        let margins = exclusive_zone::compute(output, self.registry.layers.values());
        let Some(output) = self.registry.outputs.get_mut(output) else {
            return;
        };
        if output.reserved != margins {
            debug!("reserved margins of {} changed to {margins:?}", output.name);
            output.reserved = margins;
            self.layout_dirty = true;
        }
    }

    pub fn queue_layout(&mut self) {
        self.layout_dirty = true;
    }

    /// Re-arranges the active workspace now.
    pub fn arrange_windows(&mut self) {
        self.queue_layout();
        self.flush_layout();
    }

    /// Runs one layout pass if anything queued it.
    ///
    /// Only the active workspace is arranged. Windows of other workspaces keep their geometry, and
    /// a window under a move or resize grab is left alone until the grab ends.
    pub fn flush_layout(&mut self) {
        if !std::mem::take(&mut self.layout_dirty) {
            return;
        }
        let _span = tracy_client::span!("State::flush_layout");

        let gap = self.config.layout.gaps;
        let ratio = self.config.layout.master_ratio.0;
        let active = self.workspaces.active_id();

        let outputs: Vec<OutputId> = self.registry.outputs.keys().collect();
        for output in outputs {
            let on_output: Vec<WindowId> = self
                .workspaces
                .active()
                .windows()
                .iter()
                .copied()
                .filter(|id| {
                    self.registry.windows.get(*id).is_some_and(|w| w.is_mapped())
                        && self.registry.output_for_window(*id) == Some(output)
                })
                .collect();

            let Some(master) = layout::select_master(self.workspaces.active().master(), &on_output)
            else {
                continue;
            };
            if let Some(ws) = self.workspaces.get_mut(active) {
                ws.set_master(master);
            }

            let usable = self.registry.outputs[output].usable_area(gap);
            let ordered = layout::master_first(master, &on_output);
            for (window, geometry) in layout::arrange(&ordered, usable, ratio, gap) {
                // The grab owns this window's geometry until the button is released.
                if self.input.mode.window() == Some(window) {
                    self.input.layout_deferred = true;
                    continue;
                }
                self.move_window_to(window, geometry);
            }
        }

        self.ensure_animation_keepalive();
    }

    /// Sends the window toward a layout target, animating unless it is already headed there.
    fn move_window_to(&mut self, window: WindowId, target: Rectangle<i32>) {
        let now = self.clock.now();
        let Some(win) = self.registry.windows.get_mut(window) else {
            return;
        };

        let target_f64 = target.to_f64();
        let current_target = self
            .animations
            .target(window)
            .unwrap_or_else(|| win.geometry());
        if current_target == target_f64 {
            return;
        }

        // A window that was never placed appears at its target.
        let placed = !win.geometry().size.is_empty();
        if !(placed
            && self
                .animations
                .start(window, win.geometry(), target_f64, now))
        {
            win.set_geometry(&mut self.scene, target_f64, &self.config.layout.border);
        }

        if win.configure(target.size) {
            let surface = win.surface();
            self.send(ClientRequest::ConfigureToplevel {
                surface,
                size: target.size,
            });
        }
    }

    /// Makes workspace `id` active, creating it if needed.
    pub fn switch_to_workspace(&mut self, id: u32) {
        let id = WorkspaceId(id);
        let Some(previous) = self.workspaces.activate(id) else {
            return;
        };
        info!("switching to workspace {id}");

        let hide: Vec<WindowId> = self
            .workspaces
            .get(previous)
            .map(|ws| ws.windows().to_vec())
            .unwrap_or_default();
        for window in hide {
            if let Some(win) = self.registry.windows.get(window) {
                win.set_visible(&mut self.scene, false);
            }
            self.release_pointer_for(window);
        }

        let show = self.workspaces.active().windows().to_vec();
        for window in show {
            if let Some(win) = self.registry.windows.get(window) {
                win.set_visible(&mut self.scene, true);
            }
        }

        self.arrange_windows();
        self.focus_fallback();
        self.emit(Event::WorkspaceActivated { id: id.0 });
    }

    /// Moves focus away from a window that left the layout.
    pub(crate) fn window_left_layout(&mut self, window: WindowId) {
        self.release_pointer_for(window);
        self.queue_layout();

        if self.focus.window != Some(window) {
            return;
        }
        self.unfocus_current();
        self.focus_fallback();
        if self.focus.window.is_none() {
            self.emit(Event::WindowFocusChanged { id: None });
        }
    }
}
