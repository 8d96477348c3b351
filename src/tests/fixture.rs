use std::time::Duration;

use cairn_config::Config;
use cairn_ipc::Event;

use crate::animation::Clock;
use crate::input::{ButtonState, InputEvent};
use crate::layer::{Layer, LayerSurfaceState};
use crate::output::OutputId;
use crate::protocol::{ClientRequest, Recorder, SurfaceEvent, SurfaceId};
use crate::state::State;
use crate::utils::{Point, Rectangle, Size};
use crate::window::{Window, WindowId};

/// A compositor state with one 1280×800 output and a recording protocol handle.
pub struct Fixture {
    pub state: State,
    pub recorder: Recorder,
    pub clock: Clock,
    pub output: OutputId,
    next_surface: u64,
    time: u32,
}

impl Fixture {
    /// Fixture with animations off, so layout results apply immediately.
    pub fn new() -> Self {
        let mut config = Config::default();
        config.animations.off = true;
        Self::with_config(config)
    }

    pub fn with_config(config: Config) -> Self {
        let recorder = Recorder::new();
        let clock = Clock::manual(Duration::ZERO);
        let mut state = State::new(config, None, Box::new(recorder.clone()), clock.clone());
        let output = state.add_output(
            String::from("headless-1"),
            Rectangle::new(Point::new(0, 0), Size::new(1280, 800)),
        );

        Self {
            state,
            recorder,
            clock,
            output,
            next_surface: 1,
            time: 0,
        }
    }

    pub fn surface_event(&mut self, event: SurfaceEvent) {
        self.state.handle_surface_event(event);
    }

    pub fn input(&mut self, event: InputEvent) {
        self.state.handle_input_event(event);
    }

    fn new_surface(&mut self) -> SurfaceId {
        let surface = SurfaceId(self.next_surface);
        self.next_surface += 1;
        surface
    }

    fn next_time(&mut self) -> u32 {
        self.time += 16;
        self.time
    }

    /// Creates and maps a toplevel, then commits buffers of whatever size layout gave it.
    pub fn map_window(&mut self) -> (WindowId, SurfaceId) {
        let surface = self.new_surface();
        self.surface_event(SurfaceEvent::NewToplevel {
            surface,
            title: Some(format!("window {}", surface.0)),
            app_id: Some(String::from("test")),
        });
        self.surface_event(SurfaceEvent::ToplevelMapped { surface });
        self.commit_configured();

        let id = self
            .state
            .registry
            .window_for_surface(surface)
            .expect("window was not created");
        (id, surface)
    }

    /// Answers every pending toplevel configure with a buffer of the configured size.
    pub fn commit_configured(&mut self) {
        let sizes: Vec<(SurfaceId, Size<i32>)> = self
            .state
            .registry
            .windows
            .values()
            .map(|win| (win.surface(), win.geometry().to_i32_round().size))
            .filter(|(_, size)| !size.is_empty())
            .collect();
        for (surface, size) in sizes {
            self.surface_event(SurfaceEvent::ToplevelCommitted { surface, size });
        }
    }

    /// Creates a layer surface on the fixture output and commits it with a buffer.
    pub fn map_layer(&mut self, layer: Layer, state: LayerSurfaceState) -> SurfaceId {
        let surface = self.new_surface();
        self.surface_event(SurfaceEvent::NewLayerSurface {
            surface,
            output: None,
            layer,
            namespace: String::from("panel"),
        });
        self.surface_event(SurfaceEvent::LayerCommitted {
            surface,
            state,
            has_buffer: true,
        });
        surface
    }

    pub fn move_pointer_to(&mut self, x: f64, y: f64) {
        let time = self.next_time();
        self.input(InputEvent::PointerMotionAbsolute {
            time,
            position: Point::new(x, y),
        });
    }

    pub fn click(&mut self) {
        for state in [ButtonState::Pressed, ButtonState::Released] {
            let time = self.next_time();
            self.input(InputEvent::PointerButton {
                time,
                button: 0x110,
                state,
            });
        }
    }

    pub fn window(&self, id: WindowId) -> &Window {
        &self.state.registry.windows[id]
    }

    pub fn geometry(&self, id: WindowId) -> Rectangle<i32> {
        self.window(id).geometry().to_i32_round()
    }

    pub fn activated(&self) -> Vec<WindowId> {
        self.state
            .registry
            .windows
            .values()
            .filter(|win| win.is_activated())
            .map(|win| win.id())
            .collect()
    }

    pub fn take_requests(&self) -> Vec<ClientRequest> {
        self.recorder.take()
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.state.pending_events)
    }
}
