use std::time::Duration;

use anyhow::Context;
use calloop::timer::{TimeoutAction, Timer};
use calloop::LoopHandle;
use tracing::{debug, trace};

use crate::protocol::{ClientRequest, ProtocolHandle};
use crate::state::State;
use crate::utils::{Point, Rectangle, Size};

/// Output mode of the headless output.
const OUTPUT_SIZE: Size<i32> = Size::new(1280, 800);
/// Refresh interval of a 60 Hz display.
const REFRESH_INTERVAL: Duration = Duration::from_micros(16_667);

pub struct Headless {
    refresh_interval: Duration,
}

impl Headless {
    pub fn new() -> Self {
        Self {
            refresh_interval: REFRESH_INTERVAL,
        }
    }

    /// Adds the output and starts the vblank timer.
    pub fn init(
        &self,
        state: &mut State,
        event_loop: &LoopHandle<'static, State>,
    ) -> anyhow::Result<()> {
        state.add_output(
            String::from("headless-1"),
            Rectangle::new(Point::new(0, 0), OUTPUT_SIZE),
        );

        let interval = self.refresh_interval;
        event_loop
            .insert_source(Timer::from_duration(interval), move |_, _, state| {
                if state.needs_frame() {
                    let now = state.clock.now();
                    trace!("frame at {now:?}");
                    state.on_frame(now);
                }
                TimeoutAction::ToDuration(interval)
            })
            .map_err(|err| err.error)
            .context("error inserting vblank timer")?;

        Ok(())
    }
}

/// Protocol handle for sessions without clients: requests are only logged.
#[derive(Debug, Default)]
pub struct LoggingProtocol;

impl ProtocolHandle for LoggingProtocol {
    fn send(&mut self, request: ClientRequest) {
        debug!("client request: {request:?}");
    }
}
