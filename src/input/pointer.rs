//! Pointer input event handling.

use tracing::debug;

use super::{Axis, ButtonState, PointerMode, ResizeGrab};
use crate::protocol::{ClientRequest, CursorIcon, SurfaceId};
use crate::state::hit_test::HitKind;
use crate::state::State;
use crate::utils::{Point, Rectangle, ResizeEdge, Size};
use crate::window::WindowId;

/// Trait for pointer input event handling, implemented by [`State`].
pub(crate) trait PointerInput {
    /// Handle relative pointer motion.
    fn on_pointer_motion(&mut self, time: u32, delta: Point<f64>);

    /// Handle absolute pointer motion, in global coordinates.
    fn on_pointer_motion_absolute(&mut self, time: u32, position: Point<f64>);

    fn on_pointer_button(&mut self, time: u32, button: u32, state: ButtonState);

    fn on_pointer_axis(&mut self, time: u32, axis: Axis, amount: f64);
}

impl PointerInput for State {
    fn on_pointer_motion(&mut self, time: u32, delta: Point<f64>) {
        // We need an output to be able to move the pointer.
        let Some(bounds) = self.registry.outputs_bounds() else {
            return;
        };

        self.input.cursor = clamp_to(bounds, self.input.cursor + delta);
        self.process_cursor_motion(time);
    }

    fn on_pointer_motion_absolute(&mut self, time: u32, position: Point<f64>) {
        self.input.cursor = position;
        self.process_cursor_motion(time);
    }

    fn on_pointer_button(&mut self, time: u32, button: u32, state: ButtonState) {
        if let Some(surface) = self.input.pointer_focus {
            self.send(ClientRequest::PointerButton {
                surface,
                time,
                button,
                state,
            });
        }

        match (state, self.input.mode) {
            (ButtonState::Released, PointerMode::Passthrough) => (),
            (ButtonState::Released, _) => {
                // Grab results persist until the next layout-triggering event.
                debug!("ending pointer grab");
                self.input.mode = PointerMode::Passthrough;
                self.set_cursor_icon(CursorIcon::Default);
                if std::mem::take(&mut self.input.layout_deferred) {
                    self.queue_layout();
                }
            }
            (ButtonState::Pressed, PointerMode::Passthrough) => {
                let Some(contents) = self.contents_under(self.input.cursor) else {
                    return;
                };
                if contents.kind != HitKind::Window {
                    return;
                }
                let Some(window) = contents.window else {
                    return;
                };
                // Hover usually focused the window already; the click still reorders.
                if self.focus.window == Some(window) {
                    self.promote_in_stack(window);
                } else {
                    let surface = self.registry.windows[window].surface();
                    self.focus_view(window, surface, true);
                }
            }
            (ButtonState::Pressed, _) => (),
        }
    }

    fn on_pointer_axis(&mut self, time: u32, axis: Axis, amount: f64) {
        if let Some(surface) = self.input.pointer_focus {
            self.send(ClientRequest::PointerAxis {
                surface,
                time,
                axis,
                amount,
            });
        }
    }
}

impl State {
    /// Applies the current cursor position according to the pointer mode.
    pub fn process_cursor_motion(&mut self, time: u32) {
        match self.input.mode {
            PointerMode::Passthrough => self.pointer_passthrough(time),
            PointerMode::Moving { window, anchor } => self.pointer_move(window, anchor),
            PointerMode::Resizing { window, grab } => self.pointer_resize(window, grab),
        }
    }

    fn pointer_passthrough(&mut self, time: u32) {
        let Some(contents) = self.contents_under(self.input.cursor) else {
            self.set_pointer_focus(None);
            self.set_cursor_icon(CursorIcon::Default);
            return;
        };

        self.set_pointer_focus(Some((contents.surface, contents.local)));
        self.send(ClientRequest::PointerMotion {
            surface: contents.surface,
            time,
            location: contents.local,
        });

        // Popups and layer surfaces never take keyboard focus on hover, and moving between
        // surfaces of the focused window does not refocus it.
        if contents.kind != HitKind::Window {
            return;
        }
        let Some(window) = contents.window else {
            return;
        };
        if self.focus.window == Some(window) {
            return;
        }

        let surface = self.registry.windows[window].surface();
        self.focus_view(window, surface, false);
    }

    fn pointer_move(&mut self, window: WindowId, anchor: Point<f64>) {
        let Some(win) = self.registry.windows.get_mut(window) else {
            self.input.mode = PointerMode::Passthrough;
            return;
        };

        let mut geometry = win.geometry();
        geometry.loc = self.input.cursor - anchor;
        win.set_geometry(&mut self.scene, geometry, &self.config.layout.border);
    }

    fn pointer_resize(&mut self, window: WindowId, grab: ResizeGrab) {
        let Some(win) = self.registry.windows.get_mut(window) else {
            self.input.mode = PointerMode::Passthrough;
            return;
        };

        let geometry = resize_geometry(&grab, self.input.cursor);
        win.set_geometry(&mut self.scene, geometry, &self.config.layout.border);

        let size = geometry.to_i32_round().size;
        if win.configure(size) {
            let surface = win.surface();
            self.send(ClientRequest::ConfigureToplevel { surface, size });
        }
    }

    /// Sends enter and leave as the surface under the pointer changes.
    fn set_pointer_focus(&mut self, new: Option<(SurfaceId, Point<f64>)>) {
        let new_surface = new.map(|(surface, _)| surface);
        if self.input.pointer_focus == new_surface {
            return;
        }

        if let Some(old) = self.input.pointer_focus.take() {
            // The old surface may be gone already.
            if self.registry.role(old).is_some() {
                self.send(ClientRequest::PointerLeave { surface: old });
            }
        }

        if let Some((surface, location)) = new {
            self.send(ClientRequest::PointerEnter { surface, location });
            self.input.pointer_focus = Some(surface);
            // The client sets its own cursor image on enter.
            self.input.cursor_icon = None;
        }
    }

    /// Starts an interactive move of a mapped window.
    pub fn begin_move(&mut self, window: WindowId) {
        if self.input.mode != PointerMode::Passthrough {
            debug!("ignoring move request during another grab");
            return;
        }
        let Some(win) = self.registry.windows.get(window) else {
            return;
        };
        if !win.is_mapped() {
            return;
        }

        self.animations.cancel(window);
        let anchor = self.input.cursor - win.geometry().loc;
        self.input.mode = PointerMode::Moving { window, anchor };
        self.set_cursor_icon(CursorIcon::Grabbing);
    }

    /// Starts an interactive resize of a mapped window from the given edges.
    pub fn begin_resize(&mut self, window: WindowId, edges: ResizeEdge) {
        if self.input.mode != PointerMode::Passthrough {
            debug!("ignoring resize request during another grab");
            return;
        }
        if edges.is_empty() {
            debug!("ignoring resize request without edges");
            return;
        }
        let Some(win) = self.registry.windows.get(window) else {
            return;
        };
        if !win.is_mapped() {
            return;
        }

        self.animations.cancel(window);
        let grab = ResizeGrab::new(edges, self.input.cursor, win.geometry());
        self.input.mode = PointerMode::Resizing { window, grab };
        self.set_cursor_icon(edges.cursor_icon());
    }

    /// Drops the pointer grab and pointer focus that refer to a window going away.
    pub(crate) fn release_pointer_for(&mut self, window: WindowId) {
        if self.input.mode.window() == Some(window) {
            self.input.mode = PointerMode::Passthrough;
            self.input.layout_deferred = false;
            self.set_cursor_icon(CursorIcon::Default);
        }
    }
}

/// Window geometry for a resize grab with the cursor at `cursor`.
///
/// The grabbed edges follow the cursor; an edge never crosses the opposite one, so each dimension
/// stays at least 1.
pub fn resize_geometry(grab: &ResizeGrab, cursor: Point<f64>) -> Rectangle<f64> {
    let edge = cursor - grab.anchor;
    let initial = grab.initial;

    let mut left = initial.loc.x;
    let mut right = initial.right();
    let mut top = initial.loc.y;
    let mut bottom = initial.bottom();

    if grab.edges.contains(ResizeEdge::TOP) {
        top = edge.y.min(bottom - 1.);
    } else if grab.edges.contains(ResizeEdge::BOTTOM) {
        bottom = edge.y.max(top + 1.);
    }

    if grab.edges.contains(ResizeEdge::LEFT) {
        left = edge.x.min(right - 1.);
    } else if grab.edges.contains(ResizeEdge::RIGHT) {
        right = edge.x.max(left + 1.);
    }

    Rectangle::new(Point::new(left, top), Size::new(right - left, bottom - top))
}

fn clamp_to(bounds: Rectangle<i32>, point: Point<f64>) -> Point<f64> {
    let bounds = bounds.to_f64();
    let max_x = (bounds.right() - 1.).max(bounds.loc.x);
    let max_y = (bounds.bottom() - 1.).max(bounds.loc.y);
    Point::new(
        point.x.clamp(bounds.loc.x, max_x),
        point.y.clamp(bounds.loc.y, max_y),
    )
}
