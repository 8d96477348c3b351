//! Owner of all window, popup, layer-surface and output records.
//!
//! Everything outside the registry refers to records by generation-checked handle. A handle to a
//! removed record simply stops resolving, so stale references are caught by the lookup itself.

use std::collections::HashMap;

use slotmap::SlotMap;
use tracing::warn;

use crate::layer::{LayerId, LayerSurface};
use crate::output::{Output, OutputId};
use crate::protocol::SurfaceId;
use crate::utils::{Point, Rectangle};
use crate::window::popup::{Popup, PopupId};
use crate::window::{Window, WindowId};

/// What a client surface is to the compositor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceRole {
    Toplevel(WindowId),
    /// Subsurface of a toplevel, rendered inside the window tree.
    Subsurface(WindowId),
    Popup(PopupId),
    Layer(LayerId),
}

#[derive(Debug, Default)]
pub struct Registry {
    pub windows: SlotMap<WindowId, Window>,
    pub popups: SlotMap<PopupId, Popup>,
    pub layers: SlotMap<LayerId, LayerSurface>,
    /// In the order they were added.
    pub outputs: SlotMap<OutputId, Output>,
    surfaces: HashMap<SurfaceId, SurfaceRole>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn role(&self, surface: SurfaceId) -> Option<SurfaceRole> {
        self.surfaces.get(&surface).copied()
    }

    /// Records the role of a new surface. Returns `false` if the surface already has one.
    pub fn assign_role(&mut self, surface: SurfaceId, role: SurfaceRole) -> bool {
        if let Some(existing) = self.surfaces.get(&surface) {
            warn!("surface {surface:?} already has role {existing:?}, ignoring {role:?}");
            return false;
        }
        self.surfaces.insert(surface, role);
        true
    }

    pub fn forget_surface(&mut self, surface: SurfaceId) -> Option<SurfaceRole> {
        self.surfaces.remove(&surface)
    }

    pub fn window_for_surface(&self, surface: SurfaceId) -> Option<WindowId> {
        match self.role(surface)? {
            SurfaceRole::Toplevel(id) => Some(id),
            _ => None,
        }
    }

    pub fn popup_for_surface(&self, surface: SurfaceId) -> Option<PopupId> {
        match self.role(surface)? {
            SurfaceRole::Popup(id) => Some(id),
            _ => None,
        }
    }

    pub fn layer_for_surface(&self, surface: SurfaceId) -> Option<LayerId> {
        match self.role(surface)? {
            SurfaceRole::Layer(id) => Some(id),
            _ => None,
        }
    }

    pub fn output_by_name(&self, name: &str) -> Option<OutputId> {
        self.outputs
            .iter()
            .find_map(|(id, output)| (output.name == name).then_some(id))
    }

    pub fn first_output(&self) -> Option<OutputId> {
        self.outputs.keys().next()
    }

    pub fn output_at(&self, point: Point<f64>) -> Option<OutputId> {
        self.outputs
            .iter()
            .find_map(|(id, output)| output.geometry.to_f64().contains(point).then_some(id))
    }

    /// Output a window belongs to for layout: the one containing its center, falling back to the
    /// first output so the window never becomes unreachable.
    pub fn output_for_window(&self, id: WindowId) -> Option<OutputId> {
        let window = self.windows.get(id)?;
        self.output_at(window.geometry().center())
            .or_else(|| self.first_output())
    }

    /// Union of all output boxes, the area the cursor may move in.
    pub fn outputs_bounds(&self) -> Option<Rectangle<i32>> {
        self.outputs
            .values()
            .map(|output| output.geometry)
            .reduce(Rectangle::merge)
    }

    /// Toplevel window a popup chain is rooted at, if it still exists.
    pub fn popup_root(&self, id: PopupId) -> Option<WindowId> {
        let root = self.popups.get(id)?.root;
        self.windows.contains_key(root).then_some(root)
    }
}
