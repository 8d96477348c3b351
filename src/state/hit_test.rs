//! Queries for what is under a point.
//!
//! All methods here are pure queries. The order must match the stacking the renderer shows,
//! except that tiled windows take precedence over layer surfaces.

use crate::layer::Layer;
use crate::protocol::SurfaceId;
use crate::scene::{NodeOwner, SceneHit, Tier};
use crate::utils::Point;
use crate::window::WindowId;

use super::State;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitKind {
    Popup,
    Window,
    Layer(Layer),
}

/// Contents under a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointContents {
    /// Window owning the surface; for popups, the toplevel the popup chain belongs to.
    pub window: Option<WindowId>,
    pub surface: SurfaceId,
    /// Point relative to the surface origin.
    pub local: Point<f64>,
    pub kind: HitKind,
}

impl State {
    /// Finds the surface under `point`: popups first, then tiled windows, then layer surfaces
    /// from overlay down to background.
    pub fn contents_under(&self, point: Point<f64>) -> Option<PointContents> {
        let _span = tracy_client::span!("State::contents_under");

        self.popup_under(point)
            .or_else(|| self.window_under(point))
            .or_else(|| {
                [Layer::Overlay, Layer::Top, Layer::Bottom, Layer::Background]
                    .into_iter()
                    .find_map(|layer| self.layer_under(layer, point))
            })
    }

    fn popup_under(&self, point: Point<f64>) -> Option<PointContents> {
        let hit = self.scene.hit_test(self.scene.tier(Tier::Popups), point)?;
        let window = match self.owner_of(&hit)? {
            NodeOwner::Popup(popup) => self.registry.popup_root(popup),
            NodeOwner::Window(window) => self
                .registry
                .windows
                .contains_key(window)
                .then_some(window),
            NodeOwner::Layer(_) => None,
        };

        Some(PointContents {
            window,
            surface: hit.surface,
            local: hit.local,
            kind: HitKind::Popup,
        })
    }

    fn window_under(&self, point: Point<f64>) -> Option<PointContents> {
        let hit = self.scene.hit_test(self.scene.tier(Tier::Tiled), point)?;
        let NodeOwner::Window(window) = self.owner_of(&hit)? else {
            return None;
        };
        // The node may outlive the window it pointed to.
        if !self.registry.windows.contains_key(window) {
            return None;
        }

        Some(PointContents {
            window: Some(window),
            surface: hit.surface,
            local: hit.local,
            kind: HitKind::Window,
        })
    }

    fn layer_under(&self, layer: Layer, point: Point<f64>) -> Option<PointContents> {
        let hit = self.scene.hit_test(self.scene.tier(layer.tier()), point)?;
        let NodeOwner::Layer(id) = self.owner_of(&hit)? else {
            return None;
        };
        if !self.registry.layers.contains_key(id) {
            return None;
        }

        Some(PointContents {
            window: None,
            surface: hit.surface,
            local: hit.local,
            kind: HitKind::Layer(layer),
        })
    }

    /// Closest owner walking up from the hit node.
    fn owner_of(&self, hit: &SceneHit) -> Option<NodeOwner> {
        self.scene
            .ancestors(hit.node)
            .find_map(|node| self.scene.owner(node))
    }
}
