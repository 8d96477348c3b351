//! Toplevel windows participating in tiling.

use cairn_config::{Border, Color};
use slotmap::new_key_type;
use tracing::warn;

use crate::protocol::SurfaceId;
use crate::scene::{NodeId, NodeOwner, Scene, SceneError, Tier};
use crate::utils::{Point, Rectangle, Size};
use crate::workspace::WorkspaceId;

pub mod popup;

new_key_type! {
    pub struct WindowId;
}

impl WindowId {
    /// Stable numeric id exposed over IPC.
    pub fn to_u64(self) -> u64 {
        slotmap::Key::data(&self).as_ffi()
    }

    pub fn from_u64(id: u64) -> Self {
        slotmap::KeyData::from_ffi(id).into()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    Created,
    Mapped,
    Unmapped,
    Destroyed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderState {
    Active,
    Inactive,
}

/// Scene nodes owned by one window.
#[derive(Debug, Clone, Copy)]
pub struct WindowNodes {
    /// Positioned at the window location in the tiled tier.
    pub tree: NodeId,
    pub content: NodeId,
    /// Top, bottom, left, right.
    pub borders: [NodeId; 4],
    /// Positioned at the window location in the popup tier; parents all popups of the window.
    pub popups: NodeId,
}

impl WindowNodes {
    /// Allocates the node set, rolling back partial allocations on failure.
    pub fn create(
        scene: &mut Scene,
        id: WindowId,
        surface: SurfaceId,
        border: &Border,
    ) -> Result<Self, SceneError> {
        let tree = scene.create_tree(scene.tier(Tier::Tiled))?;

        let rest = (|| {
            let mut borders = [tree; 4];
            for border_node in &mut borders {
                *border_node = scene.create_rect(tree, Size::default(), border.inactive_color)?;
            }
            let content = scene.create_buffer(tree, surface, Size::default())?;
            let popups = scene.create_tree(scene.tier(Tier::Popups))?;
            Ok((borders, content, popups))
        })();

        let (borders, content, popups) = match rest {
            Ok(rest) => rest,
            Err(err) => {
                scene.destroy(tree);
                return Err(err);
            }
        };

        scene.set_owner(tree, NodeOwner::Window(id));
        scene.set_owner(popups, NodeOwner::Window(id));

        Ok(Self {
            tree,
            content,
            borders,
            popups,
        })
    }

    pub fn destroy(&self, scene: &mut Scene) {
        scene.destroy(self.tree);
        scene.destroy(self.popups);
    }
}

/// Border rectangles around a window of the given size, relative to the window origin.
///
/// Order: top, bottom, left, right. The top and bottom bars cover the corners.
pub fn border_rects(size: Size<i32>, width: i32) -> [Rectangle<i32>; 4] {
    let Size { w, h } = size;
    [
        Rectangle::new(Point::new(-width, -width), Size::new(w + 2 * width, width)),
        Rectangle::new(Point::new(-width, h), Size::new(w + 2 * width, width)),
        Rectangle::new(Point::new(-width, 0), Size::new(width, h)),
        Rectangle::new(Point::new(w, 0), Size::new(width, h)),
    ]
}

#[derive(Debug)]
pub struct Subsurface {
    pub surface: SurfaceId,
    pub node: NodeId,
}

#[derive(Debug)]
pub struct Window {
    id: WindowId,
    surface: SurfaceId,
    pub title: Option<String>,
    pub app_id: Option<String>,
    /// Current on-screen geometry, moved by animations and interactive grabs.
    geometry: Rectangle<f64>,
    /// Size of the last committed buffer.
    buffer_size: Size<i32>,
    /// Size last sent to the client in a configure.
    configured_size: Option<Size<i32>>,
    border: BorderState,
    pub workspace: Option<WorkspaceId>,
    nodes: WindowNodes,
    pub subsurfaces: Vec<Subsurface>,
    state: WindowState,
    activated: bool,
}

impl Window {
    pub fn new(
        id: WindowId,
        surface: SurfaceId,
        nodes: WindowNodes,
        title: Option<String>,
        app_id: Option<String>,
    ) -> Self {
        Self {
            id,
            surface,
            title,
            app_id,
            geometry: Rectangle::default(),
            buffer_size: Size::default(),
            configured_size: None,
            border: BorderState::Inactive,
            workspace: None,
            nodes,
            subsurfaces: Vec::new(),
            state: WindowState::Created,
            activated: false,
        }
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    pub fn nodes(&self) -> &WindowNodes {
        &self.nodes
    }

    pub fn state(&self) -> WindowState {
        self.state
    }

    pub fn set_state(&mut self, state: WindowState) {
        self.state = state;
    }

    pub fn is_mapped(&self) -> bool {
        self.state == WindowState::Mapped
    }

    pub fn is_activated(&self) -> bool {
        self.activated
    }

    pub fn border_state(&self) -> BorderState {
        self.border
    }

    pub fn geometry(&self) -> Rectangle<f64> {
        self.geometry
    }

    pub fn buffer_size(&self) -> Size<i32> {
        self.buffer_size
    }

    /// Moves the window and its popups, and recomputes the border.
    pub fn set_geometry(&mut self, scene: &mut Scene, geometry: Rectangle<f64>, border: &Border) {
        self.geometry = geometry;

        let rounded = geometry.to_i32_round();
        scene.set_position(self.nodes.tree, rounded.loc);
        scene.set_position(self.nodes.popups, rounded.loc);
        self.update_border(scene, border);
    }

    pub fn set_buffer_size(&mut self, scene: &mut Scene, size: Size<i32>) {
        self.buffer_size = size;
        scene.set_buffer_size(self.nodes.content, size);
    }

    /// Records a configure of the given size. Returns `false` if the client already has it.
    pub fn configure(&mut self, size: Size<i32>) -> bool {
        if self.configured_size == Some(size) {
            return false;
        }
        self.configured_size = Some(size);
        true
    }

    pub fn set_activated(&mut self, scene: &mut Scene, activated: bool, border: &Border) {
        self.activated = activated;
        self.border = if activated {
            BorderState::Active
        } else {
            BorderState::Inactive
        };
        self.update_border(scene, border);
    }

    pub fn border_color(&self, border: &Border) -> Color {
        match self.border {
            BorderState::Active => border.active_color,
            BorderState::Inactive => border.inactive_color,
        }
    }

    pub fn update_border(&self, scene: &mut Scene, border: &Border) {
        let size = self.geometry.to_i32_round().size;
        let color = self.border_color(border);
        for (node, rect) in self.nodes.borders.iter().zip(border_rects(size, border.width)) {
            scene.set_position(*node, rect.loc);
            scene.set_rect(*node, rect.size, color);
        }
    }

    /// Shows or hides the window together with its popups.
    pub fn set_visible(&self, scene: &mut Scene, visible: bool) {
        scene.set_enabled(self.nodes.tree, visible);
        scene.set_enabled(self.nodes.popups, visible);
    }

    pub fn raise(&self, scene: &mut Scene) {
        scene.raise_to_top(self.nodes.tree);
        scene.raise_to_top(self.nodes.popups);
    }

    pub fn add_subsurface(
        &mut self,
        scene: &mut Scene,
        surface: SurfaceId,
        offset: Point<i32>,
        size: Size<i32>,
    ) -> Result<(), SceneError> {
        let node = scene.create_buffer(self.nodes.tree, surface, size)?;
        scene.set_position(node, offset);
        self.subsurfaces.push(Subsurface { surface, node });
        Ok(())
    }

    pub fn remove_subsurface(&mut self, scene: &mut Scene, surface: SurfaceId) {
        let Some(idx) = self.subsurfaces.iter().position(|s| s.surface == surface) else {
            warn!("unknown subsurface {surface:?} of window {:?}", self.id);
            return;
        };
        let subsurface = self.subsurfaces.remove(idx);
        scene.destroy(subsurface.node);
    }
}
