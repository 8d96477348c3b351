//! Transient surfaces anchored to a window or to another popup.

use slotmap::new_key_type;

use crate::protocol::SurfaceId;
use crate::scene::NodeId;
use crate::utils::Rectangle;

use super::WindowId;

new_key_type! {
    pub struct PopupId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupParent {
    Window(WindowId),
    Popup(PopupId),
}

#[derive(Debug)]
pub struct Popup {
    pub surface: SurfaceId,
    pub parent: PopupParent,
    /// Toplevel window the popup chain is rooted at.
    pub root: WindowId,
    /// Relative to the parent surface origin.
    pub geometry: Rectangle<i32>,
    /// Tree positioned at `geometry.loc` under the parent's popup node.
    pub node: NodeId,
    pub content: NodeId,
    pub mapped: bool,
}
