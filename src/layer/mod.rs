//! Shell-level surfaces anchored to output edges: bars, backgrounds, lock screens.

use bitflags::bitflags;
use slotmap::new_key_type;

use crate::output::OutputId;
use crate::protocol::SurfaceId;
use crate::scene::{NodeId, Tier};
use crate::utils::{Point, Rectangle, Size};

pub mod exclusive_zone;

new_key_type! {
    pub struct LayerId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Background,
    Bottom,
    Top,
    Overlay,
}

impl Layer {
    pub fn tier(self) -> Tier {
        match self {
            Layer::Background => Tier::Background,
            Layer::Bottom => Tier::Bottom,
            Layer::Top => Tier::Top,
            Layer::Overlay => Tier::Overlay,
        }
    }
}

bitflags! {
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Anchor: u32 {
        const TOP = 1;
        const BOTTOM = 2;
        const LEFT = 4;
        const RIGHT = 8;
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Margins {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

/// Double-buffered state a layer surface commits.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LayerSurfaceState {
    pub exclusive_zone: i32,
    pub anchor: Anchor,
    pub margin: Margins,
    /// Desired size; zero in a dimension means "stretch between the anchors".
    pub size: Size<i32>,
}

#[derive(Debug)]
pub struct LayerSurface {
    pub surface: SurfaceId,
    pub output: OutputId,
    pub layer: Layer,
    pub namespace: String,
    pub state: LayerSurfaceState,
    /// Set once the compositor has sent a configure.
    pub configured: bool,
    /// Set once a buffer was committed after configure.
    pub mapped: bool,
    /// Tree in the layer's tier, positioned at `geometry.loc`.
    pub node: NodeId,
    pub content: NodeId,
    pub geometry: Rectangle<i32>,
}

impl LayerSurface {
    /// Whether the surface takes part in exclusive-zone reservation.
    pub fn is_active(&self) -> bool {
        self.configured && self.mapped
    }
}

/// Places a layer surface inside the output box.
///
/// Returns `None` when the resulting width or height would be zero.
pub fn place(output: Rectangle<i32>, state: &LayerSurfaceState) -> Option<Rectangle<i32>> {
    let (x, w) = place_axis(
        output.loc.x,
        output.size.w,
        state.anchor.contains(Anchor::LEFT),
        state.anchor.contains(Anchor::RIGHT),
        state.margin.left,
        state.margin.right,
        state.size.w,
    );
    let (y, h) = place_axis(
        output.loc.y,
        output.size.h,
        state.anchor.contains(Anchor::TOP),
        state.anchor.contains(Anchor::BOTTOM),
        state.margin.top,
        state.margin.bottom,
        state.size.h,
    );

    let geometry = Rectangle::new(Point::new(x, y), Size::new(w, h));
    (!geometry.size.is_empty()).then_some(geometry)
}

fn place_axis(
    start: i32,
    len: i32,
    anchor_start: bool,
    anchor_end: bool,
    margin_start: i32,
    margin_end: i32,
    desired: i32,
) -> (i32, i32) {
    match (anchor_start, anchor_end) {
        (true, true) => {
            let available = len - margin_start - margin_end;
            if desired == 0 {
                (start + margin_start, available)
            } else {
                (start + margin_start + (available - desired) / 2, desired)
            }
        }
        (true, false) => (start + margin_start, desired),
        (false, true) => (start + len - margin_end - desired, desired),
        (false, false) => (start + (len - desired) / 2, desired),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output() -> Rectangle<i32> {
        Rectangle::new(Point::new(0, 0), Size::new(1280, 800))
    }

    #[test]
    fn top_bar_stretches_horizontally() {
        let state = LayerSurfaceState {
            exclusive_zone: 30,
            anchor: Anchor::TOP | Anchor::LEFT | Anchor::RIGHT,
            size: Size::new(0, 30),
            ..Default::default()
        };
        assert_eq!(
            place(output(), &state),
            Some(Rectangle::new(Point::new(0, 0), Size::new(1280, 30)))
        );
    }

    #[test]
    fn margins_offset_anchored_edges() {
        let state = LayerSurfaceState {
            anchor: Anchor::BOTTOM | Anchor::RIGHT,
            margin: Margins {
                bottom: 5,
                right: 10,
                ..Default::default()
            },
            size: Size::new(100, 50),
            ..Default::default()
        };
        assert_eq!(
            place(output(), &state),
            Some(Rectangle::new(Point::new(1170, 745), Size::new(100, 50)))
        );
    }

    #[test]
    fn unanchored_surface_is_centered() {
        let state = LayerSurfaceState {
            size: Size::new(200, 100),
            ..Default::default()
        };
        assert_eq!(
            place(output(), &state),
            Some(Rectangle::new(Point::new(540, 350), Size::new(200, 100)))
        );
    }

    #[test]
    fn sized_surface_between_anchors_is_centered() {
        let state = LayerSurfaceState {
            anchor: Anchor::LEFT | Anchor::RIGHT | Anchor::BOTTOM,
            margin: Margins {
                left: 100,
                ..Default::default()
            },
            size: Size::new(400, 40),
            ..Default::default()
        };
        assert_eq!(
            place(output(), &state),
            Some(Rectangle::new(Point::new(490, 760), Size::new(400, 40)))
        );
    }

    #[test]
    fn zero_size_is_rejected() {
        let state = LayerSurfaceState {
            anchor: Anchor::TOP,
            size: Size::new(0, 30),
            ..Default::default()
        };
        assert_eq!(place(output(), &state), None);
    }
}
