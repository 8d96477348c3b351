//! Reserved output margins derived from layer-surface exclusive zones.

use super::{Anchor, LayerSurface, Margins};
use crate::output::OutputId;

/// Computes the margins reserved on `output` by the given layer surfaces.
///
/// A surface reserves space on an edge only when anchored to that edge and not to the opposite
/// one: a bar spanning the full width does not shrink the width. Surfaces on other outputs, not
/// yet configured and mapped, or with a non-positive zone, are ignored.
pub fn compute<'a>(
    output: OutputId,
    layers: impl IntoIterator<Item = &'a LayerSurface>,
) -> Margins {
    let mut margins = Margins::default();

    for layer in layers {
        if layer.output != output || !layer.is_active() {
            continue;
        }

        let zone = layer.state.exclusive_zone;
        if zone <= 0 {
            continue;
        }

        let anchor = layer.state.anchor;
        let only = |edge: Anchor, opposite: Anchor| anchor.contains(edge) && !anchor.contains(opposite);

        if only(Anchor::TOP, Anchor::BOTTOM) {
            margins.top = margins.top.max(zone);
        }
        if only(Anchor::BOTTOM, Anchor::TOP) {
            margins.bottom = margins.bottom.max(zone);
        }
        if only(Anchor::LEFT, Anchor::RIGHT) {
            margins.left = margins.left.max(zone);
        }
        if only(Anchor::RIGHT, Anchor::LEFT) {
            margins.right = margins.right.max(zone);
        }
    }

    margins
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{Layer, LayerSurfaceState};
    use crate::protocol::SurfaceId;
    use crate::scene::NodeId;
    use crate::utils::{Rectangle, Size};

    fn layer(anchor: Anchor, zone: i32) -> LayerSurface {
        LayerSurface {
            surface: SurfaceId(1),
            output: OutputId::default(),
            layer: Layer::Top,
            namespace: String::from("bar"),
            state: LayerSurfaceState {
                exclusive_zone: zone,
                anchor,
                size: Size::new(30, 30),
                ..Default::default()
            },
            configured: true,
            mapped: true,
            node: NodeId::default(),
            content: NodeId::default(),
            geometry: Rectangle::default(),
        }
    }

    #[test]
    fn spanning_both_sides_reserves_nothing() {
        let layers = [layer(Anchor::LEFT | Anchor::RIGHT, 100)];
        assert_eq!(compute(OutputId::default(), &layers), Margins::default());
    }

    #[test]
    fn single_edge_reserves_zone() {
        let layers = [layer(Anchor::LEFT, 48)];
        let margins = compute(OutputId::default(), &layers);
        assert!(margins.left >= 48);
        assert_eq!(margins.right, 0);
    }

    #[test]
    fn top_bar_reserves_only_top() {
        let layers = [
            layer(Anchor::TOP | Anchor::LEFT | Anchor::RIGHT, 30),
            layer(Anchor::TOP | Anchor::LEFT | Anchor::RIGHT, 20),
        ];
        assert_eq!(
            compute(OutputId::default(), &layers),
            Margins {
                top: 30,
                ..Margins::default()
            }
        );
    }

    #[test]
    fn non_positive_zone_is_ignored() {
        let layers = [layer(Anchor::BOTTOM, 0), layer(Anchor::RIGHT, -1)];
        assert_eq!(compute(OutputId::default(), &layers), Margins::default());
    }

    #[test]
    fn inactive_surfaces_are_ignored() {
        let mut unmapped = layer(Anchor::TOP, 30);
        unmapped.mapped = false;
        let mut unconfigured = layer(Anchor::BOTTOM, 30);
        unconfigured.configured = false;
        assert_eq!(
            compute(OutputId::default(), [&unmapped, &unconfigured]),
            Margins::default()
        );
    }
}
