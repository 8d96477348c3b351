use super::fixture::Fixture;
use crate::layer::{Anchor, Layer, LayerSurfaceState, Margins};
use crate::protocol::{ClientRequest, SurfaceEvent};
use crate::state::hit_test::HitKind;
use crate::utils::{Point, Rectangle, Size};

fn rect(x: i32, y: i32, w: i32, h: i32) -> Rectangle<i32> {
    Rectangle::new(Point::new(x, y), Size::new(w, h))
}

fn top_bar() -> LayerSurfaceState {
    LayerSurfaceState {
        exclusive_zone: 30,
        anchor: Anchor::TOP | Anchor::LEFT | Anchor::RIGHT,
        margin: Margins::default(),
        size: Size::new(0, 30),
    }
}

#[test]
fn exclusive_zone_shrinks_layout() {
    let mut f = Fixture::new();
    let (w1, _) = f.map_window();
    let (w2, _) = f.map_window();
    f.take_requests();

    let bar = f.map_layer(Layer::Top, top_bar());

    assert_eq!(
        f.take_requests(),
        [
            ClientRequest::ConfigureLayer {
                surface: bar,
                size: Size::new(1280, 30),
            },
            ClientRequest::ConfigureToplevel {
                surface: f.window(w1).surface(),
                size: Size::new(620, 750),
            },
            ClientRequest::ConfigureToplevel {
                surface: f.window(w2).surface(),
                size: Size::new(630, 750),
            },
        ]
    );
    assert_eq!(f.state.registry.outputs[f.output].reserved.top, 30);
    assert_eq!(f.geometry(w1), rect(10, 40, 620, 750));
    assert_eq!(f.geometry(w2), rect(640, 40, 630, 750));

    f.surface_event(SurfaceEvent::LayerDestroyed { surface: bar });
    assert_eq!(f.state.registry.outputs[f.output].reserved, Margins::default());
    assert_eq!(f.geometry(w1), rect(10, 10, 620, 780));
}

#[test]
fn unmapped_layer_reserves_nothing() {
    let mut f = Fixture::new();
    let (w1, _) = f.map_window();
    let bar = f.map_layer(Layer::Top, top_bar());
    assert_eq!(f.geometry(w1), rect(10, 40, 1260, 750));

    // A commit without a buffer unmaps.
    f.surface_event(SurfaceEvent::LayerCommitted {
        surface: bar,
        state: top_bar(),
        has_buffer: false,
    });
    assert_eq!(f.geometry(w1), rect(10, 10, 1260, 780));

    f.surface_event(SurfaceEvent::LayerCommitted {
        surface: bar,
        state: top_bar(),
        has_buffer: true,
    });
    assert_eq!(f.geometry(w1), rect(10, 40, 1260, 750));
}

#[test]
fn zero_size_commit_is_ignored() {
    let mut f = Fixture::new();
    let state = LayerSurfaceState {
        anchor: Anchor::TOP,
        ..top_bar()
    };
    let bar = f.map_layer(Layer::Top, state);

    let id = f.state.registry.layer_for_surface(bar).unwrap();
    assert!(!f.state.registry.layers[id].is_active());
    assert_eq!(f.state.registry.outputs[f.output].reserved, Margins::default());
}

#[test]
fn windows_take_precedence_over_layers() {
    let mut f = Fixture::new();
    let (_, s1) = f.map_window();

    let overlay = f.map_layer(
        Layer::Overlay,
        LayerSurfaceState {
            anchor: Anchor::all(),
            ..LayerSurfaceState::default()
        },
    );

    let contents = f.state.contents_under(Point::new(100., 100.)).unwrap();
    assert_eq!(contents.surface, s1);
    assert_eq!(contents.kind, HitKind::Window);

    // The gap around windows belongs to the layer.
    let contents = f.state.contents_under(Point::new(5., 5.)).unwrap();
    assert_eq!(contents.surface, overlay);
    assert_eq!(contents.kind, HitKind::Layer(Layer::Overlay));
    assert_eq!(contents.window, None);

    // Hovering a layer surface leaves keyboard focus alone.
    let focused = f.state.focus.window;
    f.move_pointer_to(5., 5.);
    assert_eq!(f.state.focus.window, focused);
    assert_eq!(f.state.input.pointer_focus, Some(overlay));
}
