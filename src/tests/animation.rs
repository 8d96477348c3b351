use std::time::Duration;

use cairn_config::Config;

use super::fixture::Fixture;
use crate::input::{ButtonState, InputEvent, PointerMode};
use crate::protocol::SurfaceEvent;
use crate::utils::{Point, Rectangle, Size};

fn animated() -> Fixture {
    Fixture::with_config(Config::default())
}

#[test]
fn first_placement_is_immediate() {
    let mut f = animated();
    let (w1, _) = f.map_window();

    assert_eq!(
        f.geometry(w1),
        Rectangle::new(Point::new(10, 10), Size::new(1260, 780))
    );
    assert!(!f.state.needs_frame());
}

#[test]
fn relayout_animates_to_target() {
    let mut f = animated();
    let (w1, _) = f.map_window();
    let (w2, _) = f.map_window();

    // The new window appears in place, the old one starts moving.
    assert_eq!(f.geometry(w2).size, Size::new(630, 780));
    assert_eq!(f.geometry(w1).size, Size::new(1260, 780));
    assert!(f.state.needs_frame());

    f.clock.advance(Duration::from_millis(50));
    f.state.on_frame(f.clock.now());
    let w = f.window(w1).geometry().size.w;
    assert!(620. < w && w < 1260., "width {w} should be in between");

    f.clock.advance(Duration::from_secs(3));
    f.state.on_frame(f.clock.now());
    assert_eq!(
        f.geometry(w1),
        Rectangle::new(Point::new(10, 10), Size::new(620, 780))
    );
    assert!(!f.state.needs_frame());
}

#[test]
fn retarget_starts_from_current_geometry() {
    let mut f = animated();
    let (w1, _) = f.map_window();
    let (_, s2) = f.map_window();

    f.clock.advance(Duration::from_millis(50));
    f.state.on_frame(f.clock.now());
    let midway = f.window(w1).geometry();

    // w1 is alone again and heads back to full width from where it is now.
    f.surface_event(SurfaceEvent::ToplevelUnmapped { surface: s2 });
    let anim = f.state.animations.get(w1).unwrap();
    assert_eq!(anim.from(), midway);
    assert_eq!(
        anim.to(),
        Rectangle::new(Point::new(10., 10.), Size::new(1260., 780.))
    );
    assert_eq!(f.state.animations.len(), 1);
}

#[test]
fn destroying_a_window_retires_its_animation() {
    let mut f = animated();
    let (w1, s1) = f.map_window();
    f.map_window();
    assert!(f.state.animations.get(w1).is_some());

    f.surface_event(SurfaceEvent::ToplevelDestroyed { surface: s1 });
    assert!(f.state.animations.get(w1).is_none());

    // Ticking with the window gone is fine.
    f.clock.advance(Duration::from_secs(1));
    f.state.on_frame(f.clock.now());
}

#[test]
fn layout_during_move_grab_waits_for_release() {
    let mut f = animated();
    let (w1, s1) = f.map_window();

    f.move_pointer_to(100., 100.);
    f.input(InputEvent::PointerButton {
        time: 1000,
        button: 0x110,
        state: ButtonState::Pressed,
    });
    f.surface_event(SurfaceEvent::RequestMove { surface: s1 });
    f.move_pointer_to(150., 130.);
    let grabbed = Rectangle::new(Point::new(60, 40), Size::new(1260, 780));
    assert_eq!(f.geometry(w1), grabbed);

    // A new window re-arranges everything except the grabbed one.
    let (w2, _) = f.map_window();
    assert_eq!(
        f.geometry(w2),
        Rectangle::new(Point::new(640, 10), Size::new(630, 780))
    );
    assert!(f.state.animations.get(w1).is_none());

    f.clock.advance(Duration::from_millis(100));
    f.state.on_frame(f.clock.now());
    assert_eq!(f.geometry(w1), grabbed);
    assert!(matches!(f.state.input.mode, PointerMode::Moving { .. }));

    // Release hands the window back to layout.
    f.input(InputEvent::PointerButton {
        time: 1200,
        button: 0x110,
        state: ButtonState::Released,
    });
    assert_eq!(f.state.input.mode, PointerMode::Passthrough);
    assert_eq!(
        f.state.animations.target(w1),
        Some(Rectangle::new(Point::new(10., 10.), Size::new(620., 780.)))
    );

    f.clock.advance(Duration::from_secs(3));
    f.state.on_frame(f.clock.now());
    assert_eq!(
        f.geometry(w1),
        Rectangle::new(Point::new(10, 10), Size::new(620, 780))
    );
}
