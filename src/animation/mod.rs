//! Spring animations of window geometry.
//!
//! Each window has at most one animation in flight. Starting a new one replaces the old one,
//! starting from wherever the window currently is. The engine only computes geometry; the caller
//! applies it to the window and the scene.

use std::collections::HashMap;
use std::time::Duration;

use tracing::trace;

use crate::utils::Rectangle;
use crate::window::WindowId;

mod clock;
pub mod spring;

pub use clock::Clock;
pub use spring::SpringParams;

/// Animations stop once every component is closer than this to the target.
const DONE_THRESHOLD: f64 = 1.;

#[derive(Debug, Clone, Copy)]
pub struct Animation {
    from: Rectangle<f64>,
    to: Rectangle<f64>,
    start: Duration,
    params: SpringParams,
}

impl Animation {
    pub fn new(
        from: Rectangle<f64>,
        to: Rectangle<f64>,
        start: Duration,
        params: SpringParams,
    ) -> Self {
        Self {
            from,
            to,
            start,
            params,
        }
    }

    pub fn from(&self) -> Rectangle<f64> {
        self.from
    }

    pub fn to(&self) -> Rectangle<f64> {
        self.to
    }

    /// Geometry at `now`, and whether the animation is done.
    ///
    /// A finished animation reports exactly the target.
    pub fn value_at(&self, now: Duration) -> (Rectangle<f64>, bool) {
        let t = self.params.spring_time(now.saturating_sub(self.start));
        let progress = spring::progress(self.params.damping_ratio, t);

        let lerp = |from: f64, to: f64| from + progress * (to - from);
        let (from, to) = (self.from, self.to);
        let mut value = Rectangle::default();
        value.loc.x = lerp(from.loc.x, to.loc.x);
        value.loc.y = lerp(from.loc.y, to.loc.y);
        value.size.w = lerp(from.size.w, to.size.w);
        value.size.h = lerp(from.size.h, to.size.h);

        let close = |a: f64, b: f64| (a - b).abs() < DONE_THRESHOLD;
        let settled = close(value.loc.x, to.loc.x)
            && close(value.loc.y, to.loc.y)
            && close(value.size.w, to.size.w)
            && close(value.size.h, to.size.h);

        if settled || t >= spring::MAX_SPRING_TIME {
            (to, true)
        } else {
            (value, false)
        }
    }
}

/// Result of advancing one animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub window: WindowId,
    pub geometry: Rectangle<f64>,
    pub done: bool,
}

#[derive(Debug)]
pub struct AnimationEngine {
    animations: HashMap<WindowId, Animation>,
    params: SpringParams,
    off: bool,
}

impl AnimationEngine {
    pub fn new(params: SpringParams, off: bool) -> Self {
        Self {
            animations: HashMap::new(),
            params,
            off,
        }
    }

    pub fn set_params(&mut self, params: SpringParams, off: bool) {
        self.params = params;
        self.off = off;
    }

    /// Starts animating `window` from its current geometry toward `to`, replacing any animation
    /// in flight.
    ///
    /// Returns `false` when there is nothing to animate and the caller should apply `to` directly.
    pub fn start(
        &mut self,
        window: WindowId,
        from: Rectangle<f64>,
        to: Rectangle<f64>,
        now: Duration,
    ) -> bool {
        self.animations.remove(&window);

        if self.off || from == to {
            return false;
        }

        trace!("animating {window:?} from {from} to {to}");
        self.animations
            .insert(window, Animation::new(from, to, now, self.params));
        true
    }

    /// Retires the window's animation. Returns `true` if one was in flight.
    pub fn cancel(&mut self, window: WindowId) -> bool {
        self.animations.remove(&window).is_some()
    }

    pub fn get(&self, window: WindowId) -> Option<&Animation> {
        self.animations.get(&window)
    }

    /// Where the window is headed, if it is animating.
    pub fn target(&self, window: WindowId) -> Option<Rectangle<f64>> {
        self.animations.get(&window).map(Animation::to)
    }

    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.animations.len()
    }

    /// Advances all animations to `now`, retiring the finished ones.
    pub fn tick(&mut self, now: Duration) -> Vec<Step> {
        let _span = tracy_client::span!("AnimationEngine::tick");

        let mut steps = Vec::with_capacity(self.animations.len());
        self.animations.retain(|window, anim| {
            let (geometry, done) = anim.value_at(now);
            steps.push(Step {
                window: *window,
                geometry,
                done,
            });
            !done
        });
        steps
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;
    use slotmap::SlotMap;

    use super::*;
    use crate::utils::{Point, Size};

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Rectangle<f64> {
        Rectangle::new(Point::new(x, y), Size::new(w, h))
    }

    fn window() -> WindowId {
        SlotMap::<WindowId, ()>::with_key().insert(())
    }

    fn ms(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    #[test]
    fn replacement_starts_from_current_geometry() {
        let mut engine = AnimationEngine::new(SpringParams::new(1., 4.), false);
        let id = window();

        let original = rect(0., 0., 100., 100.);
        engine.start(id, original, rect(500., 0., 100., 100.), ms(0));
        let steps = engine.tick(ms(50));
        let current = steps[0].geometry;
        assert!(current.loc.x > 0. && current.loc.x < 500.);

        engine.start(id, current, rect(0., 400., 100., 100.), ms(50));
        assert_eq!(engine.len(), 1);
        let anim = engine.get(id).unwrap();
        assert_eq!(anim.from(), current);
        assert_ne!(anim.from(), original);
        assert_eq!(anim.to(), rect(0., 400., 100., 100.));
    }

    #[test]
    fn finished_animation_is_pinned_and_retired() {
        let mut engine = AnimationEngine::new(SpringParams::new(1., 4.), false);
        let id = window();
        let target = rect(640., 10., 630., 780.);
        engine.start(id, rect(0., 0., 0., 0.), target, ms(100));

        let steps = engine.tick(ms(100));
        assert_eq!(steps[0].geometry, rect(0., 0., 0., 0.));
        assert!(!steps[0].done);

        let steps = engine.tick(ms(2000));
        assert!(steps[0].done);
        assert_eq!(steps[0].geometry, target);
        assert!(engine.is_empty());
        assert!(engine.tick(ms(3000)).is_empty());
    }

    #[test]
    fn disabled_animations_apply_directly() {
        let mut engine = AnimationEngine::new(SpringParams::new(1., 4.), true);
        let id = window();
        assert!(!engine.start(id, rect(0., 0., 1., 1.), rect(5., 5., 1., 1.), ms(0)));
        assert!(engine.is_empty());
    }

    #[test]
    fn unchanged_target_does_not_animate() {
        let mut engine = AnimationEngine::new(SpringParams::new(1., 4.), false);
        let id = window();
        let geo = rect(1., 2., 3., 4.);
        assert!(!engine.start(id, geo, geo, ms(0)));
        assert!(!engine.cancel(id));
    }

    #[test]
    fn interpolation_is_per_component() {
        let anim = Animation::new(
            rect(0., 0., 100., 100.),
            rect(100., 0., 300., 100.),
            ms(0),
            SpringParams::new(1., 1.),
        );
        let (value, done) = anim.value_at(ms(200));
        assert!(!done);
        let progress = value.loc.x / 100.;
        assert_abs_diff_eq!(value.size.w, 100. + progress * 200., epsilon = 1e-9);
        assert_abs_diff_eq!(value.loc.y, 0.);
    }

    proptest! {
        #[test]
        fn converges_within_cap(
            zeta in 0.01f64..50.,
            frequency in 0.1f64..10.,
            dx in -3000f64..3000.,
            dw in -1000f64..1000.,
        ) {
            let from = rect(0., 0., 1200., 800.);
            let to = rect(dx, -dx, 1200. + dw, 800. - dw / 2.);
            let anim = Animation::new(from, to, ms(0), SpringParams::new(zeta, frequency));

            // Ticks at increasing times until done; spring time is capped, so the loop ends.
            let mut now = ms(0);
            let (geometry, done) = loop {
                let (geometry, done) = anim.value_at(now);
                if done || now > Duration::from_secs_f64(spring::MAX_SPRING_TIME / frequency) {
                    break (geometry, done);
                }
                now += ms(16);
            };

            prop_assert!(done);
            prop_assert_eq!(geometry, to);
        }
    }
}
