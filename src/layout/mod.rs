//! Master-stack tiling.
//!
//! The first window takes the master column on the left; the rest split the stack column on the
//! right into equal slots. Computation is pure: the orchestrator decides which windows are on an
//! output and in what order, and feeds the results to the animation engine.

use crate::utils::{Point, Rectangle, Size};

/// Target geometries for `windows`, master first, in the same order as the input.
///
/// `master_ratio` is expected in `(0.1, 0.9)`. Negative usable dimensions are passed through
/// unclamped.
pub fn arrange<W: Copy>(
    windows: &[W],
    usable: Rectangle<i32>,
    master_ratio: f64,
    gap: i32,
) -> Vec<(W, Rectangle<i32>)> {
    let _span = tracy_client::span!("layout::arrange");

    let (master, stack) = match windows {
        [] => return Vec::new(),
        [only] => return vec![(*only, usable)],
        [master, stack @ ..] => (*master, stack),
    };

    let master_w = (f64::from(usable.size.w) * master_ratio).floor() as i32 - gap;
    let stack_w = usable.size.w - master_w - gap;
    let stack_x = usable.loc.x + master_w + gap;

    let mut result = Vec::with_capacity(windows.len());
    result.push((
        master,
        Rectangle::new(usable.loc, Size::new(master_w, usable.size.h)),
    ));

    let slots = stack.len() as i32;
    let slot_h = usable.size.h / slots;
    let mut y = usable.loc.y;
    for (idx, window) in stack.iter().enumerate() {
        let h = if idx as i32 == slots - 1 {
            usable.bottom() - y
        } else {
            slot_h
        };
        result.push((
            *window,
            Rectangle::new(Point::new(stack_x, y), Size::new(stack_w, h)),
        ));
        y += h;
    }

    result
}

/// Picks the master among the windows on an output.
///
/// The recorded master stays master while it is on the output; otherwise the first window in
/// stack order takes over.
pub fn select_master<W: Copy + PartialEq>(recorded: Option<W>, on_output: &[W]) -> Option<W> {
    recorded
        .filter(|master| on_output.contains(master))
        .or_else(|| on_output.first().copied())
}

/// Orders windows for [`arrange`]: the master first, the rest in stack order.
pub fn master_first<W: Copy + PartialEq>(master: W, stack_order: &[W]) -> Vec<W> {
    let mut ordered = Vec::with_capacity(stack_order.len());
    ordered.push(master);
    ordered.extend(stack_order.iter().copied().filter(|w| *w != master));
    ordered
}

#[cfg(test)]
mod tests {
    use std::fmt::Write as _;

    use insta::assert_snapshot;
    use proptest::prelude::*;

    use super::*;

    fn usable() -> Rectangle<i32> {
        Rectangle::new(Point::new(10, 10), Size::new(1260, 780))
    }

    fn format<W: std::fmt::Display>(result: &[(W, Rectangle<i32>)]) -> String {
        let mut buf = String::new();
        for (window, geo) in result {
            if !buf.is_empty() {
                buf.push('\n');
            }
            write!(buf, "{window}: {geo}").unwrap();
        }
        buf
    }

    #[test]
    fn empty() {
        assert!(arrange::<u32>(&[], usable(), 0.5, 10).is_empty());
    }

    #[test]
    fn single_window_fills_usable_area() {
        assert_snapshot!(format(&arrange(&[1], usable(), 0.5, 10)), @"1: (10, 10, 1260, 780)");
    }

    #[test]
    fn two_windows() {
        assert_snapshot!(format(&arrange(&[1, 2], usable(), 0.5, 10)), @"1: (10, 10, 620, 780)
2: (640, 10, 630, 780)");
    }

    #[test]
    fn stack_remainder_goes_to_last_slot() {
        assert_snapshot!(format(&arrange(&[1, 2, 3, 4], usable(), 0.75, 10)), @"1: (10, 10, 935, 780)
2: (955, 10, 315, 260)
3: (955, 270, 315, 260)
4: (955, 530, 315, 260)");

        let result = arrange(&[1, 2, 3, 4, 5, 6, 7, 8], usable(), 0.5, 10);
        let heights: Vec<_> = result[1..].iter().map(|(_, geo)| geo.size.h).collect();
        assert_eq!(heights, [111, 111, 111, 111, 111, 111, 114]);
    }

    #[test]
    fn master_is_sticky() {
        assert_eq!(select_master(Some(2), &[1, 2, 3]), Some(2));
        assert_eq!(select_master(Some(9), &[1, 2, 3]), Some(1));
        assert_eq!(select_master(None, &[3, 1]), Some(3));
        assert_eq!(select_master::<u32>(Some(1), &[]), None);
    }

    #[test]
    fn master_first_keeps_stack_order() {
        assert_eq!(master_first(3, &[1, 2, 3, 4]), [3, 1, 2, 4]);
    }

    prop_compose! {
        fn arb_usable()(
            x in -2000..2000i32,
            y in -2000..2000i32,
            w in 1..8000i32,
            h in 1..8000i32,
        ) -> Rectangle<i32> {
            Rectangle::new(Point::new(x, y), Size::new(w, h))
        }
    }

    proptest! {
        #[test]
        fn arrange_properties(
            n in 0usize..20,
            usable in arb_usable(),
            ratio in 0.1f64..0.9,
            gap in 0..50i32,
        ) {
            let windows: Vec<usize> = (0..n).collect();
            let result = arrange(&windows, usable, ratio, gap);

            prop_assert_eq!(result.len(), n);
            prop_assert_eq!(result.iter().map(|(w, _)| *w).collect::<Vec<_>>(), windows.clone());

            if n >= 2 {
                let master = result[0].1;
                let stack = &result[1..];
                prop_assert_eq!(master.size.w + gap + stack[0].1.size.w, usable.size.w);
                prop_assert_eq!(
                    stack.iter().map(|(_, geo)| geo.size.h).sum::<i32>(),
                    usable.size.h
                );
                prop_assert_eq!(stack[0].1.loc.y, usable.loc.y);
                prop_assert_eq!(stack.last().unwrap().1.bottom(), usable.bottom());
            }

            prop_assert_eq!(arrange(&windows, usable, ratio, gap), result);
        }
    }
}
