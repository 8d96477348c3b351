use slotmap::new_key_type;

use crate::layer::Margins;
use crate::utils::{Point, Rectangle, Size};

new_key_type! {
    pub struct OutputId;
}

#[derive(Debug, Clone)]
pub struct Output {
    pub name: String,
    /// Box in the global logical space.
    pub geometry: Rectangle<i32>,
    /// Space reserved by exclusive zones of layer surfaces.
    pub reserved: Margins,
}

impl Output {
    pub fn new(name: String, geometry: Rectangle<i32>) -> Self {
        Self {
            name,
            geometry,
            reserved: Margins::default(),
        }
    }

    /// Area available to tiled windows: the output box minus reserved margins, inset by `gap` on
    /// every side.
    ///
    /// Dimensions may come out negative on tiny outputs; callers do not clamp.
    pub fn usable_area(&self, gap: i32) -> Rectangle<i32> {
        let Margins {
            top,
            right,
            bottom,
            left,
        } = self.reserved;
        let geo = self.geometry;

        Rectangle::new(
            Point::new(geo.loc.x + left + gap, geo.loc.y + top + gap),
            Size::new(
                geo.size.w - left - right - 2 * gap,
                geo.size.h - top - bottom - 2 * gap,
            ),
        )
    }
}
