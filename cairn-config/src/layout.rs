use crate::appearance::{Color, DEFAULT_ACTIVE_BORDER_COLOR, DEFAULT_INACTIVE_BORDER_COLOR};
use crate::FloatOrInt;

/// Lower and upper bounds (exclusive) of the master column proportion.
pub const MASTER_RATIO_RANGE: (f64, f64) = (0.1, 0.9);

#[derive(knuffel::Decode, Debug, Clone, PartialEq)]
pub struct Layout {
    /// Gap around and between windows, in logical pixels.
    #[knuffel(child, unwrap(argument), default = Self::default().gaps)]
    pub gaps: i32,
    /// Share of the usable width given to the master window.
    #[knuffel(child, unwrap(argument), default = Self::default().master_ratio)]
    pub master_ratio: FloatOrInt,
    #[knuffel(child, default)]
    pub border: Border,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            gaps: 10,
            master_ratio: FloatOrInt(0.5),
            border: Border::default(),
        }
    }
}

#[derive(knuffel::Decode, Debug, Clone, Copy, PartialEq)]
pub struct Border {
    #[knuffel(child, unwrap(argument), default = Self::default().width)]
    pub width: i32,
    #[knuffel(child, unwrap(argument, str), default = Self::default().active_color)]
    pub active_color: Color,
    #[knuffel(child, unwrap(argument, str), default = Self::default().inactive_color)]
    pub inactive_color: Color,
}

impl Default for Border {
    fn default() -> Self {
        Self {
            width: 2,
            active_color: DEFAULT_ACTIVE_BORDER_COLOR,
            inactive_color: DEFAULT_INACTIVE_BORDER_COLOR,
        }
    }
}
