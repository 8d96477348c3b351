use crate::FloatOrInt;

#[derive(knuffel::Decode, Debug, Default, Clone, Copy, PartialEq)]
pub struct Animations {
    #[knuffel(child)]
    pub off: bool,
    #[knuffel(child, default)]
    pub window_movement: WindowMovementAnim,
}

#[derive(knuffel::Decode, Debug, Default, Clone, Copy, PartialEq)]
pub struct WindowMovementAnim {
    #[knuffel(child, default)]
    pub spring: SpringParams,
}

/// Parameters of the damped harmonic oscillator driving geometry transitions.
///
/// `damping-ratio` below 1 overshoots, 1 is critically damped, above 1 is sluggish.
/// `frequency` scales wall-clock seconds into spring time.
#[derive(knuffel::Decode, Debug, Clone, Copy, PartialEq)]
pub struct SpringParams {
    #[knuffel(property(name = "damping-ratio"), default = Self::default().damping_ratio)]
    pub damping_ratio: FloatOrInt,
    #[knuffel(property(name = "frequency"), default = Self::default().frequency)]
    pub frequency: FloatOrInt,
}

impl Default for SpringParams {
    fn default() -> Self {
        Self {
            damping_ratio: FloatOrInt(1.),
            frequency: FloatOrInt(4.),
        }
    }
}
