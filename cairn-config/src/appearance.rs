use std::str::FromStr;

pub const DEFAULT_ACTIVE_BORDER_COLOR: Color = Color::new_unpremul(0.5, 0.78, 1., 1.);
pub const DEFAULT_INACTIVE_BORDER_COLOR: Color = Color::new_unpremul(0.31, 0.31, 0.31, 1.);

/// RGBA color in [0, 1] with unpremultiplied alpha.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn new_unpremul(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_array_unpremul([r, g, b, a]: [f32; 4]) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array_unpremul(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn to_array_premul(self) -> [f32; 4] {
        let [r, g, b, a] = [self.r, self.g, self.b, self.a];
        [r * a, g * a, b * a, a]
    }
}

impl FromStr for Color {
    type Err = csscolorparser::ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let color = csscolorparser::parse(s)?.to_array();
        Ok(Self::from_array_unpremul(color))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_colors() {
        let color: Color = "#ff000080".parse().unwrap();
        assert_eq!(color.r, 1.);
        assert_eq!(color.g, 0.);
        assert!((color.a - 128. / 255.).abs() < 1e-6);
    }

    #[test]
    fn rejects_garbage() {
        assert!("not-a-color".parse::<Color>().is_err());
    }
}
