//! Minimal 2D geometry in the global logical coordinate space.
//!
//! Integer types describe layout results and scene positions; `f64` types describe animated and
//! pointer positions.

use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Numeric type usable as a coordinate.
pub trait Coordinate:
    Copy
    + Default
    + PartialOrd
    + fmt::Debug
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
{
}

impl Coordinate for i32 {}
impl Coordinate for f64 {}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point<N> {
    pub x: N,
    pub y: N,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size<N> {
    pub w: N,
    pub h: N,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rectangle<N> {
    pub loc: Point<N>,
    pub size: Size<N>,
}

impl<N: Coordinate> Point<N> {
    pub const fn new(x: N, y: N) -> Self {
        Self { x, y }
    }
}

impl<N: Coordinate> From<(N, N)> for Point<N> {
    fn from((x, y): (N, N)) -> Self {
        Self { x, y }
    }
}

impl<N: Coordinate> Add for Point<N> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl<N: Coordinate> AddAssign for Point<N> {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<N: Coordinate> Sub for Point<N> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl<N: Coordinate> SubAssign for Point<N> {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Point<i32> {
    pub fn to_f64(self) -> Point<f64> {
        Point::new(f64::from(self.x), f64::from(self.y))
    }
}

impl Point<f64> {
    pub fn to_i32_round(self) -> Point<i32> {
        Point::new(self.x.round() as i32, self.y.round() as i32)
    }
}

impl<N: Coordinate> Size<N> {
    pub const fn new(w: N, h: N) -> Self {
        Self { w, h }
    }

    /// Whether either dimension is zero or negative.
    pub fn is_empty(&self) -> bool {
        !(self.w > N::default() && self.h > N::default())
    }
}

impl<N: Coordinate> From<(N, N)> for Size<N> {
    fn from((w, h): (N, N)) -> Self {
        Self { w, h }
    }
}

impl Size<i32> {
    pub fn to_f64(self) -> Size<f64> {
        Size::new(f64::from(self.w), f64::from(self.h))
    }
}

impl Size<f64> {
    pub fn to_i32_round(self) -> Size<i32> {
        Size::new(self.w.round() as i32, self.h.round() as i32)
    }
}

impl<N: Coordinate> Rectangle<N> {
    pub fn new(loc: Point<N>, size: Size<N>) -> Self {
        Self { loc, size }
    }

    pub fn from_size(size: Size<N>) -> Self {
        Self {
            loc: Point::default(),
            size,
        }
    }

    pub fn right(&self) -> N {
        self.loc.x + self.size.w
    }

    pub fn bottom(&self) -> N {
        self.loc.y + self.size.h
    }

    /// Whether the point lies inside, with the right and bottom edges excluded.
    pub fn contains(&self, point: impl Into<Point<N>>) -> bool {
        let point = point.into();
        self.loc.x <= point.x
            && point.x < self.right()
            && self.loc.y <= point.y
            && point.y < self.bottom()
    }

    /// Smallest rectangle containing both rectangles.
    pub fn merge(self, other: Self) -> Self {
        let min = |a: N, b: N| if b < a { b } else { a };
        let max = |a: N, b: N| if b > a { b } else { a };

        let x = min(self.loc.x, other.loc.x);
        let y = min(self.loc.y, other.loc.y);
        let right = max(self.right(), other.right());
        let bottom = max(self.bottom(), other.bottom());
        Self::new(Point::new(x, y), Size::new(right - x, bottom - y))
    }
}

impl Rectangle<i32> {
    pub fn to_f64(self) -> Rectangle<f64> {
        Rectangle::new(self.loc.to_f64(), self.size.to_f64())
    }

    pub fn center(&self) -> Point<f64> {
        let rect = self.to_f64();
        Point::new(
            rect.loc.x + rect.size.w / 2.,
            rect.loc.y + rect.size.h / 2.,
        )
    }
}

impl Rectangle<f64> {
    pub fn to_i32_round(self) -> Rectangle<i32> {
        Rectangle::new(self.loc.to_i32_round(), self.size.to_i32_round())
    }

    pub fn center(&self) -> Point<f64> {
        Point::new(
            self.loc.x + self.size.w / 2.,
            self.loc.y + self.size.h / 2.,
        )
    }
}

impl<N: fmt::Display> fmt::Display for Rectangle<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.loc.x, self.loc.y, self.size.w, self.size.h
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_excludes_far_edges() {
        let rect = Rectangle::new(Point::new(10, 10), Size::new(20, 20));
        assert!(rect.contains((10, 10)));
        assert!(rect.contains((29, 29)));
        assert!(!rect.contains((30, 10)));
        assert!(!rect.contains((10, 30)));
        assert!(!rect.contains((9, 15)));
    }

    #[test]
    fn merge_covers_both() {
        let a = Rectangle::new(Point::new(0, 0), Size::new(1280, 800));
        let b = Rectangle::new(Point::new(1280, 0), Size::new(1920, 1080));
        assert_eq!(
            a.merge(b),
            Rectangle::new(Point::new(0, 0), Size::new(3200, 1080))
        );
    }

    #[test]
    fn center_of_odd_size() {
        let rect = Rectangle::new(Point::new(0, 0), Size::new(5, 3));
        assert_eq!(rect.center(), Point::new(2.5, 1.5));
    }
}
