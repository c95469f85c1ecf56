use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::ops::{Add, Mul, Sub};

/// Scalar usable as a rectangle coordinate (integer pixels or real units).
pub trait Coord:
    Copy
    + PartialOrd
    + Debug
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
{
    const ZERO: Self;

    fn min_of(self, other: Self) -> Self {
        if other < self { other } else { self }
    }

    fn max_of(self, other: Self) -> Self {
        if other > self { other } else { self }
    }

    /// `None` when the sum does not fit (integers) or is not finite (floats).
    fn checked_add_of(self, other: Self) -> Option<Self>;

    /// Sum clamped to the type's range. Floats may return infinity.
    fn saturating_add_of(self, other: Self) -> Self;
}

macro_rules! impl_coord_int {
    ($($t:ty),* $(,)?) => {
        $(impl Coord for $t {
            const ZERO: Self = 0;

            fn checked_add_of(self, other: Self) -> Option<Self> {
                self.checked_add(other)
            }

            fn saturating_add_of(self, other: Self) -> Self {
                self.saturating_add(other)
            }
        })*
    };
}

macro_rules! impl_coord_float {
    ($($t:ty),* $(,)?) => {
        $(impl Coord for $t {
            const ZERO: Self = 0.0;

            fn checked_add_of(self, other: Self) -> Option<Self> {
                let sum = self + other;
                sum.is_finite().then_some(sum)
            }

            fn saturating_add_of(self, other: Self) -> Self {
                self + other
            }
        })*
    };
}

impl_coord_int!(u32, u64, i32, i64);
impl_coord_float!(f32, f64);

/// Axis-aligned rectangle. `x,y` is the min corner; `w,h` are sizes.
///
/// Edges are half-open: the rectangle spans `[x, x + w) x [y, y + h)`, so two
/// rectangles sharing an edge do not overlap.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Rect<T = u32> {
    pub x: T,
    pub y: T,
    pub w: T,
    pub h: T,
}

impl<T: Coord> Rect<T> {
    pub fn new(x: T, y: T, w: T, h: T) -> Self {
        Self { x, y, w, h }
    }

    /// Exclusive right edge (`x + w`). Overflows for integer rects whose far
    /// edge does not fit the type; see [`Rect::edges_fit`].
    pub fn right(&self) -> T {
        self.x + self.w
    }

    /// Exclusive bottom edge (`y + h`).
    pub fn bottom(&self) -> T {
        self.y + self.h
    }

    /// True if `x + w` and `y + h` are representable (finite for floats).
    pub fn edges_fit(&self) -> bool {
        self.x.checked_add_of(self.w).is_some() && self.y.checked_add_of(self.h).is_some()
    }

    /// The part of `self` inside `bounds`, or `None` if nothing of positive area is left.
    /// `self` may extend past the top of the coordinate range; `bounds` must satisfy
    /// [`Rect::edges_fit`].
    pub fn clipped_to(&self, bounds: &Rect<T>) -> Option<Rect<T>> {
        if self.is_empty() || bounds.is_empty() {
            return None;
        }
        let x1 = self.x.max_of(bounds.x);
        let y1 = self.y.max_of(bounds.y);
        let x2 = self.x.saturating_add_of(self.w).min_of(bounds.right());
        let y2 = self.y.saturating_add_of(self.h).min_of(bounds.bottom());
        if x2 > x1 && y2 > y1 {
            Some(Rect::new(x1, y1, x2 - x1, y2 - y1))
        } else {
            None
        }
    }

    pub fn area(&self) -> T {
        self.w * self.h
    }

    /// True if both sides are strictly positive. NaN sizes count as empty.
    pub fn has_positive_area(&self) -> bool {
        self.w > T::ZERO && self.h > T::ZERO
    }

    pub fn is_empty(&self) -> bool {
        !self.has_positive_area()
    }

    /// Returns true if the interiors intersect with nonzero area.
    /// Touching edges or corners are not an overlap.
    pub fn overlaps(&self, other: &Rect<T>) -> bool {
        self.has_positive_area()
            && other.has_positive_area()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Returns true if `r` is fully inside `self` (inclusive edges).
    /// Every rectangle contains itself.
    pub fn contains(&self, r: &Rect<T>) -> bool {
        r.x >= self.x && r.y >= self.y && r.right() <= self.right() && r.bottom() <= self.bottom()
    }

    /// The overlapping region, or `None` unless [`Rect::overlaps`] holds.
    pub fn intersection(&self, other: &Rect<T>) -> Option<Rect<T>> {
        if !self.overlaps(other) {
            return None;
        }
        let x1 = self.x.max_of(other.x);
        let y1 = self.y.max_of(other.y);
        let x2 = self.right().min_of(other.right());
        let y2 = self.bottom().min_of(other.bottom());
        Some(Rect::new(x1, y1, x2 - x1, y2 - y1))
    }
}
