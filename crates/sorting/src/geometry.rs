//! Points, sizes and the clamping/hit-testing primitives used by every entity.

use std::fmt;
use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

/// Game-area coordinates, origin at the top-left of the game surface.
#[derive(Clone, Copy, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from(v: (f64, f64)) -> Self {
        Self { x: v.0, y: v.1 }
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Component-wise scaling, used when re-mapping offsets on resize.
impl Mul<Scale> for Point {
    type Output = Self;

    fn mul(self, rhs: Scale) -> Self {
        Self::new(self.x * rhs.x, self.y * rhs.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

#[derive(Clone, Copy, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when either side is zero or negative (nothing to divide by).
    #[must_use]
    pub fn is_degenerate(self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Ratio `self / old` per axis. `None` if `old` is degenerate.
    #[must_use]
    pub fn scale_from(self, old: Self) -> Option<Scale> {
        if old.is_degenerate() {
            return None;
        }
        Some(Scale {
            x: self.width / old.width,
            y: self.height / old.height,
        })
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}x{:.1}", self.width, self.height)
    }
}

/// Per-axis scale factor.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Scale {
    pub x: f64,
    pub y: f64,
}

/// Inclusive clamping box for a top-left image position.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    #[must_use]
    pub const fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Box of valid top-left positions for an object of `extent` inside the
    /// rectangle at `origin` with `size`.
    #[must_use]
    pub fn inset(origin: Point, size: Size, extent: f64) -> Self {
        Self {
            min: origin,
            max: Point::new(
                origin.x + size.width - extent,
                origin.y + size.height - extent,
            ),
        }
    }

    #[must_use]
    pub fn clamp(&self, p: Point) -> Point {
        Point::new(
            clamp(self.min.x, self.max.x, p.x),
            clamp(self.min.y, self.max.y, p.y),
        )
    }
}

/// Clamp `value` into `[low, high]`.
///
/// The upper bound is checked first, so an inverted range (`low > high`)
/// resolves to `high` for values above it. `f64::clamp` would panic there.
#[must_use]
pub fn clamp(low: f64, high: f64, value: f64) -> f64 {
    if value > high {
        high
    } else if value < low {
        low
    } else {
        value
    }
}

/// Strict interior test: points exactly on an edge are outside.
#[must_use]
pub fn point_in_rect(point: Point, origin: Point, size: Size) -> bool {
    point.x > origin.x
        && point.x < origin.x + size.width
        && point.y > origin.y
        && point.y < origin.y + size.height
}
