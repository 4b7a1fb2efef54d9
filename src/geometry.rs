//! Conversions between pixel coordinates on a rendered page surface and
//! resolution-independent percentage coordinates.
//!
//! Callers must only map against a [`PageSize`] for which
//! [`PageSize::is_ready`] holds; a `{0, 0}` size means the page has not
//! rendered yet.

use serde::{Deserialize, Serialize};

/// A point in pixels, relative to the top-left corner of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Pixel size of the rendered page surface at the current scale.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_ready(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Percentage position of a field on its page, each axis in `[0, 100]`.
///
/// Construction always clamps, and so does deserialization, so a stored
/// position can never leave the page.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "RawPosition")]
pub struct Position {
    x: f64,
    y: f64,
}

#[derive(Deserialize)]
struct RawPosition {
    x: f64,
    y: f64,
}

impl From<RawPosition> for Position {
    fn from(raw: RawPosition) -> Self {
        Position::clamped(raw.x, raw.y)
    }
}

impl Position {
    pub fn clamped(x: f64, y: f64) -> Self {
        Self {
            x: clamp_percent(x),
            y: clamp_percent(y),
        }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}

/// Bounding box origin of the page surface in the same coordinate space as
/// raw pointer events.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SurfaceRect {
    pub left: f64,
    pub top: f64,
}

impl SurfaceRect {
    pub const fn new(left: f64, top: f64) -> Self {
        Self { left, top }
    }

    pub fn to_local(&self, client_x: f64, client_y: f64) -> Point {
        Point::new(client_x - self.left, client_y - self.top)
    }
}

pub fn to_percent(pixel: Point, page: PageSize) -> Position {
    debug_assert!(page.is_ready(), "to_percent called before page size is known");
    Position::clamped(pixel.x / page.width * 100.0, pixel.y / page.height * 100.0)
}

pub fn to_pixel(percent: Position, page: PageSize) -> Point {
    debug_assert!(page.is_ready(), "to_pixel called before page size is known");
    Point::new(percent.x / 100.0 * page.width, percent.y / 100.0 * page.height)
}
