//! Geometric primitives for node placement and gesture handling.
//!
//! This module provides the fundamental geometric types used throughout Armillary
//! for describing where diagram nodes sit on the canvas and for carrying pointer
//! positions during gestures.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate in canvas space
//! - [`Size`] - Width and height dimensions
//! - [`Rect`] - A placement rectangle anchored at its top-left corner
//!
//! # Coordinate System
//!
//! Armillary uses a coordinate system consistent with screen canvases:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! - **Origin**: Top-left corner at `(0, 0)`
//! - **X-axis**: Increases rightward (positive to the right)
//! - **Y-axis**: Increases downward (positive downward)
//!
//! Placement coordinates may be negative (content can sit left of or above the
//! origin); dimensions may not.

use serde::{Deserialize, Serialize};

/// A 2D point representing a position in canvas coordinate space.
///
/// Points use `f32` coordinates and provide operations for basic vector math.
/// The coordinate system has origin at top-left with Y increasing downward
/// (see [module documentation](self) for details).
///
/// # Examples
///
/// ```
/// # use armillary_core::geometry::Point;
/// let p1 = Point::new(10.0, 20.0);
/// let p2 = Point::new(5.0, 5.0);
///
/// // Vector addition
/// let sum = p1.add_point(p2);
/// assert_eq!(sum.x(), 15.0);
/// assert_eq!(sum.y(), 25.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f32 {
        self.y
    }

    /// Creates a new point with the specified x-coordinate
    pub fn with_x(mut self, x: f32) -> Self {
        self.x = x;
        self
    }

    /// Creates a new point with the specified y-coordinate
    pub fn with_y(mut self, y: f32) -> Self {
        self.y = y;
        self
    }

    /// Checks if both x and y coordinates are zero
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Checks if both coordinates are finite numbers
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Adds another point to this point, returning a new point.
    ///
    /// # Examples
    ///
    /// ```
    /// # use armillary_core::geometry::Point;
    /// let position = Point::new(100.0, 50.0);
    /// let offset = Point::new(10.0, -5.0);
    ///
    /// let moved = position.add_point(offset);
    /// assert_eq!(moved.x(), 110.0);
    /// assert_eq!(moved.y(), 45.0);
    /// ```
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Subtracts another point from this point, returning a new point
    pub fn sub_point(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

/// Represents the dimensions of an element with width and height
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f32 {
        self.height
    }

    /// Returns true if both width and height are zero
    pub fn is_zero(self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }

    /// Checks if both dimensions are finite and non-negative
    pub fn is_valid(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width >= 0.0 && self.height >= 0.0
    }
}

/// A placement rectangle anchored at its top-left corner.
///
/// This is the geometry a node placement carries: the canvas position of its
/// top-left corner plus its dimensions. Coordinates may be negative, dimensions
/// may not. Serialization flattens into plain `x`/`y`/`width`/`height` fields.
///
/// # Examples
///
/// ```
/// # use armillary_core::geometry::{Point, Rect, Size};
/// let rect = Rect::new(100.0, 100.0, 120.0, 60.0);
/// assert_eq!(rect.origin(), Point::new(100.0, 100.0));
/// assert_eq!(rect.size(), Size::new(120.0, 60.0));
/// assert!(rect.is_valid());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl Rect {
    /// Creates a new rectangle from top-left coordinates and dimensions
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a new rectangle from a top-left point and a size
    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self {
            x: origin.x(),
            y: origin.y(),
            width: size.width(),
            height: size.height(),
        }
    }

    /// Returns the x-coordinate of the top-left corner
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the top-left corner
    pub fn y(self) -> f32 {
        self.y
    }

    /// Returns the width of the rectangle
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height of the rectangle
    pub fn height(self) -> f32 {
        self.height
    }

    /// Returns the top-left corner as a Point
    pub fn origin(self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Converts the dimensions to a Size object
    pub fn size(self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Returns the center point of the rectangle
    pub fn center(self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Creates a new rectangle with the specified top-left point, keeping dimensions
    pub fn with_origin(mut self, origin: Point) -> Self {
        self.x = origin.x();
        self.y = origin.y();
        self
    }

    /// Creates a new rectangle with the specified dimensions, keeping the top-left point
    pub fn with_size(mut self, size: Size) -> Self {
        self.width = size.width();
        self.height = size.height();
        self
    }

    /// Moves the rectangle by the specified offset.
    ///
    /// This translates the top-left corner by the given amount; dimensions are
    /// unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// # use armillary_core::geometry::{Point, Rect};
    /// let rect = Rect::new(10.0, 20.0, 50.0, 30.0);
    /// let moved = rect.translate(Point::new(100.0, 50.0));
    ///
    /// assert_eq!(moved.x(), 110.0);
    /// assert_eq!(moved.y(), 70.0);
    /// assert_eq!(moved.width(), 50.0);
    /// assert_eq!(moved.height(), 30.0);
    /// ```
    pub fn translate(self, offset: Point) -> Self {
        Self {
            x: self.x + offset.x(),
            y: self.y + offset.y(),
            ..self
        }
    }

    /// Checks whether this rectangle describes a representable placement.
    ///
    /// Coordinates must be finite; dimensions must be finite and non-negative.
    /// Gesture input that fails this check is rejected before it reaches any
    /// model mutation.
    ///
    /// # Examples
    ///
    /// ```
    /// # use armillary_core::geometry::Rect;
    /// assert!(Rect::new(-10.0, 5.0, 120.0, 60.0).is_valid());
    /// assert!(!Rect::new(0.0, 0.0, -1.0, 60.0).is_valid());
    /// assert!(!Rect::new(f32::NAN, 0.0, 120.0, 60.0).is_valid());
    /// ```
    pub fn is_valid(self) -> bool {
        self.origin().is_finite() && self.size().is_valid()
    }
}
