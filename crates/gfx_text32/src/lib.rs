#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_lossless,
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::module_name_repetitions
)]
//! Text layout and palette bitmap composition.
//!
//! Converts a byte string plus style parameters (font, colors, alignment,
//! border, dimming) into a color indexed bitmap ready for compositing.
//! Layout works in two coordinate spaces, the logical script space used by
//! game logic and the scaled space of the bitmap, related by [`ScaleTransform`].

use std::cmp::{max, min};

mod position;
pub use position::*;

mod error;
pub use error::*;

pub mod limits;

mod scale;
pub use scale::*;

pub mod fonts;
pub use fonts::*;

mod bitmap;
pub use bitmap::*;

mod style;
pub use style::*;

pub mod layout;
pub use layout::{LineSpan, TextLayout, TextLayoutEngine, TextState};

mod renderer;
pub use renderer::*;

mod settings;
pub use settings::*;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(width: {}, height: {})", self.width, self.height)
    }
}

impl Size {
    pub fn new(width: i32, height: i32) -> Self {
        Size { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

/// Half open rectangle: covers `left..right` horizontally and `top..bottom` vertically.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rectangle {
    pub start: Position,
    pub size: Size,
}

impl std::fmt::Display for Rectangle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "(x:{}, y:{}, width: {}, height: {})",
            self.start.x, self.start.y, self.size.width, self.size.height
        )
    }
}

impl Rectangle {
    pub fn from(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            start: Position::new(x, y),
            size: Size::new(width, height),
        }
    }

    /// Builds a rectangle from two corners; the corners may be given in any order.
    pub fn from_coords(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Rectangle {
            start: Position::new(x1.min(x2), y1.min(y2)),
            size: Size::new((x2 - x1).abs(), (y2 - y1).abs()),
        }
    }

    pub fn from_size(size: Size) -> Self {
        Rectangle {
            start: Position::default(),
            size,
        }
    }

    pub fn top_left(&self) -> Position {
        self.start
    }

    pub fn bottom_right(&self) -> Position {
        Position {
            x: self.start.x + self.size.width,
            y: self.start.y + self.size.height,
        }
    }

    pub fn width(&self) -> i32 {
        self.size.width
    }

    pub fn height(&self) -> i32 {
        self.size.height
    }

    pub fn left(&self) -> i32 {
        self.start.x
    }

    pub fn right(&self) -> i32 {
        self.bottom_right().x
    }

    pub fn top(&self) -> i32 {
        self.start.y
    }

    pub fn bottom(&self) -> i32 {
        self.bottom_right().y
    }

    pub fn is_empty(&self) -> bool {
        self.size.width <= 0 || self.size.height <= 0
    }

    /// Clamps every edge into `bounds`.
    ///
    /// The result never has a negative size: a rectangle lying completely
    /// outside collapses onto the nearest edge of `bounds`.
    pub fn clip_to(&self, bounds: &Rectangle) -> Rectangle {
        let left = self.left().clamp(bounds.left(), bounds.right());
        let top = self.top().clamp(bounds.top(), bounds.bottom());
        let right = max(left, min(self.right(), bounds.right()));
        let bottom = max(top, min(self.bottom(), bounds.bottom()));
        Rectangle::from(left, top, right - left, bottom - top)
    }

    pub fn y_range(&self) -> std::ops::Range<i32> {
        self.start.y..self.bottom_right().y
    }
}
