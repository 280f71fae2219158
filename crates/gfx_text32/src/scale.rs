//! Conversion between script space and scaled (bitmap) space.
//!
//! Game logic places text in a fixed design resolution ("script" space) while
//! the bitmap may be rendered at a higher resolution. Both axes are related by
//! independent rational ratios.

use crate::{EngineError, Rectangle, Result, Size};

/// Rational factor `numerator / denominator`, only built from the validated
/// axes of a [`ScaleTransform`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Ratio {
    numerator: i32,
    denominator: i32,
}

impl Ratio {
    pub(crate) fn new(numerator: i32, denominator: i32) -> Self {
        debug_assert!(denominator > 0, "ratio denominator must be positive");
        Self { numerator, denominator }
    }

    /// Multiplies `value` by the ratio, rounding toward negative infinity.
    pub(crate) fn apply(&self, value: i32) -> i32 {
        (value as i64 * self.numerator as i64).div_euclid(self.denominator as i64) as i32
    }
}

/// Returns `ceil(value * script_axis / scaled_axis)`.
///
/// Rounding up means a span converted this way never covers fewer pixels than
/// the exact rational result. `scaled_axis` must be positive.
pub(crate) fn to_physical_length(value: i32, script_axis: i32, scaled_axis: i32) -> i32 {
    let n = value as i64 * script_axis as i64;
    let d = scaled_axis as i64;
    -((-n).div_euclid(d)) as i32
}

/// Multiplies every edge of `rect` by the ratio of its axis.
pub(crate) fn scale_rect(rect: &Rectangle, ratio_x: Ratio, ratio_y: Ratio) -> Rectangle {
    Rectangle::from_coords(
        ratio_x.apply(rect.left()),
        ratio_y.apply(rect.top()),
        ratio_x.apply(rect.right()),
        ratio_y.apply(rect.bottom()),
    )
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// The script resolution and the scaled resolution text is rendered at.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ScaleTransform {
    script: Size,
    scaled: Size,
}

impl ScaleTransform {
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidScale`] if any axis is not positive.
    pub fn new(script: Size, scaled: Size) -> Result<Self> {
        if script.is_empty() || scaled.is_empty() {
            return Err(EngineError::InvalidScale {
                script_width: script.width,
                script_height: script.height,
                scaled_width: scaled.width,
                scaled_height: scaled.height,
            });
        }
        Ok(Self { script, scaled })
    }

    /// A 1:1 transform; `size` must be positive on both axes.
    pub fn identity(size: Size) -> Self {
        let size = Size::new(size.width.max(1), size.height.max(1));
        Self { script: size, scaled: size }
    }

    pub fn script_size(&self) -> Size {
        self.script
    }

    pub fn scaled_size(&self) -> Size {
        self.scaled
    }

    pub fn is_identity(&self) -> bool {
        self.script == self.scaled
    }

    /// Script to scaled ratio of the x axis.
    fn ratio_x(&self) -> Ratio {
        Ratio::new(self.scaled.width, self.script.width)
    }

    /// Script to scaled ratio of the y axis.
    fn ratio_y(&self) -> Ratio {
        Ratio::new(self.scaled.height, self.script.height)
    }

    fn axes(&self, axis: Axis) -> (i32, i32) {
        match axis {
            Axis::Horizontal => (self.script.width, self.scaled.width),
            Axis::Vertical => (self.script.height, self.scaled.height),
        }
    }

    /// Script rectangle expressed in scaled pixels.
    pub fn scale_rect(&self, rect: &Rectangle) -> Rectangle {
        scale_rect(rect, self.ratio_x(), self.ratio_y())
    }

    pub fn scale_size(&self, size: Size) -> Size {
        Size::new(self.ratio_x().apply(size.width), self.ratio_y().apply(size.height))
    }

    /// Script length to scaled pixels, rounded up.
    pub fn to_scaled_length(&self, value: i32, axis: Axis) -> i32 {
        let (script, scaled) = self.axes(axis);
        to_physical_length(value, scaled, script)
    }

    /// Scaled length to script units, rounded up.
    pub fn to_script_length(&self, value: i32, axis: Axis) -> i32 {
        let (script, scaled) = self.axes(axis);
        to_physical_length(value, script, scaled)
    }

    /// Converts a script width to scaled pixels, rounding down.
    pub fn script_width_to_scaled(&self, value: i32) -> i32 {
        self.ratio_x().apply(value)
    }
}
