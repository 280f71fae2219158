use bstr::BString;
use serde::{Deserialize, Serialize};

use crate::{FontId, Rectangle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    /// Horizontal start of a line `line_width` wide inside `rect`.
    ///
    /// Centering uses integer division, so an odd remainder ends up on the right.
    pub fn line_start(self, rect: &Rectangle, line_width: i32) -> i32 {
        match self {
            TextAlign::Left => rect.left(),
            TextAlign::Center => rect.left() + (rect.width() - line_width) / 2,
            TextAlign::Right => rect.right() - line_width,
        }
    }
}

impl TryFrom<u16> for TextAlign {
    type Error = u16;

    fn try_from(value: u16) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(TextAlign::Left),
            1 => Ok(TextAlign::Center),
            2 => Ok(TextAlign::Right),
            _ => Err(value),
        }
    }
}

/// Style parameters of one composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStyle {
    pub fore_color: u8,
    pub back_color: u8,
    /// Transparency key for the compositor; only recorded on the bitmap.
    pub skip_color: u8,
    pub font: FontId,
    #[serde(default)]
    pub alignment: TextAlign,
    #[serde(default)]
    pub border_color: Option<u8>,
    #[serde(default)]
    pub dimmed: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            fore_color: 0,
            back_color: 255,
            skip_color: 255,
            font: 0,
            alignment: TextAlign::Left,
            border_color: None,
            dimmed: false,
        }
    }
}

impl TextStyle {
    pub fn with_colors(mut self, fore_color: u8, back_color: u8, skip_color: u8) -> Self {
        self.fore_color = fore_color;
        self.back_color = back_color;
        self.skip_color = skip_color;
        self
    }

    pub fn with_font(mut self, font: FontId) -> Self {
        self.font = font;
        self
    }

    pub fn with_alignment(mut self, alignment: TextAlign) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_border(mut self, border_color: Option<u8>) -> Self {
        self.border_color = border_color;
        self
    }

    pub fn with_dimmed(mut self, dimmed: bool) -> Self {
        self.dimmed = dimmed;
        self
    }
}

/// Everything a composition needs besides the bitmap background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawRequest {
    /// Text rect, in script space when `do_scaling` is set, bitmap space otherwise.
    pub rect: Rectangle,
    pub text: BString,
    pub style: TextStyle,
    pub do_scaling: bool,
}

impl DrawRequest {
    pub fn new(rect: Rectangle, text: impl Into<BString>) -> Self {
        Self {
            rect,
            text: text.into(),
            style: TextStyle::default(),
            do_scaling: false,
        }
    }

    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_scaling(mut self, do_scaling: bool) -> Self {
        self.do_scaling = do_scaling;
        self
    }
}
