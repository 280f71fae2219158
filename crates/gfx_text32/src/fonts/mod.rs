use std::{collections::HashMap, sync::Arc};

use crate::{EngineError, Result, Size};

pub mod glyph;
pub use glyph::Glyph;

/// Resource id of a font.
pub type FontId = u16;

/// Number of glyph slots in a font; text bytes index them directly.
pub const GLYPH_COUNT: usize = 256;

/// A proportional bitmap font: per-character widths, one shared row height.
#[derive(Debug, Clone, PartialEq)]
pub struct BitFont {
    /// Font name
    pub name: String,
    /// Row height in pixels
    pub height: u8,
    glyphs: Vec<Glyph>,
}

impl BitFont {
    /// Creates a font whose glyphs are all empty and zero width.
    pub fn new(name: &str, height: u8) -> Self {
        Self {
            name: name.to_string(),
            height,
            glyphs: vec![Glyph::EMPTY; GLYPH_COUNT],
        }
    }

    /// Creates a fixed width font where every visible glyph is a solid block
    /// and whitespace/control bytes are blank.
    ///
    /// Useful as deterministic metrics for layout previews and tests.
    pub fn block(name: &str, width: u8, height: u8) -> Self {
        let mut font = Self::new(name, height);
        for (ch, glyph) in font.glyphs.iter_mut().enumerate() {
            *glyph = if (ch as u8).is_ascii_graphic() || ch >= 0x80 {
                Glyph::solid(width, height)
            } else {
                Glyph::new(width, height)
            };
        }
        font
    }

    /// Creates a font from an iterator of glyphs, starting at character 0.
    /// Missing slots stay empty, extra glyphs are ignored.
    pub fn from_glyphs(name: &str, height: u8, glyphs: impl IntoIterator<Item = Glyph>) -> Self {
        let mut font = Self::new(name, height);
        for (slot, glyph) in font.glyphs.iter_mut().zip(glyphs) {
            *slot = glyph;
        }
        font
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Row height in pixels.
    pub fn height(&self) -> i32 {
        self.height as i32
    }

    #[inline]
    pub fn glyph(&self, ch: u8) -> &Glyph {
        &self.glyphs[ch as usize]
    }

    pub fn set_glyph(&mut self, ch: u8, glyph: Glyph) {
        self.glyphs[ch as usize] = glyph;
    }

    /// Horizontal advance of `ch` in pixels.
    #[inline]
    pub fn char_width(&self, ch: u8) -> i32 {
        self.glyphs[ch as usize].width as i32
    }

    /// Widest glyph and row height.
    pub fn size(&self) -> Size {
        let width = self.glyphs.iter().map(|g| g.width as i32).max().unwrap_or(0);
        Size::new(width, self.height())
    }
}

/// Source of font metrics and glyphs, looked up by id.
pub trait FontProvider {
    /// # Errors
    ///
    /// Returns [`EngineError::FontNotFound`] if `id` is unknown.
    fn resolve(&self, id: FontId) -> Result<Arc<BitFont>>;
}

impl<T: FontProvider + ?Sized> FontProvider for &T {
    fn resolve(&self, id: FontId) -> Result<Arc<BitFont>> {
        (**self).resolve(id)
    }
}

/// Fonts kept in memory, shared with every renderer that resolves them.
#[derive(Debug, Default, Clone)]
pub struct FontCache {
    fonts: HashMap<FontId, Arc<BitFont>>,
}

impl FontCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `font` under `id`, returning the font it replaced.
    pub fn insert(&mut self, id: FontId, font: BitFont) -> Option<Arc<BitFont>> {
        self.fonts.insert(id, Arc::new(font))
    }

    pub fn remove(&mut self, id: FontId) -> Option<Arc<BitFont>> {
        self.fonts.remove(&id)
    }

    pub fn contains(&self, id: FontId) -> bool {
        self.fonts.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

impl FontProvider for FontCache {
    fn resolve(&self, id: FontId) -> Result<Arc<BitFont>> {
        self.fonts.get(&id).cloned().ok_or(EngineError::FontNotFound { id })
    }
}
