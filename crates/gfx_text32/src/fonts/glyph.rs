//! Packed bitmap glyphs for proportional fonts.
//!
//! Each row is stored as a single `u32` with MSB-first bit ordering, which
//! supports glyphs up to 32x32 pixels without per-pixel allocations.

/// Maximum glyph width in pixels
pub const MAX_GLYPH_WIDTH: usize = 32;

/// Maximum glyph height in pixels
pub const MAX_GLYPH_HEIGHT: usize = 32;

/// A glyph bitmap stored as packed rows.
///
/// - Bit 31 = leftmost pixel
/// - Bit 0 = rightmost pixel (for 32px wide glyphs)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    /// Bitmap data: one `u32` per row, MSB = leftmost pixel
    pub data: [u32; MAX_GLYPH_HEIGHT],
    /// Glyph width in pixels, also the horizontal advance
    pub width: u8,
    /// Glyph height in pixels
    pub height: u8,
}

impl Default for Glyph {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Glyph {
    /// A zero width glyph without pixels
    pub const EMPTY: Self = Self {
        data: [0; MAX_GLYPH_HEIGHT],
        width: 0,
        height: 0,
    };

    /// Create a new glyph with all pixels off.
    #[inline]
    pub fn new(width: u8, height: u8) -> Self {
        Self {
            data: [0; MAX_GLYPH_HEIGHT],
            width: width.min(MAX_GLYPH_WIDTH as u8),
            height: height.min(MAX_GLYPH_HEIGHT as u8),
        }
    }

    /// Create a glyph from byte rows, one byte per row (MSB = leftmost pixel).
    ///
    /// Suited for fonts up to 8 pixels wide.
    pub fn from_byte_rows(width: u8, height: u8, rows: &[u8]) -> Self {
        let mut glyph = Self::new(width, height);
        for (y, row) in rows.iter().enumerate().take(glyph.height as usize) {
            glyph.data[y] = (*row as u32) << 24;
        }
        glyph
    }

    /// Create a glyph with every pixel set.
    pub fn solid(width: u8, height: u8) -> Self {
        let mut glyph = Self::new(width, height);
        let row = if glyph.width == 0 { 0 } else { u32::MAX << (32 - glyph.width as u32) };
        for y in 0..glyph.height as usize {
            glyph.data[y] = row;
        }
        glyph
    }

    /// Returns `false` if coordinates are out of bounds.
    #[inline]
    pub fn get_pixel(&self, x: usize, y: usize) -> bool {
        if x >= self.width as usize || y >= self.height as usize {
            return false;
        }
        (self.data[y] & (0x8000_0000 >> x)) != 0
    }

    /// Does nothing if coordinates are out of bounds.
    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, value: bool) {
        if x >= self.width as usize || y >= self.height as usize {
            return;
        }
        let mask = 0x8000_0000 >> x;
        if value {
            self.data[y] |= mask;
        } else {
            self.data[y] &= !mask;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data[..self.height as usize].iter().all(|&row| row == 0)
    }
}
