use std::collections::HashMap;

use crate::{EngineError, Glyph, Position, Rectangle, Result, Size, limits};

/// Opaque reference to a bitmap owned by a [`MemoryManager`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BitmapHandle(u32);

impl BitmapHandle {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for BitmapHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Palette indexed pixel buffer, one byte per pixel, row major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    size: Size,
    pixels: Vec<u8>,
    /// Palette index a later compositor treats as transparent.
    pub skip_color: u8,
    /// Where text was placed inside the bitmap, always within bounds.
    pub text_rect: Rectangle,
}

impl Bitmap {
    pub fn new(size: Size, color: u8) -> Self {
        let size = Size::new(size.width.max(0), size.height.max(0));
        Self {
            size,
            pixels: vec![color; size.width as usize * size.height as usize],
            skip_color: 0,
            text_rect: Rectangle::default(),
        }
    }

    /// Wraps existing pixel data, e.g. a decoded cel.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidBitmapSize`] for sizes outside the bitmap limits and
    /// [`EngineError::InvalidCel`] if `pixels` does not hold exactly `width * height` entries.
    pub fn from_pixels(size: Size, pixels: Vec<u8>) -> Result<Self> {
        if !limits::is_within_limits(size.width, size.height) {
            return Err(EngineError::InvalidBitmapSize {
                width: size.width,
                height: size.height,
            });
        }
        let expected = size.width as usize * size.height as usize;
        if pixels.len() != expected {
            return Err(EngineError::InvalidCel {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            size,
            pixels,
            skip_color: 0,
            text_rect: Rectangle::default(),
        })
    }

    pub fn width(&self) -> i32 {
        self.size.width
    }

    pub fn height(&self) -> i32 {
        self.size.height
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn rect(&self) -> Rectangle {
        Rectangle::from_size(self.size)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.size.width || y >= self.size.height {
            return None;
        }
        Some(y as usize * self.size.width as usize + x as usize)
    }

    pub fn get_pixel(&self, pos: impl Into<Position>) -> Option<u8> {
        let pos = pos.into();
        self.index(pos.x, pos.y).map(|i| self.pixels[i])
    }

    /// Out of bounds writes are ignored.
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, color: u8) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    pub fn fill(&mut self, color: u8) {
        self.pixels.fill(color);
    }

    /// Fills `rect` clipped to the bitmap.
    pub fn fill_rect(&mut self, rect: &Rectangle, color: u8) {
        let rect = rect.clip_to(&self.rect());
        if rect.is_empty() {
            return;
        }
        let stride = self.size.width as usize;
        for y in rect.y_range() {
            let row = y as usize * stride;
            self.pixels[row + rect.left() as usize..row + rect.right() as usize].fill(color);
        }
    }

    /// Draws an outline along the inside of `rect`, `thickness` pixels wide per axis.
    pub fn draw_frame(&mut self, rect: &Rectangle, thickness: Size, color: u8) {
        if rect.is_empty() {
            return;
        }
        let tx = thickness.width.clamp(0, rect.width());
        let ty = thickness.height.clamp(0, rect.height());

        // top / bottom
        self.fill_rect(&Rectangle::from(rect.left(), rect.top(), rect.width(), ty), color);
        self.fill_rect(&Rectangle::from(rect.left(), rect.bottom() - ty, rect.width(), ty), color);
        // left / right
        self.fill_rect(&Rectangle::from(rect.left(), rect.top(), tx, rect.height()), color);
        self.fill_rect(&Rectangle::from(rect.right() - tx, rect.top(), tx, rect.height()), color);
    }

    /// Copies `source` to the top left corner, clipped to the overlapping area.
    pub fn copy_from(&mut self, source: &Bitmap) {
        let width = self.size.width.min(source.size.width).max(0) as usize;
        let height = self.size.height.min(source.size.height).max(0);
        let dst_stride = self.size.width as usize;
        let src_stride = source.size.width as usize;
        for y in 0..height as usize {
            self.pixels[y * dst_stride..y * dst_stride + width].copy_from_slice(&source.pixels[y * src_stride..y * src_stride + width]);
        }
    }

    /// Copies the pixels of `source` inside `rect` to the same coordinates.
    pub fn copy_rect_from(&mut self, source: &Bitmap, rect: &Rectangle) {
        let rect = rect.clip_to(&self.rect()).clip_to(&source.rect());
        if rect.is_empty() {
            return;
        }
        let dst_stride = self.size.width as usize;
        let src_stride = source.size.width as usize;
        let (left, right) = (rect.left() as usize, rect.right() as usize);
        for y in rect.y_range() {
            let y = y as usize;
            self.pixels[y * dst_stride + left..y * dst_stride + right].copy_from_slice(&source.pixels[y * src_stride + left..y * src_stride + right]);
        }
    }

    /// Paints the set pixels of `glyph` with its top left corner at `pos`,
    /// leaving everything outside `clip` untouched.
    ///
    /// Dimmed glyphs only paint every other pixel in a checkerboard pattern.
    pub fn draw_glyph(&mut self, glyph: &Glyph, pos: Position, color: u8, dimmed: bool, clip: &Rectangle) {
        for y in 0..glyph.height as usize {
            let py = pos.y + y as i32;
            if py < clip.top() || py >= clip.bottom() {
                continue;
            }
            for x in 0..glyph.width as usize {
                let px = pos.x + x as i32;
                if px < clip.left() || px >= clip.right() {
                    continue;
                }
                if glyph.get_pixel(x, y) && (!dimmed || (x + y) % 2 == 0) {
                    self.set_pixel(px, py, color);
                }
            }
        }
    }
}

/// Allocator for bitmaps referenced by handle. Callers own the lifetime of
/// what they receive; the composer never frees.
pub trait MemoryManager {
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidBitmapSize`] for sizes the manager cannot hold.
    fn allocate(&mut self, width: i32, height: i32) -> Result<BitmapHandle>;

    /// # Errors
    ///
    /// Returns [`EngineError::UnknownBitmap`] if the handle is not live.
    fn bitmap(&self, handle: BitmapHandle) -> Result<&Bitmap>;

    /// # Errors
    ///
    /// Returns [`EngineError::UnknownBitmap`] if the handle is not live.
    fn bitmap_mut(&mut self, handle: BitmapHandle) -> Result<&mut Bitmap>;
}

impl<T: MemoryManager + ?Sized> MemoryManager for &mut T {
    fn allocate(&mut self, width: i32, height: i32) -> Result<BitmapHandle> {
        (**self).allocate(width, height)
    }

    fn bitmap(&self, handle: BitmapHandle) -> Result<&Bitmap> {
        (**self).bitmap(handle)
    }

    fn bitmap_mut(&mut self, handle: BitmapHandle) -> Result<&mut Bitmap> {
        (**self).bitmap_mut(handle)
    }
}

/// In-memory [`MemoryManager`].
#[derive(Debug, Default)]
pub struct BitmapArena {
    bitmaps: HashMap<BitmapHandle, Bitmap>,
    next_handle: u32,
}

impl BitmapArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes the bitmap from the arena and hands it to the caller.
    pub fn release(&mut self, handle: BitmapHandle) -> Option<Bitmap> {
        self.bitmaps.remove(&handle)
    }

    pub fn len(&self) -> usize {
        self.bitmaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bitmaps.is_empty()
    }
}

impl MemoryManager for BitmapArena {
    fn allocate(&mut self, width: i32, height: i32) -> Result<BitmapHandle> {
        if !limits::is_within_limits(width, height) {
            return Err(EngineError::InvalidBitmapSize { width, height });
        }
        self.next_handle += 1;
        let handle = BitmapHandle(self.next_handle);
        self.bitmaps.insert(handle, Bitmap::new(Size::new(width, height), 0));
        Ok(handle)
    }

    fn bitmap(&self, handle: BitmapHandle) -> Result<&Bitmap> {
        self.bitmaps.get(&handle).ok_or(EngineError::UnknownBitmap { handle })
    }

    fn bitmap_mut(&mut self, handle: BitmapHandle) -> Result<&mut Bitmap> {
        self.bitmaps.get_mut(&handle).ok_or(EngineError::UnknownBitmap { handle })
    }
}
