use std::sync::Arc;

use bstr::{BStr, BString, ByteSlice};

use crate::{
    Axis, BitFont, Bitmap, BitmapHandle, DrawRequest, EngineError, FontId, FontProvider, MemoryManager, Position, Rectangle, Result, ScaleTransform, Size,
    TextLayout, TextLayoutEngine, TextSettings, TextState, TextStyle,
};

/// Outcome of a composition or repaint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composition {
    /// Bitmap owned by the caller from now on.
    pub handle: BitmapHandle,
    /// Text rect in bitmap pixels, clipped to the bitmap.
    pub text_rect: Rectangle,
    pub layout: TextLayout,
    /// Draw cursor after the last painted glyph.
    pub draw_position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Font and text are loaded; nothing painted with them yet.
    Configured,
    /// The active bitmap shows the loaded font and text.
    Composed,
}

/// Style and target of the active bitmap.
struct Session {
    handle: BitmapHandle,
    text_rect: Rectangle,
    style: TextStyle,
    border_size: Size,
    /// Source cel for image backgrounds, used to restore the text rect.
    cel: Option<Bitmap>,
}

/// Lays out text and composes it into palette bitmaps.
///
/// A renderer always has a font: it is resolved on construction, so every
/// measurement and draw call has metrics to work with. The last composition
/// stays the target of [`TextRenderer::erase`] and [`TextRenderer::repaint`]
/// until the next one replaces it; bitmaps are never freed here.
pub struct TextRenderer<F: FontProvider, M: MemoryManager> {
    fonts: F,
    memory: M,
    settings: TextSettings,
    scale: ScaleTransform,

    font_id: FontId,
    font: Arc<BitFont>,
    text: BString,

    session: Option<Session>,
    state: SessionState,
    draw_position: Position,
}

impl<F: FontProvider, M: MemoryManager> TextRenderer<F, M> {
    /// # Errors
    ///
    /// Fails if the settings describe an invalid scale or the default font is unknown.
    pub fn new(fonts: F, memory: M, settings: TextSettings) -> Result<Self> {
        let scale = settings.scale_transform()?;
        let font_id = settings.default_font;
        let font = fonts.resolve(font_id)?;
        Ok(Self {
            fonts,
            memory,
            settings,
            scale,
            font_id,
            font,
            text: BString::default(),
            session: None,
            state: SessionState::Configured,
            draw_position: Position::default(),
        })
    }

    pub fn fonts(&self) -> &F {
        &self.fonts
    }

    pub fn memory(&self) -> &M {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut M {
        &mut self.memory
    }

    pub fn settings(&self) -> &TextSettings {
        &self.settings
    }

    pub fn scale(&self) -> &ScaleTransform {
        &self.scale
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn font_id(&self) -> FontId {
        self.font_id
    }

    pub fn font(&self) -> &Arc<BitFont> {
        &self.font
    }

    pub fn text(&self) -> &BStr {
        self.text.as_bstr()
    }

    /// Clipped text rect of the active bitmap.
    pub fn text_rect(&self) -> Option<Rectangle> {
        self.session.as_ref().map(|s| s.text_rect)
    }

    pub fn draw_position(&self) -> Position {
        self.draw_position
    }

    pub fn active_bitmap(&self) -> Option<BitmapHandle> {
        self.session.as_ref().map(|s| s.handle)
    }

    /// # Errors
    ///
    /// Returns [`EngineError::UnknownBitmap`] if the memory manager no longer holds `handle`.
    pub fn bitmap(&self, handle: BitmapHandle) -> Result<&Bitmap> {
        self.memory.bitmap(handle)
    }

    /// Makes `id` the font for measurement and the next repaint.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::FontNotFound`]; the previous font stays active.
    pub fn set_font(&mut self, id: FontId) -> Result<()> {
        self.font = self.fonts.resolve(id)?;
        self.font_id = id;
        self.state = SessionState::Configured;
        log::debug!("text font set to {id}");
        Ok(())
    }

    /// Loads the text used by [`TextRenderer::measure_loaded_text`] and the next repaint.
    pub fn set_text(&mut self, text: impl Into<BString>) {
        self.text = text.into();
        self.state = SessionState::Configured;
    }

    fn initial_state(&self) -> TextState {
        let style = self.session.as_ref().map(|s| s.style).unwrap_or_default();
        TextState::new(self.font_id, style.fore_color, style.alignment)
    }

    fn layout_engine(&self) -> TextLayoutEngine<'_, F> {
        TextLayoutEngine::with_font(&self.fonts, self.initial_state(), self.font.clone())
    }

    /// Width in bitmap pixels of a run of the loaded text.
    ///
    /// # Errors
    ///
    /// Fails if an inline font switch names an unknown font.
    pub fn measure_loaded_text(&self, start: usize, len: usize) -> Result<i32> {
        self.layout_engine().measure_width(&self.text, start, len)
    }

    /// Width of a run of `text` converted to script units, rounded up.
    ///
    /// # Errors
    ///
    /// Fails if an inline font switch names an unknown font.
    pub fn measure_external_text(&self, text: impl AsRef<[u8]>, start: usize, len: usize) -> Result<i32> {
        let width = self.layout_engine().measure_width(text.as_ref(), start, len)?;
        Ok(self.scale.to_script_length(width, Axis::Horizontal))
    }

    /// Width of the whole `text` in script units.
    ///
    /// # Errors
    ///
    /// Fails if an inline font switch names an unknown font.
    pub fn string_width(&self, text: impl AsRef<[u8]>) -> Result<i32> {
        let text = text.as_ref();
        self.measure_external_text(text, 0, text.len())
    }

    /// Lays out `text` in bitmap pixels without painting.
    ///
    /// # Errors
    ///
    /// Fails if an inline font switch names an unknown font.
    pub fn measure_block(&self, text: impl AsRef<[u8]>, max_width: i32) -> Result<TextLayout> {
        self.layout_engine().measure_block(text.as_ref(), max_width)
    }

    /// Bounding rect of `text` wrapped at `max_width`.
    ///
    /// A width of 0 wraps at the configured default width, a negative width
    /// only breaks at line breaks. With `do_scaling` the width is given and
    /// the result returned in script units.
    ///
    /// # Errors
    ///
    /// Fails if an inline font switch names an unknown font.
    pub fn text_size(&self, text: impl AsRef<[u8]>, max_width: i32, do_scaling: bool) -> Result<Rectangle> {
        let wrap_width = match max_width {
            0 => self.settings.default_wrap_width(),
            w if w < 0 => i32::MAX / 2,
            w if do_scaling => self.scale.script_width_to_scaled(w).max(1),
            w => w,
        };
        let layout = self.measure_block(text, wrap_width)?;
        let mut size = layout.size;
        if do_scaling {
            size = Size::new(
                self.scale.to_script_length(size.width, Axis::Horizontal),
                self.scale.to_script_length(size.height, Axis::Vertical),
            );
        }
        Ok(Rectangle::from_size(size))
    }

    /// Allocates a `size` bitmap filled with the back color and draws the request into it.
    ///
    /// # Errors
    ///
    /// Fails if the font is unknown or the memory manager rejects the size.
    pub fn create_flat_bitmap(&mut self, size: Size, request: &DrawRequest) -> Result<Composition> {
        let font = self.fonts.resolve(request.style.font)?;
        let (size, rect) = if request.do_scaling {
            (self.scale.scale_size(size), self.scale.scale_rect(&request.rect))
        } else {
            (size, request.rect)
        };

        let handle = self.memory.allocate(size.width, size.height)?;
        self.memory.bitmap_mut(handle)?.fill(request.style.back_color);
        self.compose(handle, rect, request, font, None)
    }

    /// Draws the request over a copy of `cel`, the bitmap takes the cel's size.
    ///
    /// The text rect is only erased with the back color when it differs from
    /// the skip color; otherwise the cel shows through behind the text.
    ///
    /// # Errors
    ///
    /// Fails if the font is unknown or the memory manager rejects the size.
    pub fn create_image_bitmap(&mut self, cel: &Bitmap, request: &DrawRequest) -> Result<Composition> {
        let font = self.fonts.resolve(request.style.font)?;
        let rect = if request.do_scaling {
            self.scale.scale_rect(&request.rect)
        } else {
            request.rect
        };

        let handle = self.memory.allocate(cel.width(), cel.height())?;
        self.memory.bitmap_mut(handle)?.copy_from(cel);
        self.compose(handle, rect, request, font, Some(cel.clone()))
    }

    fn compose(&mut self, handle: BitmapHandle, rect: Rectangle, request: &DrawRequest, font: Arc<BitFont>, cel: Option<Bitmap>) -> Result<Composition> {
        let style = request.style;
        let border_size = if request.do_scaling {
            Size::new(
                self.scale.to_scaled_length(self.settings.border_size, Axis::Horizontal),
                self.scale.to_scaled_length(self.settings.border_size, Axis::Vertical),
            )
        } else {
            Size::new(self.settings.border_size, self.settings.border_size)
        };

        let bitmap = self.memory.bitmap_mut(handle)?;
        let text_rect = rect.clip_to(&bitmap.rect());
        if text_rect.is_empty() {
            log::warn!("text rect {rect} is empty inside bitmap {}", bitmap.size());
        }
        bitmap.skip_color = style.skip_color;
        bitmap.text_rect = text_rect;
        if cel.is_some() && style.back_color != style.skip_color {
            bitmap.fill_rect(&text_rect, style.back_color);
        }

        self.font_id = style.font;
        self.font = font;
        self.text = request.text.clone();
        self.session = Some(Session {
            handle,
            text_rect,
            style,
            border_size,
            cel,
        });
        self.state = SessionState::Configured;

        self.draw_border()?;
        let composition = self.draw_text_box()?;
        log::debug!(
            "composed bitmap {handle}: text rect {text_rect}, {} line(s)",
            composition.layout.line_count()
        );
        Ok(composition)
    }

    fn draw_border(&mut self) -> Result<()> {
        let session = self.session.as_ref().ok_or(EngineError::NoActiveBitmap)?;
        if let Some(color) = session.style.border_color {
            self.memory.bitmap_mut(session.handle)?.draw_frame(&session.text_rect, session.border_size, color);
        }
        Ok(())
    }

    fn draw_text_box(&mut self) -> Result<Composition> {
        let session = self.session.as_ref().ok_or(EngineError::NoActiveBitmap)?;
        let handle = session.handle;
        let text_rect = session.text_rect;
        let dimmed = session.style.dimmed;
        let initial = TextState::new(self.font_id, session.style.fore_color, session.style.alignment);

        let engine = TextLayoutEngine::with_font(&self.fonts, initial, self.font.clone());
        let layout = engine.measure_block(&self.text, text_rect.width())?;

        let bitmap = self.memory.bitmap_mut(handle)?;
        let mut pos = text_rect.top_left();
        if !self.text.is_empty() {
            for line in &layout.lines {
                pos.x = line.state.alignment.line_start(&text_rect, line.width);
                engine.for_each_glyph(&self.text, line, |ch, font, color| {
                    bitmap.draw_glyph(font.glyph(ch), pos, color, dimmed, &text_rect);
                    pos.x += font.char_width(ch);
                })?;
                pos.y += line.height;
            }
        }

        self.draw_position = pos;
        self.state = SessionState::Composed;
        Ok(Composition {
            handle,
            text_rect,
            layout,
            draw_position: pos,
        })
    }

    /// Fills `rect` of the active bitmap with the back color.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoActiveBitmap`] before the first composition.
    pub fn erase(&mut self, rect: Rectangle, do_scaling: bool) -> Result<()> {
        let rect = if do_scaling { self.scale.scale_rect(&rect) } else { rect };
        let session = self.session.as_ref().ok_or(EngineError::NoActiveBitmap)?;
        self.memory.bitmap_mut(session.handle)?.fill_rect(&rect, session.style.back_color);
        Ok(())
    }

    /// Redraws the active bitmap in place: background of the text rect,
    /// border and every line of the loaded text with the loaded font.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoActiveBitmap`] before the first composition.
    pub fn repaint(&mut self) -> Result<Composition> {
        let session = self.session.as_ref().ok_or(EngineError::NoActiveBitmap)?;
        let bitmap = self.memory.bitmap_mut(session.handle)?;
        match &session.cel {
            Some(cel) => {
                bitmap.copy_rect_from(cel, &session.text_rect);
                if session.style.back_color != session.style.skip_color {
                    bitmap.fill_rect(&session.text_rect, session.style.back_color);
                }
            }
            None => bitmap.fill_rect(&session.text_rect, session.style.back_color),
        }
        log::debug!("repainting bitmap {}", session.handle);
        self.draw_border()?;
        self.draw_text_box()
    }

    /// Replaces the style of the active bitmap and repaints it.
    ///
    /// # Errors
    ///
    /// Fails without changes if there is no active bitmap or the font is unknown.
    pub fn restyle(&mut self, style: TextStyle) -> Result<Composition> {
        if self.session.is_none() {
            return Err(EngineError::NoActiveBitmap);
        }
        let font = self.fonts.resolve(style.font)?;
        if let Some(session) = self.session.as_mut() {
            session.style = style;
        }
        self.font_id = style.font;
        self.font = font;
        self.repaint()
    }
}
