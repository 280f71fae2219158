//! Word wrapping and text measurement.
//!
//! Text is a byte string, every byte indexes a glyph of the active font. Bars
//! start inline control sequences that switch font (`|f<n>|`), fore color
//! (`|c<n>|`) or alignment (`|a<n>|`); they are never drawn and have no width.

use std::{ops::Range, sync::Arc};

use crate::{BitFont, FontId, FontProvider, Result, Size, TextAlign};

const CONTROL_START: u8 = b'|';

/// Style state that inline control codes can change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextState {
    pub font: FontId,
    pub fore_color: u8,
    pub alignment: TextAlign,
}

impl TextState {
    pub fn new(font: FontId, fore_color: u8, alignment: TextAlign) -> Self {
        Self { font, fore_color, alignment }
    }
}

/// One laid out line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSpan {
    /// Byte index of the first byte of the line.
    pub start: usize,
    /// Bytes belonging to the line, inline control codes included. The
    /// whitespace or line break the line was broken at is not part of it.
    pub len: usize,
    /// Byte index the next line starts at.
    pub next: usize,
    /// Rendered width in pixels.
    pub width: i32,
    /// Row height of the font active at the line start.
    pub height: i32,
    /// State at the first byte of the line.
    pub state: TextState,
    /// State the next line starts with.
    pub end_state: TextState,
}

impl LineSpan {
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.len
    }

    /// Bytes consumed from the text, including a swallowed break.
    pub fn consumed(&self) -> usize {
        self.next - self.start
    }
}

/// Result of laying out a block of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLayout {
    pub lines: Vec<LineSpan>,
    /// Widest line and the summed row heights.
    pub size: Size,
}

impl TextLayout {
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn width(&self) -> i32 {
        self.size.width
    }

    pub fn height(&self) -> i32 {
        self.size.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ControlCode {
    Font(u32),
    Color(u32),
    Align(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Glyph(u8),
    Break,
    Control(Option<ControlCode>),
}

#[inline]
fn is_blank(ch: u8) -> bool {
    ch == b' ' || ch == b'\t'
}

/// Reads the token at `pos` and returns it with its length in bytes.
fn next_token(text: &[u8], pos: usize) -> (Token, usize) {
    match text[pos] {
        b'\r' if text.get(pos + 1) == Some(&b'\n') => (Token::Break, 2),
        b'\n' | b'\r' => (Token::Break, 1),
        CONTROL_START => parse_control(text, pos),
        ch => (Token::Glyph(ch), 1),
    }
}

fn parse_control(text: &[u8], pos: usize) -> (Token, usize) {
    let rest = &text[pos + 1..];
    let Some(&kind) = rest.first() else {
        return (Token::Control(None), text.len() - pos);
    };
    if kind == CONTROL_START {
        return (Token::Control(None), 2);
    }

    let digits = rest[1..].iter().take_while(|b| b.is_ascii_digit()).count();
    let value = rest[1..=digits]
        .iter()
        .fold(0u32, |acc, d| acc.saturating_mul(10).saturating_add((d - b'0') as u32));

    let Some(end) = rest[1..].iter().position(|&b| b == CONTROL_START) else {
        // unterminated, swallows the rest
        return (Token::Control(None), text.len() - pos);
    };
    let len = end + 3;

    let code = match kind {
        b'f' if digits > 0 => Some(ControlCode::Font(value)),
        b'c' if digits > 0 => Some(ControlCode::Color(value)),
        b'a' if digits > 0 => Some(ControlCode::Align(value)),
        _ => None,
    };
    (Token::Control(code), len)
}

/// Breaks text into lines and measures it against the metrics of a
/// [`FontProvider`]. Never touches pixels.
pub struct TextLayoutEngine<'a, F: FontProvider + ?Sized> {
    fonts: &'a F,
    initial: TextState,
    font: Arc<BitFont>,
}

impl<'a, F: FontProvider + ?Sized> TextLayoutEngine<'a, F> {
    /// # Errors
    ///
    /// Fails if the font of `initial` cannot be resolved.
    pub fn new(fonts: &'a F, initial: TextState) -> Result<Self> {
        let font = fonts.resolve(initial.font)?;
        Ok(Self { fonts, initial, font })
    }

    /// Engine with an already resolved font, avoids a second lookup.
    pub fn with_font(fonts: &'a F, initial: TextState, font: Arc<BitFont>) -> Self {
        Self { fonts, initial, font }
    }

    pub fn initial_state(&self) -> TextState {
        self.initial
    }

    pub fn font(&self) -> &Arc<BitFont> {
        &self.font
    }

    pub fn row_height(&self) -> i32 {
        self.font.height()
    }

    fn resolve(&self, id: FontId) -> Result<Arc<BitFont>> {
        if id == self.initial.font {
            return Ok(self.font.clone());
        }
        self.fonts.resolve(id)
    }

    fn apply(&self, code: ControlCode, state: &mut TextState, font: &mut Arc<BitFont>) -> Result<()> {
        match code {
            ControlCode::Font(id) => match FontId::try_from(id) {
                Ok(id) => {
                    *font = self.resolve(id)?;
                    state.font = id;
                }
                Err(_) => log::warn!("ignoring out of range font id {id}"),
            },
            ControlCode::Color(color) => match u8::try_from(color) {
                Ok(color) => state.fore_color = color,
                Err(_) => log::warn!("ignoring out of range text color {color}"),
            },
            ControlCode::Align(value) => match u16::try_from(value).ok().and_then(|v| TextAlign::try_from(v).ok()) {
                Some(alignment) => state.alignment = alignment,
                None => log::warn!("ignoring unknown text alignment {value}"),
            },
        }
        Ok(())
    }

    /// Pixel width of `len` bytes of `text` starting at `start`, beginning
    /// with the initial font. Out of range parts are ignored.
    ///
    /// # Errors
    ///
    /// Fails if an inline font switch names an unknown font.
    pub fn measure_width(&self, text: &[u8], start: usize, len: usize) -> Result<i32> {
        let end = start.saturating_add(len).min(text.len());
        let text = &text[..end];
        let mut state = self.initial;
        let mut font = self.font.clone();
        let mut width = 0;
        let mut pos = start.min(end);
        while pos < end {
            let (token, token_len) = next_token(text, pos);
            match token {
                Token::Glyph(ch) => width += font.char_width(ch),
                Token::Control(Some(code)) => self.apply(code, &mut state, &mut font)?,
                Token::Control(None) | Token::Break => {}
            }
            pos += token_len;
        }
        Ok(width)
    }

    /// Finds the longest run starting at `start` that fits into `max_width`.
    ///
    /// Lines break after the last blank that still fits; the blank is consumed
    /// and not measured. A single word wider than `max_width` is cut at the
    /// last fitting character, and at least one glyph is always taken so the
    /// caller makes progress. Line breaks in the text end the line.
    /// `start` must be inside `text` for the line to consume anything.
    ///
    /// # Errors
    ///
    /// Fails if an inline font switch names an unknown font.
    pub fn break_line(&self, text: &[u8], start: usize, max_width: i32, state: TextState) -> Result<LineSpan> {
        let line_font = self.resolve(state.font)?;
        let height = line_font.height();
        let span = |end: usize, next: usize, width: i32, end_state: TextState| LineSpan {
            start,
            len: end - start,
            next,
            width,
            height,
            state,
            end_state,
        };

        let mut font = line_font.clone();
        let mut current = state;
        let mut pos = start;
        let mut width = 0;
        let mut has_glyph = false;
        // line end, next line start, width and state at the last fitting blank
        let mut last_break: Option<(usize, usize, i32, TextState)> = None;

        while pos < text.len() {
            let (token, token_len) = next_token(text, pos);
            match token {
                Token::Break => return Ok(span(pos, pos + token_len, width, current)),
                Token::Control(code) => {
                    if let Some(code) = code {
                        self.apply(code, &mut current, &mut font)?;
                    }
                }
                Token::Glyph(ch) => {
                    let char_width = font.char_width(ch);
                    if is_blank(ch) {
                        if width + char_width > max_width {
                            return Ok(span(pos, pos + 1, width, current));
                        }
                        last_break = Some((pos, pos + 1, width, current));
                    } else if width + char_width > max_width {
                        if let Some((end, next, break_width, break_state)) = last_break {
                            return Ok(span(end, next, break_width, break_state));
                        }
                        if !has_glyph {
                            return Ok(span(pos + 1, pos + 1, char_width, current));
                        }
                        return Ok(span(pos, pos, width, current));
                    }
                    width += char_width;
                    has_glyph = true;
                }
            }
            pos += token_len;
        }
        Ok(span(pos.max(start), pos.max(start), width, current))
    }

    /// Lays out the whole text at `max_width`.
    ///
    /// Empty text still produces one empty line, so the height is never below one row.
    ///
    /// # Errors
    ///
    /// Fails if an inline font switch names an unknown font.
    pub fn measure_block(&self, text: &[u8], max_width: i32) -> Result<TextLayout> {
        let mut lines = Vec::new();
        let mut state = self.initial;
        let mut pos = 0;
        while pos < text.len() {
            let line = self.break_line(text, pos, max_width, state)?;
            pos = line.next;
            state = line.end_state;
            lines.push(line);
        }
        if lines.is_empty() {
            lines.push(LineSpan {
                start: 0,
                len: 0,
                next: 0,
                width: 0,
                height: self.row_height(),
                state: self.initial,
                end_state: self.initial,
            });
        }

        let width = lines.iter().map(|l| l.width).max().unwrap_or(0);
        let height = lines.iter().map(|l| l.height).sum();
        Ok(TextLayout {
            lines,
            size: Size::new(width, height),
        })
    }

    /// Calls `draw` for every glyph of `line` with the byte, its font and the
    /// fore color active at that point.
    ///
    /// # Errors
    ///
    /// Fails if an inline font switch names an unknown font.
    pub fn for_each_glyph(&self, text: &[u8], line: &LineSpan, mut draw: impl FnMut(u8, &BitFont, u8)) -> Result<()> {
        let range = line.range();
        let text = &text[..range.end.min(text.len())];
        let mut state = line.state;
        let mut font = self.resolve(state.font)?;
        let mut pos = range.start;
        while pos < text.len() {
            let (token, token_len) = next_token(text, pos);
            match token {
                Token::Glyph(ch) => draw(ch, &font, state.fore_color),
                Token::Control(Some(code)) => self.apply(code, &mut state, &mut font)?,
                Token::Control(None) | Token::Break => {}
            }
            pos += token_len;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EngineError, FontCache, Glyph};

    fn fonts() -> FontCache {
        let mut cache = FontCache::new();
        cache.insert(0, BitFont::block("six", 6, 8));
        cache.insert(1, BitFont::block("ten", 10, 12));
        cache
    }

    fn state() -> TextState {
        TextState::new(0, 15, TextAlign::Left)
    }

    fn lines<'t>(text: &'t str, layout: &TextLayout) -> Vec<&'t str> {
        layout.lines.iter().map(|l| &text[l.range()]).collect()
    }

    #[test]
    fn test_quick_brown_fox() {
        let fonts = fonts();
        let engine = TextLayoutEngine::new(&fonts, state()).unwrap();
        let text = "THE QUICK BROWN FOX";

        let first = engine.break_line(text.as_bytes(), 0, 60, state()).unwrap();
        assert_eq!("THE QUICK", &text[first.range()]);
        assert_eq!(10, first.consumed());
        assert_eq!(54, first.width);

        let layout = engine.measure_block(text.as_bytes(), 60).unwrap();
        assert_eq!(vec!["THE QUICK", "BROWN FOX"], lines(text, &layout));
        assert_eq!(Size::new(54, 16), layout.size);
    }

    #[test]
    fn test_empty_text() {
        let fonts = fonts();
        let engine = TextLayoutEngine::new(&fonts, state()).unwrap();
        let layout = engine.measure_block(b"", 100).unwrap();
        assert_eq!(1, layout.line_count());
        assert_eq!(Size::new(0, 8), layout.size);
    }

    #[test]
    fn test_forced_break() {
        let fonts = fonts();
        let engine = TextLayoutEngine::new(&fonts, state()).unwrap();
        let text = "ABCDEFGHIJ";
        let layout = engine.measure_block(text.as_bytes(), 25).unwrap();
        assert_eq!(vec!["ABCD", "EFGH", "IJ"], lines(text, &layout));
        assert!(layout.lines.iter().all(|l| l.width <= 25));
    }

    #[test]
    fn test_glyph_wider_than_line_still_progresses() {
        let fonts = fonts();
        let engine = TextLayoutEngine::new(&fonts, state()).unwrap();
        let text = "ABC";
        let layout = engine.measure_block(text.as_bytes(), 4).unwrap();
        assert_eq!(vec!["A", "B", "C"], lines(text, &layout));
        assert_eq!(6, layout.width());
    }

    #[test]
    fn test_long_word_after_short_word() {
        let fonts = fonts();
        let engine = TextLayoutEngine::new(&fonts, state()).unwrap();
        let text = "A BCDEFGHIJ";
        let layout = engine.measure_block(text.as_bytes(), 30).unwrap();
        assert_eq!(vec!["A", "BCDEF", "GHIJ"], lines(text, &layout));
    }

    #[test]
    fn test_blank_at_edge_is_consumed() {
        let fonts = fonts();
        let engine = TextLayoutEngine::new(&fonts, state()).unwrap();
        let text = "ABCDE FG";
        let layout = engine.measure_block(text.as_bytes(), 30).unwrap();
        assert_eq!(vec!["ABCDE", "FG"], lines(text, &layout));
        assert_eq!(30, layout.lines[0].width);
    }

    #[test]
    fn test_hard_breaks() {
        let fonts = fonts();
        let engine = TextLayoutEngine::new(&fonts, state()).unwrap();
        let text = "AB\r\nC\n\nD\n";
        let layout = engine.measure_block(text.as_bytes(), 100).unwrap();
        assert_eq!(vec!["AB", "C", "", "D"], lines(text, &layout));
        assert_eq!(4 * 8, layout.height());
    }

    #[test]
    fn test_height_is_line_count_times_row_height() {
        let fonts = fonts();
        let engine = TextLayoutEngine::new(&fonts, state()).unwrap();
        let samples = [
            "",
            " ",
            "A",
            "THE QUICK BROWN FOX JUMPS OVER THE LAZY DOG",
            "  leading and  double  blanks ",
            "Averyveryverylongwordwithoutanyblanks and more",
            "tabs\tand\nnew\r\nlines",
        ];
        for text in samples {
            for max_width in 1..80 {
                let layout = engine.measure_block(text.as_bytes(), max_width).unwrap();

                let mut count = 0;
                let mut pos = 0;
                let mut state = engine.initial_state();
                while pos < text.len() {
                    let line = engine.break_line(text.as_bytes(), pos, max_width, state).unwrap();
                    assert!(line.consumed() > 0);
                    pos = line.next;
                    state = line.end_state;
                    count += 1;
                }
                assert_eq!(count.max(1) as i32 * engine.row_height(), layout.height(), "{text:?} {max_width}");

                for line in &layout.lines {
                    let single_glyph = line.len == 1;
                    assert!(line.width <= max_width || single_glyph, "{text:?} {max_width}: {line:?}");
                    assert_eq!(engine.measure_width(text.as_bytes(), line.start, line.len).unwrap(), line.width);
                }
            }
        }
    }

    #[test]
    fn test_measure_width_range() {
        let fonts = fonts();
        let engine = TextLayoutEngine::new(&fonts, state()).unwrap();
        assert_eq!(18, engine.measure_width(b"ABCDE", 1, 3).unwrap());
        assert_eq!(24, engine.measure_width(b"ABCDE", 1, 100).unwrap());
        assert_eq!(0, engine.measure_width(b"ABCDE", 10, 3).unwrap());
    }

    #[test]
    fn test_proportional_widths() {
        let mut cache = FontCache::new();
        let mut font = BitFont::new("prop", 7);
        font.set_glyph(b'i', Glyph::solid(2, 7));
        font.set_glyph(b'm', Glyph::solid(8, 7));
        font.set_glyph(b' ', Glyph::new(3, 7));
        cache.insert(4, font);
        let engine = TextLayoutEngine::new(&cache, TextState::new(4, 0, TextAlign::Left)).unwrap();
        assert_eq!(2 + 8 + 3 + 2, engine.measure_width(b"im i", 0, 4).unwrap());

        let text = "mi mi mi";
        let layout = engine.measure_block(text.as_bytes(), 25).unwrap();
        assert_eq!(vec!["mi mi", "mi"], lines(text, &layout));
        assert_eq!(23, layout.width());
    }

    #[test]
    fn test_control_codes_have_no_width() {
        let fonts = fonts();
        let engine = TextLayoutEngine::new(&fonts, state()).unwrap();
        assert_eq!(12, engine.measure_width(b"A|c4|B", 0, 6).unwrap());
        assert_eq!(12, engine.measure_width(b"A|x whatever|B", 0, 14).unwrap());
        assert_eq!(12, engine.measure_width(b"A||B", 0, 4).unwrap());
        assert_eq!(6, engine.measure_width(b"A|c4 never closed B", 0, 19).unwrap());
    }

    #[test]
    fn test_font_switch() {
        let fonts = fonts();
        let engine = TextLayoutEngine::new(&fonts, state()).unwrap();
        assert_eq!(6 + 20, engine.measure_width(b"A|f1|BC", 0, 7).unwrap());

        let text = "AA |f1|BBB CC";
        let layout = engine.measure_block(text.as_bytes(), 40).unwrap();
        assert_eq!(vec!["AA", "|f1|BBB", "CC"], lines(text, &layout));
        assert_eq!(8, layout.lines[0].height);
        assert_eq!(0, layout.lines[1].state.font);
        assert_eq!(30, layout.lines[1].width);
        assert_eq!(1, layout.lines[2].state.font);
        assert_eq!(12, layout.lines[2].height);
        assert_eq!(Size::new(30, 28), layout.size);
    }

    #[test]
    fn test_unknown_font_switch_fails() {
        let fonts = fonts();
        let engine = TextLayoutEngine::new(&fonts, state()).unwrap();
        assert!(matches!(
            engine.measure_width(b"A|f9|B", 0, 6),
            Err(EngineError::FontNotFound { id: 9 })
        ));
        assert!(engine.measure_block(b"A|f9|B", 100).is_err());
    }

    #[test]
    fn test_out_of_range_codes_are_ignored() {
        let fonts = fonts();
        let engine = TextLayoutEngine::new(&fonts, state()).unwrap();
        assert_eq!(12, engine.measure_width(b"A|f70000|B", 0, 10).unwrap());

        let text = b"|f99999||c300|A";
        let layout = engine.measure_block(text, 100).unwrap();
        assert_eq!(state(), layout.lines[0].end_state);
    }

    #[test]
    fn test_state_changes_carry_to_next_line() {
        let fonts = fonts();
        let engine = TextLayoutEngine::new(&fonts, state()).unwrap();
        let text = "|a1||c3|AB\nCD|a7|\nEF";
        let layout = engine.measure_block(text.as_bytes(), 100).unwrap();
        assert_eq!(3, layout.line_count());
        assert_eq!(TextAlign::Left, layout.lines[0].state.alignment);
        assert_eq!(TextState::new(0, 3, TextAlign::Center), layout.lines[1].state);
        assert_eq!(TextState::new(0, 3, TextAlign::Center), layout.lines[2].state);
    }

    #[test]
    fn test_for_each_glyph_applies_codes() {
        let fonts = fonts();
        let engine = TextLayoutEngine::new(&fonts, state()).unwrap();
        let text = b"A|c4|B|f1|C";
        let layout = engine.measure_block(text, 100).unwrap();
        let mut seen = Vec::new();
        engine
            .for_each_glyph(text, &layout.lines[0], |ch, font, color| seen.push((ch, font.char_width(ch), color)))
            .unwrap();
        assert_eq!(vec![(b'A', 6, 15), (b'B', 6, 4), (b'C', 10, 4)], seen);
    }

    #[test]
    fn test_unknown_initial_font() {
        let fonts = fonts();
        assert!(TextLayoutEngine::new(&fonts, TextState::new(7, 0, TextAlign::Left)).is_err());
    }
}
