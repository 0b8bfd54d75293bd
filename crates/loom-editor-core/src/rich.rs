//! Rich characters: a codepoint plus per-character formatting.
//!
//! Formatting is split in two: the `StyleFlags` bitset (bold, italic, ...)
//! which takes part in equality, and scalar/reference attributes (font,
//! size, colours, link) which do not. Search and the dictionary only ever
//! compare codepoint and flags.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Body text size used when nothing else is configured.
pub const DEFAULT_FONT_SIZE: u32 = 36;

/// Index of the first registered document font.
pub const DEFAULT_FONT_ID: usize = 0;

/// Codepoint produced when a byte sequence cannot be decoded.
pub const INVALID_CODEPOINT: u32 = 0;

bitflags! {
    /// Per-character style bits.
    ///
    /// Bit positions are part of the persisted format.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StyleFlags: u8 {
        const BOLD = 1 << 0;
        const ITALIC = 1 << 1;
        const UNDERLINE = 1 << 2;
        const STRIKETHROUGH = 1 << 3;
        const SUBSCRIPT = 1 << 4;
        const SUPERSCRIPT = 1 << 5;
    }
}

/// A single toggleable style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Style {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Subscript,
    Superscript,
}

impl Style {
    pub const ALL: [Style; 6] = [
        Style::Bold,
        Style::Italic,
        Style::Underline,
        Style::Strikethrough,
        Style::Subscript,
        Style::Superscript,
    ];

    pub fn flag(self) -> StyleFlags {
        match self {
            Style::Bold => StyleFlags::BOLD,
            Style::Italic => StyleFlags::ITALIC,
            Style::Underline => StyleFlags::UNDERLINE,
            Style::Strikethrough => StyleFlags::STRIKETHROUGH,
            Style::Subscript => StyleFlags::SUBSCRIPT,
            Style::Superscript => StyleFlags::SUPERSCRIPT,
        }
    }

    /// The style that cannot be set at the same time as this one, if any.
    pub fn exclusive_with(self) -> Option<Style> {
        match self {
            Style::Subscript => Some(Style::Superscript),
            Style::Superscript => Some(Style::Subscript),
            _ => None,
        }
    }
}

/// RGBA colour, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Attributes stamped onto freshly created characters.
///
/// Documents hand these out so new text takes the configured defaults
/// rather than the crate constants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharAttributes {
    pub font_size: u32,
    pub font_id: usize,
    pub text_color: Color,
    pub background_color: Color,
}

impl Default for CharAttributes {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE,
            font_id: DEFAULT_FONT_ID,
            text_color: Color::BLACK,
            background_color: Color::WHITE,
        }
    }
}

/// A codepoint with formatting.
#[derive(Debug, Clone)]
pub struct RichChar {
    codepoint: u32,
    style: StyleFlags,
    font_size: u32,
    font_id: usize,
    text_color: Color,
    background_color: Color,
    link: Option<SmolStr>,
}

impl Default for RichChar {
    fn default() -> Self {
        Self::new(INVALID_CODEPOINT)
    }
}

impl RichChar {
    /// Create a character with default attributes.
    pub fn new(codepoint: u32) -> Self {
        Self::with_attributes(codepoint, &CharAttributes::default())
    }

    pub fn with_attributes(codepoint: u32, attrs: &CharAttributes) -> Self {
        Self {
            codepoint,
            style: StyleFlags::empty(),
            font_size: attrs.font_size,
            font_id: attrs.font_id,
            text_color: attrs.text_color,
            background_color: attrs.background_color,
            link: None,
        }
    }

    /// Copy every attribute of `self` onto a different codepoint.
    pub fn restyle(&self, codepoint: u32) -> Self {
        Self {
            codepoint,
            ..self.clone()
        }
    }

    pub fn codepoint(&self) -> u32 {
        self.codepoint
    }

    /// The codepoint as a `char`, or U+FFFD if it is not a scalar value.
    pub fn as_char(&self) -> char {
        char::from_u32(self.codepoint).unwrap_or(char::REPLACEMENT_CHARACTER)
    }

    pub fn is(&self, c: char) -> bool {
        self.codepoint == c as u32
    }

    /// Decode one codepoint from the front of `bytes`.
    ///
    /// Returns the character and how many bytes it consumed. A malformed
    /// leading byte or a truncated sequence decodes to codepoint 0 and
    /// consumes what it could, so callers always make progress.
    pub fn decode_utf8(bytes: &[u8]) -> (Self, usize) {
        let (codepoint, len) = decode_codepoint(bytes);
        (Self::new(codepoint), len)
    }

    /// Append the UTF-8 encoding of this character to `out`.
    pub fn encode_utf8(&self, out: &mut String) {
        out.push(self.as_char());
    }

    // === Style flags ===

    pub fn style(&self) -> StyleFlags {
        self.style
    }

    pub fn set_style(&mut self, style: StyleFlags) {
        self.style = style;
        if self.style.contains(StyleFlags::SUBSCRIPT | StyleFlags::SUPERSCRIPT) {
            self.style.remove(StyleFlags::SUBSCRIPT);
        }
    }

    pub fn has(&self, style: Style) -> bool {
        self.style.contains(style.flag())
    }

    /// Flip one style bit. Setting sub/superscript clears the other first.
    pub fn toggle(&mut self, style: Style) -> &mut Self {
        let on = !self.has(style);
        self.set(style, on)
    }

    pub fn set(&mut self, style: Style, on: bool) -> &mut Self {
        if on {
            if let Some(other) = style.exclusive_with() {
                self.style.remove(other.flag());
            }
            self.style.insert(style.flag());
        } else {
            self.style.remove(style.flag());
        }
        self
    }

    pub fn toggle_bold(&mut self) -> &mut Self {
        self.toggle(Style::Bold)
    }

    pub fn toggle_italic(&mut self) -> &mut Self {
        self.toggle(Style::Italic)
    }

    pub fn toggle_underline(&mut self) -> &mut Self {
        self.toggle(Style::Underline)
    }

    pub fn toggle_strikethrough(&mut self) -> &mut Self {
        self.toggle(Style::Strikethrough)
    }

    pub fn toggle_subscript(&mut self) -> &mut Self {
        self.toggle(Style::Subscript)
    }

    pub fn toggle_superscript(&mut self) -> &mut Self {
        self.toggle(Style::Superscript)
    }

    // === Scalar attributes ===

    pub fn font_size(&self) -> u32 {
        self.font_size
    }

    pub fn set_font_size(&mut self, size: u32) {
        self.font_size = size;
    }

    pub fn font_id(&self) -> usize {
        self.font_id
    }

    pub fn set_font_id(&mut self, id: usize) {
        self.font_id = id;
    }

    pub fn text_color(&self) -> Color {
        self.text_color
    }

    pub fn set_text_color(&mut self, color: Color) {
        self.text_color = color;
    }

    pub fn background_color(&self) -> Color {
        self.background_color
    }

    pub fn set_background_color(&mut self, color: Color) {
        self.background_color = color;
    }

    pub fn link(&self) -> Option<&SmolStr> {
        self.link.as_ref()
    }

    pub fn set_link(&mut self, link: Option<SmolStr>) {
        self.link = link.filter(|l| !l.is_empty());
    }

    pub fn has_link(&self) -> bool {
        self.link.is_some()
    }
}

impl PartialEq for RichChar {
    fn eq(&self, other: &Self) -> bool {
        self.codepoint == other.codepoint && self.style == other.style
    }
}

impl Eq for RichChar {}

impl From<char> for RichChar {
    fn from(c: char) -> Self {
        Self::new(c as u32)
    }
}

impl fmt::Display for RichChar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Decode a single codepoint, never failing.
fn decode_codepoint(bytes: &[u8]) -> (u32, usize) {
    let Some(&lead) = bytes.first() else {
        return (INVALID_CODEPOINT, 0);
    };

    let (initial, len, min) = match lead {
        b if b & 0x80 == 0x00 => return (b as u32, 1),
        b if b & 0xE0 == 0xC0 => ((b & 0x1F) as u32, 2, 0x80),
        b if b & 0xF0 == 0xE0 => ((b & 0x0F) as u32, 3, 0x800),
        b if b & 0xF8 == 0xF0 => ((b & 0x07) as u32, 4, 0x1_0000),
        _ => return (INVALID_CODEPOINT, 1),
    };

    if bytes.len() < len {
        return (INVALID_CODEPOINT, bytes.len());
    }

    let mut codepoint = initial;
    for &cont in &bytes[1..len] {
        if cont & 0xC0 != 0x80 {
            return (INVALID_CODEPOINT, 1);
        }
        codepoint = (codepoint << 6) | (cont & 0x3F) as u32;
    }
    // Overlong forms, surrogates and values past U+10FFFF.
    if codepoint < min || char::from_u32(codepoint).is_none() {
        return (INVALID_CODEPOINT, len);
    }
    (codepoint, len)
}
