//! Owned sequences of rich characters.
//!
//! `RichString` is the leaf payload of the rope and the unit handed across
//! the document API for inserted/copied text. It caches whether the font
//! size and font id are uniform across the whole string.

use std::fmt;
use std::ops::{Index, Range};

use smol_str::SmolStr;

use crate::rich::{CharAttributes, Color, RichChar, Style};

/// An ordered, index-addressable run of `RichChar`.
#[derive(Debug, Clone, Default)]
pub struct RichString {
    chars: Vec<RichChar>,
    /// `Some(size)` when every character shares one size, `None` when mixed or empty.
    font_size: Option<u32>,
    font_id: Option<usize>,
}

impl RichString {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            chars: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Build from plain text, stamping every character with `attrs`.
    pub fn from_str_with(text: &str, attrs: &CharAttributes) -> Self {
        text.chars()
            .map(|c| RichChar::with_attributes(c as u32, attrs))
            .collect()
    }

    /// Build from text where every character copies the formatting of `template`.
    pub fn from_str_like(text: &str, template: &RichChar) -> Self {
        text.chars().map(|c| template.restyle(c as u32)).collect()
    }

    /// Decode raw UTF-8 bytes. Malformed sequences become codepoint 0.
    pub fn decode(bytes: &[u8]) -> Self {
        let mut out = Self::with_capacity(bytes.len());
        let mut rest = bytes;
        while !rest.is_empty() {
            let (c, used) = RichChar::decode_utf8(rest);
            out.chars.push(c);
            rest = &rest[used.max(1)..];
        }
        out.refresh_aggregates();
        out
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&RichChar> {
        self.chars.get(index)
    }

    pub fn first(&self) -> Option<&RichChar> {
        self.chars.first()
    }

    pub fn last(&self) -> Option<&RichChar> {
        self.chars.last()
    }

    pub fn as_slice(&self) -> &[RichChar] {
        &self.chars
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RichChar> {
        self.chars.iter()
    }

    pub fn into_vec(self) -> Vec<RichChar> {
        self.chars
    }

    /// Codepoints only, for style-agnostic comparisons.
    pub fn codepoints(&self) -> impl Iterator<Item = u32> + '_ {
        self.chars.iter().map(RichChar::codepoint)
    }

    // === Building ===

    pub fn push(&mut self, c: RichChar) {
        self.font_size = merge_uniform(self.font_size, self.chars.is_empty(), c.font_size());
        self.font_id = merge_uniform(self.font_id, self.chars.is_empty(), c.font_id());
        self.chars.push(c);
    }

    pub fn append(&mut self, other: &RichString) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            *self = other.clone();
            return;
        }
        self.font_size = self.font_size.filter(|s| other.font_size == Some(*s));
        self.font_id = self.font_id.filter(|s| other.font_id == Some(*s));
        self.chars.extend_from_slice(&other.chars);
    }

    /// Concatenate into a new string.
    pub fn concat(&self, other: &RichString) -> RichString {
        let mut out = RichString::with_capacity(self.len() + other.len());
        out.append(self);
        out.append(other);
        out
    }

    /// Copy of `[start, start + len)`, clipped to the string bounds.
    pub fn substring(&self, start: usize, len: usize) -> RichString {
        let range = self.clip(start..start.saturating_add(len));
        self.chars[range].iter().cloned().collect()
    }

    // === Aggregates ===

    /// The shared font size, or `None` when sizes are mixed.
    pub fn font_size(&self) -> Option<u32> {
        self.font_size
    }

    /// The shared font id, or `None` when ids are mixed.
    pub fn font_id(&self) -> Option<usize> {
        self.font_id
    }

    pub fn text_color(&self) -> Option<Color> {
        uniform(self.chars.iter().map(RichChar::text_color))
    }

    pub fn background_color(&self) -> Option<Color> {
        uniform(self.chars.iter().map(RichChar::background_color))
    }

    /// The link shared by every character, if there is exactly one.
    pub fn link(&self) -> Option<SmolStr> {
        uniform(self.chars.iter().map(|c| c.link().cloned())).flatten()
    }

    /// Whether every character in `range` already carries `style`.
    ///
    /// An empty range counts as not set, so toggling it is a no-op either way.
    pub fn is_same_style(&self, range: Range<usize>, style: Style) -> bool {
        let range = self.clip(range);
        !range.is_empty() && self.chars[range].iter().all(|c| c.has(style))
    }

    // === Range formatting ===

    /// Turn `style` on across the range unless it is already on everywhere,
    /// in which case turn it off everywhere.
    pub fn toggle_style(&mut self, range: Range<usize>, style: Style) {
        let on = !self.is_same_style(range.clone(), style);
        let range = self.clip(range);
        for c in &mut self.chars[range] {
            c.set(style, on);
        }
    }

    pub fn set_text_color(&mut self, range: Range<usize>, color: Color) {
        let range = self.clip(range);
        for c in &mut self.chars[range] {
            c.set_text_color(color);
        }
    }

    pub fn set_background_color(&mut self, range: Range<usize>, color: Color) {
        let range = self.clip(range);
        for c in &mut self.chars[range] {
            c.set_background_color(color);
        }
    }

    pub fn set_font_size(&mut self, range: Range<usize>, size: u32) {
        let range = self.clip(range);
        for c in &mut self.chars[range] {
            c.set_font_size(size);
        }
        self.refresh_aggregates();
    }

    pub fn set_font_id(&mut self, range: Range<usize>, id: usize) {
        let range = self.clip(range);
        for c in &mut self.chars[range] {
            c.set_font_id(id);
        }
        self.refresh_aggregates();
    }

    pub fn set_link(&mut self, range: Range<usize>, link: Option<SmolStr>) {
        let range = self.clip(range);
        for c in &mut self.chars[range] {
            c.set_link(link.clone());
        }
    }

    fn clip(&self, range: Range<usize>) -> Range<usize> {
        let end = range.end.min(self.chars.len());
        range.start.min(end)..end
    }

    fn refresh_aggregates(&mut self) {
        self.font_size = uniform(self.chars.iter().map(RichChar::font_size));
        self.font_id = uniform(self.chars.iter().map(RichChar::font_id));
    }
}

/// `Some(v)` if every item equals `v`, `None` if mixed or empty.
fn uniform<T: PartialEq>(mut items: impl Iterator<Item = T>) -> Option<T> {
    let first = items.next()?;
    items.all(|item| item == first).then_some(first)
}

fn merge_uniform<T: PartialEq + Copy>(current: Option<T>, was_empty: bool, next: T) -> Option<T> {
    if was_empty {
        Some(next)
    } else {
        current.filter(|v| *v == next)
    }
}

impl PartialEq for RichString {
    fn eq(&self, other: &Self) -> bool {
        self.chars == other.chars
    }
}

impl Eq for RichString {}

impl Index<usize> for RichString {
    type Output = RichChar;

    fn index(&self, index: usize) -> &RichChar {
        &self.chars[index]
    }
}

impl FromIterator<RichChar> for RichString {
    fn from_iter<I: IntoIterator<Item = RichChar>>(iter: I) -> Self {
        let mut out = RichString::new();
        for c in iter {
            out.push(c);
        }
        out
    }
}

impl From<Vec<RichChar>> for RichString {
    fn from(chars: Vec<RichChar>) -> Self {
        let mut out = Self {
            chars,
            ..Self::default()
        };
        out.refresh_aggregates();
        out
    }
}

impl From<&str> for RichString {
    fn from(text: &str) -> Self {
        Self::from_str_with(text, &CharAttributes::default())
    }
}

impl From<String> for RichString {
    fn from(text: String) -> Self {
        Self::from(text.as_str())
    }
}

impl<'a> IntoIterator for &'a RichString {
    type Item = &'a RichChar;
    type IntoIter = std::slice::Iter<'a, RichChar>;

    fn into_iter(self) -> Self::IntoIter {
        self.chars.iter()
    }
}

impl fmt::Display for RichString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::with_capacity(self.chars.len());
        for c in &self.chars {
            c.encode_utf8(&mut out);
        }
        f.write_str(&out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_and_display() {
        let s = RichString::from("xin chào");
        assert_eq!(s.len(), 8);
        assert_eq!(s.to_string(), "xin chào");
    }

    #[test]
    fn test_decode_bad_bytes_become_zero() {
        let s = RichString::decode(&[b'a', 0xFF, b'b']);
        assert_eq!(s.codepoints().collect::<Vec<_>>(), vec!['a' as u32, 0, 'b' as u32]);
    }

    #[test]
    fn test_substring_is_clipped() {
        let s = RichString::from("hello");
        assert_eq!(s.substring(3, 100).to_string(), "lo");
        assert_eq!(s.substring(9, 2).to_string(), "");
        assert_eq!(s.substring(1, 3).to_string(), "ell");
    }

    #[test]
    fn test_uniform_font_aggregates() {
        let mut s = RichString::from("abc");
        assert_eq!(s.font_size(), Some(36));
        assert_eq!(s.font_id(), Some(0));

        s.set_font_size(1..2, 12);
        assert_eq!(s.font_size(), None);

        s.set_font_size(0..3, 12);
        assert_eq!(s.font_size(), Some(12));

        let mut t = RichString::from("de");
        t.set_font_id(0..2, 3);
        let joined = s.concat(&t);
        assert_eq!(joined.font_id(), None);
        assert_eq!(RichString::new().font_size(), None);
    }

    #[test]
    fn test_toggle_twice_restores_bits() {
        let mut s = RichString::from("abcd");
        s.toggle_style(1..2, Style::Bold);
        let before: Vec<bool> = s.iter().map(|c| c.has(Style::Bold)).collect();

        s.toggle_style(0..3, Style::Italic);
        s.toggle_style(0..3, Style::Italic);
        let after: Vec<bool> = s.iter().map(|c| c.has(Style::Bold)).collect();
        assert_eq!(before, after);
        assert!(s.iter().all(|c| !c.has(Style::Italic)));
    }

    #[test]
    fn test_toggle_mixed_range_sets_everything() {
        let mut s = RichString::from("abcd");
        s.toggle_style(0..1, Style::Bold);
        s.toggle_style(0..4, Style::Bold);
        assert!(s.is_same_style(0..4, Style::Bold));

        s.toggle_style(0..4, Style::Bold);
        assert!(s.iter().all(|c| !c.has(Style::Bold)));
    }

    #[test]
    fn test_subscript_toggle_clears_superscript() {
        let mut s = RichString::from("x2");
        s.toggle_style(1..2, Style::Superscript);
        s.toggle_style(1..2, Style::Subscript);
        assert!(s[1].has(Style::Subscript));
        assert!(!s[1].has(Style::Superscript));
    }

    #[test]
    fn test_uniform_link() {
        let mut s = RichString::from("link");
        assert_eq!(s.link(), None);
        s.set_link(0..4, Some("https://loom.dev".into()));
        assert_eq!(s.link().as_deref(), Some("https://loom.dev"));
        s.set_link(0..1, None);
        assert_eq!(s.link(), None);
    }
}
