//! Text navigation and analysis helpers.
//!
//! Two different notions of "word" live here and are kept apart on purpose:
//! cursor motion classifies characters as alphanumeric, punctuation or
//! space and treats every punctuation character as a word of its own, while
//! dictionary lookup only ever grows a word over letters and digits.

use std::ops::Range;

use crate::rich::RichChar;
use crate::rope::Rope;

/// Character classes used by word-wise cursor motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionClass {
    Alnum,
    Punct,
    Space,
}

impl MotionClass {
    pub fn of(c: &RichChar) -> Self {
        let ch = c.as_char();
        if ch.is_alphanumeric() {
            MotionClass::Alnum
        } else if ch.is_whitespace() {
            MotionClass::Space
        } else {
            MotionClass::Punct
        }
    }
}

/// Whether `c` can be part of a word for dictionary lookup.
pub fn is_lookup_word_char(c: &RichChar) -> bool {
    c.as_char().is_alphanumeric()
}

fn class_at(rope: &Rope, index: usize) -> Option<MotionClass> {
    rope.get(index).ok().map(MotionClass::of)
}

/// Offset reached by one word-forward motion from `index`.
///
/// A run of letters/digits or a run of whitespace is skipped as a whole; a
/// punctuation character is skipped on its own.
pub fn find_word_boundary_forward(rope: &Rope, index: usize) -> usize {
    let len = rope.len();
    let Some(class) = class_at(rope, index) else {
        return index.min(len);
    };

    let mut pos = index + 1;
    if class != MotionClass::Punct {
        while pos < len && class_at(rope, pos) == Some(class) {
            pos += 1;
        }
    }
    pos
}

/// Offset reached by one word-backward motion from `index`.
///
/// Whitespace before the cursor is skipped first. Then a punctuation
/// character stops the motion on itself, otherwise the run of letters and
/// digits is skipped back to its first character.
pub fn find_word_boundary_backward(rope: &Rope, index: usize) -> usize {
    let index = index.min(rope.len());
    if index == 0 {
        return 0;
    }

    let mut pos = index - 1;
    while pos > 0 && class_at(rope, pos) == Some(MotionClass::Space) {
        pos -= 1;
    }

    match class_at(rope, pos) {
        Some(MotionClass::Alnum) => {
            while pos > 0 && class_at(rope, pos - 1) == Some(MotionClass::Alnum) {
                pos -= 1;
            }
            pos
        }
        _ => pos,
    }
}

/// Range of the lookup word touching `index`: letters and digits on both sides.
///
/// Empty when neither neighbour is a word character.
pub fn lookup_word_range(rope: &Rope, index: usize) -> Range<usize> {
    let len = rope.len();
    let index = index.min(len);
    let is_word = |i: usize| rope.get(i).is_ok_and(is_lookup_word_char);

    let mut start = index;
    while start > 0 && is_word(start - 1) {
        start -= 1;
    }
    let mut end = index;
    while end < len && is_word(end) {
        end += 1;
    }
    start..end
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_motion_classes() {
        assert_eq!(MotionClass::of(&RichChar::from('a')), MotionClass::Alnum);
        assert_eq!(MotionClass::of(&RichChar::from('9')), MotionClass::Alnum);
        assert_eq!(MotionClass::of(&RichChar::from('đ')), MotionClass::Alnum);
        assert_eq!(MotionClass::of(&RichChar::from(',')), MotionClass::Punct);
        assert_eq!(MotionClass::of(&RichChar::from('\n')), MotionClass::Space);
        assert_eq!(MotionClass::of(&RichChar::from('\t')), MotionClass::Space);
    }

    #[test]
    fn test_find_word_boundary_forward() {
        let rope = Rope::from("hello, world  test");

        assert_eq!(find_word_boundary_forward(&rope, 0), 5); // over "hello"
        assert_eq!(find_word_boundary_forward(&rope, 5), 6); // over ","
        assert_eq!(find_word_boundary_forward(&rope, 6), 7); // over " "
        assert_eq!(find_word_boundary_forward(&rope, 12), 14); // over two spaces
        assert_eq!(find_word_boundary_forward(&rope, 18), 18); // at end
    }

    #[test]
    fn test_find_word_boundary_backward() {
        let rope = Rope::from("hello, world  test");

        assert_eq!(find_word_boundary_backward(&rope, 18), 14); // from end
        assert_eq!(find_word_boundary_backward(&rope, 14), 7); // over spaces then "world"
        assert_eq!(find_word_boundary_backward(&rope, 7), 5); // stops on ","
        assert_eq!(find_word_boundary_backward(&rope, 5), 0);
        assert_eq!(find_word_boundary_backward(&rope, 0), 0);
    }

    #[test]
    fn test_punctuation_runs_move_one_at_a_time() {
        let rope = Rope::from("a...b");
        assert_eq!(find_word_boundary_forward(&rope, 1), 2);
        assert_eq!(find_word_boundary_forward(&rope, 2), 3);
        assert_eq!(find_word_boundary_backward(&rope, 4), 3);
    }

    #[test]
    fn test_lookup_word_range() {
        let rope = Rope::from("don't stop-me now");
        assert_eq!(lookup_word_range(&rope, 1), 0..3);
        assert_eq!(lookup_word_range(&rope, 3), 0..3);
        assert_eq!(lookup_word_range(&rope, 4), 4..5);
        assert_eq!(lookup_word_range(&rope, 8), 6..10);
        assert_eq!(lookup_word_range(&rope, 17), 14..17);

        let rope = Rope::from(" - ");
        assert_eq!(lookup_word_range(&rope, 1), 1..1);
    }
}
