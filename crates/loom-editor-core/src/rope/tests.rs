use proptest::prelude::*;

use super::{LEAF_CHUNK, MAX_DEPTH, Rope, fib};
use crate::error::EditorError;
use crate::rich::Style;
use crate::rich_string::RichString;

/// Build a rope by inserting each chunk at a position chosen by `picks`,
/// producing a deep, unbalanced tree.
fn rope_by_inserts(chunks: &[(usize, String)]) -> (Rope, String) {
    let mut rope = Rope::new();
    let mut expected: Vec<char> = Vec::new();
    for (pick, chunk) in chunks {
        let at = if expected.is_empty() { 0 } else { pick % (expected.len() + 1) };
        rope = rope.insert(at, chunk.as_str());
        expected.splice(at..at, chunk.chars());
    }
    (rope, expected.into_iter().collect())
}

fn arb_text() -> impl Strategy<Value = String> {
    "[a-d \\n.é]{0,80}"
}

fn arb_inserts() -> impl Strategy<Value = Vec<(usize, String)>> {
    prop::collection::vec((any::<usize>(), "[a-c \\n]{1,6}"), 1..60)
}

#[test]
fn test_fib() {
    assert_eq!(fib(0), 0);
    assert_eq!(fib(1), 1);
    assert_eq!(fib(2), 1);
    assert_eq!(fib(10), 55);
}

#[test]
fn test_get_out_of_range() {
    let rope = Rope::from("abc");
    assert_eq!(rope.get(2).map(|c| c.as_char()).ok(), Some('c'));
    assert!(matches!(
        rope.get(3),
        Err(EditorError::OutOfRange { index: 3, len: 3, .. })
    ));
}

#[test]
fn test_split_and_append() {
    let rope = Rope::from("hello world");
    let (left, right) = rope.split(5);
    assert_eq!(left.to_string(), "hello");
    assert_eq!(right.to_string(), " world");
    assert_eq!(left.append(&right), rope);

    let (left, right) = rope.split(100);
    assert_eq!(left.len(), 11);
    assert!(right.is_empty());
}

#[test]
fn test_insert_clamps_index() {
    let rope = Rope::from("abc").insert(99, "d");
    assert_eq!(rope.to_string(), "abcd");
    let rope = rope.insert(0, "_");
    assert_eq!(rope.to_string(), "_abcd");
}

#[test]
fn test_erase_and_replace() {
    let rope = Rope::from("the quick fox");
    assert_eq!(rope.erase(3, 6).to_string(), "the fox");
    assert_eq!(rope.erase(10, 100).to_string(), "the quick ");
    assert_eq!(rope.replace(4, 5, "slow").to_string(), "the slow fox");
}

#[test]
fn test_edits_leave_original_untouched() {
    let original = Rope::from("persistent");
    let edited = original.insert(3, "!!!").erase(0, 2);
    assert_eq!(original.to_string(), "persistent");
    assert_eq!(edited.to_string(), "rs!!!istent");
    assert!(!original.same_root(&edited));
    assert!(original.same_root(&original.clone()));
}

#[test]
fn test_substring_is_clipped() {
    let rope = Rope::from("abc").append("def");
    assert_eq!(rope.substring(2, 2), "cd");
    assert_eq!(rope.substring(4, 50), "ef");
    assert_eq!(rope.substring(10, 1), "");
}

#[test]
fn test_sub_rich_string_keeps_attributes() {
    let mut bold = RichString::from("bold");
    bold.toggle_style(0..4, Style::Bold);
    let rope = Rope::from("plain ").append(bold);
    let sub = rope.sub_rich_string(5, 3);
    assert_eq!(sub.to_string(), " bo");
    assert!(!sub[0].has(Style::Bold));
    assert!(sub[1].has(Style::Bold));
}

#[test]
fn test_line_count() {
    assert_eq!(Rope::new().line_count(), 1);
    assert_eq!(Rope::from("\n").line_count(), 1);
    assert_eq!(Rope::from("a\nb").line_count(), 2);
    assert_eq!(Rope::from("a\nb\n").line_count(), 2);
    assert_eq!(Rope::from("a\n\n").line_count(), 2);
}

#[test]
fn test_line_starts_and_lengths_across_leaves() {
    let rope = Rope::from("ab")
        .append("c\nde")
        .append("\n")
        .append("fgh");
    assert_eq!(rope.to_string(), "abc\nde\nfgh");
    assert_eq!(rope.find_line_start(0), 0);
    assert_eq!(rope.find_line_start(1), 4);
    assert_eq!(rope.find_line_start(2), 7);
    assert_eq!(rope.find_line_start(3), rope.len());

    assert_eq!(rope.line_length(0), 3);
    assert_eq!(rope.line_length(1), 2);
    assert_eq!(rope.line_length(2), 3);
    assert_eq!(rope.line_length(3), 0);
}

#[test]
fn test_pos_and_index_mapping() {
    let rope = Rope::from("one\ntwo\nthree\n");
    let pos = rope.pos_from_index(6);
    assert_eq!((pos.line, pos.column, pos.index), (1, 2, 6));

    assert_eq!(rope.index_from_pos(2, 3), 11);
    // Column clamps to the line.
    assert_eq!(rope.index_from_pos(0, 40), 3);
    // Line clamps to the last line.
    assert_eq!(rope.index_from_pos(9, 0), 8);
}

#[test]
fn test_word_starts_across_joins() {
    let rope = Rope::from("he").append("llo  wo").append("rld\tx");
    assert_eq!(rope.word_count(), 3);
    assert_eq!(rope.find_word_start(0), 0);
    assert_eq!(rope.find_word_start(1), 7);
    assert_eq!(rope.find_word_start(2), 13);
    assert_eq!(rope.find_word_start(3), rope.len());

    let leading = Rope::from("  ").append("a b");
    assert_eq!(leading.word_count(), 2);
    assert_eq!(leading.find_word_start(0), 2);
}

#[test]
fn test_rebalance_coalesces_small_leaves() {
    let mut rope = Rope::new();
    for c in "abcdefghijklmnopqrstuvwxyz".chars() {
        rope = rope.append(c.to_string().as_str());
    }
    assert_eq!(rope.depth(), 25);
    assert!(!rope.is_balanced());

    let balanced = rope.rebalance();
    assert_eq!(balanced, rope);
    assert_eq!(balanced.leaf_count(), 1);
    assert!(balanced.is_balanced());
}

#[test]
fn test_balanced_rope_is_returned_as_is() {
    let rope = Rope::from("steady");
    assert!(rope.is_balanced());
    assert!(rope.rebalance().same_root(&rope));
}

#[test]
fn test_long_text_is_chunked() {
    let text = "x".repeat(LEAF_CHUNK * 3 + 7);
    let rope = Rope::from(text.as_str());
    assert_eq!(rope.leaf_count(), 4);
    assert_eq!(rope.depth(), 2);
    assert!(rope.is_balanced());
    assert_eq!(rope.to_string(), text);
}

#[test]
fn test_chars_iterates_in_order() {
    let rope = Rope::from("ab").append("").append("cd").prepend("_");
    let collected: String = rope.chars().map(|c| c.as_char()).collect();
    assert_eq!(collected, "_abcd");
}

proptest! {
    #[test]
    fn prop_split_append_roundtrip(
        (text, at) in arb_text().prop_flat_map(|s| {
            let n = s.chars().count();
            (Just(s), 0..=n)
        })
    ) {
        let rope = Rope::from(text.as_str());
        let (left, right) = rope.split(at);
        prop_assert_eq!(left.len(), at);
        prop_assert_eq!(left.append(right).to_string(), text);
    }

    #[test]
    fn prop_insert_then_erase_is_identity(
        inserts in arb_inserts(),
        pick in any::<usize>(),
        extra in "[x-z\\n]{0,10}",
    ) {
        let (rope, expected) = rope_by_inserts(&inserts);
        prop_assert_eq!(rope.to_string(), expected.clone());

        let at = pick % (rope.len() + 1);
        let inserted = extra.chars().count();
        let restored = rope.insert(at, extra.as_str()).erase(at, inserted);
        prop_assert_eq!(restored.to_string(), expected);
    }

    #[test]
    fn prop_line_index_mapping(inserts in arb_inserts()) {
        let (rope, _) = rope_by_inserts(&inserts);
        for line in 0..rope.line_count() {
            let start = rope.find_line_start(line);
            prop_assert_eq!(rope.index_from_pos(line, 0), start);
            let pos = rope.pos_from_index(start);
            prop_assert_eq!((pos.line, pos.column), (line, 0));
        }
    }

    #[test]
    fn prop_line_metrics_match_plain_text(inserts in arb_inserts()) {
        let (rope, expected) = rope_by_inserts(&inserts);
        let lines: Vec<&str> = expected.split('\n').collect();
        let line_count = if expected.ends_with('\n') { lines.len() - 1 } else { lines.len() };
        prop_assert_eq!(rope.line_count(), line_count);
        for (i, line) in lines.iter().take(line_count).enumerate() {
            prop_assert_eq!(rope.line_length(i), line.chars().count());
        }
        prop_assert_eq!(rope.word_count(), expected.split([' ', '\t', '\n']).filter(|w| !w.is_empty()).count());
    }

    #[test]
    fn prop_rebalance_bounds_depth(inserts in arb_inserts()) {
        let (rope, expected) = rope_by_inserts(&inserts);
        let balanced = rope.rebalance();
        prop_assert_eq!(balanced.to_string(), expected);
        prop_assert!(balanced.depth() < MAX_DEPTH - 2);
        prop_assert!(balanced.len() as u64 >= fib(balanced.depth() + 2));
        prop_assert!(balanced.is_balanced());
    }
}
