//! Action execution for documents.
//!
//! `execute_action` is the central dispatch point mapping `EditorAction`s onto
//! `Document` operations. Clipboard access goes through the `Clipboard` trait.

use crate::actions::{EditorAction, Motion};
use crate::document::Document;
use crate::platform::Clipboard;
use crate::rich::RichChar;
use crate::rich_string::RichString;
use crate::text_helpers::{find_word_boundary_backward, find_word_boundary_forward};
use crate::undo::UndoManager;

/// Execute an editor action on a document.
///
/// Returns true if the action was handled and had an effect.
pub fn execute_action<C: Clipboard>(
    doc: &mut Document,
    clipboard: &mut C,
    action: &EditorAction,
) -> bool {
    match action {
        EditorAction::Insert { text } => execute_insert(doc, text),
        EditorAction::InsertParagraph => execute_insert(doc, "\n"),
        EditorAction::ReplaceWord { text } => {
            let word = RichString::from_str_like(text, &template_for(doc));
            doc.replace_word_at_cursor(&word);
            true
        }
        EditorAction::DeleteBackward => execute_delete_backward(doc),
        EditorAction::DeleteForward => execute_delete_forward(doc),
        EditorAction::DeleteWordBackward => {
            let cursor = doc.cursor().index;
            let start = find_word_boundary_backward(doc.content(), cursor);
            delete_or_selection(doc, start, cursor)
        }
        EditorAction::DeleteWordForward => {
            let cursor = doc.cursor().index;
            let end = find_word_boundary_forward(doc.content(), cursor);
            delete_or_selection(doc, cursor, end)
        }
        EditorAction::DeleteToLineStart => {
            let cursor = doc.cursor();
            delete_or_selection(doc, cursor.index - cursor.column, cursor.index)
        }
        EditorAction::DeleteToLineEnd => {
            let cursor = doc.cursor();
            let end = cursor.index - cursor.column + doc.content().line_length(cursor.line);
            delete_or_selection(doc, cursor.index, end)
        }
        EditorAction::Move { motion, extend } => execute_move(doc, *motion, *extend),
        EditorAction::SelectAll => {
            doc.select_all();
            true
        }
        EditorAction::ClearSelection => {
            let was = doc.is_selecting();
            doc.clear_selection();
            was
        }
        EditorAction::Undo => doc.undo(),
        EditorAction::Redo => doc.redo(),
        EditorAction::ToggleStyle(style) => {
            doc.toggle_style(*style);
            true
        }
        EditorAction::SetTextColor(color) => {
            doc.set_text_color(*color);
            true
        }
        EditorAction::SetBackgroundColor(color) => {
            doc.set_background_color(*color);
            true
        }
        EditorAction::SetFontSize(size) => {
            doc.set_font_size(*size);
            true
        }
        EditorAction::SetFontId(id) => {
            doc.set_font_id(*id);
            true
        }
        EditorAction::SetLink(link) => {
            doc.set_link(link.clone());
            true
        }
        EditorAction::SetHeading(level) => {
            doc.set_heading(*level);
            true
        }
        EditorAction::SetAlignment(alignment) => {
            doc.set_alignment(*alignment);
            true
        }
        EditorAction::SetList(list) => {
            doc.set_list(*list);
            true
        }
        EditorAction::Cut => execute_cut(doc, clipboard),
        EditorAction::Copy => execute_copy(doc, clipboard),
        EditorAction::Paste => execute_paste(doc, clipboard),
        EditorAction::FindNext => doc.goto_next_match(),
        EditorAction::FindPrev => doc.goto_prev_match(),
    }
}

/// Replacement words take the formatting of the character under the cursor.
fn template_for(doc: &Document) -> RichChar {
    doc.content()
        .get(doc.cursor().index)
        .cloned()
        .unwrap_or_else(|_| RichChar::with_attributes(0, &doc.config().char_attributes()))
}

fn execute_insert(doc: &mut Document, text: &str) -> bool {
    if text.is_empty() {
        return false;
    }
    doc.erase_selection();
    doc.clear_selection();
    doc.insert_text(text);
    true
}

fn execute_delete_backward(doc: &mut Document) -> bool {
    if doc.erase_selection().is_some() {
        return true;
    }
    doc.clear_selection();
    doc.erase_at_cursor().is_some()
}

fn execute_delete_forward(doc: &mut Document) -> bool {
    if doc.erase_selection().is_some() {
        return true;
    }
    doc.clear_selection();
    if doc.cursor().index >= doc.max_cursor_index() {
        return false;
    }
    doc.move_next_char();
    doc.erase_at_cursor().is_some()
}

/// Delete the selection if there is one, else `[start, end)`.
fn delete_or_selection(doc: &mut Document, start: usize, end: usize) -> bool {
    if doc.erase_selection().is_some() {
        return true;
    }
    doc.clear_selection();
    doc.erase_range(start, end).is_some()
}

fn execute_move(doc: &mut Document, motion: Motion, extend: bool) -> bool {
    if extend {
        doc.start_selection();
    } else {
        doc.clear_selection();
    }

    let before = doc.cursor();
    match motion {
        Motion::Left => doc.move_prev_char(),
        Motion::Right => doc.move_next_char(),
        Motion::Up => doc.move_line(-1),
        Motion::Down => doc.move_line(1),
        Motion::WordLeft => doc.move_prev_word(),
        Motion::WordRight => doc.move_next_word(),
        Motion::LineStart => doc.move_line_start(),
        Motion::LineEnd => doc.move_line_end(),
        Motion::To { line, column } => doc.set_cursor(line, column),
    }
    doc.cursor().index != before.index
}

fn execute_cut<C: Clipboard>(doc: &mut Document, clipboard: &mut C) -> bool {
    let Some(text) = doc.copy_selection() else {
        return false;
    };
    if let Err(err) = clipboard.write(text.as_bytes()) {
        tracing::warn!(%err, "clipboard write failed, keeping selection");
        return false;
    }
    doc.cut_selection().is_some()
}

fn execute_copy<C: Clipboard>(doc: &Document, clipboard: &mut C) -> bool {
    let Some(text) = doc.copy_selection() else {
        return false;
    };
    match clipboard.write(text.as_bytes()) {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(%err, "clipboard write failed");
            false
        }
    }
}

fn execute_paste<C: Clipboard>(doc: &mut Document, clipboard: &mut C) -> bool {
    let bytes = match clipboard.read() {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(%err, "clipboard read failed");
            return false;
        }
    };
    if bytes.is_empty() {
        return false;
    }
    doc.erase_selection();
    doc.clear_selection();
    doc.paste(&bytes);
    true
}
