//! The document engine.
//!
//! A `Document` owns the live `(content, structure, cursor)` triple plus the
//! selection anchor and undo history. Every operation clamps cursor and
//! selection positions before they reach the rope, so the rope's
//! `OutOfRange` errors never surface from here; if one does, it is a bug in
//! this module and we panic instead of guessing.
//!
//! Content always ends in a line feed and is never empty, so the structure
//! ledger holds exactly one record per content line.

use std::ops::{Range, RangeInclusive};
use std::path::PathBuf;

use smol_str::SmolStr;

use crate::config::DocumentConfig;
use crate::dictionary::Dictionary;
use crate::error::Result;
use crate::fonts::FontRegistry;
use crate::ledger::{Alignment, HeadingLevel, LineLedger, LineRecord, ListKind};
use crate::platform::GlyphMetrics;
use crate::rich::{CharAttributes, Color, RichChar, Style};
use crate::rich_string::RichString;
use crate::rope::Rope;
use crate::search::Search;
use crate::text_helpers::{
    find_word_boundary_backward, find_word_boundary_forward, is_lookup_word_char,
    lookup_word_range,
};
use crate::types::{Cursor, EditInfo, Selection};
use crate::undo::{History, Snapshot, UndoManager};

/// Unwrap an index-addressed result the caller has already clamped.
fn clamped<T>(result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("document index escaped clamping: {err}"),
    }
}

/// A rich-text document with cursor, selection and undo history.
#[derive(Debug, Clone)]
pub struct Document {
    content: Rope,
    structure: LineLedger,
    cursor: Cursor,
    /// Selection anchor, present while selecting.
    anchor: Option<Cursor>,
    history: History,
    config: DocumentConfig,
    fonts: FontRegistry,
    search: Search,
    last_edit: Option<EditInfo>,
    revision: u64,
    path: Option<PathBuf>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document: a single line feed.
    pub fn new() -> Self {
        Self::with_config(DocumentConfig::default())
    }

    pub fn with_config(config: DocumentConfig) -> Self {
        let content = Rope::from(RichString::from_str_with("\n", &config.char_attributes()));
        Self {
            content,
            structure: LineLedger::new(),
            cursor: Cursor::default(),
            anchor: None,
            history: History::new(config.history_limit),
            config,
            fonts: FontRegistry::new(),
            search: Search::default(),
            last_edit: None,
            revision: 0,
            path: None,
        }
    }

    /// A document holding plain `text` in the default attributes.
    pub fn from_text(text: &str, config: DocumentConfig) -> Self {
        let attrs = config.char_attributes();
        let text = text.replace("\r\n", "\n");
        let mut doc = Self::with_config(config);
        let body = RichString::from_str_with(&text, &attrs);
        let (content, structure) = Self::normalized(body, Vec::new(), &attrs);
        doc.content = content;
        doc.structure = structure;
        doc
    }

    /// Build content and ledger from parts, appending the trailing line feed
    /// if it is missing and padding or trimming records to the line count.
    pub(crate) fn normalized(
        mut body: RichString,
        mut records: Vec<LineRecord>,
        attrs: &CharAttributes,
    ) -> (Rope, LineLedger) {
        if !body.last().is_some_and(|c| c.is('\n')) {
            body.push(RichChar::with_attributes('\n' as u32, attrs));
        }
        let content = Rope::from(body);
        records.resize(content.line_count(), LineRecord::default());
        (content, LineLedger::from_records(records))
    }

    pub(crate) fn replace_state(&mut self, content: Rope, structure: LineLedger, fonts: FontRegistry) {
        self.content = content;
        self.structure = structure;
        self.fonts = fonts;
        self.cursor = Cursor::default();
        self.anchor = None;
        self.history.clear();
        self.search.reset();
        self.last_edit = None;
        self.revision += 1;
    }

    // === Accessors ===

    pub fn content(&self) -> &Rope {
        &self.content
    }

    pub fn structure(&self) -> &LineLedger {
        &self.structure
    }

    pub fn config(&self) -> &DocumentConfig {
        &self.config
    }

    pub fn fonts(&self) -> &FontRegistry {
        &self.fonts
    }

    pub fn fonts_mut(&mut self) -> &mut FontRegistry {
        &mut self.fonts
    }

    pub fn search(&self) -> &Search {
        &self.search
    }

    pub fn path(&self) -> Option<&std::path::Path> {
        self.path.as_deref()
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = Some(path.into());
    }

    /// Plain text of the whole document.
    pub fn text(&self) -> String {
        self.content.to_string()
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Never true: an empty document still holds its line feed.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.content.line_count()
    }

    /// Info about the most recent edit, for the layout pass.
    pub fn last_edit(&self) -> Option<&EditInfo> {
        self.last_edit.as_ref()
    }

    /// Bumped on every change to content or structure.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    // === Cursor ===

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Last valid cursor offset: the end of the last line, before its terminator.
    pub fn max_cursor_index(&self) -> usize {
        let last = self.line_count().saturating_sub(1);
        self.content.find_line_start(last) + self.content.line_length(last)
    }

    fn cursor_for(&self, index: usize) -> Cursor {
        self.content.pos_from_index(index.min(self.max_cursor_index()))
    }

    /// Move the cursor to a line and column, clamping both.
    pub fn set_cursor(&mut self, line: usize, column: usize) {
        let index = self.content.index_from_pos(line, column);
        self.cursor = self.cursor_for(index);
    }

    pub fn set_cursor_index(&mut self, index: usize) {
        self.cursor = self.cursor_for(index);
    }

    pub fn move_next_char(&mut self) {
        let Cursor { line, column, .. } = self.cursor;
        if column < self.content.line_length(line) {
            self.set_cursor(line, column + 1);
        } else if line + 1 < self.line_count() {
            self.set_cursor(line + 1, 0);
        }
    }

    pub fn move_prev_char(&mut self) {
        let Cursor { line, column, .. } = self.cursor;
        if column > 0 {
            self.set_cursor(line, column - 1);
        } else if line > 0 {
            self.set_cursor(line - 1, self.content.line_length(line - 1));
        }
    }

    /// Move by `delta` lines, clamping to the document and the new line's length.
    pub fn move_line(&mut self, delta: isize) {
        let last = self.line_count().saturating_sub(1) as isize;
        let line = (self.cursor.line as isize + delta).clamp(0, last) as usize;
        self.set_cursor(line, self.cursor.column);
    }

    /// Move by `delta` columns within the current line.
    pub fn cursor_move_column(&mut self, delta: isize) {
        let len = self.content.line_length(self.cursor.line) as isize;
        let column = (self.cursor.column as isize + delta).clamp(0, len) as usize;
        self.set_cursor(self.cursor.line, column);
    }

    pub fn move_next_word(&mut self) {
        let index = find_word_boundary_forward(&self.content, self.cursor.index);
        self.set_cursor_index(index);
    }

    pub fn move_prev_word(&mut self) {
        let index = find_word_boundary_backward(&self.content, self.cursor.index);
        self.set_cursor_index(index);
    }

    pub fn move_line_start(&mut self) {
        self.set_cursor(self.cursor.line, 0);
    }

    pub fn move_line_end(&mut self) {
        self.set_cursor(self.cursor.line, usize::MAX);
    }

    // === Selection ===

    /// Start selecting from the current cursor position.
    pub fn start_selection(&mut self) {
        if self.anchor.is_none() {
            self.anchor = Some(self.cursor);
        }
    }

    pub fn clear_selection(&mut self) {
        self.anchor = None;
    }

    pub fn is_selecting(&self) -> bool {
        self.anchor.is_some()
    }

    /// Select `[anchor, head)` by flat offset; the cursor ends at `head`.
    pub fn select(&mut self, anchor: usize, head: usize) {
        self.anchor = Some(self.cursor_for(anchor));
        self.cursor = self.cursor_for(head);
    }

    pub fn select_all(&mut self) {
        self.select(0, self.max_cursor_index());
    }

    pub fn selection(&self) -> Option<Selection> {
        self.anchor.map(|anchor| Selection::new(anchor, self.cursor))
    }

    /// The earlier of cursor and anchor; the cursor when not selecting.
    pub fn select_start(&self) -> Cursor {
        self.anchor.map_or(self.cursor, |a| a.min(self.cursor))
    }

    /// The later of cursor and anchor; the cursor when not selecting.
    pub fn select_end(&self) -> Cursor {
        self.anchor.map_or(self.cursor, |a| a.max(self.cursor))
    }

    fn selection_range(&self) -> Option<Range<usize>> {
        self.selection()
            .filter(|s| !s.is_collapsed())
            .map(|s| s.to_range())
    }

    pub fn get_selected_text(&self) -> RichString {
        match self.selection_range() {
            Some(range) => self.content.sub_rich_string(range.start, range.len()),
            None => RichString::new(),
        }
    }

    // === History ===

    /// Push the current state onto the undo stack.
    pub fn save_snapshot(&mut self) {
        let snapshot = self.snapshot();
        self.history.push(snapshot);
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            content: self.content.clone(),
            structure: self.structure.clone(),
            cursor: self.cursor,
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.content = snapshot.content;
        self.structure = snapshot.structure;
        self.cursor = self.cursor_for(snapshot.cursor.index);
        self.anchor = None;
        self.last_edit = None;
        self.revision += 1;
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    // === Core edit primitive ===

    /// Replace `[start, start + len)` with `text`, keeping the ledger in step.
    fn splice(&mut self, start: usize, len: usize, text: RichString) -> EditInfo {
        let total = self.content.len();
        let start = start.min(total);
        let len = len.min(total - start);

        let start_line = self.content.pos_from_index(start).line;
        let end_line = self.content.pos_from_index(start + len).line;
        let removed_feeds = end_line - start_line;
        let inserted_feeds = text.iter().filter(|c| c.is('\n')).count();

        if removed_feeds > 0 {
            self.structure.delete_lines(start_line + 1, end_line + 1);
        }
        for _ in 0..inserted_feeds {
            self.structure.insert_line(start_line + 1);
        }

        let inserted_len = text.len();
        self.content = if text.is_empty() {
            self.content.erase(start, len)
        } else {
            self.content.replace(start, len, text)
        };
        self.heal();
        if let Some(anchor) = self.anchor {
            self.anchor = Some(self.cursor_for(anchor.index));
        }

        let edit = EditInfo {
            edit_char_pos: start,
            inserted_len,
            deleted_len: len,
            contains_newline: removed_feeds + inserted_feeds > 0,
            doc_len_after: self.content.len(),
        };
        self.finish_edit(edit.clone());
        edit
    }

    /// Restore the never-empty invariant and rebalance lopsided trees.
    fn heal(&mut self) {
        if self.content.is_empty() {
            let attrs = self.config.char_attributes();
            self.content = Rope::from(RichString::from_str_with("\n", &attrs));
            self.structure = LineLedger::new();
        }
        if !self.content.is_balanced() {
            self.content = self.content.rebalance();
        }
        self.structure.rebalance();
        debug_assert_eq!(self.structure.line_count(), self.content.line_count());
    }

    fn finish_edit(&mut self, edit: EditInfo) {
        tracing::trace!(
            pos = edit.edit_char_pos,
            inserted = edit.inserted_len,
            deleted = edit.deleted_len,
            "edit"
        );
        self.history.invalidate_redo();
        self.last_edit = Some(edit);
        self.revision += 1;
    }

    /// Formatting the next typed character takes: the character before the
    /// cursor unless it is a line feed, else the character at the cursor,
    /// else the configured defaults. Links are never inherited.
    fn insertion_template(&self) -> RichChar {
        let index = self.cursor.index;
        let before = index
            .checked_sub(1)
            .and_then(|i| self.content.get(i).ok())
            .filter(|c| !c.is('\n'));
        let mut template = before
            .or_else(|| self.content.get(index).ok())
            .cloned()
            .unwrap_or_else(|| RichChar::with_attributes(0, &self.config.char_attributes()));
        template.set_link(None);
        template
    }

    fn styled_like_cursor(&self, text: &str) -> RichString {
        let template = self.insertion_template();
        text.chars()
            .filter(|&c| c != '\r')
            .map(|c| template.restyle(c as u32))
            .collect()
    }

    // === Mutation ===

    /// Insert pre-styled text at the cursor and move past it.
    ///
    /// A single line feed or space is an edit boundary and snapshots first.
    pub fn insert_at_cursor(&mut self, text: &RichString) -> EditInfo {
        if is_boundary(text) {
            self.save_snapshot();
        }
        let at = self.cursor.index;
        let edit = self.splice(at, 0, text.clone());
        self.set_cursor_index(at + text.len());
        edit
    }

    /// Insert text at the cursor, leaving the cursor in front of it.
    pub fn append_at_cursor(&mut self, text: &RichString) -> EditInfo {
        if is_boundary(text) {
            self.save_snapshot();
        }
        let at = self.cursor.index;
        let edit = self.splice(at, 0, text.clone());
        self.set_cursor_index(at);
        edit
    }

    /// Type plain text at the cursor in the formatting of the insertion point.
    pub fn insert_text(&mut self, text: &str) -> EditInfo {
        let styled = self.styled_like_cursor(text);
        self.insert_at_cursor(&styled)
    }

    /// Paste clipboard bytes at the cursor. Malformed UTF-8 becomes
    /// substitution characters rather than failing.
    pub fn paste(&mut self, bytes: &[u8]) -> EditInfo {
        self.save_snapshot();
        let template = self.insertion_template();
        let styled: RichString = RichString::decode(bytes)
            .iter()
            .filter(|c| !c.is('\r'))
            .map(|c| template.restyle(c.codepoint()))
            .collect();
        let at = self.cursor.index;
        let edit = self.splice(at, 0, styled.clone());
        self.set_cursor_index(at + styled.len());
        edit
    }

    /// Delete the character before the cursor. Does nothing at offset 0.
    pub fn erase_at_cursor(&mut self) -> Option<EditInfo> {
        let at = self.cursor.index;
        if at == 0 {
            return None;
        }
        if clamped(self.content.get(at - 1)).is('\n') {
            self.save_snapshot();
        }
        let edit = self.splice(at - 1, 1, RichString::new());
        self.set_cursor_index(at - 1);
        Some(edit)
    }

    /// Delete `[start, end)`, never touching the final line feed.
    pub fn erase_range(&mut self, start: usize, end: usize) -> Option<EditInfo> {
        let limit = self.max_cursor_index();
        let (start, end) = (start.min(limit), end.min(limit));
        if start >= end {
            return None;
        }
        self.save_snapshot();
        let edit = self.splice(start, end - start, RichString::new());
        self.anchor = None;
        self.set_cursor_index(start);
        Some(edit)
    }

    /// Delete the selection, if there is a non-empty one.
    pub fn erase_selection(&mut self) -> Option<EditInfo> {
        let range = self.selection_range()?;
        self.erase_range(range.start, range.end)
    }

    /// Plain text of `[start, end)`, for the clipboard.
    pub fn copy_range(&self, start: usize, end: usize) -> String {
        self.content.substring(start, end.saturating_sub(start))
    }

    pub fn copy_selection(&self) -> Option<String> {
        self.selection_range()
            .map(|range| self.copy_range(range.start, range.end))
    }

    /// Remove the selection and return its plain text.
    pub fn cut_selection(&mut self) -> Option<String> {
        let text = self.copy_selection()?;
        self.erase_selection();
        Some(text)
    }

    /// The run of letters and digits touching the cursor.
    pub fn get_word_at_cursor(&self) -> RichString {
        let range = lookup_word_range(&self.content, self.cursor.index);
        self.content.sub_rich_string(range.start, range.len())
    }

    /// Replace the word at the cursor with `text` and move past it.
    pub fn replace_word_at_cursor(&mut self, text: &RichString) -> EditInfo {
        self.save_snapshot();
        let range = lookup_word_range(&self.content, self.cursor.index);
        let edit = self.splice(range.start, range.len(), text.clone());
        self.anchor = None;
        self.set_cursor_index(range.start + text.len());
        edit
    }

    // === Character formatting ===

    /// The range formatting applies to: the selection, or else the word at the cursor.
    fn format_range(&self) -> Range<usize> {
        self.selection_range()
            .unwrap_or_else(|| lookup_word_range(&self.content, self.cursor.index))
    }

    /// Snapshot, then rewrite `range` in place through `f`.
    fn restyle(&mut self, range: Range<usize>, f: impl FnOnce(&mut RichString)) {
        let end = range.end.min(self.content.len());
        let range = range.start.min(end)..end;
        if range.is_empty() {
            return;
        }
        self.save_snapshot();
        let mut text = self.content.sub_rich_string(range.start, range.len());
        f(&mut text);
        let contains_newline = text.iter().any(|c| c.is('\n'));
        self.content = self.content.replace(range.start, range.len(), text);
        self.heal();
        self.finish_edit(EditInfo {
            edit_char_pos: range.start,
            inserted_len: range.len(),
            deleted_len: range.len(),
            contains_newline,
            doc_len_after: self.content.len(),
        });
    }

    /// Toggle `style` over the selection or word: on everywhere unless it
    /// is already on everywhere, in which case off everywhere.
    pub fn toggle_style(&mut self, style: Style) {
        let range = self.format_range();
        self.restyle(range, |text| text.toggle_style(0..text.len(), style));
    }

    pub fn toggle_bold(&mut self) {
        self.toggle_style(Style::Bold);
    }

    pub fn toggle_italic(&mut self) {
        self.toggle_style(Style::Italic);
    }

    pub fn toggle_underline(&mut self) {
        self.toggle_style(Style::Underline);
    }

    pub fn toggle_strikethrough(&mut self) {
        self.toggle_style(Style::Strikethrough);
    }

    pub fn toggle_subscript(&mut self) {
        self.toggle_style(Style::Subscript);
    }

    pub fn toggle_superscript(&mut self) {
        self.toggle_style(Style::Superscript);
    }

    pub fn set_text_color(&mut self, color: Color) {
        let range = self.format_range();
        self.restyle(range, |text| text.set_text_color(0..text.len(), color));
    }

    pub fn set_background_color(&mut self, color: Color) {
        let range = self.format_range();
        self.restyle(range, |text| text.set_background_color(0..text.len(), color));
    }

    pub fn set_font_size(&mut self, size: u32) {
        let range = self.format_range();
        self.restyle(range, |text| text.set_font_size(0..text.len(), size));
    }

    pub fn set_font_id(&mut self, id: usize) {
        let range = self.format_range();
        self.restyle(range, |text| text.set_font_id(0..text.len(), id));
    }

    /// Attach `link` to the selection or word; `None` removes links.
    pub fn set_link(&mut self, link: Option<SmolStr>) {
        let range = self.format_range();
        self.restyle(range, |text| text.set_link(0..text.len(), link));
    }

    fn char_at_cursor(&self) -> &RichChar {
        clamped(self.content.get(self.cursor.index))
    }

    pub fn text_color(&self) -> Color {
        self.char_at_cursor().text_color()
    }

    pub fn background_color(&self) -> Color {
        self.char_at_cursor().background_color()
    }

    pub fn font_size(&self) -> u32 {
        self.char_at_cursor().font_size()
    }

    pub fn font_id(&self) -> usize {
        self.char_at_cursor().font_id()
    }

    pub fn has_style(&self, style: Style) -> bool {
        self.char_at_cursor().has(style)
    }

    /// Font size shared by the whole selection; `None` if mixed or nothing selected.
    pub fn font_size_selected(&self) -> Option<u32> {
        self.get_selected_text().font_size()
    }

    pub fn font_id_selected(&self) -> Option<usize> {
        self.get_selected_text().font_id()
    }

    pub fn text_color_selected(&self) -> Option<Color> {
        self.get_selected_text().text_color()
    }

    pub fn background_color_selected(&self) -> Option<Color> {
        self.get_selected_text().background_color()
    }

    /// Link shared by the whole selection, if any.
    pub fn link_selected(&self) -> Option<SmolStr> {
        self.get_selected_text().link()
    }

    // === Line structure ===

    /// Lines structure setters apply to: every selected line, or the cursor line.
    fn target_lines(&self) -> RangeInclusive<usize> {
        self.select_start().line..=self.select_end().line
    }

    /// Set the heading level of the target lines and force their characters
    /// (terminator included) to the heading's font size.
    pub fn set_heading(&mut self, level: HeadingLevel) {
        self.save_snapshot();
        let size = self.config.heading_font_size(level);
        for line in self.target_lines() {
            let start = self.content.find_line_start(line);
            let end = self.content.find_line_start(line + 1);
            let mut text = self.content.sub_rich_string(start, end - start);
            text.set_font_size(0..text.len(), size);
            self.content = self.content.replace(start, end - start, text);
            clamped(self.structure.set_heading(line, level));
        }
        self.structure_changed();
    }

    pub fn set_alignment(&mut self, alignment: Alignment) {
        self.save_snapshot();
        for line in self.target_lines() {
            clamped(self.structure.set_alignment(line, alignment));
        }
        self.structure_changed();
    }

    pub fn set_list(&mut self, list: ListKind) {
        self.save_snapshot();
        for line in self.target_lines() {
            clamped(self.structure.set_list(line, list));
        }
        self.structure_changed();
    }

    fn structure_changed(&mut self) {
        self.heal();
        let line = self.select_start().line;
        let start = self.content.find_line_start(line);
        let end = self.content.find_line_start(self.select_end().line + 1);
        self.finish_edit(EditInfo {
            edit_char_pos: start,
            inserted_len: end - start,
            deleted_len: end - start,
            contains_newline: true,
            doc_len_after: self.content.len(),
        });
    }

    pub fn line_record(&self, line: usize) -> Option<LineRecord> {
        self.structure.record(line).ok()
    }

    pub fn heading(&self, line: usize) -> Option<HeadingLevel> {
        self.structure.heading(line).ok()
    }

    pub fn alignment(&self, line: usize) -> Option<Alignment> {
        self.structure.alignment(line).ok()
    }

    pub fn list(&self, line: usize) -> Option<ListKind> {
        self.structure.list(line).ok()
    }

    /// `(level, line)` for every heading line, in document order.
    pub fn outline(&self) -> Vec<(HeadingLevel, usize)> {
        self.structure
            .records()
            .iter()
            .enumerate()
            .filter(|(_, r)| r.heading.is_heading())
            .map(|(line, r)| (r.heading, line))
            .collect()
    }

    /// Characters of `line` without its terminator.
    pub fn line_text(&self, line: usize) -> RichString {
        if line >= self.line_count() {
            return RichString::new();
        }
        let start = self.content.find_line_start(line);
        self.content.sub_rich_string(start, self.content.line_length(line))
    }

    /// Width and height of `line` as laid out on a single row.
    pub fn line_extent(&self, line: usize, metrics: &impl GlyphMetrics) -> (f32, f32) {
        self.line_text(line).iter().fold((0.0, 0.0), |(w, h), c| {
            let (cw, ch) = metrics.measure(c.font_id(), c.codepoint(), c.font_size());
            (w + cw, f32::max(h, ch))
        })
    }

    // === Search ===

    /// Scan for `pattern`, returning the number of matches.
    pub fn find(&mut self, pattern: impl Into<RichString>) -> usize {
        self.search.set_pattern(pattern);
        self.search.find_in_content(&self.content);
        self.search.matches().len()
    }

    /// Move the cursor to the next match after it, wrapping around.
    pub fn goto_next_match(&mut self) -> bool {
        if self.search.matches().is_empty() {
            return false;
        }
        let target = self.search.next_match(self.cursor);
        self.anchor = None;
        self.set_cursor_index(target.index);
        true
    }

    /// Move the cursor to the previous match before it, wrapping around.
    pub fn goto_prev_match(&mut self) -> bool {
        if self.search.matches().is_empty() {
            return false;
        }
        let target = self.search.prev_match(self.cursor);
        self.anchor = None;
        self.set_cursor_index(target.index);
        true
    }

    /// Replace every occurrence of `pattern` with `replacement` as one undo step.
    /// Returns how many occurrences were replaced.
    pub fn replace_all(
        &mut self,
        pattern: impl Into<RichString>,
        replacement: impl Into<RichString>,
    ) -> usize {
        self.search.set_pattern(pattern);
        self.search.set_replacement(replacement);
        self.search.find_in_content(&self.content);
        let width = self.search.pattern().len();
        let limit = self.max_cursor_index();
        let mut offsets = self.search.non_overlapping_offsets();
        offsets.retain(|&offset| offset + width <= limit);
        if offsets.is_empty() {
            return 0;
        }

        self.save_snapshot();
        let touches_lines = self.search.pattern().iter().any(|c| c.is('\n'))
            || self.search.replacement().iter().any(|c| c.is('\n'));

        if touches_lines {
            let replacement = self.search.replacement().clone();
            for &offset in offsets.iter().rev() {
                self.splice(offset, width, replacement.clone());
            }
        } else {
            self.content = self.search.replace_in_content(&self.content);
            self.heal();
            self.finish_edit(EditInfo {
                edit_char_pos: 0,
                inserted_len: self.content.len(),
                deleted_len: self.content.len(),
                contains_newline: false,
                doc_len_after: self.content.len(),
            });
        }

        self.anchor = None;
        self.set_cursor(self.cursor.line, self.cursor.column);
        self.search.reset();
        tracing::debug!(count = offsets.len(), "replaced all");
        offsets.len()
    }

    // === Spellcheck ===

    pub fn check_word_at_cursor(&self, dictionary: &Dictionary) -> bool {
        dictionary.search(&self.get_word_at_cursor())
    }

    pub fn suggest_at_cursor(&self, dictionary: &mut Dictionary) -> Vec<RichString> {
        dictionary.suggest(&self.get_word_at_cursor())
    }

    /// Every lookup word the dictionary does not know, with where it starts.
    pub fn misspelled_words(&self, dictionary: &Dictionary) -> Vec<(Cursor, RichString)> {
        let mut found = Vec::new();
        let mut word = RichString::new();
        let mut start = 0;
        for (i, c) in self.content.chars().enumerate() {
            if is_lookup_word_char(c) {
                if word.is_empty() {
                    start = i;
                }
                word.push(c.clone());
            } else if !word.is_empty() {
                let done = std::mem::take(&mut word);
                if !dictionary.search(&done) {
                    found.push((self.content.pos_from_index(start), done));
                }
            }
        }
        found
    }
}

impl UndoManager for Document {
    fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn undo(&mut self) -> bool {
        let current = self.snapshot();
        match self.history.undo(current) {
            Some(previous) => {
                self.restore(previous);
                true
            }
            None => false,
        }
    }

    fn redo(&mut self) -> bool {
        let current = self.snapshot();
        match self.history.redo(current) {
            Some(next) => {
                self.restore(next);
                true
            }
            None => false,
        }
    }

    fn clear_history(&mut self) {
        self.history.clear();
    }
}

/// A lone line feed or space marks the end of an undo step.
fn is_boundary(text: &RichString) -> bool {
    text.len() == 1 && (text[0].is('\n') || text[0].is(' '))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MonospaceMetrics;

    fn doc(text: &str) -> Document {
        Document::from_text(text, DocumentConfig::default())
    }

    fn type_text(doc: &mut Document, text: &str) {
        for c in text.chars() {
            doc.insert_text(&c.to_string());
        }
    }

    #[test]
    fn test_new_document_is_single_line_feed() {
        let d = Document::new();
        assert_eq!(d.text(), "\n");
        assert_eq!(d.line_count(), 1);
        assert_eq!(d.structure().line_count(), 1);
        assert_eq!(d.max_cursor_index(), 0);
    }

    #[test]
    fn test_from_text_appends_line_feed() {
        let d = doc("one\ntwo");
        assert_eq!(d.text(), "one\ntwo\n");
        assert_eq!(d.line_count(), 2);
        assert_eq!(d.structure().line_count(), 2);
    }

    #[test]
    fn test_typing_tracks_lines() {
        let mut d = Document::new();
        type_text(&mut d, "ab\ncd");
        assert_eq!(d.text(), "ab\ncd\n");
        assert_eq!(d.cursor(), Cursor::new(1, 2, 5));
        assert_eq!(d.structure().line_count(), 2);
    }

    #[test]
    fn test_char_motion_wraps_lines() {
        let mut d = doc("ab\ncd");
        d.set_cursor(0, 2);
        d.move_next_char();
        assert_eq!((d.cursor().line, d.cursor().column), (1, 0));
        d.move_prev_char();
        assert_eq!((d.cursor().line, d.cursor().column), (0, 2));

        // No wrap past the last line's end.
        d.set_cursor(1, 2);
        d.move_next_char();
        assert_eq!((d.cursor().line, d.cursor().column), (1, 2));
    }

    #[test]
    fn test_move_line_clamps() {
        let mut d = doc("long line\nab\nxyz");
        d.set_cursor(0, 8);
        d.move_line(1);
        assert_eq!((d.cursor().line, d.cursor().column), (1, 2));
        d.move_line(10);
        assert_eq!(d.cursor().line, 2);
        d.move_line(-10);
        assert_eq!(d.cursor().line, 0);

        d.cursor_move_column(-100);
        assert_eq!(d.cursor().column, 0);
        d.cursor_move_column(100);
        assert_eq!(d.cursor().column, 9);
    }

    #[test]
    fn test_word_motion() {
        let mut d = doc("hi, there");
        d.move_next_word();
        assert_eq!(d.cursor().index, 2);
        d.move_next_word();
        assert_eq!(d.cursor().index, 3);
        d.move_next_word();
        assert_eq!(d.cursor().index, 4);
        d.move_next_word();
        assert_eq!(d.cursor().index, 9);
        // Never past the end of the last line.
        d.move_next_word();
        assert_eq!(d.cursor().index, 9);

        d.move_prev_word();
        assert_eq!(d.cursor().index, 4);
        d.move_prev_word();
        assert_eq!(d.cursor().index, 2);
    }

    #[test]
    fn test_erase_line_feed_joins_lines() {
        let mut d = doc("ab\ncd");
        d.set_cursor(1, 0);
        d.erase_at_cursor();
        assert_eq!(d.text(), "abcd\n");
        assert_eq!(d.cursor(), Cursor::new(0, 2, 2));
        assert_eq!(d.structure().line_count(), 1);

        d.set_cursor(0, 0);
        assert!(d.erase_at_cursor().is_none());
    }

    #[test]
    fn test_erase_range_across_lines() {
        let mut d = doc("one\ntwo\nthree");
        d.erase_range(2, 9);
        assert_eq!(d.text(), "onhree\n");
        assert_eq!(d.structure().line_count(), 1);
        assert_eq!(d.cursor().index, 2);
    }

    #[test]
    fn test_erase_everything_keeps_line_feed() {
        let mut d = doc("abc");
        d.select_all();
        d.erase_selection();
        assert_eq!(d.text(), "\n");
        assert_eq!(d.len(), 1);
        assert!(!d.is_selecting());
    }

    #[test]
    fn test_undo_restores_content_and_cursor() {
        let mut d = doc("hello");
        d.set_cursor(0, 5);
        d.save_snapshot();
        d.insert_text("!!");
        assert_eq!(d.text(), "hello!!\n");

        assert!(d.undo());
        assert_eq!(d.text(), "hello\n");
        assert_eq!(d.cursor(), Cursor::new(0, 5, 5));

        assert!(d.redo());
        assert_eq!(d.text(), "hello!!\n");
    }

    #[test]
    fn test_fresh_edit_after_undo_clears_redo() {
        let mut d = doc("x");
        d.save_snapshot();
        d.insert_text("y");
        assert!(d.undo());
        d.insert_text("z");
        assert!(!d.redo());
        assert_eq!(d.text(), "zx\n");
    }

    #[test]
    fn test_formatting_nothing_keeps_redo() {
        let mut d = doc("ab  cd");
        d.save_snapshot();
        d.insert_text("X");
        assert!(d.undo());
        let before = d.history().undo_depth();

        // Between the two spaces there is no word and no selection.
        d.set_cursor(0, 3);
        let revision = d.revision();
        d.toggle_bold();
        d.set_text_color(Color::rgba(255, 0, 0, 255));
        d.set_link(Some("https://example.com".into()));

        assert_eq!(d.history().undo_depth(), before);
        assert!(d.history().can_redo());
        assert_eq!(d.revision(), revision);
        assert!(d.redo());
        assert_eq!(d.text(), "Xab  cd\n");
    }

    #[test]
    fn test_undo_on_empty_history_is_noop() {
        let mut d = doc("x");
        assert!(!d.undo());
        assert!(!d.redo());
        assert_eq!(d.text(), "x\n");
    }

    #[test]
    fn test_space_is_an_undo_boundary() {
        let mut d = Document::new();
        type_text(&mut d, "hello world");
        assert_eq!(d.history().undo_depth(), 1);
        assert!(d.undo());
        assert_eq!(d.text(), "hello\n");
    }

    #[test]
    fn test_undo_restores_structure() {
        let mut d = doc("title\nbody");
        d.set_heading(HeadingLevel::H1);
        assert_eq!(d.heading(0), Some(HeadingLevel::H1));
        d.undo();
        assert_eq!(d.heading(0), Some(HeadingLevel::None));
    }

    #[test]
    fn test_typing_inherits_formatting() {
        let mut d = doc("bold");
        d.select(0, 4);
        d.toggle_bold();
        d.clear_selection();
        d.set_cursor(0, 4);
        d.insert_text("er");
        assert!(d.content().get(5).unwrap().has(Style::Bold));
    }

    #[test]
    fn test_toggle_without_selection_targets_word() {
        let mut d = doc("one two three");
        d.set_cursor(0, 5);
        d.toggle_italic();
        let italic: Vec<bool> = d.content().chars().map(|c| c.has(Style::Italic)).collect();
        let expected: Vec<bool> = (0..14).map(|i| (4..7).contains(&i)).collect();
        assert_eq!(italic, expected);
    }

    #[test]
    fn test_toggle_twice_restores_bits() {
        let mut d = doc("mixed text");
        d.select(0, 2);
        d.toggle_bold();
        let before: Vec<bool> = d.content().chars().map(|c| c.has(Style::Bold)).collect();

        d.select(1, 8);
        d.toggle_underline();
        d.toggle_underline();
        let after: Vec<bool> = d.content().chars().map(|c| c.has(Style::Bold)).collect();
        assert_eq!(before, after);
        assert!(d.content().chars().all(|c| !c.has(Style::Underline)));
    }

    #[test]
    fn test_formatting_is_undoable() {
        let mut d = doc("red");
        d.select_all();
        d.set_text_color(Color::rgba(255, 0, 0, 255));
        assert_eq!(d.text_color_selected(), Some(Color::rgba(255, 0, 0, 255)));
        d.undo();
        assert_eq!(d.content().get(0).unwrap().text_color(), Color::BLACK);
    }

    #[test]
    fn test_font_getters() {
        let mut d = doc("ab cd");
        d.select(0, 2);
        d.set_font_size(20);
        d.set_font_id(2);
        assert_eq!(d.font_size_selected(), Some(20));
        assert_eq!(d.font_id_selected(), Some(2));
        d.select(1, 4);
        assert_eq!(d.font_size_selected(), None);

        d.clear_selection();
        d.set_cursor(0, 0);
        assert_eq!(d.font_size(), 20);
        assert_eq!(d.font_id(), 2);
        d.set_cursor(0, 3);
        assert_eq!(d.font_size(), 36);
    }

    #[test]
    fn test_links() {
        let mut d = doc("see docs here");
        d.set_cursor(0, 5);
        d.set_link(Some("https://example.org".into()));
        d.select(4, 8);
        assert_eq!(d.link_selected().as_deref(), Some("https://example.org"));
        d.select(3, 8);
        assert_eq!(d.link_selected(), None);

        // Typing right after a link does not extend it.
        d.clear_selection();
        d.set_cursor(0, 8);
        d.insert_text("!");
        assert!(!d.content().get(8).unwrap().has_link());
    }

    #[test]
    fn test_heading_sets_font_size_and_outline() {
        let mut d = doc("Intro\ntext\nDetails\nmore");
        d.set_cursor(0, 0);
        d.set_heading(HeadingLevel::H1);
        d.set_cursor(2, 3);
        d.set_heading(HeadingLevel::H2);

        assert_eq!(
            d.outline(),
            vec![(HeadingLevel::H1, 0), (HeadingLevel::H2, 2)]
        );
        let h1 = d.config().heading_font_size(HeadingLevel::H1);
        assert!(d.line_text(0).iter().all(|c| c.font_size() == h1));
        assert_eq!(d.line_text(1).font_size(), Some(36));
    }

    #[test]
    fn test_structure_follows_line_edits() {
        let mut d = doc("a\nb\nc");
        d.set_cursor(2, 0);
        d.set_list(ListKind::Bullet);
        d.set_cursor(0, 1);
        d.insert_text("\n");
        assert_eq!(d.list(3), Some(ListKind::Bullet));
        assert_eq!(d.list(1), Some(ListKind::None));

        d.erase_range(0, 4);
        assert_eq!(d.line_count(), 2);
        assert_eq!(d.list(1), Some(ListKind::Bullet));
    }

    #[test]
    fn test_alignment_over_selected_lines() {
        let mut d = doc("a\nb\nc\nd");
        d.select(2, 4);
        d.set_alignment(Alignment::Center);
        let aligned: Vec<_> = (0..4).map(|l| d.alignment(l).unwrap()).collect();
        assert_eq!(
            aligned,
            vec![Alignment::Left, Alignment::Center, Alignment::Center, Alignment::Left]
        );
    }

    #[test]
    fn test_word_at_cursor_and_replace() {
        let mut d = doc("teh cat");
        d.set_cursor(0, 1);
        assert_eq!(d.get_word_at_cursor().to_string(), "teh");
        d.replace_word_at_cursor(&RichString::from("the"));
        assert_eq!(d.text(), "the cat\n");
        assert_eq!(d.cursor().index, 3);
    }

    #[test]
    fn test_cut_and_paste() {
        let mut d = doc("hello world");
        d.select(0, 6);
        assert_eq!(d.cut_selection().as_deref(), Some("hello "));
        assert_eq!(d.text(), "world\n");

        d.set_cursor(0, 5);
        d.paste(b" again\r\nnext");
        assert_eq!(d.text(), "world again\nnext\n");
        assert_eq!(d.line_count(), 2);
        assert_eq!(d.structure().line_count(), 2);
        assert_eq!(d.cursor(), Cursor::new(1, 4, 16));
    }

    #[test]
    fn test_paste_bad_bytes_does_not_fail() {
        let mut d = Document::new();
        d.paste(&[b'o', 0xFF, b'k']);
        assert_eq!(d.len(), 4);
        assert_eq!(d.content().get(1).unwrap().codepoint(), 0);
    }

    #[test]
    fn test_append_keeps_cursor() {
        let mut d = doc("ab");
        d.set_cursor(0, 1);
        d.append_at_cursor(&RichString::from("XY"));
        assert_eq!(d.text(), "aXYb\n");
        assert_eq!(d.cursor().index, 1);
    }

    #[test]
    fn test_find_and_navigate_matches() {
        let mut d = doc("cat\ncat cat");
        assert_eq!(d.find("cat"), 3);
        assert!(d.goto_next_match());
        assert_eq!(d.cursor(), Cursor::new(1, 0, 4));
        assert!(d.goto_next_match());
        assert_eq!(d.cursor(), Cursor::new(1, 4, 8));
        assert!(d.goto_next_match());
        assert_eq!(d.cursor(), Cursor::new(0, 0, 0));
        assert!(d.goto_prev_match());
        assert_eq!(d.cursor(), Cursor::new(1, 4, 8));

        assert_eq!(d.find("dog"), 0);
        assert!(!d.goto_next_match());
    }

    #[test]
    fn test_replace_all_single_undo_step() {
        let mut d = doc("a-a-a");
        assert_eq!(d.replace_all("a", "bb"), 3);
        assert_eq!(d.text(), "bb-bb-bb\n");
        assert!(d.undo());
        assert_eq!(d.text(), "a-a-a\n");
    }

    #[test]
    fn test_replace_all_with_line_feeds_keeps_structure() {
        let mut d = doc("x;y;z");
        assert_eq!(d.replace_all(";", "\n"), 2);
        assert_eq!(d.text(), "x\ny\nz\n");
        assert_eq!(d.structure().line_count(), 3);

        // The final line feed is never replaced.
        assert_eq!(d.replace_all("\n", ""), 2);
        assert_eq!(d.text(), "xyz\n");
        assert_eq!(d.structure().line_count(), 1);
    }

    #[test]
    fn test_spellcheck_at_cursor() {
        let mut dict = Dictionary::new();
        dict.load_words(["help", "hello", "world"]);

        let mut d = doc("helo world");
        d.set_cursor(0, 2);
        assert!(!d.check_word_at_cursor(&dict));
        let suggestions = d.suggest_at_cursor(&mut dict);
        assert_eq!(suggestions[0].to_string(), "hello");

        d.set_cursor(0, 7);
        assert!(d.check_word_at_cursor(&dict));

        let missing = d.misspelled_words(&dict);
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].1.to_string(), "helo");
    }

    #[test]
    fn test_edit_info_and_revision() {
        let mut d = Document::new();
        let start = d.revision();
        let edit = d.insert_text("a\n");
        assert_eq!(edit.inserted_len, 2);
        assert!(edit.contains_newline);
        assert_eq!(d.last_edit(), Some(&edit));
        assert!(d.revision() > start);
        assert!(!edit.is_stale(d.len()));
    }

    #[test]
    fn test_line_extent() {
        let d = doc("abc\n");
        let (w, h) = d.line_extent(0, &MonospaceMetrics { ratio: 0.5 });
        assert_eq!((w, h), (54.0, 36.0));
    }

    #[test]
    fn test_history_limit_from_config() {
        let config = DocumentConfig {
            history_limit: Some(1),
            ..DocumentConfig::default()
        };
        let mut d = Document::with_config(config);
        type_text(&mut d, "a b c");
        assert_eq!(d.history().undo_depth(), 1);
    }
}
