//! Per-line structure: heading level, alignment and list kind.
//!
//! The ledger is itself a rope holding one fixed-width record per content
//! line: three ASCII digits followed by `\n`, e.g. `"100\n"` for an H1 that
//! is left aligned and not in a list. Line inserts and deletes are plain rope
//! edits at `line * 4`, so the ledger snapshots and shares structure exactly
//! like the content it describes.
//!
//! Each field is a single decimal digit, so no field may ever exceed 9.

use std::fmt;

use crate::error::{EditorError, Result};
use crate::rope::Rope;

const RECORD_WIDTH: usize = 4;
const EMPTY_RECORD: &str = "000\n";

/// Heading level of a line; `None` is body text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[repr(u8)]
pub enum HeadingLevel {
    #[default]
    None = 0,
    H1 = 1,
    H2 = 2,
    H3 = 3,
    H4 = 4,
    H5 = 5,
    H6 = 6,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Alignment {
    #[default]
    Left = 0,
    Center = 1,
    Right = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ListKind {
    #[default]
    None = 0,
    Bullet = 1,
    Number = 2,
}

impl HeadingLevel {
    pub const ALL: [HeadingLevel; 7] = [
        HeadingLevel::None,
        HeadingLevel::H1,
        HeadingLevel::H2,
        HeadingLevel::H3,
        HeadingLevel::H4,
        HeadingLevel::H5,
        HeadingLevel::H6,
    ];

    pub fn from_digit(digit: u8) -> Option<Self> {
        Self::ALL.get(digit as usize).copied()
    }

    pub fn is_heading(self) -> bool {
        self != HeadingLevel::None
    }
}

impl Alignment {
    pub fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            0 => Some(Alignment::Left),
            1 => Some(Alignment::Center),
            2 => Some(Alignment::Right),
            _ => None,
        }
    }
}

impl ListKind {
    pub fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            0 => Some(ListKind::None),
            1 => Some(ListKind::Bullet),
            2 => Some(ListKind::Number),
            _ => None,
        }
    }
}

/// Decoded ledger record for one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineRecord {
    pub heading: HeadingLevel,
    pub alignment: Alignment,
    pub list: ListKind,
}

impl LineRecord {
    /// Parse the three-digit text form, e.g. `"120"`.
    pub fn parse(digits: &str) -> Option<Self> {
        let bytes = digits.as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(u8::is_ascii_digit) {
            return None;
        }
        Some(Self {
            heading: HeadingLevel::from_digit(bytes[0] - b'0')?,
            alignment: Alignment::from_digit(bytes[1] - b'0')?,
            list: ListKind::from_digit(bytes[2] - b'0')?,
        })
    }
}

impl fmt::Display for LineRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.heading as u8, self.alignment as u8, self.list as u8
        )
    }
}

/// Which digit of a record to address.
#[derive(Clone, Copy)]
enum Field {
    Heading = 0,
    Alignment = 1,
    List = 2,
}

/// Rope-encoded per-line structure, always holding at least one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineLedger {
    rope: Rope,
}

impl Default for LineLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl LineLedger {
    /// A ledger for a single empty line.
    pub fn new() -> Self {
        Self {
            rope: Rope::from(EMPTY_RECORD),
        }
    }

    /// Build from explicit records. An empty list yields a single default record.
    pub fn from_records(records: impl IntoIterator<Item = LineRecord>) -> Self {
        let mut text = String::new();
        for record in records {
            text.push_str(&record.to_string());
            text.push('\n');
        }
        if text.is_empty() {
            return Self::new();
        }
        Self {
            rope: Rope::from(text.as_str()),
        }
    }

    pub fn rope(&self) -> &Rope {
        &self.rope
    }

    pub fn line_count(&self) -> usize {
        self.rope.len() / RECORD_WIDTH
    }

    /// Insert a default record so it becomes line `line` (clamped to the end).
    pub fn insert_line(&mut self, line: usize) {
        let at = line.min(self.line_count()) * RECORD_WIDTH;
        self.rope = self.rope.insert(at, EMPTY_RECORD);
    }

    pub fn delete_line(&mut self, line: usize) {
        self.delete_lines(line, line + 1);
    }

    /// Remove records `[start, end)`. Emptying the ledger leaves one default record.
    pub fn delete_lines(&mut self, start: usize, end: usize) {
        if start >= end {
            return;
        }
        let from = self.rope.find_line_start(start);
        let to = self.rope.find_line_start(end);
        self.rope = self.rope.erase(from, to - from);
        if self.rope.is_empty() {
            self.rope = Rope::from(EMPTY_RECORD);
        }
        if !self.rope.is_balanced() {
            self.rope = self.rope.rebalance();
        }
    }

    // === Setters ===

    pub fn set_heading(&mut self, line: usize, level: HeadingLevel) -> Result<()> {
        self.set_field(line, Field::Heading, level as u8)
    }

    pub fn set_alignment(&mut self, line: usize, alignment: Alignment) -> Result<()> {
        self.set_field(line, Field::Alignment, alignment as u8)
    }

    pub fn set_list(&mut self, line: usize, list: ListKind) -> Result<()> {
        self.set_field(line, Field::List, list as u8)
    }

    pub fn set_record(&mut self, line: usize, record: LineRecord) -> Result<()> {
        self.set_heading(line, record.heading)?;
        self.set_alignment(line, record.alignment)?;
        self.set_list(line, record.list)
    }

    // === Getters ===

    pub fn heading(&self, line: usize) -> Result<HeadingLevel> {
        Ok(self.record(line)?.heading)
    }

    pub fn alignment(&self, line: usize) -> Result<Alignment> {
        Ok(self.record(line)?.alignment)
    }

    pub fn list(&self, line: usize) -> Result<ListKind> {
        Ok(self.record(line)?.list)
    }

    pub fn record(&self, line: usize) -> Result<LineRecord> {
        self.check_line(line)?;
        let start = line * RECORD_WIDTH;
        let digits = self.rope.substring(start, RECORD_WIDTH - 1);
        LineRecord::parse(&digits)
            .ok_or_else(|| EditorError::format(line, format!("bad structure record {digits:?}")))
    }

    pub fn records(&self) -> Vec<LineRecord> {
        (0..self.line_count())
            .map(|line| self.record(line).unwrap_or_default())
            .collect()
    }

    fn check_line(&self, line: usize) -> Result<()> {
        let count = self.line_count();
        if line >= count {
            return Err(EditorError::out_of_range("ledger line", line, count));
        }
        Ok(())
    }

    fn set_field(&mut self, line: usize, field: Field, digit: u8) -> Result<()> {
        self.check_line(line)?;
        debug_assert!(digit <= 9);
        let at = line * RECORD_WIDTH + field as usize;
        let text = char::from(b'0' + digit).to_string();
        self.rope = self.rope.replace(at, 1, text.as_str());
        Ok(())
    }

    /// Rebalance the backing rope if it has grown lopsided.
    pub fn rebalance(&mut self) {
        if !self.rope.is_balanced() {
            self.rope = self.rope.rebalance();
        }
    }
}
