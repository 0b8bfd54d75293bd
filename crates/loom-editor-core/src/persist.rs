//! Saving and loading documents.
//!
//! The file is line oriented plain text:
//!
//! ```text
//! N                                   number of content lines
//! <line 1> ... <line N>               raw text, terminators stripped
//! <record 1> ... <record N>           three structure digits per line
//! r g b a br bg bb ba size id link flags
//!                                     one per character, terminators included
//! F                                   number of registered fonts
//! name|path                           F times
//! ```
//!
//! Links and font entries are written with `%`, `|`, space, tab and line
//! breaks percent-escaped; a link of `-` means no link.

use std::fs;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use smol_str::SmolStr;

use crate::config::DocumentConfig;
use crate::document::Document;
use crate::error::{EditorError, Result};
use crate::fonts::FontRegistry;
use crate::ledger::LineRecord;
use crate::rich::{Color, RichChar, StyleFlags};
use crate::rich_string::RichString;

const NO_LINK: &str = "-";

impl Document {
    /// Write the document in the persisted layout.
    pub fn save_to(&self, writer: impl Write) -> Result<()> {
        let mut out = BufWriter::new(writer);
        let content = self.content();
        let lines = self.line_count();

        writeln!(out, "{lines}")?;
        for line in 0..lines {
            writeln!(out, "{}", self.line_text(line))?;
        }
        for record in self.structure().records() {
            writeln!(out, "{record}")?;
        }
        for c in content.chars() {
            write_char_record(&mut out, c)?;
        }
        writeln!(out, "{}", self.fonts().len())?;
        for font in self.fonts().iter() {
            writeln!(out, "{}|{}", escape_field(&font.name), escape_field(&font.path))?;
        }
        out.flush()?;
        Ok(())
    }

    /// Read a document written by [`Document::save_to`].
    pub fn load_from(mut reader: impl Read, config: DocumentConfig) -> Result<Document> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        let parsed = parse(&text)?;

        let attrs = config.char_attributes();
        let mut doc = Document::with_config(config);
        let (content, structure) = Document::normalized(parsed.body, parsed.records, &attrs);
        doc.replace_state(content, structure, parsed.fonts);
        Ok(doc)
    }

    /// Load from `path` and remember it for later saves.
    pub fn load(path: impl AsRef<Path>, config: DocumentConfig) -> Result<Document> {
        let path = path.as_ref();
        let file = fs::File::open(path)?;
        let mut doc = Self::load_from(file, config)?;
        doc.set_path(path);
        tracing::info!(path = %path.display(), lines = doc.line_count(), "loaded document");
        Ok(doc)
    }

    /// Save to the remembered path.
    pub fn save(&self) -> Result<()> {
        let path = self.path().ok_or(EditorError::Untitled)?;
        let file = fs::File::create(path)?;
        self.save_to(file)?;
        tracing::info!(path = %path.display(), chars = self.len(), "saved document");
        Ok(())
    }

    /// Save to `path` and remember it.
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.set_path(path.as_ref());
        self.save()
    }
}

fn write_char_record(out: &mut impl Write, c: &RichChar) -> std::io::Result<()> {
    let Color { r, g, b, a } = c.text_color();
    let bg = c.background_color();
    let link = c.link().map_or_else(|| NO_LINK.to_string(), |l| escape_link(l));
    writeln!(
        out,
        "{r} {g} {b} {a} {} {} {} {} {} {} {link} {}",
        bg.r,
        bg.g,
        bg.b,
        bg.a,
        c.font_size(),
        c.font_id(),
        c.style().bits()
    )
}

// === Parsing ===

struct Parsed {
    body: RichString,
    records: Vec<LineRecord>,
    fonts: FontRegistry,
}

/// Lines of the file with 1-based numbers for error messages.
struct Lines<'a> {
    inner: std::iter::Enumerate<std::str::Split<'a, char>>,
}

impl<'a> Lines<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            inner: text.split('\n').enumerate(),
        }
    }

    fn next_line(&mut self, what: &str) -> Result<(usize, &'a str)> {
        match self.inner.next() {
            Some((i, line)) => Ok((i + 1, line)),
            None => Err(EditorError::format(0, format!("unexpected end of file, expected {what}"))),
        }
    }

    fn next_count(&mut self, what: &str) -> Result<usize> {
        let (number, line) = self.next_line(what)?;
        line.trim()
            .parse()
            .map_err(|_| EditorError::format(number, format!("expected {what}, found {line:?}")))
    }
}

fn parse(text: &str) -> Result<Parsed> {
    let mut lines = Lines::new(text);
    let line_count = lines.next_count("line count")?;

    let mut raw = Vec::with_capacity(line_count);
    for _ in 0..line_count {
        raw.push(lines.next_line("text line")?.1);
    }

    let mut records = Vec::with_capacity(line_count);
    for _ in 0..line_count {
        let (number, line) = lines.next_line("structure record")?;
        let record = LineRecord::parse(line.trim())
            .ok_or_else(|| EditorError::format(number, format!("bad structure record {line:?}")))?;
        records.push(record);
    }

    let codepoints: Vec<char> = raw
        .iter()
        .flat_map(|line| line.chars().chain(std::iter::once('\n')))
        .collect();
    let mut body = RichString::with_capacity(codepoints.len());
    for c in codepoints {
        let (number, line) = lines.next_line("character record")?;
        body.push(parse_char_record(number, line, c)?);
    }

    let font_count = lines.next_count("font count")?;
    let mut fonts = FontRegistry::new();
    for _ in 0..font_count {
        let (number, line) = lines.next_line("font entry")?;
        let (name, path) = line
            .split_once('|')
            .ok_or_else(|| EditorError::format(number, "font entry needs name|path"))?;
        fonts.register(
            unescape_field(number, name)?,
            unescape_field(number, path)?.to_string(),
        );
    }

    Ok(Parsed {
        body,
        records,
        fonts,
    })
}

fn parse_char_record(number: usize, line: &str, c: char) -> Result<RichChar> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let [r, g, b, a, br, bg, bb, ba, size, id, link, flags] = fields[..] else {
        return Err(EditorError::format(
            number,
            format!("character record needs 12 fields, found {}", fields.len()),
        ));
    };

    let num = |field: &str| -> Result<u64> {
        field
            .parse()
            .map_err(|_| EditorError::format(number, format!("bad number {field:?}")))
    };
    let byte = |field: &str| -> Result<u8> {
        u8::try_from(num(field)?)
            .map_err(|_| EditorError::format(number, format!("{field} does not fit a colour channel")))
    };

    let mut rich = RichChar::new(c as u32);
    rich.set_text_color(Color::rgba(byte(r)?, byte(g)?, byte(b)?, byte(a)?));
    rich.set_background_color(Color::rgba(byte(br)?, byte(bg)?, byte(bb)?, byte(ba)?));
    rich.set_font_size(
        u32::try_from(num(size)?).map_err(|_| EditorError::format(number, "font size too large"))?,
    );
    rich.set_font_id(num(id)? as usize);
    let flags = StyleFlags::from_bits(byte(flags)?)
        .ok_or_else(|| EditorError::format(number, format!("unknown style bits {flags}")))?;
    rich.set_style(flags);
    if link != NO_LINK {
        rich.set_link(Some(unescape_field(number, link)?));
    }
    Ok(rich)
}

// === Escaping ===

fn escape_link(link: &str) -> String {
    if link == NO_LINK {
        return "%2D".to_string();
    }
    escape_field(link)
}

fn escape_field(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    for c in field.chars() {
        match c {
            '%' => out.push_str("%25"),
            '|' => out.push_str("%7C"),
            ' ' => out.push_str("%20"),
            '\t' => out.push_str("%09"),
            '\n' => out.push_str("%0A"),
            '\r' => out.push_str("%0D"),
            c => out.push(c),
        }
    }
    out
}

fn unescape_field(number: usize, escaped: &str) -> Result<SmolStr> {
    let bytes = escaped.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = escaped
                .get(i + 1..i + 3)
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| EditorError::format(number, format!("bad escape in {escaped:?}")))?;
            out.push(hex);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out)
        .map(SmolStr::from)
        .map_err(|_| EditorError::format(number, "escaped field is not valid UTF-8"))
}
