//! Per-document font list.
//!
//! Characters refer to fonts by index into this registry. The registry only
//! records names and file paths; loading glyphs is the renderer's business.

use smol_str::SmolStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontEntry {
    pub name: SmolStr,
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontRegistry {
    fonts: Vec<FontEntry>,
}

impl FontRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a font and return its id. Re-registering a name updates its
    /// path and keeps the existing id.
    pub fn register(&mut self, name: impl Into<SmolStr>, path: impl Into<String>) -> usize {
        let name = name.into();
        let path = path.into();
        if let Some(id) = self.id_of(&name) {
            self.fonts[id].path = path;
            return id;
        }
        self.fonts.push(FontEntry { name, path });
        self.fonts.len() - 1
    }

    pub fn id_of(&self, name: &str) -> Option<usize> {
        self.fonts.iter().position(|f| f.name == name)
    }

    pub fn get(&self, id: usize) -> Option<&FontEntry> {
        self.fonts.get(id)
    }

    pub fn name(&self, id: usize) -> Option<&str> {
        self.get(id).map(|f| f.name.as_str())
    }

    pub fn path(&self, id: usize) -> Option<&str> {
        self.get(id).map(|f| f.path.as_str())
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FontEntry> {
        self.fonts.iter()
    }
}
