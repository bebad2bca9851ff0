use crate::schema::{self, SchemaTree};
use crate::statics;
use crate::value::FormValue;
use anyhow::Context;
use indexmap::IndexMap;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// A loaded form schema document. The original bytes are kept so an
/// unmodified document saves back byte-for-byte.
#[derive(Debug, Clone)]
pub struct FormDocument {
    pub source_path: Option<PathBuf>,
    pub original_bytes: Vec<u8>,
    pub root: FormValue,
    baseline: FormValue,
    pub dirty: bool,
}

impl FormDocument {
    pub fn from_json5(text: &str) -> anyhow::Result<Self> {
        let root = FormValue::parse_json5(text).context("parsing JSON5")?;
        Ok(Self {
            source_path: None,
            original_bytes: text.as_bytes().to_vec(),
            baseline: root.clone(),
            root,
            dirty: false,
        })
    }

    pub fn load_path(path: &Path) -> anyhow::Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("reading {path:?}"))?;
        let text = std::str::from_utf8(&bytes).context("schema file is not valid UTF-8")?;
        let mut doc = Self::from_json5(text).with_context(|| format!("loading {path:?}"))?;
        doc.source_path = Some(path.to_path_buf());
        Ok(doc)
    }

    pub fn tree(&self) -> SchemaTree {
        SchemaTree::from_document(&self.root)
    }

    /// Members of the element at a dot-joined path.
    pub fn element(&self, path: &str) -> Option<&IndexMap<String, FormValue>> {
        let mut level = schema::schema_of_document(&self.root);
        let mut segments = path.split(statics::PATH_SEPARATOR).peekable();

        while let Some(name) = segments.next() {
            let (_, element) = schema::entries(level).into_iter().find(|(n, _)| *n == name)?;
            if segments.peek().is_none() {
                return element.as_object();
            }
            level = element.get(statics::SC_SCHEMA)?;
        }
        None
    }

    pub fn element_mut(&mut self, path: &str) -> Option<&mut IndexMap<String, FormValue>> {
        let mut level = schema::schema_of_document_mut(&mut self.root)?;
        let mut segments = path.split(statics::PATH_SEPARATOR).peekable();

        while let Some(name) = segments.next() {
            let element = schema::entry_mut(level, name)?;
            if segments.peek().is_none() {
                return element.as_object_mut();
            }
            level = element.get_mut(statics::SC_SCHEMA)?;
        }
        None
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Recompute `dirty`: clean when the value tree is back to its loaded state
    /// or regenerates the original bytes exactly.
    pub fn refresh_dirty(&mut self) {
        self.dirty = self.root != self.baseline && self.generate_bytes() != self.original_bytes;
    }

    /// Generate bytes regardless of current `dirty` state.
    pub fn generate_bytes(&self) -> Vec<u8> {
        self.to_json5_pretty().into_bytes()
    }

    pub fn to_json5_pretty(&self) -> String {
        self.root.to_json5_pretty()
    }

    pub fn save_bytes(&self) -> Vec<u8> {
        if !self.dirty {
            return self.original_bytes.clone();
        }
        self.generate_bytes()
    }

    pub fn save_to_path(&mut self, path: &Path) -> anyhow::Result<()> {
        let bytes = self.save_bytes();
        fs::write(path, &bytes).with_context(|| format!("writing {path:?}"))?;

        self.source_path = Some(path.to_path_buf());
        self.original_bytes = bytes;
        self.baseline = self.root.clone();
        self.dirty = false;
        Ok(())
    }
}
