//! Output artifact collections.

use std::{collections::BTreeMap, path::Path};

use eyre::Result;

use crate::{File, GeneratedFile, WriteResult};

/// A set of rendered artifacts keyed by their relative output path.
///
/// Paths use `/` separators and iterate in lexical order, so two outputs built
/// from the same input compare and serialize identically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedOutput {
    files: BTreeMap<String, File>,
}

impl GeneratedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render a generated file and add it. A later insert for the same path wins.
    pub fn add(&mut self, file: &impl GeneratedFile) -> &mut Self {
        self.insert(file.to_file())
    }

    /// Add an already rendered file.
    pub fn insert(&mut self, file: File) -> &mut Self {
        let key = file.path().to_string_lossy().replace('\\', "/");
        self.files.insert(key, file);
        self
    }

    pub fn get(&self, path: &str) -> Option<&File> {
        self.files.get(path)
    }

    /// Content of the file at `path`, if present.
    pub fn content(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(File::content)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &File)> {
        self.files.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Write every file below `base`, returning the per-path outcome in path order.
    pub fn write_all(&self, base: &Path) -> Result<Vec<(String, WriteResult)>> {
        self.files
            .iter()
            .map(|(path, file)| Ok((path.clone(), file.write(base)?)))
            .collect()
    }
}
