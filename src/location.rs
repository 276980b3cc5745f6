// CLASSIFICATION: COMMUNITY
// Filename: location.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Source directories of module-shipped eBPF objects and the bpffs
//! subdirectory each one pins into.

use std::path::{Path, PathBuf};

/// One independently upgradable collection of loadable objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    source_dir: PathBuf,
    pin_prefix: String,
}

impl Location {
    pub fn new(source_dir: impl Into<PathBuf>, pin_prefix: impl Into<String>) -> Self {
        Self {
            source_dir: source_dir.into(),
            pin_prefix: pin_prefix.into(),
        }
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Relative path under the pin root; empty means pin at the root.
    pub fn pin_prefix(&self) -> &str {
        &self.pin_prefix
    }
}

/// Ordered, immutable set of locations for one run.
///
/// Order encodes the sharing tier and is the order in which directories
/// are prepared and objects loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationTable {
    entries: Vec<Location>,
}

impl LocationTable {
    pub fn new(entries: Vec<Location>) -> Self {
        Self { entries }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Location> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every pin prefix the table needs, in table order, followed by
    /// `extra` (a subdirectory with no source directory of its own).
    pub fn pin_prefixes<'a>(&'a self, extra: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .map(Location::pin_prefix)
            .chain(std::iter::once(extra))
    }
}

impl<'a> IntoIterator for &'a LocationTable {
    type Item = &'a Location;
    type IntoIter = std::slice::Iter<'a, Location>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
