// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Per-location object loading pass.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, error, info};
use thiserror::Error;

use crate::location::Location;

/// eBPF object inspection for the shipped loader.
pub mod elf;

pub use elf::ElfObjectLoader;

/// File name suffix of loadable objects.
pub const OBJECT_SUFFIX: &str = ".o";

/// Failure reported by an [`ObjectLoader`] for one object file.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct LoadError {
    /// Whether the owning subsystem cannot work without this object.
    pub critical: bool,
    pub message: String,
}

impl LoadError {
    pub fn critical(message: impl Into<String>) -> Self {
        Self {
            critical: true,
            message: message.into(),
        }
    }

    pub fn non_critical(message: impl Into<String>) -> Self {
        Self {
            critical: false,
            message: message.into(),
        }
    }
}

/// Creates and pins the kernel objects described by one object file.
pub trait ObjectLoader {
    fn load(&self, path: &Path, location: &Location) -> Result<(), LoadError>;
}

/// Result of one pass over a location.
#[derive(Debug, Default)]
pub struct PassReport {
    pub loaded: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, LoadError)>,
}

impl PassReport {
    /// A pass fails only if some object failed critically.
    pub fn is_success(&self) -> bool {
        !self.failed.iter().any(|(_, e)| e.critical)
    }
}

/// Loadable objects in `dir`, sorted by file name.
///
/// A missing or unreadable directory yields no objects: a module is free
/// not to ship anything for a location.
pub fn list_objects(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("skipping {}: {e}", dir.display());
            return Vec::new();
        }
    };
    let mut objects: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().ends_with(OBJECT_SUFFIX))
        .map(|e| e.path())
        .collect();
    objects.sort();
    objects
}

/// Load every object of `location` through `loader`.
///
/// Every object is attempted; failures are logged one by one.
pub fn load_location(loader: &dyn ObjectLoader, location: &Location) -> PassReport {
    let mut report = PassReport::default();
    for path in list_objects(location.source_dir()) {
        match loader.load(&path, location) {
            Ok(()) => {
                info!("Loaded object: {}", path.display());
                report.loaded.push(path);
            }
            Err(e) => {
                error!(
                    "Failed to load {}object: {}, ret: {e}",
                    if e.critical { "critical " } else { "" },
                    path.display()
                );
                report.failed.push((path, e));
            }
        }
    }
    report
}
