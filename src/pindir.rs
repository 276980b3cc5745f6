// CLASSIFICATION: COMMUNITY
// Filename: pindir.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! bpffs pin subdirectories.

use std::fs::{self, DirBuilder};
use std::io;
use std::os::unix::fs::{DirBuilderExt, PermissionsExt};
use std::path::{Path, PathBuf};

use log::{error, info};
use thiserror::Error;

use crate::location::LocationTable;

/// Sticky bit plus rwx for owner, group and other.
pub const PIN_DIR_MODE: u32 = 0o1777;

#[derive(Debug, Error)]
#[error("failed to create directory {path:?}: {source}")]
pub struct PinDirError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Clears the process umask until dropped.
struct UmaskCleared(libc::mode_t);

impl UmaskCleared {
    fn new() -> Self {
        // SAFETY: umask(2) always succeeds and touches no memory.
        Self(unsafe { libc::umask(0) })
    }
}

impl Drop for UmaskCleared {
    fn drop(&mut self) {
        // SAFETY: as above.
        unsafe { libc::umask(self.0) };
    }
}

/// mkdir(2) with the umask cleared, so the directory never exists with
/// a narrower mode than `mode`.
fn mkdir_unmasked(path: &Path, mode: u32) -> io::Result<()> {
    let _umask = UmaskCleared::new();
    DirBuilder::new().mode(mode).create(path)
}

/// Ensure `<root>/<prefix>` exists with [`PIN_DIR_MODE`].
///
/// An empty prefix names the root itself and is left alone. An existing
/// directory is accepted as is.
pub fn create_pin_subdir(root: &Path, prefix: &str) -> Result<(), PinDirError> {
    if prefix.is_empty() {
        return Ok(());
    }
    let path = root.join(prefix);
    let fail = |source: io::Error| {
        error!("Failed to create directory: {}, ret: {source}", path.display());
        PinDirError {
            path: path.clone(),
            source,
        }
    };
    match mkdir_unmasked(&path, PIN_DIR_MODE) {
        Ok(()) => {
            // umask is process-wide
            fs::set_permissions(&path, fs::Permissions::from_mode(PIN_DIR_MODE)).map_err(fail)?;
            info!("created {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(fail(e)),
    }
}

/// Create every pin subdirectory the table needs plus `extra`.
///
/// Stops at the first failure. Must complete before any object is
/// loaded: objects may pin into any location's subdirectory.
pub fn prepare_all(root: &Path, table: &LocationTable, extra: &str) -> Result<(), PinDirError> {
    table
        .pin_prefixes(extra)
        .try_for_each(|prefix| create_pin_subdir(root, prefix))
}
