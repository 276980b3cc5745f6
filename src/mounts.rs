// CLASSIFICATION: COMMUNITY
// Filename: mounts.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Module version lookup from the mount table. Diagnostics only.
//!
//! A module is mounted twice from the same block device: once at its
//! plain mount point and once at `<mount point>@<version>`. The version
//! of the active module is the suffix of the second mount.

use std::fs;
use std::path::Path;

use log::{debug, info};

/// `(device, mount point)` from one `/proc/mounts` line.
fn fields(line: &str) -> Option<(&str, &str)> {
    let mut it = line.split(' ');
    let device = it.next()?;
    let mount_point = it.next()?;
    if device.is_empty() || mount_point.is_empty() {
        return None;
    }
    Some((device, mount_point))
}

/// Versions mounted from the same device as `mount_point`.
pub fn module_versions(mounts: &str, mount_point: &str) -> Vec<String> {
    let Some(device) = mounts
        .lines()
        .filter_map(fields)
        .find(|(_, mnt)| *mnt == mount_point)
        .map(|(dev, _)| dev)
    else {
        return Vec::new();
    };
    debug!("module {mount_point} mounted from blockdev {device}");

    let versioned = format!("{mount_point}@");
    mounts
        .lines()
        .filter_map(fields)
        .filter(|(dev, _)| *dev == device)
        .filter_map(|(_, mnt)| mnt.strip_prefix(versioned.as_str()))
        .map(str::to_owned)
        .collect()
}

/// Log the module version. Any failure is silently ignored.
pub fn log_module_version(mounts_path: &Path, mount_point: &str) {
    let Ok(text) = fs::read_to_string(mounts_path) else {
        return;
    };
    for version in module_versions(&text, mount_point) {
        info!("Tethering APEX version {version}");
    }
}
