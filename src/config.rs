// CLASSIFICATION: COMMUNITY
// Filename: config.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Loader configuration.
//!
//! Production runs use [`LoaderConfig::default`]. Test rigs can point
//! `NETBPFLOAD_CONFIG` at a YAML file that re-roots the filesystem paths;
//! any field left out keeps its production value. The loader identities,
//! init-script markers and hand-off target are platform contract and are
//! never read from the file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::location::{Location, LocationTable};

/// Environment variable naming an optional YAML override file.
pub const CONFIG_ENV: &str = "NETBPFLOAD_CONFIG";

const MODULE_MOUNT: &str = "/apex/com.android.tethering";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// One entry of the location table as written in configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LocationSpec {
    pub dir: PathBuf,
    #[serde(default)]
    pub prefix: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoaderConfig {
    /// argv[0] of the copy shipped in the base platform image.
    #[serde(skip)]
    pub platform_loader: PathBuf,
    /// argv[0] of the copy shipped in the upgradable module.
    #[serde(skip)]
    pub module_loader: PathBuf,
    /// Next-stage loader; also the pre-split fallback.
    #[serde(skip)]
    pub legacy_loader: PathBuf,
    /// Init script present on platforms released before the split.
    #[serde(skip)]
    pub old_marker: PathBuf,
    /// Init script present on platforms released after the split.
    #[serde(skip)]
    pub new_marker: PathBuf,
    pub module_mount_point: String,
    pub pin_root: PathBuf,
    pub sysctl_root: PathBuf,
    pub mounts_path: PathBuf,
    pub property_files: Vec<PathBuf>,
    /// Pin subdirectory with no source directory of its own.
    pub synthetic_prefix: String,
    pub critical_failure_delay_secs: u64,
    pub locations: Vec<LocationSpec>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        let bpf_dir = |sub: &str| PathBuf::from(format!("{MODULE_MOUNT}/etc/bpf/{sub}"));
        Self {
            platform_loader: "/system/bin/netbpfload".into(),
            module_loader: PathBuf::from(format!("{MODULE_MOUNT}/bin/netbpfload")),
            legacy_loader: "/system/bin/bpfloader".into(),
            old_marker: "/system/etc/init/bpfloader.rc".into(),
            new_marker: "/system/etc/init/netbpfload.rc".into(),
            module_mount_point: MODULE_MOUNT.into(),
            pin_root: "/sys/fs/bpf".into(),
            sysctl_root: "/proc/sys".into(),
            mounts_path: "/proc/mounts".into(),
            property_files: vec!["/system/build.prop".into()],
            synthetic_prefix: "loader".into(),
            critical_failure_delay_secs: 20,
            locations: vec![
                // tether offload, network_stack only
                LocationSpec { dir: bpf_dir(""), prefix: "tethering/".into() },
                // shared with netd & system server; netutils_wrapper may use xt_bpf
                LocationSpec { dir: bpf_dir("netd_shared/"), prefix: "netd_shared/".into() },
                // shared with netd (read only) & system server
                LocationSpec { dir: bpf_dir("netd_readonly/"), prefix: "netd_readonly/".into() },
                LocationSpec { dir: bpf_dir("net_shared/"), prefix: "net_shared/".into() },
                LocationSpec { dir: bpf_dir("net_private/"), prefix: "net_private/".into() },
            ],
        }
    }
}

impl LoaderConfig {
    pub fn from_yaml(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text, path)
    }

    /// Resolve the active configuration: the override named by
    /// [`CONFIG_ENV`] if set, production defaults otherwise.
    pub fn load_active() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load_file(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    /// Freeze the configured locations into the table used for the run.
    pub fn location_table(&self) -> LocationTable {
        LocationTable::new(
            self.locations
                .iter()
                .map(|spec| Location::new(spec.dir.clone(), spec.prefix.clone()))
                .collect(),
        )
    }

    pub fn critical_failure_delay(&self) -> Duration {
        Duration::from_secs(self.critical_failure_delay_secs)
    }
}
