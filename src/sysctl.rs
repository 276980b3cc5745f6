// CLASSIFICATION: COMMUNITY
// Filename: sysctl.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Writes to `/proc/sys` control files.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{error, info, warn};
use thiserror::Error;

use crate::probe::KernelVersion;

#[derive(Debug, Error)]
pub enum SysctlError {
    #[error("open({path:?}, O_WRONLY) -> {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("write({path:?}) -> {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("write({path:?}) -> short write [{written} of {expected}]")]
    ShortWrite {
        path: PathBuf,
        written: usize,
        expected: usize,
    },
}

/// Write `value` into an existing control file with a single `write(2)`.
///
/// The file is never created. Values should carry a trailing newline to
/// match `echo value > /proc/sys/...`.
pub fn write_proc_sys(path: &Path, value: &str) -> Result<(), SysctlError> {
    let mut file = OpenOptions::new()
        .write(true)
        .open(path)
        .map_err(|source| SysctlError::Open {
            path: path.to_path_buf(),
            source,
        })?;
    let written = file.write(value.as_bytes()).map_err(|source| SysctlError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    if written != value.len() {
        return Err(SysctlError::ShortWrite {
            path: path.to_path_buf(),
            written,
            expected: value.len(),
        });
    }
    Ok(())
}

/// A control file the loader sets, and the kernel from which the file is
/// guaranteed to exist.
#[derive(Debug, Clone, Copy)]
pub struct Setting {
    /// Relative to the sysctl root.
    pub key: &'static str,
    pub value: &'static str,
    pub required_from: KernelVersion,
}

/// eBPF knobs enabled on U and later.
pub const BPF_SETTINGS: &[Setting] = &[
    // 5.16 changed the default to 2 (disabled but changeable); the loader
    // needs 0. The file is known to be unwritable on some 4.19 kernels.
    Setting {
        key: "kernel/unprivileged_bpf_disabled",
        value: "0\n",
        required_from: KernelVersion::new(5, 13, 0),
    },
    // Absent without CONFIG_BPF_JIT.
    Setting {
        key: "net/core/bpf_jit_enable",
        value: "1\n",
        required_from: KernelVersion::new(4, 14, 0),
    },
    // JIT symbol export for privileged users only. Absent without
    // CONFIG_HAVE_EBPF_JIT.
    Setting {
        key: "net/core/bpf_jit_kallsyms",
        value: "1\n",
        required_from: KernelVersion::new(4, 14, 0),
    },
];

/// Apply `settings` under `root`, in order.
///
/// A failed write is fatal only when `kernel` is new enough that the
/// control file must exist.
pub fn apply(root: &Path, settings: &[Setting], kernel: KernelVersion) -> Result<(), SysctlError> {
    for setting in settings {
        let path = root.join(setting.key);
        match write_proc_sys(&path, setting.value) {
            Ok(()) => info!("set {} = {}", setting.key, setting.value.trim_end()),
            Err(e) if kernel >= setting.required_from => {
                error!("{e}");
                return Err(e);
            }
            Err(e) => warn!("{e} (tolerated on kernel {kernel})"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn sysctl_tree(root: &Path) {
        for s in BPF_SETTINGS {
            let p = root.join(s.key);
            fs::create_dir_all(p.parent().unwrap()).unwrap();
            fs::write(&p, "2\n").unwrap();
        }
    }

    #[test]
    fn writes_all_values() {
        let dir = tempdir().unwrap();
        sysctl_tree(dir.path());
        apply(dir.path(), BPF_SETTINGS, KernelVersion::new(6, 1, 0)).unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("kernel/unprivileged_bpf_disabled")).unwrap(),
            "0\n"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("net/core/bpf_jit_kallsyms")).unwrap(),
            "1\n"
        );
    }

    #[test]
    fn never_creates_missing_files() {
        let dir = tempdir().unwrap();
        let err = write_proc_sys(&dir.path().join("absent"), "1\n").unwrap_err();
        assert!(matches!(err, SysctlError::Open { .. }));
        assert!(!dir.path().join("absent").exists());
    }

    #[test]
    fn missing_file_tolerated_on_old_kernel() {
        let dir = tempdir().unwrap();
        // jit files only; unprivileged_bpf_disabled is missing
        for s in &BPF_SETTINGS[1..] {
            let p = dir.path().join(s.key);
            fs::create_dir_all(p.parent().unwrap()).unwrap();
            fs::write(&p, "0\n").unwrap();
        }
        apply(dir.path(), BPF_SETTINGS, KernelVersion::new(5, 10, 0)).unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("net/core/bpf_jit_enable")).unwrap(),
            "1\n"
        );
    }

    #[test]
    fn missing_file_fatal_on_new_kernel() {
        let dir = tempdir().unwrap();
        let err = apply(dir.path(), BPF_SETTINGS, KernelVersion::new(5, 13, 0)).unwrap_err();
        match err {
            SysctlError::Open { path, .. } => {
                assert!(path.ends_with("kernel/unprivileged_bpf_disabled"))
            }
            other => panic!("unexpected {other}"),
        }
    }

    #[test]
    fn jit_failure_escalates_from_4_14() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("kernel/unprivileged_bpf_disabled");
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(&p, "2\n").unwrap();
        assert!(apply(dir.path(), BPF_SETTINGS, KernelVersion::new(4, 9, 0)).is_ok());
        assert!(apply(dir.path(), BPF_SETTINGS, KernelVersion::new(4, 14, 0)).is_err());
    }
}
