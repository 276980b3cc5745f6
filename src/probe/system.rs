// CLASSIFICATION: COMMUNITY
// Filename: system.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

use std::ffi::CStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{info, warn};

use super::props::BuildProps;
use super::{KernelVersion, Probe};

const SDK_PROP: &str = "ro.build.version.sdk";
const BUILD_TYPE_PROP: &str = "ro.build.type";

/// Machines whose presence in `uname -m` implies a 64-bit kernel.
/// `armv8l`/`armv8b` are reported to 32-bit personalities on arm64.
const KERNEL_64BIT_MACHINES: &[&str] = &[
    "aarch64",
    "aarch64_be",
    "armv8l",
    "armv8b",
    "x86_64",
    "riscv64",
    "loongarch64",
    "mips64",
    "ppc64",
    "ppc64le",
    "s390x",
];

/// Probe for the device the loader is running on.
pub struct SystemProbe {
    props: BuildProps,
    release: Option<String>,
    machine: Option<String>,
}

impl SystemProbe {
    pub fn new(property_files: &[PathBuf]) -> Self {
        let uts = uname();
        if uts.is_none() {
            warn!("uname failed: {}", io::Error::last_os_error());
        }
        let (release, machine) = uts.unzip();
        Self {
            props: BuildProps::load(property_files),
            release,
            machine,
        }
    }
}

impl Probe for SystemProbe {
    fn exists(&self, path: &Path) -> io::Result<bool> {
        match fs::metadata(path) {
            Ok(_) => {
                info!("{} exists.", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn kernel_version(&self) -> KernelVersion {
        self.release
            .as_deref()
            .and_then(KernelVersion::parse)
            .unwrap_or_default()
    }

    fn api_level(&self) -> u32 {
        self.props
            .get(SDK_PROP)
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }

    fn build_type(&self) -> String {
        self.props.get(BUILD_TYPE_PROP).unwrap_or("unknown").to_owned()
    }

    fn kernel_bits(&self) -> u32 {
        match self.machine.as_deref() {
            Some(m) if KERNEL_64BIT_MACHINES.contains(&m) => 64,
            // No answer from uname: assume the kernel matches us.
            None => self.userspace_bits(),
            Some(_) => 32,
        }
    }
}

/// `(release, machine)` from `uname(2)`.
fn uname() -> Option<(String, String)> {
    // SAFETY: utsname is plain old data; uname fills it with
    // NUL-terminated strings on success.
    unsafe {
        let mut uts: libc::utsname = std::mem::zeroed();
        if libc::uname(&mut uts) != 0 {
            return None;
        }
        let release = CStr::from_ptr(uts.release.as_ptr()).to_string_lossy().into_owned();
        let machine = CStr::from_ptr(uts.machine.as_ptr()).to_string_lossy().into_owned();
        Some((release, machine))
    }
}
