// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Environment queries the boot decision depends on.
//!
//! Everything here is read-only. The orchestrator only sees the
//! [`Probe`] trait so the compatibility decision can be exercised
//! against canned answers.

use std::fmt;
use std::io;
use std::path::Path;

/// Build property file parsing.
pub mod props;

/// Live implementation backed by `uname(2)` and build properties.
pub mod system;

pub use system::SystemProbe;

/// Kernel version packed as `major << 24 | minor << 16 | min(sub, 255)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct KernelVersion(u32);

impl KernelVersion {
    pub const fn new(major: u32, minor: u32, sub: u32) -> Self {
        let sub = if sub > 255 { 255 } else { sub };
        KernelVersion((major << 24) | (minor << 16) | sub)
    }

    /// Parse a kernel release string such as `5.10.198-android13-4-g1f2e`.
    ///
    /// Missing trailing components count as zero; a release without a
    /// leading number yields `None`.
    pub fn parse(release: &str) -> Option<Self> {
        let numeric = |s: &str| -> Option<u32> {
            let digits: &str = &s[..s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len())];
            digits.parse().ok()
        };
        let mut parts = release.trim().splitn(3, '.');
        let major = numeric(parts.next()?)?;
        let minor = parts.next().and_then(numeric).unwrap_or(0);
        let sub = parts.next().and_then(numeric).unwrap_or(0);
        Some(Self::new(major, minor, sub))
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub fn at_least(self, major: u32, minor: u32, sub: u32) -> bool {
        self >= Self::new(major, minor, sub)
    }
}

impl fmt::Display for KernelVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.0 >> 24, (self.0 >> 16) & 0xff, self.0 & 0xff)
    }
}

impl fmt::LowerHex for KernelVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

/// Point queries about the running device.
pub trait Probe {
    /// Whether `path` exists. Errors other than "not found" are
    /// surfaced: they mean the loader cannot see its own markers.
    fn exists(&self, path: &Path) -> io::Result<bool>;

    fn kernel_version(&self) -> KernelVersion;

    /// Device API level (`ro.build.version.sdk`), 0 when unknown.
    fn api_level(&self) -> u32;

    /// Build variant (`ro.build.type`).
    fn build_type(&self) -> String;

    /// Pointer width of this process image.
    fn userspace_bits(&self) -> u32 {
        if cfg!(target_pointer_width = "64") {
            64
        } else {
            32
        }
    }

    /// Native width of the running kernel.
    fn kernel_bits(&self) -> u32;

    fn is_x86(&self) -> bool {
        cfg!(any(target_arch = "x86", target_arch = "x86_64"))
    }
}
