// CLASSIFICATION: COMMUNITY
// Filename: lib.rs v0.1
// Date Modified: 2026-10-19
// Author: Lukas Bower

//! Boot-time eBPF loader orchestration.
//!
//! Decides whether this copy of the loader is authoritative, checks the
//! kernel against the platform release, prepares bpffs pin directories,
//! loads module-shipped objects and execs the platform bpfloader.

/// Kernel self-check via raw `bpf(2)`.
pub mod bpf;

/// Platform / kernel compatibility rules.
pub mod compat;

/// Paths and constants, with an optional YAML override.
pub mod config;

/// Abort reasons and exit codes.
pub mod error;

/// Process replacement.
pub mod handoff;

/// Platform vs module identity.
pub mod identity;

/// Object enumeration and per-location load pass.
pub mod loading;

/// Source directory / pin prefix table.
pub mod location;

/// Kernel log set-up.
pub mod logging;

/// Module version diagnostics from the mount table.
pub mod mounts;

/// Boot sequence.
pub mod orchestrator;

/// bpffs pin subdirectories.
pub mod pindir;

/// Environment queries.
pub mod probe;

/// `/proc/sys` writes.
pub mod sysctl;

pub use error::AbortReason;
pub use orchestrator::{BootResult, Orchestrator};
