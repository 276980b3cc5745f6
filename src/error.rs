// CLASSIFICATION: COMMUNITY
// Filename: error.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Abort reasons and their fixed process exit codes.

use std::path::PathBuf;

use thiserror::Error;

use crate::bpf::SelfCheckError;
use crate::pindir::PinDirError;
use crate::sysctl::SysctlError;

/// Broad classification of an abort, used for log triage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Configuration,
    Compatibility,
    Resource,
    CriticalLoad,
    InvariantViolation,
    Handoff,
}

/// Every way a boot run can end without handing off.
///
/// Each variant maps to exactly one exit code; the boot supervisor keys
/// its fallback decisions off these values so they must never be reused.
#[derive(Debug, Error)]
pub enum AbortReason {
    #[error("unable to determine if we're platform or mainline loader (invoked as {0:?})")]
    UnknownIdentity(String),
    #[error("unable to find platform's bpfloader & netbpfload init scripts")]
    MarkersMissing,
    #[error("platform has *both* bpfloader & netbpfload init scripts")]
    MarkersAmbiguous,
    #[error("cannot probe marker {path:?}: {source}")]
    MarkerProbe {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Android V requires kernel 4.19")]
    KernelTooOldForV,
    #[error("Android V requires X86 kernel to be 64-bit")]
    X86KernelNot64Bit,
    #[error("64-bit userspace required on 6.2+ kernels")]
    NarrowUserspace,
    #[error("failed to determine the build type: got {0:?}, want 'eng', 'user', or 'userdebug'")]
    UnknownBuildType(String),
    #[error(transparent)]
    Sysctl(#[from] SysctlError),
    #[error(transparent)]
    PinDir(#[from] PinDirError),
    #[error("critical failure loading BPF programs from {0:?}")]
    CriticalLoad(PathBuf),
    #[error(transparent)]
    SelfCheck(#[from] SelfCheckError),
    #[error("execve({path:?}) failed: {source}")]
    Handoff {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AbortReason {
    /// Process exit code reported to the boot supervisor.
    pub fn exit_code(&self) -> i32 {
        match self {
            AbortReason::UnknownIdentity(_) => 1,
            AbortReason::CriticalLoad(_) => 2,
            AbortReason::MarkersMissing => 3,
            AbortReason::MarkersAmbiguous => 4,
            AbortReason::MarkerProbe { .. } => 5,
            AbortReason::KernelTooOldForV => 6,
            AbortReason::X86KernelNot64Bit => 7,
            AbortReason::NarrowUserspace => 8,
            AbortReason::UnknownBuildType(_) => 9,
            AbortReason::Sysctl(_) => 10,
            AbortReason::PinDir(_) => 11,
            AbortReason::SelfCheck(_) => 12,
            AbortReason::Handoff { .. } => 13,
        }
    }

    pub fn category(&self) -> Category {
        match self {
            AbortReason::UnknownIdentity(_)
            | AbortReason::MarkersMissing
            | AbortReason::MarkersAmbiguous
            | AbortReason::MarkerProbe { .. } => Category::Configuration,
            AbortReason::KernelTooOldForV
            | AbortReason::X86KernelNot64Bit
            | AbortReason::NarrowUserspace
            | AbortReason::UnknownBuildType(_) => Category::Compatibility,
            AbortReason::Sysctl(_) | AbortReason::PinDir(_) => Category::Resource,
            AbortReason::CriticalLoad(_) => Category::CriticalLoad,
            AbortReason::SelfCheck(_) => Category::InvariantViolation,
            AbortReason::Handoff { .. } => Category::Handoff,
        }
    }
}

/// Exit code used when the binary cannot even assemble its configuration.
pub const STARTUP_FAILURE_EXIT: i32 = 20;
