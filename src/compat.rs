// CLASSIFICATION: COMMUNITY
// Filename: compat.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Kernel / platform compatibility matrix.
//!
//! Every gate is a named, pure rule over [`Facts`]. Rules are evaluated
//! in table order and the first violated `Abort` rule ends the run;
//! violated `Warn` rules are reported and evaluation continues.

use crate::error::AbortReason;
use crate::probe::{KernelVersion, Probe};

pub const API_T: u32 = 33;
pub const API_U: u32 = 34;
pub const API_V: u32 = 35;

/// Snapshot of everything the matrix looks at, gathered before any
/// mutating step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Facts {
    pub api_level: u32,
    pub kernel: KernelVersion,
    pub userspace_bits: u32,
    pub kernel_bits: u32,
    pub is_x86: bool,
    pub build_type: String,
}

impl Facts {
    pub fn gather(probe: &dyn Probe) -> Self {
        Self {
            api_level: probe.api_level(),
            kernel: probe.kernel_version(),
            userspace_bits: probe.userspace_bits(),
            kernel_bits: probe.kernel_bits(),
            is_x86: probe.is_x86(),
            build_type: probe.build_type(),
        }
    }

    pub fn at_least_api(&self, level: u32) -> bool {
        self.api_level >= level
    }
}

pub enum Severity {
    /// Log the message and keep going.
    Warn(&'static str),
    /// Stop the run with the produced reason.
    Abort(fn(&Facts) -> AbortReason),
}

pub struct Rule {
    pub name: &'static str,
    /// Returns `true` when the device fails this rule.
    pub violated: fn(&Facts) -> bool,
    pub severity: Severity,
}

fn t_kernel_too_old(f: &Facts) -> bool {
    f.at_least_api(API_T) && !f.kernel.at_least(4, 9, 0)
}

fn u_kernel_too_old(f: &Facts) -> bool {
    f.at_least_api(API_U) && !f.kernel.at_least(4, 14, 0)
}

fn v_kernel_too_old(f: &Facts) -> bool {
    f.at_least_api(API_V) && !f.kernel.at_least(4, 19, 0)
}

fn v_x86_kernel_32bit(f: &Facts) -> bool {
    f.at_least_api(API_V) && f.is_x86 && f.kernel_bits < 64
}

fn narrow_userspace_on_new_kernel(f: &Facts) -> bool {
    f.userspace_bits < f.kernel_bits && f.kernel.at_least(6, 2, 0)
}

fn unknown_build_type(f: &Facts) -> bool {
    !matches!(f.build_type.as_str(), "eng" | "user" | "userdebug")
}

/// The matrix, in evaluation order.
pub static RULES: &[Rule] = &[
    Rule {
        name: "t-min-kernel",
        violated: t_kernel_too_old,
        severity: Severity::Warn("Android T requires kernel 4.9."),
    },
    Rule {
        name: "u-min-kernel",
        violated: u_kernel_too_old,
        severity: Severity::Warn("Android U requires kernel 4.14."),
    },
    Rule {
        name: "v-min-kernel",
        violated: v_kernel_too_old,
        severity: Severity::Abort(|_| AbortReason::KernelTooOldForV),
    },
    Rule {
        name: "v-x86-kernel-64bit",
        violated: v_x86_kernel_32bit,
        severity: Severity::Abort(|_| AbortReason::X86KernelNot64Bit),
    },
    Rule {
        name: "userspace-width",
        violated: narrow_userspace_on_new_kernel,
        severity: Severity::Abort(|_| AbortReason::NarrowUserspace),
    },
    Rule {
        name: "build-type",
        violated: unknown_build_type,
        severity: Severity::Abort(|f| AbortReason::UnknownBuildType(f.build_type.clone())),
    },
];

/// Evaluate `rules` in order.
///
/// Returns the warnings raised before completion, or the reason of the
/// first violated abort rule.
pub fn evaluate(rules: &[Rule], facts: &Facts) -> Result<Vec<&'static str>, AbortReason> {
    let mut warnings = Vec::new();
    for rule in rules.iter().filter(|r| (r.violated)(facts)) {
        match rule.severity {
            Severity::Warn(msg) => warnings.push(msg),
            Severity::Abort(reason) => return Err(reason(facts)),
        }
    }
    Ok(warnings)
}

/// Exactly one of the two platform init scripts must be installed.
pub fn check_markers(has_old: bool, has_new: bool) -> Result<(), AbortReason> {
    match (has_old, has_new) {
        (false, false) => Err(AbortReason::MarkersMissing),
        (true, true) => Err(AbortReason::MarkersAmbiguous),
        _ => Ok(()),
    }
}
