// CLASSIFICATION: COMMUNITY
// Filename: identity.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Which copy of the loader is running.

use std::path::Path;

/// Role of the running binary, derived from its invocation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    /// Copy shipped in the base platform image.
    Platform,
    /// Copy shipped in the upgradable module.
    Module,
    Unknown,
}

impl Identity {
    /// Classify `invoked_as` against the two known loader paths.
    ///
    /// Comparison is byte-exact, not component-wise.
    pub fn resolve(invoked_as: &Path, platform_loader: &Path, module_loader: &Path) -> Self {
        let invoked_as = invoked_as.as_os_str();
        if invoked_as == module_loader.as_os_str() {
            Identity::Module
        } else if invoked_as == platform_loader.as_os_str() {
            Identity::Platform
        } else {
            Identity::Unknown
        }
    }
}
