// CLASSIFICATION: COMMUNITY
// Filename: handoff.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Process replacement.

use std::ffi::OsString;
use std::io;
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::Command;

/// Environment forwarded across a hand-off, in original order.
pub type Environment = Vec<(OsString, OsString)>;

/// Replaces the running image with another loader.
pub trait ProcessReplacer {
    /// Exec `target` with `argv = [target]` and exactly `env`.
    ///
    /// Never returns on success; `Ok` is only produced by test doubles.
    fn replace(&self, target: &Path, env: &Environment) -> io::Result<()>;
}

/// `execve(2)` through [`CommandExt::exec`].
pub struct Execve;

impl ProcessReplacer for Execve {
    fn replace(&self, target: &Path, env: &Environment) -> io::Result<()> {
        let err = Command::new(target)
            .env_clear()
            .envs(env.iter().map(|(k, v)| (k, v)))
            .exec();
        Err(err)
    }
}
