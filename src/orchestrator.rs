// CLASSIFICATION: COMMUNITY
// Filename: orchestrator.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19
//
// ─────────────────────────────────────────────────────────────
// Boot orchestrator
//
// One run, one decision:
//
//  1. Resolve which copy of the loader is running.
//  2. Check the platform init-script markers; the platform copy
//     hands off to the module copy, a module on a pre-split
//     platform hands off to the legacy loader.
//  3. Apply the compatibility matrix.
//  4. Enable eBPF sysctls (U+), create every pin directory.
//  5. Load each location in table order; the first critical
//     failure stops the boot.
//  6. Kernel self-check, then exec the platform bpfloader.
//
// Nothing before step 4 mutates the system.
// ─────────────────────────────────────────────────────────────

use std::path::Path;

use log::{error, info, warn};

use crate::bpf::SelfCheck;
use crate::compat::{self, Facts, API_U, RULES};
use crate::config::LoaderConfig;
use crate::error::AbortReason;
use crate::handoff::{Environment, ProcessReplacer};
use crate::identity::Identity;
use crate::loading::{self, ObjectLoader};
use crate::location::LocationTable;
use crate::probe::Probe;
use crate::{mounts, pindir, sysctl};

/// Terminal status of a run.
#[derive(Debug)]
pub enum BootResult {
    /// The hand-off returned. Only reachable with a test replacer.
    Continue,
    Abort(AbortReason),
}

impl BootResult {
    pub fn exit_code(&self) -> i32 {
        match self {
            BootResult::Continue => 0,
            BootResult::Abort(reason) => reason.exit_code(),
        }
    }
}

/// Everything a run needs, borrowed for its duration.
pub struct Orchestrator<'a> {
    config: &'a LoaderConfig,
    locations: &'a LocationTable,
    probe: &'a dyn Probe,
    loader: &'a dyn ObjectLoader,
    self_check: &'a dyn SelfCheck,
    replacer: &'a dyn ProcessReplacer,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        config: &'a LoaderConfig,
        locations: &'a LocationTable,
        probe: &'a dyn Probe,
        loader: &'a dyn ObjectLoader,
        self_check: &'a dyn SelfCheck,
        replacer: &'a dyn ProcessReplacer,
    ) -> Self {
        Self {
            config,
            locations,
            probe,
            loader,
            self_check,
            replacer,
        }
    }

    /// Run the boot sequence as if invoked as `invoked_as` with `env`.
    pub fn run(&self, invoked_as: &Path, env: &Environment) -> BootResult {
        match self.boot(invoked_as, env) {
            Ok(()) => BootResult::Continue,
            Err(reason) => {
                error!("{reason} [exit {}, {:?}]", reason.exit_code(), reason.category());
                BootResult::Abort(reason)
            }
        }
    }

    fn marker(&self, path: &Path) -> Result<bool, AbortReason> {
        self.probe.exists(path).map_err(|source| AbortReason::MarkerProbe {
            path: path.to_path_buf(),
            source,
        })
    }

    fn boot(&self, invoked_as: &Path, env: &Environment) -> Result<(), AbortReason> {
        let cfg = self.config;
        info!("NetBpfLoad '{}' starting...", invoked_as.display());

        let identity = Identity::resolve(invoked_as, &cfg.platform_loader, &cfg.module_loader);
        if identity == Identity::Unknown {
            return Err(AbortReason::UnknownIdentity(invoked_as.display().to_string()));
        }

        // bpfloader.rc: last shipped in U QPR2 beta 1
        let has_old_marker = self.marker(&cfg.old_marker)?;
        // netbpfload.rc: first shipped in U QPR2 beta 2
        let has_new_marker = self.marker(&cfg.new_marker)?;
        let facts = Facts::gather(self.probe);
        info!(
            "NetBpfLoad api:{} kver:{:07x} ({}) {:?} rc:{}{} build:{}",
            facts.api_level,
            facts.kernel,
            facts.kernel,
            identity,
            u8::from(has_old_marker),
            u8::from(has_new_marker),
            facts.build_type
        );

        compat::check_markers(has_old_marker, has_new_marker)?;

        if identity == Identity::Platform {
            info!("Executing apex netbpfload...");
            return self.hand_off(&cfg.module_loader, env);
        }

        mounts::log_module_version(&cfg.mounts_path, &cfg.module_mount_point);

        if has_old_marker && !has_new_marker {
            // Module started by its own init script on a platform that
            // predates the split; the platform bpfloader does everything.
            info!("pre-split platform, deferring to {}", cfg.legacy_loader.display());
            return self.hand_off(&cfg.legacy_loader, env);
        }

        for warning in compat::evaluate(RULES, &facts)? {
            warn!("{warning}");
        }

        if facts.at_least_api(API_U) {
            sysctl::apply(&cfg.sysctl_root, sysctl::BPF_SETTINGS, facts.kernel)?;
        }

        // All pin directories first: objects may pin across locations.
        pindir::prepare_all(&cfg.pin_root, self.locations, &cfg.synthetic_prefix)?;

        for location in self.locations {
            let report = loading::load_location(self.loader, location);
            if !report.is_success() {
                let dir = location.source_dir();
                error!("=== CRITICAL FAILURE LOADING BPF PROGRAMS FROM {} ===", dir.display());
                error!("If this triggers reliably, you're probably missing kernel options or patches.");
                error!(
                    "If this triggers randomly, you might be hitting some memory allocation \
                     problems or startup script race."
                );
                error!("--- DO NOT EXPECT SYSTEM TO BOOT SUCCESSFULLY ---");
                std::thread::sleep(cfg.critical_failure_delay());
                return Err(AbortReason::CriticalLoad(dir.to_path_buf()));
            }
        }

        self.self_check.run()?;

        info!("done, transferring control to platform bpfloader.");
        self.hand_off(&cfg.legacy_loader, env)
    }

    fn hand_off(&self, target: &Path, env: &Environment) -> Result<(), AbortReason> {
        self.replacer
            .replace(target, env)
            .map_err(|source| AbortReason::Handoff {
                path: target.to_path_buf(),
                source,
            })
    }
}
