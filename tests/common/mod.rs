// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Shared rig for boot-sequence tests: a temp-rooted config and test
//! doubles that record what the orchestrator asked of them.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use netbpfload::bpf::{SelfCheck, SelfCheckError};
use netbpfload::config::{LoaderConfig, LocationSpec};
use netbpfload::handoff::{Environment, ProcessReplacer};
use netbpfload::loading::{LoadError, ObjectLoader};
use netbpfload::location::Location;
use netbpfload::probe::{KernelVersion, Probe};
use netbpfload::sysctl::BPF_SETTINGS;
use netbpfload::{BootResult, Orchestrator};
use tempfile::TempDir;

pub struct FakeProbe {
    pub existing: HashSet<PathBuf>,
    pub unreadable: HashSet<PathBuf>,
    pub kernel: KernelVersion,
    pub api_level: u32,
    pub build_type: String,
    pub userspace_bits: u32,
    pub kernel_bits: u32,
}

impl Probe for FakeProbe {
    fn exists(&self, path: &Path) -> io::Result<bool> {
        if self.unreadable.contains(path) {
            return Err(io::Error::from(io::ErrorKind::PermissionDenied));
        }
        Ok(self.existing.contains(path))
    }

    fn kernel_version(&self) -> KernelVersion {
        self.kernel
    }

    fn api_level(&self) -> u32 {
        self.api_level
    }

    fn build_type(&self) -> String {
        self.build_type.clone()
    }

    fn userspace_bits(&self) -> u32 {
        self.userspace_bits
    }

    fn kernel_bits(&self) -> u32 {
        self.kernel_bits
    }

    fn is_x86(&self) -> bool {
        false
    }
}

/// Fails objects whose file name starts with `crit` (critically) or
/// `soft` (non-critically).
#[derive(Default)]
pub struct RecordingLoader {
    pub calls: RefCell<Vec<(PathBuf, String)>>,
}

impl ObjectLoader for RecordingLoader {
    fn load(&self, path: &Path, location: &Location) -> Result<(), LoadError> {
        self.calls
            .borrow_mut()
            .push((path.to_path_buf(), location.pin_prefix().to_owned()));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        if name.starts_with("crit") {
            Err(LoadError::critical("EPERM"))
        } else if name.starts_with("soft") {
            Err(LoadError::non_critical("ENOENT"))
        } else {
            Ok(())
        }
    }
}

pub struct FakeSelfCheck {
    pub healthy: bool,
    pub runs: RefCell<u32>,
}

impl SelfCheck for FakeSelfCheck {
    fn run(&self) -> Result<(), SelfCheckError> {
        *self.runs.borrow_mut() += 1;
        if self.healthy {
            Ok(())
        } else {
            Err(SelfCheckError::MapWrite(io::Error::from_raw_os_error(libc::EINVAL)))
        }
    }
}

/// Records every hand-off; optionally fails it like a missing binary.
#[derive(Default)]
pub struct RecordingReplacer {
    pub fail: bool,
    pub calls: RefCell<Vec<(PathBuf, Environment)>>,
}

impl ProcessReplacer for RecordingReplacer {
    fn replace(&self, target: &Path, env: &Environment) -> io::Result<()> {
        self.calls
            .borrow_mut()
            .push((target.to_path_buf(), env.clone()));
        if self.fail {
            Err(io::Error::from(io::ErrorKind::NotFound))
        } else {
            Ok(())
        }
    }
}

pub struct Rig {
    pub root: TempDir,
    pub config: LoaderConfig,
    pub probe: FakeProbe,
    pub loader: RecordingLoader,
    pub self_check: FakeSelfCheck,
    pub replacer: RecordingReplacer,
    pub env: Environment,
}

impl Rig {
    /// A healthy post-split V device on a 6.1 kernel with three
    /// locations, module copy running.
    pub fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let root = tempfile::tempdir().unwrap();
        let r = root.path();
        let pin_root = r.join("sys/fs/bpf");
        let sysctl_root = r.join("proc/sys");
        fs::create_dir_all(&pin_root).unwrap();
        for s in BPF_SETTINGS {
            let p = sysctl_root.join(s.key);
            fs::create_dir_all(p.parent().unwrap()).unwrap();
            fs::write(&p, "2\n").unwrap();
        }

        let config = LoaderConfig {
            pin_root,
            sysctl_root,
            mounts_path: r.join("proc/mounts"),
            property_files: Vec::new(),
            critical_failure_delay_secs: 0,
            locations: ["l1", "l2", "l3"]
                .iter()
                .map(|n| LocationSpec {
                    dir: r.join("apex/etc/bpf").join(n),
                    prefix: format!("{n}/"),
                })
                .collect(),
            ..LoaderConfig::default()
        };

        let mut existing = HashSet::new();
        existing.insert(config.new_marker.clone());

        Self {
            root,
            config,
            probe: FakeProbe {
                existing,
                unreadable: HashSet::new(),
                kernel: KernelVersion::new(6, 1, 75),
                api_level: 35,
                build_type: "userdebug".into(),
                userspace_bits: 64,
                kernel_bits: 64,
            },
            loader: RecordingLoader::default(),
            self_check: FakeSelfCheck {
                healthy: true,
                runs: RefCell::new(0),
            },
            replacer: RecordingReplacer::default(),
            env: vec![
                ("PATH".into(), "/system/bin".into()),
                ("ANDROID_ROOT".into(), "/system".into()),
            ],
        }
    }

    pub fn source_dir(&self, idx: usize) -> PathBuf {
        self.config.locations[idx].dir.clone()
    }

    /// Drop empty object files into location `idx`.
    pub fn ship(&self, idx: usize, names: &[&str]) {
        let dir = self.source_dir(idx);
        fs::create_dir_all(&dir).unwrap();
        for n in names {
            fs::write(dir.join(n), b"").unwrap();
        }
    }

    pub fn set_markers(&mut self, old: bool, new: bool) {
        for (path, present) in [
            (self.config.old_marker.clone(), old),
            (self.config.new_marker.clone(), new),
        ] {
            if present {
                self.probe.existing.insert(path);
            } else {
                self.probe.existing.remove(&path);
            }
        }
    }

    pub fn run_as(&self, invoked_as: &Path) -> BootResult {
        let table = self.config.location_table();
        Orchestrator::new(
            &self.config,
            &table,
            &self.probe,
            &self.loader,
            &self.self_check,
            &self.replacer,
        )
        .run(invoked_as, &self.env)
    }

    pub fn run_module(&self) -> BootResult {
        let module = self.config.module_loader.clone();
        self.run_as(&module)
    }

    /// Names of directories created under the pin root.
    pub fn pin_dirs(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(&self.config.pin_root)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    pub fn handoffs(&self) -> Vec<PathBuf> {
        self.replacer
            .calls
            .borrow()
            .iter()
            .map(|(p, _)| p.clone())
            .collect()
    }

    pub fn loaded_names(&self) -> Vec<String> {
        self.loader
            .calls
            .borrow()
            .iter()
            .map(|(p, _)| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }
}
