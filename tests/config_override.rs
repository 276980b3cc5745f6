// CLASSIFICATION: COMMUNITY
// Filename: config_override.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

use netbpfload::config::{ConfigError, LoaderConfig, CONFIG_ENV};
use serial_test::serial;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
#[serial]
fn defaults_without_override() {
    std::env::remove_var(CONFIG_ENV);
    let cfg = LoaderConfig::load_active().unwrap();
    assert_eq!(cfg, LoaderConfig::default());
    assert_eq!(cfg.pin_root, PathBuf::from("/sys/fs/bpf"));
    assert_eq!(cfg.critical_failure_delay_secs, 20);
}

#[test]
#[serial]
fn override_file_reroots_paths() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("netbpfload.yaml");
    fs::write(
        &file,
        "pin_root: /tmp/rig/bpf\nsysctl_root: /tmp/rig/sys\nlegacy_loader: /data/x\nlocations:\n  - dir: /tmp/rig/objs/\n    prefix: rig/\n",
    )
    .unwrap();
    std::env::set_var(CONFIG_ENV, &file);
    let cfg = LoaderConfig::load_active();
    std::env::remove_var(CONFIG_ENV);

    let cfg = cfg.unwrap();
    assert_eq!(cfg.pin_root, PathBuf::from("/tmp/rig/bpf"));
    // hand-off target is fixed whatever the file says
    assert_eq!(cfg.legacy_loader, PathBuf::from("/system/bin/bpfloader"));
    let table = cfg.location_table();
    let only = table.iter().next().unwrap();
    assert_eq!(only.pin_prefix(), "rig/");
    assert_eq!(table.len(), 1);
}

#[test]
#[serial]
fn unreadable_override_is_an_error() {
    std::env::set_var(CONFIG_ENV, "/nonexistent/netbpfload.yaml");
    let cfg = LoaderConfig::load_active();
    std::env::remove_var(CONFIG_ENV);
    assert!(matches!(cfg, Err(ConfigError::Read { .. })));
}
