// CLASSIFICATION: COMMUNITY
// Filename: main.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Entry point for the netbpfload binary.

use std::path::PathBuf;

use anyhow::Context;
use log::error;

use netbpfload::bpf::ArrayMapSelfCheck;
use netbpfload::config::LoaderConfig;
use netbpfload::error::STARTUP_FAILURE_EXIT;
use netbpfload::handoff::{Environment, Execve};
use netbpfload::loading::ElfObjectLoader;
use netbpfload::probe::SystemProbe;
use netbpfload::{logging, Orchestrator};

fn load_config() -> anyhow::Result<LoaderConfig> {
    LoaderConfig::load_active().context("loading netbpfload configuration")
}

fn main() {
    logging::init();

    let invoked_as = std::env::args_os().next().map(PathBuf::from).unwrap_or_default();
    let env: Environment = std::env::vars_os().collect();

    let config = match load_config() {
        Ok(cfg) => cfg,
        Err(err) => {
            error!("{err:#}");
            std::process::exit(STARTUP_FAILURE_EXIT);
        }
    };
    let locations = config.location_table();
    let probe = SystemProbe::new(&config.property_files);
    let loader = ElfObjectLoader::new(config.pin_root.clone());

    let result = Orchestrator::new(
        &config,
        &locations,
        &probe,
        &loader,
        &ArrayMapSelfCheck,
        &Execve,
    )
    .run(&invoked_as, &env);
    std::process::exit(result.exit_code());
}
