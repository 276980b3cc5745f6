// CLASSIFICATION: COMMUNITY
// Filename: logging.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Logger set-up for headless boot.
//!
//! Records go to the kernel log when `/dev/kmsg` is writable so they
//! survive in `dmesg` and pstore; stderr is the fallback.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use env_logger::{Builder, Env, Target};
use log::Level;

pub const LOG_TAG: &str = "NetBpfLoad";

const KMSG: &str = "/dev/kmsg";

/// syslog priority prefix understood by `/dev/kmsg`.
fn kmsg_priority(level: Level) -> u8 {
    match level {
        Level::Error => 3,
        Level::Warn => 4,
        Level::Info => 6,
        Level::Debug | Level::Trace => 7,
    }
}

/// Install the global logger. `RUST_LOG` overrides the `info` default.
pub fn init() {
    init_with(Path::new(KMSG));
}

fn init_with(kmsg: &Path) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    match OpenOptions::new().write(true).open(kmsg) {
        Ok(file) => {
            builder
                .target(Target::Pipe(Box::new(file)))
                .format(|buf, record| {
                    writeln!(
                        buf,
                        "<{}>{LOG_TAG}: {}",
                        kmsg_priority(record.level()),
                        record.args()
                    )
                });
        }
        Err(_) => {
            builder.format(|buf, record| {
                writeln!(buf, "{LOG_TAG} {}: {}", record.level(), record.args())
            });
        }
    }
    let _ = builder.try_init();
}
