//! Session log
//!
//! Completion replies go to stdout, so diagnostics can only be written to a
//! file. When logging is enabled every invocation appends to
//! [`Config::log_file`], each line carrying the requesting shell.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;

use crate::config::Config;
use crate::error::Result;

/// Timestamp followed by the shell name
struct ShellTimer {
    shell: String,
}

impl FormatTime for ShellTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        if self.shell.is_empty() {
            write!(w, "{now}")
        } else {
            write!(w, "{now} [{}]", self.shell)
        }
    }
}

/// Install the file logger when logging is enabled
///
/// # Arguments
/// * `config` - Process configuration
/// * `shell` - Shell of the current request, empty when there is none
///
/// # Returns
/// * `Result<bool>` - Whether a logger was installed
pub fn init(config: &Config, shell: &str) -> Result<bool> {
    if !config.logging.enabled {
        return Ok(false);
    }

    let path = config.log_file();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let level = LevelFilter::from_level(config.logging.level.to_tracing_level());
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_timer(ShellTimer {
            shell: shell.to_string(),
        })
        .try_init()
        .is_ok();
    Ok(installed)
}
