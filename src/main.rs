//! compline - completion demo
//!
//! Serves the demo command tree through the hidden completion entry points.
//!
//! # Usage
//!
//! ```bash
//! source <(compline snippet bash)
//! compline modifier --multiparts dir/<TAB>
//! ```

use std::sync::Arc;

use compline::cli::{self, Completer, demo};
use compline::{Config, logging};

/// Application entry point
#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();

    let config = match Config::load("compline") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    // The log is diagnostic only, completion proceeds without it
    let _ = logging::init(&config, cli::requested_shell(&args));

    let completer = match Completer::new(demo::root(), Arc::new(config)) {
        Ok(completer) => completer,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let reply = completer.invoke(args).await;
    if reply.is_success() {
        print!("{}", reply.output);
    } else {
        eprintln!("{}", reply.output);
    }
    std::process::exit(reply.code);
}
