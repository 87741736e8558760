//! Poll a Renault ZE vehicle and log its battery state.
//!
//! Usage:
//!   renault-ze [-c renault-ze.toml]
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::process;

use getopts::Options;
use renault_ze::{platform, SensorConfig};
use tracing::error;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "renault-ze.toml";

#[tokio::main]
async fn main() -> renault_ze::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("renault-ze");

    let mut opts = Options::new();
    opts.optopt("c", "config", "Path to the configuration file", "FILE");
    opts.optflag("h", "help", "Print this help");

    let matches = match opts.parse(args.iter().skip(1)) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("{e}");
            eprint!("{}", opts.usage(&format!("Usage: {program} [options]")));
            process::exit(2);
        }
    };
    if matches.opt_present("h") {
        print!("{}", opts.usage(&format!("Usage: {program} [options]")));
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let path = matches
        .opt_str("c")
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = SensorConfig::load(&path)?;

    let sensor = platform::setup_platform(&config).await.inspect_err(|e| {
        error!("Setup failed: {e}");
    })?;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Cannot listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };
    platform::run(&mut [sensor], config.scan_interval(), shutdown).await;
    Ok(())
}
