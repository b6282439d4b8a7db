use std::io::{self, BufWriter};
use std::process::ExitCode;

use facial_pain_monitor::config::Config;
use facial_pain_monitor::logging::{init_tracing, LogConfig};
use facial_pain_monitor::replay::{ReplayError, Replayer};

fn run(config: &Config) -> Result<(), ReplayError> {
    let engine = config.engine_config()?;
    let mut replayer = Replayer::new(engine, config.coordinates)?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    replayer.replay(stdin.lock(), BufWriter::new(stdout.lock()))?;
    Ok(())
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let config = Config::from_env();

    if let Err(e) = init_tracing(&LogConfig {
        log_level: config.log_level.clone(),
        enable_file_logs: config.enable_file_logs,
        log_dir: config.log_dir.clone(),
    }) {
        eprintln!("Failed to initialize file logging: {e}");
        return ExitCode::FAILURE;
    }
    tracing::info!(?config, "Starting facial-pain-monitor");

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Replay failed");
            ExitCode::FAILURE
        }
    }
}
