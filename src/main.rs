use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use clap::Parser;
use tracing::Level;

use tasktree::cli::commands::Cli;
use tasktree::cli::handlers;
use tasktree::io::config_io;
use tasktree::model::config::{AppConfig, LogConfig};
use tasktree::tui::RunOptions;

fn main() {
    let cli = Cli::parse();

    let result = if cli.command.is_none() {
        run_tui(&cli)
    } else {
        init_stderr_logging();
        handlers::dispatch(cli)
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run_tui(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config: AppConfig = config_io::load_config(cli.config.as_deref())?;
    init_file_logging(&config.log)?;
    let data_path = config_io::resolve_data_path(cli.file.as_deref(), &config);
    tracing::info!(path = %data_path.display(), "starting");
    tasktree::tui::run(RunOptions {
        config,
        data_path,
        fresh: cli.new,
    })
}

/// The UI owns the terminal, so it only logs when a file is configured
fn init_file_logging(log: &LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let Some(path) = &log.file else {
        return Ok(());
    };
    let file = open_log_file(path)?;
    let level = log.level.parse::<Level>().unwrap_or(Level::INFO);
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}

fn init_stderr_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::WARN)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    File::options().create(true).append(true).open(path)
}
