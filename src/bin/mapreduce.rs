//! CLI entry point: one binary, three roles, dispatched by `--mode`.
//!
//! An unrecognized `--mode` exits 128 before any configuration validation
//! runs (spec.md §6) — this is checked ahead of `Config::from_cli` rather
//! than folded into its `anyhow::Result` error path, since that path always
//! maps to exit code 1.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use mapreduce::config::{Cli, Config, Mode};
use mapreduce::launcher::LocalProcessLauncher;
use mapreduce::wordcount::{SumReducer, WordCounter};
use mapreduce::{controller, mapper, reducer, FileRange};

pub fn main() -> ExitCode {
    run().unwrap_or_else(|error| {
        tracing::error!("{error:?}");
        ExitCode::FAILURE
    })
}

fn run() -> Result<ExitCode> {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    let cli = Cli::parse();
    let Some(mode) = Mode::parse(&cli.mode) else {
        tracing::error!(mode = %cli.mode, "unrecognized --mode");
        return Ok(ExitCode::from(128));
    };

    dispatch(mode, cli)?;
    Ok(ExitCode::SUCCESS)
}

fn dispatch(mode: Mode, cli: Cli) -> Result<()> {
    let config = Config::from_cli(mode, cli)?;
    match config {
        Config::Master(cfg) => {
            let launcher = LocalProcessLauncher::new();
            let timestamp = chrono::Utc::now().format("%Y-%m-%d-%H-%M-%S").to_string();
            let timings = controller::run(&timestamp, &cfg, &launcher)?;
            timings.print();
        }
        Config::Mapper(cfg) => {
            let range = FileRange::parse(&cfg.file_range)?;
            mapper::run(&cfg.input_dir, &cfg.output_dir, &range, cfg.num_reducers, &WordCounter)?;
        }
        Config::Reducer(cfg) => {
            reducer::run(cfg.reducer_id, &cfg.nfs_path, &cfg.output_dir, &SumReducer)?;
        }
    }
    Ok(())
}
