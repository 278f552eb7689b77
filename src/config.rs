//! Command-line surface and per-mode configuration.
//!
//! One binary, three roles, selected by `--mode`. `--mode` is parsed from a
//! raw string rather than a `clap` `ValueEnum` so an unrecognized value can
//! be reported with exit code 128 rather than clap's own usage-error exit
//! code (spec.md §6) — the CLI parser is an external collaborator we don't
//! redesign, but its exit-code contract for this one flag is load-bearing.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;

/// Raw command-line flags. Every field is optional here; [`Config::from_cli`]
/// enforces which flags are required for which `--mode`.
#[derive(Parser, Debug)]
#[command(name = "mapreduce", about = "Batch MapReduce runtime: controller, mapper, and reducer in one binary")]
pub struct Cli {
    /// Role to run: "master", "mapper", or "reducer".
    #[arg(long)]
    pub mode: String,

    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    #[arg(long, default_value = "/mnt/nfs")]
    pub nfs_path: PathBuf,

    #[arg(long)]
    pub file_range: Option<String>,

    #[arg(long, default_value_t = 1)]
    pub num_mappers: usize,

    #[arg(long, default_value_t = 1)]
    pub num_reducers: usize,

    #[arg(long)]
    pub reducer_id: Option<usize>,

    #[arg(long)]
    pub image: Option<String>,
}

/// The parsed role. An unrecognized `--mode` never becomes a `Mode` — the
/// caller matches on the raw string first so it can exit 128 directly (see
/// `src/bin/mapreduce.rs`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Master,
    Mapper,
    Reducer,
}

impl Mode {
    /// Parses the `--mode` value. Returns `None` on anything but the three
    /// recognized roles, which the caller turns into exit code 128.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "master" => Some(Mode::Master),
            "mapper" => Some(Mode::Mapper),
            "reducer" => Some(Mode::Reducer),
            _ => None,
        }
    }
}

/// Validated configuration for the controller role.
#[derive(Debug)]
pub struct MasterConfig {
    pub input_dir: PathBuf,
    pub nfs_path: PathBuf,
    pub image: String,
    pub num_mappers: usize,
    pub num_reducers: usize,
}

/// Validated configuration for the mapper role.
#[derive(Debug)]
pub struct MapperConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub file_range: String,
    pub num_reducers: usize,
}

/// Validated configuration for the reducer role.
#[derive(Debug)]
pub struct ReducerConfig {
    pub nfs_path: PathBuf,
    pub output_dir: PathBuf,
    pub reducer_id: usize,
}

/// Per-mode validated configuration, built from [`Cli`] once the mode is
/// known to be one of the three recognized roles.
#[derive(Debug)]
pub enum Config {
    Master(MasterConfig),
    Mapper(MapperConfig),
    Reducer(ReducerConfig),
}

impl Config {
    pub fn from_cli(mode: Mode, cli: Cli) -> Result<Self> {
        match mode {
            Mode::Master => Ok(Config::Master(MasterConfig {
                input_dir: cli.input_dir.context("--input-dir is required for --mode master")?,
                nfs_path: cli.nfs_path,
                image: cli.image.context("--image is required for --mode master")?,
                num_mappers: cli.num_mappers,
                num_reducers: cli.num_reducers,
            })),
            Mode::Mapper => Ok(Config::Mapper(MapperConfig {
                input_dir: cli.input_dir.context("--input-dir is required for --mode mapper")?,
                output_dir: cli.output_dir.context("--output-dir is required for --mode mapper")?,
                file_range: cli.file_range.context("--file-range is required for --mode mapper")?,
                num_reducers: cli.num_reducers,
            })),
            Mode::Reducer => Ok(Config::Reducer(ReducerConfig {
                nfs_path: cli.nfs_path,
                output_dir: cli.output_dir.context("--output-dir is required for --mode reducer")?,
                reducer_id: cli.reducer_id.context("--reducer-id is required for --mode reducer")?,
            })),
        }
    }
}

/// Validates the controller's config against cluster capacity (spec.md §4.5
/// step 2). `capacity` is the orchestrator's reported node count.
pub fn validate_master_config(config: &MasterConfig, capacity: usize) -> Result<()> {
    if capacity < 1 {
        bail!("cluster capacity must be at least 1, got {capacity}");
    }
    if config.num_mappers == 0 {
        bail!("--num-mappers must be at least 1");
    }
    if config.num_reducers == 0 {
        bail!("--num-reducers must be at least 1");
    }
    if config.num_mappers > capacity {
        bail!("--num-mappers ({}) exceeds cluster capacity ({capacity})", config.num_mappers);
    }
    if config.num_reducers > capacity {
        bail!("--num-reducers ({}) exceeds cluster capacity ({capacity})", config.num_reducers);
    }
    if config.image.trim().is_empty() {
        bail!("--image must not be empty");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_mode_does_not_parse() {
        assert_eq!(Mode::parse("other"), None);
        assert_eq!(Mode::parse(""), None);
        assert_eq!(Mode::parse("Master"), None);
    }

    #[test]
    fn recognized_modes_parse() {
        assert_eq!(Mode::parse("master"), Some(Mode::Master));
        assert_eq!(Mode::parse("mapper"), Some(Mode::Mapper));
        assert_eq!(Mode::parse("reducer"), Some(Mode::Reducer));
    }

    fn base_cli(mode: &str) -> Cli {
        Cli {
            mode: mode.to_string(),
            input_dir: None,
            output_dir: None,
            nfs_path: PathBuf::from("/mnt/nfs"),
            file_range: None,
            num_mappers: 1,
            num_reducers: 1,
            reducer_id: None,
            image: None,
        }
    }

    #[test]
    fn master_config_requires_input_dir_and_image() {
        let cli = base_cli("master");
        assert!(Config::from_cli(Mode::Master, cli).is_err());

        let mut cli = base_cli("master");
        cli.input_dir = Some(PathBuf::from("/in"));
        cli.image = Some("repo/image:tag".to_string());
        assert!(Config::from_cli(Mode::Master, cli).is_ok());
    }

    #[test]
    fn mapper_config_requires_file_range() {
        let mut cli = base_cli("mapper");
        cli.input_dir = Some(PathBuf::from("/in"));
        cli.output_dir = Some(PathBuf::from("/out"));
        assert!(Config::from_cli(Mode::Mapper, cli).is_err());

        cli.file_range = Some("book-0-1".to_string());
        assert!(Config::from_cli(Mode::Mapper, cli).is_ok());
    }

    #[test]
    fn reducer_config_requires_reducer_id_and_output_dir() {
        let cli = base_cli("reducer");
        assert!(Config::from_cli(Mode::Reducer, cli).is_err());

        let mut cli = base_cli("reducer");
        cli.output_dir = Some(PathBuf::from("/out"));
        cli.reducer_id = Some(0);
        assert!(Config::from_cli(Mode::Reducer, cli).is_ok());
    }

    #[test]
    fn master_validation_rejects_over_capacity() {
        let config = MasterConfig { input_dir: PathBuf::from("/in"), nfs_path: PathBuf::from("/mnt/nfs"), image: "img".to_string(), num_mappers: 5, num_reducers: 1 };
        assert!(validate_master_config(&config, 3).is_err());
        assert!(validate_master_config(&config, 5).is_ok());
    }

    #[test]
    fn master_validation_rejects_empty_image() {
        let config = MasterConfig { input_dir: PathBuf::from("/in"), nfs_path: PathBuf::from("/mnt/nfs"), image: "  ".to_string(), num_mappers: 1, num_reducers: 1 };
        assert!(validate_master_config(&config, 4).is_err());
    }
}
