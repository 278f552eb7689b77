//! # mapreduce
//!
//! A **batch MapReduce runtime** for Rust: a controller partitions a corpus of
//! input files across a fleet of mapper workers, shuffles intermediate
//! key-value pairs through a shared filesystem into per-reducer partitions,
//! and merges per-partition inputs through reducer workers into final
//! per-reducer output files.
//!
//! ## Architecture
//!
//! Three roles, dispatched from a single binary by `--mode`:
//!
//! - **Controller** ([`controller`]) - validates configuration, partitions
//!   inputs into file ranges, launches mappers, waits for the map phase to
//!   complete, launches reducers, waits for the reduce phase to complete, and
//!   reports phase timings.
//! - **Mapper** ([`mapper`]) - reads an assigned file range, applies a
//!   user [`Mapper`](contracts::Mapper), hash-partitions intermediate pairs
//!   with FNV-1a-32, and writes sorted per-partition spill files.
//! - **Reducer** ([`reducer`]) - performs a k-way external merge
//!   ([`merger::StreamMerger`]) across every mapper's spill for its
//!   partition, groups consecutive equal keys, and streams them into a user
//!   [`Reducer`](contracts::Reducer).
//!
//! Workers never share memory: they coordinate only through files on the
//! shared filesystem, write-partitioned by worker id so no locking is
//! required. The only synchronization point is the controller's phase
//! barrier, which ensures no reducer observes a partial mapper output.
//!
//! ## Quick Start
//!
//! ```no_run
//! use mapreduce::config::MasterConfig;
//! use mapreduce::controller;
//! use mapreduce::launcher::LocalProcessLauncher;
//! # use anyhow::Result;
//!
//! # fn main() -> Result<()> {
//! let cfg = MasterConfig {
//!     input_dir: "./input".into(),
//!     nfs_path: "./nfs".into(),
//!     image: "mapreduce:latest".into(),
//!     num_mappers: 2,
//!     num_reducers: 2,
//! };
//!
//! let launcher = LocalProcessLauncher::new();
//! let timings = controller::run("2024-01-01-00-00-00", &cfg, &launcher)?;
//! timings.log();
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`config`] - CLI surface and validated per-mode configuration
//! - [`contracts`] - `Mapper`/`Reducer`/`MapInput`/`ReducerInput` traits
//! - [`job`] - `FileRange` parsing and input-file partitioning
//! - [`hashing`] - FNV-1a-32 key partitioner
//! - [`merger`] - k-way heap-based stream merger (the shuffle's read side)
//! - [`mapper`] - mapper worker entry point
//! - [`reducer`] - reducer worker entry point
//! - [`launcher`] - abstract task launcher + local-process backend
//! - [`controller`] - phase sequencing and the job barrier
//! - [`metrics`] - phase timing collection and reporting
//! - [`wordcount`] - the bundled example `Mapper`/`Reducer` pair
//! - [`testing`] - fixtures and assertions for exercising the pipeline in tests

pub mod config;
pub mod contracts;
pub mod controller;
pub mod hashing;
pub mod job;
pub mod launcher;
pub mod mapper;
pub mod merger;
pub mod metrics;
pub mod reducer;
pub mod testing;
pub mod wordcount;

pub use config::{Cli, Config, Mode};
pub use contracts::{MapInput, Mapper, Reducer, ReducerInput};
pub use job::{FileRange, Job};
pub use launcher::{Launcher, TaskSpec, TaskStatus};
pub use merger::StreamMerger;
pub use metrics::PhaseTimings;
