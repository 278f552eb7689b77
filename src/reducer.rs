//! Reducer worker: k-way merges every mapper's partition file for its
//! partition id, groups consecutive equal keys, and streams them into user
//! `Reduce` code.
//!
//! Algorithm (spec.md §4.3):
//! 1. List immediate subdirectories of `<nfs>/<jobId>/` (one per mapper); the
//!    candidate input for reducer `r` is `<subdir>/partition-r`.
//! 2. Merge them with a [`StreamMerger`] (missing/unreadable files are
//!    tolerated — a mapper may have emitted no keys for this partition).
//! 3. For every key, invoke user `Reduce` with the merger as its
//!    [`ReducerInput`], collecting emitted values.
//! 4. Write one `key,value` line per emitted value, in ascending key order,
//!    to `<outputDir>/reducer-<r>`.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::contracts::{Reducer, ReducerInput};
use crate::merger::StreamMerger;

#[cfg(unix)]
fn make_world_writable_dir(dir: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::create_dir_all(dir).with_context(|| format!("mkdir -p {}", dir.display()))?;
    fs::set_permissions(dir, fs::Permissions::from_mode(0o777)).with_context(|| format!("chmod 0777 {}", dir.display()))?;
    Ok(())
}

#[cfg(not(unix))]
fn make_world_writable_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("mkdir -p {}", dir.display()))
}

/// The candidate `partition-r` file under every immediate subdirectory of
/// `input_root`. Subdirectories without that file are simply absent from the
/// merger's input list (handled by [`StreamMerger::new`] as a missing file).
fn partition_file_paths(input_root: &Path, reducer_id: usize) -> Result<Vec<std::path::PathBuf>> {
    let mut paths = Vec::new();
    let entries = fs::read_dir(input_root).with_context(|| format!("read dir {}", input_root.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("read dir entry in {}", input_root.display()))?;
        if entry.file_type().with_context(|| format!("stat {}", entry.path().display()))?.is_dir() {
            paths.push(entry.path().join(format!("partition-{reducer_id}")));
        }
    }
    Ok(paths)
}

/// Run one reducer: merge every mapper's `partition-<reducer_id>` file under
/// `input_root`, apply `reducer`, and write `<output_dir>/reducer-<reducer_id>`.
pub fn run(reducer_id: usize, input_root: &Path, output_dir: &Path, reducer: &dyn Reducer) -> Result<()> {
    let paths = partition_file_paths(input_root, reducer_id)?;
    let mut merger = StreamMerger::new(&paths);

    let mut results: Vec<(String, Vec<String>)> = Vec::new();
    while merger.has_more() {
        let key = merger.key().to_string();
        let mut values = Vec::new();
        {
            let mut emit = |value: String| values.push(value);
            reducer.reduce(&mut merger, &mut emit);
        }
        results.push((key, values));
        merger.reset_group();
    }

    write_output(output_dir, reducer_id, &results)
}

fn write_output(output_dir: &Path, reducer_id: usize, results: &[(String, Vec<String>)]) -> Result<()> {
    make_world_writable_dir(output_dir)?;
    let path = output_dir.join(format!("reducer-{reducer_id}"));
    let file = File::create(&path).with_context(|| format!("create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for (key, values) in results {
        for value in values {
            writeln!(writer, "{key},{value}").with_context(|| format!("write to {}", path.display()))?;
        }
    }
    writer.flush().with_context(|| format!("flush {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wordcount::SumReducer;
    use std::fs;
    use tempfile::tempdir;

    fn write_partition(dir: &Path, mapper: &str, partition: usize, lines: &[&str]) {
        let mapper_dir = dir.join(mapper);
        fs::create_dir_all(&mapper_dir).unwrap();
        fs::write(mapper_dir.join(format!("partition-{partition}")), lines.join("\n") + "\n").unwrap();
    }

    #[test]
    fn merges_and_sums_across_mappers() {
        let dir = tempdir().unwrap();
        let input_root = dir.path().join("job");
        write_partition(&input_root, "mapper-0", 0, &["a,1", "a,1", "b,1"]);
        write_partition(&input_root, "mapper-1", 0, &["a,1", "c,1"]);

        let output_dir = dir.path().join("out");
        run(0, &input_root, &output_dir, &SumReducer).unwrap();

        let contents = fs::read_to_string(output_dir.join("reducer-0")).unwrap();
        let mut lines: Vec<&str> = contents.lines().collect();
        lines.sort();
        assert_eq!(lines, vec!["a,3", "b,1", "c,1"]);
    }

    #[test]
    fn tolerates_a_mapper_missing_this_partition() {
        let dir = tempdir().unwrap();
        let input_root = dir.path().join("job");
        write_partition(&input_root, "mapper-0", 0, &["a,1"]);
        // mapper-1 produced no keys for partition 0 at all.
        fs::create_dir_all(input_root.join("mapper-1")).unwrap();

        let output_dir = dir.path().join("out");
        run(0, &input_root, &output_dir, &SumReducer).unwrap();

        let contents = fs::read_to_string(output_dir.join("reducer-0")).unwrap();
        assert_eq!(contents.trim(), "a,1");
    }

    #[test]
    fn keys_in_output_are_ascending() {
        let dir = tempdir().unwrap();
        let input_root = dir.path().join("job");
        write_partition(&input_root, "mapper-0", 0, &["c,1", "a,1", "b,1"]);

        let output_dir = dir.path().join("out");
        run(0, &input_root, &output_dir, &SumReducer).unwrap();

        let contents = fs::read_to_string(output_dir.join("reducer-0")).unwrap();
        let keys: Vec<&str> = contents.lines().map(|l| l.split(',').next().unwrap()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }
}
