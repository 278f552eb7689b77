//! Mapper worker: reads an assigned file range, applies user `Map` code,
//! hash-partitions intermediate pairs, and writes sorted per-partition
//! spills.
//!
//! Algorithm (spec.md §4.2):
//! 1. Parse the `--file-range` descriptor.
//! 2. Create the output directory (recursive, `0777`).
//! 3. Read each assigned input file line by line, invoking user `Map` with
//!    one [`crate::contracts::TextInput`] per line.
//! 4. Accumulate `key -> [values...]` in emit order, keyed in a `BTreeMap` so
//!    the final iteration is already lexicographically sorted by key.
//! 5. For each key in ascending order, partition by `fnv1a32(key) mod R` and
//!    append its values to that partition's writer — since the outer
//!    iteration is globally sorted, each partition file ends up with
//!    non-decreasing keys too.
//!
//! Partition files are opened with `File::create` (truncate), not append —
//! the redesign flag in `SPEC_FULL.md` §11 avoiding duplicate data if a
//! worker were ever restarted.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::contracts::{Mapper, TextInput};
use crate::hashing::partition_for_key;
use crate::job::FileRange;

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

/// Run one mapper: read `file_range` from `input_dir`, apply `mapper`, and
/// write `num_reducers` partition files under `output_dir`.
pub fn run(input_dir: &Path, output_dir: &Path, file_range: &FileRange, num_reducers: usize, mapper: &dyn Mapper) -> Result<()> {
    make_world_writable_dir(output_dir)?;

    let mut intermediate: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut emit = |key: String, value: String| {
        intermediate.entry(key).or_default().push(value);
    };

    for name in file_range.file_names() {
        let path = input_dir.join(&name);
        let file = File::open(&path).with_context(|| format!("open input file {}", path.display()))?;
        let reader = BufReader::new(file);
        for (line_no, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("read line {} of {}", line_no + 1, path.display()))?;
            let input = TextInput(&line);
            mapper.map(&input, &mut emit);
        }
    }

    write_partitions(output_dir, num_reducers, &intermediate)
}

fn write_partitions(output_dir: &Path, num_reducers: usize, intermediate: &BTreeMap<String, Vec<String>>) -> Result<()> {
    let mut writers: Vec<Option<BufWriter<File>>> = (0..num_reducers).map(|_| None).collect();

    for (key, values) in intermediate {
        let partition = partition_for_key(key, num_reducers);
        let writer = match &mut writers[partition] {
            Some(w) => w,
            slot @ None => {
                let path = output_dir.join(format!("partition-{partition}"));
                let file = File::create(&path).with_context(|| format!("create partition file {}", path.display()))?;
                *slot = Some(BufWriter::new(file));
                slot.as_mut().unwrap()
            }
        };
        for value in values {
            writeln!(writer, "{key},{value}").with_context(|| format!("write to partition-{partition} in {}", output_dir.display()))?;
        }
    }

    for (p, writer) in writers.into_iter().enumerate() {
        if let Some(mut w) = writer {
            w.flush().with_context(|| format!("flush partition-{p} in {}", output_dir.display()))?;
        }
    }
    Ok(())
}
