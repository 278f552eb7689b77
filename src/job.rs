//! Job identity, file-range descriptors, and controller-side input partitioning.
//!
//! A [`Job`] is the controller's view of a single end-to-end run: it owns the
//! job id, the cluster-facing parameters (`M` mappers, `R` reducers), and the
//! paths every worker is launched with. [`FileRange`] is the compact
//! descriptor `"<prefix>-<start>-<end>"` a mapper is launched with to select
//! its slice of the input directory; [`partition_input_files`] is the
//! controller-side counterpart that carves a sorted, contiguous file listing
//! into `M` such ranges.

use anyhow::{Context, Result, anyhow, bail};
use std::path::{Path, PathBuf};

/// `mapperId` format used under `<nfs>/<jobId>/<mapperId>/`.
pub fn mapper_id(i: usize) -> String {
    format!("mapper-{i}")
}

/// Identifies a single end-to-end MapReduce invocation.
///
/// `job_id` has the form `job-YYYY-MM-DD-HH-MM-SS`. Invariant: `num_mappers
/// >= 1`, `num_reducers >= 1`, both bounded by cluster capacity (enforced by
/// [`crate::controller::validate`], not here — a `Job` can be constructed
/// freely; validation is a controller concern).
#[derive(Clone, Debug)]
pub struct Job {
    pub job_id: String,
    pub input_dir: PathBuf,
    pub nfs_path: PathBuf,
    pub image: String,
    pub num_mappers: usize,
    pub num_reducers: usize,
}

impl Job {
    /// Build a job id from a UTC timestamp already formatted as
    /// `YYYY-MM-DD-HH-MM-SS` (callers stamp the clock; this function stays
    /// pure so tests can supply deterministic ids).
    pub fn new(timestamp: &str, input_dir: PathBuf, nfs_path: PathBuf, image: String, num_mappers: usize, num_reducers: usize) -> Self {
        Self { job_id: format!("job-{timestamp}"), input_dir, nfs_path, image, num_mappers, num_reducers }
    }

    /// `<nfs>/<jobId>/`, owned exclusively by the controller.
    pub fn job_dir(&self) -> PathBuf {
        self.nfs_path.join(&self.job_id)
    }

    /// `<nfs>/<jobId>/<mapperId>/`, owned exclusively by mapper `i`.
    pub fn mapper_dir(&self, i: usize) -> PathBuf {
        self.job_dir().join(mapper_id(i))
    }

    /// `<nfs>/<jobId>/reducer-<r>`, owned exclusively by reducer `r`.
    pub fn reducer_output_file(&self, r: usize) -> PathBuf {
        self.job_dir().join(format!("reducer-{r}"))
    }
}

/// A compact descriptor selecting input files `<prefix>-<start>` through
/// `<prefix>-<end>` inclusive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileRange {
    pub prefix: String,
    pub start: i64,
    pub end: i64,
}

impl FileRange {
    /// Render as `"<prefix>-<start>-<end>"`, the wire format passed via
    /// `--file-range`.
    pub fn render(&self) -> String {
        format!("{}-{}-{}", self.prefix, self.start, self.end)
    }

    /// Parse `"<prefix>-<start>-<end>"`. Mirrors the original's
    /// `parseFileRange`: splitting on `-` must yield exactly 3 substrings, so
    /// a prefix that itself contains a hyphen is not supported (same
    /// limitation the original carried — see `SPEC_FULL.md` §11).
    pub fn parse(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('-').collect();
        if parts.len() != 3 {
            bail!("expected file range in format prefix-start-end but got {s:?}");
        }
        let prefix = parts[0].to_string();
        let start: i64 = parts[1].parse().with_context(|| format!("invalid range start in {s:?}"))?;
        let end: i64 = parts[2].parse().with_context(|| format!("invalid range end in {s:?}"))?;
        Ok(Self { prefix, start, end })
    }

    /// The inclusive list of file names `<prefix>-<start>` .. `<prefix>-<end>`.
    pub fn file_names(&self) -> Vec<String> {
        (self.start..=self.end).map(|i| format!("{}-{i}", self.prefix)).collect()
    }
}

/// List the immediate files (not subdirectories) of `input_dir`, sorted
/// lexicographically.
pub fn list_input_files(input_dir: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();
    let entries = std::fs::read_dir(input_dir).with_context(|| format!("read dir {}", input_dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("read dir entry in {}", input_dir.display()))?;
        let file_type = entry.file_type().with_context(|| format!("stat {}", entry.path().display()))?;
        if file_type.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        files.push(name);
    }
    files.sort();
    Ok(files)
}

/// Partition a sorted file listing into `num_partitions` contiguous
/// [`FileRange`]s.
///
/// With `n = files.len()`, `q = n / num_partitions`, `r = n % num_partitions`:
/// partition `i` receives `q + 1` files if `i < r`, else `q` files, assigned
/// sequentially from the low end. Each file must be named `<prefix>-<int>`
/// sharing one common prefix across the whole directory — a mixed-prefix
/// directory produces an undefined (but not panicking) range.
pub fn partition_input_files(files: &[String], num_partitions: usize) -> Result<Vec<FileRange>> {
    if num_partitions == 0 {
        bail!("num_partitions must be >= 1");
    }
    if files.is_empty() {
        bail!("no input files to partition");
    }
    if files.len() < num_partitions {
        bail!("fewer input files ({}) than partitions ({num_partitions})", files.len());
    }

    let n = files.len();
    let q = n / num_partitions;
    let extra = n % num_partitions;

    let mut ranges = Vec::with_capacity(num_partitions);
    let mut start = 0usize;
    for i in 0..num_partitions {
        let count = if i < extra { q + 1 } else { q };
        let end = start + count - 1;
        let (prefix, first_suffix) = split_file_name(&files[start])?;
        let (_, last_suffix) = split_file_name(&files[end])?;
        ranges.push(FileRange { prefix, start: first_suffix, end: last_suffix });
        start = end + 1;
    }
    Ok(ranges)
}

fn split_file_name(name: &str) -> Result<(String, i64)> {
    let idx = name.rfind('-').ok_or_else(|| anyhow!("file name {name:?} is not in <prefix>-<int> format"))?;
    let (prefix, suffix) = name.split_at(idx);
    let suffix = &suffix[1..];
    let suffix: i64 = suffix.parse().with_context(|| format!("file name {name:?} has a non-integer suffix"))?;
    Ok((prefix.to_string(), suffix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_and_parse_round_trip() {
        let r = FileRange { prefix: "book".into(), start: 0, end: 3 };
        assert_eq!(r.render(), "book-0-3");
        assert_eq!(FileRange::parse("book-0-3").unwrap(), r);
    }

    #[test]
    fn parse_rejects_malformed_ranges() {
        assert!(FileRange::parse("book-0").is_err());
        assert!(FileRange::parse("book-0-3-5").is_err());
        assert!(FileRange::parse("book-x-3").is_err());
    }

    #[test]
    fn file_names_enumerates_inclusive_range() {
        let r = FileRange { prefix: "book".into(), start: 5, end: 7 };
        assert_eq!(r.file_names(), vec!["book-5", "book-6", "book-7"]);
    }

    #[test]
    fn partition_empty_remainder() {
        let files = vec!["data-5".to_string(), "data-6".into(), "data-7".into()];
        let ranges = partition_input_files(&files, 3).unwrap();
        assert_eq!(ranges.iter().map(FileRange::render).collect::<Vec<_>>(), vec!["data-5-5", "data-6-6", "data-7-7"]);
    }

    #[test]
    fn partition_uneven_split_gives_remainder_to_low_partitions() {
        let files: Vec<String> = (0..7).map(|i| format!("f-{i}")).collect();
        let ranges = partition_input_files(&files, 3).unwrap();
        assert_eq!(ranges.iter().map(FileRange::render).collect::<Vec<_>>(), vec!["f-0-2", "f-3-4", "f-5-6"]);
    }

    #[test]
    fn partition_rejects_fewer_files_than_partitions() {
        let files = vec!["f-0".to_string()];
        assert!(partition_input_files(&files, 3).is_err());
    }
}
