//! k-way min-heap merge over sorted `key,value` text streams.
//!
//! [`StreamMerger`] is the read side of the shuffle: a reducer opens one
//! partition file per mapper (each individually sorted ascending by key) and
//! merges them into a single key-grouped stream. Ties between equal keys
//! from different sources are broken by ascending source index — the
//! original Go implementation's tie-break was incidental (an artifact of
//! `container/heap`'s unspecified ordering among equal elements); this is the
//! redesign flag from `SPEC_FULL.md` §11 making that tie-break explicit and
//! deterministic via `(key, source_index)` heap ordering.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use crate::contracts::ReducerInput;

struct HeapItem {
    key: String,
    value: String,
    source: usize,
}

impl PartialEq for HeapItem {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.source == other.source
    }
}
impl Eq for HeapItem {}

impl PartialOrd for HeapItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for HeapItem {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key).then_with(|| self.source.cmp(&other.source))
    }
}

/// Merges `M` sorted `key,value` text files into a single key-grouped
/// stream.
///
/// Unreadable or missing files are logged and skipped — a mapper may have
/// produced no keys for a given partition, so its partition file may simply
/// be absent (spec.md §4.3's "missing partition tolerance").
pub struct StreamMerger {
    readers: Vec<Option<Lines<BufReader<File>>>>,
    heap: BinaryHeap<Reverse<HeapItem>>,
    done: bool,
}

impl StreamMerger {
    /// Open every file in `paths` and seed the heap with each stream's first
    /// line.
    pub fn new(paths: &[impl AsRef<Path>]) -> Self {
        let mut readers = Vec::with_capacity(paths.len());
        let mut heap = BinaryHeap::new();

        for (i, path) in paths.iter().enumerate() {
            let path = path.as_ref();
            match File::open(path) {
                Ok(f) => {
                    let mut lines = BufReader::new(f).lines();
                    if let Some(item) = Self::pull(&mut lines, i) {
                        heap.push(Reverse(item));
                    }
                    readers.push(Some(lines));
                }
                Err(e) => {
                    tracing::warn!("skipping unreadable partition file {}: {e}", path.display());
                    readers.push(None);
                }
            }
        }

        Self { readers, heap, done: false }
    }

    /// Pull and parse the next `key,value` line from source `i`, skipping
    /// malformed lines that lack a comma (spec.md §4.1 edge cases).
    fn pull(lines: &mut Lines<BufReader<File>>, source: usize) -> Option<HeapItem> {
        for line in lines.by_ref() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    tracing::warn!("error reading merge source {source}: {e}");
                    continue;
                }
            };
            if let Some((key, value)) = line.split_once(',') {
                return Some(HeapItem { key: key.to_string(), value: value.to_string(), source });
            }
        }
        None
    }
}

impl ReducerInput for StreamMerger {
    fn key(&self) -> &str {
        self.heap.peek().map(|Reverse(i)| i.key.as_str()).unwrap_or("")
    }

    fn value(&self) -> &str {
        self.heap.peek().map(|Reverse(i)| i.value.as_str()).unwrap_or("")
    }

    fn next_value(&mut self) {
        let Some(Reverse(popped)) = self.heap.pop() else {
            return;
        };

        if let Some(Some(lines)) = self.readers.get_mut(popped.source) {
            if let Some(item) = Self::pull(lines, popped.source) {
                self.heap.push(Reverse(item));
            }
        }

        self.done = match self.heap.peek() {
            Some(Reverse(top)) => top.key != popped.key,
            None => true,
        };
    }

    fn done(&self) -> bool {
        self.done || self.heap.is_empty()
    }
}

impl StreamMerger {
    /// True while any source still has an unconsumed pair (caller loop
    /// condition: `while merger.has_more() { ... }`).
    pub fn has_more(&self) -> bool {
        !self.heap.is_empty()
    }

    /// Reset the `done` flag so the next key's group can be iterated.
    /// Called by the reducer loop after each `Reduce` invocation returns.
    pub fn reset_group(&mut self) {
        self.done = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_stream(dir: &Path, name: &str, lines: &[&str]) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut f = File::create(&path).unwrap();
        for l in lines {
            writeln!(f, "{l}").unwrap();
        }
        path
    }

    #[test]
    fn merges_two_sorted_streams_grouped_by_key() {
        let dir = tempdir().unwrap();
        let a = write_stream(dir.path(), "a", &["a,1", "a,2", "c,1"]);
        let b = write_stream(dir.path(), "b", &["a,3", "b,1", "c,2"]);

        let mut merger = StreamMerger::new(&[a, b]);
        let mut groups: Vec<(String, Vec<String>)> = Vec::new();
        while merger.has_more() {
            let key = merger.key().to_string();
            let mut values = Vec::new();
            while !merger.done() {
                values.push(merger.value().to_string());
                merger.next_value();
            }
            groups.push((key, values));
            merger.reset_group();
        }

        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].0, "a");
        let mut a_values = groups[0].1.clone();
        a_values.sort();
        assert_eq!(a_values, vec!["1", "2", "3"]);
        assert_eq!(groups[1], ("b".to_string(), vec!["1".to_string()]));
        let mut c_values = groups[2].1.clone();
        c_values.sort();
        assert_eq!((groups[2].0.clone(), c_values), ("c".to_string(), vec!["1".to_string(), "2".to_string()]));
    }

    #[test]
    fn single_stream_is_a_pass_through() {
        let dir = tempdir().unwrap();
        let a = write_stream(dir.path(), "a", &["a,1", "b,2"]);

        let mut merger = StreamMerger::new(&[a]);
        let mut seen = Vec::new();
        while merger.has_more() {
            let key = merger.key().to_string();
            while !merger.done() {
                seen.push((key.clone(), merger.value().to_string()));
                merger.next_value();
            }
            merger.reset_group();
        }
        assert_eq!(seen, vec![("a".to_string(), "1".to_string()), ("b".to_string(), "2".to_string())]);
    }

    #[test]
    fn missing_file_is_skipped_not_fatal() {
        let dir = tempdir().unwrap();
        let a = write_stream(dir.path(), "a", &["a,1"]);
        let missing = dir.path().join("does-not-exist");

        let mut merger = StreamMerger::new(&[a, missing]);
        assert!(merger.has_more());
        assert_eq!(merger.key(), "a");
    }

    #[test]
    fn malformed_line_without_comma_is_skipped() {
        let dir = tempdir().unwrap();
        let a = write_stream(dir.path(), "a", &["nocomma", "a,1"]);

        let mut merger = StreamMerger::new(&[a]);
        assert_eq!(merger.key(), "a");
        assert_eq!(merger.value(), "1");
    }

    #[test]
    fn trailing_comma_yields_empty_value() {
        let dir = tempdir().unwrap();
        let a = write_stream(dir.path(), "a", &["a,"]);

        let merger = StreamMerger::new(&[a]);
        assert_eq!(merger.key(), "a");
        assert_eq!(merger.value(), "");
    }

    #[test]
    fn empty_file_contributes_nothing() {
        let dir = tempdir().unwrap();
        let a = write_stream(dir.path(), "a", &[]);
        let b = write_stream(dir.path(), "b", &["x,1"]);

        let merger = StreamMerger::new(&[a, b]);
        assert_eq!(merger.key(), "x");
    }
}
