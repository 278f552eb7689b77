//! FNV-1a-32 key partitioning.
//!
//! Mirrors Go's `hash/fnv` `fnv.New32a()` exactly (32-bit offset basis
//! `0x811c9dc5`, prime `0x01000193`) so partition assignment matches the
//! spec's worked examples bit-for-bit. The `fnv` crate (used elsewhere in the
//! pack, e.g. `differential-dataflow`) only exposes the 64-bit FNV-1a
//! variant, whose truncation to 32 bits is *not* the same algorithm as Go's
//! 32-bit FNV-1a — so the 32-bit variant is implemented directly here rather
//! than pulled from a crate; see `DESIGN.md`.
//!
//! Per the redesign flag in `SPEC_FULL.md` §11/§9 ("the source reuses a
//! single FNV hasher without isolating state per call"), [`partition_for_key`]
//! computes a **fresh** hash per call rather than sharing mutable hasher
//! state across keys.

/// FNV-1a-32 of `key`'s UTF-8 bytes.
pub fn fnv1a32(key: &str) -> u32 {
    let mut hash: u32 = 0x811c9dc5;
    for &byte in key.as_bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}

/// The reducer partition `key` is assigned to: `fnv1a32(key) mod num_reducers`.
///
/// # Panics
/// Panics if `num_reducers == 0` — callers must validate `R >= 1` before
/// partitioning (the controller does, per spec.md §3's job invariant).
pub fn partition_for_key(key: &str, num_reducers: usize) -> usize {
    assert!(num_reducers > 0, "num_reducers must be >= 1");
    (fnv1a32(key) as usize) % num_reducers
}
