//! Bundled word-count example `Mapper`/`Reducer`.
//!
//! The original source's `main.go` constructs a `WordCounter` mapper but
//! leaves `cfg.Reducer` unset — its reduce side was never wired up (see
//! `SPEC_FULL.md` §11's supplement). [`SumReducer`] completes the pair: it
//! sums the `"1"` values `WordCounter` emits per word, the usual second half
//! of a word-count job.

use crate::contracts::{MapInput, Mapper, Reducer, ReducerInput};

/// Splits an input line on whitespace and emits `(word, "1")` per token.
pub struct WordCounter;

impl Mapper for WordCounter {
    fn map(&self, input: &dyn MapInput, emit: &mut dyn FnMut(String, String)) {
        for word in input.value().split_whitespace() {
            emit(word.to_string(), "1".to_string());
        }
    }
}

/// Sums the values for each key, emitting a single total.
pub struct SumReducer;

impl Reducer for SumReducer {
    fn reduce(&self, input: &mut dyn ReducerInput, emit: &mut dyn FnMut(String)) {
        let mut total: i64 = 0;
        while !input.done() {
            total += input.value().parse::<i64>().unwrap_or(0);
            input.next_value();
        }
        emit(total.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedInput {
        values: Vec<&'static str>,
        idx: usize,
    }

    impl ReducerInput for FixedInput {
        fn key(&self) -> &str {
            "word"
        }
        fn value(&self) -> &str {
            self.values.get(self.idx).copied().unwrap_or("")
        }
        fn next_value(&mut self) {
            self.idx += 1;
        }
        fn done(&self) -> bool {
            self.idx >= self.values.len()
        }
    }

    #[test]
    fn word_counter_emits_one_per_word() {
        let mut emitted = Vec::new();
        let mut emit = |k: String, v: String| emitted.push((k, v));
        WordCounter.map(&crate::contracts::TextInput("a a b"), &mut emit);
        assert_eq!(emitted, vec![("a".to_string(), "1".to_string()), ("a".to_string(), "1".to_string()), ("b".to_string(), "1".to_string())]);
    }

    #[test]
    fn sum_reducer_totals_values() {
        let mut input = FixedInput { values: vec!["1", "1", "1"], idx: 0 };
        let mut out = None;
        let mut emit = |v: String| out = Some(v);
        SumReducer.reduce(&mut input, &mut emit);
        assert_eq!(out, Some("3".to_string()));
    }

    #[test]
    fn sum_reducer_ignores_unparseable_values() {
        let mut input = FixedInput { values: vec!["1", "garbage", "2"], idx: 0 };
        let mut out = None;
        let mut emit = |v: String| out = Some(v);
        SumReducer.reduce(&mut input, &mut emit);
        assert_eq!(out, Some("3".to_string()));
    }
}
