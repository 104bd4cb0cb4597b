//! N-gram term-frequency tables.
//!
//! Tokens are opaque: the word-mode and index-mode corpora go through the
//! same code with `T = String` and `T = u32`.

use std::collections::HashMap;
use std::hash::Hash;

/// Highest n-gram order counted by default.
pub const DEFAULT_MAX_ORDER: usize = 4;

/// An ordered run of 1 to N consecutive tokens.
pub type Ngram<T> = Vec<T>;

/// Occurrences of each n-gram within one sentence.
pub type NgramCounts<T> = HashMap<Ngram<T>, usize>;

/// Count every n-gram of order `1..=n` in `tokens`.
///
/// Windows never run past the end of the sentence, so a sentence shorter
/// than `k` has no `k`-grams.
pub fn precook<T>(tokens: &[T], n: usize) -> NgramCounts<T>
where
    T: Clone + Eq + Hash,
{
    let mut counts = NgramCounts::new();
    for k in 1..=n {
        for window in tokens.windows(k) {
            *counts.entry(window.to_vec()).or_default() += 1;
        }
    }
    counts
}

/// [`precook`] over a whitespace-separated sentence.
pub fn precook_str(sentence: &str, n: usize) -> NgramCounts<String> {
    let words: Vec<String> = sentence.split_whitespace().map(str::to_owned).collect();
    precook(&words, n)
}

/// One table per reference sentence of a single image.
pub fn cook_refs<T>(refs: &[Vec<T>], n: usize) -> Vec<NgramCounts<T>>
where
    T: Clone + Eq + Hash,
{
    refs.iter().map(|r| precook(r, n)).collect()
}

pub fn cook_str_refs<S: AsRef<str>>(refs: &[S], n: usize) -> Vec<NgramCounts<String>> {
    refs.iter().map(|r| precook_str(r.as_ref(), n)).collect()
}

/// Cook every image's references, keeping image order.
pub fn create_crefs<T>(groups: &[Vec<Vec<T>>], n: usize) -> Vec<Vec<NgramCounts<T>>>
where
    T: Clone + Eq + Hash,
{
    groups.iter().map(|refs| cook_refs(refs, n)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ngram(words: &[&str]) -> Ngram<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_repeated_bigram() {
        let counts = precook_str("a man a man", 2);
        assert_eq!(counts.len(), 4);
        assert_eq!(counts[&ngram(&["a"])], 2);
        assert_eq!(counts[&ngram(&["man"])], 2);
        assert_eq!(counts[&ngram(&["a", "man"])], 2);
        assert_eq!(counts[&ngram(&["man", "a"])], 1);
    }

    #[test]
    fn test_window_counts_per_order() {
        let tokens: Vec<u32> = vec![3, 1, 4, 1, 5, 9, 2];
        for n in 1..=9 {
            let counts = precook(&tokens, n);
            for k in 1..=n {
                let total: usize = counts
                    .iter()
                    .filter(|(g, _)| g.len() == k)
                    .map(|(_, c)| *c)
                    .sum();
                assert_eq!(total, tokens.len().saturating_sub(k - 1), "n={n} k={k}");
            }
            assert!(counts.keys().all(|g| !g.is_empty() && g.len() <= n));
        }
    }

    #[test]
    fn test_short_sentence_has_no_long_grams() {
        let counts = precook_str("dog", DEFAULT_MAX_ORDER);
        assert_eq!(counts.len(), 1);
        assert!(precook::<String>(&[], DEFAULT_MAX_ORDER).is_empty());
    }

    #[test]
    fn test_cook_refs_keeps_sentences_apart() {
        let crefs = cook_str_refs(&["a dog", "a cat"], 2);
        assert_eq!(crefs.len(), 2);
        assert_eq!(crefs[0][&ngram(&["a"])], 1);
        assert!(!crefs[0].contains_key(&ngram(&["cat"])));
        assert_eq!(crefs[1][&ngram(&["a", "cat"])], 1);
    }

    #[test]
    fn test_create_crefs_matches_string_cooking() {
        let groups = vec![vec![ngram(&["a", "dog", "runs"])], vec![]];
        let crefs = create_crefs(&groups, DEFAULT_MAX_ORDER);
        assert_eq!(crefs.len(), 2);
        assert_eq!(crefs[0][0], precook_str("a dog runs", DEFAULT_MAX_ORDER));
        assert!(crefs[1].is_empty());
    }
}
