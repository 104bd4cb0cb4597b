//! Caption tokenizer.
//!
//! Splits on runs of non-word characters, keeps the separators as tokens,
//! lower-cases everything and breaks punctuation runs apart (`"!?"` becomes
//! `"!"`, `"?"`) except for runs of full stops such as `"..."`. A trailing
//! `"."` is dropped; the data layer adds its own end-of-sentence token.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::PreproError;

static SENTENCE_SPLIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\W+").expect("sentence split pattern is valid"));

/// Break a caption into a list of words and punctuation.
///
/// Fails with [`PreproError::EmptySentence`] when nothing survives
/// tokenization.
pub fn split_sentence(sentence: &str) -> Result<Vec<String>, PreproError> {
    let mut toks = Vec::new();
    for word in split_keep_separators(sentence.trim()) {
        let word = word.trim().to_lowercase();
        if word.is_empty() {
            continue;
        }
        if is_punctuation_run(&word) && !word.chars().all(|c| c == '.') {
            toks.extend(word.chars().map(String::from));
        } else {
            toks.push(word);
        }
    }

    strip_trailing_period(toks)
}

/// Drop the last token if it is exactly `"."`.
pub fn strip_trailing_period(mut toks: Vec<String>) -> Result<Vec<String>, PreproError> {
    if toks.is_empty() {
        return Err(PreproError::EmptySentence);
    }
    if toks.last().map(String::as_str) == Some(".") {
        toks.pop();
    }
    Ok(toks)
}

/// Pieces between separator runs, interleaved with the separator runs.
fn split_keep_separators(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut last = 0;
    for m in SENTENCE_SPLIT.find_iter(text) {
        pieces.push(&text[last..m.start()]);
        pieces.push(m.as_str());
        last = m.end();
    }
    pieces.push(&text[last..]);
    pieces
}

fn is_punctuation_run(word: &str) -> bool {
    word.chars().all(|c| c.is_ascii_punctuation())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(s: &str) -> Vec<String> {
        split_sentence(s).unwrap()
    }

    #[test]
    fn test_lowercases_and_drops_trailing_period() {
        assert_eq!(toks("A Dog runs."), vec!["a", "dog", "runs"]);
        assert_eq!(
            toks("  A man with a red helmet on a small moped on a dirt road. "),
            vec![
                "a", "man", "with", "a", "red", "helmet", "on", "a", "small", "moped", "on", "a",
                "dirt", "road"
            ]
        );
    }

    #[test]
    fn test_punctuation_runs_are_exploded() {
        assert_eq!(toks("what is this!?"), vec!["what", "is", "this", "!", "?"]);
        assert_eq!(toks("a dog's bowl"), vec!["a", "dog", "'", "s", "bowl"]);
        assert_eq!(toks("red, white"), vec!["red", ",", "white"]);
    }

    #[test]
    fn test_full_stop_runs_stay_whole() {
        assert_eq!(toks("a dog..."), vec!["a", "dog", "..."]);
        assert_eq!(toks("wait.. what"), vec!["wait", "..", "what"]);
    }

    #[test]
    fn test_only_one_trailing_period_is_dropped() {
        let input: Vec<String> = ["a", "dog", ".", "."].map(String::from).to_vec();
        assert_eq!(strip_trailing_period(input).unwrap(), vec!["a", "dog", "."]);

        let input: Vec<String> = ["a", "dog", "..."].map(String::from).to_vec();
        assert_eq!(strip_trailing_period(input).unwrap(), vec!["a", "dog", "..."]);

        assert!(matches!(
            strip_trailing_period(Vec::new()),
            Err(PreproError::EmptySentence)
        ));
    }

    #[test]
    fn test_spaced_full_stops_form_one_separator() {
        assert_eq!(toks("a dog . ."), vec!["a", "dog", ". ."]);
    }

    #[test]
    fn test_mixed_separator_is_kept_whole() {
        // Whitespace inside a separator run is not punctuation.
        assert_eq!(toks("yes . , no"), vec!["yes", ". ,", "no"]);
    }

    #[test]
    fn test_underscore_is_a_word_character() {
        assert_eq!(toks("snake_case word"), vec!["snake_case", "word"]);
    }

    #[test]
    fn test_empty_caption_is_an_error() {
        assert!(matches!(split_sentence(""), Err(PreproError::EmptySentence)));
        assert!(matches!(split_sentence("   "), Err(PreproError::EmptySentence)));
    }

    #[test]
    fn test_lone_period_yields_empty_tokens() {
        assert_eq!(toks("."), Vec::<String>::new());
    }
}
