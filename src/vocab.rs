//! Vocabulary dict and word-to-index mapping.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::PreproError;

/// End-of-sentence token, always index 0.
pub const EOS_TOKEN: &str = "<eos>";

/// Stand-in for words outside the vocabulary.
pub const UNK_TOKEN: &str = "UNK";

/// The vocabulary file shared with the captioning model.
///
/// `ix_to_word` keys are 1-based indices written as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictJson {
    pub ix_to_word: BTreeMap<String, String>,

    /// Subword merge codes, present when the model was trained on BPE pieces.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bpe: Option<String>,
}

impl DictJson {
    /// Pull the vocabulary out of a checkpoint `infos` record.
    ///
    /// Expects `{"vocab": {"1": "a", ...}}`, with optional `bpe` codes at the
    /// top level or under `opt`.
    pub fn from_infos(infos: &Value) -> Result<Self, PreproError> {
        let vocab = infos
            .get("vocab")
            .and_then(Value::as_object)
            .ok_or(PreproError::MissingField("vocab"))?;

        let mut ix_to_word = BTreeMap::new();
        for (ix, word) in vocab {
            match word.as_str() {
                Some(w) => {
                    ix_to_word.insert(ix.clone(), w.to_owned());
                }
                None => warn!("vocab entry {ix} is not a string, skipping"),
            }
        }

        let bpe = infos
            .get("bpe")
            .or_else(|| infos.get("opt").and_then(|opt| opt.get("bpe")))
            .and_then(Value::as_str)
            .map(str::to_owned);

        Ok(Self { ix_to_word, bpe })
    }
}

pub fn load_dict_json(path: &Path) -> Result<DictJson, PreproError> {
    let file = File::open(path).map_err(|e| PreproError::io(path, e))?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

pub fn write_dict_json(
    path: &Path,
    dict: &DictJson,
) -> Result<(), PreproError> {
    let file = File::create(path).map_err(|e| PreproError::io(path, e))?;
    serde_json::to_writer(BufWriter::new(file), dict)?;
    Ok(())
}

/// Word-to-index lookup built from `ix_to_word`.
#[derive(Debug, Clone)]
pub struct Vocab {
    wtoi: HashMap<String, u32>,
}

impl Vocab {
    pub fn from_ix_to_word(ix_to_word: &BTreeMap<String, String>) -> Result<Self, PreproError> {
        let mut wtoi = HashMap::with_capacity(ix_to_word.len() + 1);
        for (ix, word) in ix_to_word {
            let index: u32 = ix
                .parse()
                .map_err(|_| PreproError::InvalidVocabIndex { key: ix.clone() })?;
            wtoi.insert(word.clone(), index);
        }
        wtoi.insert(EOS_TOKEN.to_owned(), 0);
        Ok(Self { wtoi })
    }

    pub fn index_of(
        &self,
        word: &str,
    ) -> Option<u32> {
        self.wtoi.get(word).copied()
    }

    pub fn contains(
        &self,
        word: &str,
    ) -> bool {
        self.wtoi.contains_key(word)
    }

    /// Size including `<eos>`.
    pub fn len(&self) -> usize {
        self.wtoi.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wtoi.is_empty()
    }

    /// Append `<eos>`, replace unknown words with `UNK`, and map to indices.
    ///
    /// Returns the word sequence and the matching index sequence.
    pub fn encode_caption(
        &self,
        tokens: Vec<String>,
    ) -> Result<(Vec<String>, Vec<u32>), PreproError> {
        let mut words = Vec::with_capacity(tokens.len() + 1);
        let mut idxs = Vec::with_capacity(tokens.len() + 1);
        for tok in tokens.into_iter().chain(std::iter::once(EOS_TOKEN.to_owned())) {
            let (word, index) = match self.index_of(&tok) {
                Some(index) => (tok, index),
                None => {
                    let index = self
                        .index_of(UNK_TOKEN)
                        .ok_or(PreproError::MissingUnknownMarker { word: tok })?;
                    (UNK_TOKEN.to_owned(), index)
                }
            };
            words.push(word);
            idxs.push(index);
        }
        Ok((words, idxs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ix_to_word(words: &[&str]) -> BTreeMap<String, String> {
        words
            .iter()
            .enumerate()
            .map(|(i, w)| ((i + 1).to_string(), w.to_string()))
            .collect()
    }

    fn strings(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_eos_is_index_zero() {
        let vocab = Vocab::from_ix_to_word(&ix_to_word(&["a", "dog", "UNK"])).unwrap();
        assert_eq!(vocab.index_of(EOS_TOKEN), Some(0));
        assert_eq!(vocab.index_of("dog"), Some(2));
        assert_eq!(vocab.len(), 4);
    }

    #[test]
    fn test_encode_substitutes_unknown_words() {
        let vocab = Vocab::from_ix_to_word(&ix_to_word(&["a", "dog", "UNK"])).unwrap();
        let (words, idxs) = vocab.encode_caption(strings(&["a", "zebra", "dog"])).unwrap();
        assert_eq!(words, strings(&["a", "UNK", "dog", "<eos>"]));
        assert_eq!(idxs, vec![1, 3, 2, 0]);
    }

    #[test]
    fn test_missing_unk_only_fails_when_needed() {
        let vocab = Vocab::from_ix_to_word(&ix_to_word(&["a", "dog"])).unwrap();
        assert!(vocab.encode_caption(strings(&["a", "dog"])).is_ok());
        let err = vocab.encode_caption(strings(&["a", "cat"])).unwrap_err();
        assert!(matches!(err, PreproError::MissingUnknownMarker { word } if word == "cat"));
    }

    #[test]
    fn test_non_numeric_index_is_rejected() {
        let mut map = ix_to_word(&["a"]);
        map.insert("x".to_string(), "b".to_string());
        assert!(matches!(
            Vocab::from_ix_to_word(&map),
            Err(PreproError::InvalidVocabIndex { key }) if key == "x"
        ));
    }

    #[test]
    fn test_from_infos() {
        let infos = json!({
            "vocab": {"1": "a", "2": "dog", "3": 7},
            "opt": {"bpe": "a b\n"},
            "iter": 1000
        });
        let dict = DictJson::from_infos(&infos).unwrap();
        assert_eq!(dict.ix_to_word.len(), 2);
        assert_eq!(dict.ix_to_word["2"], "dog");
        assert_eq!(dict.bpe.as_deref(), Some("a b\n"));

        let err = DictJson::from_infos(&json!({"iter": 1})).unwrap_err();
        assert!(matches!(err, PreproError::MissingField("vocab")));
    }

    #[test]
    fn test_dict_json_without_bpe() {
        let dict: DictJson = serde_json::from_value(json!({
            "ix_to_word": {"1": "a"},
            "images": []
        }))
        .unwrap();
        assert!(dict.bpe.is_none());
        let text = serde_json::to_string(&dict).unwrap();
        assert!(!text.contains("bpe"));
    }
}
