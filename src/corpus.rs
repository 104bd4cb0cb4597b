//! Reference corpus in both token alphabets.
//!
//! Every caption is tokenized once, then kept twice: as vocabulary words
//! (with `UNK` substitution) and as vocabulary indices. Document frequency
//! is computed separately over each.

use log::{debug, info, warn};

use crate::doc_freq::{compute_doc_freq, compute_doc_freq_par, CorpusStats};
use crate::errors::PreproError;
use crate::ngrams::create_crefs;
use crate::tokenize::split_sentence;
use crate::vocab::Vocab;

/// Subword segmentation applied to a tokenized caption before vocabulary
/// lookup.
///
/// Takes and returns space-joined tokens.
pub trait Segmenter {
    fn segment(
        &self,
        line: &str,
    ) -> String;
}

/// Tokenizes, optionally segments, and maps captions onto a vocabulary.
pub struct CaptionEncoder<'a> {
    pub vocab: &'a Vocab,
    pub segmenter: Option<&'a dyn Segmenter>,
}

impl<'a> CaptionEncoder<'a> {
    pub fn new(vocab: &'a Vocab) -> Self {
        Self {
            vocab,
            segmenter: None,
        }
    }

    pub fn with_segmenter(
        self,
        segmenter: &'a dyn Segmenter,
    ) -> Self {
        Self {
            segmenter: Some(segmenter),
            ..self
        }
    }

    /// Word tokens and index tokens of one caption, both ending in `<eos>`.
    pub fn encode(
        &self,
        caption: &str,
    ) -> Result<(Vec<String>, Vec<u32>), PreproError> {
        let mut tokens = split_sentence(caption)?;
        if let Some(segmenter) = self.segmenter {
            tokens = segmenter
                .segment(&tokens.join(" "))
                .trim()
                .split(' ')
                .map(str::to_owned)
                .collect();
        }
        self.vocab.encode_caption(tokens)
    }
}

/// What to do with a caption that tokenizes to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyCaptionPolicy {
    /// Stop the run with [`PreproError::EmptySentence`].
    #[default]
    Fail,
    /// Log and leave the caption out of its group.
    Skip,
}

/// Encoded references per image.
#[derive(Debug, Clone, Default)]
pub struct RefCorpus {
    pub words: Vec<Vec<Vec<String>>>,
    pub idxs: Vec<Vec<Vec<u32>>>,
    pub skipped_captions: usize,
}

impl RefCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode and add every caption of one image as a single group.
    ///
    /// Nothing is added if any caption fails.
    pub fn push_group<S: AsRef<str>>(
        &mut self,
        encoder: &CaptionEncoder<'_>,
        captions: &[S],
        policy: EmptyCaptionPolicy,
    ) -> Result<(), PreproError> {
        let mut ref_words = Vec::with_capacity(captions.len());
        let mut ref_idxs = Vec::with_capacity(captions.len());
        let mut skipped = 0;
        for caption in captions {
            match encoder.encode(caption.as_ref()) {
                Ok((words, idxs)) => {
                    ref_words.push(words);
                    ref_idxs.push(idxs);
                }
                Err(PreproError::EmptySentence) if policy == EmptyCaptionPolicy::Skip => {
                    warn!("skipping empty caption {:?}", caption.as_ref());
                    skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }
        self.words.push(ref_words);
        self.idxs.push(ref_idxs);
        self.skipped_captions += skipped;
        Ok(())
    }

    /// Number of groups (images).
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Document frequencies over the word alphabet and the index alphabet.
    pub fn build_stats(
        &self,
        max_order: usize,
        parallel: bool,
    ) -> (CorpusStats<String>, CorpusStats<u32>) {
        info!(
            "counting n-grams up to order {max_order} over {} images",
            self.len()
        );
        let word_crefs = create_crefs(&self.words, max_order);
        let idx_crefs = create_crefs(&self.idxs, max_order);
        debug!("cooked {} word groups, {} index groups", word_crefs.len(), idx_crefs.len());

        if parallel {
            (compute_doc_freq_par(&word_crefs), compute_doc_freq_par(&idx_crefs))
        } else {
            (compute_doc_freq(&word_crefs), compute_doc_freq(&idx_crefs))
        }
    }
}
