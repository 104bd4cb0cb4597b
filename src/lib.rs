//! Preprocessing for caption reward scoring.
//!
//! Turns per-image reference captions into the n-gram document-frequency
//! statistics a CIDEr-style reward reads at training time. The binaries in
//! this crate are thin batch jobs over these modules.

pub mod annotations;
pub mod corpus;
pub mod doc_freq;
pub mod errors;
pub mod ngrams;
pub mod stats_io;
pub mod tokenize;
pub mod vocab;

pub use doc_freq::{compute_doc_freq, compute_doc_freq_par, CorpusStats};
pub use errors::PreproError;
pub use ngrams::{precook, Ngram, NgramCounts, DEFAULT_MAX_ORDER};
pub use tokenize::split_sentence;
