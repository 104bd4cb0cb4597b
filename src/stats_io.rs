//! Reading and writing the corpus-statistics artifact.
//!
//! The on-disk record keeps the two fields downstream reward code reads,
//! `document_frequency` and `ref_len`. N-gram keys are not strings, so the
//! table is stored as a list of `(ngram, count)` pairs sorted by n-gram.

use std::fs::{self, File};
use std::hash::Hash;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use itertools::Itertools;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::doc_freq::CorpusStats;
use crate::errors::PreproError;
use crate::ngrams::Ngram;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Bincode,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Bincode => "bin",
        }
    }
}

/// Serialized form of [`CorpusStats`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsRecord<T> {
    pub document_frequency: Vec<(Ngram<T>, f64)>,
    pub ref_len: usize,
}

impl<T> From<&CorpusStats<T>> for StatsRecord<T>
where
    T: Clone + Ord + Hash,
{
    fn from(stats: &CorpusStats<T>) -> Self {
        let document_frequency = stats
            .document_frequency
            .iter()
            .map(|(ngram, df)| (ngram.clone(), *df))
            .sorted_by(|a, b| a.0.cmp(&b.0))
            .collect();
        Self {
            document_frequency,
            ref_len: stats.ref_len,
        }
    }
}

impl<T> From<StatsRecord<T>> for CorpusStats<T>
where
    T: Eq + Hash,
{
    fn from(record: StatsRecord<T>) -> Self {
        Self {
            document_frequency: record.document_frequency.into_iter().collect(),
            ref_len: record.ref_len,
        }
    }
}

/// `<prefix>-<mode>.<ext>`, e.g. `data/vizwiz-train-words.json`.
pub fn output_path(
    prefix: &Path,
    mode: &str,
    format: OutputFormat,
) -> PathBuf {
    let mut name = prefix.as_os_str().to_owned();
    name.push(format!("-{mode}.{}", format.extension()));
    PathBuf::from(name)
}

/// Write `stats` to `path`, replacing any existing file atomically.
pub fn write_stats<T>(
    path: &Path,
    stats: &CorpusStats<T>,
    format: OutputFormat,
) -> Result<(), PreproError>
where
    T: Clone + Ord + Hash + Serialize,
{
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| PreproError::io(parent, e))?;

    let record = StatsRecord::from(stats);
    let tmp = NamedTempFile::new_in(parent).map_err(|e| PreproError::io(parent, e))?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        match format {
            OutputFormat::Json => serde_json::to_writer(&mut writer, &record)?,
            OutputFormat::Bincode => bincode::serialize_into(&mut writer, &record)?,
        }
        writer.flush().map_err(|e| PreproError::io(tmp.path(), e))?;
    }
    tmp.persist(path)?;
    Ok(())
}

pub fn read_stats<T>(
    path: &Path,
    format: OutputFormat,
) -> Result<CorpusStats<T>, PreproError>
where
    T: Eq + Hash + DeserializeOwned,
{
    let file = File::open(path).map_err(|e| PreproError::io(path, e))?;
    let reader = BufReader::new(file);
    let record: StatsRecord<T> = match format {
        OutputFormat::Json => serde_json::from_reader(reader)?,
        OutputFormat::Bincode => bincode::deserialize_from(reader)?,
    };
    Ok(record.into())
}
