/*
cargo run --bin extract_vocab -- \
    --infos  log_aoanet_rl/infos_aoanet.json \
    --output data/vizwiztalk.json
*/

use std::fs::{self, create_dir_all, File};
use std::path::PathBuf;

use anyhow::{Context, Result};
use caption_ngrams::vocab::{write_dict_json, DictJson};
use chrono::Local;
use clap::Parser;
use log::info;
use serde_json::Value;
use simplelog::{Config as LogConfig, LevelFilter, WriteLogger};

/// Pull the vocabulary out of a trained model's info file and write it as a
/// dict file for prepro_ngrams.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Checkpoint info file (JSON) with a `vocab` field
    #[arg(long)]
    infos: PathBuf,

    #[arg(long = "output", value_name = "PATH", default_value = "data/vizwiztalk.json")]
    output: PathBuf,

    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    create_dir_all(&cli.log_dir)?;
    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let log_path = cli.log_dir.join(format!("extract_vocab_{ts}.log"));
    WriteLogger::init(LevelFilter::Info, LogConfig::default(), File::create(&log_path)?)?;
    info!("Reading {}", cli.infos.display());

    let text = fs::read_to_string(&cli.infos)
        .with_context(|| format!("Reading {}", cli.infos.display()))?;
    let infos: Value = serde_json::from_str(&text)
        .with_context(|| format!("Parsing {}", cli.infos.display()))?;
    let dict = DictJson::from_infos(&infos)
        .with_context(|| format!("Extracting vocab from {}", cli.infos.display()))?;
    info!(
        "{} vocabulary entries, bpe codes: {}",
        dict.ix_to_word.len(),
        if dict.bpe.is_some() { "yes" } else { "no" }
    );

    if let Some(parent) = cli.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent)?;
    }
    write_dict_json(&cli.output, &dict)
        .with_context(|| format!("Writing {}", cli.output.display()))?;
    info!("Wrote {}", cli.output.display());
    Ok(())
}
