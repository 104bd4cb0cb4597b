/*
cargo run --release --bin prepro_ngrams -- \
    --dict-json     data/vizwiztalk.json \
    --ann-dir       data/VizWiz/annotations \
    --output-prefix data/vizwiz-train

binary artifacts, counted in parallel:
cargo run --release --bin prepro_ngrams -- \
    --dict-json     data/vizwiztalk.json \
    --ann-dir       data/VizWiz/annotations \
    --output-prefix data/vizwiz-train \
    --format bincode --parallel
*/

use std::collections::HashSet;
use std::fs::{create_dir_all, File};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use caption_ngrams::annotations::{load_annotation_file, split_annotation_path};
use caption_ngrams::corpus::{CaptionEncoder, EmptyCaptionPolicy, RefCorpus};
use caption_ngrams::stats_io::{output_path, write_stats, OutputFormat};
use caption_ngrams::vocab::{load_dict_json, Vocab};
use caption_ngrams::DEFAULT_MAX_ORDER;
use chrono::Local;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use simplelog::{
    ColorChoice, CombinedLogger, Config as LogConfig, LevelFilter, TermLogger, TerminalMode,
    WriteLogger,
};

/// Count n-gram document frequencies over reference captions, once over
/// vocabulary words and once over vocabulary indices.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Vocabulary dict with an `ix_to_word` field
    #[arg(long, default_value = "data/vizwiztalk.json")]
    dict_json: PathBuf,

    /// Outputs go to <prefix>-words.<ext> and <prefix>-idxs.<ext>
    #[arg(long, value_name = "PATH", default_value = "data/vizwiz-train")]
    output_prefix: PathBuf,

    /// Directory holding VizWiz_Captions_v1_<split>.json
    #[arg(long, value_name = "PATH", default_value = "data/VizWiz/annotations")]
    ann_dir: PathBuf,

    /// Splits to read, comma separated
    #[arg(long, value_delimiter = ',', default_value = "train,val")]
    splits: Vec<String>,

    /// Image ids to leave out, comma separated
    #[arg(long, value_delimiter = ',')]
    skip_image_ids: Vec<u64>,

    /// Highest n-gram order
    #[arg(long, default_value_t = DEFAULT_MAX_ORDER,
          value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    max_order: usize,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Count groups on the rayon pool
    #[arg(long)]
    parallel: bool,

    /// Drop captions that tokenize to nothing instead of stopping
    #[arg(long)]
    skip_empty_captions: bool,

    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // logging setup
    create_dir_all(&cli.log_dir)?;
    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let log_path = cli.log_dir.join(format!("prepro_ngrams_{ts}.log"));
    CombinedLogger::init(vec![
        WriteLogger::new(
            LevelFilter::Info,
            LogConfig::default(),
            File::create(&log_path)
                .with_context(|| format!("Creating log file {}", log_path.display()))?,
        ),
        TermLogger::new(
            LevelFilter::Warn,
            LogConfig::default(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ),
    ])?;
    info!("Started - {cli:?}");

    // vocabulary
    let dict = load_dict_json(&cli.dict_json)
        .with_context(|| format!("Reading {}", cli.dict_json.display()))?;
    if dict.bpe.is_some() {
        bail!(
            "{} carries BPE codes, but no BPE segmenter is available",
            cli.dict_json.display()
        );
    }
    let vocab = Vocab::from_ix_to_word(&dict.ix_to_word)
        .with_context(|| format!("Building vocabulary from {}", cli.dict_json.display()))?;
    info!("Vocabulary size (with <eos>): {}", vocab.len());

    let encoder = CaptionEncoder::new(&vocab);
    let policy = if cli.skip_empty_captions {
        EmptyCaptionPolicy::Skip
    } else {
        EmptyCaptionPolicy::Fail
    };
    let skip_ids: HashSet<u64> = cli.skip_image_ids.iter().copied().collect();

    // captions per image
    let mut corpus = RefCorpus::new();
    for split in &cli.splits {
        let ann_path = split_annotation_path(&cli.ann_dir, split);
        let img_to_anns = load_annotation_file(&ann_path)
            .with_context(|| format!("Reading {}", ann_path.display()))?
            .img_to_anns();
        info!("{split}: {} images in {}", img_to_anns.len(), ann_path.display());
        if img_to_anns.is_empty() {
            warn!("{split}: no captions found");
        }

        let bar = ProgressBar::new(img_to_anns.len() as u64);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
            )?
            .progress_chars("=>-"),
        );
        bar.set_message(split.clone());

        for (image_id, captions) in img_to_anns {
            bar.inc(1);
            if skip_ids.contains(&image_id) {
                info!("Skipping image {image_id}");
                continue;
            }
            corpus
                .push_group(&encoder, &captions, policy)
                .with_context(|| format!("{split}: image {image_id}"))?;
        }
        bar.finish_and_clear();
    }
    info!("total imgs: {}", corpus.len());
    if corpus.skipped_captions > 0 {
        warn!("Skipped {} empty captions", corpus.skipped_captions);
    }

    // document frequency
    let (ngram_words, ngram_idxs) = corpus.build_stats(cli.max_order, cli.parallel);
    info!(
        "Distinct n-grams: {} words, {} indices",
        ngram_words.len(),
        ngram_idxs.len()
    );

    let words_path = output_path(&cli.output_prefix, "words", cli.format);
    write_stats(&words_path, &ngram_words, cli.format)
        .with_context(|| format!("Writing {}", words_path.display()))?;
    info!("Wrote {}", words_path.display());

    let idxs_path = output_path(&cli.output_prefix, "idxs", cli.format);
    write_stats(&idxs_path, &ngram_idxs, cli.format)
        .with_context(|| format!("Writing {}", idxs_path.display()))?;
    info!("Wrote {}", idxs_path.display());

    info!("Finished ✅");
    Ok(())
}
