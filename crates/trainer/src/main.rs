use anyhow::{Context, Result};
use clap::Parser;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

use nlm_core::NetworkConfig;
use trainer::{Trainer, TrainerConfig};

/// Train a feed-forward n-gram language model and score sentences with it.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Training corpus, one sentence per line
    train: PathBuf,

    /// Held-out corpus used for learning-rate annealing and early stopping
    #[arg(short, long)]
    dev: Option<PathBuf>,

    /// Sentences to score after training
    #[arg(long, requires = "score_output")]
    score_input: Option<PathBuf>,

    /// Where to write one average log10 probability per scored sentence
    #[arg(long, requires = "score_input")]
    score_output: Option<PathBuf>,

    #[arg(long, default_value = "configs/model_config.yaml")]
    model_config: PathBuf,

    #[arg(long, default_value = "configs/training_config.yaml")]
    training_config: PathBuf,

    /// Dump the vocabulary (tokens and counts, id order) as JSON
    #[arg(long)]
    vocab_out: Option<PathBuf>,

    /// Override the initialisation seed from the model config
    #[arg(long)]
    seed: Option<u64>,
}

fn load_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {:?}", path))?;
        serde_yaml::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))
    } else {
        Ok(T::default())
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    // Examples are processed one at a time; keep libtorch on one thread.
    tch::set_num_threads(1);

    let mut model_config: NetworkConfig = load_or_default(&cli.model_config)?;
    if let Some(seed) = cli.seed {
        model_config.seed = seed;
    }
    let trainer_config: TrainerConfig = load_or_default(&cli.training_config)?;

    let mut trainer = Trainer::from_corpus(&cli.train, model_config, trainer_config)
        .context("Failed to set up the model")?;
    println!("Vocabulary size: {}", trainer.vocab().len());

    if let Some(path) = &cli.vocab_out {
        trainer
            .vocab()
            .save(path)
            .with_context(|| format!("Failed to save vocabulary to {:?}", path))?;
    }

    let outcome = trainer
        .train(&cli.train, cli.dev.as_deref())
        .context("Training failed")?;
    println!(
        "Training finished ({:?}) after {} lines: perplexity {:.4}, learning rate {}",
        outcome.state, outcome.lines, outcome.perplexity, outcome.learning_rate
    );

    if let Some(dev) = &cli.dev {
        let dev_perplexity = trainer.perplexity(dev).context("Evaluation failed")?;
        println!("Held-out perplexity: {:.4}", dev_perplexity);
    }

    if let (Some(input), Some(output)) = (&cli.score_input, &cli.score_output) {
        let scored = trainer
            .score_file(input, output)
            .context("Scoring failed")?;
        println!("Scored {} sentences into {:?}", scored, output);
    }

    Ok(())
}
