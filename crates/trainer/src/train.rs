use log::{info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use nlm_core::{Network, NetworkConfig};
use tokenizer::{Vocab, VocabBuilder};

use crate::dataset::{for_each_example, LineEncoder};
use crate::error::{Result, TrainError};
use crate::schedule::{Annealing, Decision};
use crate::tally::LogProbTally;
use crate::TrainerConfig;

/// How a training pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainState {
    /// Held-out perplexity stopped improving after the learning rate was cut.
    Converged,
    /// The whole corpus was consumed.
    Exhausted,
}

#[derive(Debug, Clone)]
pub struct TrainOutcome {
    /// Perplexity over every token trained on in this pass.
    pub perplexity: f64,
    pub state: TrainState,
    /// Learning rate in effect when the pass ended.
    pub learning_rate: f64,
    pub evaluations: usize,
    pub lines: usize,
    pub tokens: usize,
}

fn open(path: &Path) -> Result<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| TrainError::Open {
            path: path.to_path_buf(),
            source,
        })
}

/// Owns the vocabulary and network, and drives training, held-out
/// evaluation and sentence scoring over line-oriented text.
pub struct Trainer {
    config: TrainerConfig,
    vocab: Vocab,
    encoder: LineEncoder,
    network: Network,
}

impl Trainer {
    pub fn new(
        model_config: NetworkConfig,
        trainer_config: TrainerConfig,
        vocab: Vocab,
    ) -> Result<Self> {
        trainer_config.validate()?;
        let model_config = NetworkConfig {
            vocab_size: vocab.len() as i64,
            ..model_config
        };
        let network = Network::new(&model_config)?;
        let encoder = LineEncoder::new(
            &vocab,
            &trainer_config.special_tokens,
            model_config.context_width(),
        )?;

        Ok(Self {
            config: trainer_config,
            vocab,
            encoder,
            network,
        })
    }

    /// Builds the vocabulary from `corpus` and sizes a fresh network to it.
    pub fn from_corpus<P: AsRef<Path>>(
        corpus: P,
        model_config: NetworkConfig,
        trainer_config: TrainerConfig,
    ) -> Result<Self> {
        info!("Creating the vocabulary from {:?}", corpus.as_ref());
        let builder = VocabBuilder::new(trainer_config.special_tokens.clone());
        let vocab = builder.build_from_reader(open(corpus.as_ref())?)?;
        info!("Vocabulary size: {}", vocab.len());
        Self::new(model_config, trainer_config, vocab)
    }

    pub fn vocab(&self) -> &Vocab {
        &self.vocab
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    pub fn train<P: AsRef<Path>>(&mut self, corpus: P, dev: Option<&Path>) -> Result<TrainOutcome> {
        let reader = open(corpus.as_ref())?;
        self.train_reader(reader, dev)
    }

    /// One training pass over `reader`, one example at a time.
    ///
    /// With a held-out file, every `epoch_lines` lines the held-out
    /// perplexity is measured and fed to the annealing schedule, which may
    /// halve the learning rate or end the pass early.
    pub fn train_reader<R: BufRead>(&mut self, reader: R, dev: Option<&Path>) -> Result<TrainOutcome> {
        let width = self.encoder.context_width();
        let mut schedule = Annealing::new(
            self.config.learning_rate,
            self.config.improvement_tolerance,
        );
        let mut tally = LogProbTally::default();
        let mut lines = 0;
        let mut evaluations = 0;
        let mut state = TrainState::Exhausted;

        info!("Epoch 0 (learning rate = {})", schedule.learning_rate());
        for line in reader.lines() {
            let line = line?;
            let ids = self.encoder.encode(&self.vocab, &line);
            let learning_rate = schedule.learning_rate();
            let network = &mut self.network;
            for_each_example(&ids, width, |context, target| {
                tally.add(network.train_step(context, target, learning_rate)?);
                Ok(())
            })?;
            lines += 1;

            let dev = match dev {
                Some(dev) if lines % self.config.epoch_lines == 0 => dev,
                _ => continue,
            };
            info!("PPL_train: {:.4}", tally.perplexity()?);
            let dev_perplexity = self.perplexity(dev)?;
            info!("PPL_dev: {:.4}", dev_perplexity);
            evaluations += 1;

            match schedule.observe(dev_perplexity) {
                Decision::Stop => {
                    state = TrainState::Converged;
                    break;
                }
                Decision::Continue => info!(
                    "Epoch {} (learning rate = {})",
                    evaluations,
                    schedule.learning_rate()
                ),
            }
        }

        let perplexity = tally.perplexity()?;
        if state == TrainState::Converged {
            warn!("Stopped early after {} lines", lines);
        }
        info!(
            "Trained on {} lines, {} tokens, perplexity {:.4}",
            lines,
            tally.tokens(),
            perplexity
        );

        Ok(TrainOutcome {
            perplexity,
            state,
            learning_rate: schedule.learning_rate(),
            evaluations,
            lines,
            tokens: tally.tokens(),
        })
    }

    /// Log10 probabilities of every token of one line, padding included.
    pub fn line_tally(&self, line: &str) -> Result<LogProbTally> {
        let ids = self.encoder.encode(&self.vocab, line);
        let mut tally = LogProbTally::default();
        for_each_example(&ids, self.encoder.context_width(), |context, target| {
            tally.add(self.network.evaluate(context, target)?);
            Ok(())
        })?;
        Ok(tally)
    }

    /// Perplexity of a file under the current weights. Never trains.
    pub fn perplexity<P: AsRef<Path>>(&self, path: P) -> Result<f64> {
        let reader = open(path.as_ref())?;
        self.perplexity_reader(reader)
    }

    pub fn perplexity_reader<R: BufRead>(&self, reader: R) -> Result<f64> {
        let mut total = LogProbTally::default();
        for line in reader.lines() {
            let line = line?;
            let ids = self.encoder.encode(&self.vocab, &line);
            for_each_example(&ids, self.encoder.context_width(), |context, target| {
                total.add(self.network.evaluate(context, target)?);
                Ok(())
            })?;
        }
        total.perplexity()
    }

    /// Writes the average log10 probability of each input line, one per line.
    /// Returns the number of lines scored.
    pub fn score<R: BufRead, W: Write>(&self, reader: R, mut writer: W) -> Result<usize> {
        let mut scored = 0;
        for line in reader.lines() {
            let line = line?;
            let average = self.line_tally(&line)?.average()?;
            writeln!(writer, "{}", average)?;
            scored += 1;
        }
        writer.flush()?;
        Ok(scored)
    }

    pub fn score_file<P: AsRef<Path>, Q: AsRef<Path>>(&self, input: P, output: Q) -> Result<usize> {
        info!("Scoring {:?}", input.as_ref());
        let reader = open(input.as_ref())?;
        let file = File::create(output.as_ref()).map_err(|source| TrainError::Create {
            path: output.as_ref().to_path_buf(),
            source,
        })?;
        self.score(reader, BufWriter::new(file))
    }
}
