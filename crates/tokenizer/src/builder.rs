use log::debug;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::Result;
use crate::special::SpecialTokens;
use crate::vocab::Vocab;

/// Whitespace tokenization shared by vocabulary construction, training and scoring.
pub fn tokenize(line: &str) -> impl Iterator<Item = &str> {
    line.split_whitespace()
}

/// Builds a vocabulary with a single counting pass over a corpus.
pub struct VocabBuilder {
    special_tokens: SpecialTokens,
}

impl VocabBuilder {
    pub fn new(special_tokens: SpecialTokens) -> Self {
        Self { special_tokens }
    }

    pub fn build<P: AsRef<Path>>(&self, files: &[P]) -> Result<Vocab> {
        let mut vocab = Vocab::new();
        for path in files {
            let file = File::open(path)?;
            self.count_into(&mut vocab, BufReader::new(file))?;
        }
        Ok(self.finish(vocab))
    }

    pub fn build_from_reader<R: BufRead>(&self, reader: R) -> Result<Vocab> {
        let mut vocab = Vocab::new();
        self.count_into(&mut vocab, reader)?;
        Ok(self.finish(vocab))
    }

    fn count_into<R: BufRead>(&self, vocab: &mut Vocab, reader: R) -> Result<()> {
        for line in reader.lines() {
            let line = line?;
            for token in tokenize(&line) {
                vocab.add(token);
            }
        }
        Ok(())
    }

    fn finish(&self, mut vocab: Vocab) -> Vocab {
        let corpus_types = vocab.len();
        for token in self.special_tokens.as_array() {
            vocab.add(token);
        }
        debug!(
            "Vocabulary built: {} corpus types, {} entries total",
            corpus_types,
            vocab.len()
        );
        vocab
    }
}

impl Default for VocabBuilder {
    fn default() -> Self {
        Self::new(SpecialTokens::default())
    }
}
