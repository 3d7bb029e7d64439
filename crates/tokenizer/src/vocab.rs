use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::error::{Result, TokenizerError};

/// One line of the on-disk vocabulary listing. Ids are implied by position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabEntry {
    pub token: String,
    pub count: f64,
}

/// Token <-> id map with occurrence counts.
///
/// Ids are dense and handed out in first-seen order, so `tokens[id]` and
/// `counts[id]` are the reverse lookups.
#[derive(Debug, Clone, Default)]
pub struct Vocab {
    token_to_id: HashMap<String, u32>,
    tokens: Vec<String>,
    counts: Vec<f64>,
}

impl Vocab {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one occurrence of `token`, assigning the next id if it is new.
    pub fn add(&mut self, token: &str) -> u32 {
        if let Some(&id) = self.token_to_id.get(token) {
            self.counts[id as usize] += 1.0;
            return id;
        }
        let id = self.tokens.len() as u32;
        self.token_to_id.insert(token.to_string(), id);
        self.tokens.push(token.to_string());
        self.counts.push(1.0);
        id
    }

    pub fn get_id(&self, token: &str) -> Option<u32> {
        self.token_to_id.get(token).copied()
    }

    pub fn get_token(&self, id: u32) -> Option<&str> {
        self.tokens.get(id as usize).map(String::as_str)
    }

    /// Occurrence count of `token`; 0 when it was never added.
    pub fn get_count(&self, token: &str) -> f64 {
        self.get_id(token)
            .map(|id| self.counts[id as usize])
            .unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// (token, id, count) in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32, f64)> + '_ {
        self.tokens
            .iter()
            .zip(self.counts.iter())
            .enumerate()
            .map(|(id, (token, &count))| (token.as_str(), id as u32, count))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let entries: Vec<VocabEntry> = self
            .iter()
            .map(|(token, _, count)| VocabEntry {
                token: token.to_string(),
                count,
            })
            .collect();
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &entries)?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let entries: Vec<VocabEntry> = serde_json::from_reader(reader)?;

        let mut vocab = Self::new();
        for entry in entries {
            if vocab.token_to_id.contains_key(&entry.token) {
                return Err(TokenizerError::Corrupt(format!(
                    "duplicate token {:?}",
                    entry.token
                )));
            }
            let id = vocab.add(&entry.token);
            vocab.counts[id as usize] = entry.count;
        }
        Ok(vocab)
    }
}
