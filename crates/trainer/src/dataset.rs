use tokenizer::{tokenize, SpecialTokens, Vocab};

use crate::error::{Result, TrainError};

/// Turns raw corpus lines into padded id sequences.
#[derive(Debug, Clone)]
pub struct LineEncoder {
    unk: i64,
    start: i64,
    end: i64,
    context_width: usize,
}

impl LineEncoder {
    pub fn new(vocab: &Vocab, special: &SpecialTokens, context_width: usize) -> Result<Self> {
        let lookup = |token: &str| {
            vocab
                .get_id(token)
                .map(i64::from)
                .ok_or_else(|| TrainError::MissingSpecialToken(token.to_string()))
        };
        Ok(Self {
            unk: lookup(&special.unk)?,
            start: lookup(&special.start)?,
            end: lookup(&special.end)?,
            context_width,
        })
    }

    pub fn context_width(&self) -> usize {
        self.context_width
    }

    pub fn unk_id(&self) -> i64 {
        self.unk
    }

    /// Id of `token`, or the unknown id when the vocabulary lacks it.
    pub fn token_id(&self, vocab: &Vocab, token: &str) -> i64 {
        vocab.get_id(token).map(i64::from).unwrap_or(self.unk)
    }

    /// `context_width` start markers, the line's tokens, one end marker.
    pub fn encode(&self, vocab: &Vocab, line: &str) -> Vec<i64> {
        let mut ids = vec![self.start; self.context_width];
        ids.extend(tokenize(line).map(|token| self.token_id(vocab, token)));
        ids.push(self.end);
        ids
    }
}

/// The N-1 ids preceding the current prediction target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextWindow {
    ids: Vec<i64>,
}

impl ContextWindow {
    pub fn new(initial: &[i64]) -> Self {
        Self {
            ids: initial.to_vec(),
        }
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.ids
    }

    /// Drops the oldest id and appends `id`.
    pub fn slide(&mut self, id: i64) {
        if self.ids.is_empty() {
            return;
        }
        self.ids.rotate_left(1);
        if let Some(last) = self.ids.last_mut() {
            *last = id;
        }
    }
}

/// Calls `f(context, target)` for every target after the first `width` ids.
pub fn for_each_example<F>(ids: &[i64], width: usize, mut f: F) -> Result<()>
where
    F: FnMut(&[i64], i64) -> Result<()>,
{
    if ids.len() <= width {
        return Ok(());
    }
    let mut window = ContextWindow::new(&ids[..width]);
    for &target in &ids[width..] {
        f(window.as_slice(), target)?;
        window.slide(target);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_vocab() -> Vocab {
        let mut vocab = Vocab::new();
        for token in ["the", "cat", "sat", "<UNK>", "<S>", "</S>"] {
            vocab.add(token);
        }
        vocab
    }

    #[test]
    fn unseen_words_map_to_unknown() {
        let vocab = toy_vocab();
        let encoder = LineEncoder::new(&vocab, &SpecialTokens::default(), 1).unwrap();

        assert_eq!(encoder.encode(&vocab, "the dog sat"), vec![4, 0, 3, 2, 5]);
        assert_eq!(encoder.token_id(&vocab, "dog"), encoder.unk_id());
    }

    #[test]
    fn pads_with_one_start_marker_per_context_position() {
        let vocab = toy_vocab();
        let encoder = LineEncoder::new(&vocab, &SpecialTokens::default(), 3).unwrap();

        assert_eq!(encoder.encode(&vocab, "  cat\t"), vec![4, 4, 4, 1, 5]);
        assert_eq!(encoder.encode(&vocab, ""), vec![4, 4, 4, 5]);
    }

    #[test]
    fn missing_reserved_token_is_reported() {
        let mut vocab = Vocab::new();
        vocab.add("<UNK>");
        vocab.add("<S>");
        let err = LineEncoder::new(&vocab, &SpecialTokens::default(), 2).unwrap_err();
        assert!(matches!(err, TrainError::MissingSpecialToken(token) if token == "</S>"));
    }

    #[test]
    fn window_slides_oldest_out() {
        let mut window = ContextWindow::new(&[1, 2, 3]);
        window.slide(4);
        assert_eq!(window.as_slice(), &[2, 3, 4]);
        window.slide(4);
        assert_eq!(window.as_slice(), &[3, 4, 4]);
    }

    #[test]
    fn examples_cover_every_target_once() {
        let mut seen = Vec::new();
        for_each_example(&[4, 4, 0, 1, 5], 2, |context, target| {
            seen.push((context.to_vec(), target));
            Ok(())
        })
        .unwrap();

        assert_eq!(
            seen,
            vec![
                (vec![4, 4], 0),
                (vec![4, 0], 1),
                (vec![0, 1], 5),
            ]
        );
    }
}
