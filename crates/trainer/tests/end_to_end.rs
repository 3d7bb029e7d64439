use std::fs;
use std::io::Cursor;

use nlm_core::NetworkConfig;
use tokenizer::Vocab;
use trainer::{TrainError, TrainState, Trainer, TrainerConfig};

const TOY_CORPUS: &str = "the cat sat on the mat\n\
the dog sat on the log\n\
a cat saw the dog\n\
the dog saw a cat\n\
a dog sat on a mat\n";

fn small_model(context_size: i64) -> NetworkConfig {
    NetworkConfig {
        context_size,
        embedding_size: 10,
        hidden_size: 10,
        ..Default::default()
    }
}

#[test]
fn scores_unseen_word_as_unknown() {
    let mut vocab = Vocab::new();
    for token in ["the", "cat", "sat", "<UNK>", "<S>", "</S>"] {
        vocab.add(token);
    }
    let trainer = Trainer::new(small_model(2), TrainerConfig::default(), vocab).unwrap();

    let mut out = Vec::new();
    let scored = trainer.score(Cursor::new("the dog sat\n"), &mut out).unwrap();
    assert_eq!(scored, 1);

    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 1);
    let average: f64 = lines[0].trim().parse().unwrap();
    assert!(average.is_finite());
    assert!(average <= 0.0);

    // "dog" contributes exactly what "<UNK>" does.
    let unk_line = trainer.line_tally("the <UNK> sat").unwrap();
    assert_eq!(trainer.line_tally("the dog sat").unwrap(), unk_line);
    assert_eq!(unk_line.tokens(), 4);
}

#[test]
fn repeated_passes_lower_perplexity() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = dir.path().join("train.txt");
    fs::write(&corpus, TOY_CORPUS).unwrap();

    let mut trainer =
        Trainer::from_corpus(&corpus, small_model(3), TrainerConfig::default()).unwrap();
    let initial = trainer.perplexity(&corpus).unwrap();

    let mut pass_perplexities = Vec::new();
    for _ in 0..15 {
        let outcome = trainer.train(&corpus, None).unwrap();
        assert_eq!(outcome.state, TrainState::Exhausted);
        pass_perplexities.push(outcome.perplexity);
    }
    let last = *pass_perplexities.last().unwrap();

    // Not a strict invariant per pass, but over many passes the trend holds.
    assert!(last < pass_perplexities[0]);
    assert!(trainer.perplexity(&corpus).unwrap() < initial);
}

#[test]
fn held_out_evaluation_runs_every_epoch() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = dir.path().join("train.txt");
    let dev = dir.path().join("dev.txt");
    fs::write(&corpus, TOY_CORPUS).unwrap();
    fs::write(&dev, "the cat sat on the log\na dog saw the mat\n").unwrap();

    let config = TrainerConfig {
        epoch_lines: 2,
        ..Default::default()
    };
    let mut trainer = Trainer::from_corpus(&corpus, small_model(3), config).unwrap();
    let outcome = trainer.train(&corpus, Some(dev.as_path())).unwrap();

    match outcome.state {
        TrainState::Exhausted => {
            assert_eq!(outcome.lines, 5);
            assert_eq!(outcome.evaluations, 2);
        }
        TrainState::Converged => assert!(outcome.evaluations >= 2),
    }
    assert!(outcome.learning_rate <= 0.1);
}

#[test]
fn stalled_held_out_perplexity_converges_early() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = dir.path().join("train.txt");
    fs::write(&corpus, TOY_CORPUS).unwrap();

    // A tolerance this large makes every evaluation after the first a failure.
    let config = TrainerConfig {
        epoch_lines: 1,
        improvement_tolerance: 100.0,
        ..Default::default()
    };
    let mut annealed = Trainer::from_corpus(&corpus, small_model(3), config).unwrap();
    let outcome = annealed.train(&corpus, Some(corpus.as_path())).unwrap();

    assert_eq!(outcome.state, TrainState::Converged);
    assert_eq!(outcome.evaluations, 3);
    assert_eq!(outcome.lines, 3);
    assert_eq!(outcome.learning_rate, 0.05);

    // Same seed and lines, but the third line trained at the full rate.
    let mut constant =
        Trainer::from_corpus(&corpus, small_model(3), TrainerConfig::default()).unwrap();
    let first_three: String = TOY_CORPUS.lines().take(3).map(|l| format!("{}\n", l)).collect();
    let reference = constant
        .train_reader(Cursor::new(first_three), None)
        .unwrap();
    assert_eq!(reference.tokens, outcome.tokens);
    assert_ne!(
        annealed.perplexity(&corpus).unwrap(),
        constant.perplexity(&corpus).unwrap()
    );
}

#[test]
fn evaluation_interval_longer_than_corpus_exhausts_input() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = dir.path().join("train.txt");
    fs::write(&corpus, TOY_CORPUS).unwrap();

    let config = TrainerConfig {
        epoch_lines: 5,
        improvement_tolerance: 1.0,
        ..Default::default()
    };
    let mut trainer = Trainer::from_corpus(&corpus, small_model(3), config).unwrap();
    assert_eq!(trainer.config().epoch_lines, 5);
    let outcome = trainer.train(&corpus, Some(corpus.as_path())).unwrap();

    // The only evaluation compares against no previous result, so it cannot fail.
    assert_eq!(outcome.state, TrainState::Exhausted);
    assert_eq!(outcome.evaluations, 1);
    assert_eq!(outcome.lines, 5);
    assert_eq!(outcome.learning_rate, 0.1);
}

#[test]
fn missing_files_abort() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = dir.path().join("train.txt");
    fs::write(&corpus, TOY_CORPUS).unwrap();
    let missing = dir.path().join("missing.txt");

    assert!(matches!(
        Trainer::from_corpus(&missing, small_model(3), TrainerConfig::default()),
        Err(TrainError::Open { .. })
    ));

    let config = TrainerConfig {
        epoch_lines: 1,
        ..Default::default()
    };
    let mut trainer = Trainer::from_corpus(&corpus, small_model(3), config).unwrap();
    assert!(matches!(
        trainer.train(&corpus, Some(missing.as_path())),
        Err(TrainError::Open { .. })
    ));
    assert!(matches!(
        trainer.score_file(&missing, dir.path().join("out.txt")),
        Err(TrainError::Open { .. })
    ));
}

#[test]
fn score_file_writes_one_line_per_sentence() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = dir.path().join("train.txt");
    let input = dir.path().join("score.txt");
    let output = dir.path().join("scores.txt");
    fs::write(&corpus, TOY_CORPUS).unwrap();
    fs::write(&input, "the cat sat\n\nzebra zebra\na dog\n").unwrap();

    let mut trainer =
        Trainer::from_corpus(&corpus, small_model(3), TrainerConfig::default()).unwrap();
    trainer.train(&corpus, None).unwrap();

    assert_eq!(trainer.score_file(&input, &output).unwrap(), 4);
    let written = fs::read_to_string(&output).unwrap();
    let scores: Vec<f64> = written.lines().map(|l| l.parse().unwrap()).collect();
    assert_eq!(scores.len(), 4);
    assert!(scores.iter().all(|s| s.is_finite() && *s <= 0.0));
}
