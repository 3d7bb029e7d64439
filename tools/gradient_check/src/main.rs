use anyhow::Result;
use clap::{Parser, ValueEnum};
use nlm_core::{gradient_check, Activation, Network, NetworkConfig, ParameterRef};

#[derive(Clone, Copy, ValueEnum)]
enum Nonlinearity {
    Tanh,
    Sigmoid,
}

impl From<Nonlinearity> for Activation {
    fn from(value: Nonlinearity) -> Self {
        match value {
            Nonlinearity::Tanh => Activation::Tanh,
            Nonlinearity::Sigmoid => Activation::Sigmoid,
        }
    }
}

/// Compare backpropagated gradients against centered finite differences.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(long, default_value_t = 40)]
    vocab_size: i64,
    /// N-gram order (context width + 1)
    #[arg(long, default_value_t = 4)]
    context_size: i64,
    #[arg(long, default_value_t = 20)]
    embedding_size: i64,
    #[arg(long, default_value_t = 30)]
    hidden_size: i64,
    #[arg(long, value_enum, default_value_t = Nonlinearity::Tanh)]
    activation: Nonlinearity,
    #[arg(long, default_value_t = 1)]
    seed: u64,
    #[arg(long, default_value_t = 1e-4)]
    epsilon: f64,
    #[arg(long, default_value_t = 0.1)]
    learning_rate: f64,
    #[arg(long, default_value_t = 1e-5)]
    tolerance: f64,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = NetworkConfig {
        context_size: cli.context_size,
        embedding_size: cli.embedding_size,
        hidden_size: cli.hidden_size,
        vocab_size: cli.vocab_size,
        activation: cli.activation.into(),
        seed: cli.seed,
        ..Default::default()
    };
    config.validate()?;

    let width = config.context_width() as i64;
    let context: Vec<i64> = (1..=width).map(|i| i % cli.vocab_size).collect();
    let target = (width + 2) % cli.vocab_size;
    let checks = [
        ParameterRef::Embedding {
            id: context[0],
            dim: cli.embedding_size / 2,
        },
        ParameterRef::Projection {
            position: 0,
            row: cli.hidden_size / 2,
            col: cli.embedding_size / 2,
        },
        ParameterRef::Output {
            row: target,
            col: cli.hidden_size / 2,
        },
    ];

    let mut failures = 0;
    for param in checks {
        // Fresh network per check so earlier updates do not leak in.
        let mut network = Network::new(&config)?;
        let result = gradient_check(
            &mut network,
            &context,
            target,
            param,
            cli.epsilon,
            cli.learning_rate,
        )?;
        let verdict = if result.passes(cli.tolerance) {
            "PASS"
        } else {
            failures += 1;
            "FAIL"
        };
        println!(
            "{:<16} numeric {:+.10}  analytic {:+.10}  error {:.2e}  {}",
            param.to_string(),
            result.numeric,
            result.analytic,
            result.abs_error(),
            verdict
        );
    }

    if failures > 0 {
        eprintln!("Gradient check: {} of {} failed", failures, checks.len());
        std::process::exit(1);
    }
    println!("Gradient check: PASS");
    Ok(())
}
