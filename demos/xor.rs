//! Trains a single dense cell on XOR and prints its final outputs.
//!
//! This is the only place in the crate that installs a global `tracing`
//! subscriber — the library itself never does, so embedding applications
//! stay free to install their own.

use gradnet::activations::Activation;
use gradnet::config::TrainerConfig;
use gradnet::metrics::{CategoryMatcher, Metrics};
use gradnet::pattern::{Pattern, PatternSource, VecPatternSource};
use gradnet::task::NullProgressListener;
use gradnet::{CellFactory, Network, Trainer};

fn xor_patterns() -> Vec<Pattern> {
    vec![
        Pattern::new(vec![vec![0.0, 0.0]], vec![vec![0.0]]),
        Pattern::new(vec![vec![0.0, 1.0]], vec![vec![1.0]]),
        Pattern::new(vec![vec![1.0, 0.0]], vec![vec![1.0]]),
        Pattern::new(vec![vec![1.0, 1.0]], vec![vec![0.0]]),
    ]
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let mut net = Network::new();
    CellFactory::dense(&mut net, 2, 1, Activation::Sigmoid, 0.5, 0.2, 0.0)?;

    let mut source = VecPatternSource::new(xor_patterns());
    let listener = NullProgressListener::new();
    let trainer = Trainer::new(TrainerConfig { epochs: 5000 });
    trainer.execute(&mut net, &mut source, &listener)?;

    let mut metrics = Metrics::new("xor", vec![1]).with_matcher(CategoryMatcher);
    source.reset();
    while source.has_next() {
        let pattern = source.next()?;
        net.forward(&pattern.inputs)?;
        let actual = net.output_values();
        metrics.compute(&pattern.expected, &actual)?;
        println!("{:?} -> {:?} (expected {:?})", pattern.inputs[0], actual[0], pattern.expected[0]);
    }
    println!(
        "match rate: {:.2}, mean abs error: {:.4}",
        metrics.match_rate(),
        metrics.error_avg()
    );

    Ok(())
}
