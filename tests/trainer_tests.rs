use gradnet::activations::Activation;
use gradnet::config::TrainerConfig;
use gradnet::pattern::{Pattern, VecPatternSource};
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

#[test]
fn trains_xor_for_several_epochs_without_error() {
    let mut net = Network::new();
    CellFactory::dense(&mut net, 2, 1, Activation::Sigmoid, 0.5, 0.1, 0.0).unwrap();
    let mut source = VecPatternSource::new(xor_patterns());
    let listener = NullProgressListener::new();
    let trainer = Trainer::new(TrainerConfig { epochs: 50 });

    trainer.execute(&mut net, &mut source, &listener).unwrap();
    assert!(net.is_initialized());
    assert_eq!(net.output_values().len(), 1);
}

#[test]
fn already_initialized_network_is_reused_not_reinitialized() {
    let mut net = Network::new();
    CellFactory::dense(&mut net, 2, 1, Activation::Sigmoid, 0.5, 0.0, 0.0).unwrap();
    net.initialize().unwrap();

    let mut source = VecPatternSource::new(xor_patterns());
    let listener = NullProgressListener::new();
    let trainer = Trainer::new(TrainerConfig { epochs: 1 });
    trainer.execute(&mut net, &mut source, &listener).unwrap();
}
