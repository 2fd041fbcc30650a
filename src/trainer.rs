//! Drives a `Network` through a `PatternSource` for some number of epochs,
//! reporting progress and honoring cooperative cancellation (§4.5).

use tracing::info;

use crate::config::TrainerConfig;
use crate::errors::{GraphError, GraphResult};
use crate::network::Network;
use crate::pattern::PatternSource;
use crate::task::{ProgressListener, TaskState};

pub struct Trainer {
    config: TrainerConfig,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Self {
        Self { config }
    }

    /// Runs `config.epochs` passes over `source`, one `forward`/`backward`
    /// per pattern. `network` is initialized here if it isn't already; a
    /// network that fails to initialize, or a misconfigured trainer, is a
    /// hard configuration error raised before the first epoch starts.
    /// Cancellation observed between patterns ends the run in
    /// `TaskState::Cancelled`, not as an `Err`.
    #[tracing::instrument(skip(self, network, source, listener), name = "trainer_execute")]
    pub fn execute(
        &self,
        network: &mut Network,
        source: &mut dyn PatternSource,
        listener: &dyn ProgressListener,
    ) -> GraphResult<()> {
        if source.size() == 0 {
            return Err(GraphError::TrainerMisconfigured("pattern source is empty"));
        }
        if !network.is_initialized() {
            network.initialize()?;
        }
        info!(topology = %network.topology_summary(), epochs = self.config.epochs, "training started");

        listener.start(self.config.epochs);

        'epochs: for epoch in 0..self.config.epochs {
            if listener.state() == TaskState::Cancelled {
                break 'epochs;
            }
            source.reset();
            while source.has_next() {
                if listener.state() == TaskState::Cancelled {
                    break 'epochs;
                }
                let pattern = source.next()?;
                network.forward(&pattern.inputs)?;
                let actual = network.output_values();
                let deltas: Vec<Vec<f32>> = pattern
                    .expected
                    .iter()
                    .zip(actual.iter())
                    .map(|(e, a)| e.iter().zip(a.iter()).map(|(&e, &a)| e - a).collect())
                    .collect();
                network.backward(&deltas)?;
                listener.progress(epoch, self.config.epochs);
            }
        }

        listener.end();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

    use super::*;
    use crate::activations::Activation;
    use crate::cell_factory::CellFactory;
    use crate::pattern::{Pattern, VecPatternSource};
    use crate::task::TaskState;

    struct CountingCanceller {
        threshold: u64,
        count: AtomicU64,
        state: AtomicU8,
    }

    impl CountingCanceller {
        fn new(threshold: u64) -> Self {
            Self {
                threshold,
                count: AtomicU64::new(0),
                state: AtomicU8::new(1), // Running
            }
        }

        fn count(&self) -> u64 {
            self.count.load(Ordering::Relaxed)
        }
    }

    impl ProgressListener for CountingCanceller {
        fn progress(&self, _done: u64, _total: u64) {
            let c = self.count.fetch_add(1, Ordering::Relaxed) + 1;
            if c >= self.threshold {
                self.state.store(3, Ordering::Relaxed); // Cancelled
            }
        }

        fn state(&self) -> TaskState {
            match self.state.load(Ordering::Relaxed) {
                3 => TaskState::Cancelled,
                _ => TaskState::Running,
            }
        }
    }

    fn xor_network() -> Network {
        let mut net = Network::new();
        CellFactory::dense(&mut net, 2, 1, Activation::Sigmoid, 0.5, 0.0, 0.0).unwrap();
        net
    }

    #[test]
    fn cancellation_stops_updates_at_the_exact_count() {
        // Scenario 6 in §8: cancellation mid-epoch stops at exactly 2017
        // pattern updates, not one more and not one fewer.
        let mut net = xor_network();
        let pattern = Pattern::new(vec![vec![0.0, 1.0]], vec![vec![1.0]]);
        let patterns: Vec<Pattern> = std::iter::repeat(pattern).take(10_000).collect();
        let mut source = VecPatternSource::new(patterns);
        let listener = CountingCanceller::new(2017);
        let trainer = Trainer::new(TrainerConfig { epochs: 100 });

        trainer.execute(&mut net, &mut source, &listener).unwrap();
        assert_eq!(listener.count(), 2017);
        assert_eq!(listener.state(), TaskState::Cancelled);
    }

    #[test]
    fn zero_epochs_runs_no_updates_but_still_initializes() {
        let mut net = xor_network();
        let mut source = VecPatternSource::new(vec![Pattern::new(
            vec![vec![0.0, 0.0]],
            vec![vec![0.0]],
        )]);
        let listener = crate::task::NullProgressListener::new();
        let trainer = Trainer::new(TrainerConfig { epochs: 0 });

        trainer.execute(&mut net, &mut source, &listener).unwrap();
        assert!(net.is_initialized());
    }

    #[test]
    fn empty_pattern_source_is_a_configuration_error() {
        let mut net = xor_network();
        let mut source = VecPatternSource::new(Vec::new());
        let listener = crate::task::NullProgressListener::new();
        let trainer = Trainer::new(TrainerConfig { epochs: 1 });

        assert!(trainer.execute(&mut net, &mut source, &listener).is_err());
    }
}
