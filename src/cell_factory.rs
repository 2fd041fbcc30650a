//! Canonical cell shapes (§4.3): dense, biased, and recurrent RNN cells,
//! wired directly onto a `Network`'s arenas.

use crate::activations::Activation;
use crate::errors::GraphResult;
use crate::ids::CellId;
use crate::network::Network;

pub struct CellFactory;

impl CellFactory {
    /// Plain feed-forward cell: `input -> Weights -> Activation -> output`.
    /// No bias, no recurrence — the degenerate case of `rnn` below.
    pub fn dense(
        network: &mut Network,
        input_size: usize,
        output_size: usize,
        activation: Activation,
        eta: f32,
        alpha: f32,
        lambda: f32,
    ) -> GraphResult<CellId> {
        Self::rnn(
            network,
            input_size,
            output_size,
            activation,
            false,
            false,
            eta,
            alpha,
            lambda,
        )
    }

    /// Builds one cell named `"RNN-{in}-{out}-{ActivationClass}[-REC][-BIAS]"`
    /// per §4.3. `recurrent` adds a feedback `WeightsNode` from the
    /// activation's output back into its own trigger sum; `bias` adds a
    /// constant `BiasNode` into the same trigger sum.
    #[allow(clippy::too_many_arguments)]
    pub fn rnn(
        network: &mut Network,
        input_size: usize,
        output_size: usize,
        activation: Activation,
        recurrent: bool,
        bias: bool,
        eta: f32,
        alpha: f32,
        lambda: f32,
    ) -> GraphResult<CellId> {
        let mut name = format!("RNN-{input_size}-{output_size}-{}", activation.class_name());
        if recurrent {
            name.push_str("-REC");
        }
        if bias {
            name.push_str("-BIAS");
        }
        let cell = network.add_cell(name);

        let in_edge = network.new_edge(input_size)?;
        let mid_edge = network.new_edge(output_size)?;
        network.add_weights_node(cell, in_edge, mid_edge, eta, alpha, lambda)?;

        let mut trigger_edges = vec![mid_edge];

        let bias_edge = if bias {
            let e = network.new_edge(output_size)?;
            network.add_bias_node(cell, vec![e])?;
            trigger_edges.push(e);
            Some(e)
        } else {
            None
        };

        let out_edge = network.new_edge(output_size)?;
        let mut output_edges = vec![out_edge];

        // The recurrent feedback loop needs two distinct edges beyond the
        // externally-visible `out_edge`: a tap the activation writes
        // alongside `out_edge`, read by the recurrent `WeightsNode`; and the
        // edge that node writes back into, read as one more trigger input on
        // the activation's *next* invocation. Reusing one edge for both
        // directions would make the same node its own edge's reader and
        // writer at once, corrupting the wiring.
        let rec_tap_and_in = if recurrent {
            let rec_tap = network.new_edge(output_size)?;
            let rec_in = network.new_edge(output_size)?;
            output_edges.push(rec_tap);
            trigger_edges.push(rec_in);
            Some((rec_tap, rec_in))
        } else {
            None
        };

        network.add_activation_node(cell, trigger_edges, output_edges, activation)?;

        if let Some((rec_tap, rec_in)) = rec_tap_and_in {
            // feedback loop: activation output tap -> recurrent weights ->
            // back into the activation's own trigger sum on the next step.
            network.add_weights_node(cell, rec_tap, rec_in, eta, alpha, lambda)?;
        }
        let _ = bias_edge;

        Ok(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dense_cell_has_expected_node_count() {
        let mut net = Network::new();
        let cell = CellFactory::dense(&mut net, 3, 2, Activation::Sigmoid, 0.1, 0.0, 0.0).unwrap();
        // One weights node + one activation node.
        assert_eq!(net.cells()[cell.0].nodes().len(), 2);
    }

    #[test]
    fn biased_cell_has_bias_node() {
        let mut net = Network::new();
        let cell =
            CellFactory::rnn(&mut net, 3, 2, Activation::Sigmoid, false, true, 0.1, 0.0, 0.0).unwrap();
        assert_eq!(net.cells()[cell.0].nodes().len(), 3);
    }

    #[test]
    fn recurrent_cell_feeds_activation_output_back_into_itself() {
        let mut net = Network::new();
        let cell =
            CellFactory::rnn(&mut net, 3, 2, Activation::Tanh, true, false, 0.1, 0.0, 0.0).unwrap();
        // Weights (forward) + Activation + Weights (feedback).
        assert_eq!(net.cells()[cell.0].nodes().len(), 3);
        net.initialize().unwrap();
        net.forward(&[vec![1.0, 1.0, 1.0]]).unwrap();
    }

    #[test]
    fn cell_name_encodes_shape() {
        let mut net = Network::new();
        let cell = CellFactory::rnn(&mut net, 4, 1, Activation::Sigmoid, true, true, 0.1, 0.0, 0.0)
            .unwrap();
        let name = net.cells()[cell.0].name().to_string();
        assert_eq!(name, "RNN-4-1-Sigmoid-REC-BIAS");
    }
}
