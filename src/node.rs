//! The three concrete node kinds and the two dispatch points (`forward`,
//! `backward`) that the scheduled graph walk calls on each of them.
//!
//! Per the "Polymorphic nodes" design note, the catalog is closed — there is
//! no arbitrary user-defined `Operation` here, only a hand-written
//! forward/backward for each of the three kinds — so a tagged `enum` with a
//! `match` in each dispatch point is the whole story; no trait objects, no
//! dynamic dispatch, allocation-free during the walk beyond the small
//! `Vec<f32>` value/delta vectors edges already carry.

use ndarray::Array2;
use ndarray_rand::rand_distr::StandardNormal;
use ndarray_rand::RandomExt;
use uuid::Uuid;

use crate::activations::Activation;
use crate::edge::Edge;
use crate::errors::{GraphError, GraphResult};
use crate::ids::{new_uuid, CellId, EdgeId, NodeId};

#[derive(Debug, Clone)]
pub struct WeightsNode {
    uuid: Uuid,
    cell: CellId,
    input_edge: EdgeId,
    output_edge: EdgeId,
    /// `input_size x output_size` weight matrix.
    pub weights: Array2<f32>,
    /// Momentum buffer, same shape as `weights`.
    pub gradient_memory: Array2<f32>,
    pub eta: f32,
    pub alpha: f32,
    pub lambda: f32,
}

impl WeightsNode {
    pub fn new(
        cell: CellId,
        input_edge: EdgeId,
        output_edge: EdgeId,
        input_size: usize,
        output_size: usize,
        eta: f32,
        alpha: f32,
        lambda: f32,
    ) -> Self {
        let weights = Array2::random((input_size, output_size), StandardNormal);
        let gradient_memory = Array2::zeros((input_size, output_size));
        Self {
            uuid: new_uuid(),
            cell,
            input_edge,
            output_edge,
            weights,
            gradient_memory,
            eta,
            alpha,
            lambda,
        }
    }

    pub fn input_size(&self) -> usize {
        self.weights.nrows()
    }

    pub fn output_size(&self) -> usize {
        self.weights.ncols()
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub(crate) fn set_uuid(&mut self, uuid: Uuid) {
        self.uuid = uuid;
    }

    /// Patches the edges this node reads/writes. Used only when restoring a
    /// node from a persisted snapshot, where edge wiring is resolved from
    /// the edges themselves (see `persistence`) after the node already
    /// exists.
    pub(crate) fn set_input_edge(&mut self, e: EdgeId) {
        self.input_edge = e;
    }

    pub(crate) fn set_output_edge(&mut self, e: EdgeId) {
        self.output_edge = e;
    }

    fn forward(&self, edges: &mut [Edge]) -> GraphResult<()> {
        let x = edges[self.input_edge.0].forward_values();
        let (in_n, out_n) = (self.input_size(), self.output_size());
        let mut y = vec![0.0f32; out_n];
        for o in 0..out_n {
            let mut sum = 0.0;
            for i in 0..in_n {
                sum += x[i] * self.weights[[i, o]];
            }
            y[o] = sum;
        }
        edges[self.output_edge.0].push_forward(self.output_edge, y)
    }

    /// SGD with momentum and weight decay, against the pre-update weight
    /// matrix for the upstream-delta accumulation (see §4.2.1, step order).
    fn backward(&mut self, edges: &mut [Edge]) -> GraphResult<()> {
        let x = edges[self.input_edge.0].forward_values();
        let delta_out = edges[self.output_edge.0].backward_deltas();
        let (in_n, out_n) = (self.input_size(), self.output_size());
        let mut delta_in = vec![0.0f32; in_n];

        for i in 0..in_n {
            for o in 0..out_n {
                let g_new = (1.0 - self.alpha) * self.eta * delta_out[o] * x[i]
                    + self.alpha * self.gradient_memory[[i, o]];
                delta_in[i] += self.weights[[i, o]] * delta_out[o];
                self.gradient_memory[[i, o]] = g_new;
                self.weights[[i, o]] = (self.weights[[i, o]] + g_new) * (1.0 - self.eta * self.lambda);
            }
        }

        edges[self.input_edge.0].push_backward(self.input_edge, delta_in)
    }
}

#[derive(Debug, Clone)]
pub struct BiasNode {
    uuid: Uuid,
    cell: CellId,
    output_edges: Vec<EdgeId>,
    /// Constant output vector, initial values all `1.0`.
    pub values: Vec<f32>,
}

impl BiasNode {
    pub fn new(cell: CellId, output_edges: Vec<EdgeId>, size: usize) -> Self {
        Self {
            uuid: new_uuid(),
            cell,
            output_edges,
            values: vec![1.0; size],
        }
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub(crate) fn set_uuid(&mut self, uuid: Uuid) {
        self.uuid = uuid;
    }

    /// Appends one more edge this node writes. Used only when restoring
    /// from a persisted snapshot (see `persistence`), where a bias node's
    /// output edges are discovered by scanning edges for the ones whose
    /// `input-node` names this node, one at a time.
    pub(crate) fn push_output_edge(&mut self, e: EdgeId) {
        self.output_edges.push(e);
    }

    fn forward(&self, edges: &mut [Edge]) -> GraphResult<()> {
        for &e in &self.output_edges {
            edges[e.0].push_forward(e, self.values.clone())?;
        }
        Ok(())
    }

    // Backward is a no-op: it neither reads nor writes deltas.
}

#[derive(Debug, Clone)]
pub struct ActivationNode {
    uuid: Uuid,
    cell: CellId,
    input_edges: Vec<EdgeId>,
    /// Usually a single edge; the recurrent `CellFactory` shape needs a
    /// second output edge feeding the recurrent `WeightsNode` alongside the
    /// externally-visible one (see DESIGN.md, "activation fan-out in
    /// recurrent cells"). All output edges carry the same pushed value.
    output_edges: Vec<EdgeId>,
    size: usize,
    pub activation: Activation,
}

impl ActivationNode {
    pub fn new(
        cell: CellId,
        input_edges: Vec<EdgeId>,
        output_edges: Vec<EdgeId>,
        size: usize,
        activation: Activation,
    ) -> Self {
        Self {
            uuid: new_uuid(),
            cell,
            input_edges,
            output_edges,
            size,
            activation,
        }
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub(crate) fn set_uuid(&mut self, uuid: Uuid) {
        self.uuid = uuid;
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Appends one more edge this node reads/writes. Used only when
    /// restoring from a persisted snapshot (see `persistence`).
    pub(crate) fn push_input_edge(&mut self, e: EdgeId) {
        self.input_edges.push(e);
    }

    pub(crate) fn push_output_edge(&mut self, e: EdgeId) {
        self.output_edges.push(e);
    }

    fn forward(&self, edges: &mut [Edge]) -> GraphResult<()> {
        let mut trigger = vec![0.0f32; self.size];
        for &e in &self.input_edges {
            let v = edges[e.0].forward_values();
            for i in 0..self.size {
                trigger[i] += v[i];
            }
        }
        let y = self.activation.activations(&trigger);
        for &e in &self.output_edges {
            edges[e.0].push_forward(e, y.clone())?;
        }
        Ok(())
    }

    fn backward(&self, edges: &mut [Edge]) -> GraphResult<()> {
        let y = edges[self.output_edges[0].0].forward_values();
        let mut delta_out = vec![0.0f32; self.size];
        for &e in &self.output_edges {
            let d = edges[e.0].backward_deltas();
            for i in 0..self.size {
                delta_out[i] += d[i];
            }
        }
        let d = self.activation.derivatives(&y);
        let delta_in: Vec<f32> = delta_out.iter().zip(d.iter()).map(|(&o, &d)| o * d).collect();
        // Every input edge receives the same gradient: each contributed
        // additively to the trigger sum, so the partial derivative of the
        // trigger w.r.t. any one of them is 1.
        for &e in &self.input_edges {
            edges[e.0].push_backward(e, delta_in.clone())?;
        }
        Ok(())
    }
}

/// A processing unit: one of the three concrete node kinds.
#[derive(Debug, Clone)]
pub enum Node {
    Weights(WeightsNode),
    Bias(BiasNode),
    Activation(ActivationNode),
}

impl Node {
    pub fn uuid(&self) -> Uuid {
        match self {
            Node::Weights(n) => n.uuid,
            Node::Bias(n) => n.uuid,
            Node::Activation(n) => n.uuid,
        }
    }

    pub fn cell(&self) -> CellId {
        match self {
            Node::Weights(n) => n.cell,
            Node::Bias(n) => n.cell,
            Node::Activation(n) => n.cell,
        }
    }

    /// All edges this node reads during forward (i.e. the edges whose
    /// writer is this node's predecessor — used by the scheduler).
    pub fn input_edges(&self) -> Vec<EdgeId> {
        match self {
            Node::Weights(n) => vec![n.input_edge],
            Node::Bias(_) => Vec::new(),
            Node::Activation(n) => n.input_edges.clone(),
        }
    }

    /// All edges this node writes during forward.
    pub fn output_edges(&self) -> Vec<EdgeId> {
        match self {
            Node::Weights(n) => vec![n.output_edge],
            Node::Bias(n) => n.output_edges.clone(),
            Node::Activation(n) => n.output_edges.clone(),
        }
    }

    pub fn as_weights(&self) -> Option<&WeightsNode> {
        match self {
            Node::Weights(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_weights_mut(&mut self) -> Option<&mut WeightsNode> {
        match self {
            Node::Weights(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_bias(&self) -> Option<&BiasNode> {
        match self {
            Node::Bias(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_activation(&self) -> Option<&ActivationNode> {
        match self {
            Node::Activation(n) => Some(n),
            _ => None,
        }
    }

    /// The only two dispatch points: forward and backward, both called
    /// exclusively during the scheduled layer walk.
    pub fn forward(&self, edges: &mut [Edge]) -> GraphResult<()> {
        match self {
            Node::Weights(n) => n.forward(edges),
            Node::Bias(n) => n.forward(edges),
            Node::Activation(n) => n.forward(edges),
        }
    }

    pub fn backward(&mut self, edges: &mut [Edge]) -> GraphResult<()> {
        match self {
            Node::Weights(n) => n.backward(edges),
            Node::Bias(_) => Ok(()),
            Node::Activation(n) => n.backward(edges),
        }
    }
}

pub(crate) fn validate_weights_arity(
    id: NodeId,
    input_edges: usize,
    output_edges: usize,
) -> GraphResult<()> {
    if input_edges != 1 {
        return Err(GraphError::WrongInputArity {
            node: id,
            expected: "exactly 1",
            found: input_edges,
        });
    }
    if output_edges != 1 {
        return Err(GraphError::WrongOutputArity {
            node: id,
            expected: "exactly 1",
            found: output_edges,
        });
    }
    Ok(())
}

pub(crate) fn validate_activation_arity(
    id: NodeId,
    input_edges: usize,
    output_edges: usize,
) -> GraphResult<()> {
    if input_edges < 1 {
        return Err(GraphError::WrongInputArity {
            node: id,
            expected: "at least 1",
            found: input_edges,
        });
    }
    if output_edges < 1 {
        return Err(GraphError::WrongOutputArity {
            node: id,
            expected: "at least 1",
            found: output_edges,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::Edge;

    fn approx(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-5, "{a} vs {b}");
    }

    #[test]
    fn bias_forward_pushes_constant_and_backward_is_noop() {
        let mut edges = vec![Edge::new(2)];
        let mut bias = BiasNode::new(CellId(0), vec![EdgeId(0)], 2);
        bias.forward(&mut edges).unwrap();
        assert_eq!(edges[0].forward_values(), vec![1.0, 1.0]);
        let before = bias.values.clone();
        Node::Bias(bias.clone()).backward(&mut edges).ok();
        assert_eq!(bias.values, before);
    }

    #[test]
    fn weights_forward_zero_weight_is_zero_output() {
        let mut edges = vec![Edge::new(1), Edge::new(1)];
        edges[0].push_forward(EdgeId(0), vec![0.5]).unwrap();
        let mut wn = WeightsNode::new(CellId(0), EdgeId(0), EdgeId(1), 1, 1, 0.1, 0.0, 0.0);
        wn.weights[[0, 0]] = 0.0;
        wn.forward(&mut edges).unwrap();
        approx(edges[1].forward_values()[0], 0.0);
    }

    #[test]
    fn weights_sgd_step_matches_closed_form() {
        // Scenario 3 from §8: in=2,out=1, eta=0.1, alpha=0, lambda=0.
        let mut edges = vec![Edge::new(2), Edge::new(1)];
        edges[0].push_forward(EdgeId(0), vec![1.0, 1.0]).unwrap();
        let mut wn = WeightsNode::new(CellId(0), EdgeId(0), EdgeId(1), 2, 1, 0.1, 0.0, 0.0);
        wn.weights[[0, 0]] = 0.5;
        wn.weights[[1, 0]] = -0.5;
        wn.forward(&mut edges).unwrap();
        approx(edges[1].forward_values()[0], 0.0);

        edges[1].push_backward(EdgeId(1), vec![0.5]).unwrap();
        wn.backward(&mut edges).unwrap();
        approx(wn.weights[[0, 0]], 0.55);
        approx(wn.weights[[1, 0]], -0.45);
    }
}
