//! Owns cells, nodes, and edges; derives the forward layer schedule; and
//! exposes the `forward`/`backward`/`unfold` walk.
//!
//! Per the "Cyclic topology & ownership" design note, nodes and edges live
//! in parallel arenas owned by the network and reference each other by
//! stable index (`NodeId`/`EdgeId`), rather than through the mutable
//! bidirectional references a tracing-GC'd implementation would use.

use tracing::{debug, trace};

use crate::cell::Cell;
use crate::edge::Edge;
use crate::errors::{GraphError, GraphResult};
use crate::ids::{CellId, EdgeId, NodeId};
use crate::node::{
    validate_activation_arity, validate_weights_arity, ActivationNode, BiasNode, Node, WeightsNode,
};

use crate::activations::Activation;

pub struct Network {
    cells: Vec<Cell>,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    /// Forward execution order, one entry per layer. `None` until
    /// `initialize()` has run.
    schedule: Option<Vec<Vec<NodeId>>>,
    input_edges: Vec<EdgeId>,
    output_edges: Vec<EdgeId>,
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}

impl Network {
    pub fn new() -> Self {
        Self {
            cells: Vec::new(),
            nodes: Vec::new(),
            edges: Vec::new(),
            schedule: None,
            input_edges: Vec::new(),
            output_edges: Vec::new(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.schedule.is_some()
    }

    // --- Composition -----------------------------------------------------

    pub fn add_cell(&mut self, name: impl Into<String>) -> CellId {
        let id = CellId(self.cells.len());
        self.cells.push(Cell::new(name));
        id
    }

    /// Creates a new, unwired edge. The caller wires it via the
    /// `add_*_node` helpers, which set `input_node`/`output_node` as a side
    /// effect of attaching the edge to a node.
    pub fn new_edge(&mut self, size: usize) -> GraphResult<EdgeId> {
        let id = EdgeId(self.edges.len());
        if size == 0 {
            return Err(GraphError::ZeroSizeEdge(id));
        }
        self.edges.push(Edge::new(size));
        Ok(id)
    }

    fn push_node(&mut self, cell: CellId, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        self.cells[cell.0].add_node(id);
        id
    }

    /// Adds a `WeightsNode` reading `input_edge` and writing `output_edge`.
    pub fn add_weights_node(
        &mut self,
        cell: CellId,
        input_edge: EdgeId,
        output_edge: EdgeId,
        eta: f32,
        alpha: f32,
        lambda: f32,
    ) -> GraphResult<NodeId> {
        let id = NodeId(self.nodes.len());
        validate_weights_arity(id, 1, 1)?;
        let input_size = self.edges[input_edge.0].size();
        let output_size = self.edges[output_edge.0].size();
        let node = Node::Weights(WeightsNode::new(
            cell,
            input_edge,
            output_edge,
            input_size,
            output_size,
            eta,
            alpha,
            lambda,
        ));
        let id = self.push_node(cell, node);
        self.edges[input_edge.0].set_output_node(id);
        self.edges[output_edge.0].set_input_node(id);
        Ok(id)
    }

    /// Adds a `BiasNode` writing a constant vector to every edge in
    /// `output_edges` (at least one).
    pub fn add_bias_node(&mut self, cell: CellId, output_edges: Vec<EdgeId>) -> GraphResult<NodeId> {
        let id = NodeId(self.nodes.len());
        if output_edges.is_empty() {
            return Err(GraphError::WrongOutputArity {
                node: id,
                expected: "at least 1",
                found: 0,
            });
        }
        let size = self.edges[output_edges[0].0].size();
        let node = Node::Bias(BiasNode::new(cell, output_edges.clone(), size));
        let id = self.push_node(cell, node);
        for &e in &output_edges {
            self.edges[e.0].set_input_node(id);
        }
        Ok(id)
    }

    /// Adds an `ActivationNode` summing `input_edges` and writing the same
    /// activated vector to every edge in `output_edges` (at least one; more
    /// than one only arises from the recurrent `CellFactory` shape).
    pub fn add_activation_node(
        &mut self,
        cell: CellId,
        input_edges: Vec<EdgeId>,
        output_edges: Vec<EdgeId>,
        activation: Activation,
    ) -> GraphResult<NodeId> {
        let id = NodeId(self.nodes.len());
        validate_activation_arity(id, input_edges.len(), output_edges.len())?;
        let size = self.edges[output_edges[0].0].size();
        let node = Node::Activation(ActivationNode::new(
            cell,
            input_edges.clone(),
            output_edges.clone(),
            size,
            activation,
        ));
        let id = self.push_node(cell, node);
        for &e in &input_edges {
            self.edges[e.0].set_output_node(id);
        }
        for &e in &output_edges {
            self.edges[e.0].set_input_node(id);
        }
        Ok(id)
    }

    // --- Derived cell views (§4.3) ----------------------------------------

    /// Input edges of the cell: input edges of its nodes whose input node
    /// is null or belongs to a different cell.
    pub fn cell_input_edges(&self, cell: CellId) -> Vec<EdgeId> {
        let mut out = Vec::new();
        for &nid in self.cells[cell.0].nodes() {
            for eid in self.nodes[nid.0].input_edges() {
                let edge = &self.edges[eid.0];
                let crosses = match edge.input_node() {
                    None => true,
                    Some(writer) => self.nodes[writer.0].cell() != cell,
                };
                if crosses && !out.contains(&eid) {
                    out.push(eid);
                }
            }
        }
        out
    }

    /// Output edges of the cell: output edges of its nodes whose output
    /// node is null or belongs to a different cell.
    pub fn cell_output_edges(&self, cell: CellId) -> Vec<EdgeId> {
        let mut out = Vec::new();
        for &nid in self.cells[cell.0].nodes() {
            for eid in self.nodes[nid.0].output_edges() {
                let edge = &self.edges[eid.0];
                let crosses = match edge.output_node() {
                    None => true,
                    Some(reader) => self.nodes[reader.0].cell() != cell,
                };
                if crosses && !out.contains(&eid) {
                    out.push(eid);
                }
            }
        }
        out
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    // --- Initialization (§4.4) --------------------------------------------

    #[tracing::instrument(skip(self), name = "network_initialize")]
    pub fn initialize(&mut self) -> GraphResult<()> {
        if self.schedule.is_some() {
            return Err(GraphError::AlreadyInitialized);
        }

        // Step 1: network input/output edges, by topology alone.
        let input_edges: Vec<EdgeId> = (0..self.edges.len())
            .map(EdgeId)
            .filter(|e| self.edges[e.0].is_input())
            .collect();
        let output_edges: Vec<EdgeId> = (0..self.edges.len())
            .map(EdgeId)
            .filter(|e| self.edges[e.0].is_output())
            .collect();

        // Step 2: derive the forward layer schedule from wiring alone.
        let mut visited = vec![false; self.nodes.len()];
        let mut schedule: Vec<Vec<NodeId>> = Vec::new();
        let mut frontier = input_edges.clone();

        loop {
            let mut layer = Vec::new();
            for &eid in &frontier {
                if let Some(reader) = self.edges[eid.0].output_node() {
                    if !visited[reader.0] {
                        visited[reader.0] = true;
                        layer.push(reader);
                    }
                }
            }
            if layer.is_empty() {
                break;
            }
            trace!(layer = schedule.len(), nodes = layer.len(), "scheduled layer");
            let mut next_frontier = Vec::new();
            for &nid in &layer {
                for eid in self.nodes[nid.0].output_edges() {
                    next_frontier.push(eid);
                }
            }
            schedule.push(layer);
            frontier = next_frontier;
        }

        debug!(
            layers = schedule.len(),
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            "network initialized"
        );

        self.input_edges = input_edges;
        self.output_edges = output_edges;
        self.schedule = Some(schedule);
        Ok(())
    }

    pub fn input_edges(&self) -> &[EdgeId] {
        &self.input_edges
    }

    pub fn output_edges(&self) -> &[EdgeId] {
        &self.output_edges
    }

    /// Layer count, cell count, node count — a one-line diagnostic logged
    /// by the trainer right after initialization.
    pub fn topology_summary(&self) -> String {
        format!(
            "{} cells, {} nodes, {} edges, {} layers",
            self.cells.len(),
            self.nodes.len(),
            self.edges.len(),
            self.schedule.as_ref().map(|s| s.len()).unwrap_or(0)
        )
    }

    // --- Forward / backward / unfold (§4.4) -------------------------------

    #[tracing::instrument(skip(self, inputs), name = "network_forward")]
    pub fn forward(&mut self, inputs: &[Vec<f32>]) -> GraphResult<()> {
        let schedule = self.schedule.as_ref().ok_or(GraphError::NotInitialized)?;
        if inputs.len() != self.input_edges.len() {
            return Err(GraphError::InputCountMismatch {
                expected: self.input_edges.len(),
                found: inputs.len(),
            });
        }
        for (eid, v) in self.input_edges.iter().zip(inputs.iter()) {
            self.edges[eid.0].push_forward(*eid, v.clone())?;
        }
        for (i, layer) in schedule.iter().enumerate() {
            trace!(layer = i, "forward layer");
            for &nid in layer {
                self.nodes[nid.0].forward(&mut self.edges)?;
            }
        }
        Ok(())
    }

    #[tracing::instrument(skip(self, output_deltas), name = "network_backward")]
    pub fn backward(&mut self, output_deltas: &[Vec<f32>]) -> GraphResult<()> {
        let schedule = self.schedule.as_ref().ok_or(GraphError::NotInitialized)?;
        if output_deltas.len() != self.output_edges.len() {
            return Err(GraphError::OutputCountMismatch {
                expected: self.output_edges.len(),
                found: output_deltas.len(),
            });
        }
        for (eid, d) in self.output_edges.iter().zip(output_deltas.iter()) {
            self.edges[eid.0].push_backward(*eid, d.clone())?;
        }
        for (i, layer) in schedule.iter().enumerate().rev() {
            trace!(layer = i, "backward layer");
            for &nid in layer {
                self.nodes[nid.0].backward(&mut self.edges)?;
            }
        }
        for e in &mut self.edges {
            e.unfold();
        }
        Ok(())
    }

    /// Current forward queue head of each network output edge.
    pub fn output_values(&self) -> Vec<Vec<f32>> {
        self.output_edges
            .iter()
            .map(|e| self.edges[e.0].forward_values())
            .collect()
    }

    // --- Restoration plumbing (used by `persistence`) --------------------

    pub(crate) fn from_parts(cells: Vec<Cell>, nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self {
            cells,
            nodes,
            edges,
            schedule: None,
            input_edges: Vec::new(),
            output_edges: Vec::new(),
        }
    }

}
