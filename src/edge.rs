//! Typed fixed-size conduits between nodes.
//!
//! An edge owns two independent FIFOs: a forward queue of value vectors and
//! a backward queue of delta vectors, both of fixed length `size`. Reading
//! the head of an empty queue returns a zero vector rather than failing —
//! this is what makes a recurrent back-edge safe on the first forward step
//! and keeps backward symmetric with forward (see §4.1 of the spec).

use std::collections::VecDeque;

use uuid::Uuid;

use crate::errors::{GraphError, GraphResult};
use crate::ids::{new_uuid, EdgeId, NodeId};

#[derive(Debug, Clone)]
pub struct Edge {
    uuid: Uuid,
    size: usize,
    input_node: Option<NodeId>,
    output_node: Option<NodeId>,
    forward_queue: VecDeque<Vec<f32>>,
    backward_queue: VecDeque<Vec<f32>>,
}

impl Edge {
    /// Constructs a new edge of the given size, with no endpoints wired yet.
    /// `size` must be positive; the network wires `input_node`/`output_node`
    /// after construction via `set_input_node`/`set_output_node`.
    pub fn new(size: usize) -> Self {
        Self::with_uuid(new_uuid(), size)
    }

    /// Constructs an edge with a caller-supplied UUID, used when restoring
    /// a persisted snapshot so identifiers survive the round-trip.
    pub fn with_uuid(uuid: Uuid, size: usize) -> Self {
        Self {
            uuid,
            size,
            input_node: None,
            output_node: None,
            forward_queue: VecDeque::new(),
            backward_queue: VecDeque::new(),
        }
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn input_node(&self) -> Option<NodeId> {
        self.input_node
    }

    pub fn output_node(&self) -> Option<NodeId> {
        self.output_node
    }

    pub fn set_input_node(&mut self, node: NodeId) {
        self.input_node = Some(node);
    }

    pub fn set_output_node(&mut self, node: NodeId) {
        self.output_node = Some(node);
    }

    /// An edge with no input node is a network input.
    pub fn is_input(&self) -> bool {
        self.input_node.is_none()
    }

    /// An edge with no output node is a network output.
    pub fn is_output(&self) -> bool {
        self.output_node.is_none()
    }

    /// An edge with both endpoints wired is an internal transfer edge.
    pub fn is_transfer(&self) -> bool {
        self.input_node.is_some() && self.output_node.is_some()
    }

    fn check_len(&self, id: EdgeId, v: &[f32]) -> GraphResult<()> {
        if v.len() != self.size {
            return Err(GraphError::EdgeSizeMismatch {
                edge: id,
                expected: self.size,
                found: v.len(),
            });
        }
        Ok(())
    }

    /// Pushes `v` at the head of the forward queue. Never blocks, never caps
    /// depth — `unfold` is the only thing that trims the queue.
    pub fn push_forward(&mut self, id: EdgeId, v: Vec<f32>) -> GraphResult<()> {
        self.check_len(id, &v)?;
        self.forward_queue.push_front(v);
        Ok(())
    }

    /// Pushes `d` at the head of the backward queue.
    pub fn push_backward(&mut self, id: EdgeId, d: Vec<f32>) -> GraphResult<()> {
        self.check_len(id, &d)?;
        self.backward_queue.push_front(d);
        Ok(())
    }

    /// Returns the head of the forward queue, or `size` zeros if empty.
    /// Non-destructive.
    pub fn forward_values(&self) -> Vec<f32> {
        self.forward_queue
            .front()
            .cloned()
            .unwrap_or_else(|| vec![0.0; self.size])
    }

    /// Returns the head of the backward queue, or `size` zeros if empty.
    pub fn backward_deltas(&self) -> Vec<f32> {
        self.backward_queue
            .front()
            .cloned()
            .unwrap_or_else(|| vec![0.0; self.size])
    }

    /// Number of forward values currently queued (queue-conservation tests
    /// use this, not part of the external interface contract).
    pub fn forward_len(&self) -> usize {
        self.forward_queue.len()
    }

    pub fn backward_len(&self) -> usize {
        self.backward_queue.len()
    }

    /// Pops the head of both queues, if present. Idempotent on empty queues.
    pub fn unfold(&mut self) {
        self.forward_queue.pop_front();
        self.backward_queue.pop_front();
    }
}
