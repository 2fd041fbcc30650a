//! Named containers that group nodes into one logical sub-network.
//!
//! A cell is a naming/grouping convenience, not a graph node itself: it
//! owns a set of node indices and derives its "boundary" edges — the edges
//! that cross into or out of the cell — by looking at which of its nodes'
//! edges connect to a node outside the cell (or to nothing at all).

use uuid::Uuid;

use crate::ids::{new_uuid, NodeId};

#[derive(Debug, Clone)]
pub struct Cell {
    uuid: Uuid,
    name: String,
    nodes: Vec<NodeId>,
}

impl Cell {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_uuid(new_uuid(), name)
    }

    pub fn with_uuid(uuid: Uuid, name: impl Into<String>) -> Self {
        Self {
            uuid,
            name: name.into(),
            nodes: Vec::new(),
        }
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub(crate) fn add_node(&mut self, id: NodeId) {
        self.nodes.push(id);
    }
}

// `Cell` itself only tracks membership. The derived "input edges of the
// cell" / "output edges of the cell" views described in the spec need the
// node and edge arenas to resolve, so they live as `Network::cell_input_edges`
// / `Network::cell_output_edges` rather than as inherent methods here.

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
    }
}
impl Eq for Cell {}
