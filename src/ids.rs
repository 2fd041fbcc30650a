//! Arena indices and externally-visible identifiers.
//!
//! The engine stores nodes and edges in parallel arenas owned by the
//! `Network` (see the "Cyclic topology & ownership" design note). `NodeId`,
//! `EdgeId`, and `CellId` are positions into those arenas: cheap, `Copy`,
//! and stable for the lifetime of a network. They are distinct from the
//! UUIDs carried by `Edge`/`Node`/`Cell` themselves, which exist only for
//! equality and persistence (a restored network gets fresh arena indices
//! but the same UUIDs).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Position of a node in the network's node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// Position of an edge in the network's edge arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub usize);

/// Position of a cell in the network's cell arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId(pub usize);

/// Generates a fresh stable identifier for a newly constructed entity.
pub fn new_uuid() -> Uuid {
    Uuid::new_v4()
}
