//! A computational-graph engine for supervised learning: a closed catalog
//! of weight/bias/activation nodes wired into named cells, executed by a
//! layer-scheduled forward/backward walk with truncated backprop through
//! recurrent edges.

pub mod activations;
pub mod cell;
pub mod cell_factory;
pub mod config;
pub mod edge;
pub mod errors;
pub mod ids;
pub mod metrics;
pub mod network;
pub mod node;
pub mod pattern;
pub mod persistence;
pub mod task;
pub mod trainer;

pub use cell::Cell;
pub use cell_factory::CellFactory;
pub use edge::Edge;
pub use errors::{GraphError, GraphResult};
pub use ids::{CellId, EdgeId, NodeId};
pub use network::Network;
pub use node::Node;
pub use pattern::{Pattern, PatternSource, VecPatternSource};
pub use task::{NullProgressListener, ProgressListener, TaskState};
pub use trainer::Trainer;
