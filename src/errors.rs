use thiserror::Error;

/// Hard errors raised by the graph engine.
///
/// These are programming or configuration errors per the error taxonomy:
/// they are not meant to be caught and retried, only surfaced to the caller.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("edge {edge:?} expects vectors of length {expected}, got {found}")]
    EdgeSizeMismatch {
        edge: crate::ids::EdgeId,
        expected: usize,
        found: usize,
    },

    #[error("edge size must be positive (edge {0:?})")]
    ZeroSizeEdge(crate::ids::EdgeId),

    #[error("node {node:?} expects {expected} input edge(s), has {found}")]
    WrongInputArity {
        node: crate::ids::NodeId,
        expected: &'static str,
        found: usize,
    },

    #[error("node {node:?} expects {expected} output edge(s), has {found}")]
    WrongOutputArity {
        node: crate::ids::NodeId,
        expected: &'static str,
        found: usize,
    },

    #[error("network already initialized; initialize() may only run once")]
    AlreadyInitialized,

    #[error("network not initialized; call initialize() before forward/backward")]
    NotInitialized,

    #[error("expected {expected} input vector(s), got {found}")]
    InputCountMismatch { expected: usize, found: usize },

    #[error("expected {expected} output delta vector(s), got {found}")]
    OutputCountMismatch { expected: usize, found: usize },

    #[error("unknown activation name: {0}")]
    UnknownActivation(String),

    #[error("malformed network snapshot: {0}")]
    MalformedSnapshot(String),

    #[error("dangling node reference {0} in snapshot")]
    DanglingNodeReference(String),

    #[error("trainer misconfigured: {0}")]
    TrainerMisconfigured(&'static str),

    #[error("pattern shape mismatch: {0}")]
    PatternShapeMismatch(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type GraphResult<T> = Result<T, GraphError>;
