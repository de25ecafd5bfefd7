use thiserror::Error;

use scenesync_shared::{BatchKindError, CodecError, ComponentId, EntityError, FilterError};

use crate::gate::AcquireOutcome;

/// Errors a component bridge reports about a payload or a registration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Component payload is {actual} bytes, expected {expected}")]
    UnexpectedLength { expected: usize, actual: usize },

    #[error("Component payload is invalid: {reason}")]
    InvalidPayload { reason: &'static str },

    #[error("Component {component_id} is already registered as `{name}`")]
    AlreadyRegistered {
        component_id: ComponentId,
        name: &'static str,
    },
}

/// Errors surfaced by the scene-facing side of the bridge
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Received an empty batch, expected at least the batch kind byte")]
    EmptyBatch,

    #[error(transparent)]
    BatchKind(#[from] BatchKindError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Entity(#[from] EntityError),

    #[error("Scene `{scene}` was torn down")]
    SceneTornDown { scene: String },

    #[error("Frame gate is disposed")]
    GateDisposed,

    #[error("Frame gate could not be acquired by `{owner}`: {outcome:?}")]
    GateUnavailable {
        owner: String,
        outcome: AcquireOutcome,
    },
}
