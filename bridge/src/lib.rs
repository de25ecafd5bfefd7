//! # Scenesync Bridge
//! Mirrors reconciled scene state into a shared entity-component world and
//! brackets every frame behind an exclusive gate, so the renderer never sees
//! a world half-written by a scene thread.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

#[macro_use]
extern crate cfg_if;

pub mod shared {
    pub use scenesync_shared::{
        codec, BatchKind, ComponentId, CrdtEntity, CrdtMessage, CrdtMessageType, CrdtProtocol,
        PayloadPool, ProtocolConfig, ReconciliationEffect, CAMERA_ENTITY, NO_SYNC_COMPONENT_ID,
        PLAYER_ENTITY, SCENE_ROOT_ENTITY,
    };
}

mod budget;
mod command_buffer;
mod config;
mod error;
mod frame;
mod gate;
mod registry;
mod scene;
mod world;
mod world_bridge;

pub use budget::{IngestBudget, PerFrameBudget, Unlimited};
pub use command_buffer::{merge_effects, SyncOp, WorldSyncCommandBuffer};
pub use config::{BridgeConfig, GateConfig, GateMode};
pub use error::{BridgeError, SchemaError};
pub use frame::{FrameDriver, FrameReport};
pub use gate::{AcquireOutcome, FrameGate, GateGuard, GateOwner, OwnerKind};
pub use registry::{ApplyFn, ComponentBridge, ComponentRegistry, DecodeFn};
pub use scene::{SceneShared, SceneState, ScenePort};
pub use world::SceneWorld;
pub use world_bridge::{IngestReport, WorldBridge};
