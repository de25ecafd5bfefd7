//! # Scenesync Shared
//! Wire protocol, batch filter and reconciliation store shared by the
//! scenesync crates.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use scenesync_serde::{ByteReader, ByteWriter, ConstByteLength, Serde, SerdeErr};

pub mod codec;
mod filter;
mod memory;
mod messages;
mod protocol;
mod types;
mod world;

pub use codec::{CodecError, CrdtSerializer, MalformedReason, MessageHeader};
pub use filter::{filter_batch, filter_batch_to_vec, FilterError};
pub use memory::PayloadPool;
pub use messages::{
    batch_kind::{BatchKind, BatchKindError},
    constants::{
        BATCH_PREFIX_LENGTH, COMPONENT_ID_OFFSET, DELETE_COMPONENT_LENGTH,
        DELETE_COMPONENT_NETWORK_LENGTH, DELETE_ENTITY_LENGTH, DELETE_ENTITY_NETWORK_LENGTH,
        MESSAGE_HEADER_LENGTH, PUT_COMPONENT_HEADER_LENGTH, PUT_COMPONENT_NETWORK_HEADER_LENGTH,
    },
    crdt_message::CrdtMessage,
    message_type::CrdtMessageType,
};
pub use protocol::{
    AcceptedOutcome, AppendEntry, ComponentSlot, CrdtProtocol, ProtocolConfig, ProtocolStats,
    Reconciliation, ReconciliationEffect, RejectReason, StateChange,
};
pub use types::{ComponentId, EntityNumber, EntityVersion, NetworkId, Timestamp};
pub use world::{
    component::{is_no_sync, NO_SYNC_COMPONENT_ID},
    entity::{
        crdt_entity::CrdtEntity,
        entity_number_arena::EntityNumberArena,
        error::EntityError,
        special_entities::{
            CAMERA_ENTITY, OTHER_PLAYER_ENTITIES_FROM, OTHER_PLAYER_ENTITIES_TO, PLAYER_ENTITY,
            RESERVED_STATIC_ENTITIES, SCENE_ROOT_ENTITY,
        },
    },
};
