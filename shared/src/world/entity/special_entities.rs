use crate::{types::EntityNumber, world::entity::crdt_entity::CrdtEntity};

/// Numbers below this are owned by the engine and never handed out to scenes
pub const RESERVED_STATIC_ENTITIES: EntityNumber = 512;

pub const SCENE_ROOT_ENTITY: CrdtEntity = CrdtEntity::new(0);
pub const PLAYER_ENTITY: CrdtEntity = CrdtEntity::new(1);
pub const CAMERA_ENTITY: CrdtEntity = CrdtEntity::new(2);

// Engine-side entities created on demand (e.g. other players' avatars)
pub const OTHER_PLAYER_ENTITIES_FROM: EntityNumber = 32;
pub const OTHER_PLAYER_ENTITIES_TO: EntityNumber = 256;
