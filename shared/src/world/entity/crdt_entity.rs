use std::fmt;

use scenesync_serde::{ByteReader, ByteWriter, ConstByteLength, Serde, SerdeErr};

use crate::{
    types::{EntityNumber, EntityVersion},
    world::entity::special_entities::RESERVED_STATIC_ENTITIES,
};

/// Identifier of an entity inside one scene's local space.
///
/// On the wire this is a single `u32`: the low 16 bits hold the entity
/// number, the high 16 bits its version (generation). The version is bumped
/// every time a number is reused after deletion, so two ids with the same
/// number but different versions never alias.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CrdtEntity(u32);

impl CrdtEntity {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub const fn from_parts(number: EntityNumber, version: EntityVersion) -> Self {
        Self(((version as u32) << 16) | number as u32)
    }

    pub const fn id(&self) -> u32 {
        self.0
    }

    pub const fn number(&self) -> EntityNumber {
        (self.0 & 0xFFFF) as EntityNumber
    }

    pub const fn version(&self) -> EntityVersion {
        (self.0 >> 16) as EntityVersion
    }

    /// Engine-owned entities (camera, player, scene root, ...) live below
    /// [`RESERVED_STATIC_ENTITIES`]
    pub const fn is_reserved(&self) -> bool {
        self.number() < RESERVED_STATIC_ENTITIES
    }

    /// Same number, next generation
    pub const fn next_version(&self) -> Self {
        Self::from_parts(self.number(), self.version().wrapping_add(1))
    }
}

impl fmt::Debug for CrdtEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CrdtEntity({}v{})", self.number(), self.version())
    }
}

impl From<u32> for CrdtEntity {
    fn from(id: u32) -> Self {
        Self::new(id)
    }
}

impl Serde for CrdtEntity {
    fn ser(&self, writer: &mut ByteWriter) {
        writer.write_u32(self.0);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        reader.read_u32().map(Self)
    }

    fn byte_length(&self) -> usize {
        4
    }
}

impl ConstByteLength for CrdtEntity {
    fn const_byte_length() -> usize {
        4
    }
}
