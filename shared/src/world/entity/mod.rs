pub mod crdt_entity;
pub mod entity_number_arena;
pub mod error;
pub mod special_entities;
