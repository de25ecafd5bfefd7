// Fixed sizes of the CRDT wire layout, in bytes

/// `length: u32` + `type: u32`
pub const MESSAGE_HEADER_LENGTH: usize = 8;

/// entity + component id + timestamp + data length
pub const PUT_COMPONENT_HEADER_LENGTH: usize = 16;
/// entity + component id + timestamp + network id + data length
pub const PUT_COMPONENT_NETWORK_HEADER_LENGTH: usize = 20;
/// entity + component id + timestamp
pub const DELETE_COMPONENT_LENGTH: usize = 12;
/// entity + component id + timestamp + network id
pub const DELETE_COMPONENT_NETWORK_LENGTH: usize = 16;
/// entity
pub const DELETE_ENTITY_LENGTH: usize = 4;
/// entity + network id
pub const DELETE_ENTITY_NETWORK_LENGTH: usize = 8;

/// Every batch starts with a single [`BatchKind`](crate::BatchKind) byte
pub const BATCH_PREFIX_LENGTH: usize = 1;

/// Offset of the component id inside a component-scoped message, header included
pub const COMPONENT_ID_OFFSET: usize = MESSAGE_HEADER_LENGTH + 4;
