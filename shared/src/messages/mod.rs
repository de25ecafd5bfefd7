pub mod batch_kind;
pub mod constants;
pub mod crdt_message;
pub mod message_type;
