use std::sync::Arc;

use scenesync_serde::{ByteWriter, Serde};

use crate::{
    codec::header::MessageHeader,
    memory::PayloadPool,
    messages::{
        batch_kind::BatchKind,
        constants::{BATCH_PREFIX_LENGTH, MESSAGE_HEADER_LENGTH},
        crdt_message::CrdtMessage,
        message_type::CrdtMessageType,
    },
};

/// Exact number of bytes [`encode_into`] writes for `message`
pub fn encoded_len(message: &CrdtMessage<'_>) -> usize {
    let message_type = message.message_type;
    let payload = if message_type.has_payload() {
        message.data.len()
    } else {
        0
    };
    MESSAGE_HEADER_LENGTH + message_type.body_prefix_length() + payload
}

pub fn encode_into(writer: &mut ByteWriter, message: &CrdtMessage<'_>) {
    let message_type = message.message_type;
    // payloads are bounded by the u32 length field of the wire format
    MessageHeader::new(encoded_len(message) as u32, message_type).ser(writer);

    match message_type {
        CrdtMessageType::PutComponent | CrdtMessageType::AppendComponent => {
            message.entity.ser(writer);
            writer.write_u32(message.component_id);
            writer.write_u32(message.timestamp);
            writer.write_u32(message.data.len() as u32);
            writer.write_bytes(&message.data);
        }
        CrdtMessageType::PutComponentNetwork => {
            message.entity.ser(writer);
            writer.write_u32(message.component_id);
            writer.write_u32(message.timestamp);
            writer.write_u32(message.network_id);
            writer.write_u32(message.data.len() as u32);
            writer.write_bytes(&message.data);
        }
        CrdtMessageType::DeleteComponent => {
            message.entity.ser(writer);
            writer.write_u32(message.component_id);
            writer.write_u32(message.timestamp);
        }
        CrdtMessageType::DeleteComponentNetwork => {
            message.entity.ser(writer);
            writer.write_u32(message.component_id);
            writer.write_u32(message.timestamp);
            writer.write_u32(message.network_id);
        }
        CrdtMessageType::DeleteEntity => {
            message.entity.ser(writer);
        }
        CrdtMessageType::DeleteEntityNetwork => {
            message.entity.ser(writer);
            writer.write_u32(message.network_id);
        }
        CrdtMessageType::None | CrdtMessageType::MaxMessageType => {}
    }
}

pub fn encode(message: &CrdtMessage<'_>) -> Vec<u8> {
    let mut writer = ByteWriter::with_capacity(encoded_len(message));
    encode_into(&mut writer, message);
    writer.to_bytes()
}

/// `kind` prefix byte followed by every message in order, written into a
/// buffer rented from `pool`
pub fn encode_batch(kind: BatchKind, messages: &[CrdtMessage<'_>], pool: &PayloadPool) -> Vec<u8> {
    let payload_length: usize = messages.iter().map(encoded_len).sum();

    let mut writer = ByteWriter::from_vec(pool.rent_empty(BATCH_PREFIX_LENGTH + payload_length));
    writer.write_u8(kind.to_u8());
    for message in messages {
        encode_into(&mut writer, message);
    }
    writer.to_bytes()
}

/// Batch writer bound to a shared [`PayloadPool`]
#[derive(Clone)]
pub struct CrdtSerializer {
    pool: Arc<PayloadPool>,
}

impl CrdtSerializer {
    pub fn new(pool: Arc<PayloadPool>) -> Self {
        Self { pool }
    }

    pub fn encode_batch(&self, kind: BatchKind, messages: &[CrdtMessage<'_>]) -> Vec<u8> {
        encode_batch(kind, messages, &self.pool)
    }

    /// Hands a batch buffer back once the transport is done with it
    pub fn recycle(&self, buffer: Vec<u8>) {
        self.pool.release(buffer);
    }

    pub fn pool(&self) -> &Arc<PayloadPool> {
        &self.pool
    }
}
