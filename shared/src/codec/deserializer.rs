use std::borrow::Cow;

use scenesync_serde::{ByteReader, Serde};

use crate::{
    codec::{
        error::{CodecError, MalformedReason},
        header::MessageHeader,
    },
    messages::{
        constants::MESSAGE_HEADER_LENGTH, crdt_message::CrdtMessage,
        message_type::CrdtMessageType,
    },
    world::entity::crdt_entity::CrdtEntity,
};

/// Decodes the message at the start of `bytes`, returning it together with
/// the number of bytes it occupied. The payload borrows from `bytes`.
pub fn decode(bytes: &[u8]) -> Result<(CrdtMessage<'_>, usize), CodecError> {
    decode_at(bytes, 0)
}

/// Decodes consecutive messages until `bytes` is exhausted.
///
/// Stops at the first malformed message: everything decoded before it stays
/// in `output` and the error is returned. Returns the number of bytes consumed
/// on success.
pub fn decode_batch<'a>(
    bytes: &'a [u8],
    output: &mut Vec<CrdtMessage<'a>>,
) -> Result<usize, CodecError> {
    let mut offset = 0;
    while offset < bytes.len() {
        let (message, consumed) = decode_at(&bytes[offset..], offset)?;
        output.push(message);
        offset += consumed;
    }
    Ok(offset)
}

/// Number of bytes a message type needs at minimum, header included
pub fn minimum_length(message_type: CrdtMessageType) -> usize {
    MESSAGE_HEADER_LENGTH + message_type.body_prefix_length()
}

fn decode_at(bytes: &[u8], offset: usize) -> Result<(CrdtMessage<'_>, usize), CodecError> {
    let malformed = |reason| CodecError::malformed(offset, reason);

    let header = MessageHeader::peek(bytes).ok_or(malformed(MalformedReason::TruncatedHeader {
        remaining: bytes.len(),
    }))?;
    let message_type = header.message_type().ok_or(malformed(MalformedReason::UnknownType {
        ordinal: header.type_ordinal,
    }))?;

    let minimum = minimum_length(message_type);
    let declared = header.length();
    if declared < minimum {
        return Err(malformed(MalformedReason::LengthTooSmall {
            declared: header.length,
            minimum,
        }));
    }
    if declared > bytes.len() {
        return Err(malformed(MalformedReason::LengthExceedsBuffer {
            declared: header.length,
            remaining: bytes.len(),
        }));
    }
    // fixed-size messages carry nothing past their body
    if !message_type.has_payload() && declared != minimum {
        return Err(malformed(MalformedReason::DataLengthMismatch {
            declared: header.length,
            available: minimum,
        }));
    }

    let mut reader = ByteReader::new(&bytes[MESSAGE_HEADER_LENGTH..declared]);
    let message = read_body(&mut reader, message_type).map_err(malformed)?;

    Ok((message, declared))
}

fn read_body<'a>(
    reader: &mut ByteReader<'a>,
    message_type: CrdtMessageType,
) -> Result<CrdtMessage<'a>, MalformedReason> {
    let message = match message_type {
        CrdtMessageType::PutComponent | CrdtMessageType::AppendComponent => {
            let entity = CrdtEntity::de(reader)?;
            let component_id = reader.read_u32()?;
            let timestamp = reader.read_u32()?;
            let data = read_payload(reader)?;
            if message_type == CrdtMessageType::PutComponent {
                CrdtMessage::put(entity, component_id, timestamp, Cow::Borrowed(data))
            } else {
                CrdtMessage::append(entity, component_id, timestamp, Cow::Borrowed(data))
            }
        }
        CrdtMessageType::PutComponentNetwork => {
            let entity = CrdtEntity::de(reader)?;
            let component_id = reader.read_u32()?;
            let timestamp = reader.read_u32()?;
            let network_id = reader.read_u32()?;
            let data = read_payload(reader)?;
            CrdtMessage::put_network(
                entity,
                component_id,
                timestamp,
                network_id,
                Cow::Borrowed(data),
            )
        }
        CrdtMessageType::DeleteComponent => {
            let entity = CrdtEntity::de(reader)?;
            let component_id = reader.read_u32()?;
            let timestamp = reader.read_u32()?;
            CrdtMessage::delete_component(entity, component_id, timestamp)
        }
        CrdtMessageType::DeleteComponentNetwork => {
            let entity = CrdtEntity::de(reader)?;
            let component_id = reader.read_u32()?;
            let timestamp = reader.read_u32()?;
            let network_id = reader.read_u32()?;
            CrdtMessage::delete_component_network(entity, component_id, timestamp, network_id)
        }
        CrdtMessageType::DeleteEntity => {
            let entity = CrdtEntity::de(reader)?;
            CrdtMessage::delete_entity(entity)
        }
        CrdtMessageType::DeleteEntityNetwork => {
            let entity = CrdtEntity::de(reader)?;
            let network_id = reader.read_u32()?;
            CrdtMessage::delete_entity_network(entity, network_id)
        }
        CrdtMessageType::None | CrdtMessageType::MaxMessageType => {
            CrdtMessage::sentinel(message_type)
        }
    };
    Ok(message)
}

fn read_payload<'a>(reader: &mut ByteReader<'a>) -> Result<&'a [u8], MalformedReason> {
    let data_length = reader.read_u32()?;
    let available = reader.remaining();
    if data_length as usize != available {
        return Err(MalformedReason::DataLengthMismatch {
            declared: data_length,
            available,
        });
    }
    Ok(reader.read_bytes(available)?)
}
