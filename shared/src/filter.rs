//! Strips messages that must never leave the local process from a batch.

use thiserror::Error;

use crate::{
    codec::MessageHeader,
    messages::{
        constants::{BATCH_PREFIX_LENGTH, COMPONENT_ID_OFFSET, MESSAGE_HEADER_LENGTH},
        message_type::CrdtMessageType,
    },
    world::component::NO_SYNC_COMPONENT_ID,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("filter output holds {output} bytes but the input batch is {input} bytes")]
    OutputTooSmall { input: usize, output: usize },
}

/// Copies `input` into `output`, dropping every network PUT of the no-sync
/// component. Returns the number of bytes written.
///
/// The prefix byte is copied verbatim. Walking stops quietly once fewer than
/// a header's worth of bytes remain, or a header declares more bytes than are
/// left; that tail is discarded.
pub fn filter_batch(input: &[u8], output: &mut [u8]) -> Result<usize, FilterError> {
    if output.len() < input.len() {
        return Err(FilterError::OutputTooSmall {
            input: input.len(),
            output: output.len(),
        });
    }
    if input.len() < BATCH_PREFIX_LENGTH {
        return Ok(0);
    }

    output[..BATCH_PREFIX_LENGTH].copy_from_slice(&input[..BATCH_PREFIX_LENGTH]);
    let mut written = BATCH_PREFIX_LENGTH;
    let mut offset = BATCH_PREFIX_LENGTH;

    while let Some(header) = MessageHeader::peek(&input[offset..]) {
        let length = header.length();
        // a zero/undersized length would never advance
        if length < MESSAGE_HEADER_LENGTH || length > input.len() - offset {
            break;
        }

        let message = &input[offset..offset + length];
        if !is_no_sync_network_put(header, message) {
            output[written..written + length].copy_from_slice(message);
            written += length;
        }
        offset += length;
    }

    Ok(written)
}

/// Allocating convenience over [`filter_batch`]
pub fn filter_batch_to_vec(input: &[u8]) -> Vec<u8> {
    let mut output = vec![0; input.len()];
    // output is sized to the input, so this cannot fail
    let written = filter_batch(input, &mut output).unwrap_or(0);
    output.truncate(written);
    output
}

fn is_no_sync_network_put(header: MessageHeader, message: &[u8]) -> bool {
    if header.message_type() != Some(CrdtMessageType::PutComponentNetwork) {
        return false;
    }
    let Some(component_bytes) = message.get(COMPONENT_ID_OFFSET..COMPONENT_ID_OFFSET + 4) else {
        return false;
    };
    let mut component_id = [0u8; 4];
    component_id.copy_from_slice(component_bytes);
    u32::from_le_bytes(component_id) == NO_SYNC_COMPONENT_ID
}
