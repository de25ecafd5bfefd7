use scenesync_shared::{
    codec::{decode_batch, encode},
    BatchKind, CrdtMessage, BATCH_PREFIX_LENGTH,
};

/// Prefix byte followed by the encoded messages
pub fn build_batch(kind: BatchKind, messages: &[CrdtMessage<'_>]) -> Vec<u8> {
    let mut bytes = vec![kind.to_u8()];
    for message in messages {
        bytes.extend(encode(message));
    }
    bytes
}

/// Splits a response batch into its kind and owned messages
pub fn read_batch(bytes: &[u8]) -> (BatchKind, Vec<CrdtMessage<'static>>) {
    let kind = BatchKind::try_from(bytes[0]).expect("response batch kind");
    let mut messages = Vec::new();
    decode_batch(&bytes[BATCH_PREFIX_LENGTH..], &mut messages).expect("well-formed response");
    (
        kind,
        messages.into_iter().map(CrdtMessage::into_owned).collect(),
    )
}
