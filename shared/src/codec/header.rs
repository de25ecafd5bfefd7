use scenesync_serde::{ByteReader, ByteWriter, Serde, SerdeErr};

use crate::messages::{constants::MESSAGE_HEADER_LENGTH, message_type::CrdtMessageType};

/// Generic header shared by every message: total length, then type ordinal
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MessageHeader {
    pub length: u32,
    pub type_ordinal: u32,
}

impl MessageHeader {
    pub fn new(length: u32, message_type: CrdtMessageType) -> Self {
        Self {
            length,
            type_ordinal: message_type.to_u32(),
        }
    }

    /// Reads the header at the start of `bytes` without touching the body.
    /// `None` if fewer than 8 bytes are available.
    pub fn peek(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < MESSAGE_HEADER_LENGTH {
            return None;
        }
        let mut reader = ByteReader::new(&bytes[..MESSAGE_HEADER_LENGTH]);
        Self::de(&mut reader).ok()
    }

    pub fn message_type(&self) -> Option<CrdtMessageType> {
        CrdtMessageType::from_u32(self.type_ordinal)
    }

    pub fn length(&self) -> usize {
        self.length as usize
    }
}

impl Serde for MessageHeader {
    fn ser(&self, writer: &mut ByteWriter) {
        writer.write_u32(self.length);
        writer.write_u32(self.type_ordinal);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let length = reader.read_u32()?;
        let type_ordinal = reader.read_u32()?;
        Ok(Self {
            length,
            type_ordinal,
        })
    }

    fn byte_length(&self) -> usize {
        MESSAGE_HEADER_LENGTH
    }
}
