use crate::{byte_reader::ByteReader, byte_writer::ByteWriter, error::SerdeErr};

/// A type with a fixed little-endian wire representation
pub trait Serde: Sized {
    fn ser(&self, writer: &mut ByteWriter);

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr>;

    /// Number of bytes `ser` will write
    fn byte_length(&self) -> usize;
}

/// Implemented by types whose encoded length never depends on the value
pub trait ConstByteLength {
    fn const_byte_length() -> usize;
}
