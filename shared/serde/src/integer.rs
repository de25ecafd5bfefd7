use crate::{
    byte_reader::ByteReader, byte_writer::ByteWriter, error::SerdeErr, serde::Serde,
    ConstByteLength,
};

macro_rules! impl_serde_for_integer {
    ($type:ty, $write:ident, $read:ident, $len:expr) => {
        impl Serde for $type {
            fn ser(&self, writer: &mut ByteWriter) {
                writer.$write(*self);
            }

            fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
                reader.$read()
            }

            fn byte_length(&self) -> usize {
                $len
            }
        }

        impl ConstByteLength for $type {
            fn const_byte_length() -> usize {
                $len
            }
        }
    };
}

impl_serde_for_integer!(u8, write_u8, read_u8, 1);
impl_serde_for_integer!(u32, write_u32, read_u32, 4);
impl_serde_for_integer!(i32, write_i32, read_i32, 4);
