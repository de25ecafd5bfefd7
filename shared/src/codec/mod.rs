mod deserializer;
mod error;
mod header;
mod serializer;

pub use deserializer::{decode, decode_batch, minimum_length};
pub use error::{CodecError, MalformedReason};
pub use header::MessageHeader;
pub use serializer::{encode, encode_batch, encode_into, encoded_len, CrdtSerializer};
