pub mod test_world;

pub use helpers::*;
pub use test_world::{TestHandle, TestWorld};
