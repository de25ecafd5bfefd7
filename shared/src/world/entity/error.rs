use thiserror::Error;

use crate::types::{EntityNumber, EntityVersion};

/// Errors that can occur while allocating or freeing entity numbers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntityError {
    /// Every number of the arena's range is currently alive
    #[error("Entity arena exhausted: all numbers in {start}..{end} are in use")]
    ArenaExhausted { start: u32, end: u32 },

    /// The entity number does not belong to this arena
    #[error("Entity number {number} is outside of the arena range {start}..{end}")]
    OutOfRange {
        number: EntityNumber,
        start: u32,
        end: u32,
    },

    /// The entity was already freed, or its generation is stale
    #[error("Entity {number} version {version} is not alive (current version {current})")]
    NotAlive {
        number: EntityNumber,
        version: EntityVersion,
        current: EntityVersion,
    },
}
