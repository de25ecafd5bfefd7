use thiserror::Error;

/// Leading byte of every batch exchanged with a scene or a peer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BatchKind {
    /// A plain stream of CRDT messages
    Crdt = 1,
    /// A peer asks for the full current state
    ReqCrdtState = 2,
    /// Full state sent in answer to `ReqCrdtState`
    ResCrdtState = 3,
}

/// Invalid batch prefix byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid batch kind byte {value} (valid range: 1-3)")]
pub struct BatchKindError {
    pub value: u8,
}

impl BatchKind {
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// `ReqCrdtState` carries no messages, the other kinds do
    pub fn carries_messages(self) -> bool {
        !matches!(self, Self::ReqCrdtState)
    }
}

impl TryFrom<u8> for BatchKind {
    type Error = BatchKindError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Crdt),
            2 => Ok(Self::ReqCrdtState),
            3 => Ok(Self::ResCrdtState),
            value => Err(BatchKindError { value }),
        }
    }
}
