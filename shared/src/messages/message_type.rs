use crate::messages::constants::{
    DELETE_COMPONENT_LENGTH, DELETE_COMPONENT_NETWORK_LENGTH, DELETE_ENTITY_LENGTH,
    DELETE_ENTITY_NETWORK_LENGTH, PUT_COMPONENT_HEADER_LENGTH,
    PUT_COMPONENT_NETWORK_HEADER_LENGTH,
};

// Shared wire protocol: ordinals are fixed and must never be reordered
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum CrdtMessageType {
    None = 0,
    PutComponent = 1,
    DeleteComponent = 2,
    DeleteEntity = 3,
    AppendComponent = 4,
    PutComponentNetwork = 5,
    DeleteComponentNetwork = 6,
    DeleteEntityNetwork = 7,
    MaxMessageType = 8,
}

impl CrdtMessageType {
    pub fn from_u32(ordinal: u32) -> Option<Self> {
        let message_type = match ordinal {
            0 => Self::None,
            1 => Self::PutComponent,
            2 => Self::DeleteComponent,
            3 => Self::DeleteEntity,
            4 => Self::AppendComponent,
            5 => Self::PutComponentNetwork,
            6 => Self::DeleteComponentNetwork,
            7 => Self::DeleteEntityNetwork,
            8 => Self::MaxMessageType,
            _ => return None,
        };
        Some(message_type)
    }

    pub fn to_u32(self) -> u32 {
        self as u32
    }

    /// Fixed body bytes that follow the generic header, payload excluded
    pub fn body_prefix_length(self) -> usize {
        match self {
            Self::PutComponent | Self::AppendComponent => PUT_COMPONENT_HEADER_LENGTH,
            Self::PutComponentNetwork => PUT_COMPONENT_NETWORK_HEADER_LENGTH,
            Self::DeleteComponent => DELETE_COMPONENT_LENGTH,
            Self::DeleteComponentNetwork => DELETE_COMPONENT_NETWORK_LENGTH,
            Self::DeleteEntity => DELETE_ENTITY_LENGTH,
            Self::DeleteEntityNetwork => DELETE_ENTITY_NETWORK_LENGTH,
            Self::None | Self::MaxMessageType => 0,
        }
    }

    pub fn has_payload(self) -> bool {
        matches!(
            self,
            Self::PutComponent | Self::AppendComponent | Self::PutComponentNetwork
        )
    }

    pub fn is_network(self) -> bool {
        matches!(
            self,
            Self::PutComponentNetwork | Self::DeleteComponentNetwork | Self::DeleteEntityNetwork
        )
    }

    /// Targets a single (entity, component) last-writer-wins slot
    pub fn is_lww(self) -> bool {
        matches!(
            self,
            Self::PutComponent
                | Self::DeleteComponent
                | Self::PutComponentNetwork
                | Self::DeleteComponentNetwork
        )
    }

    pub fn is_entity_scoped(self) -> bool {
        matches!(self, Self::DeleteEntity | Self::DeleteEntityNetwork)
    }

    pub fn is_sentinel(self) -> bool {
        matches!(self, Self::None | Self::MaxMessageType)
    }
}
