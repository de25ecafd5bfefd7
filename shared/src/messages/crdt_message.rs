use std::borrow::Cow;

use crate::{
    messages::message_type::CrdtMessageType,
    types::{ComponentId, NetworkId, Timestamp},
    world::entity::crdt_entity::CrdtEntity,
};

/// A single entity/component mutation.
///
/// Decoded messages borrow their payload from the inbound buffer; messages
/// produced locally own it. Fields a message type does not carry on the wire
/// (e.g. `timestamp` of a `DeleteEntity`) are always zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CrdtMessage<'a> {
    pub message_type: CrdtMessageType,
    pub entity: CrdtEntity,
    pub component_id: ComponentId,
    pub timestamp: Timestamp,
    pub network_id: NetworkId,
    pub data: Cow<'a, [u8]>,
}

impl<'a> CrdtMessage<'a> {
    fn component(
        message_type: CrdtMessageType,
        entity: CrdtEntity,
        component_id: ComponentId,
        timestamp: Timestamp,
        network_id: NetworkId,
        data: Cow<'a, [u8]>,
    ) -> Self {
        Self {
            message_type,
            entity,
            component_id,
            timestamp,
            network_id,
            data,
        }
    }

    pub fn put(
        entity: CrdtEntity,
        component_id: ComponentId,
        timestamp: Timestamp,
        data: impl Into<Cow<'a, [u8]>>,
    ) -> Self {
        Self::component(
            CrdtMessageType::PutComponent,
            entity,
            component_id,
            timestamp,
            0,
            data.into(),
        )
    }

    pub fn append(
        entity: CrdtEntity,
        component_id: ComponentId,
        timestamp: Timestamp,
        data: impl Into<Cow<'a, [u8]>>,
    ) -> Self {
        Self::component(
            CrdtMessageType::AppendComponent,
            entity,
            component_id,
            timestamp,
            0,
            data.into(),
        )
    }

    pub fn delete_component(
        entity: CrdtEntity,
        component_id: ComponentId,
        timestamp: Timestamp,
    ) -> Self {
        Self::component(
            CrdtMessageType::DeleteComponent,
            entity,
            component_id,
            timestamp,
            0,
            Cow::Borrowed(&[]),
        )
    }

    pub fn delete_entity(entity: CrdtEntity) -> Self {
        Self::component(
            CrdtMessageType::DeleteEntity,
            entity,
            0,
            0,
            0,
            Cow::Borrowed(&[]),
        )
    }

    pub fn put_network(
        entity: CrdtEntity,
        component_id: ComponentId,
        timestamp: Timestamp,
        network_id: NetworkId,
        data: impl Into<Cow<'a, [u8]>>,
    ) -> Self {
        Self::component(
            CrdtMessageType::PutComponentNetwork,
            entity,
            component_id,
            timestamp,
            network_id,
            data.into(),
        )
    }

    pub fn delete_component_network(
        entity: CrdtEntity,
        component_id: ComponentId,
        timestamp: Timestamp,
        network_id: NetworkId,
    ) -> Self {
        Self::component(
            CrdtMessageType::DeleteComponentNetwork,
            entity,
            component_id,
            timestamp,
            network_id,
            Cow::Borrowed(&[]),
        )
    }

    pub fn delete_entity_network(entity: CrdtEntity, network_id: NetworkId) -> Self {
        Self::component(
            CrdtMessageType::DeleteEntityNetwork,
            entity,
            0,
            0,
            network_id,
            Cow::Borrowed(&[]),
        )
    }

    /// A sentinel message (`None` or `MaxMessageType`) with no body
    pub fn sentinel(message_type: CrdtMessageType) -> Self {
        Self::component(
            message_type,
            CrdtEntity::new(0),
            0,
            0,
            0,
            Cow::Borrowed(&[]),
        )
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn is_delete(&self) -> bool {
        matches!(
            self.message_type,
            CrdtMessageType::DeleteComponent | CrdtMessageType::DeleteComponentNetwork
        )
    }

    /// Detaches the message from the buffer it was decoded from
    pub fn into_owned(self) -> CrdtMessage<'static> {
        CrdtMessage {
            message_type: self.message_type,
            entity: self.entity,
            component_id: self.component_id,
            timestamp: self.timestamp,
            network_id: self.network_id,
            data: Cow::Owned(self.data.into_owned()),
        }
    }
}
