use scenesync_shared::{ComponentId, CrdtEntity, CrdtMessage, NetworkId, Timestamp};

/// Fluent builder for creating owned test messages
pub struct TestMessageBuilder {
    entity: CrdtEntity,
    component_id: ComponentId,
    timestamp: Timestamp,
    network_id: Option<NetworkId>,
}

impl TestMessageBuilder {
    pub fn new(entity: CrdtEntity) -> Self {
        Self {
            entity,
            component_id: 1,
            timestamp: 0,
            network_id: None,
        }
    }

    pub fn component(mut self, component_id: ComponentId) -> Self {
        self.component_id = component_id;
        self
    }

    pub fn timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Build the `_NETWORK` variant of the message
    pub fn network(mut self, network_id: NetworkId) -> Self {
        self.network_id = Some(network_id);
        self
    }

    pub fn put(self, data: &[u8]) -> CrdtMessage<'static> {
        let data = data.to_vec();
        match self.network_id {
            Some(network_id) => CrdtMessage::put_network(
                self.entity,
                self.component_id,
                self.timestamp,
                network_id,
                data,
            ),
            None => CrdtMessage::put(self.entity, self.component_id, self.timestamp, data),
        }
    }

    pub fn delete(self) -> CrdtMessage<'static> {
        match self.network_id {
            Some(network_id) => CrdtMessage::delete_component_network(
                self.entity,
                self.component_id,
                self.timestamp,
                network_id,
            ),
            None => CrdtMessage::delete_component(self.entity, self.component_id, self.timestamp),
        }
    }

    pub fn append(self, data: &[u8]) -> CrdtMessage<'static> {
        CrdtMessage::append(
            self.entity,
            self.component_id,
            self.timestamp,
            data.to_vec(),
        )
    }

    pub fn delete_entity(self) -> CrdtMessage<'static> {
        match self.network_id {
            Some(network_id) => CrdtMessage::delete_entity_network(self.entity, network_id),
            None => CrdtMessage::delete_entity(self.entity),
        }
    }
}

/// Shorthand for a scene-range entity at version 0
pub fn scene_entity(number: u16) -> CrdtEntity {
    CrdtEntity::from_parts(number, 0)
}
