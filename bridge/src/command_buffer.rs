use std::{collections::HashMap, mem, sync::Arc};

use scenesync_shared::{
    ComponentId, CrdtEntity, CrdtMessage, CrdtMessageType, PayloadPool, ReconciliationEffect,
};

type SlotKey = (CrdtEntity, ComponentId);

/// One world mutation, ready to be applied by `WorldBridge::ingest`
#[derive(Debug, PartialEq, Eq)]
pub enum SyncOp {
    DestroyEntity(CrdtEntity),
    SetComponent {
        entity: CrdtEntity,
        component_id: ComponentId,
        data: Vec<u8>,
    },
    RemoveComponent {
        entity: CrdtEntity,
        component_id: ComponentId,
    },
}

impl SyncOp {
    pub fn entity(&self) -> CrdtEntity {
        match self {
            Self::DestroyEntity(entity) => *entity,
            Self::SetComponent { entity, .. } | Self::RemoveComponent { entity, .. } => *entity,
        }
    }
}

struct PendingComponent {
    first: ReconciliationEffect,
    last: ReconciliationEffect,
    data: Option<Vec<u8>>,
}

/// Collects the accepted outcomes of one inbound batch and collapses them
/// into the smallest set of world operations.
///
/// Only the first and last effect per slot matter: a component added and
/// deleted within one batch never reaches the world, one deleted and
/// re-added is just modified. Only the last payload is kept.
pub struct WorldSyncCommandBuffer {
    pool: Arc<PayloadPool>,
    deleted_entities: Vec<CrdtEntity>,
    components: Vec<(SlotKey, PendingComponent)>,
    component_index: HashMap<SlotKey, usize>,
    appended: Vec<(SlotKey, Vec<u8>)>,
}

impl WorldSyncCommandBuffer {
    pub fn new(pool: Arc<PayloadPool>) -> Self {
        Self {
            pool,
            deleted_entities: Vec::new(),
            components: Vec::new(),
            component_index: HashMap::new(),
            appended: Vec::new(),
        }
    }

    /// Records an accepted message. The payload is copied, so `message` may
    /// borrow from a buffer that is about to be dropped.
    pub fn record(&mut self, message: &CrdtMessage<'_>, effect: ReconciliationEffect) {
        match effect {
            ReconciliationEffect::NoChanges => {}
            ReconciliationEffect::EntityDeleted => self.record_entity_deleted(message.entity),
            _ if message.message_type == CrdtMessageType::AppendComponent => {
                let data = self.pool.rent(message.data());
                self.appended
                    .push(((message.entity, message.component_id), data));
            }
            _ => self.record_component(message, effect),
        }
    }

    fn record_component(&mut self, message: &CrdtMessage<'_>, effect: ReconciliationEffect) {
        let key = (message.entity, message.component_id);
        let data = if effect == ReconciliationEffect::ComponentDeleted {
            None
        } else {
            Some(self.pool.rent(message.data()))
        };

        match self.component_index.get(&key) {
            Some(&index) => {
                let pending = &mut self.components[index].1;
                pending.last = effect;
                if let Some(previous) = mem::replace(&mut pending.data, data) {
                    self.pool.release(previous);
                }
            }
            None => {
                self.component_index.insert(key, self.components.len());
                self.components.push((
                    key,
                    PendingComponent {
                        first: effect,
                        last: effect,
                        data,
                    },
                ));
            }
        }
    }

    fn record_entity_deleted(&mut self, entity: CrdtEntity) {
        let is_cascaded = |other: &CrdtEntity| {
            other.number() == entity.number() && other.version() <= entity.version()
        };

        let pool = &self.pool;
        self.components.retain_mut(|((other, _), pending)| {
            if !is_cascaded(other) {
                return true;
            }
            if let Some(data) = pending.data.take() {
                pool.release(data);
            }
            false
        });
        self.appended.retain_mut(|((other, _), data)| {
            if !is_cascaded(other) {
                return true;
            }
            pool.release(mem::take(data));
            false
        });
        self.component_index = self
            .components
            .iter()
            .enumerate()
            .map(|(index, (key, _))| (*key, index))
            .collect();

        if !self.deleted_entities.contains(&entity) {
            self.deleted_entities.push(entity);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.deleted_entities.is_empty() && self.components.is_empty() && self.appended.is_empty()
    }

    /// Entity deletions first, then collapsed component changes in arrival
    /// order, then appended entries
    pub fn into_ops(mut self) -> Vec<SyncOp> {
        let mut ops = Vec::with_capacity(
            self.deleted_entities.len() + self.components.len() + self.appended.len(),
        );

        ops.extend(
            mem::take(&mut self.deleted_entities)
                .into_iter()
                .map(SyncOp::DestroyEntity),
        );

        for ((entity, component_id), mut pending) in mem::take(&mut self.components) {
            match merge_effects(pending.first, pending.last) {
                ReconciliationEffect::ComponentAdded | ReconciliationEffect::ComponentModified => {
                    if let Some(data) = pending.data.take() {
                        ops.push(SyncOp::SetComponent {
                            entity,
                            component_id,
                            data,
                        });
                    }
                }
                ReconciliationEffect::ComponentDeleted => ops.push(SyncOp::RemoveComponent {
                    entity,
                    component_id,
                }),
                _ => {
                    if let Some(data) = pending.data.take() {
                        self.pool.release(data);
                    }
                }
            }
        }

        for ((entity, component_id), data) in mem::take(&mut self.appended) {
            ops.push(SyncOp::SetComponent {
                entity,
                component_id,
                data,
            });
        }

        ops
    }
}

impl Drop for WorldSyncCommandBuffer {
    fn drop(&mut self) {
        for (_, pending) in self.components.drain(..) {
            if let Some(data) = pending.data {
                self.pool.release(data);
            }
        }
        for (_, data) in self.appended.drain(..) {
            self.pool.release(data);
        }
    }
}

/// Net effect of a slot that went through `first` and ended on `last`
/// within one batch
pub fn merge_effects(
    first: ReconciliationEffect,
    last: ReconciliationEffect,
) -> ReconciliationEffect {
    use ReconciliationEffect::{ComponentAdded, ComponentDeleted, ComponentModified, NoChanges};

    match (first, last) {
        (ComponentAdded, ComponentAdded) | (ComponentAdded, ComponentModified) => ComponentAdded,
        (ComponentAdded, ComponentDeleted) => NoChanges,
        (ComponentModified, ComponentAdded) | (ComponentModified, ComponentModified) => {
            ComponentModified
        }
        (ComponentModified, ComponentDeleted) => ComponentDeleted,
        (ComponentDeleted, ComponentAdded) | (ComponentDeleted, ComponentModified) => {
            ComponentModified
        }
        (ComponentDeleted, ComponentDeleted) => ComponentDeleted,
        (_, last) => last,
    }
}
