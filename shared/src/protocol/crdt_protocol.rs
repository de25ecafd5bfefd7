use std::{
    cmp::Ordering,
    collections::{btree_map::Entry, BTreeMap, VecDeque},
    mem,
    sync::Arc,
};

use log::debug;

use crate::{
    memory::PayloadPool,
    messages::{crdt_message::CrdtMessage, message_type::CrdtMessageType},
    protocol::{
        config::ProtocolConfig,
        reconciliation::{Reconciliation, ReconciliationEffect, RejectReason, StateChange},
    },
    types::{ComponentId, EntityNumber, EntityVersion, Timestamp},
    world::entity::crdt_entity::CrdtEntity,
};

type SlotKey = (ComponentId, CrdtEntity);

/// Last accepted write to one (entity, component) slot
#[derive(Debug)]
pub struct ComponentSlot {
    timestamp: Timestamp,
    data: Vec<u8>,
    deleted: bool,
}

impl ComponentSlot {
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    fn overwrite(&mut self, pool: &PayloadPool, message: &CrdtMessage<'_>) {
        pool.release(mem::take(&mut self.data));
        self.timestamp = message.timestamp;
        self.deleted = message.is_delete();
        if !self.deleted {
            self.data = pool.rent(message.data());
        }
    }
}

#[derive(Debug)]
pub struct AppendEntry {
    pub timestamp: Timestamp,
    pub data: Vec<u8>,
}

/// Diagnostic counters, never consulted by reconciliation itself
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProtocolStats {
    pub accepted: u64,
    pub rejected_outdated_timestamp: u64,
    pub rejected_outdated_data: u64,
    pub rejected_entity_deleted: u64,
    pub rejected_unsupported: u64,
    pub appends_evicted: u64,
}

impl ProtocolStats {
    pub fn rejected(&self) -> u64 {
        self.rejected_outdated_timestamp
            + self.rejected_outdated_data
            + self.rejected_entity_deleted
            + self.rejected_unsupported
    }

    fn record(&mut self, reconciliation: &Reconciliation) {
        match reconciliation {
            Reconciliation::Accepted(_) => self.accepted += 1,
            Reconciliation::Rejected(RejectReason::OutdatedTimestamp) => {
                self.rejected_outdated_timestamp += 1
            }
            Reconciliation::Rejected(RejectReason::OutdatedData) => {
                self.rejected_outdated_data += 1
            }
            Reconciliation::Rejected(RejectReason::EntityWasDeleted) => {
                self.rejected_entity_deleted += 1
            }
            Reconciliation::Rejected(RejectReason::UnsupportedMessageType) => {
                self.rejected_unsupported += 1
            }
        }
    }
}

/// Per-scene reconciliation store.
///
/// Component-scoped messages are merged last-writer-wins on their slot's
/// timestamp, appends go to a bounded per-slot log and entity deletions are
/// remembered per entity number so older generations stay dead. Payloads are
/// only copied out of the inbound buffer once a message is accepted.
pub struct CrdtProtocol {
    config: ProtocolConfig,
    pool: Arc<PayloadPool>,
    lww_components: BTreeMap<SlotKey, ComponentSlot>,
    append_components: BTreeMap<SlotKey, VecDeque<AppendEntry>>,
    deleted_entities: BTreeMap<EntityNumber, EntityVersion>,
    stats: ProtocolStats,
}

impl CrdtProtocol {
    pub fn new(config: ProtocolConfig, pool: Arc<PayloadPool>) -> Self {
        Self {
            config,
            pool,
            lww_components: BTreeMap::new(),
            append_components: BTreeMap::new(),
            deleted_entities: BTreeMap::new(),
            stats: ProtocolStats::default(),
        }
    }

    pub fn apply(&mut self, message: &CrdtMessage<'_>) -> Reconciliation {
        let reconciliation = self.reconcile(message);
        self.stats.record(&reconciliation);
        reconciliation
    }

    fn reconcile(&mut self, message: &CrdtMessage<'_>) -> Reconciliation {
        let message_type = message.message_type;
        if message_type.is_sentinel() {
            return Reconciliation::Rejected(RejectReason::UnsupportedMessageType);
        }
        if message_type.is_entity_scoped() {
            return self.delete_entity(message.entity);
        }
        if self.is_entity_deleted(message.entity) {
            return Reconciliation::Rejected(RejectReason::EntityWasDeleted);
        }
        if message_type == CrdtMessageType::AppendComponent {
            return self.append(message);
        }
        self.update_lww(message)
    }

    fn update_lww(&mut self, message: &CrdtMessage<'_>) -> Reconciliation {
        let is_delete = message.is_delete();

        let slot = match self
            .lww_components
            .entry((message.component_id, message.entity))
        {
            Entry::Vacant(vacant) => {
                // never written: any timestamp wins, a delete leaves a tombstone
                let data = if is_delete {
                    Vec::new()
                } else {
                    self.pool.rent(message.data())
                };
                vacant.insert(ComponentSlot {
                    timestamp: message.timestamp,
                    data,
                    deleted: is_delete,
                });
                let effect = if is_delete {
                    ReconciliationEffect::NoChanges
                } else {
                    ReconciliationEffect::ComponentAdded
                };
                return Reconciliation::accepted(StateChange::UpdatedTimestamp, effect);
            }
            Entry::Occupied(occupied) => occupied.into_mut(),
        };

        match message.timestamp.cmp(&slot.timestamp) {
            Ordering::Less => Reconciliation::Rejected(RejectReason::OutdatedTimestamp),
            Ordering::Greater => {
                let effect = match (slot.deleted, is_delete) {
                    (false, false) => ReconciliationEffect::ComponentModified,
                    (false, true) => ReconciliationEffect::ComponentDeleted,
                    (true, false) => ReconciliationEffect::ComponentAdded,
                    (true, true) => ReconciliationEffect::NoChanges,
                };
                slot.overwrite(&self.pool, message);
                Reconciliation::accepted(StateChange::UpdatedTimestamp, effect)
            }
            // same timestamp: delete wins, then the larger payload wins
            Ordering::Equal => match (slot.deleted, is_delete) {
                (true, true) => {
                    Reconciliation::accepted(StateChange::Unchanged, ReconciliationEffect::NoChanges)
                }
                (true, false) => Reconciliation::Rejected(RejectReason::OutdatedData),
                (false, true) => {
                    slot.overwrite(&self.pool, message);
                    Reconciliation::accepted(
                        StateChange::UpdatedData,
                        ReconciliationEffect::ComponentDeleted,
                    )
                }
                (false, false) => match compare_data(message.data(), &slot.data) {
                    Ordering::Equal => Reconciliation::accepted(
                        StateChange::Unchanged,
                        ReconciliationEffect::NoChanges,
                    ),
                    Ordering::Greater => {
                        slot.overwrite(&self.pool, message);
                        Reconciliation::accepted(
                            StateChange::UpdatedData,
                            ReconciliationEffect::ComponentModified,
                        )
                    }
                    Ordering::Less => Reconciliation::Rejected(RejectReason::OutdatedData),
                },
            },
        }
    }

    fn append(&mut self, message: &CrdtMessage<'_>) -> Reconciliation {
        let capacity = self.config.max_append_components.max(1);
        let log = self
            .append_components
            .entry((message.component_id, message.entity))
            .or_default();

        while log.len() >= capacity {
            let Some(evicted) = log.pop_front() else {
                break;
            };
            self.pool.release(evicted.data);
            self.stats.appends_evicted += 1;
        }
        log.push_back(AppendEntry {
            timestamp: message.timestamp,
            data: self.pool.rent(message.data()),
        });

        Reconciliation::accepted(
            StateChange::AppendedData,
            ReconciliationEffect::ComponentAdded,
        )
    }

    fn delete_entity(&mut self, entity: CrdtEntity) -> Reconciliation {
        let number = entity.number();
        let version = entity.version();

        if let Some(&deleted_version) = self.deleted_entities.get(&number) {
            if deleted_version >= version {
                return Reconciliation::accepted(
                    StateChange::Unchanged,
                    ReconciliationEffect::NoChanges,
                );
            }
        }
        self.deleted_entities.insert(number, version);

        let is_cascaded = |key: &SlotKey| key.1.number() == number && key.1.version() <= version;
        let pool = &self.pool;
        let mut removed = 0usize;
        self.lww_components.retain(|key, slot| {
            if is_cascaded(key) {
                pool.release(mem::take(&mut slot.data));
                removed += 1;
                false
            } else {
                true
            }
        });
        self.append_components.retain(|key, log| {
            if is_cascaded(key) {
                for entry in log.drain(..) {
                    pool.release(entry.data);
                }
                removed += 1;
                false
            } else {
                true
            }
        });
        debug!("deleted {:?}, cascaded {} component slots", entity, removed);

        Reconciliation::accepted(StateChange::EntityDeleted, ReconciliationEffect::EntityDeleted)
    }

    /// `true` if `entity`'s number was deleted at its version or a newer one
    pub fn is_entity_deleted(&self, entity: CrdtEntity) -> bool {
        self.deleted_entities
            .get(&entity.number())
            .is_some_and(|&deleted_version| deleted_version >= entity.version())
    }

    pub fn slot(&self, entity: CrdtEntity, component_id: ComponentId) -> Option<&ComponentSlot> {
        self.lww_components.get(&(component_id, entity))
    }

    pub fn last_timestamp(
        &self,
        entity: CrdtEntity,
        component_id: ComponentId,
    ) -> Option<Timestamp> {
        self.slot(entity, component_id).map(ComponentSlot::timestamp)
    }

    /// Retained append entries for a slot, oldest first
    pub fn appended(
        &self,
        entity: CrdtEntity,
        component_id: ComponentId,
    ) -> impl Iterator<Item = &AppendEntry> {
        self.append_components
            .get(&(component_id, entity))
            .into_iter()
            .flat_map(|log| log.iter())
    }

    /// Every entity holding at least one live slot or append entry, sorted
    pub fn entities(&self) -> Vec<CrdtEntity> {
        let mut entities: Vec<CrdtEntity> = self
            .lww_components
            .iter()
            .filter(|(_, slot)| !slot.deleted)
            .map(|((_, entity), _)| *entity)
            .chain(self.append_components.keys().map(|(_, entity)| *entity))
            .collect();
        entities.sort();
        entities.dedup();
        entities
    }

    /// Number of messages [`Self::create_messages_from_current_state`] yields
    pub fn messages_count(&self) -> usize {
        self.lww_components.len()
            + self
                .append_components
                .values()
                .map(VecDeque::len)
                .sum::<usize>()
            + self.deleted_entities.len()
    }

    /// The whole store as a message list a fresh peer can replay.
    ///
    /// Entity deletions come first so replayed slots of dead generations are
    /// rejected, then LWW slots, then append logs, each ordered by component
    /// and entity.
    pub fn create_messages_from_current_state(&self) -> Vec<CrdtMessage<'_>> {
        let mut messages = Vec::with_capacity(self.messages_count());

        for (&number, &version) in &self.deleted_entities {
            messages.push(CrdtMessage::delete_entity(CrdtEntity::from_parts(
                number, version,
            )));
        }
        for (&(component_id, entity), slot) in &self.lww_components {
            messages.push(if slot.deleted {
                CrdtMessage::delete_component(entity, component_id, slot.timestamp)
            } else {
                CrdtMessage::put(entity, component_id, slot.timestamp, slot.data.as_slice())
            });
        }
        for (&(component_id, entity), log) in &self.append_components {
            for entry in log {
                messages.push(CrdtMessage::append(
                    entity,
                    component_id,
                    entry.timestamp,
                    entry.data.as_slice(),
                ));
            }
        }

        messages
    }

    pub fn stats(&self) -> ProtocolStats {
        self.stats
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    pub fn pool(&self) -> &Arc<PayloadPool> {
        &self.pool
    }
}

impl Drop for CrdtProtocol {
    fn drop(&mut self) {
        for (_, slot) in mem::take(&mut self.lww_components) {
            self.pool.release(slot.data);
        }
        for (_, log) in mem::take(&mut self.append_components) {
            for entry in log {
                self.pool.release(entry.data);
            }
        }
    }
}

// Length first, then bytes
fn compare_data(incoming: &[u8], stored: &[u8]) -> Ordering {
    incoming
        .len()
        .cmp(&stored.len())
        .then_with(|| incoming.cmp(stored))
}
