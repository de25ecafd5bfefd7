use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::Arc,
};

use log::{debug, warn};

use scenesync_shared::{
    ComponentId, CrdtEntity, CrdtMessage, EntityNumber, EntityNumberArena, PayloadPool, Timestamp,
};

use crate::{
    budget::IngestBudget, command_buffer::SyncOp, error::BridgeError,
    registry::ComponentRegistry, world::SceneWorld,
};

type SlotKey = (CrdtEntity, ComponentId);

/// How much of the pending queue one `ingest` call got through
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub applied: usize,
    pub skipped: usize,
    pub deferred: usize,
}

#[derive(Default)]
struct OutgoingChanges {
    deleted_entities: Vec<CrdtEntity>,
    // last write per slot, in order of first write
    components: Vec<(SlotKey, Option<Vec<u8>>)>,
    component_index: HashMap<SlotKey, usize>,
    appended: Vec<(SlotKey, Vec<u8>)>,
}

impl OutgoingChanges {
    fn is_empty(&self) -> bool {
        self.deleted_entities.is_empty() && self.components.is_empty() && self.appended.is_empty()
    }
}

/// Mirrors one scene's reconciled state into the shared world and collects
/// the renderer's own changes for that scene.
///
/// The bridge is the only writer of the scene entity → world object map.
/// Everything here runs on the renderer thread inside a held frame gate.
pub struct WorldBridge<W: SceneWorld> {
    registry: Arc<ComponentRegistry<W>>,
    pool: Arc<PayloadPool>,
    entities: HashMap<EntityNumber, (CrdtEntity, W::Handle)>,
    engine_entities: HashSet<EntityNumber>,
    engine_arena: EntityNumberArena,
    pending_ops: VecDeque<SyncOp>,
    outgoing: OutgoingChanges,
    own_timestamps: HashMap<SlotKey, Timestamp>,
}

impl<W: SceneWorld> WorldBridge<W> {
    pub fn new(registry: Arc<ComponentRegistry<W>>, pool: Arc<PayloadPool>) -> Self {
        Self {
            registry,
            pool,
            entities: HashMap::new(),
            engine_entities: HashSet::new(),
            engine_arena: EntityNumberArena::for_engine(),
            pending_ops: VecDeque::new(),
            outgoing: OutgoingChanges::default(),
            own_timestamps: HashMap::new(),
        }
    }

    // Incoming

    /// Queues finalized operations behind anything still deferred
    pub fn enqueue(&mut self, ops: impl IntoIterator<Item = SyncOp>) {
        self.pending_ops.extend(ops);
    }

    pub fn pending(&self) -> usize {
        self.pending_ops.len()
    }

    /// Applies queued operations in order until `budget` runs out
    pub fn ingest(&mut self, world: &mut W, budget: &mut dyn IngestBudget) -> IngestReport {
        let mut report = IngestReport::default();

        while !self.pending_ops.is_empty() {
            if !budget.try_consume() {
                break;
            }
            let Some(op) = self.pending_ops.pop_front() else {
                break;
            };
            if self.apply_op(world, op) {
                report.applied += 1;
            } else {
                report.skipped += 1;
            }
        }

        report.deferred = self.pending_ops.len();
        if report.deferred > 0 {
            debug!(
                "WorldBridge: deferred {} operations to the next frame",
                report.deferred
            );
        }
        report
    }

    fn apply_op(&mut self, world: &mut W, op: SyncOp) -> bool {
        let entity = op.entity();
        if entity.is_reserved() && !self.engine_entities.contains(&entity.number()) {
            debug!("WorldBridge: {:?} is engine-owned and not registered", entity);
            if let SyncOp::SetComponent { data, .. } = op {
                self.pool.release(data);
            }
            return false;
        }

        match op {
            SyncOp::DestroyEntity(entity) => self.destroy_entity(world, entity),
            SyncOp::SetComponent {
                entity,
                component_id,
                data,
            } => {
                let applied = self.set_component(world, entity, component_id, &data);
                self.pool.release(data);
                applied
            }
            SyncOp::RemoveComponent {
                entity,
                component_id,
            } => self.remove_component(world, entity, component_id),
        }
    }

    fn set_component(
        &mut self,
        world: &mut W,
        entity: CrdtEntity,
        component_id: ComponentId,
        data: &[u8],
    ) -> bool {
        let Some(bridge) = self.registry.get(component_id) else {
            debug!("WorldBridge: component {} is not registered", component_id);
            return false;
        };
        if let Err(error) = (bridge.decode)(data) {
            warn!(
                "WorldBridge: dropping `{}` for {:?}: {}",
                bridge.name, entity, error
            );
            return false;
        }
        let apply = bridge.apply;
        let Some(handle) = self.ensure_entity(world, entity) else {
            return false;
        };
        apply(world, &handle, component_id, Some(data));
        true
    }

    fn remove_component(
        &mut self,
        world: &mut W,
        entity: CrdtEntity,
        component_id: ComponentId,
    ) -> bool {
        let Some(bridge) = self.registry.get(component_id) else {
            debug!("WorldBridge: component {} is not registered", component_id);
            return false;
        };
        let Some(handle) = self.handle(entity) else {
            return false;
        };
        (bridge.apply)(world, handle, component_id, None);
        true
    }

    fn destroy_entity(&mut self, world: &mut W, entity: CrdtEntity) -> bool {
        let number = entity.number();
        let Some((mapped, _)) = self.entities.get(&number) else {
            return false;
        };
        if mapped.version() > entity.version() {
            return false;
        }
        let Some((mapped, handle)) = self.entities.remove(&number) else {
            return false;
        };

        if world.entity_exists(&handle) {
            world.destroy_entity(&handle);
        }
        self.forget_entity(mapped);
        true
    }

    /// World handle for `entity`, spawning it on first use. A stale
    /// generation still in the map is destroyed first; an older generation
    /// than the mapped one gets nothing.
    fn ensure_entity(&mut self, world: &mut W, entity: CrdtEntity) -> Option<W::Handle> {
        let number = entity.number();
        if let Some((mapped, handle)) = self.entities.get(&number) {
            if *mapped == entity {
                return Some(handle.clone());
            }
            if mapped.version() > entity.version() {
                debug!(
                    "WorldBridge: ignoring {:?}, {:?} is newer",
                    entity, mapped
                );
                return None;
            }
            if let Some((stale, handle)) = self.entities.remove(&number) {
                world.destroy_entity(&handle);
                self.forget_entity(stale);
            }
        }

        let handle = world.create_entity(entity);
        self.entities.insert(number, (entity, handle.clone()));
        Some(handle)
    }

    fn forget_entity(&mut self, entity: CrdtEntity) {
        self.own_timestamps
            .retain(|(other, _), _| other.number() != entity.number());
    }

    // Engine entities

    /// Maps an engine-owned entity (player, camera, ...) so scene and
    /// renderer changes to it are honored
    pub fn register_engine_entity(&mut self, entity: CrdtEntity, handle: W::Handle) {
        self.engine_entities.insert(entity.number());
        self.entities.insert(entity.number(), (entity, handle));
    }

    /// Allocates an engine-range entity (e.g. another player's avatar),
    /// spawns it and maps it
    pub fn reserve_engine_entity(&mut self, world: &mut W) -> Result<CrdtEntity, BridgeError> {
        let entity = self.engine_arena.allocate()?;
        let handle = world.create_entity(entity);
        self.register_engine_entity(entity, handle);
        Ok(entity)
    }

    pub fn release_engine_entity(
        &mut self,
        world: &mut W,
        entity: CrdtEntity,
    ) -> Result<(), BridgeError> {
        self.engine_arena.free(&entity)?;
        self.engine_entities.remove(&entity.number());
        if let Some((mapped, handle)) = self.entities.remove(&entity.number()) {
            world.destroy_entity(&handle);
            self.forget_entity(mapped);
        }
        Ok(())
    }

    pub fn handle(&self, entity: CrdtEntity) -> Option<&W::Handle> {
        match self.entities.get(&entity.number()) {
            Some((mapped, handle)) if *mapped == entity => Some(handle),
            _ => None,
        }
    }

    pub fn mapped_entities(&self) -> usize {
        self.entities.len()
    }

    // Outgoing

    pub fn put_component(&mut self, entity: CrdtEntity, component_id: ComponentId, data: &[u8]) {
        let data = self.pool.rent(data);
        self.record_outgoing((entity, component_id), Some(data));
    }

    pub fn delete_component(&mut self, entity: CrdtEntity, component_id: ComponentId) {
        self.record_outgoing((entity, component_id), None);
    }

    pub fn append_component(&mut self, entity: CrdtEntity, component_id: ComponentId, data: &[u8]) {
        let data = self.pool.rent(data);
        self.outgoing.appended.push(((entity, component_id), data));
    }

    pub fn delete_entity(&mut self, entity: CrdtEntity) {
        if !self.outgoing.deleted_entities.contains(&entity) {
            self.outgoing.deleted_entities.push(entity);
        }
    }

    fn record_outgoing(&mut self, key: SlotKey, data: Option<Vec<u8>>) {
        let outgoing = &mut self.outgoing;
        match outgoing.component_index.get(&key) {
            Some(&index) => {
                let previous = std::mem::replace(&mut outgoing.components[index].1, data);
                if let Some(previous) = previous {
                    self.pool.release(previous);
                }
            }
            None => {
                outgoing
                    .component_index
                    .insert(key, outgoing.components.len());
                outgoing.components.push((key, data));
            }
        }
    }

    pub fn has_outgoing(&self) -> bool {
        !self.outgoing.is_empty()
    }

    /// Turns the changes recorded since the last drain into messages.
    ///
    /// Every LWW slot gets one more than the last timestamp this bridge wrote
    /// to it. Entity deletions come last and unmap the entity.
    pub fn drain_outgoing(&mut self, world: &W) -> Vec<CrdtMessage<'static>> {
        let outgoing = std::mem::take(&mut self.outgoing);
        let mut messages = Vec::with_capacity(
            outgoing.components.len() + outgoing.appended.len() + outgoing.deleted_entities.len(),
        );

        for ((entity, component_id), data) in outgoing.components {
            if !self.is_live(world, entity) {
                self.report_unmapped(entity);
                if let Some(data) = data {
                    self.pool.release(data);
                }
                continue;
            }
            let timestamp = self.next_own_timestamp((entity, component_id));
            messages.push(match data {
                Some(data) => CrdtMessage::put(entity, component_id, timestamp, data),
                None => CrdtMessage::delete_component(entity, component_id, timestamp),
            });
        }

        for ((entity, component_id), data) in outgoing.appended {
            if !self.is_live(world, entity) {
                self.report_unmapped(entity);
                self.pool.release(data);
                continue;
            }
            let timestamp = self.next_own_timestamp((entity, component_id));
            messages.push(CrdtMessage::append(entity, component_id, timestamp, data));
        }

        for entity in outgoing.deleted_entities {
            if self.handle(entity).is_none() {
                self.report_unmapped(entity);
                continue;
            }
            self.entities.remove(&entity.number());
            self.engine_entities.remove(&entity.number());
            self.forget_entity(entity);
            messages.push(CrdtMessage::delete_entity(entity));
        }

        messages
    }

    fn is_live(&self, world: &W, entity: CrdtEntity) -> bool {
        self.handle(entity)
            .is_some_and(|handle| world.entity_exists(handle))
    }

    fn next_own_timestamp(&mut self, key: SlotKey) -> Timestamp {
        let timestamp = self
            .own_timestamps
            .get(&key)
            .map_or(0, |last| last.wrapping_add(1));
        self.own_timestamps.insert(key, timestamp);
        timestamp
    }

    fn report_unmapped(&self, entity: CrdtEntity) {
        cfg_if! {
            if #[cfg(debug_assertions)] {
                panic!("WorldBridge: outgoing change for unmapped entity {:?}", entity);
            } else {
                warn!("WorldBridge: skipping outgoing change for unmapped entity {:?}", entity);
            }
        }
    }

    // Teardown

    /// Destroys every mapped scene object and drops all queued work. Engine
    /// entities stay mapped.
    pub fn teardown(&mut self, world: &mut W) {
        let scene_numbers: Vec<EntityNumber> = self
            .entities
            .keys()
            .filter(|number| !self.engine_entities.contains(*number))
            .copied()
            .collect();

        for number in &scene_numbers {
            if let Some((_, handle)) = self.entities.remove(number) {
                if world.entity_exists(&handle) {
                    world.destroy_entity(&handle);
                }
            }
        }

        for op in self.pending_ops.drain(..) {
            if let SyncOp::SetComponent { data, .. } = op {
                self.pool.release(data);
            }
        }
        let outgoing = std::mem::take(&mut self.outgoing);
        for data in outgoing.components.into_iter().filter_map(|(_, data)| data) {
            self.pool.release(data);
        }
        for (_, data) in outgoing.appended {
            self.pool.release(data);
        }
        self.own_timestamps.clear();

        debug!("WorldBridge: teardown destroyed {} entities", scene_numbers.len());
    }
}
