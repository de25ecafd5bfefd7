/// Simple World implementation for integration testing

use std::collections::{BTreeMap, HashMap};

use scenesync_bridge::SceneWorld;
use scenesync_shared::{ComponentId, CrdtEntity};

// TestHandle - Simple u64-based world object id
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct TestHandle(u64);

impl TestHandle {
    pub fn value(&self) -> u64 {
        self.0
    }
}

pub struct TestObject {
    pub entity: CrdtEntity,
    pub components: BTreeMap<ComponentId, Vec<u8>>,
}

// TestWorld - Simple map-based world that records every call
#[derive(Default)]
pub struct TestWorld {
    next_handle: u64,
    pub objects: HashMap<TestHandle, TestObject>,
    pub created: usize,
    pub destroyed: usize,
    pub writes: usize,
}

impl TestWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn object_for(&self, entity: CrdtEntity) -> Option<&TestObject> {
        self.objects.values().find(|object| object.entity == entity)
    }

    pub fn handle_for(&self, entity: CrdtEntity) -> Option<TestHandle> {
        self.objects
            .iter()
            .find(|(_, object)| object.entity == entity)
            .map(|(handle, _)| *handle)
    }

    pub fn component(&self, entity: CrdtEntity, component_id: ComponentId) -> Option<&[u8]> {
        self.object_for(entity)?
            .components
            .get(&component_id)
            .map(Vec::as_slice)
    }

    pub fn entity_count(&self) -> usize {
        self.objects.len()
    }
}

impl SceneWorld for TestWorld {
    type Handle = TestHandle;

    fn entity_exists(&self, handle: &TestHandle) -> bool {
        self.objects.contains_key(handle)
    }

    fn create_entity(&mut self, entity: CrdtEntity) -> TestHandle {
        self.next_handle += 1;
        let handle = TestHandle(self.next_handle);
        self.objects.insert(
            handle,
            TestObject {
                entity,
                components: BTreeMap::new(),
            },
        );
        self.created += 1;
        handle
    }

    fn set_component(&mut self, handle: &TestHandle, component_id: ComponentId, data: &[u8]) {
        if let Some(object) = self.objects.get_mut(handle) {
            object.components.insert(component_id, data.to_vec());
            self.writes += 1;
        }
    }

    fn remove_component(&mut self, handle: &TestHandle, component_id: ComponentId) {
        if let Some(object) = self.objects.get_mut(handle) {
            object.components.remove(&component_id);
            self.writes += 1;
        }
    }

    fn destroy_entity(&mut self, handle: &TestHandle) {
        if self.objects.remove(handle).is_some() {
            self.destroyed += 1;
        }
    }
}
