use std::{fmt::Debug, hash::Hash};

use scenesync_shared::{ComponentId, CrdtEntity};

/// The shared entity-component world scenes are mirrored into.
///
/// Implemented by the engine; the bridge only ever touches the world through
/// these calls, and only while the frame gate is held.
pub trait SceneWorld {
    type Handle: Clone + Eq + Hash + Debug;

    fn entity_exists(&self, handle: &Self::Handle) -> bool;

    /// Spawns the world object standing for `entity`
    fn create_entity(&mut self, entity: CrdtEntity) -> Self::Handle;

    fn set_component(&mut self, handle: &Self::Handle, component_id: ComponentId, data: &[u8]);

    fn remove_component(&mut self, handle: &Self::Handle, component_id: ComponentId);

    /// Removes the object together with any engine-side resources hanging off it
    fn destroy_entity(&mut self, handle: &Self::Handle);
}
