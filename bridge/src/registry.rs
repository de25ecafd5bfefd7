use std::collections::HashMap;

use log::debug;

use scenesync_shared::ComponentId;

use crate::{error::SchemaError, world::SceneWorld};

/// Validates a payload before it reaches the world
pub type DecodeFn = fn(&[u8]) -> Result<(), SchemaError>;

/// Writes (`Some`) or removes (`None`) the component on a world object
pub type ApplyFn<W> = fn(&mut W, &<W as SceneWorld>::Handle, ComponentId, Option<&[u8]>);

/// How one component id is brought into the world
pub struct ComponentBridge<W: SceneWorld> {
    pub name: &'static str,
    pub decode: DecodeFn,
    pub apply: ApplyFn<W>,
}

impl<W: SceneWorld> ComponentBridge<W> {
    pub fn new(name: &'static str, decode: DecodeFn, apply: ApplyFn<W>) -> Self {
        Self {
            name,
            decode,
            apply,
        }
    }

    /// Accepts any payload and forwards it to `SceneWorld::set_component` /
    /// `SceneWorld::remove_component` untouched
    pub fn passthrough(name: &'static str) -> Self {
        Self::new(name, accept_any, passthrough_apply::<W>)
    }

    /// Passthrough that runs `decode` on every payload first
    pub fn validated(name: &'static str, decode: DecodeFn) -> Self {
        Self::new(name, decode, passthrough_apply::<W>)
    }
}

// fn pointers are Copy regardless of W
impl<W: SceneWorld> Clone for ComponentBridge<W> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<W: SceneWorld> Copy for ComponentBridge<W> {}

fn accept_any(_data: &[u8]) -> Result<(), SchemaError> {
    Ok(())
}

fn passthrough_apply<W: SceneWorld>(
    world: &mut W,
    handle: &W::Handle,
    component_id: ComponentId,
    data: Option<&[u8]>,
) {
    match data {
        Some(data) => world.set_component(handle, component_id, data),
        None => world.remove_component(handle, component_id),
    }
}

/// Dispatch table from component id to its bridge, filled once at startup
pub struct ComponentRegistry<W: SceneWorld> {
    bridges: HashMap<ComponentId, ComponentBridge<W>>,
}

impl<W: SceneWorld> ComponentRegistry<W> {
    pub fn new() -> Self {
        Self {
            bridges: HashMap::new(),
        }
    }

    pub fn register(
        &mut self,
        component_id: ComponentId,
        bridge: ComponentBridge<W>,
    ) -> Result<(), SchemaError> {
        if let Some(existing) = self.bridges.get(&component_id) {
            return Err(SchemaError::AlreadyRegistered {
                component_id,
                name: existing.name,
            });
        }
        debug!(
            "ComponentRegistry: {} registered as `{}`",
            component_id, bridge.name
        );
        self.bridges.insert(component_id, bridge);
        Ok(())
    }

    pub fn get(&self, component_id: ComponentId) -> Option<&ComponentBridge<W>> {
        self.bridges.get(&component_id)
    }

    pub fn contains(&self, component_id: ComponentId) -> bool {
        self.bridges.contains_key(&component_id)
    }

    pub fn len(&self) -> usize {
        self.bridges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bridges.is_empty()
    }
}

impl<W: SceneWorld> Default for ComponentRegistry<W> {
    fn default() -> Self {
        Self::new()
    }
}
