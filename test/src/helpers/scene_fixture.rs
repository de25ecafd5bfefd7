use std::sync::Arc;

use scenesync_bridge::{
    BridgeConfig, ComponentBridge, ComponentRegistry, FrameDriver, FrameGate, GateOwner,
    SceneShared, ScenePort, SchemaError,
};
use scenesync_shared::{ComponentId, PayloadPool};

use crate::test_world::TestWorld;

pub const TRANSFORM_COMPONENT: ComponentId = 1;
pub const MESH_COMPONENT: ComponentId = 2;
pub const POINTER_EVENTS_COMPONENT: ComponentId = 3;
/// Registered with a decoder that insists on 4-byte payloads
pub const TAG_COMPONENT: ComponentId = 4;

fn four_bytes(data: &[u8]) -> Result<(), SchemaError> {
    if data.len() != 4 {
        return Err(SchemaError::UnexpectedLength {
            expected: 4,
            actual: data.len(),
        });
    }
    Ok(())
}

pub fn test_registry() -> ComponentRegistry<TestWorld> {
    let mut registry = ComponentRegistry::new();
    registry
        .register(TRANSFORM_COMPONENT, ComponentBridge::passthrough("Transform"))
        .expect("fresh registry");
    registry
        .register(MESH_COMPONENT, ComponentBridge::passthrough("MeshRenderer"))
        .expect("fresh registry");
    registry
        .register(
            POINTER_EVENTS_COMPONENT,
            ComponentBridge::passthrough("PointerEventsResult"),
        )
        .expect("fresh registry");
    registry
        .register(TAG_COMPONENT, ComponentBridge::validated("Tag", four_bytes))
        .expect("fresh registry");
    registry
}

/// One renderer, one world and any number of scenes sharing a gate
pub struct TestHarness {
    pub config: BridgeConfig,
    pub gate: Arc<FrameGate>,
    pub pool: Arc<PayloadPool>,
    pub world: TestWorld,
    pub driver: FrameDriver<TestWorld>,
}

impl TestHarness {
    pub fn new(config: BridgeConfig) -> Self {
        let gate = Arc::new(FrameGate::new(config.gate.clone()));
        let pool = Arc::new(PayloadPool::new());
        let driver = FrameDriver::new(
            GateOwner::renderer(0, "renderer"),
            gate.clone(),
            Arc::new(test_registry()),
            pool.clone(),
            &config,
        );
        Self {
            config,
            gate,
            pool,
            world: TestWorld::new(),
            driver,
        }
    }

    /// Attaches a scene and hands back its port
    pub fn add_scene(&mut self, id: u64) -> ScenePort {
        let shared = SceneShared::new(
            GateOwner::scene(id, format!("scene-{}", id)),
            self.gate.clone(),
            self.pool.clone(),
            &self.config,
        );
        self.driver.attach_scene(shared.clone());
        ScenePort::new(shared)
    }

    /// begin_frame + end_frame with nothing in between
    pub fn run_frame(&mut self) {
        self.driver
            .begin_frame(&mut self.world)
            .expect("renderer takes the gate");
        self.driver.end_frame(&self.world);
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new(BridgeConfig::default())
    }
}
