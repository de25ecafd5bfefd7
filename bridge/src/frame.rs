use std::{borrow::Cow, sync::Arc};

use log::{debug, warn};

use scenesync_shared::PayloadPool;

use crate::{
    budget::IngestBudget,
    config::BridgeConfig,
    gate::{AcquireOutcome, FrameGate, GateOwner, OwnerKind},
    registry::ComponentRegistry,
    scene::SceneShared,
    world::SceneWorld,
    world_bridge::{IngestReport, WorldBridge},
};

struct SceneLink<W: SceneWorld> {
    shared: Arc<SceneShared>,
    bridge: WorldBridge<W>,
}

/// Totals for one `begin_frame`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub ingested: IngestReport,
    pub torn_down: usize,
}

/// Renderer side of the frame protocol.
///
/// `begin_frame` takes the gate and pushes every scene's queued changes into
/// the world; `end_frame` collects the renderer's own changes, reconciles
/// them into each scene's store and releases the gate. Between the two the
/// renderer may read and write the world freely.
pub struct FrameDriver<W: SceneWorld> {
    owner: GateOwner,
    gate: Arc<FrameGate>,
    registry: Arc<ComponentRegistry<W>>,
    pool: Arc<PayloadPool>,
    budget: Box<dyn IngestBudget + Send>,
    scenes: Vec<SceneLink<W>>,
    // first scene served by the next `begin_frame`
    next_scene: usize,
    in_frame: bool,
}

impl<W: SceneWorld> FrameDriver<W> {
    pub fn new(
        owner: GateOwner,
        gate: Arc<FrameGate>,
        registry: Arc<ComponentRegistry<W>>,
        pool: Arc<PayloadPool>,
        config: &BridgeConfig,
    ) -> Self {
        Self {
            owner,
            gate,
            registry,
            pool,
            budget: config.ingest_budget(),
            scenes: Vec::new(),
            next_scene: 0,
            in_frame: false,
        }
    }

    /// Replaces the budget built from `BridgeConfig::ingest_ops_per_frame`
    pub fn set_budget(&mut self, budget: Box<dyn IngestBudget + Send>) {
        self.budget = budget;
    }

    pub fn attach_scene(&mut self, shared: Arc<SceneShared>) {
        debug!("FrameDriver: attached {}", shared.owner());
        let bridge = WorldBridge::new(self.registry.clone(), self.pool.clone());
        self.scenes.push(SceneLink { shared, bridge });
    }

    /// The bridge of the scene owned by `scene_id`, for recording renderer
    /// changes or registering engine entities
    pub fn bridge_mut(&mut self, scene_id: u64) -> Option<&mut WorldBridge<W>> {
        self.scenes
            .iter_mut()
            .find(|link| link.shared.owner().id == scene_id)
            .map(|link| &mut link.bridge)
    }

    pub fn bridge(&self, scene_id: u64) -> Option<&WorldBridge<W>> {
        self.scenes
            .iter()
            .find(|link| link.shared.owner().id == scene_id)
            .map(|link| &link.bridge)
    }

    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_in_frame(&self) -> bool {
        self.in_frame
    }

    pub fn begin_frame(&mut self, world: &mut W) -> Result<FrameReport, AcquireOutcome> {
        if self.owner.kind != OwnerKind::Renderer {
            warn!("FrameDriver: {} is not the renderer, frame ignored", self.owner);
            return Err(AcquireOutcome::Rejected);
        }
        if self.in_frame {
            warn!("FrameDriver: begin_frame called twice without end_frame");
            return Ok(FrameReport::default());
        }

        let outcome = self.gate.acquire(&self.owner);
        if !outcome.is_held() {
            warn!("FrameDriver: could not take the gate: {:?}", outcome);
            return Err(outcome);
        }
        self.in_frame = true;
        self.budget.begin_frame();

        // the budget is shared, so the scene served first rotates every frame
        let count = self.scenes.len();
        let start = if count == 0 { 0 } else { self.next_scene % count };

        let mut report = FrameReport::default();
        for index in (start..count).chain(0..start) {
            let link = &mut self.scenes[index];
            let torn_down = {
                let mut state = link.shared.state();
                for buffer in state.pending.drain(..) {
                    link.bridge.enqueue(buffer.into_ops());
                }
                state.torn_down
            };

            if torn_down {
                link.bridge.teardown(world);
                report.torn_down += 1;
                continue;
            }

            let ingested = link.bridge.ingest(world, self.budget.as_mut());
            report.ingested.applied += ingested.applied;
            report.ingested.skipped += ingested.skipped;
            report.ingested.deferred += ingested.deferred;
        }
        self.scenes.retain(|link| !link.shared.state().torn_down);
        self.next_scene = if self.scenes.is_empty() {
            0
        } else {
            (start + 1) % self.scenes.len()
        };

        Ok(report)
    }

    /// Returns the number of renderer messages accepted into scene stores
    pub fn end_frame(&mut self, world: &W) -> usize {
        if !self.in_frame {
            warn!("FrameDriver: end_frame called without begin_frame");
            return 0;
        }

        let mut accepted = 0;
        for link in &mut self.scenes {
            let messages = link.bridge.drain_outgoing(world);
            if messages.is_empty() {
                continue;
            }

            let mut state = link.shared.state();
            for message in messages {
                if state.protocol.apply(&message).is_accepted() {
                    state.outgoing.push(message);
                    accepted += 1;
                } else {
                    debug!(
                        "FrameDriver: {:?} lost to a newer scene write",
                        message.entity
                    );
                    if let Cow::Owned(data) = message.data {
                        self.pool.release(data);
                    }
                }
            }
        }

        self.gate.release_if_held(&self.owner);
        self.in_frame = false;
        accepted
    }
}
