use std::{borrow::Cow, collections::VecDeque, mem, sync::Arc};

use log::{debug, info, warn};
use parking_lot::{Mutex, MutexGuard};

use scenesync_shared::{
    codec::{decode_batch, encode_batch},
    filter_batch_to_vec, BatchKind, CrdtMessage, CrdtProtocol, PayloadPool, BATCH_PREFIX_LENGTH,
};

use crate::{
    command_buffer::WorldSyncCommandBuffer,
    config::BridgeConfig,
    error::BridgeError,
    gate::{AcquireOutcome, FrameGate, GateGuard, GateOwner, OwnerKind},
};

/// Everything one scene shares with the renderer. Only touched while the
/// frame gate is held.
pub struct SceneState {
    pub(crate) protocol: CrdtProtocol,
    pub(crate) pending: VecDeque<WorldSyncCommandBuffer>,
    pub(crate) outgoing: Vec<CrdtMessage<'static>>,
    pub(crate) torn_down: bool,
}

impl SceneState {
    pub fn protocol(&self) -> &CrdtProtocol {
        &self.protocol
    }

    pub fn pending_buffers(&self) -> usize {
        self.pending.len()
    }

    pub fn outgoing_messages(&self) -> usize {
        self.outgoing.len()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }
}

/// State shared between a scene thread and the renderer through an `Arc`
pub struct SceneShared {
    owner: GateOwner,
    gate: Arc<FrameGate>,
    pool: Arc<PayloadPool>,
    state: Mutex<SceneState>,
}

impl SceneShared {
    pub fn new(
        owner: GateOwner,
        gate: Arc<FrameGate>,
        pool: Arc<PayloadPool>,
        config: &BridgeConfig,
    ) -> Arc<Self> {
        if owner.kind != OwnerKind::Scene {
            warn!("SceneShared: {} is not a scene owner", owner);
        }
        let protocol = CrdtProtocol::new(config.protocol.clone(), pool.clone());
        Arc::new(Self {
            owner,
            gate,
            pool,
            state: Mutex::new(SceneState {
                protocol,
                pending: VecDeque::new(),
                outgoing: Vec::new(),
                torn_down: false,
            }),
        })
    }

    pub fn owner(&self) -> &GateOwner {
        &self.owner
    }

    pub fn gate(&self) -> &Arc<FrameGate> {
        &self.gate
    }

    pub fn pool(&self) -> &Arc<PayloadPool> {
        &self.pool
    }

    /// Callers must hold the gate
    pub fn state(&self) -> MutexGuard<'_, SceneState> {
        self.state.lock()
    }
}

/// The scene thread's end of the bridge
pub struct ScenePort {
    shared: Arc<SceneShared>,
}

impl ScenePort {
    pub fn new(shared: Arc<SceneShared>) -> Self {
        Self { shared }
    }

    pub fn shared(&self) -> &Arc<SceneShared> {
        &self.shared
    }

    /// Delivers one batch produced by the scene and returns what the renderer
    /// has for it.
    ///
    /// The batch is filtered, decoded and reconciled inside one gate window;
    /// accepted changes are queued for the next frame. A `ReqCrdtState` batch
    /// is answered with the full state, anything else with the renderer's
    /// changes since the previous call. A malformed message ends the batch:
    /// the messages before it are still applied.
    pub fn send_to_renderer(&self, batch: &[u8]) -> Result<Vec<u8>, BridgeError> {
        let Some(&kind_byte) = batch.first() else {
            return Err(BridgeError::EmptyBatch);
        };
        let kind = BatchKind::try_from(kind_byte)?;

        // only message-carrying batches are filtered
        let filtered = if kind.carries_messages() {
            filter_batch_to_vec(batch)
        } else {
            Vec::new()
        };
        let mut messages = Vec::new();
        if filtered.len() > BATCH_PREFIX_LENGTH {
            if let Err(error) = decode_batch(&filtered[BATCH_PREFIX_LENGTH..], &mut messages) {
                warn!(
                    "ScenePort: {} sent a malformed batch, applying {} messages: {}",
                    self.shared.owner,
                    messages.len(),
                    error
                );
            }
        }

        let _guard = self.lock_gate()?;
        let mut state = self.shared.state();
        self.check_alive(&state)?;

        let mut buffer = WorldSyncCommandBuffer::new(self.shared.pool.clone());
        for message in &messages {
            let reconciliation = state.protocol.apply(message);
            buffer.record(message, reconciliation.effect());
        }
        if !buffer.is_empty() {
            state.pending.push_back(buffer);
        }

        let response = match kind {
            BatchKind::ReqCrdtState => {
                // the full state already contains every queued renderer write
                self.release_messages(mem::take(&mut state.outgoing));
                self.encode_state(&state)
            }
            _ => {
                let outgoing = mem::take(&mut state.outgoing);
                let response = encode_batch(BatchKind::Crdt, &outgoing, &self.shared.pool);
                self.release_messages(outgoing);
                response
            }
        };
        Ok(response)
    }

    /// The whole reconciliation store as a `ResCrdtState` batch
    pub fn get_state(&self) -> Result<Vec<u8>, BridgeError> {
        let _guard = self.lock_gate()?;
        let state = self.shared.state();
        self.check_alive(&state)?;
        Ok(self.encode_state(&state))
    }

    /// Discards queued work, deletes every entity the scene still holds and
    /// tells the renderer to destroy the scene's world objects on its next
    /// frame
    pub fn teardown(&self) -> Result<(), BridgeError> {
        let _guard = self.lock_gate()?;
        let mut state = self.shared.state();
        if state.torn_down {
            return Ok(());
        }

        state.pending.clear();
        self.release_messages(mem::take(&mut state.outgoing));
        let entities = state.protocol.entities();
        for entity in &entities {
            state.protocol.apply(&CrdtMessage::delete_entity(*entity));
        }
        state.torn_down = true;

        info!(
            "ScenePort: {} torn down, {} entities deleted",
            self.shared.owner,
            entities.len()
        );
        Ok(())
    }

    fn lock_gate(&self) -> Result<GateGuard<'_>, BridgeError> {
        self.shared
            .gate
            .lock(&self.shared.owner)
            .map_err(|outcome| match outcome {
                AcquireOutcome::Disposed => BridgeError::GateDisposed,
                outcome => BridgeError::GateUnavailable {
                    owner: self.shared.owner.to_string(),
                    outcome,
                },
            })
    }

    fn check_alive(&self, state: &SceneState) -> Result<(), BridgeError> {
        if state.torn_down {
            return Err(BridgeError::SceneTornDown {
                scene: self.shared.owner.name.clone(),
            });
        }
        Ok(())
    }

    fn encode_state(&self, state: &SceneState) -> Vec<u8> {
        let messages = state.protocol.create_messages_from_current_state();
        debug!(
            "ScenePort: encoding {} state messages for {}",
            messages.len(),
            self.shared.owner
        );
        encode_batch(BatchKind::ResCrdtState, &messages, &self.shared.pool)
    }

    fn release_messages(&self, messages: Vec<CrdtMessage<'static>>) {
        for message in messages {
            if let Cow::Owned(data) = message.data {
                self.shared.pool.release(data);
            }
        }
    }
}
