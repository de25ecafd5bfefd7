use std::{default::Default, time::Duration};

use scenesync_shared::ProtocolConfig;

use crate::budget::{IngestBudget, PerFrameBudget, Unlimited};

/// What `FrameGate::acquire` does while another owner holds the gate
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateMode {
    /// Wait in arrival order until the holder releases
    Block,
    /// Refuse immediately
    Reject,
}

/// Contains Config properties which will be used by a `FrameGate`
#[derive(Clone, Debug)]
pub struct GateConfig {
    pub mode: GateMode,
    /// Upper bound on a blocking wait. `None` waits for as long as it takes.
    pub max_wait: Option<Duration>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            mode: GateMode::Block,
            max_wait: None,
        }
    }
}

/// Contains Config properties which will be used by scene ports and the
/// frame driver
#[derive(Clone, Debug)]
pub struct BridgeConfig {
    /// Used to configure every scene's reconciliation store
    pub protocol: ProtocolConfig,
    /// Used to configure the shared frame gate
    pub gate: GateConfig,
    /// World operations applied per frame across all scenes, `None` for no
    /// cap. Operations over the cap are deferred to the next frame.
    pub ingest_ops_per_frame: Option<usize>,
}

impl BridgeConfig {
    pub fn ingest_budget(&self) -> Box<dyn IngestBudget + Send> {
        match self.ingest_ops_per_frame {
            Some(ops_per_frame) => Box::new(PerFrameBudget::new(ops_per_frame)),
            None => Box::new(Unlimited),
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            protocol: ProtocolConfig::default(),
            gate: GateConfig::default(),
            ingest_ops_per_frame: None,
        }
    }
}
