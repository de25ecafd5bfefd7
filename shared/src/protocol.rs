mod config;
mod crdt_protocol;
mod reconciliation;

pub use config::ProtocolConfig;
pub use crdt_protocol::{AppendEntry, ComponentSlot, CrdtProtocol, ProtocolStats};
pub use reconciliation::{
    AcceptedOutcome, Reconciliation, ReconciliationEffect, RejectReason, StateChange,
};
