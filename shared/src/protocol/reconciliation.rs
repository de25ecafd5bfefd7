/// How the store's own bookkeeping changed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateChange {
    /// A newer timestamp replaced the slot
    UpdatedTimestamp,
    /// Same timestamp, the tie-break picked the incoming message
    UpdatedData,
    AppendedData,
    EntityDeleted,
    /// Idempotent re-application
    Unchanged,
}

/// What the world has to do in response to an accepted message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReconciliationEffect {
    NoChanges,
    ComponentAdded,
    ComponentModified,
    ComponentDeleted,
    EntityDeleted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectReason {
    OutdatedTimestamp,
    OutdatedData,
    EntityWasDeleted,
    UnsupportedMessageType,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AcceptedOutcome {
    pub change: StateChange,
    pub effect: ReconciliationEffect,
}

/// Result of offering one message to the store. Rejections are ordinary
/// outcomes, not errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reconciliation {
    Accepted(AcceptedOutcome),
    Rejected(RejectReason),
}

impl Reconciliation {
    pub(crate) fn accepted(change: StateChange, effect: ReconciliationEffect) -> Self {
        Self::Accepted(AcceptedOutcome { change, effect })
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    /// `NoChanges` for rejected messages
    pub fn effect(&self) -> ReconciliationEffect {
        match self {
            Self::Accepted(outcome) => outcome.effect,
            Self::Rejected(_) => ReconciliationEffect::NoChanges,
        }
    }

    pub fn reject_reason(&self) -> Option<RejectReason> {
        match self {
            Self::Accepted(_) => None,
            Self::Rejected(reason) => Some(*reason),
        }
    }
}
