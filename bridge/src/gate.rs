use std::{collections::VecDeque, fmt, time::Instant};

use log::{debug, warn};
use parking_lot::{Condvar, Mutex};

use crate::config::{GateConfig, GateMode};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OwnerKind {
    Renderer,
    Scene,
}

/// Someone who brackets work with the gate
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GateOwner {
    pub id: u64,
    pub name: String,
    pub kind: OwnerKind,
}

impl GateOwner {
    pub fn renderer(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: OwnerKind::Renderer,
        }
    }

    pub fn scene(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: OwnerKind::Scene,
        }
    }
}

impl fmt::Display for GateOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.id)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AcquireOutcome {
    Acquired,
    /// The caller already held the gate; nothing changed
    AlreadyHeld,
    /// Held by someone else and the gate is in `GateMode::Reject`
    Rejected,
    Disposed,
    /// `GateConfig::max_wait` ran out
    TimedOut,
}

impl AcquireOutcome {
    /// The caller holds the gate after this call
    pub fn is_held(&self) -> bool {
        matches!(self, Self::Acquired | Self::AlreadyHeld)
    }
}

struct GateState {
    holder: Option<GateOwner>,
    waiters: VecDeque<u64>,
    next_ticket: u64,
    disposed: bool,
}

impl GateState {
    fn remove_waiter(&mut self, ticket: u64) {
        self.waiters.retain(|waiter| *waiter != ticket);
    }
}

/// Exclusive access token for the shared world.
///
/// The renderer holds it from the start of a frame to its end; scene threads
/// take it for the short window in which they touch their reconciliation
/// store. Waiters are served in arrival order.
pub struct FrameGate {
    config: GateConfig,
    state: Mutex<GateState>,
    released: Condvar,
}

impl FrameGate {
    pub fn new(config: GateConfig) -> Self {
        Self {
            config,
            state: Mutex::new(GateState {
                holder: None,
                waiters: VecDeque::new(),
                next_ticket: 0,
                disposed: false,
            }),
            released: Condvar::new(),
        }
    }

    pub fn acquire(&self, owner: &GateOwner) -> AcquireOutcome {
        let mut state = self.state.lock();

        if state.disposed {
            return AcquireOutcome::Disposed;
        }
        if let Some(holder) = &state.holder {
            if holder.id == owner.id {
                debug!("FrameGate: {} re-entered the gate it holds", owner);
                return AcquireOutcome::AlreadyHeld;
            }
        }
        if state.holder.is_none() && state.waiters.is_empty() {
            state.holder = Some(owner.clone());
            return AcquireOutcome::Acquired;
        }
        if self.config.mode == GateMode::Reject {
            return AcquireOutcome::Rejected;
        }

        let ticket = state.next_ticket;
        state.next_ticket += 1;
        state.waiters.push_back(ticket);
        let deadline = self.config.max_wait.map(|max_wait| Instant::now() + max_wait);

        loop {
            if state.disposed {
                state.remove_waiter(ticket);
                return AcquireOutcome::Disposed;
            }
            if state.holder.is_none() && state.waiters.front() == Some(&ticket) {
                state.waiters.pop_front();
                state.holder = Some(owner.clone());
                return AcquireOutcome::Acquired;
            }

            match deadline {
                Some(deadline) => {
                    if self.released.wait_until(&mut state, deadline).timed_out() {
                        if state.holder.is_none()
                            && !state.disposed
                            && state.waiters.front() == Some(&ticket)
                        {
                            continue;
                        }
                        state.remove_waiter(ticket);
                        // the next waiter may now be at the front
                        self.released.notify_all();
                        warn!("FrameGate: {} timed out waiting for the gate", owner);
                        return AcquireOutcome::TimedOut;
                    }
                }
                None => self.released.wait(&mut state),
            }
        }
    }

    /// Releases the gate if `owner` holds it. Releasing a gate one does not
    /// hold is logged and ignored.
    pub fn release_if_held(&self, owner: &GateOwner) -> bool {
        let mut state = self.state.lock();
        let Some(holder_id) = state.holder.as_ref().map(|holder| holder.id) else {
            debug!("FrameGate: {} released an unlocked gate", owner);
            return false;
        };
        if holder_id != owner.id {
            if let Some(holder) = &state.holder {
                warn!(
                    "FrameGate: {} tried to release the gate held by {}",
                    owner, holder
                );
            }
            return false;
        }
        state.holder = None;
        self.released.notify_all();
        true
    }

    /// Acquires and hands back a guard that releases on drop. A re-entrant
    /// acquire yields a guard that leaves the gate held.
    pub fn lock<'a>(&'a self, owner: &'a GateOwner) -> Result<GateGuard<'a>, AcquireOutcome> {
        match self.acquire(owner) {
            AcquireOutcome::Acquired => Ok(GateGuard {
                gate: self,
                owner,
                release: true,
            }),
            AcquireOutcome::AlreadyHeld => Ok(GateGuard {
                gate: self,
                owner,
                release: false,
            }),
            outcome => Err(outcome),
        }
    }

    /// Wakes every waiter with `Disposed` and refuses all further acquires
    pub fn dispose(&self) {
        let mut state = self.state.lock();
        if state.disposed {
            return;
        }
        state.disposed = true;
        state.holder = None;
        self.released.notify_all();
        debug!("FrameGate: disposed, {} waiters woken", state.waiters.len());
    }

    pub fn is_locked(&self) -> bool {
        self.state.lock().holder.is_some()
    }

    pub fn is_disposed(&self) -> bool {
        self.state.lock().disposed
    }

    pub fn holder(&self) -> Option<GateOwner> {
        self.state.lock().holder.clone()
    }

    pub fn waiting(&self) -> usize {
        self.state.lock().waiters.len()
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }
}

impl Default for FrameGate {
    fn default() -> Self {
        Self::new(GateConfig::default())
    }
}

/// Scoped hold on a [`FrameGate`]
pub struct GateGuard<'a> {
    gate: &'a FrameGate,
    owner: &'a GateOwner,
    release: bool,
}

impl Drop for GateGuard<'_> {
    fn drop(&mut self) {
        if self.release {
            self.gate.release_if_held(self.owner);
        }
    }
}
