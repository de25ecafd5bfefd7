/// Caps how many world operations `WorldBridge::ingest` performs in a frame.
///
/// Operations that do not fit are left queued for the next frame.
pub trait IngestBudget {
    /// Called once at the start of each frame
    fn begin_frame(&mut self) {}

    /// Claims room for one operation, `false` once the frame is spent
    fn try_consume(&mut self) -> bool;
}

/// Never defers anything
#[derive(Clone, Copy, Debug, Default)]
pub struct Unlimited;

impl IngestBudget for Unlimited {
    fn try_consume(&mut self) -> bool {
        true
    }
}

/// A fixed number of operations per frame
#[derive(Clone, Debug)]
pub struct PerFrameBudget {
    per_frame: usize,
    remaining: usize,
}

impl PerFrameBudget {
    pub fn new(per_frame: usize) -> Self {
        Self {
            per_frame,
            remaining: per_frame,
        }
    }

    pub fn remaining(&self) -> usize {
        self.remaining
    }
}

impl IngestBudget for PerFrameBudget {
    fn begin_frame(&mut self) {
        self.remaining = self.per_frame;
    }

    fn try_consume(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}
