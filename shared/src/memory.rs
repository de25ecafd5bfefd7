use parking_lot::Mutex;

/// Recycles payload buffers between the codec and the reconciliation store.
///
/// Constructed explicitly and handed to whoever needs it (usually behind an
/// `Arc`); there is no process-wide instance.
pub struct PayloadPool {
    buffers: Mutex<Vec<Vec<u8>>>,
    max_pooled: usize,
}

impl PayloadPool {
    pub const DEFAULT_MAX_POOLED: usize = 1024;

    pub fn new() -> Self {
        Self::with_max_pooled(Self::DEFAULT_MAX_POOLED)
    }

    pub fn with_max_pooled(max_pooled: usize) -> Self {
        Self {
            buffers: Mutex::new(Vec::new()),
            max_pooled,
        }
    }

    /// An empty buffer with at least `capacity` bytes reserved
    pub fn rent_empty(&self, capacity: usize) -> Vec<u8> {
        let mut buffer = self.buffers.lock().pop().unwrap_or_default();
        buffer.clear();
        buffer.reserve(capacity);
        buffer
    }

    /// Copies `data` into a recycled buffer
    pub fn rent(&self, data: &[u8]) -> Vec<u8> {
        let mut buffer = self.rent_empty(data.len());
        buffer.extend_from_slice(data);
        buffer
    }

    pub fn release(&self, buffer: Vec<u8>) {
        if buffer.capacity() == 0 {
            return;
        }
        let mut buffers = self.buffers.lock();
        if buffers.len() < self.max_pooled {
            buffers.push(buffer);
        }
    }

    pub fn pooled(&self) -> usize {
        self.buffers.lock().len()
    }
}

impl Default for PayloadPool {
    fn default() -> Self {
        Self::new()
    }
}
