use std::default::Default;

/// Contains Config properties which will be used by a [`CrdtProtocol`](super::CrdtProtocol)
#[derive(Clone, Debug)]
pub struct ProtocolConfig {
    /// How many entries an APPEND_COMPONENT log keeps per (entity, component)
    /// before the oldest are evicted. Values below 1 are treated as 1.
    pub max_append_components: usize,
}

impl ProtocolConfig {
    pub const DEFAULT_MAX_APPEND_COMPONENTS: usize = 100;
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            max_append_components: Self::DEFAULT_MAX_APPEND_COMPONENTS,
        }
    }
}
