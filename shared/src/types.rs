pub type ComponentId = u32;
pub type Timestamp = u32;
pub type NetworkId = u32;
pub type EntityNumber = u16;
pub type EntityVersion = u16;
