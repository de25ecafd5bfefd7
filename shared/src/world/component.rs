use crate::types::ComponentId;

/// Components carrying this id are never relayed beyond the local process
pub const NO_SYNC_COMPONENT_ID: ComponentId = 2092194694;

pub fn is_no_sync(component_id: ComponentId) -> bool {
    component_id == NO_SYNC_COMPONENT_ID
}
