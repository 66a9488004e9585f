//! Shared identifier types and the request-scoped operator context.

use uuid::Uuid;

/// Stable, operator-chosen identifier for a table schema ("clients", "orders").
pub type SchemaCode = String;

pub type SectionId = Uuid;
pub type TemplateId = Uuid;
pub type VersionId = Uuid;
pub type WorkspaceId = Uuid;
pub type AdminId = Uuid;

/// Request-scoped operator identity, threaded explicitly into every
/// mutating engine operation. Never stored as ambient global state.
#[derive(Debug, Clone, Copy)]
pub struct AdminContext {
    pub admin_id: AdminId,
    pub request_id: Uuid,
}

impl AdminContext {
    pub fn new(admin_id: AdminId) -> Self {
        Self {
            admin_id,
            request_id: Uuid::new_v4(),
        }
    }
}
