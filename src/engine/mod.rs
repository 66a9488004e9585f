//! The schema/template engine: registry, section tree, template
//! composer, version ledger and workspace binder over one shared,
//! transactionally-locked state.
//!
//! Mutations hold the write half of a single `RwLock` for their entire
//! check-then-apply sequence, which serializes commits and rollbacks
//! (single logical writer) and keeps "in use" checks and the deletes
//! they guard inside one critical section. Reads run concurrently and
//! always observe a fully committed state.

pub mod composer;
pub mod diff;
pub mod error;
pub mod field;
pub mod ledger;
pub mod registry;
pub mod schema;
pub mod section;
pub mod semver;
pub mod template;
pub mod tree;
pub mod workspace;

pub use diff::{apply_patch, diff, ConfigChange, Patch, TemplateState};
pub use error::{EngineError, ErrorKind, FieldError};
pub use field::{FieldDescriptor, FieldKind};
pub use ledger::{Page, TemplateVersion};
pub use schema::{FieldChange, NewSchema, SchemaCategory, SchemaPatch, TableSchema};
pub use section::{AccessType, NewSection, SectionNode, SectionPatch, SectionScope};
pub use semver::SemVer;
pub use template::{NewTemplate, Template, TemplateKind, TemplatePatch};

use std::collections::BTreeMap;

use tokio::sync::RwLock;

use crate::types::{AdminContext, SchemaCode, SectionId, TemplateId, VersionId, WorkspaceId};

/// All persisted collections. The backing store is consumed as a plain
/// transactional map store; swapping in a durable one only needs these
/// five collections and the same locking discipline.
#[derive(Debug, Default)]
pub(crate) struct EngineState {
    pub schemas: BTreeMap<SchemaCode, TableSchema>,
    pub sections: BTreeMap<SectionId, SectionNode>,
    pub templates: BTreeMap<TemplateId, Template>,
    /// Append-only version history per template, oldest first.
    pub versions: BTreeMap<TemplateId, Vec<TemplateVersion>>,
    /// Workspace -> currently applied template version.
    pub bindings: BTreeMap<WorkspaceId, VersionId>,
}

pub struct Engine {
    pub(crate) state: RwLock<EngineState>,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(EngineState::default()),
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// Audit trail entry for a mutating operation, attributed to the
/// request-scoped operator identity.
pub(crate) fn audit(ctx: &AdminContext, op: &'static str, subject: &str) {
    if crate::config::config().security.enable_audit_logging {
        tracing::info!(
            target: "audit",
            admin = %ctx.admin_id,
            request = %ctx.request_id,
            op,
            subject,
        );
    }
}
