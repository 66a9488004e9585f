use crate::types::{SchemaCode, SectionId, TemplateId, VersionId, WorkspaceId};

/// Validation failures scoped to a single field descriptor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("field name '{0}' is not a valid identifier")]
    InvalidName(String),
    #[error("reference field '{0}' must name an existing schema")]
    InvalidReference(String),
    #[error("select field '{0}' requires a non-empty list of unique choices")]
    InvalidChoices(String),
    #[error("field '{0}' already exists on this schema")]
    DuplicateFieldName(String),
}

/// Broad failure categories, used to pick the HTTP status at the API
/// boundary. Everything except `Internal` is a typed client failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    Immutable,
    ReferentialIntegrity,
    NotFound,
    State,
    Internal,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    // Validation
    #[error("schema code '{0}' is not a valid identifier")]
    InvalidCode(String),
    #[error("invalid field '{field}': {source}")]
    InvalidField { field: String, source: FieldError },

    // Conflict
    #[error("schema code '{0}' already exists")]
    DuplicateCode(SchemaCode),

    // Immutable violations
    #[error("schema '{0}' is a system schema and its structure cannot be changed")]
    SystemSchemaImmutable(SchemaCode),
    #[error("field '{field}' on schema '{schema}' is a system field and cannot be changed")]
    SystemFieldImmutable { schema: SchemaCode, field: String },
    #[error("section {0} is a system section and cannot be deleted")]
    SystemNodeLocked(SectionId),

    // Referential integrity
    #[error("unknown schema '{0}'")]
    UnknownSchema(SchemaCode),
    #[error("unknown section {0}")]
    UnknownSection(SectionId),
    #[error("parent section {0} not found")]
    ParentNotFound(SectionId),
    #[error("moving section {0} under the requested parent would create a cycle")]
    CycleDetected(SectionId),
    #[error("schema '{0}' is bound by a template or section and cannot be deleted")]
    SchemaInUse(SchemaCode),
    #[error("template {0} has workspaces bound to its versions and cannot be deleted")]
    TemplateInUse(TemplateId),
    #[error("section {0} has child sections; re-parent or delete them first")]
    HasChildren(SectionId),

    // Not found
    #[error("schema '{0}' not found")]
    SchemaNotFound(SchemaCode),
    #[error("field '{field}' not found on schema '{schema}'")]
    FieldNotFound { schema: SchemaCode, field: String },
    #[error("section {0} not found")]
    SectionNotFound(SectionId),
    #[error("template {0} not found")]
    TemplateNotFound(TemplateId),
    #[error("template version {0} not found")]
    VersionNotFound(VersionId),
    #[error("workspace {0} has no bound template version")]
    WorkspaceNotFound(WorkspaceId),

    // State
    #[error("version {0} is not rollbackable")]
    NotRollbackable(VersionId),

    // Infrastructure (the only unrecoverable class)
    #[error("snapshot serialization failed: {0}")]
    Snapshot(#[from] serde_json::Error),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        use EngineError::*;
        match self {
            InvalidCode(_) | InvalidField { .. } => ErrorKind::Validation,
            DuplicateCode(_) => ErrorKind::Conflict,
            SystemSchemaImmutable(_) | SystemFieldImmutable { .. } | SystemNodeLocked(_) => {
                ErrorKind::Immutable
            }
            UnknownSchema(_) | UnknownSection(_) | ParentNotFound(_) | CycleDetected(_)
            | SchemaInUse(_) | TemplateInUse(_) | HasChildren(_) => {
                ErrorKind::ReferentialIntegrity
            }
            SchemaNotFound(_) | FieldNotFound { .. } | SectionNotFound(_)
            | TemplateNotFound(_) | VersionNotFound(_) | WorkspaceNotFound(_) => {
                ErrorKind::NotFound
            }
            NotRollbackable(_) => ErrorKind::State,
            Snapshot(_) => ErrorKind::Internal,
        }
    }

    /// Stable machine-readable code surfaced to API clients.
    pub fn code(&self) -> &'static str {
        use EngineError::*;
        match self {
            InvalidCode(_) => "INVALID_CODE",
            InvalidField { .. } => "INVALID_FIELD",
            DuplicateCode(_) => "DUPLICATE_CODE",
            SystemSchemaImmutable(_) => "SYSTEM_SCHEMA_IMMUTABLE",
            SystemFieldImmutable { .. } => "SYSTEM_FIELD_IMMUTABLE",
            SystemNodeLocked(_) => "SYSTEM_SECTION_LOCKED",
            UnknownSchema(_) => "UNKNOWN_SCHEMA",
            UnknownSection(_) => "UNKNOWN_SECTION",
            ParentNotFound(_) => "PARENT_NOT_FOUND",
            CycleDetected(_) => "CYCLE_DETECTED",
            SchemaInUse(_) => "SCHEMA_IN_USE",
            TemplateInUse(_) => "TEMPLATE_IN_USE",
            HasChildren(_) => "HAS_CHILDREN",
            SchemaNotFound(_) => "SCHEMA_NOT_FOUND",
            FieldNotFound { .. } => "FIELD_NOT_FOUND",
            SectionNotFound(_) => "SECTION_NOT_FOUND",
            TemplateNotFound(_) => "TEMPLATE_NOT_FOUND",
            VersionNotFound(_) => "VERSION_NOT_FOUND",
            WorkspaceNotFound(_) => "WORKSPACE_NOT_BOUND",
            NotRollbackable(_) => "NOT_ROLLBACKABLE",
            Snapshot(_) => "INTERNAL",
        }
    }
}
