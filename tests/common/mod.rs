#![allow(dead_code)]

use atrium_api::engine::{
    Engine, FieldDescriptor, FieldKind, NewSchema, NewSection, NewTemplate, SchemaCategory,
    SectionScope, TemplateKind,
};
use atrium_api::engine::AccessType;
use atrium_api::types::AdminContext;
use uuid::Uuid;

pub fn ctx() -> AdminContext {
    AdminContext::new(Uuid::new_v4())
}

pub fn engine() -> Engine {
    Engine::new()
}

pub fn text_field(name: &str, required: bool) -> FieldDescriptor {
    FieldDescriptor {
        name: name.to_string(),
        label: name.to_string(),
        kind: FieldKind::Text,
        required,
        system: false,
        reference_target: None,
        choices: None,
    }
}

pub fn reference_field(name: &str, target: &str) -> FieldDescriptor {
    FieldDescriptor {
        name: name.to_string(),
        label: name.to_string(),
        kind: FieldKind::Reference,
        required: false,
        system: false,
        reference_target: Some(target.to_string()),
        choices: None,
    }
}

pub fn directory_schema(code: &str, fields: Vec<FieldDescriptor>) -> NewSchema {
    NewSchema {
        code: code.to_string(),
        name: code.to_string(),
        category: SchemaCategory::Directory,
        system: false,
        fields,
    }
}

pub fn system_schema(code: &str, fields: Vec<FieldDescriptor>) -> NewSchema {
    NewSchema {
        code: code.to_string(),
        name: code.to_string(),
        category: SchemaCategory::Directory,
        system: true,
        fields,
    }
}

pub fn open_section(name: &str) -> NewSection {
    NewSection {
        name: name.to_string(),
        parent_id: None,
        bound_schema: None,
        access_type: AccessType::Open,
        scope: SectionScope::Global,
        system: false,
    }
}

pub fn client_template(name: &str, schemas: &[&str]) -> NewTemplate {
    NewTemplate {
        name: name.to_string(),
        kind: TemplateKind::Client,
        active: true,
        is_default: false,
        schema_bindings: schemas.iter().map(|s| s.to_string()).collect(),
        section_bindings: Default::default(),
        config: serde_json::json!({}),
    }
}
