//! Schema Registry operations: the owning store for table schemas and
//! their field descriptors.

use std::collections::BTreeSet;

use crate::engine::error::{EngineError, FieldError};
use crate::engine::field::{is_identifier, FieldDescriptor, FieldKind};
use crate::engine::schema::{FieldChange, NewSchema, SchemaPatch, TableSchema};
use crate::engine::{audit, Engine, EngineState};
use crate::types::{AdminContext, SchemaCode};

impl Engine {
    pub async fn list_schemas(&self) -> Vec<TableSchema> {
        let state = self.state.read().await;
        state.schemas.values().cloned().collect()
    }

    pub async fn get_schema(&self, code: &str) -> Result<TableSchema, EngineError> {
        let state = self.state.read().await;
        state
            .schemas
            .get(code)
            .cloned()
            .ok_or_else(|| EngineError::SchemaNotFound(code.to_string()))
    }

    pub async fn get_fields(&self, code: &str) -> Result<Vec<FieldDescriptor>, EngineError> {
        Ok(self.get_schema(code).await?.fields)
    }

    pub async fn create_schema(
        &self,
        ctx: &AdminContext,
        input: NewSchema,
    ) -> Result<TableSchema, EngineError> {
        if !is_identifier(&input.code) {
            return Err(EngineError::InvalidCode(input.code));
        }

        let mut state = self.state.write().await;
        if state.schemas.contains_key(&input.code) {
            return Err(EngineError::DuplicateCode(input.code));
        }

        // The new code is reserved before field validation so that
        // self-referential fields validate on first creation.
        let mut known: BTreeSet<SchemaCode> = state.schemas.keys().cloned().collect();
        known.insert(input.code.clone());

        let mut seen = BTreeSet::new();
        for field in &input.fields {
            if !seen.insert(field.name.clone()) {
                return Err(invalid_field(
                    &field.name,
                    FieldError::DuplicateFieldName(field.name.clone()),
                ));
            }
            field
                .validate(&known)
                .map_err(|e| invalid_field(&field.name, e))?;
        }

        let schema = TableSchema {
            code: input.code.clone(),
            name: input.name,
            category: input.category,
            system: input.system,
            fields: input.fields,
        };
        state.schemas.insert(input.code.clone(), schema.clone());

        audit(ctx, "schema.create", &input.code);
        Ok(schema)
    }

    pub async fn update_schema(
        &self,
        ctx: &AdminContext,
        code: &str,
        patch: SchemaPatch,
    ) -> Result<TableSchema, EngineError> {
        let mut state = self.state.write().await;
        let schema = state
            .schemas
            .get_mut(code)
            .ok_or_else(|| EngineError::SchemaNotFound(code.to_string()))?;

        if schema.system && patch.category.is_some() {
            return Err(EngineError::SystemSchemaImmutable(code.to_string()));
        }

        if let Some(name) = patch.name {
            schema.name = name;
        }
        if let Some(category) = patch.category {
            schema.category = category;
        }

        let updated = schema.clone();
        audit(ctx, "schema.update", code);
        Ok(updated)
    }

    /// Apply a field change-set as one transaction: every change is
    /// validated against a working copy first, and the schema is only
    /// replaced when the whole batch passes.
    pub async fn change_fields(
        &self,
        ctx: &AdminContext,
        code: &str,
        changes: Vec<FieldChange>,
    ) -> Result<TableSchema, EngineError> {
        let mut state = self.state.write().await;
        let known: BTreeSet<SchemaCode> = state.schemas.keys().cloned().collect();

        let schema = state
            .schemas
            .get_mut(code)
            .ok_or_else(|| EngineError::SchemaNotFound(code.to_string()))?;
        if schema.system {
            return Err(EngineError::SystemSchemaImmutable(code.to_string()));
        }

        let mut working = schema.fields.clone();
        for change in changes {
            apply_field_change(&mut working, code, &known, change)?;
        }

        schema.fields = working;
        let updated = schema.clone();
        audit(ctx, "schema.fields", code);
        Ok(updated)
    }

    /// Deletion is a hard precondition check, never a cascade. The
    /// in-use scan and the removal run under one write guard.
    pub async fn delete_schema(&self, ctx: &AdminContext, code: &str) -> Result<(), EngineError> {
        let mut state = self.state.write().await;
        let schema = state
            .schemas
            .get(code)
            .ok_or_else(|| EngineError::SchemaNotFound(code.to_string()))?;
        if schema.system {
            return Err(EngineError::SystemSchemaImmutable(code.to_string()));
        }

        if schema_in_use(&state, code) {
            return Err(EngineError::SchemaInUse(code.to_string()));
        }

        state.schemas.remove(code);
        audit(ctx, "schema.delete", code);
        Ok(())
    }
}

fn invalid_field(name: &str, source: FieldError) -> EngineError {
    EngineError::InvalidField {
        field: name.to_string(),
        source,
    }
}

fn schema_in_use(state: &EngineState, code: &str) -> bool {
    let bound_by_section = state
        .sections
        .values()
        .any(|node| node.bound_schema.as_deref() == Some(code));
    let bound_by_template = state
        .templates
        .values()
        .any(|template| template.schema_bindings.contains(code));
    let bound_by_version = state
        .versions
        .values()
        .flatten()
        .any(|version| version.snapshot.schema_bindings.contains(code));
    bound_by_section || bound_by_template || bound_by_version
}

fn apply_field_change(
    working: &mut Vec<FieldDescriptor>,
    code: &str,
    known: &BTreeSet<SchemaCode>,
    change: FieldChange,
) -> Result<(), EngineError> {
    match change {
        FieldChange::Added { field } => {
            if working.iter().any(|f| f.name == field.name) {
                return Err(invalid_field(
                    &field.name,
                    FieldError::DuplicateFieldName(field.name.clone()),
                ));
            }
            field
                .validate(known)
                .map_err(|e| invalid_field(&field.name, e))?;
            working.push(field);
        }
        FieldChange::Removed { name } => {
            let index = working
                .iter()
                .position(|f| f.name == name)
                .ok_or_else(|| EngineError::FieldNotFound {
                    schema: code.to_string(),
                    field: name.clone(),
                })?;
            if working[index].system {
                return Err(EngineError::SystemFieldImmutable {
                    schema: code.to_string(),
                    field: name,
                });
            }
            working.remove(index);
        }
        FieldChange::Relabeled {
            name,
            label,
            required,
            choices,
        } => {
            let field = working
                .iter_mut()
                .find(|f| f.name == name)
                .ok_or_else(|| EngineError::FieldNotFound {
                    schema: code.to_string(),
                    field: name.clone(),
                })?;
            if field.system {
                return Err(EngineError::SystemFieldImmutable {
                    schema: code.to_string(),
                    field: name,
                });
            }
            if choices.is_some() && field.kind != FieldKind::Select {
                return Err(invalid_field(&name, FieldError::InvalidChoices(name.clone())));
            }

            if let Some(label) = label {
                field.label = label;
            }
            if let Some(required) = required {
                field.required = required;
            }
            if let Some(choices) = choices {
                field.choices = Some(choices);
            }
            field.validate(known).map_err(|e| invalid_field(&name, e))?;
        }
    }
    Ok(())
}
