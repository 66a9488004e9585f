//! Template Composer operations: assembling schemas, sections and
//! config into typed templates. Versioning lives in the ledger; the
//! composer only manages working copies.

use std::collections::BTreeSet;

use uuid::Uuid;

use crate::engine::error::EngineError;
use crate::engine::semver::SemVer;
use crate::engine::template::{NewTemplate, Template, TemplateKind, TemplatePatch};
use crate::engine::{audit, Engine, EngineState};
use crate::types::{AdminContext, SchemaCode, SectionId, TemplateId};

impl Engine {
    pub async fn list_templates(&self) -> Vec<Template> {
        let state = self.state.read().await;
        state.templates.values().cloned().collect()
    }

    pub async fn get_template(&self, id: TemplateId) -> Result<Template, EngineError> {
        let state = self.state.read().await;
        state
            .templates
            .get(&id)
            .cloned()
            .ok_or(EngineError::TemplateNotFound(id))
    }

    pub async fn create_template(
        &self,
        ctx: &AdminContext,
        input: NewTemplate,
    ) -> Result<Template, EngineError> {
        let mut state = self.state.write().await;

        validate_bindings(&state, &input.schema_bindings, &input.section_bindings)?;
        if input.is_default {
            clear_default(&mut state, input.kind);
        }

        let template = Template {
            id: Uuid::new_v4(),
            name: input.name,
            kind: input.kind,
            current_version: SemVer::INITIAL,
            active: input.active,
            is_default: input.is_default,
            schema_bindings: input.schema_bindings,
            section_bindings: input.section_bindings,
            config: input.config,
        };
        state.templates.insert(template.id, template.clone());

        audit(ctx, "template.create", &template.id.to_string());
        Ok(template)
    }

    pub async fn update_template(
        &self,
        ctx: &AdminContext,
        id: TemplateId,
        patch: TemplatePatch,
    ) -> Result<Template, EngineError> {
        let mut state = self.state.write().await;

        let kind = state
            .templates
            .get(&id)
            .ok_or(EngineError::TemplateNotFound(id))?
            .kind;
        let no_schemas = BTreeSet::new();
        let no_sections = BTreeSet::new();
        validate_bindings(
            &state,
            patch.schema_bindings.as_ref().unwrap_or(&no_schemas),
            patch.section_bindings.as_ref().unwrap_or(&no_sections),
        )?;

        // The previous default hands off atomically under the same
        // write guard; two defaults of one kind can never coexist.
        if patch.is_default == Some(true) {
            clear_default(&mut state, kind);
        }

        let template = state
            .templates
            .get_mut(&id)
            .ok_or(EngineError::TemplateNotFound(id))?;
        if let Some(name) = patch.name {
            template.name = name;
        }
        if let Some(active) = patch.active {
            template.active = active;
        }
        if let Some(is_default) = patch.is_default {
            template.is_default = is_default;
        }
        if let Some(schemas) = patch.schema_bindings {
            template.schema_bindings = schemas;
        }
        if let Some(sections) = patch.section_bindings {
            template.section_bindings = sections;
        }
        if let Some(config) = patch.config {
            template.config = config;
        }

        let updated = template.clone();
        audit(ctx, "template.update", &id.to_string());
        Ok(updated)
    }

    /// Removes the template together with its version history. Refused
    /// while any workspace is still bound to one of those versions.
    pub async fn delete_template(&self, ctx: &AdminContext, id: TemplateId) -> Result<(), EngineError> {
        let mut state = self.state.write().await;

        if !state.templates.contains_key(&id) {
            return Err(EngineError::TemplateNotFound(id));
        }
        let version_ids: BTreeSet<_> = state
            .versions
            .get(&id)
            .map(|history| history.iter().map(|v| v.id).collect())
            .unwrap_or_default();
        if state.bindings.values().any(|v| version_ids.contains(v)) {
            return Err(EngineError::TemplateInUse(id));
        }

        state.templates.remove(&id);
        state.versions.remove(&id);
        audit(ctx, "template.delete", &id.to_string());
        Ok(())
    }
}

/// Dangling bindings are rejected, not silently tolerated.
fn validate_bindings(
    state: &EngineState,
    schemas: &BTreeSet<SchemaCode>,
    sections: &BTreeSet<SectionId>,
) -> Result<(), EngineError> {
    for code in schemas {
        if !state.schemas.contains_key(code) {
            return Err(EngineError::UnknownSchema(code.clone()));
        }
    }
    for id in sections {
        if !state.sections.contains_key(id) {
            return Err(EngineError::UnknownSection(*id));
        }
    }
    Ok(())
}

fn clear_default(state: &mut EngineState, kind: TemplateKind) {
    for template in state.templates.values_mut() {
        if template.kind == kind && template.is_default {
            template.is_default = false;
        }
    }
}
