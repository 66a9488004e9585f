//! Section Tree operations: a forest of platform feature nodes with
//! parent-existence and acyclicity invariants.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::engine::error::EngineError;
use crate::engine::section::{NewSection, SectionNode, SectionPatch};
use crate::engine::{audit, Engine};
use crate::types::{AdminContext, SectionId};

impl Engine {
    pub async fn list_sections(&self) -> Vec<SectionNode> {
        let state = self.state.read().await;
        state.sections.values().cloned().collect()
    }

    pub async fn get_section(&self, id: SectionId) -> Result<SectionNode, EngineError> {
        let state = self.state.read().await;
        state
            .sections
            .get(&id)
            .cloned()
            .ok_or(EngineError::SectionNotFound(id))
    }

    pub async fn create_section(
        &self,
        ctx: &AdminContext,
        input: NewSection,
    ) -> Result<SectionNode, EngineError> {
        let mut state = self.state.write().await;

        if let Some(parent_id) = input.parent_id {
            if !state.sections.contains_key(&parent_id) {
                return Err(EngineError::ParentNotFound(parent_id));
            }
        }
        if let Some(code) = &input.bound_schema {
            if !state.schemas.contains_key(code) {
                return Err(EngineError::UnknownSchema(code.clone()));
            }
        }

        let node = SectionNode {
            id: Uuid::new_v4(),
            name: input.name,
            parent_id: input.parent_id,
            bound_schema: input.bound_schema,
            access_type: input.access_type,
            scope: input.scope,
            system: input.system,
            enabled: true,
        };
        state.sections.insert(node.id, node.clone());

        audit(ctx, "section.create", &node.id.to_string());
        Ok(node)
    }

    /// All checks run before any mutation, so a rejected patch leaves
    /// the tree exactly as it was.
    pub async fn update_section(
        &self,
        ctx: &AdminContext,
        id: SectionId,
        patch: SectionPatch,
    ) -> Result<SectionNode, EngineError> {
        let mut state = self.state.write().await;

        if !state.sections.contains_key(&id) {
            return Err(EngineError::SectionNotFound(id));
        }
        if let Some(new_parent) = patch.parent_id {
            if !state.sections.contains_key(&new_parent) {
                return Err(EngineError::ParentNotFound(new_parent));
            }
            if would_cycle(&state.sections, id, new_parent) {
                return Err(EngineError::CycleDetected(id));
            }
        }
        if let Some(code) = &patch.bound_schema {
            if !state.schemas.contains_key(code) {
                return Err(EngineError::UnknownSchema(code.clone()));
            }
        }

        let node = state
            .sections
            .get_mut(&id)
            .ok_or(EngineError::SectionNotFound(id))?;
        if let Some(name) = patch.name {
            node.name = name;
        }
        if let Some(access_type) = patch.access_type {
            node.access_type = access_type;
        }
        if let Some(scope) = patch.scope {
            node.scope = scope;
        }
        if patch.clear_parent {
            node.parent_id = None;
        } else if let Some(new_parent) = patch.parent_id {
            node.parent_id = Some(new_parent);
        }
        if patch.clear_schema {
            node.bound_schema = None;
        } else if let Some(code) = patch.bound_schema {
            node.bound_schema = Some(code);
        }

        let updated = node.clone();
        audit(ctx, "section.update", &id.to_string());
        Ok(updated)
    }

    /// System nodes may be toggled; only deletion is locked for them.
    pub async fn toggle_section(
        &self,
        ctx: &AdminContext,
        id: SectionId,
    ) -> Result<SectionNode, EngineError> {
        let mut state = self.state.write().await;
        let node = state
            .sections
            .get_mut(&id)
            .ok_or(EngineError::SectionNotFound(id))?;
        node.enabled = !node.enabled;

        let updated = node.clone();
        audit(ctx, "section.toggle", &id.to_string());
        Ok(updated)
    }

    /// No implicit cascade: children must be re-parented or deleted
    /// first, which keeps orphaning an explicit operator decision.
    pub async fn delete_section(&self, ctx: &AdminContext, id: SectionId) -> Result<(), EngineError> {
        let mut state = self.state.write().await;
        let node = state
            .sections
            .get(&id)
            .ok_or(EngineError::SectionNotFound(id))?;
        if node.system {
            return Err(EngineError::SystemNodeLocked(id));
        }
        if state.sections.values().any(|n| n.parent_id == Some(id)) {
            return Err(EngineError::HasChildren(id));
        }

        state.sections.remove(&id);
        audit(ctx, "section.delete", &id.to_string());
        Ok(())
    }
}

/// Ancestor walk from the candidate parent upward. Finding `node_id`
/// along the way (or as the parent itself) means the re-parent would
/// close a cycle.
fn would_cycle(
    sections: &BTreeMap<SectionId, SectionNode>,
    node_id: SectionId,
    new_parent_id: SectionId,
) -> bool {
    let mut cursor = Some(new_parent_id);
    while let Some(current) = cursor {
        if current == node_id {
            return true;
        }
        cursor = sections.get(&current).and_then(|node| node.parent_id);
    }
    false
}
