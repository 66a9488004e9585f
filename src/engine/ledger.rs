//! Version Ledger: append-only history of template states.
//!
//! Every commit captures a full snapshot, the diff from its
//! predecessor and a SHA-256 checksum of the canonical snapshot JSON.
//! Rollback is itself a forward commit; committed rows are never
//! rewritten, only the `applied`/`rollbackable` flags move.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::engine::diff::{diff, Patch, TemplateState};
use crate::engine::error::EngineError;
use crate::engine::semver::SemVer;
use crate::engine::{audit, Engine, EngineState};
use crate::types::{AdminContext, AdminId, TemplateId, VersionId, WorkspaceId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateVersion {
    pub id: VersionId,
    pub template_id: TemplateId,
    pub version: SemVer,
    pub snapshot: TemplateState,
    pub diff_from_previous: Patch,
    /// SHA-256 of the canonical snapshot JSON.
    pub checksum: String,
    pub applied: bool,
    pub rollbackable: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: AdminId,
}

/// Pagination window for history reads. Limits are clamped by the
/// configured page-size ceiling.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Page {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl Engine {
    /// Commit the template's working state (or an explicitly supplied
    /// one) as the next version. An empty diff still appends: history
    /// is append-only with no dedup.
    pub async fn commit_version(
        &self,
        ctx: &AdminContext,
        template_id: TemplateId,
        state_override: Option<TemplateState>,
    ) -> Result<TemplateVersion, EngineError> {
        let mut state = self.state.write().await;

        let template = state
            .templates
            .get(&template_id)
            .ok_or(EngineError::TemplateNotFound(template_id))?;
        let new_state = match state_override {
            Some(explicit) => {
                for code in &explicit.schema_bindings {
                    if !state.schemas.contains_key(code) {
                        return Err(EngineError::UnknownSchema(code.clone()));
                    }
                }
                for id in &explicit.section_bindings {
                    if !state.sections.contains_key(id) {
                        return Err(EngineError::UnknownSection(*id));
                    }
                }
                explicit
            }
            None => template.state(),
        };

        let version = append_version(&mut state, ctx, template_id, new_state)?;
        audit(ctx, "version.commit", &version.id.to_string());
        Ok(version)
    }

    /// Newest first.
    pub async fn get_history(
        &self,
        template_id: TemplateId,
        page: Page,
    ) -> Result<Vec<TemplateVersion>, EngineError> {
        let config = crate::config::config();
        let limit = page
            .limit
            .unwrap_or(config.api.default_page_size)
            .min(config.api.max_page_size);
        let offset = page.offset.unwrap_or(0);

        let state = self.state.read().await;
        if !state.templates.contains_key(&template_id) {
            return Err(EngineError::TemplateNotFound(template_id));
        }
        Ok(state
            .versions
            .get(&template_id)
            .map(|history| {
                history
                    .iter()
                    .rev()
                    .skip(offset)
                    .take(limit)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    pub async fn get_version(&self, version_id: VersionId) -> Result<TemplateVersion, EngineError> {
        let state = self.state.read().await;
        find_version(&state, version_id)
            .map(|(_, v)| v.clone())
            .ok_or(EngineError::VersionNotFound(version_id))
    }

    /// Record that a workspace now runs this version. `applied` is
    /// never unset on siblings; many workspaces may apply one version.
    /// Earlier versions lose rollback eligibility when the applied
    /// snapshot binds a schema or section they lack, because restoring
    /// them would drop something a live workspace depends on.
    pub async fn mark_applied(
        &self,
        version_id: VersionId,
        workspace_id: WorkspaceId,
    ) -> Result<TemplateVersion, EngineError> {
        let mut state = self.state.write().await;

        let (template_id, index) = {
            let (template_id, version) = find_version(&state, version_id)
                .ok_or(EngineError::VersionNotFound(version_id))?;
            let index = state
                .versions
                .get(&template_id)
                .and_then(|history| history.iter().position(|v| v.id == version.id))
                .ok_or(EngineError::VersionNotFound(version_id))?;
            (template_id, index)
        };

        let history = state
            .versions
            .get_mut(&template_id)
            .ok_or(EngineError::VersionNotFound(version_id))?;
        history[index].applied = true;
        let applied = history[index].clone();

        for earlier in history
            .iter_mut()
            .filter(|v| v.version < applied.version && v.rollbackable)
        {
            let drops_schema = applied
                .snapshot
                .schema_bindings
                .difference(&earlier.snapshot.schema_bindings)
                .next()
                .is_some();
            let drops_section = applied
                .snapshot
                .section_bindings
                .difference(&earlier.snapshot.section_bindings)
                .next()
                .is_some();
            if drops_schema || drops_section {
                earlier.rollbackable = false;
            }
        }

        state.bindings.insert(workspace_id, version_id);
        tracing::info!(
            version = %applied.version,
            template = %template_id,
            workspace = %workspace_id,
            "version applied to workspace"
        );
        Ok(applied)
    }

    /// Restore a prior snapshot as a new forward commit. History stays
    /// append-only; the target row itself is untouched.
    pub async fn rollback(
        &self,
        ctx: &AdminContext,
        template_id: TemplateId,
        target_version_id: VersionId,
    ) -> Result<TemplateVersion, EngineError> {
        let mut state = self.state.write().await;

        if !state.templates.contains_key(&template_id) {
            return Err(EngineError::TemplateNotFound(template_id));
        }
        let target = state
            .versions
            .get(&template_id)
            .and_then(|history| history.iter().find(|v| v.id == target_version_id))
            .ok_or(EngineError::VersionNotFound(target_version_id))?;
        if !target.rollbackable {
            return Err(EngineError::NotRollbackable(target_version_id));
        }
        let restored = target.snapshot.clone();

        let version = append_version(&mut state, ctx, template_id, restored)?;
        audit(ctx, "version.rollback", &version.id.to_string());
        Ok(version)
    }
}

/// Core append path shared by commit and rollback. Runs under the
/// caller's write guard, so reading the latest version and appending
/// the next one is a single atomic step.
fn append_version(
    state: &mut EngineState,
    ctx: &AdminContext,
    template_id: TemplateId,
    new_state: TemplateState,
) -> Result<TemplateVersion, EngineError> {
    let EngineState {
        templates,
        versions,
        ..
    } = state;

    let template = templates
        .get_mut(&template_id)
        .ok_or(EngineError::TemplateNotFound(template_id))?;
    let history = versions.entry(template_id).or_default();

    let (base, version) = match history.last() {
        Some(previous) => (previous.snapshot.clone(), previous.version),
        None => (TemplateState::default(), SemVer::INITIAL),
    };
    let patch = diff(&base, &new_state);

    // Structural removal is what makes a version breaking; the policy
    // is encoded here, not declared by callers.
    let next_version = if history.is_empty() {
        SemVer::INITIAL
    } else if patch.has_removals() {
        version.bump_major()
    } else {
        version.bump_minor()
    };

    let checksum = snapshot_checksum(&new_state)?;
    let row = TemplateVersion {
        id: Uuid::new_v4(),
        template_id,
        version: next_version,
        snapshot: new_state.clone(),
        diff_from_previous: patch,
        checksum,
        applied: false,
        rollbackable: true,
        created_at: Utc::now(),
        created_by: ctx.admin_id,
    };
    history.push(row.clone());

    template.current_version = next_version;
    template.schema_bindings = new_state.schema_bindings;
    template.section_bindings = new_state.section_bindings;
    template.config = new_state.config;

    tracing::info!(
        version = %row.version,
        template = %template_id,
        empty_diff = row.diff_from_previous.is_empty(),
        "committed template version"
    );
    Ok(row)
}

fn find_version(
    state: &EngineState,
    version_id: VersionId,
) -> Option<(TemplateId, &TemplateVersion)> {
    state.versions.iter().find_map(|(template_id, history)| {
        history
            .iter()
            .find(|v| v.id == version_id)
            .map(|v| (*template_id, v))
    })
}

/// Canonical-JSON checksum, recorded alongside each snapshot so a
/// durable store can verify rows on read.
fn snapshot_checksum(snapshot: &TemplateState) -> Result<String, EngineError> {
    let canonical = serde_json::to_vec(snapshot)?;
    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    Ok(format!("{:x}", hasher.finalize()))
}
