//! Prompt persistence and version history.
//!
//! ```text
//! templates/prompts/
//! ├── prompts.json            (prompts, content included)
//! └── versions/<id>/v<N>.md   (content as it was at version N)
//! ```
//!
//! A content change snapshots the current content as `v<version>.md` before
//! it is replaced, then bumps `version` by one. `is_modified` always reflects
//! `content != default_content`.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::db::{self, Workspace};
use crate::error::{Error, Result};
use crate::fields::PromptCategory;
use crate::template::{CreatePromptDto, PromptTemplate, PromptVersion, UpdatePromptDto};
use crate::validation::{validate_description, validate_name, validate_prompt_category};
use crate::variables::{self, PromptValidationResult};

#[derive(Debug, Clone)]
pub struct PromptStore {
    dir: PathBuf,
}

impl PromptStore {
    pub fn new(workspace: &Workspace) -> Self {
        PromptStore { dir: workspace.prompts_dir() }
    }

    fn index_path(&self) -> PathBuf {
        self.dir.join("prompts.json")
    }

    fn versions_dir(&self, id: &str) -> PathBuf {
        self.dir.join("versions").join(id)
    }

    fn version_path(&self, id: &str, version: u32) -> PathBuf {
        self.versions_dir(id).join(format!("v{version}.md"))
    }

    fn read_index(&self) -> Result<Vec<PromptTemplate>> {
        db::load_json_or_default(&self.index_path())
    }

    fn write_index(&self, prompts: &[PromptTemplate]) -> Result<()> {
        db::save_json(&self.index_path(), prompts)
    }

    /// All prompts, newest first.
    pub fn list(&self, category: Option<PromptCategory>) -> Result<Vec<PromptTemplate>> {
        let mut prompts: Vec<_> = self
            .read_index()?
            .into_iter()
            .filter(|p| category.is_none_or(|c| p.category == c))
            .collect();
        prompts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(prompts)
    }

    pub fn get(&self, id: &str) -> Result<Option<PromptTemplate>> {
        Ok(self.read_index()?.into_iter().find(|p| p.id == id))
    }

    pub fn require(&self, id: &str) -> Result<PromptTemplate> {
        self.get(id)?.ok_or_else(|| Error::not_found("Prompt not found"))
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read_index()?.is_empty())
    }

    /// Create a prompt at version 1; its content becomes the reset baseline.
    pub fn create(&self, dto: CreatePromptDto) -> Result<PromptTemplate> {
        let name = validate_name(dto.name.as_deref())?.to_string();
        let category = validate_prompt_category(dto.category.as_deref())?;
        validate_description(dto.description.as_deref())?;

        let now = Utc::now();
        let content = dto.content.unwrap_or_default();
        let prompt = PromptTemplate {
            id: db::new_id(),
            name,
            category,
            description: dto.description.as_deref().map(str::trim).unwrap_or_default().to_string(),
            default_content: content.clone(),
            content,
            variables: dto.variables.unwrap_or_default(),
            is_modified: false,
            version: 1,
            created_at: now,
            updated_at: now,
        };

        let mut prompts = self.read_index()?;
        prompts.push(prompt.clone());
        self.write_index(&prompts)?;

        info!(id = %prompt.id, name = %prompt.name, "created prompt");
        Ok(prompt)
    }

    /// Apply a partial update. A content change snapshots the previous
    /// version and bumps the counter by exactly one.
    pub fn update(&self, id: &str, dto: UpdatePromptDto) -> Result<PromptTemplate> {
        if let Some(name) = dto.name.as_deref() {
            validate_name(Some(name))?;
        }
        let category = dto.category.as_deref().map(|c| validate_prompt_category(Some(c))).transpose()?;
        validate_description(dto.description.as_deref())?;

        let mut prompts = self.read_index()?;
        let prompt = prompts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::not_found("Prompt not found"))?;

        if let Some(name) = dto.name {
            prompt.name = name.trim().to_string();
        }
        if let Some(category) = category {
            prompt.category = category;
        }
        if let Some(description) = dto.description {
            prompt.description = description.trim().to_string();
        }
        if let Some(variables) = dto.variables {
            prompt.variables = variables;
        }
        if let Some(content) = dto.content {
            if content != prompt.content {
                self.save_version(id, prompt.version, &prompt.content)?;
                prompt.content = content;
                prompt.version += 1;
            }
        }
        prompt.is_modified = prompt.content != prompt.default_content;
        prompt.updated_at = Utc::now();

        let updated = prompt.clone();
        self.write_index(&prompts)?;

        info!(id, version = updated.version, modified = updated.is_modified, "updated prompt");
        Ok(updated)
    }

    /// Restore the baseline content. The replaced version is snapshotted
    /// unless the prompt is already at its baseline. In that case `version`
    /// is left as is, so every version below the current one has a stored
    /// snapshot and the history has no gaps.
    pub fn reset(&self, id: &str) -> Result<PromptTemplate> {
        let mut prompts = self.read_index()?;
        let prompt = prompts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::not_found("Prompt not found"))?;

        if prompt.content != prompt.default_content {
            self.save_version(id, prompt.version, &prompt.content)?;
            prompt.content = prompt.default_content.clone();
            prompt.version += 1;
        }
        prompt.is_modified = false;
        prompt.updated_at = Utc::now();

        let reset = prompt.clone();
        self.write_index(&prompts)?;

        info!(id, version = reset.version, "reset prompt to default");
        Ok(reset)
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        let mut prompts = self.read_index()?;
        let before = prompts.len();
        prompts.retain(|p| p.id != id);
        if prompts.len() == before {
            return Err(Error::not_found("Prompt not found"));
        }
        self.write_index(&prompts)?;
        db::remove_dir_if_exists(&self.versions_dir(id))?;

        info!(id, "deleted prompt");
        Ok(())
    }

    fn save_version(&self, id: &str, version: u32, content: &str) -> Result<()> {
        db::write_atomic(&self.version_path(id, version), content.as_bytes())
    }

    /// Snapshots of replaced content, oldest first.
    pub fn versions(&self, id: &str) -> Result<Vec<PromptVersion>> {
        let dir = self.versions_dir(id);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut versions = Vec::new();
        for entry in entries {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(version) = file_name
                .to_str()
                .and_then(|n| n.strip_prefix('v'))
                .and_then(|n| n.strip_suffix(".md"))
                .and_then(|n| n.parse::<u32>().ok())
            else {
                warn!(file = ?file_name, "skipping unexpected file in versions directory");
                continue;
            };

            let path = entry.path();
            let content = fs::read_to_string(&path)?;
            let created_at: DateTime<Utc> = entry.metadata()?.modified().map(DateTime::from)?;
            versions.push(PromptVersion {
                id: format!("{id}-v{version}"),
                prompt_id: id.to_string(),
                version,
                content,
                created_at,
            });
        }

        versions.sort_by_key(|v| v.version);
        Ok(versions)
    }

    /// Check input values against a prompt's variable definitions.
    pub fn validate(&self, id: &str, values: &HashMap<String, String>) -> Result<PromptValidationResult> {
        let prompt = self.require(id)?;
        Ok(variables::validate_prompt_variables(&prompt.variables, values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn store() -> (tempfile::TempDir, PromptStore) {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(dir.path());
        (dir, PromptStore::new(&ws))
    }

    fn create(store: &PromptStore, content: &str) -> PromptTemplate {
        store
            .create(CreatePromptDto {
                name: Some("Code Review".into()),
                category: Some("code-operation".into()),
                description: Some("Review {{language}} code".into()),
                content: Some(content.into()),
                variables: None,
            })
            .unwrap()
    }

    fn edit(store: &PromptStore, id: &str, content: &str) -> PromptTemplate {
        store
            .update(id, UpdatePromptDto { content: Some(content.into()), ..Default::default() })
            .unwrap()
    }

    #[test]
    fn create_starts_at_version_one() {
        let (_dir, store) = store();
        let p = create(&store, "Review {{code}}");
        assert_eq!(p.version, 1);
        assert!(!p.is_modified);
        assert_eq!(p.default_content, "Review {{code}}");
        assert_eq!(store.require(&p.id).unwrap().content, "Review {{code}}");
        assert!(store.versions(&p.id).unwrap().is_empty());
    }

    #[test]
    fn each_content_update_bumps_version_once() {
        let (_dir, store) = store();
        let p = create(&store, "v1 body");

        let p2 = edit(&store, &p.id, "v2 body");
        assert_eq!(p2.version, 2);
        assert!(p2.is_modified);
        let p3 = edit(&store, &p.id, "v3 body");
        assert_eq!(p3.version, 3);

        let versions = store.versions(&p.id).unwrap();
        assert_eq!(versions.len(), 2);
        assert_eq!(versions[0].version, 1);
        assert_eq!(versions[0].content, "v1 body");
        assert_eq!(versions[1].version, 2);
        assert_eq!(versions[1].content, "v2 body");
        assert_eq!(versions[1].id, format!("{}-v2", p.id));
    }

    #[test]
    fn metadata_only_update_keeps_version() {
        let (_dir, store) = store();
        let p = create(&store, "body");
        let renamed = store
            .update(&p.id, UpdatePromptDto { name: Some("Renamed".into()), ..Default::default() })
            .unwrap();
        assert_eq!(renamed.version, 1);
        assert_eq!(renamed.name, "Renamed");
        assert!(!renamed.is_modified);
        assert!(store.versions(&p.id).unwrap().is_empty());
    }

    #[test]
    fn editing_back_to_default_clears_modified() {
        let (_dir, store) = store();
        let p = create(&store, "base");
        assert!(edit(&store, &p.id, "changed").is_modified);
        let back = edit(&store, &p.id, "base");
        assert!(!back.is_modified);
        assert_eq!(back.version, 3);
    }

    #[test]
    fn reset_restores_default_after_many_edits() {
        let (_dir, store) = store();
        let p = create(&store, "base");
        for i in 0..5 {
            edit(&store, &p.id, &format!("edit {i}"));
        }

        let reset = store.reset(&p.id).unwrap();
        assert_eq!(reset.content, reset.default_content);
        assert_eq!(reset.content, "base");
        assert!(!reset.is_modified);
        assert_eq!(reset.version, 7);

        let versions = store.versions(&p.id).unwrap();
        assert_eq!(versions.len(), 6);
        assert_eq!(versions.last().unwrap().content, "edit 4");
    }

    #[test]
    fn reset_of_unmodified_prompt_adds_no_version() {
        let (_dir, store) = store();
        let p = create(&store, "base");
        let reset = store.reset(&p.id).unwrap();
        assert_eq!(reset.version, 1);
        assert!(store.versions(&p.id).unwrap().is_empty());
    }

    #[test]
    fn delete_removes_history() {
        let (dir, store) = store();
        let p = create(&store, "base");
        edit(&store, &p.id, "next");
        store.delete(&p.id).unwrap();

        assert!(store.get(&p.id).unwrap().is_none());
        assert!(!dir.path().join("templates/prompts/versions").join(&p.id).exists());
        assert!(matches!(store.delete(&p.id), Err(Error::NotFound(_))));
    }

    #[test]
    fn unknown_prompt_is_not_found() {
        let (_dir, store) = store();
        assert!(matches!(store.reset("missing"), Err(Error::NotFound(_))));
        assert!(matches!(
            store.update("missing", UpdatePromptDto::default()),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn invalid_category_rejected() {
        let (_dir, store) = store();
        let err = store
            .create(CreatePromptDto {
                name: Some("X".into()),
                category: Some("qa-questions".into()),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
