//! Template persistence.
//!
//! Layout under the templates directory:
//!
//! ```text
//! templates/
//! ├── templates.json   (metadata, no content)
//! └── <id>.md          (content)
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::Utc;
use tracing::{debug, info};

use crate::db::{self, Workspace};
use crate::error::{Error, Result};
use crate::fields::TemplateCategory;
use crate::template::{CreateTemplateDto, Template, TemplateMeta, UpdateTemplateDto};
use crate::validation::{validate_description, validate_name, validate_template_category};
use crate::variables;

const DUPLICATE_NAME: &str = "A template with this name already exists in this category (duplicate)";

#[derive(Debug, Clone)]
pub struct TemplateStore {
    dir: PathBuf,
}

impl TemplateStore {
    pub fn new(workspace: &Workspace) -> Self {
        TemplateStore { dir: workspace.templates_dir() }
    }

    fn index_path(&self) -> PathBuf {
        self.dir.join("templates.json")
    }

    fn content_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.md"))
    }

    fn read_index(&self) -> Result<Vec<TemplateMeta>> {
        db::load_json_or_default(&self.index_path())
    }

    fn write_index(&self, index: &[TemplateMeta]) -> Result<()> {
        db::save_json(&self.index_path(), index)
    }

    fn hydrate(&self, meta: TemplateMeta) -> Result<Template> {
        let content = db::read_text_or_empty(&self.content_path(&meta.id))?;
        Ok(meta.with_content(content))
    }

    /// All templates, newest first, optionally filtered.
    pub fn list(&self, category: Option<TemplateCategory>, project_id: Option<&str>) -> Result<Vec<Template>> {
        let mut templates = self
            .read_index()?
            .into_iter()
            .filter(|m| category.is_none_or(|c| m.category == c))
            .filter(|m| project_id.is_none_or(|p| m.project_id.as_deref() == Some(p)))
            .map(|m| self.hydrate(m))
            .collect::<Result<Vec<_>>>()?;
        templates.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(templates)
    }

    pub fn get(&self, id: &str) -> Result<Option<Template>> {
        match self.read_index()?.into_iter().find(|m| m.id == id) {
            Some(meta) => Ok(Some(self.hydrate(meta)?)),
            None => Ok(None),
        }
    }

    /// Like [`get`](Self::get) but a missing template is an error.
    pub fn require(&self, id: &str) -> Result<Template> {
        self.get(id)?.ok_or_else(|| Error::not_found("Template not found"))
    }

    /// Case-insensitive name clash within a category.
    pub fn is_name_duplicate(&self, name: &str, category: TemplateCategory, exclude_id: Option<&str>) -> Result<bool> {
        let lowered = name.trim().to_lowercase();
        Ok(self.read_index()?.iter().any(|m| {
            m.name.to_lowercase() == lowered && m.category == category && Some(m.id.as_str()) != exclude_id
        }))
    }

    pub fn create(&self, dto: CreateTemplateDto) -> Result<Template> {
        let name = validate_name(dto.name.as_deref())?.to_string();
        let category = validate_template_category(dto.category.as_deref())?;
        validate_description(dto.description.as_deref())?;
        if self.is_name_duplicate(&name, category, None)? {
            return Err(Error::validation(DUPLICATE_NAME));
        }
        self.insert(name, category, dto, false)
    }

    /// Insert a built-in template that cannot be deleted.
    pub fn create_default(&self, dto: CreateTemplateDto) -> Result<Template> {
        let name = validate_name(dto.name.as_deref())?.to_string();
        let category = validate_template_category(dto.category.as_deref())?;
        self.insert(name, category, dto, true)
    }

    fn insert(&self, name: String, category: TemplateCategory, dto: CreateTemplateDto, is_default: bool) -> Result<Template> {
        let now = Utc::now();
        let template = Template {
            id: db::new_id(),
            name,
            category,
            description: dto.description.as_deref().map(str::trim).unwrap_or_default().to_string(),
            content: dto.content.unwrap_or_default(),
            variables: dto.variables.unwrap_or_default(),
            is_default,
            project_id: dto.project_id,
            created_at: now,
            updated_at: now,
        };

        let mut index = self.read_index()?;
        index.push(TemplateMeta::from(&template));
        self.write_index(&index)?;
        db::write_atomic(&self.content_path(&template.id), template.content.as_bytes())?;

        info!(id = %template.id, name = %template.name, category = %template.category, "created template");
        Ok(template)
    }

    pub fn update(&self, id: &str, dto: UpdateTemplateDto) -> Result<Template> {
        let existing = self.require(id)?;

        let category = match dto.category.as_deref() {
            Some(c) => validate_template_category(Some(c))?,
            None => existing.category,
        };
        let name = match dto.name.as_deref() {
            Some(n) => validate_name(Some(n))?.to_string(),
            None => existing.name.clone(),
        };
        // Names are unique per category, so a category move is checked too.
        if (name != existing.name || category != existing.category)
            && self.is_name_duplicate(&name, category, Some(id))?
        {
            return Err(Error::validation(DUPLICATE_NAME));
        }
        validate_description(dto.description.as_deref())?;

        let updated = Template {
            name,
            category,
            description: dto.description.map(|d| d.trim().to_string()).unwrap_or(existing.description),
            content: dto.content.unwrap_or(existing.content),
            variables: dto.variables.unwrap_or(existing.variables),
            updated_at: Utc::now(),
            ..existing
        };

        let mut index = self.read_index()?;
        if let Some(slot) = index.iter_mut().find(|m| m.id == id) {
            *slot = TemplateMeta::from(&updated);
            self.write_index(&index)?;
        }
        db::write_atomic(&self.content_path(id), updated.content.as_bytes())?;

        debug!(id, "updated template");
        Ok(updated)
    }

    /// Delete a template. Default templates are rejected.
    pub fn delete(&self, id: &str) -> Result<()> {
        let existing = self.require(id)?;
        if existing.is_default {
            return Err(Error::validation("Cannot delete default templates"));
        }

        let mut index = self.read_index()?;
        index.retain(|m| m.id != id);
        self.write_index(&index)?;
        db::remove_file_if_exists(&self.content_path(id))?;

        info!(id, "deleted template");
        Ok(())
    }

    /// Content rendered with defaults (`[name]` where there is none).
    pub fn preview(&self, id: &str) -> Result<String> {
        let template = self.require(id)?;
        Ok(variables::generate_preview(&template.content, &template.variables))
    }

    /// Fill the template with `values`, rejecting missing required variables.
    pub fn apply(&self, id: &str, values: &HashMap<String, String>) -> Result<String> {
        let template = self.require(id)?;
        let missing = variables::missing_required_variables(&template.variables, values);
        if !missing.is_empty() {
            return Err(Error::validation(format!(
                "Missing required variables: {}",
                missing.join(", ")
            )));
        }
        Ok(variables::apply_template_variables(&template.content, &template.variables, values))
    }
}
