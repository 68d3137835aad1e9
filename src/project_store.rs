//! Project discovery and persistence.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use chrono::Utc;
use tracing::{info, warn};

use crate::db::{self, Workspace};
use crate::error::{Error, Result};
use crate::project::{CreateProjectDto, Project, UpdateProjectDto};
use crate::validation::{validate_description, validate_name};

const DUPLICATE_NAME: &str = "A project with this name already exists (duplicate)";

#[derive(Debug, Clone)]
pub struct ProjectStore {
    workspace: Workspace,
}

impl ProjectStore {
    pub fn new(workspace: &Workspace) -> Self {
        ProjectStore { workspace: workspace.clone() }
    }

    fn project_file(&self, id: &str) -> PathBuf {
        self.workspace.project_dir(id).join("project.json")
    }

    /// Scan `projects/` for project directories, newest first. Directories
    /// without a readable `project.json` are skipped.
    pub fn list(&self) -> Result<Vec<Project>> {
        let entries = match fs::read_dir(self.workspace.projects_dir()) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut projects = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_dir() {
                continue;
            }
            match db::load_json::<Project>(&path.join("project.json")) {
                Ok(Some(project)) => projects.push(project),
                Ok(None) => {}
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable project"),
            }
        }

        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects)
    }

    /// Ids that would escape `projects/` are never found, so every other
    /// store that gates on `require` stays inside the workspace.
    pub fn get(&self, id: &str) -> Result<Option<Project>> {
        if !db::is_path_safe_id(id) {
            return Ok(None);
        }
        db::load_json(&self.project_file(id))
    }

    pub fn require(&self, id: &str) -> Result<Project> {
        self.get(id)?.ok_or_else(|| Error::not_found("Project not found"))
    }

    /// Case-insensitive name clash across all projects.
    pub fn is_name_duplicate(&self, name: &str, exclude_id: Option<&str>) -> Result<bool> {
        let lowered = name.trim().to_lowercase();
        Ok(self
            .list()?
            .iter()
            .any(|p| p.name.to_lowercase() == lowered && Some(p.id.as_str()) != exclude_id))
    }

    pub fn create(&self, dto: CreateProjectDto) -> Result<Project> {
        let name = validate_name(dto.name.as_deref())?.to_string();
        validate_description(dto.description.as_deref())?;
        if self.is_name_duplicate(&name, None)? {
            return Err(Error::validation(DUPLICATE_NAME));
        }

        let now = Utc::now();
        let project = Project {
            id: db::new_id(),
            name,
            description: dto.description.as_deref().map(str::trim).unwrap_or_default().to_string(),
            tech_stack: dto.tech_stack.unwrap_or_default(),
            categories: dto.categories.unwrap_or_default(),
            default_references: dto.default_references.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };

        let dir = self.workspace.project_dir(&project.id);
        fs::create_dir_all(dir.join("tasks"))?;
        fs::create_dir_all(dir.join("archives"))?;
        db::save_json(&self.project_file(&project.id), &project)?;

        info!(id = %project.id, name = %project.name, "created project");
        Ok(project)
    }

    pub fn update(&self, id: &str, dto: UpdateProjectDto) -> Result<Project> {
        let mut project = self.require(id)?;

        if let Some(name) = dto.name.as_deref() {
            let name = validate_name(Some(name))?;
            if name != project.name && self.is_name_duplicate(name, Some(id))? {
                return Err(Error::validation(DUPLICATE_NAME));
            }
            project.name = name.to_string();
        }
        validate_description(dto.description.as_deref())?;
        if let Some(description) = dto.description {
            project.description = description.trim().to_string();
        }
        if let Some(tech_stack) = dto.tech_stack {
            project.tech_stack = tech_stack;
        }
        if let Some(categories) = dto.categories {
            project.categories = categories;
        }
        if let Some(refs) = dto.default_references {
            project.default_references = refs;
        }
        project.updated_at = Utc::now();

        db::save_json(&self.project_file(id), &project)?;
        info!(id, "updated project");
        Ok(project)
    }

    /// Remove the project directory with its tasks and archives.
    pub fn delete(&self, id: &str) -> Result<()> {
        self.require(id)?;
        db::remove_dir_if_exists(&self.workspace.project_dir(id))?;
        info!(id, "deleted project");
        Ok(())
    }
}
