//! Task persistence. Each project keeps its board in
//! `projects/<id>/tasks/tasks.json`, in insertion order.

use std::path::PathBuf;

use chrono::Utc;
use tracing::info;

use crate::db::{self, Workspace};
use crate::error::{Error, Result};
use crate::fields::TaskStatus;
use crate::kanban;
use crate::project_store::ProjectStore;
use crate::task::{CreateTaskDto, Task, UpdateTaskDto};

#[derive(Debug, Clone)]
pub struct TaskStore {
    workspace: Workspace,
    projects: ProjectStore,
}

impl TaskStore {
    pub fn new(workspace: &Workspace) -> Self {
        TaskStore {
            workspace: workspace.clone(),
            projects: ProjectStore::new(workspace),
        }
    }

    fn tasks_file(&self, project_id: &str) -> PathBuf {
        self.workspace.project_dir(project_id).join("tasks").join("tasks.json")
    }

    pub(crate) fn load(&self, project_id: &str) -> Result<Vec<Task>> {
        db::load_json_or_default(&self.tasks_file(project_id))
    }

    pub(crate) fn save(&self, project_id: &str, tasks: &[Task]) -> Result<()> {
        db::save_json(&self.tasks_file(project_id), tasks)
    }

    /// Tasks of an existing project.
    pub fn list(&self, project_id: &str) -> Result<Vec<Task>> {
        self.projects.require(project_id)?;
        self.load(project_id)
    }

    /// Look a task up across every project.
    pub fn find(&self, task_id: &str) -> Result<Option<Task>> {
        for project in self.projects.list()? {
            if let Some(task) = self.load(&project.id)?.into_iter().find(|t| t.id == task_id) {
                return Ok(Some(task));
            }
        }
        Ok(None)
    }

    pub fn require(&self, task_id: &str) -> Result<Task> {
        self.find(task_id)?.ok_or_else(|| Error::not_found("Task not found"))
    }

    /// New tasks start in the feature list column and inherit the project's
    /// default references when none are given.
    pub fn create(&self, project_id: &str, dto: CreateTaskDto) -> Result<Task> {
        let title = dto.title.trim();
        if title.is_empty() {
            return Err(Error::validation("Title is required"));
        }
        let project = self.projects.require(project_id)?;

        let now = Utc::now();
        let task = Task {
            id: db::new_id(),
            project_id: project.id,
            title: title.to_string(),
            status: TaskStatus::Featurelist,
            feature_list: dto.feature_list.unwrap_or_default(),
            design_document: None,
            prd: None,
            prototype: None,
            references: dto.references.unwrap_or(project.default_references),
            qa_answers: Vec::new(),
            revisions: Vec::new(),
            is_archived: false,
            created_at: now,
            updated_at: now,
        };

        let mut tasks = self.load(project_id)?;
        tasks.push(task.clone());
        self.save(project_id, &tasks)?;

        info!(id = %task.id, project = project_id, "created task");
        Ok(task)
    }

    /// Find a task, apply `f` to it and persist the board.
    fn modify<F>(&self, task_id: &str, f: F) -> Result<Task>
    where
        F: FnOnce(&mut Task) -> Result<()>,
    {
        let task = self.require(task_id)?;
        let mut tasks = self.load(&task.project_id)?;
        let slot = tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| Error::not_found("Task not found"))?;
        f(slot)?;
        slot.updated_at = Utc::now();
        let updated = slot.clone();
        self.save(&task.project_id, &tasks)?;
        Ok(updated)
    }

    pub fn update(&self, task_id: &str, dto: UpdateTaskDto) -> Result<Task> {
        if dto.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(Error::validation("Title is required"));
        }
        self.modify(task_id, |task| {
            if let Some(title) = dto.title {
                task.title = title.trim().to_string();
            }
            if let Some(feature_list) = dto.feature_list {
                task.feature_list = feature_list;
            }
            if let Some(doc) = dto.design_document {
                task.design_document = doc;
            }
            if let Some(doc) = dto.prd {
                task.prd = doc;
            }
            if let Some(doc) = dto.prototype {
                task.prototype = doc;
            }
            if let Some(references) = dto.references {
                task.references = references;
            }
            if let Some(answers) = dto.qa_answers {
                task.qa_answers = answers;
            }
            if let Some(revisions) = dto.revisions {
                task.revisions = revisions;
            }
            Ok(())
        })
    }

    /// Move a task to another column. A forward move into a generating
    /// column is logged as a generation request.
    pub fn set_status(&self, task_id: &str, status: TaskStatus) -> Result<Task> {
        let mut from = status;
        let task = self.modify(task_id, |task| {
            from = task.status;
            task.status = status;
            Ok(())
        })?;

        if kanban::triggers_generation(from, status) {
            info!(id = task_id, from = %from, to = %status, "generation requested");
        } else {
            info!(id = task_id, from = %from, to = %status, "moved task");
        }
        Ok(task)
    }

    pub fn delete(&self, task_id: &str) -> Result<()> {
        let task = self.require(task_id)?;
        let mut tasks = self.load(&task.project_id)?;
        tasks.retain(|t| t.id != task_id);
        self.save(&task.project_id, &tasks)?;
        info!(id = task_id, "deleted task");
        Ok(())
    }
}
