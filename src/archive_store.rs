//! Archived tasks, kept per project in `projects/<id>/archives/archives.json`.

use std::path::PathBuf;

use chrono::Utc;
use tracing::info;

use crate::db::{self, Workspace};
use crate::error::{Error, Result};
use crate::fields::TaskStatus;
use crate::project_store::ProjectStore;
use crate::task::{Archive, Task};
use crate::task_store::TaskStore;

#[derive(Debug, Clone)]
pub struct ArchiveStore {
    workspace: Workspace,
    projects: ProjectStore,
    tasks: TaskStore,
}

impl ArchiveStore {
    pub fn new(workspace: &Workspace) -> Self {
        ArchiveStore {
            workspace: workspace.clone(),
            projects: ProjectStore::new(workspace),
            tasks: TaskStore::new(workspace),
        }
    }

    fn archives_file(&self, project_id: &str) -> PathBuf {
        self.workspace.project_dir(project_id).join("archives").join("archives.json")
    }

    fn load(&self, project_id: &str) -> Result<Vec<Archive>> {
        db::load_json_or_default(&self.archives_file(project_id))
    }

    fn save(&self, project_id: &str, archives: &[Archive]) -> Result<()> {
        db::save_json(&self.archives_file(project_id), archives)
    }

    pub fn list(&self, project_id: &str) -> Result<Vec<Archive>> {
        self.projects.require(project_id)?;
        self.load(project_id)
    }

    pub fn get(&self, project_id: &str, archive_id: &str) -> Result<Archive> {
        self.list(project_id)?
            .into_iter()
            .find(|a| a.id == archive_id)
            .ok_or_else(|| Error::not_found("Archive not found"))
    }

    /// Take a finished task off the board. Only prototype tasks qualify.
    pub fn archive(&self, project_id: &str, task_id: &str) -> Result<Archive> {
        self.projects.require(project_id)?;
        let mut tasks = self.tasks.load(project_id)?;
        let pos = tasks
            .iter()
            .position(|t| t.id == task_id)
            .ok_or_else(|| Error::not_found("Task not found"))?;
        if tasks[pos].status != TaskStatus::Prototype {
            return Err(Error::validation("Only prototype tasks can be archived"));
        }

        let now = Utc::now();
        let mut task = tasks.remove(pos);
        task.is_archived = true;
        task.updated_at = now;
        let archive = Archive {
            id: db::new_id(),
            task_id: task.id.clone(),
            project_id: project_id.to_string(),
            task,
            archived_at: now,
        };

        let mut archives = self.load(project_id)?;
        archives.push(archive.clone());
        self.save(project_id, &archives)?;
        self.tasks.save(project_id, &tasks)?;

        info!(id = %archive.id, task = task_id, "archived task");
        Ok(archive)
    }

    /// Put an archived task back on the board and drop the archive.
    pub fn restore(&self, project_id: &str, archive_id: &str) -> Result<Task> {
        let mut archives = self.list(project_id)?;
        let pos = archives
            .iter()
            .position(|a| a.id == archive_id)
            .ok_or_else(|| Error::not_found("Archive not found"))?;

        let mut task = archives.remove(pos).task;
        task.is_archived = false;
        task.updated_at = Utc::now();

        let mut tasks = self.tasks.load(project_id)?;
        tasks.retain(|t| t.id != task.id);
        tasks.push(task.clone());
        self.tasks.save(project_id, &tasks)?;
        self.save(project_id, &archives)?;

        info!(id = archive_id, task = %task.id, "restored archive");
        Ok(task)
    }

    /// Permanently delete an archive.
    pub fn delete(&self, project_id: &str, archive_id: &str) -> Result<()> {
        let mut archives = self.list(project_id)?;
        let before = archives.len();
        archives.retain(|a| a.id != archive_id);
        if archives.len() == before {
            return Err(Error::not_found("Archive not found"));
        }
        self.save(project_id, &archives)?;
        info!(id = archive_id, "deleted archive");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::CreateProjectDto;
    use crate::task::CreateTaskDto;
    use pretty_assertions::assert_eq;

    struct Fixture {
        _dir: tempfile::TempDir,
        archives: ArchiveStore,
        tasks: TaskStore,
        project: String,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(dir.path());
        let project = ProjectStore::new(&ws)
            .create(CreateProjectDto { name: Some("Arena".into()), ..Default::default() })
            .unwrap();
        Fixture {
            archives: ArchiveStore::new(&ws),
            tasks: TaskStore::new(&ws),
            project: project.id,
            _dir: dir,
        }
    }

    fn task_in(f: &Fixture, status: TaskStatus) -> Task {
        let task = f
            .tasks
            .create(&f.project, CreateTaskDto { title: "Loot".into(), ..Default::default() })
            .unwrap();
        f.tasks.set_status(&task.id, status).unwrap()
    }

    #[test]
    fn only_prototype_tasks_can_be_archived() {
        let f = fixture();
        let task = task_in(&f, TaskStatus::Prd);
        let err = f.archives.archive(&f.project, &task.id).unwrap_err();
        assert_eq!(err.to_string(), "Only prototype tasks can be archived");
        assert_eq!(f.tasks.list(&f.project).unwrap().len(), 1);
        assert!(f.archives.list(&f.project).unwrap().is_empty());
    }

    #[test]
    fn archive_moves_task_off_the_board() {
        let f = fixture();
        let task = task_in(&f, TaskStatus::Prototype);

        let archive = f.archives.archive(&f.project, &task.id).unwrap();
        assert_eq!(archive.task_id, task.id);
        assert!(archive.task.is_archived);
        assert!(f.tasks.list(&f.project).unwrap().is_empty());
        assert_eq!(f.archives.get(&f.project, &archive.id).unwrap(), archive);
    }

    #[test]
    fn restore_returns_task_to_board() {
        let f = fixture();
        let task = task_in(&f, TaskStatus::Prototype);
        let archive = f.archives.archive(&f.project, &task.id).unwrap();

        let restored = f.archives.restore(&f.project, &archive.id).unwrap();
        assert!(!restored.is_archived);
        assert_eq!(restored.id, task.id);
        assert_eq!(f.tasks.list(&f.project).unwrap(), vec![restored]);
        assert!(f.archives.list(&f.project).unwrap().is_empty());
        assert!(matches!(f.archives.restore(&f.project, &archive.id), Err(Error::NotFound(_))));
    }

    #[test]
    fn delete_is_permanent() {
        let f = fixture();
        let task = task_in(&f, TaskStatus::Prototype);
        let archive = f.archives.archive(&f.project, &task.id).unwrap();

        f.archives.delete(&f.project, &archive.id).unwrap();
        assert!(f.archives.list(&f.project).unwrap().is_empty());
        assert!(f.tasks.list(&f.project).unwrap().is_empty());
        assert!(matches!(f.archives.delete(&f.project, &archive.id), Err(Error::NotFound(_))));
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let f = fixture();
        assert!(matches!(f.archives.list("nope"), Err(Error::NotFound(_))));
        assert!(matches!(f.archives.archive(&f.project, "nope"), Err(Error::NotFound(_))));
        assert!(matches!(f.archives.get(&f.project, "nope"), Err(Error::NotFound(_))));
    }
}
