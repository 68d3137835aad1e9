//! Project data structures.
//!
//! Each project owns a directory under `projects/<id>/` holding its
//! `project.json`, a `tasks/` folder and an `archives/` folder.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    /// References copied onto every new task.
    #[serde(default)]
    pub default_references: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectDto {
    pub name: Option<String>,
    pub description: Option<String>,
    pub tech_stack: Option<Vec<String>>,
    pub categories: Option<Vec<String>>,
    pub default_references: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectDto {
    pub name: Option<String>,
    pub description: Option<String>,
    pub tech_stack: Option<Vec<String>>,
    pub categories: Option<Vec<String>>,
    pub default_references: Option<Vec<String>>,
}
