//! Document template and prompt template data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fields::{PromptCategory, PromptVariableType, TemplateCategory, VariableType};

/// A reusable content blob with `{{name}}` placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    pub category: TemplateCategory,
    #[serde(default)]
    pub description: String,
    /// Lives in `<id>.md`, not in the index file.
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub variables: Vec<TemplateVariable>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub project_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Index-file record of a template: everything except the content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateMeta {
    pub id: String,
    pub name: String,
    pub category: TemplateCategory,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub variables: Vec<TemplateVariable>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub project_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TemplateMeta {
    pub fn with_content(self, content: String) -> Template {
        Template {
            id: self.id,
            name: self.name,
            category: self.category,
            description: self.description,
            content,
            variables: self.variables,
            is_default: self.is_default,
            project_id: self.project_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl From<&Template> for TemplateMeta {
    fn from(t: &Template) -> Self {
        TemplateMeta {
            id: t.id.clone(),
            name: t.name.clone(),
            category: t.category,
            description: t.description.clone(),
            variables: t.variables.clone(),
            is_default: t.is_default,
            project_id: t.project_id.clone(),
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

/// Definition of one placeholder a template expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateVariable {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub default_value: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, rename = "type")]
    pub var_type: VariableType,
    #[serde(default)]
    pub options: Option<Vec<String>>,
}

impl TemplateVariable {
    /// The default value, if one is set and non-empty.
    pub fn non_empty_default(&self) -> Option<&str> {
        self.default_value.as_deref().filter(|d| !d.is_empty())
    }
}

/// Creation payload. Category arrives as a raw string so an unknown value is
/// reported as a validation error rather than a body parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplateDto {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub variables: Option<Vec<TemplateVariable>>,
    pub project_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTemplateDto {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub variables: Option<Vec<TemplateVariable>>,
}

/// A template variant that drives AI generation, with version tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptTemplate {
    pub id: String,
    pub name: String,
    pub category: PromptCategory,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub variables: Vec<PromptVariable>,
    #[serde(default)]
    pub is_modified: bool,
    pub version: u32,
    /// Baseline captured at creation, restored by reset.
    #[serde(default)]
    pub default_content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptVariable {
    pub name: String,
    #[serde(default, rename = "type")]
    pub var_type: PromptVariableType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

/// Snapshot of a prompt's content before it was replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptVersion {
    pub id: String,
    pub prompt_id: String,
    pub version: u32,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePromptDto {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub variables: Option<Vec<PromptVariable>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePromptDto {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub variables: Option<Vec<PromptVariable>>,
}
