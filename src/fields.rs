//! Enumerations and field types shared by tasks, templates and prompts.
//!
//! Every enum serialises to the kebab-case strings used on disk and over the
//! wire, and doubles as a clap `ValueEnum` so the CLI accepts the same names.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Kanban stage of a task, ordered left to right on the board.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Featurelist,
    Design,
    Prd,
    Prototype,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Featurelist,
        TaskStatus::Design,
        TaskStatus::Prd,
        TaskStatus::Prototype,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Featurelist => "featurelist",
            TaskStatus::Design => "design",
            TaskStatus::Prd => "prd",
            TaskStatus::Prototype => "prototype",
        }
    }
}

/// Category of a document template.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateCategory {
    QaQuestions,
    DocumentStructure,
    Prompts,
}

impl TemplateCategory {
    pub const ALL: [TemplateCategory; 3] = [
        TemplateCategory::QaQuestions,
        TemplateCategory::DocumentStructure,
        TemplateCategory::Prompts,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TemplateCategory::QaQuestions => "qa-questions",
            TemplateCategory::DocumentStructure => "document-structure",
            TemplateCategory::Prompts => "prompts",
        }
    }
}

/// Category of an AI prompt template.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PromptCategory {
    DocumentGeneration,
    CodeOperation,
    Analysis,
    Utility,
}

impl PromptCategory {
    pub const ALL: [PromptCategory; 4] = [
        PromptCategory::DocumentGeneration,
        PromptCategory::CodeOperation,
        PromptCategory::Analysis,
        PromptCategory::Utility,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PromptCategory::DocumentGeneration => "document-generation",
            PromptCategory::CodeOperation => "code-operation",
            PromptCategory::Analysis => "analysis",
            PromptCategory::Utility => "utility",
        }
    }
}

/// Input widget type of a template variable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    #[default]
    Text,
    Textarea,
    Select,
    Number,
}

/// Value type of a prompt variable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PromptVariableType {
    #[default]
    String,
    Number,
    Boolean,
    Array,
    Object,
}

/// Question category of a Q&A answer attached to a task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum QaCategory {
    GameMechanic,
    Economy,
    Growth,
    Narrative,
    Ux,
}

/// Bucket size for analytics timelines.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PeriodFilter {
    Daily,
    #[default]
    Weekly,
    Monthly,
}

impl PeriodFilter {
    pub const ALL: [PeriodFilter; 3] = [PeriodFilter::Daily, PeriodFilter::Weekly, PeriodFilter::Monthly];

    pub fn as_str(self) -> &'static str {
        match self {
            PeriodFilter::Daily => "daily",
            PeriodFilter::Weekly => "weekly",
            PeriodFilter::Monthly => "monthly",
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(TaskStatus, TemplateCategory, PromptCategory, PeriodFilter);

/// Join the wire names of a set of values for "must be one of" messages.
pub fn join_names<T: fmt::Display>(values: &[T]) -> String {
    values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ")
}

/// Parse a task status from its wire name.
pub fn parse_status(s: &str) -> Option<TaskStatus> {
    TaskStatus::ALL.into_iter().find(|v| v.as_str() == s)
}

/// Parse a template category from its wire name.
pub fn parse_template_category(s: &str) -> Option<TemplateCategory> {
    TemplateCategory::ALL.into_iter().find(|v| v.as_str() == s)
}

/// Parse a prompt category from its wire name.
pub fn parse_prompt_category(s: &str) -> Option<PromptCategory> {
    PromptCategory::ALL.into_iter().find(|v| v.as_str() == s)
}

/// Parse a timeline period from its wire name.
pub fn parse_period(s: &str) -> Option<PeriodFilter> {
    PeriodFilter::ALL.into_iter().find(|v| v.as_str() == s)
}
