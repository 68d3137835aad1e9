//! Task and archive data structures.
//!
//! A `Task` is one Kanban card. It carries the documents produced at each
//! stage plus the Q&A answers and revisions collected along the way. An
//! `Archive` wraps a snapshot of a finished task that has left the board.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fields::{QaCategory, TaskStatus};

/// A Kanban card moving through the design pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub project_id: String,
    pub title: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub feature_list: String,
    #[serde(default)]
    pub design_document: Option<String>,
    #[serde(default)]
    pub prd: Option<String>,
    #[serde(default)]
    pub prototype: Option<String>,
    #[serde(default)]
    pub references: Vec<String>,
    #[serde(default)]
    pub qa_answers: Vec<QaAnswer>,
    #[serde(default)]
    pub revisions: Vec<Revision>,
    #[serde(default)]
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Number of stage documents that have content.
    pub fn documents_generated(&self) -> usize {
        [&self.design_document, &self.prd, &self.prototype]
            .iter()
            .filter(|doc| doc.as_deref().is_some_and(|d| !d.is_empty()))
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QaAnswer {
    pub question_id: String,
    pub category: QaCategory,
    pub question: String,
    pub answer: String,
    pub answered_at: DateTime<Utc>,
}

/// One saved revision of a stage document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Revision {
    pub id: String,
    pub document_type: TaskStatus,
    pub content: String,
    pub feedback: Option<String>,
    pub version: u32,
    pub created_at: DateTime<Utc>,
}

/// Snapshot of a prototype-stage task removed from the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Archive {
    pub id: String,
    pub task_id: String,
    pub project_id: String,
    pub task: Task,
    pub archived_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskDto {
    #[serde(default)]
    pub title: String,
    pub feature_list: Option<String>,
    pub references: Option<Vec<String>>,
}

/// Partial content update. `Some(None)` on a document field clears it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskDto {
    pub title: Option<String>,
    pub feature_list: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub design_document: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub prd: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub prototype: Option<Option<String>>,
    pub references: Option<Vec<String>>,
    pub qa_answers: Option<Vec<QaAnswer>>,
    pub revisions: Option<Vec<Revision>>,
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
fn double_option<'de, D>(de: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(de).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Task {
        let now = Utc::now();
        Task {
            id: "t1".into(),
            project_id: "p1".into(),
            title: "Combat loop".into(),
            status: TaskStatus::Featurelist,
            feature_list: "Swords".into(),
            design_document: None,
            prd: None,
            prototype: None,
            references: vec![],
            qa_answers: vec![],
            revisions: vec![],
            is_archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn documents_generated_ignores_empty_documents() {
        let mut task = sample();
        assert_eq!(task.documents_generated(), 0);
        task.design_document = Some("GDD".into());
        task.prd = Some(String::new());
        assert_eq!(task.documents_generated(), 1);
        task.prototype = Some("proto".into());
        assert_eq!(task.documents_generated(), 2);
    }

    #[test]
    fn task_round_trips_with_camel_case_fields() {
        let task = sample();
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["projectId"], "p1");
        assert_eq!(json["featureList"], "Swords");
        assert_eq!(json["isArchived"], false);
        assert!(json["designDocument"].is_null());
    }

    #[test]
    fn update_dto_distinguishes_null_from_absent() {
        let dto: UpdateTaskDto = serde_json::from_str(r#"{"prd": null, "title": "x"}"#).unwrap();
        assert_eq!(dto.prd, Some(None));
        assert_eq!(dto.design_document, None);
        assert_eq!(dto.title.as_deref(), Some("x"));
    }
}
