//! Dashboard aggregates computed from a project's board and archives.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::Serialize;

use crate::archive_store::ArchiveStore;
use crate::db::Workspace;
use crate::error::Result;
use crate::fields::{PeriodFilter, TaskStatus};
use crate::task::Task;
use crate::task_store::TaskStore;

pub const CSV_HEADER: &str = "Date,Tasks Created,Tasks Completed,Documents Generated";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TasksByStatus {
    pub featurelist: usize,
    pub design: usize,
    pub prd: usize,
    pub prototype: usize,
}

impl TasksByStatus {
    fn bump(&mut self, status: TaskStatus) {
        match status {
            TaskStatus::Featurelist => self.featurelist += 1,
            TaskStatus::Design => self.design += 1,
            TaskStatus::Prd => self.prd += 1,
            TaskStatus::Prototype => self.prototype += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub project_id: String,
    pub total_tasks: usize,
    pub tasks_by_status: TasksByStatus,
    /// Share of tasks that reached the prototype column, 0 when empty.
    pub completion_rate: f64,
    pub archived_count: usize,
    pub documents_generated: usize,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineDataPoint {
    pub date: String,
    pub tasks_created: usize,
    pub tasks_completed: usize,
    pub documents_generated: usize,
}

pub fn summarize(project_id: &str, tasks: &[Task], archived_count: usize) -> DashboardSummary {
    let mut by_status = TasksByStatus::default();
    let mut documents = 0;
    for task in tasks {
        by_status.bump(task.status);
        documents += task.documents_generated();
    }

    let total = tasks.len();
    let completion_rate = if total == 0 { 0.0 } else { by_status.prototype as f64 / total as f64 };

    DashboardSummary {
        project_id: project_id.to_string(),
        total_tasks: total,
        tasks_by_status: by_status,
        completion_rate,
        archived_count,
        documents_generated: documents,
        last_updated: Utc::now(),
    }
}

/// Bucket key for a timestamp. Weeks start on Monday.
pub fn period_key(at: DateTime<Utc>, period: PeriodFilter) -> String {
    let date = at.date_naive();
    match period {
        PeriodFilter::Daily => date.format("%Y-%m-%d").to_string(),
        PeriodFilter::Weekly => {
            let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
            monday.format("%Y-%m-%d").to_string()
        }
        PeriodFilter::Monthly => date.format("%Y-%m").to_string(),
    }
}

/// Group tasks by creation period, keys ascending.
pub fn aggregate_by_period(tasks: &[Task], period: PeriodFilter) -> Vec<TimelineDataPoint> {
    let mut buckets: BTreeMap<String, TimelineDataPoint> = BTreeMap::new();
    for task in tasks {
        let key = period_key(task.created_at, period);
        let point = buckets
            .entry(key.clone())
            .or_insert_with(|| TimelineDataPoint { date: key, ..Default::default() });
        point.tasks_created += 1;
        point.documents_generated += task.documents_generated();
        if task.status == TaskStatus::Prototype {
            point.tasks_completed += 1;
        }
    }
    buckets.into_values().collect()
}

pub fn timeline_to_csv(timeline: &[TimelineDataPoint]) -> String {
    let mut lines = vec![CSV_HEADER.to_string()];
    lines.extend(timeline.iter().map(|p| {
        format!("{},{},{},{}", p.date, p.tasks_created, p.tasks_completed, p.documents_generated)
    }));
    lines.join("\n")
}

/// Analytics over the stores of one workspace.
#[derive(Debug, Clone)]
pub struct Analytics {
    tasks: TaskStore,
    archives: ArchiveStore,
}

impl Analytics {
    pub fn new(workspace: &Workspace) -> Self {
        Analytics {
            tasks: TaskStore::new(workspace),
            archives: ArchiveStore::new(workspace),
        }
    }

    pub fn summary(&self, project_id: &str) -> Result<DashboardSummary> {
        let tasks = self.tasks.list(project_id)?;
        let archived = self.archives.list(project_id)?.len();
        Ok(summarize(project_id, &tasks, archived))
    }

    pub fn timeline(&self, project_id: &str, period: PeriodFilter) -> Result<Vec<TimelineDataPoint>> {
        Ok(aggregate_by_period(&self.tasks.list(project_id)?, period))
    }

    /// Daily timeline as CSV.
    pub fn export_csv(&self, project_id: &str) -> Result<String> {
        Ok(timeline_to_csv(&self.timeline(project_id, PeriodFilter::Daily)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn task_at(y: i32, m: u32, d: u32, status: TaskStatus, docs: usize) -> Task {
        let at = Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap();
        let doc = |n: usize| (docs > n).then(|| "doc".to_string());
        Task {
            id: format!("{y}{m}{d}"),
            project_id: "p".into(),
            title: "t".into(),
            status,
            feature_list: String::new(),
            design_document: doc(0),
            prd: doc(1),
            prototype: doc(2),
            references: vec![],
            qa_answers: vec![],
            revisions: vec![],
            is_archived: false,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn summary_of_empty_board() {
        let s = summarize("p", &[], 0);
        assert_eq!(s.total_tasks, 0);
        assert_eq!(s.completion_rate, 0.0);
        assert_eq!(s.tasks_by_status, TasksByStatus::default());
    }

    #[test]
    fn summary_counts() {
        let tasks = vec![
            task_at(2024, 3, 4, TaskStatus::Prototype, 3),
            task_at(2024, 3, 5, TaskStatus::Design, 1),
            task_at(2024, 3, 6, TaskStatus::Featurelist, 0),
            task_at(2024, 3, 7, TaskStatus::Prototype, 2),
        ];
        let s = summarize("p", &tasks, 2);
        assert_eq!(s.total_tasks, 4);
        assert_eq!(s.tasks_by_status.prototype, 2);
        assert_eq!(s.tasks_by_status.design, 1);
        assert_eq!(s.completion_rate, 0.5);
        assert_eq!(s.documents_generated, 6);
        assert_eq!(s.archived_count, 2);

        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["tasksByStatus"]["featurelist"], 1);
        assert_eq!(json["completionRate"], 0.5);
    }

    #[test]
    fn period_keys() {
        // 2024-03-07 is a Thursday.
        let at = Utc.with_ymd_and_hms(2024, 3, 7, 23, 59, 0).unwrap();
        assert_eq!(period_key(at, PeriodFilter::Daily), "2024-03-07");
        assert_eq!(period_key(at, PeriodFilter::Weekly), "2024-03-04");
        assert_eq!(period_key(at, PeriodFilter::Monthly), "2024-03");

        let sunday = Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap();
        assert_eq!(period_key(sunday, PeriodFilter::Weekly), "2024-03-04");
        let monday = Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap();
        assert_eq!(period_key(monday, PeriodFilter::Weekly), "2024-03-11");
    }

    #[test]
    fn weekly_timeline_is_sorted() {
        let tasks = vec![
            task_at(2024, 3, 12, TaskStatus::Design, 1),
            task_at(2024, 3, 5, TaskStatus::Prototype, 3),
            task_at(2024, 3, 7, TaskStatus::Featurelist, 0),
        ];
        let timeline = aggregate_by_period(&tasks, PeriodFilter::Weekly);
        assert_eq!(
            timeline,
            vec![
                TimelineDataPoint {
                    date: "2024-03-04".into(),
                    tasks_created: 2,
                    tasks_completed: 1,
                    documents_generated: 3,
                },
                TimelineDataPoint {
                    date: "2024-03-11".into(),
                    tasks_created: 1,
                    tasks_completed: 0,
                    documents_generated: 1,
                },
            ]
        );
    }

    #[test]
    fn csv_export() {
        assert_eq!(timeline_to_csv(&[]), CSV_HEADER);
        let tasks = vec![task_at(2024, 1, 2, TaskStatus::Prototype, 2)];
        let csv = timeline_to_csv(&aggregate_by_period(&tasks, PeriodFilter::Daily));
        assert_eq!(csv, format!("{CSV_HEADER}\n2024-01-02,1,1,2"));
    }
}
