//! Kanban column layout and stage transitions.

use crate::fields::TaskStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KanbanColumn {
    pub status: TaskStatus,
    pub title: &'static str,
    /// Entering this column by forward movement requests a generated document.
    pub triggers_generation: bool,
}

pub static KANBAN_COLUMNS: [KanbanColumn; 4] = [
    KanbanColumn { status: TaskStatus::Featurelist, title: "Feature List", triggers_generation: false },
    KanbanColumn { status: TaskStatus::Design, title: "Design Doc", triggers_generation: true },
    KanbanColumn { status: TaskStatus::Prd, title: "PRD", triggers_generation: true },
    KanbanColumn { status: TaskStatus::Prototype, title: "Prototype", triggers_generation: true },
];

pub fn column(status: TaskStatus) -> &'static KanbanColumn {
    &KANBAN_COLUMNS[column_index(status)]
}

pub fn column_index(status: TaskStatus) -> usize {
    match status {
        TaskStatus::Featurelist => 0,
        TaskStatus::Design => 1,
        TaskStatus::Prd => 2,
        TaskStatus::Prototype => 3,
    }
}

pub fn next_status(status: TaskStatus) -> Option<TaskStatus> {
    KANBAN_COLUMNS.get(column_index(status) + 1).map(|c| c.status)
}

pub fn previous_status(status: TaskStatus) -> Option<TaskStatus> {
    column_index(status).checked_sub(1).map(|i| KANBAN_COLUMNS[i].status)
}

pub fn is_forward_movement(from: TaskStatus, to: TaskStatus) -> bool {
    column_index(to) > column_index(from)
}

pub fn triggers_generation(from: TaskStatus, to: TaskStatus) -> bool {
    is_forward_movement(from, to) && column(to).triggers_generation
}

#[cfg(test)]
mod tests {
    use super::*;
    use TaskStatus::*;

    #[test]
    fn columns_follow_status_order() {
        for (i, col) in KANBAN_COLUMNS.iter().enumerate() {
            assert_eq!(column_index(col.status), i);
            assert_eq!(TaskStatus::ALL[i], col.status);
        }
        assert_eq!(column(Prd).title, "PRD");
    }

    #[test]
    fn neighbours() {
        assert_eq!(next_status(Featurelist), Some(Design));
        assert_eq!(next_status(Prototype), None);
        assert_eq!(previous_status(Featurelist), None);
        assert_eq!(previous_status(Prototype), Some(Prd));
    }

    #[test]
    fn generation_only_on_forward_moves() {
        assert!(triggers_generation(Featurelist, Design));
        assert!(triggers_generation(Featurelist, Prototype));
        assert!(!triggers_generation(Prd, Design));
        assert!(!triggers_generation(Design, Design));
        assert!(!triggers_generation(Design, Featurelist));
        assert!(is_forward_movement(Design, Prd));
        assert!(!is_forward_movement(Prd, Prd));
    }
}
