//! Task Entity and Sorting
//!
//! A task's identity is its position in the canonical, insertion-ordered
//! list. Sorted views are derived per render and carry each task's
//! original index back to the caller so mutations keep addressing the
//! right storage slot.

use serde::{Deserialize, Serialize};

/// A single planner task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Task text content
    pub title: String,
    /// Completion status (missing in stored data = false)
    #[serde(default)]
    pub is_completed: bool,
}

impl Task {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            is_completed: false,
        }
    }
}

/// Display ordering for the task list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Insertion order
    #[default]
    Added,
    /// Ascending by title
    Alphabetical,
    /// Incomplete tasks first
    Completed,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Added => "added",
            SortOrder::Alphabetical => "alphabetical",
            SortOrder::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "alphabetical" => SortOrder::Alphabetical,
            "completed" => SortOrder::Completed,
            _ => SortOrder::Added,
        }
    }
}

/// One row of a sorted view: the task plus the index it held in the
/// canonical list before sorting. Ephemeral, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    pub task: Task,
    pub original_index: usize,
}

/// Produce a sorted view of `tasks` without mutating the input.
///
/// All orderings are stable: tasks that compare equal keep their original
/// relative order, so repeated re-sorts never shuffle ties.
pub fn sorted_view(tasks: &[Task], order: SortOrder) -> Vec<DisplayRow> {
    let mut rows: Vec<DisplayRow> = tasks
        .iter()
        .cloned()
        .enumerate()
        .map(|(original_index, task)| DisplayRow {
            task,
            original_index,
        })
        .collect();

    match order {
        SortOrder::Added => {}
        SortOrder::Alphabetical => rows.sort_by(|a, b| a.task.title.cmp(&b.task.title)),
        SortOrder::Completed => rows.sort_by_key(|row| row.task.is_completed),
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(title: &str, done: bool) -> Task {
        Task {
            title: title.to_string(),
            is_completed: done,
        }
    }

    #[test]
    fn test_added_is_identity() {
        let tasks = vec![task("b", true), task("a", false), task("c", false)];
        let rows = sorted_view(&tasks, SortOrder::Added);
        assert_eq!(rows.len(), 3);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.original_index, i);
            assert_eq!(row.task, tasks[i]);
        }
    }

    #[test]
    fn test_alphabetical_is_sorted_and_stable() {
        let tasks = vec![
            task("pear", false),
            task("apple", true),
            task("apple", false),
            task("fig", false),
        ];
        let rows = sorted_view(&tasks, SortOrder::Alphabetical);
        let titles: Vec<&str> = rows.iter().map(|r| r.task.title.as_str()).collect();
        assert_eq!(titles, vec!["apple", "apple", "fig", "pear"]);
        // Equal titles keep original relative order.
        assert_eq!(rows[0].original_index, 1);
        assert_eq!(rows[1].original_index, 2);
    }

    #[test]
    fn test_completed_puts_incomplete_first() {
        // Worked example from the planner contract.
        let tasks = vec![task("A", false), task("B", true), task("C", false)];
        let rows = sorted_view(&tasks, SortOrder::Completed);
        let got: Vec<(usize, bool)> = rows
            .iter()
            .map(|r| (r.original_index, r.task.is_completed))
            .collect();
        assert_eq!(got, vec![(0, false), (2, false), (1, true)]);
    }

    #[test]
    fn test_original_index_round_trip() {
        let mut tasks = vec![task("b", false), task("a", false), task("c", true)];
        let rows = sorted_view(&tasks, SortOrder::Alphabetical);
        // Toggle the task shown at display row 0 ("a").
        let target = rows[0].original_index;
        tasks[target].is_completed = !tasks[target].is_completed;
        assert!(tasks[1].is_completed);
        assert!(!tasks[0].is_completed);
    }

    #[test]
    fn test_input_not_mutated() {
        let tasks = vec![task("z", false), task("a", false)];
        let before = tasks.clone();
        let _ = sorted_view(&tasks, SortOrder::Alphabetical);
        assert_eq!(tasks, before);
    }

    #[test]
    fn test_sort_order_serialization() {
        assert_eq!(SortOrder::Alphabetical.as_str(), "alphabetical");
        assert_eq!(SortOrder::from_str("completed"), SortOrder::Completed);
        // Unknown values decode to the default order.
        assert_eq!(SortOrder::from_str("by_color"), SortOrder::Added);
    }

    #[test]
    fn test_missing_completed_flag_decodes_false() {
        let parsed: Task = serde_json::from_str(r#"{"title":"read"}"#).unwrap();
        assert!(!parsed.is_completed);
    }
}
