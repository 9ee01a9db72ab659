//! Task Planner Widget
//!
//! Owns the canonical, insertion-ordered task list plus the user's chosen
//! display order. Callers render `view()` and address mutations through
//! the `original_index` carried by each display row, so actions keep
//! hitting the right task no matter how the view is sorted. Every
//! mutation schedules a debounced save.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::debounce::Debouncer;
use super::{load_or_default, WidgetContext};
use crate::domain::{sorted_view, DisplayRow, SortOrder, Task};
use crate::repository::{ConfigMap, ConfigStore};

/// Store key for the planner's configuration
pub const PLANNER_WIDGET_KEY: &str = "task_planner";

/// Mutations within this window coalesce into a single save
const SAVE_DEBOUNCE: Duration = Duration::from_millis(500);

/// Persisted planner state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlannerConfig {
    pub tasks: Vec<Task>,
    pub sort_order: SortOrder,
}

/// Task planner service
pub struct PlannerWidget {
    store: Arc<dyn ConfigStore>,
    ctx: WidgetContext,
    tasks: Vec<Task>,
    sort_order: SortOrder,
    debounce: Debouncer,
}

impl PlannerWidget {
    pub fn new(store: Arc<dyn ConfigStore>, ctx: WidgetContext) -> Self {
        Self {
            store,
            ctx,
            tasks: Vec::new(),
            sort_order: SortOrder::default(),
            debounce: Debouncer::new(SAVE_DEBOUNCE),
        }
    }

    /// Fetch saved state, falling back to defaults on failure or timeout.
    pub async fn load(&mut self) {
        let map = load_or_default(self.store.as_ref(), PLANNER_WIDGET_KEY).await;
        let config: PlannerConfig = serde_json::from_value(serde_json::Value::Object(map))
            .unwrap_or_else(|e| {
                log::warn!("planner config did not parse, using defaults: {}", e);
                PlannerConfig::default()
            });
        self.tasks = config.tasks;
        self.sort_order = config.sort_order;
    }

    /// The task list in the current display order.
    pub fn view(&self) -> Vec<DisplayRow> {
        sorted_view(&self.tasks, self.sort_order)
    }

    /// The canonical (insertion-ordered) task list.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    pub fn context(&self) -> &WidgetContext {
        &self.ctx
    }

    /// Append a task. Empty (or whitespace-only) titles are ignored.
    pub fn add_task(&mut self, title: &str) {
        let title = title.trim();
        if title.is_empty() {
            log::debug!("ignoring empty task title");
            return;
        }
        self.tasks.push(Task::new(title));
        self.queue_save();
    }

    /// Rename the task at `original_index` in the canonical list.
    pub fn edit_task(&mut self, original_index: usize, title: &str) {
        let title = title.trim();
        if title.is_empty() {
            log::debug!("ignoring empty task title");
            return;
        }
        let Some(task) = self.tasks.get_mut(original_index) else {
            log::debug!("edit_task: index {} out of range", original_index);
            return;
        };
        task.title = title.to_string();
        self.queue_save();
    }

    pub fn delete_task(&mut self, original_index: usize) {
        if original_index >= self.tasks.len() {
            log::debug!("delete_task: index {} out of range", original_index);
            return;
        }
        self.tasks.remove(original_index);
        self.queue_save();
    }

    /// Flip completion on the task at `original_index`.
    pub fn toggle_task(&mut self, original_index: usize) {
        let Some(task) = self.tasks.get_mut(original_index) else {
            log::debug!("toggle_task: index {} out of range", original_index);
            return;
        };
        task.is_completed = !task.is_completed;
        self.queue_save();
    }

    /// Reorder the canonical list, moving the task at `from` to `to`.
    pub fn move_task(&mut self, from: usize, to: usize) {
        if from >= self.tasks.len() || to >= self.tasks.len() || from == to {
            return;
        }
        let task = self.tasks.remove(from);
        self.tasks.insert(to, task);
        self.queue_save();
    }

    pub fn set_sort_order(&mut self, order: SortOrder) {
        if self.sort_order == order {
            return;
        }
        self.sort_order = order;
        self.queue_save();
    }

    fn snapshot(&self) -> ConfigMap {
        let config = PlannerConfig {
            tasks: self.tasks.clone(),
            sort_order: self.sort_order,
        };
        match serde_json::to_value(&config) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => ConfigMap::new(),
        }
    }

    /// Fire-and-forget persistence of the current state, debounced.
    fn queue_save(&self) {
        let store = Arc::clone(&self.store);
        let ctx = self.ctx.clone();
        let data = self.snapshot();
        self.debounce.schedule(async move {
            if let Err(e) = store.save(PLANNER_WIDGET_KEY, &data).await {
                log::error!("planner save failed: {}", e);
                ctx.notify_save_failed(PLANNER_WIDGET_KEY);
            }
        });
    }
}
