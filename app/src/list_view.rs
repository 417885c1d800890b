//! Row model for the task list.
//!
//! A list widget reports clicks by index. [`ListView::press`] turns that index
//! into the id of the row as it was shown, so a reload or delete that lands
//! between render and click cannot retarget the click.

use crate::screens::MainAction;
use crate::task::{Task, TaskId};
use crate::task_list::{LoadStatus, TaskListState};
use std::fmt;

/// One rendered task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskRow {
    /// Task behind the row
    pub id: TaskId,
    /// Title as stored
    pub title: String,
    /// Completion flag
    pub done: bool,
    /// Title is drawn struck through
    pub strikethrough: bool,
    /// The "mark done" control accepts input
    pub mark_done_enabled: bool,
}

impl TaskRow {
    /// Row for `task`
    #[must_use]
    pub fn new(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            done: task.done,
            strikethrough: task.done,
            mark_done_enabled: !task.done,
        }
    }
}

/// Controls on a row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowIntent {
    /// "Done" button
    MarkDone,
    /// "Delete" button
    Delete,
}

/// Snapshot of the list as shown to the user.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListView {
    /// Rows in list order
    pub rows: Vec<TaskRow>,
    /// Message shown above the rows when the last load failed
    pub banner: Option<String>,
    /// A load is in flight
    pub loading: bool,
}

impl ListView {
    /// Render the presenter state.
    #[must_use]
    pub fn render(state: &TaskListState) -> Self {
        let rows = state.tasks.iter().map(TaskRow::new).collect();

        let banner = match &state.status {
            LoadStatus::Failed(error) => Some(format!("Could not load tasks: {error}")),
            LoadStatus::Idle | LoadStatus::Loading | LoadStatus::Loaded => None,
        };

        Self {
            rows,
            banner,
            loading: state.status == LoadStatus::Loading,
        }
    }

    /// The click on row `index` of this view, or `None` past the last row.
    #[must_use]
    pub fn press(&self, index: usize, intent: RowIntent) -> Option<MainAction> {
        let row = self.rows.get(index)?;
        Some(MainAction::RowPressed {
            id: row.id.clone(),
            intent,
        })
    }

    /// Whether there are no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Combining long stroke overlay.
const STRIKE: char = '\u{0336}';

impl fmt::Display for TaskRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.done { 'x' } else { ' ' };
        write!(f, "[{mark}] ")?;
        if self.strikethrough {
            for c in self.title.chars() {
                write!(f, "{c}{STRIKE}")?;
            }
            Ok(())
        } else {
            f.write_str(&self.title)
        }
    }
}

impl fmt::Display for ListView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(banner) = &self.banner {
            writeln!(f, "! {banner}")?;
        }
        if self.loading {
            writeln!(f, "(loading...)")?;
        }
        if self.rows.is_empty() {
            return writeln!(f, "(no tasks)");
        }
        for (index, row) in self.rows.iter().enumerate() {
            writeln!(f, "{:>3}. {row}", index + 1)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn state() -> TaskListState {
        TaskListState {
            tasks: vec![
                Task::new(TaskId::new("a"), "Buy milk"),
                Task {
                    done: true,
                    ..Task::new(TaskId::new("b"), "Walk dog")
                },
            ],
            status: LoadStatus::Loaded,
            last_error: None,
        }
    }

    #[test]
    fn done_rows_are_struck_and_locked() {
        let view = ListView::render(&state());
        assert!(!view.rows[0].strikethrough);
        assert!(view.rows[0].mark_done_enabled);
        assert!(view.rows[1].strikethrough);
        assert!(!view.rows[1].mark_done_enabled);
    }

    #[test]
    fn presses_carry_ids() {
        let view = ListView::render(&state());
        assert_eq!(
            view.press(0, RowIntent::MarkDone),
            Some(MainAction::RowPressed {
                id: TaskId::new("a"),
                intent: RowIntent::MarkDone
            })
        );
        assert_eq!(
            view.press(1, RowIntent::Delete),
            Some(MainAction::RowPressed {
                id: TaskId::new("b"),
                intent: RowIntent::Delete
            })
        );
    }

    #[test]
    fn press_past_last_row_produces_nothing() {
        let view = ListView::render(&state());
        assert_eq!(view.press(2, RowIntent::Delete), None);
        assert_eq!(ListView::default().press(0, RowIntent::MarkDone), None);
    }

    #[test]
    fn press_keeps_id_of_shown_row_after_reorder() {
        let shown = ListView::render(&state());
        let mut reloaded = state();
        reloaded.tasks.reverse();

        let Some(MainAction::RowPressed { id, .. }) = shown.press(0, RowIntent::Delete) else {
            panic!("expected a row press");
        };
        assert_eq!(id, TaskId::new("a"));
        assert_eq!(ListView::render(&reloaded).rows[0].id, TaskId::new("b"));
    }

    #[test]
    fn failed_load_shows_banner() {
        let view = ListView::render(&TaskListState {
            status: LoadStatus::Failed("offline".into()),
            ..state()
        });
        assert_eq!(view.banner.as_deref(), Some("Could not load tasks: offline"));
        assert_eq!(view.rows.len(), 2);
    }

    #[test]
    fn text_rendering() {
        let text = ListView::render(&state()).to_string();
        assert!(text.contains("  1. [ ] Buy milk"));
        assert!(text.contains("  2. [x] W\u{0336}a\u{0336}"));
        assert!(ListView::render(&TaskListState::new()).to_string().contains("(no tasks)"));
    }
}
