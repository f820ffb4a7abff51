//! Pure views over [`AppState`].
//!
//! Serialized field names are the stable hooks external tooling looks for.

use crate::model::{Filter, TaskId};
use crate::state::AppState;
use serde::Serialize;

pub const NEW_TODO_PLACEHOLDER: &str = "What needs to be done?";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToggleAllButton {
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTodoField {
    pub value: String,
    pub placeholder: &'static str,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderView {
    #[serde(rename = "ToggleAllButton")]
    pub toggle_all: ToggleAllButton,
    #[serde(rename = "NewTodoField")]
    pub new_todo: NewTodoField,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodoRow {
    pub id: TaskId,
    #[serde(rename = "TodoStatus")]
    pub completed: bool,
    #[serde(rename = "TodoTitle")]
    pub title: String,
    #[serde(rename = "TodoLoader")]
    pub loading: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterLink {
    pub hook: &'static str,
    pub label: &'static str,
    pub href: &'static str,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClearCompletedButton {
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FooterView {
    #[serde(rename = "TodosCounter")]
    pub counter: String,
    #[serde(rename = "Filter")]
    pub filters: Vec<FilterLink>,
    #[serde(rename = "ClearCompletedButton")]
    pub clear_completed: ClearCompletedButton,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationView {
    pub message: String,
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Screen {
    pub header: HeaderView,
    #[serde(rename = "Loader")]
    pub loading: bool,
    #[serde(rename = "TodoList")]
    pub todos: Vec<TodoRow>,
    #[serde(rename = "Footer")]
    pub footer: Option<FooterView>,
    #[serde(rename = "ErrorNotification")]
    pub notification: NotificationView,
}

pub fn header_view(state: &AppState) -> HeaderView {
    HeaderView {
        toggle_all: ToggleAllButton {
            active: state.all_completed(),
        },
        new_todo: NewTodoField {
            value: state.new_title.clone(),
            placeholder: NEW_TODO_PLACEHOLDER,
            disabled: state.is_creating(),
        },
    }
}

pub fn list_view(state: &AppState) -> Vec<TodoRow> {
    state
        .visible_tasks()
        .map(|task| TodoRow {
            id: task.id,
            completed: task.completed,
            title: task.title.clone(),
            loading: state.is_busy(task.id),
        })
        .collect()
}

pub fn counter_text(active: usize) -> String {
    format!("{active} items left")
}

fn filter_hook(filter: Filter) -> &'static str {
    match filter {
        Filter::All => "FilterLinkAll",
        Filter::Active => "FilterLinkActive",
        Filter::Completed => "FilterLinkCompleted",
    }
}

/// `None` while the collection is empty.
pub fn footer_view(state: &AppState) -> Option<FooterView> {
    if state.tasks.is_empty() {
        return None;
    }

    let filters = Filter::ALL
        .iter()
        .map(|&filter| FilterLink {
            hook: filter_hook(filter),
            label: filter.label(),
            href: filter.href(),
            selected: filter == state.filter,
        })
        .collect();

    Some(FooterView {
        counter: counter_text(state.active_count()),
        filters,
        clear_completed: ClearCompletedButton {
            disabled: !state.can_clear_completed(),
        },
    })
}

pub fn notification_view(state: &AppState) -> NotificationView {
    match state.error_message() {
        Some(message) => NotificationView {
            message: message.to_string(),
            hidden: false,
        },
        None => NotificationView {
            message: String::new(),
            hidden: true,
        },
    }
}

pub fn screen(state: &AppState) -> Screen {
    let loading = state.is_initial_load_pending();
    Screen {
        header: header_view(state),
        loading,
        todos: if loading { Vec::new() } else { list_view(state) },
        footer: if loading { None } else { footer_view(state) },
        notification: notification_view(state),
    }
}
