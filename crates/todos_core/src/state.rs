//! Application state and the reducer that advances it.
//!
//! `reduce` is pure: it takes the current state and one [`Action`] and returns
//! the next state. Network effects live in the controller, which reports their
//! outcome back as actions.

use crate::model::{Filter, Task, TaskId};
use std::collections::{BTreeMap, HashSet};

pub const LOAD_ERROR: &str = "Unable to load todos";
pub const ADD_ERROR: &str = "Unable to add todo";
pub const DELETE_ERROR: &str = "Can't delete todo";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

/// An in-flight call to the task service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Load,
    Create { title: String },
    Delete { id: TaskId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    LoadFailed,
    AddFailed,
    DeleteFailed,
}

impl Notice {
    pub fn message(self) -> &'static str {
        match self {
            Self::LoadFailed => LOAD_ERROR,
            Self::AddFailed => ADD_ERROR,
            Self::DeleteFailed => DELETE_ERROR,
        }
    }
}

/// The error slot. `generation` identifies which raise a timer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorNotice {
    pub notice: Notice,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    TitleChanged(String),
    RequestStarted { request: RequestId, kind: Request },
    LoadSucceeded { request: RequestId, tasks: Vec<Task> },
    LoadFailed { request: RequestId },
    CreateSucceeded { request: RequestId, task: Task },
    CreateFailed { request: RequestId },
    DeleteSucceeded { request: RequestId, id: TaskId },
    DeleteFailed { request: RequestId },
    Toggle(TaskId),
    ToggleAll,
    ClearCompleted,
    FilterSelected(Filter),
    ErrorDismissed,
    ErrorExpired { generation: u64 },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    pub tasks: Vec<Task>,
    pub filter: Filter,
    pub new_title: String,
    pub pending: BTreeMap<RequestId, Request>,
    pub error: Option<ErrorNotice>,
    generation: u64,
}

impl AppState {
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            ..Self::default()
        }
    }

    pub fn visible_tasks(&self) -> impl Iterator<Item = &Task> {
        let filter = self.filter;
        self.tasks.iter().filter(move |task| filter.matches(task))
    }

    pub fn active_count(&self) -> usize {
        self.tasks.iter().filter(|task| !task.completed).count()
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.len() - self.active_count()
    }

    pub fn all_completed(&self) -> bool {
        !self.tasks.is_empty() && self.tasks.iter().all(|task| task.completed)
    }

    pub fn is_loading(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn is_initial_load_pending(&self) -> bool {
        self.pending.values().any(|request| *request == Request::Load)
    }

    pub fn is_creating(&self) -> bool {
        self.pending
            .values()
            .any(|request| matches!(request, Request::Create { .. }))
    }

    /// True while a delete for `id` is in flight.
    pub fn is_busy(&self, id: TaskId) -> bool {
        self.pending
            .values()
            .any(|request| *request == Request::Delete { id })
    }

    pub fn can_clear_completed(&self) -> bool {
        self.completed_count() > 0 && !self.is_loading()
    }

    pub fn error_message(&self) -> Option<&'static str> {
        self.error.map(|error| error.notice.message())
    }

    fn raise(&mut self, notice: Notice) {
        self.generation += 1;
        self.error = Some(ErrorNotice {
            notice,
            generation: self.generation,
        });
    }
}

pub fn reduce(mut state: AppState, action: Action) -> AppState {
    match action {
        Action::TitleChanged(title) => state.new_title = title,
        Action::RequestStarted { request, kind } => {
            state.pending.insert(request, kind);
        }
        Action::LoadSucceeded { request, tasks } => {
            state.pending.remove(&request);
            state.tasks = dedup_by_id(tasks);
            state.error = None;
        }
        Action::LoadFailed { request } => {
            state.pending.remove(&request);
            state.raise(Notice::LoadFailed);
        }
        Action::CreateSucceeded { request, task } => {
            state.pending.remove(&request);
            if !state.tasks.iter().any(|existing| existing.id == task.id) {
                state.tasks.push(task);
            }
            state.new_title.clear();
        }
        Action::CreateFailed { request } => {
            state.pending.remove(&request);
            state.raise(Notice::AddFailed);
        }
        Action::DeleteSucceeded { request, id } => {
            state.pending.remove(&request);
            state.tasks.retain(|task| task.id != id);
        }
        Action::DeleteFailed { request } => {
            state.pending.remove(&request);
            state.raise(Notice::DeleteFailed);
        }
        Action::Toggle(id) => {
            if let Some(task) = state.tasks.iter_mut().find(|task| task.id == id) {
                task.completed = !task.completed;
            }
        }
        Action::ToggleAll => {
            let complete = !state.all_completed();
            for task in &mut state.tasks {
                task.completed = complete;
            }
        }
        Action::ClearCompleted => state.tasks.retain(|task| !task.completed),
        Action::FilterSelected(filter) => state.filter = filter,
        Action::ErrorDismissed => state.error = None,
        Action::ErrorExpired { generation } => {
            if state.error.map(|error| error.generation) == Some(generation) {
                state.error = None;
            }
        }
    }

    state
}

fn dedup_by_id(tasks: Vec<Task>) -> Vec<Task> {
    let mut seen = HashSet::with_capacity(tasks.len());
    tasks.into_iter().filter(|task| seen.insert(task.id)).collect()
}
