//! Root controller: owns the [`AppState`], runs service calls and feeds their
//! outcome back through the reducer.
//!
//! Each call is tracked as its own pending request, so overlapping operations
//! never clear each other's loading state. The error slot owns one timer; a new
//! error re-arms it and a manual dismiss cancels it.

use crate::model::{Filter, Task, TaskId};
use crate::state::{Action, AppState, Request, RequestId, reduce};
use crate::task_api::TaskService;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

struct ErrorTimer {
    delay: Duration,
    sender: mpsc::UnboundedSender<u64>,
    handle: Option<JoinHandle<()>>,
}

impl ErrorTimer {
    fn arm(&mut self, generation: u64) {
        self.cancel();
        let sender = self.sender.clone();
        let deadline = Instant::now() + self.delay;
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let _ = sender.send(generation);
        }));
    }

    fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for ErrorTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Outcome of submitting the new-task field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// The trimmed title was empty; nothing was sent.
    Skipped,
    Created(Task),
    Failed,
}

pub struct Controller<S> {
    service: S,
    state: AppState,
    next_request: u64,
    timer: ErrorTimer,
    expired: mpsc::UnboundedReceiver<u64>,
}

impl<S> Controller<S> {
    pub fn new(service: S, error_timeout: Duration) -> Self {
        let (sender, expired) = mpsc::unbounded_channel();
        Self {
            service,
            state: AppState::default(),
            next_request: 0,
            timer: ErrorTimer {
                delay: error_timeout,
                sender,
                handle: None,
            },
            expired,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn set_new_title<T: Into<String>>(&mut self, title: T) {
        self.dispatch(Action::TitleChanged(title.into()));
    }

    /// Local only; the service is not told.
    pub fn toggle_task(&mut self, id: TaskId) {
        self.dispatch(Action::Toggle(id));
    }

    pub fn toggle_all(&mut self) {
        self.dispatch(Action::ToggleAll);
    }

    pub fn clear_completed(&mut self) {
        let removed = self.state.completed_count();
        self.dispatch(Action::ClearCompleted);
        tracing::debug!(removed, "cleared completed tasks locally");
    }

    pub fn select_filter(&mut self, filter: Filter) {
        self.dispatch(Action::FilterSelected(filter));
    }

    pub fn dismiss_error(&mut self) {
        self.dispatch(Action::ErrorDismissed);
    }

    /// Waits for the error timer and applies its expiry. Yields true when the
    /// expiry cleared the notice; a stale generation leaves it in place.
    pub async fn next_expiry(&mut self) -> Option<bool> {
        let generation = self.expired.recv().await?;
        let showing = self.state.error.is_some();
        self.dispatch(Action::ErrorExpired { generation });
        Some(showing && self.state.error.is_none())
    }

    /// Applies timer expiries that have already fired. Returns how many.
    pub fn drain_expired(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(generation) = self.expired.try_recv() {
            self.dispatch(Action::ErrorExpired { generation });
            applied += 1;
        }
        applied
    }

    fn begin(&mut self, kind: Request) -> RequestId {
        self.next_request += 1;
        let request = RequestId(self.next_request);
        self.dispatch(Action::RequestStarted { request, kind });
        request
    }

    fn dispatch(&mut self, action: Action) {
        let previous = self.state.error.map(|error| error.generation);
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, action);

        match self.state.error {
            Some(error) if previous != Some(error.generation) => {
                tracing::debug!(generation = error.generation, "error timer armed");
                self.timer.arm(error.generation);
            }
            None if previous.is_some() => self.timer.cancel(),
            _ => {}
        }
    }
}

impl<S: TaskService> Controller<S> {
    pub async fn load(&mut self) {
        let request = self.begin(Request::Load);
        match self.service.list_tasks().await {
            Ok(tasks) => {
                tracing::info!(count = tasks.len(), "loaded tasks");
                self.dispatch(Action::LoadSucceeded { request, tasks });
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load tasks");
                self.dispatch(Action::LoadFailed { request });
            }
        }
    }

    /// Submits the current new-task title.
    pub async fn submit_new_task(&mut self) -> Submission {
        let title = self.state.new_title.trim().to_string();
        if title.is_empty() {
            return Submission::Skipped;
        }

        let request = self.begin(Request::Create {
            title: title.clone(),
        });
        match self.service.create_task(&title).await {
            Ok(task) => {
                tracing::info!(id = task.id, "created task");
                self.dispatch(Action::CreateSucceeded {
                    request,
                    task: task.clone(),
                });
                Submission::Created(task)
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to create task");
                self.dispatch(Action::CreateFailed { request });
                Submission::Failed
            }
        }
    }

    pub async fn add_task<T: Into<String>>(&mut self, title: T) -> Submission {
        self.set_new_title(title);
        self.submit_new_task().await
    }

    pub async fn delete_task(&mut self, id: TaskId) {
        let request = self.begin(Request::Delete { id });
        match self.service.delete_task(id).await {
            Ok(()) => {
                tracing::info!(id, "deleted task");
                self.dispatch(Action::DeleteSucceeded { request, id });
            }
            Err(err) => {
                tracing::warn!(id, error = %err, "failed to delete task");
                self.dispatch(Action::DeleteFailed { request });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Controller, Submission};
    use crate::error::AppError;
    use crate::model::{Filter, Task, TaskId};
    use crate::state::{ADD_ERROR, DELETE_ERROR, LOAD_ERROR};
    use crate::task_api::TaskService;
    use std::cell::{Cell, RefCell};
    use std::time::Duration;

    const TIMEOUT: Duration = Duration::from_millis(3000);

    #[derive(Default)]
    struct FakeService {
        tasks: RefCell<Vec<Task>>,
        next_id: Cell<u64>,
        fail_list: Cell<bool>,
        fail_create: Cell<bool>,
        fail_delete: Cell<bool>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeService {
        fn with_tasks(tasks: Vec<Task>) -> Self {
            let next_id = tasks.iter().map(|task| task.id).max().unwrap_or(0);
            let service = Self::default();
            service.tasks.replace(tasks);
            service.next_id.set(next_id);
            service
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl TaskService for FakeService {
        async fn list_tasks(&self) -> Result<Vec<Task>, AppError> {
            self.calls.borrow_mut().push("list".into());
            if self.fail_list.get() {
                return Err(AppError::transport("connection refused"));
            }
            Ok(self.tasks.borrow().clone())
        }

        async fn create_task(&self, title: &str) -> Result<Task, AppError> {
            self.calls.borrow_mut().push(format!("create {title}"));
            if self.fail_create.get() {
                return Err(AppError::status(500, "boom"));
            }
            self.next_id.set(self.next_id.get() + 1);
            let task = Task {
                id: self.next_id.get(),
                user_id: 1608,
                title: title.to_string(),
                completed: false,
            };
            self.tasks.borrow_mut().push(task.clone());
            Ok(task)
        }

        async fn delete_task(&self, id: TaskId) -> Result<(), AppError> {
            self.calls.borrow_mut().push(format!("delete {id}"));
            if self.fail_delete.get() {
                return Err(AppError::status(404, "gone"));
            }
            self.tasks.borrow_mut().retain(|task| task.id != id);
            Ok(())
        }
    }

    fn task(id: u64, title: &str, completed: bool) -> Task {
        Task {
            id,
            user_id: 1608,
            title: title.to_string(),
            completed,
        }
    }

    async fn loaded() -> Controller<FakeService> {
        let service = FakeService::with_tasks(vec![task(1, "a", false), task(2, "b", true)]);
        let mut controller = Controller::new(service, TIMEOUT);
        controller.load().await;
        controller
    }

    #[tokio::test]
    async fn load_replaces_collection_in_server_order() {
        let controller = loaded().await;

        assert_eq!(
            controller.state().tasks,
            vec![task(1, "a", false), task(2, "b", true)]
        );
        assert!(!controller.state().is_loading());
        assert!(controller.state().error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn load_failure_shows_error_until_timeout() {
        let service = FakeService::default();
        service.fail_list.set(true);
        let mut controller = Controller::new(service, TIMEOUT);

        controller.load().await;
        let raised_at = tokio::time::Instant::now();
        assert_eq!(controller.state().error_message(), Some(LOAD_ERROR));
        assert!(!controller.state().is_loading());

        tokio::time::advance(Duration::from_millis(2999)).await;
        assert_eq!(controller.drain_expired(), 0);
        assert_eq!(controller.state().error_message(), Some(LOAD_ERROR));

        assert_eq!(controller.next_expiry().await, Some(true));
        assert!(controller.state().error.is_none());
        assert!(raised_at.elapsed() >= TIMEOUT);
    }

    #[tokio::test]
    async fn add_appends_created_task_and_clears_input() {
        let mut controller = loaded().await;

        let submission = controller.add_task("  buy milk ").await;

        let last = controller.state().tasks.last().cloned().unwrap();
        assert_eq!(submission, Submission::Created(last.clone()));
        assert_eq!(last.title, "buy milk");
        assert!(!last.completed);
        assert_eq!(controller.state().tasks.len(), 3);
        assert!(controller.state().new_title.is_empty());
        assert_eq!(controller.service().calls(), vec!["list", "create buy milk"]);
    }

    #[tokio::test]
    async fn blank_title_is_ignored_without_a_request() {
        let mut controller = loaded().await;
        let before = controller.state().clone();

        let submission = controller.add_task("   ").await;

        assert_eq!(submission, Submission::Skipped);
        assert_eq!(controller.state().tasks, before.tasks);
        assert!(controller.state().error.is_none());
        assert_eq!(controller.service().calls(), vec!["list"]);
    }

    #[tokio::test(start_paused = true)]
    async fn add_failure_keeps_collection_and_shows_error() {
        let mut controller = loaded().await;
        controller.service().fail_create.set(true);

        let submission = controller.add_task("c").await;

        assert_eq!(submission, Submission::Failed);
        assert_eq!(controller.state().tasks.len(), 2);
        assert_eq!(controller.state().new_title, "c");
        assert_eq!(controller.state().error_message(), Some(ADD_ERROR));
    }

    #[tokio::test]
    async fn add_with_duplicate_id_reports_the_server_task() {
        let mut controller = loaded().await;
        controller.service().next_id.set(0);

        let submission = controller.add_task("c").await;

        assert_eq!(submission, Submission::Created(task(1, "c", false)));
        assert_eq!(
            controller.state().tasks,
            vec![task(1, "a", false), task(2, "b", true)]
        );
    }

    #[tokio::test]
    async fn delete_removes_task_and_disables_clear_completed() {
        let mut controller = loaded().await;
        assert!(controller.state().can_clear_completed());

        controller.delete_task(2).await;

        assert_eq!(controller.state().tasks, vec![task(1, "a", false)]);
        assert!(!controller.state().can_clear_completed());
    }

    #[tokio::test]
    async fn delete_of_unknown_id_is_a_local_no_op() {
        let mut controller = loaded().await;

        controller.delete_task(42).await;

        assert_eq!(controller.state().tasks.len(), 2);
        assert!(controller.state().error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn delete_failure_keeps_task_and_shows_error() {
        let mut controller = loaded().await;
        controller.service().fail_delete.set(true);

        controller.delete_task(1).await;

        assert_eq!(controller.state().tasks.len(), 2);
        assert_eq!(controller.state().error_message(), Some(DELETE_ERROR));
        assert!(!controller.state().is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn newer_error_outlives_the_older_timer() {
        let service = FakeService::with_tasks(vec![task(1, "a", false)]);
        service.fail_list.set(true);
        service.fail_delete.set(true);
        let mut controller = Controller::new(service, TIMEOUT);

        controller.load().await;
        tokio::time::advance(Duration::from_millis(2000)).await;
        controller.delete_task(1).await;
        tokio::time::advance(Duration::from_millis(1500)).await;
        tokio::task::yield_now().await;

        controller.drain_expired();
        assert_eq!(controller.state().error_message(), Some(DELETE_ERROR));

        assert_eq!(controller.next_expiry().await, Some(true));
        assert!(controller.state().error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn dismiss_cancels_the_timer() {
        let service = FakeService::default();
        service.fail_list.set(true);
        let mut controller = Controller::new(service, TIMEOUT);

        controller.load().await;
        controller.dismiss_error();
        assert!(controller.state().error.is_none());

        tokio::time::advance(Duration::from_millis(5000)).await;
        tokio::task::yield_now().await;
        assert_eq!(controller.drain_expired(), 0);
    }

    #[tokio::test]
    async fn local_operations_never_reach_the_service() {
        let mut controller = loaded().await;

        controller.toggle_task(1);
        controller.toggle_all();
        assert_eq!(controller.state().active_count(), 2);
        controller.toggle_all();
        controller.select_filter(Filter::Active);
        controller.clear_completed();

        assert_eq!(controller.service().calls(), vec!["list"]);
        assert!(controller.state().tasks.is_empty());
        assert_eq!(controller.service().tasks.borrow().len(), 2);
    }
}
