use crate::error::AppError;
use crate::http::HttpClient;
use crate::model::{NewTask, Task, TaskId};
use std::future::Future;

/// Remote task operations the controller depends on.
pub trait TaskService {
    fn list_tasks(&self) -> impl Future<Output = Result<Vec<Task>, AppError>>;

    fn create_task(&self, title: &str) -> impl Future<Output = Result<Task, AppError>>;

    fn delete_task(&self, id: TaskId) -> impl Future<Output = Result<(), AppError>>;
}

/// Task endpoints of the REST service, scoped to one owner.
#[derive(Debug, Clone)]
pub struct TaskApi {
    client: HttpClient,
    user_id: u64,
}

impl TaskApi {
    pub fn new(client: HttpClient, user_id: u64) -> Self {
        Self { client, user_id }
    }
}

pub fn list_path(user_id: u64) -> String {
    format!("/todos?userId={user_id}")
}

pub fn item_path(id: TaskId) -> String {
    format!("/todos/{id}")
}

impl TaskService for TaskApi {
    async fn list_tasks(&self) -> Result<Vec<Task>, AppError> {
        self.client.get(&list_path(self.user_id)).await
    }

    async fn create_task(&self, title: &str) -> Result<Task, AppError> {
        let body = NewTask::new(self.user_id, title);
        self.client.post("/todos", &body).await
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), AppError> {
        self.client.delete(&item_path(id)).await
    }
}
