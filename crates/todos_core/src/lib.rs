pub mod config;
pub mod controller;
pub mod error;
pub mod http;
pub mod model;
pub mod state;
pub mod task_api;
pub mod view;

#[cfg(test)]
mod tests {
    use crate::error::AppError;
    use crate::model::{NewTask, Task};

    #[test]
    fn task_uses_camel_case_wire_names() {
        let task: Task = serde_json::from_value(serde_json::json!({
            "id": 3,
            "userId": 1608,
            "title": "demo",
            "completed": true
        }))
        .unwrap();

        assert_eq!(task.id, 3);
        assert_eq!(task.user_id, 1608);
        assert_eq!(task.title, "demo");
        assert!(task.completed);
    }

    #[test]
    fn new_task_starts_incomplete() {
        let body = serde_json::to_value(NewTask::new(1608, "demo")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "userId": 1608, "title": "demo", "completed": false })
        );
    }

    #[test]
    fn app_error_exposes_code() {
        let err = AppError::status(503, "unavailable");
        assert_eq!(err.code(), "http_status");
        assert_eq!(err.to_string(), "http_status - unavailable");
    }
}
