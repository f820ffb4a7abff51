use serde::{Deserialize, Serialize};

pub type TaskId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub user_id: u64,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

/// Body of a create request; the server assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub user_id: u64,
    pub title: String,
    pub completed: bool,
}

impl NewTask {
    pub fn new<T: Into<String>>(user_id: u64, title: T) -> Self {
        Self {
            user_id,
            title: title.into(),
            completed: false,
        }
    }
}
