use super::problem::StatusFilter;
use serde::{Deserialize, Serialize};

/// 保存下来的学习会话（一个带名字的筛选条件）
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StudySession {
    pub study_session_id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    pub name: String,
    pub mode: StatusFilter,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub curriculum_ids: Vec<i64>,
    #[serde(default)]
    pub folder_ids: Vec<i64>,
}

/// `POST /sessions` 请求体
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudySessionCreate {
    pub name: String,
    pub mode: StatusFilter,
    pub curriculum_ids: Vec<i64>,
    pub folder_ids: Vec<i64>,
}
