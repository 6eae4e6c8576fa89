use serde::{Deserialize, Serialize};

/// 课程节点：1 = 科目，2 = 单元，3 = 小单元
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curriculum {
    pub curriculum_id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    pub level: u8,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default)]
    pub created_at: String,
}

/// 新建 / 修改课程节点的请求体
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurriculumCreate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    pub level: u8,
    pub sort_order: i64,
}
