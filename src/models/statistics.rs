use serde::Deserialize;

/// 按文件夹 / 按课程的统计条目
#[derive(Debug, Clone, Deserialize)]
pub struct BreakdownItem {
    #[serde(alias = "folder_id", alias = "curriculum_id")]
    pub id: i64,
    pub name: String,
    pub total: u64,
    pub solved: u64,
    pub correct: u64,
    pub correct_rate: f64,
}

/// `GET /statistics` 的响应
#[derive(Debug, Clone, Deserialize)]
pub struct StatisticsResponse {
    pub total_problems: u64,
    pub solved_count: u64,
    pub correct_count: u64,
    pub correct_rate: f64,
    #[serde(default)]
    pub by_folder: Vec<BreakdownItem>,
    #[serde(default)]
    pub by_curriculum: Vec<BreakdownItem>,
}
