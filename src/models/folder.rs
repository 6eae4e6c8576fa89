use serde::{Deserialize, Serialize};

/// 文件夹（用户自定义的题目分组）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub folder_id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub sort_order: i64,
}

/// 新建 / 重命名文件夹的请求体
#[derive(Debug, Clone, Serialize)]
pub struct FolderName {
    pub name: String,
}
