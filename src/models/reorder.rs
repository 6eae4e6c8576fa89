use clap::ValueEnum;
use serde::Serialize;

use super::{Curriculum, Folder, Problem};

/// 可以拖拽排序的实体
pub trait Rankable: Clone + Send + Sync + 'static {
    /// 实体 ID
    fn id(&self) -> i64;

    /// 写入新的排序位置
    fn set_sort_order(&mut self, sort_order: i64);
}

/// 批量排序请求的目标资源
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReorderResource {
    Folders,
    Curriculums,
    Problems,
}

impl ReorderResource {
    /// `PUT {path}` 的路径
    pub fn path(self) -> &'static str {
        match self {
            ReorderResource::Folders => "/folders/reorder",
            ReorderResource::Curriculums => "/curriculums/reorder",
            ReorderResource::Problems => "/problems/reorder",
        }
    }

    /// 请求体中 ID 字段的名字
    pub fn id_field(self) -> &'static str {
        match self {
            ReorderResource::Folders => "folder_id",
            ReorderResource::Curriculums => "curriculum_id",
            ReorderResource::Problems => "problem_id",
        }
    }
}

/// 一条 (ID, 新位置)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReorderItem {
    pub id: i64,
    pub sort_order: i64,
}

impl ReorderItem {
    /// 按资源类型生成请求体中的一项，例如 `{"folder_id": 3, "sort_order": 0}`
    pub fn to_wire(self, resource: ReorderResource) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        map.insert(resource.id_field().to_string(), self.id.into());
        map.insert("sort_order".to_string(), self.sort_order.into());
        serde_json::Value::Object(map)
    }
}

#[derive(Serialize)]
#[serde(transparent)]
pub(crate) struct ReorderBody(pub Vec<serde_json::Value>);

impl ReorderBody {
    pub(crate) fn new(resource: ReorderResource, items: &[ReorderItem]) -> Self {
        Self(items.iter().map(|item| item.to_wire(resource)).collect())
    }
}

impl Rankable for Folder {
    fn id(&self) -> i64 {
        self.folder_id
    }

    fn set_sort_order(&mut self, sort_order: i64) {
        self.sort_order = sort_order;
    }
}

impl Rankable for Curriculum {
    fn id(&self) -> i64 {
        self.curriculum_id
    }

    fn set_sort_order(&mut self, sort_order: i64) {
        self.sort_order = sort_order;
    }
}

impl Rankable for Problem {
    fn id(&self) -> i64 {
        self.problem_id
    }

    fn set_sort_order(&mut self, sort_order: i64) {
        self.sort_order = sort_order;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_uses_resource_id_field() {
        let body = ReorderBody::new(
            ReorderResource::Curriculums,
            &[ReorderItem { id: 4, sort_order: 0 }, ReorderItem { id: 2, sort_order: 1 }],
        );
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!([
                {"curriculum_id": 4, "sort_order": 0},
                {"curriculum_id": 2, "sort_order": 1}
            ])
        );
    }
}
