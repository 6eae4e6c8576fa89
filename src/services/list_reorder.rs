//! 拖拽排序服务 - 业务能力层
//!
//! 只负责"把一项拖到另一项的位置并保存顺序"，文件夹、课程、题目各用一个实例
//!
//! 顺序先在本地更新，再异步发送一次批量排序请求。请求失败只记日志：
//! 不回滚本地顺序，也不提示用户，下次重新加载列表时以后端为准。

use crate::clients::OdapClient;
use crate::error::AppResult;
use crate::models::{Rankable, ReorderItem, ReorderResource};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// 批量保存排序的能力
#[async_trait]
pub trait ReorderBackend: Send + Sync {
    async fn reorder(&self, resource: ReorderResource, items: Vec<ReorderItem>) -> AppResult<()>;
}

#[async_trait]
impl ReorderBackend for OdapClient {
    async fn reorder(&self, resource: ReorderResource, items: Vec<ReorderItem>) -> AppResult<()> {
        OdapClient::reorder(self, resource, &items).await
    }
}

/// 拖拽结束事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragEnd {
    /// 被拖动的项
    pub active: i64,
    /// 放下位置上的项，拖到列表外为 None
    pub over: Option<i64>,
}

/// 单元素移动：先移除 `from` 处的元素，再插入到 `to`
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from == to || from >= items.len() || to >= items.len() {
        return;
    }
    let item = items.remove(from);
    items.insert(to, item);
}

/// 按当前下标生成连续的 0 起排序位置
pub fn reorder_items<T: Rankable>(items: &[T]) -> Vec<ReorderItem> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| ReorderItem {
            id: item.id(),
            sort_order: index as i64,
        })
        .collect()
}

/// 拖拽排序控制器
///
/// 对当前显示的整个扁平列表排序，课程也不按父节点分组
pub struct ListReorder<T: Rankable> {
    resource: ReorderResource,
    items: Vec<T>,
    backend: Arc<dyn ReorderBackend>,
}

impl<T: Rankable> ListReorder<T> {
    pub fn new(resource: ReorderResource, items: Vec<T>, backend: Arc<dyn ReorderBackend>) -> Self {
        Self {
            resource,
            items,
            backend,
        }
    }

    /// 当前显示顺序
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// 处理拖拽结束
    ///
    /// 拖到自身、拖到列表外或 ID 不在列表中时什么都不做，返回 None。
    /// 否则立即更新本地顺序，并返回后台保存任务的句柄。
    pub fn on_drag_end(&mut self, event: DragEnd) -> Option<JoinHandle<()>> {
        let over = event.over?;
        if over == event.active {
            return None;
        }

        let old_index = self.items.iter().position(|item| item.id() == event.active)?;
        let new_index = self.items.iter().position(|item| item.id() == over)?;

        move_item(&mut self.items, old_index, new_index);

        let ranks = reorder_items(&self.items);
        for (item, rank) in self.items.iter_mut().zip(&ranks) {
            item.set_sort_order(rank.sort_order);
        }

        debug!(
            "{:?} 排序: #{} 从 {} 移到 {}",
            self.resource, event.active, old_index, new_index
        );

        let backend = self.backend.clone();
        let resource = self.resource;
        Some(tokio::spawn(async move {
            if let Err(e) = backend.reorder(resource, ranks).await {
                warn!("⚠️ {:?} 排序保存失败（本地顺序保留）: {}", resource, e);
            }
        }))
    }
}
