//! 做题列表 - 业务能力层
//!
//! 一次做题流程的本地进度：题目 ID 列表、当前位置、来源筛选模式。
//! 只保存在本地存储中，不与后端同步。

use crate::error::{AppResult, ValidationError};
use crate::infrastructure::storage::{get_json, set_json, KeyValueStore};
use crate::models::StatusFilter;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// 存储做题列表的键
pub const PLAYLIST_KEY: &str = "solveSession";

/// 做题列表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolvePlaylist {
    pub problem_ids: Vec<i64>,
    pub current_index: usize,
    pub status: StatusFilter,
    /// 从保存的学习会话开始时记录会话 ID，用于提交作答
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_session_id: Option<i64>,
}

impl SolvePlaylist {
    /// 列表为空时返回校验错误
    pub fn new(problem_ids: Vec<i64>, status: StatusFilter) -> AppResult<Self> {
        if problem_ids.is_empty() {
            return Err(ValidationError::EmptyPlaylist.into());
        }
        Ok(Self {
            problem_ids,
            current_index: 0,
            status,
            study_session_id: None,
        })
    }

    pub fn with_session(mut self, study_session_id: i64) -> Self {
        self.study_session_id = Some(study_session_id);
        self
    }

    pub fn current(&self) -> Option<i64> {
        self.problem_ids.get(self.current_index).copied()
    }

    /// 移到下一题，没有下一题时返回 None（游标不变）
    pub fn advance(&mut self) -> Option<i64> {
        let next = self.problem_ids.get(self.current_index + 1).copied()?;
        self.current_index += 1;
        Some(next)
    }

    /// 当前是第几题（从 1 开始）
    pub fn position(&self) -> (usize, usize) {
        (self.current_index + 1, self.problem_ids.len())
    }

    /// 直接打开某道题时同步游标
    pub fn seek(&mut self, problem_id: i64) -> bool {
        match self.problem_ids.iter().position(|&id| id == problem_id) {
            Some(index) => {
                self.current_index = index;
                true
            }
            None => false,
        }
    }
}

/// 做题列表的持久化
#[derive(Clone)]
pub struct PlaylistStore {
    store: Arc<dyn KeyValueStore>,
}

impl PlaylistStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn load(&self) -> AppResult<Option<SolvePlaylist>> {
        get_json(self.store.as_ref(), PLAYLIST_KEY)
    }

    pub fn save(&self, playlist: &SolvePlaylist) -> AppResult<()> {
        debug!(
            "保存做题进度: {}/{}",
            playlist.current_index + 1,
            playlist.problem_ids.len()
        );
        set_json(self.store.as_ref(), PLAYLIST_KEY, playlist)
    }

    pub fn clear(&self) -> AppResult<()> {
        self.store.remove(PLAYLIST_KEY)
    }

    /// 下一题的 ID，只读取不保存
    ///
    /// 列表做完或不存在时返回 None；游标由打开题目成功后保存
    pub fn peek_next(&self) -> AppResult<Option<i64>> {
        Ok(self.load()?.and_then(|playlist| {
            playlist
                .problem_ids
                .get(playlist.current_index + 1)
                .copied()
        }))
    }

    /// 列表做完，删除存储
    pub fn finish(&self) -> AppResult<()> {
        if let Some(playlist) = self.load()? {
            info!("✓ 做题列表已完成 ({} 题)", playlist.problem_ids.len());
        }
        self.clear()
    }
}
