//! 做题上下文
//!
//! 封装"我正在做列表里的第几题"这一信息

use crate::models::StatusFilter;
use std::fmt::Display;

/// 做题上下文
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveCtx {
    /// 题目ID
    pub problem_id: i64,

    /// 题目在列表中的位置（从1开始）
    pub position: usize,

    /// 列表题目总数
    pub total: usize,

    /// 列表的来源筛选
    pub status: StatusFilter,

    /// 学习会话ID（简单筛选开始时为空）
    pub study_session_id: Option<i64>,
}

impl SolveCtx {
    pub fn is_last(&self) -> bool {
        self.position >= self.total
    }
}

impl Display for SolveCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[题目 #{} {}/{} {}",
            self.problem_id,
            self.position,
            self.total,
            self.status.label()
        )?;
        if let Some(id) = self.study_session_id {
            write!(f, " 会话#{}", id)?;
        }
        write!(f, "]")
    }
}
