//! 作答计时器
//!
//! 每次作答只有一个每秒触发的任务，计时器被丢弃或换题时立即取消

use crate::services::solve_attempt::SolveAttempt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// 共享的作答状态
pub type SharedAttempt = Arc<Mutex<SolveAttempt>>;

/// 作答计时器
pub struct AttemptTimer {
    problem_id: i64,
    handle: JoinHandle<()>,
}

impl AttemptTimer {
    /// 每秒调用一次 `SolveAttempt::tick`
    pub fn spawn(attempt: SharedAttempt) -> Self {
        Self::spawn_with_period(attempt, Duration::from_secs(1))
    }

    pub fn spawn_with_period(attempt: SharedAttempt, period: Duration) -> Self {
        let problem_id = attempt.lock().map(|a| a.problem_id()).unwrap_or_default();
        debug!("启动计时器: 题目 #{}", problem_id);

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.tick().await;
            loop {
                interval.tick().await;
                match attempt.lock() {
                    Ok(mut attempt) => attempt.tick(),
                    Err(_) => break,
                }
            }
        });

        Self { problem_id, handle }
    }

    pub fn problem_id(&self) -> i64 {
        self.problem_id
    }
}

impl Drop for AttemptTimer {
    fn drop(&mut self) {
        debug!("取消计时器: 题目 #{}", self.problem_id);
        self.handle.abort();
    }
}
