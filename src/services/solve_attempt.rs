//! 单题作答状态机 - 业务能力层
//!
//! ```text
//! NotStarted → Running ⇄ Paused → AnswerRevealed → Graded
//! ```
//!
//! 只处理一道题的一次作答，不关心做题列表

use crate::error::{AppError, AppResult};
use crate::models::{Hint, ProblemWithHints, SolveSubmission};
use std::fmt;

/// 作答状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    /// 题目已加载，计时未开始
    NotStarted,
    /// 计时中
    Running,
    /// 暂停，计时冻结
    Paused,
    /// 已看答案，计时永久冻结
    AnswerRevealed,
    /// 已判定对错并提交成功
    Graded,
}

impl AttemptState {
    pub fn name(self) -> &'static str {
        match self {
            AttemptState::NotStarted => "not_started",
            AttemptState::Running => "running",
            AttemptState::Paused => "paused",
            AttemptState::AnswerRevealed => "answer_revealed",
            AttemptState::Graded => "graded",
        }
    }
}

impl fmt::Display for AttemptState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 一次作答
#[derive(Debug, Clone)]
pub struct SolveAttempt {
    problem: ProblemWithHints,
    hints: Vec<Hint>,
    study_session_id: Option<i64>,
    state: AttemptState,
    elapsed_secs: u64,
    revealed: usize,
    solution: String,
    attachment: Option<String>,
}

impl SolveAttempt {
    pub fn new(problem: ProblemWithHints, study_session_id: Option<i64>) -> Self {
        let hints = problem.ordered_hints();
        Self {
            problem,
            hints,
            study_session_id,
            state: AttemptState::NotStarted,
            elapsed_secs: 0,
            revealed: 0,
            solution: String::new(),
            attachment: None,
        }
    }

    pub fn problem(&self) -> &ProblemWithHints {
        &self.problem
    }

    pub fn problem_id(&self) -> i64 {
        self.problem.problem.problem_id
    }

    pub fn state(&self) -> AttemptState {
        self.state
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn solution(&self) -> &str {
        &self.solution
    }

    pub fn attachment(&self) -> Option<&str> {
        self.attachment.as_deref()
    }

    pub fn hint_count(&self) -> usize {
        self.hints.len()
    }

    /// 已揭示的提示（按步骤顺序）
    pub fn revealed_hints(&self) -> &[Hint] {
        &self.hints[..self.revealed]
    }

    /// 计时器每秒调用一次，只在 Running 时累加
    pub fn tick(&mut self) {
        if self.state == AttemptState::Running {
            self.elapsed_secs += 1;
        }
    }

    /// 开始作答（只能由用户主动触发）
    pub fn start(&mut self) -> AppResult<()> {
        self.require(&[AttemptState::NotStarted], "start")?;
        self.state = AttemptState::Running;
        Ok(())
    }

    /// 暂停 / 继续
    pub fn toggle_pause(&mut self) -> AppResult<AttemptState> {
        self.state = match self.state {
            AttemptState::Running => AttemptState::Paused,
            AttemptState::Paused => AttemptState::Running,
            other => return Err(AppError::invalid_transition(other.name(), "toggle_pause")),
        };
        Ok(self.state)
    }

    /// 揭示下一条提示，全部揭示后返回 None
    pub fn reveal_next_hint(&mut self) -> AppResult<Option<&Hint>> {
        self.require(&[AttemptState::Running, AttemptState::Paused], "reveal_hint")?;
        if self.revealed >= self.hints.len() {
            return Ok(None);
        }
        self.revealed += 1;
        Ok(self.hints.get(self.revealed - 1))
    }

    pub fn set_solution(&mut self, solution: impl Into<String>) -> AppResult<()> {
        self.require(&[AttemptState::Running, AttemptState::Paused], "edit_solution")?;
        self.solution = solution.into();
        Ok(())
    }

    /// 附加解题过程图片（路径或 URL）
    pub fn attach_image(&mut self, image: Option<String>) -> AppResult<()> {
        self.require(&[AttemptState::Running, AttemptState::Paused], "attach_image")?;
        self.attachment = image;
        Ok(())
    }

    /// 查看答案，之后不能再回到计时状态；返回答案图片地址
    pub fn check_answer(&mut self) -> AppResult<Option<&str>> {
        self.require(&[AttemptState::Running, AttemptState::Paused], "check_answer")?;
        self.state = AttemptState::AnswerRevealed;
        Ok(self.problem.problem.answer_image_url.as_deref())
    }

    /// 生成判定对错的提交内容，状态保持 AnswerRevealed 直到 `mark_graded`
    pub fn grade(&self, is_correct: bool) -> AppResult<SolveSubmission> {
        self.require(&[AttemptState::AnswerRevealed], "grade")?;
        Ok(SolveSubmission {
            solution: self.solution.clone(),
            is_correct,
            time_spent: self.elapsed_secs,
            study_session_id: self.study_session_id,
            image_url: self.attachment.clone(),
        })
    }

    /// 后端确认提交成功后调用
    pub fn mark_graded(&mut self) -> AppResult<()> {
        self.require(&[AttemptState::AnswerRevealed], "mark_graded")?;
        self.state = AttemptState::Graded;
        Ok(())
    }

    fn require(&self, allowed: &[AttemptState], action: &'static str) -> AppResult<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(AppError::invalid_transition(self.state.name(), action))
        }
    }
}
