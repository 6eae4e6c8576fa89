//! 做题流程 - 流程层
//!
//! 核心职责：定义"一轮做题"的完整流程
//!
//! 流程顺序：
//! 1. 按简单筛选或保存的学习会话取题，保存做题列表
//! 2. 打开当前题目 → 开始计时 → 提示 / 作答 → 查看答案
//! 3. 判定对错并提交 → 下一题，列表做完后清除进度

use crate::clients::{OdapClient, ProblemQuery};
use crate::error::{AppError, AppResult, ValidationError};
use crate::models::{Hint, Problem, ProblemWithHints, SolveSubmission, StatusFilter, StudySession};
use crate::services::{AttemptState, AttemptTimer, PlaylistStore, SharedAttempt, SolveAttempt, SolvePlaylist};
use crate::workflow::solve_ctx::SolveCtx;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};

/// 做题流程需要的后端能力
#[async_trait]
pub trait SolveBackend: Send + Sync {
    async fn problems(&self, query: &ProblemQuery) -> AppResult<Vec<Problem>>;
    async fn session_problems(&self, study_session_id: i64) -> AppResult<Vec<Problem>>;
    async fn problem(&self, problem_id: i64) -> AppResult<ProblemWithHints>;
    async fn submit(&self, problem_id: i64, submission: &SolveSubmission) -> AppResult<()>;
}

#[async_trait]
impl SolveBackend for OdapClient {
    async fn problems(&self, query: &ProblemQuery) -> AppResult<Vec<Problem>> {
        self.list_problems(query).await
    }

    async fn session_problems(&self, study_session_id: i64) -> AppResult<Vec<Problem>> {
        OdapClient::session_problems(self, study_session_id).await
    }

    async fn problem(&self, problem_id: i64) -> AppResult<ProblemWithHints> {
        self.get_problem(problem_id).await
    }

    async fn submit(&self, problem_id: i64, submission: &SolveSubmission) -> AppResult<()> {
        self.solve_problem(problem_id, submission).await
    }
}

/// 做题流程
///
/// - 同一时间只有一道题的作答和一个计时器
/// - 换题时旧计时器随 `AttemptTimer` 一起被丢弃
/// - 做题列表只通过 `PlaylistStore` 读写
pub struct SolveFlow {
    backend: Arc<dyn SolveBackend>,
    playlists: PlaylistStore,
    attempt: Option<SharedAttempt>,
    timer: Option<AttemptTimer>,
}

impl SolveFlow {
    pub fn new(backend: Arc<dyn SolveBackend>, playlists: PlaylistStore) -> Self {
        Self {
            backend,
            playlists,
            attempt: None,
            timer: None,
        }
    }

    /// 按简单筛选开始做题，返回第一题的 ID
    pub async fn start_simple(&mut self, query: &ProblemQuery) -> AppResult<i64> {
        let problems = self.backend.problems(query).await?;
        let playlist = Self::build_playlist(&problems, query.status)?;
        self.begin(playlist).await
    }

    /// 按保存的学习会话开始做题
    pub async fn start_session(&mut self, session: &StudySession) -> AppResult<i64> {
        let problems = self.backend.session_problems(session.study_session_id).await?;
        let playlist =
            Self::build_playlist(&problems, session.mode)?.with_session(session.study_session_id);
        self.begin(playlist).await
    }

    /// 继续上次保存的进度，没有进度时返回 None
    pub async fn resume(&mut self) -> AppResult<Option<i64>> {
        let Some(playlist) = self.playlists.load()? else {
            return Ok(None);
        };
        let Some(problem_id) = playlist.current() else {
            warn!("⚠️ 做题进度游标越界，已清除");
            self.playlists.clear()?;
            return Ok(None);
        };
        info!(
            "继续上次进度: 第 {}/{} 题",
            playlist.position().0,
            playlist.position().1
        );
        self.open(problem_id).await?;
        Ok(Some(problem_id))
    }

    fn build_playlist(problems: &[Problem], status: StatusFilter) -> AppResult<SolvePlaylist> {
        let ids = problems.iter().map(|p| p.problem_id).collect();
        SolvePlaylist::new(ids, status).inspect_err(|_| {
            warn!("⚠️ 没有符合条件的题目（{}）", status.label());
        })
    }

    async fn begin(&mut self, playlist: SolvePlaylist) -> AppResult<i64> {
        let first = playlist.current().ok_or(ValidationError::EmptyPlaylist)?;
        crate::utils::logging::log_run_start(playlist.problem_ids.len(), playlist.status.label());
        self.playlists.save(&playlist)?;
        self.open(first).await?;
        Ok(first)
    }

    /// 打开一道题，作答回到 NotStarted
    ///
    /// 题目在列表中时同步列表游标
    pub async fn open(&mut self, problem_id: i64) -> AppResult<()> {
        self.timer = None;

        let problem = self.backend.problem(problem_id).await?;
        let playlist = self.playlists.load()?;
        let study_session_id = playlist.as_ref().and_then(|p| p.study_session_id);

        if let Some(mut playlist) = playlist {
            if playlist.current() != Some(problem_id) && playlist.seek(problem_id) {
                self.playlists.save(&playlist)?;
            }
        }

        self.attempt = Some(Arc::new(Mutex::new(SolveAttempt::new(problem, study_session_id))));
        Ok(())
    }

    /// 当前题目的上下文
    pub fn ctx(&self) -> Option<SolveCtx> {
        let problem_id = self.with_attempt("ctx", |a| Ok(a.problem_id())).ok()?;
        let playlist = self.playlists.load().ok().flatten();
        let (position, total) = playlist.as_ref().map(|p| p.position()).unwrap_or((1, 1));
        Some(SolveCtx {
            problem_id,
            position,
            total,
            status: playlist.as_ref().map(|p| p.status).unwrap_or_default(),
            study_session_id: playlist.and_then(|p| p.study_session_id),
        })
    }

    pub fn attempt(&self) -> Option<SharedAttempt> {
        self.attempt.clone()
    }

    pub fn state(&self) -> Option<AttemptState> {
        self.with_attempt("state", |a| Ok(a.state())).ok()
    }

    /// 开始作答并启动计时器
    pub fn start(&mut self) -> AppResult<()> {
        self.with_attempt("start", |a| a.start())?;
        if let Some(attempt) = &self.attempt {
            self.timer = Some(AttemptTimer::spawn(attempt.clone()));
        }
        Ok(())
    }

    pub fn toggle_pause(&self) -> AppResult<AttemptState> {
        self.with_attempt("toggle_pause", |a| a.toggle_pause())
    }

    pub fn reveal_next_hint(&self) -> AppResult<Option<Hint>> {
        self.with_attempt("reveal_hint", |a| Ok(a.reveal_next_hint()?.cloned()))
    }

    pub fn set_solution(&self, solution: &str) -> AppResult<()> {
        self.with_attempt("edit_solution", |a| a.set_solution(solution))
    }

    pub fn attach_image(&self, image: Option<String>) -> AppResult<()> {
        self.with_attempt("attach_image", |a| a.attach_image(image))
    }

    /// 查看答案，计时器随之停止；返回答案图片地址
    pub fn check_answer(&mut self) -> AppResult<Option<String>> {
        let answer = self.with_attempt("check_answer", |a| Ok(a.check_answer()?.map(String::from)))?;
        self.timer = None;
        Ok(answer)
    }

    /// 判定对错并提交
    ///
    /// 提交失败时作答保持 AnswerRevealed，可以重新提交
    pub async fn submit_grade(&self, is_correct: bool) -> AppResult<()> {
        let (problem_id, submission) =
            self.with_attempt("grade", |a| Ok((a.problem_id(), a.grade(is_correct)?)))?;

        match self.backend.submit(problem_id, &submission).await {
            Ok(()) => {
                self.with_attempt("mark_graded", |a| a.mark_graded())?;
                info!(
                    "✓ 题目 #{} 已提交: {} 用时 {}s",
                    problem_id,
                    if is_correct { "正确" } else { "错误" },
                    submission.time_spent
                );
                Ok(())
            }
            Err(e) => {
                error!("❌ 题目 #{} 提交失败: {}", problem_id, e);
                Err(e)
            }
        }
    }

    /// 下一题
    ///
    /// 只能在提交成功后调用；列表做完时清除进度并返回 None（回到选择页）
    ///
    /// 下一题打开失败时游标不动，再次调用会重试同一道题
    pub async fn next(&mut self) -> AppResult<Option<i64>> {
        self.with_attempt("next", |a| match a.state() {
            AttemptState::Graded => Ok(()),
            other => Err(AppError::invalid_transition(other.name(), "next")),
        })?;

        match self.playlists.peek_next()? {
            Some(next) => {
                self.open(next).await?;
                Ok(Some(next))
            }
            None => {
                self.playlists.finish()?;
                self.close();
                Ok(None)
            }
        }
    }

    /// 放弃本轮做题，清除保存的进度
    pub fn abandon(&mut self) -> AppResult<()> {
        self.close();
        self.playlists.clear()
    }

    fn close(&mut self) {
        self.timer = None;
        self.attempt = None;
    }

    fn with_attempt<R>(
        &self,
        action: &'static str,
        f: impl FnOnce(&mut SolveAttempt) -> AppResult<R>,
    ) -> AppResult<R> {
        let attempt = self
            .attempt
            .as_ref()
            .ok_or_else(|| AppError::invalid_transition("no_problem", action))?;
        let mut guard = attempt.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut *guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::infrastructure::MemoryStore;
    use std::collections::HashMap;

    #[derive(Default)]
    struct FakeBackend {
        problems: Vec<i64>,
        sessions: HashMap<i64, Vec<i64>>,
        fail_submit: Mutex<bool>,
        fail_fetch: Mutex<Option<i64>>,
        submitted: Mutex<Vec<(i64, SolveSubmission)>>,
    }

    fn problem(id: i64) -> Problem {
        serde_json::from_value(serde_json::json!({
            "problem_id": id,
            "title": format!("문제 {}", id),
            "answer_image_url": format!("https://cdn/{}-a.png", id),
        }))
        .unwrap()
    }

    #[async_trait]
    impl SolveBackend for FakeBackend {
        async fn problems(&self, _query: &ProblemQuery) -> AppResult<Vec<Problem>> {
            Ok(self.problems.iter().map(|&id| problem(id)).collect())
        }

        async fn session_problems(&self, study_session_id: i64) -> AppResult<Vec<Problem>> {
            Ok(self
                .sessions
                .get(&study_session_id)
                .map(|ids| ids.iter().map(|&id| problem(id)).collect())
                .unwrap_or_default())
        }

        async fn problem(&self, problem_id: i64) -> AppResult<ProblemWithHints> {
            let mut fail_fetch = self.fail_fetch.lock().unwrap();
            if *fail_fetch == Some(problem_id) {
                *fail_fetch = None;
                return Err(AppError::Api(ApiError::BadResponse {
                    endpoint: format!("/problems/{}", problem_id),
                    status: 500,
                    detail: None,
                }));
            }
            Ok(ProblemWithHints {
                problem: problem(problem_id),
                hints: Vec::new(),
            })
        }

        async fn submit(&self, problem_id: i64, submission: &SolveSubmission) -> AppResult<()> {
            if *self.fail_submit.lock().unwrap() {
                return Err(AppError::Api(ApiError::BadResponse {
                    endpoint: format!("/problems/{}/solve", problem_id),
                    status: 500,
                    detail: None,
                }));
            }
            self.submitted
                .lock()
                .unwrap()
                .push((problem_id, submission.clone()));
            Ok(())
        }
    }

    fn flow(backend: Arc<FakeBackend>) -> (SolveFlow, PlaylistStore) {
        let playlists = PlaylistStore::new(Arc::new(MemoryStore::new()));
        (SolveFlow::new(backend, playlists.clone()), playlists)
    }

    fn session(id: i64) -> StudySession {
        serde_json::from_value(serde_json::json!({
            "study_session_id": id, "name": "복습", "mode": "wrong"
        }))
        .unwrap()
    }

    async fn solve_current(flow: &mut SolveFlow, correct: bool) {
        flow.start().unwrap();
        flow.set_solution("x = 1").unwrap();
        flow.check_answer().unwrap();
        flow.submit_grade(correct).await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_result_stores_nothing() {
        let backend = Arc::new(FakeBackend::default());
        let (mut flow, playlists) = flow(backend);

        let err = flow.start_simple(&ProblemQuery::default()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ValidationError::EmptyPlaylist)));
        assert!(playlists.load().unwrap().is_none());
        assert!(flow.state().is_none());
    }

    #[tokio::test]
    async fn test_run_through_playlist() {
        let backend = Arc::new(FakeBackend {
            problems: vec![101, 102],
            ..Default::default()
        });
        let (mut flow, playlists) = flow(backend.clone());

        assert_eq!(flow.start_simple(&ProblemQuery::default()).await.unwrap(), 101);
        assert_eq!(flow.state(), Some(AttemptState::NotStarted));
        assert_eq!(playlists.load().unwrap().unwrap().problem_ids, vec![101, 102]);

        solve_current(&mut flow, true).await;
        assert_eq!(flow.next().await.unwrap(), Some(102));
        assert_eq!(flow.state(), Some(AttemptState::NotStarted));
        assert_eq!(flow.ctx().unwrap().position, 2);

        solve_current(&mut flow, false).await;
        assert_eq!(flow.next().await.unwrap(), None);
        assert!(playlists.load().unwrap().is_none());
        assert!(flow.state().is_none());

        let submitted = backend.submitted.lock().unwrap();
        assert_eq!(submitted.len(), 2);
        assert!(submitted[0].1.is_correct);
        assert!(!submitted[1].1.is_correct);
        assert_eq!(submitted[1].1.solution, "x = 1");
    }

    #[tokio::test]
    async fn test_failed_submit_stays_answer_revealed() {
        let backend = Arc::new(FakeBackend {
            problems: vec![7],
            fail_submit: Mutex::new(true),
            ..Default::default()
        });
        let (mut flow, _) = flow(backend.clone());
        flow.start_simple(&ProblemQuery::default()).await.unwrap();

        flow.start().unwrap();
        assert_eq!(flow.check_answer().unwrap().as_deref(), Some("https://cdn/7-a.png"));
        assert!(flow.submit_grade(true).await.is_err());
        assert_eq!(flow.state(), Some(AttemptState::AnswerRevealed));
        assert!(flow.next().await.is_err());

        *backend.fail_submit.lock().unwrap() = false;
        flow.submit_grade(true).await.unwrap();
        assert_eq!(flow.state(), Some(AttemptState::Graded));
    }

    #[tokio::test]
    async fn test_failed_fetch_on_next_keeps_cursor() {
        let backend = Arc::new(FakeBackend {
            problems: vec![101, 102, 103],
            ..Default::default()
        });
        let (mut flow, playlists) = flow(backend.clone());
        flow.start_simple(&ProblemQuery::default()).await.unwrap();
        solve_current(&mut flow, true).await;

        *backend.fail_fetch.lock().unwrap() = Some(102);
        assert!(flow.next().await.is_err());
        assert_eq!(playlists.load().unwrap().unwrap().current_index, 0);
        assert_eq!(flow.state(), Some(AttemptState::Graded));

        assert_eq!(flow.next().await.unwrap(), Some(102));
        assert_eq!(playlists.load().unwrap().unwrap().current_index, 1);
        assert_eq!(flow.ctx().unwrap().problem_id, 102);
    }

    #[tokio::test]
    async fn test_session_run_carries_session_id() {
        let backend = Arc::new(FakeBackend {
            sessions: HashMap::from([(5, vec![31, 32])]),
            ..Default::default()
        });
        let (mut flow, playlists) = flow(backend.clone());

        assert_eq!(flow.start_session(&session(5)).await.unwrap(), 31);
        let saved = playlists.load().unwrap().unwrap();
        assert_eq!(saved.status, StatusFilter::Wrong);
        assert_eq!(saved.study_session_id, Some(5));

        solve_current(&mut flow, true).await;
        assert_eq!(backend.submitted.lock().unwrap()[0].1.study_session_id, Some(5));
        assert!(flow.start_session(&session(9)).await.is_err());
    }

    #[tokio::test]
    async fn test_resume_opens_saved_cursor() {
        let backend = Arc::new(FakeBackend::default());
        let (mut flow, playlists) = flow(backend);
        assert_eq!(flow.resume().await.unwrap(), None);

        let mut playlist = SolvePlaylist::new(vec![1, 2, 3], StatusFilter::All).unwrap();
        playlist.advance();
        playlists.save(&playlist).unwrap();

        assert_eq!(flow.resume().await.unwrap(), Some(2));
        assert_eq!(flow.ctx().unwrap().to_string(), "[题目 #2 2/3 全部]");

        flow.abandon().unwrap();
        assert!(playlists.load().unwrap().is_none());
    }
}
