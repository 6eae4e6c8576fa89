/// OdapClean API 客户端
///
/// 每个 REST 操作一个带类型的方法，全部经过 `ApiTransport`
use crate::error::AppResult;
use crate::infrastructure::ApiTransport;
use crate::models::reorder::ReorderBody;
use crate::models::{
    CropRect, Curriculum, CurriculumCreate, Folder, FolderName, ImageFile, NewProblem, Problem,
    ProblemSort, ProblemUpdate, ProblemWithHints, ReorderItem, ReorderResource, SolveSubmission,
    StatisticsResponse, StatusFilter, StudySession, StudySessionCreate, Token, UserCreate,
};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde_json::Value as JsonValue;
use tracing::{debug, info};

/// `GET /problems` 的查询条件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProblemQuery {
    pub status: StatusFilter,
    pub folder_id: Option<i64>,
    pub curriculum_id: Option<i64>,
    pub sort_by: ProblemSort,
}

impl ProblemQuery {
    /// 转成查询参数，未选择的条件不发送
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("status", self.status.as_str().to_string()),
            ("sort_by", self.sort_by.as_str().to_string()),
        ];
        if let Some(folder_id) = self.folder_id {
            params.push(("folder_id", folder_id.to_string()));
        }
        if let Some(curriculum_id) = self.curriculum_id {
            params.push(("curriculum_id", curriculum_id.to_string()));
        }
        params
    }
}

/// OdapClean API 客户端
#[derive(Clone)]
pub struct OdapClient {
    transport: ApiTransport,
}

impl OdapClient {
    pub fn new(transport: ApiTransport) -> Self {
        Self { transport }
    }

    // ========== 认证 ==========

    /// 登录，返回 token（不负责保存）
    pub async fn login(&self, username: &str, password: &str) -> AppResult<Token> {
        debug!("登录: {}", username);
        self.transport
            .post_form("/token", &[("username", username), ("password", password)])
            .await
    }

    pub async fn register(&self, user: &UserCreate) -> AppResult<JsonValue> {
        self.transport.send_json(Method::POST, "/register", user).await
    }

    // ========== 文件夹 ==========

    pub async fn list_folders(&self) -> AppResult<Vec<Folder>> {
        self.transport.get_json("/folders", &[]).await
    }

    pub async fn create_folder(&self, name: &str) -> AppResult<Folder> {
        let body = FolderName { name: name.to_string() };
        self.transport.send_json(Method::POST, "/folders", &body).await
    }

    pub async fn update_folder(&self, folder_id: i64, name: &str) -> AppResult<Folder> {
        let body = FolderName { name: name.to_string() };
        self.transport
            .send_json(Method::PUT, &format!("/folders/{}", folder_id), &body)
            .await
    }

    pub async fn delete_folder(&self, folder_id: i64) -> AppResult<()> {
        self.transport.delete(&format!("/folders/{}", folder_id)).await
    }

    // ========== 课程 ==========

    pub async fn list_curriculums(&self) -> AppResult<Vec<Curriculum>> {
        self.transport.get_json("/curriculums", &[]).await
    }

    pub async fn create_curriculum(&self, curriculum: &CurriculumCreate) -> AppResult<Curriculum> {
        self.transport
            .send_json(Method::POST, "/curriculums", curriculum)
            .await
    }

    pub async fn update_curriculum(
        &self,
        curriculum_id: i64,
        curriculum: &CurriculumCreate,
    ) -> AppResult<Curriculum> {
        self.transport
            .send_json(
                Method::PUT,
                &format!("/curriculums/{}", curriculum_id),
                curriculum,
            )
            .await
    }

    pub async fn delete_curriculum(&self, curriculum_id: i64) -> AppResult<()> {
        self.transport
            .delete(&format!("/curriculums/{}", curriculum_id))
            .await
    }

    // ========== 题目 ==========

    pub async fn list_problems(&self, query: &ProblemQuery) -> AppResult<Vec<Problem>> {
        self.transport.get_json("/problems", &query.to_params()).await
    }

    pub async fn get_problem(&self, problem_id: i64) -> AppResult<ProblemWithHints> {
        self.transport
            .get_json(&format!("/problems/{}", problem_id), &[])
            .await
    }

    /// 新建题目（multipart，两张图片必填）
    pub async fn create_problem(&self, problem: &NewProblem) -> AppResult<Problem> {
        let mut form = Form::new().text("title", problem.title.clone());
        if let Some(folder_id) = problem.folder_id {
            form = form.text("folder_id", folder_id.to_string());
        }
        if let Some(curriculum_id) = problem.curriculum_id {
            form = form.text("curriculum_id", curriculum_id.to_string());
        }
        if !problem.hints.is_empty() {
            form = form.text("hints", problem.hints_field());
        }
        form = form
            .part("content_image", image_part(&problem.content_image)?)
            .part("answer_image", image_part(&problem.answer_image)?);

        let created: Problem = self.transport.post_multipart("/problems", form).await?;
        info!("✓ 题目已创建: #{} {}", created.problem_id, created.title);
        Ok(created)
    }

    pub async fn update_problem(&self, problem_id: i64, update: &ProblemUpdate) -> AppResult<Problem> {
        self.transport
            .send_json(Method::PUT, &format!("/problems/{}", problem_id), update)
            .await
    }

    pub async fn delete_problem(&self, problem_id: i64) -> AppResult<()> {
        self.transport
            .delete(&format!("/problems/{}", problem_id))
            .await
    }

    /// 提交做题结果
    pub async fn solve_problem(&self, problem_id: i64, submission: &SolveSubmission) -> AppResult<()> {
        self.transport
            .send_json_unit(
                Method::POST,
                &format!("/problems/{}/solve", problem_id),
                submission,
            )
            .await
    }

    // ========== 排序 ==========

    /// 批量写入排序位置
    pub async fn reorder(&self, resource: ReorderResource, items: &[ReorderItem]) -> AppResult<()> {
        let body = ReorderBody::new(resource, items);
        self.transport
            .send_json_unit(Method::PUT, resource.path(), &body)
            .await
    }

    // ========== 学习会话 ==========

    pub async fn list_sessions(&self) -> AppResult<Vec<StudySession>> {
        self.transport.get_json("/sessions", &[]).await
    }

    pub async fn create_session(&self, session: &StudySessionCreate) -> AppResult<StudySession> {
        self.transport
            .send_json(Method::POST, "/sessions", session)
            .await
    }

    pub async fn delete_session(&self, study_session_id: i64) -> AppResult<()> {
        self.transport
            .delete(&format!("/sessions/{}", study_session_id))
            .await
    }

    pub async fn session_problems(&self, study_session_id: i64) -> AppResult<Vec<Problem>> {
        self.transport
            .get_json(&format!("/sessions/{}/problems", study_session_id), &[])
            .await
    }

    // ========== 统计 / 工具 ==========

    pub async fn statistics(&self) -> AppResult<StatisticsResponse> {
        self.transport.get_json("/statistics", &[]).await
    }

    /// 让后端检测图片中的题目区域，返回原图坐标
    pub async fn auto_crop(&self, image: &ImageFile) -> AppResult<CropRect> {
        let form = Form::new().part("file", image_part(image)?);
        self.transport.post_multipart("/utils/auto-crop", form).await
    }
}

fn image_part(image: &ImageFile) -> AppResult<Part> {
    Part::bytes(image.bytes.clone())
        .file_name(image.file_name.clone())
        .mime_str(&image.content_type)
        .map_err(|e| crate::error::AppError::api_request_failed("multipart", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_query_omits_unselected_filters() {
        let query = ProblemQuery {
            status: StatusFilter::Wrong,
            folder_id: Some(3),
            ..Default::default()
        };
        assert_eq!(
            query.to_params(),
            vec![
                ("status", "wrong".to_string()),
                ("sort_by", "date_desc".to_string()),
                ("folder_id", "3".to_string()),
            ]
        );
    }
}
