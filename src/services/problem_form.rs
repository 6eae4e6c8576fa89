//! 题目 / 文件夹 / 会话表单校验
//!
//! 所有必填项在发请求之前检查，不通过时不会发出任何请求

use crate::error::{AppError, AppResult, ValidationError};
use crate::models::{ImageFile, NewProblem, ProblemUpdate, StatusFilter, StudySessionCreate};

/// 新建 / 编辑题目的表单
#[derive(Debug, Clone, Default)]
pub struct ProblemDraft {
    pub title: String,
    pub folder_id: Option<i64>,
    pub curriculum_id: Option<i64>,
    hints: Vec<String>,
    pub content_image: Option<ImageFile>,
    pub answer_image: Option<ImageFile>,
}

impl ProblemDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn hints(&self) -> &[String] {
        &self.hints
    }

    /// 添加一条提示，空白内容忽略
    pub fn add_hint(&mut self, hint: &str) -> bool {
        let hint = hint.trim();
        if hint.is_empty() {
            return false;
        }
        self.hints.push(hint.to_string());
        true
    }

    pub fn remove_hint(&mut self, index: usize) -> Option<String> {
        (index < self.hints.len()).then(|| self.hints.remove(index))
    }

    /// 新建题目前的校验：标题必填，题目图片和答案图片都必须有
    pub fn validate_for_create(&self) -> AppResult<NewProblem> {
        let title = required(&self.title, "标题")?;
        let content_image = self
            .content_image
            .clone()
            .ok_or(ValidationError::MissingImage { missing: "题目图片" })?;
        let answer_image = self
            .answer_image
            .clone()
            .ok_or(ValidationError::MissingImage { missing: "答案图片" })?;

        Ok(NewProblem {
            title,
            folder_id: self.folder_id,
            curriculum_id: self.curriculum_id,
            hints: self.hints.clone(),
            content_image,
            answer_image,
        })
    }

    /// 编辑题目前的校验：只要求标题
    pub fn validate_for_update(&self) -> AppResult<ProblemUpdate> {
        Ok(ProblemUpdate {
            title: Some(required(&self.title, "标题")?),
            folder_id: self.folder_id,
            curriculum_id: self.curriculum_id,
            ..Default::default()
        })
    }
}

/// 文件夹名称
pub fn validate_folder_name(name: &str) -> AppResult<String> {
    required(name, "文件夹名称")
}

/// 课程名称（父节点由 `CurriculumFilter::validate_parent` 校验）
pub fn validate_curriculum_name(name: &str) -> AppResult<String> {
    required(name, "课程名称")
}

/// 新建学习会话
pub fn validate_session(
    name: &str,
    mode: StatusFilter,
    curriculum_ids: Vec<i64>,
    folder_ids: Vec<i64>,
) -> AppResult<StudySessionCreate> {
    Ok(StudySessionCreate {
        name: required(name, "会话名称")?,
        mode,
        curriculum_ids,
        folder_ids,
    })
}

/// 多选框切换：已选则移除，未选则追加
pub fn toggle_selection(selected: &mut Vec<i64>, id: i64) {
    match selected.iter().position(|&s| s == id) {
        Some(index) => {
            selected.remove(index);
        }
        None => selected.push(id),
    }
}

fn required(value: &str, field: &'static str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::missing_field(field));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(name: &str) -> ImageFile {
        ImageFile::new(name, vec![0xff, 0xd8])
    }

    #[test]
    fn test_create_with_both_images_and_no_hints() {
        let mut draft = ProblemDraft::new(" 이차방정식 ");
        draft.content_image = Some(image("q.jpg"));
        draft.answer_image = Some(image("a.jpg"));

        let problem = draft.validate_for_create().unwrap();
        assert_eq!(problem.title(), "이차방정식");
        assert_eq!(problem.hints_field(), "");
    }

    #[test]
    fn test_create_without_answer_image_is_blocked() {
        let mut draft = ProblemDraft::new("제목");
        draft.content_image = Some(image("q.jpg"));

        let err = draft.validate_for_create().unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::MissingImage { missing: "答案图片" })
        ));
    }

    #[test]
    fn test_title_is_required() {
        let mut draft = ProblemDraft::new("   ");
        draft.content_image = Some(image("q.jpg"));
        draft.answer_image = Some(image("a.jpg"));
        assert!(draft.validate_for_create().is_err());
        assert!(draft.validate_for_update().is_err());
    }

    #[test]
    fn test_hints_are_trimmed_joined_and_removable() {
        let mut draft = ProblemDraft::new("t");
        assert!(draft.add_hint(" 인수분해 "));
        assert!(!draft.add_hint("   "));
        assert!(draft.add_hint("근의 공식"));
        assert!(draft.add_hint("검산"));
        assert_eq!(draft.remove_hint(2).as_deref(), Some("검산"));
        assert_eq!(draft.remove_hint(5), None);

        draft.content_image = Some(image("q.jpg"));
        draft.answer_image = Some(image("a.jpg"));
        assert_eq!(draft.validate_for_create().unwrap().hints_field(), "인수분해,근의 공식");
    }

    #[test]
    fn test_session_and_folder_names_required() {
        assert!(validate_folder_name("").is_err());
        assert_eq!(validate_folder_name(" 오답 ").unwrap(), "오답");
        assert!(validate_session(" ", StatusFilter::All, vec![], vec![]).is_err());
    }

    #[test]
    fn test_toggle_selection() {
        let mut selected = vec![1, 2];
        toggle_selection(&mut selected, 2);
        toggle_selection(&mut selected, 3);
        assert_eq!(selected, vec![1, 3]);
    }
}
