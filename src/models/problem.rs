use super::ImageFile;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// 最近一次做题结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LatestStatus {
    Correct,
    Wrong,
    #[default]
    NotAttempted,
}

/// 题目列表 / 学习会话的筛选模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Wrong,
    #[value(name = "not_attempted")]
    NotAttempted,
}

impl StatusFilter {
    /// 查询参数 / 存储中的取值
    pub fn as_str(self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Wrong => "wrong",
            StatusFilter::NotAttempted => "not_attempted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "all" => Some(StatusFilter::All),
            "wrong" => Some(StatusFilter::Wrong),
            "not_attempted" => Some(StatusFilter::NotAttempted),
            _ => None,
        }
    }

    /// 显示名称
    pub fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "全部",
            StatusFilter::Wrong => "只看错题",
            StatusFilter::NotAttempted => "只看未做",
        }
    }
}

/// `GET /problems` 的 `sort_by` 参数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ProblemSort {
    #[default]
    #[value(name = "date_desc")]
    DateDesc,
    #[value(name = "date_asc")]
    DateAsc,
    #[value(name = "solve_count_desc")]
    SolveCountDesc,
    #[value(name = "title_asc")]
    TitleAsc,
    #[value(name = "order_asc")]
    OrderAsc,
}

impl ProblemSort {
    pub fn as_str(self) -> &'static str {
        match self {
            ProblemSort::DateDesc => "date_desc",
            ProblemSort::DateAsc => "date_asc",
            ProblemSort::SolveCountDesc => "solve_count_desc",
            ProblemSort::TitleAsc => "title_asc",
            ProblemSort::OrderAsc => "order_asc",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "date_desc" => Some(ProblemSort::DateDesc),
            "date_asc" => Some(ProblemSort::DateAsc),
            "solve_count_desc" => Some(ProblemSort::SolveCountDesc),
            "title_asc" => Some(ProblemSort::TitleAsc),
            "order_asc" => Some(ProblemSort::OrderAsc),
            _ => None,
        }
    }
}

/// 题目（含做题统计）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    pub problem_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub folder_id: Option<i64>,
    #[serde(default)]
    pub curriculum_id: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub problem_image_url: Option<String>,
    #[serde(default)]
    pub answer_image_url: Option<String>,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub solve_count: u32,
    #[serde(default)]
    pub correct_rate: f64,
    #[serde(default)]
    pub latest_status: LatestStatus,
}

/// 提示，按 `step_number` 顺序逐条揭示
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hint {
    pub hint_id: i64,
    pub problem_id: i64,
    pub step_number: u32,
    pub content: String,
    #[serde(default)]
    pub created_at: String,
}

/// 带提示的题目详情
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemWithHints {
    #[serde(flatten)]
    pub problem: Problem,
    #[serde(default)]
    pub hints: Vec<Hint>,
}

impl ProblemWithHints {
    /// 按步骤号排序后的提示
    pub fn ordered_hints(&self) -> Vec<Hint> {
        let mut hints = self.hints.clone();
        hints.sort_by_key(|h| h.step_number);
        hints
    }
}

/// `PUT /problems/{id}` 请求体，未设置的字段不发送
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProblemUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curriculum_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_image_url: Option<String>,
}

/// 通过校验的新建题目表单，只能由 `ProblemDraft::validate_for_create` 生成
#[derive(Debug, Clone, PartialEq)]
pub struct NewProblem {
    pub(crate) title: String,
    pub(crate) folder_id: Option<i64>,
    pub(crate) curriculum_id: Option<i64>,
    pub(crate) hints: Vec<String>,
    pub(crate) content_image: ImageFile,
    pub(crate) answer_image: ImageFile,
}

impl NewProblem {
    pub fn title(&self) -> &str {
        &self.title
    }

    /// 后端要求的逗号拼接提示串
    pub fn hints_field(&self) -> String {
        self.hints.join(",")
    }
}

/// `POST /problems/{id}/solve` 请求体
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolveSubmission {
    pub solution: String,
    pub is_correct: bool,
    pub time_spent: u64,
    pub study_session_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}
