//! 命令行参数定义
//!
//! `odap-clean <命令> [参数] [--选项 值]`，由 clap 解析

use crate::clients::ProblemQuery;
use crate::models::{CropRect, ProblemSort, ReorderResource, StatusFilter};
use crate::services::ImageSize;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "odap-clean",
    about = "OdapClean 错题本命令行客户端",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// 一条终端命令
#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// 登录，省略用户名 / 密码时使用记住的值
    Login {
        username: Option<String>,
        password: Option<String>,
        /// 记住用户名（已记住时默认保持）
        #[arg(long = "remember-user", conflicts_with = "forget_user")]
        remember_user: bool,
        /// 不再记住用户名
        #[arg(long = "forget-user")]
        forget_user: bool,
        /// 记住密码（已记住时默认保持）
        #[arg(long = "remember-password", conflicts_with = "forget_password")]
        remember_password: bool,
        /// 不再记住密码
        #[arg(long = "forget-password")]
        forget_password: bool,
    },
    Logout,
    Register {
        username: String,
        password: String,
        #[arg(long)]
        email: Option<String>,
    },

    /// 文件夹列表
    Folders,
    FolderAdd {
        name: String,
    },
    FolderRename {
        folder_id: i64,
        name: String,
    },
    Delete {
        #[arg(value_enum)]
        target: DeleteTarget,
        id: i64,
    },

    /// 课程树
    Curriculums,
    CurriculumAdd {
        name: String,
        /// 1 科目 / 2 单元 / 3 小单元
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=3))]
        level: u8,
        /// 上级课程 ID，一级课程不填
        #[arg(long)]
        parent: Option<i64>,
    },
    CurriculumEdit {
        curriculum_id: i64,
        name: String,
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=3))]
        level: u8,
        #[arg(long)]
        parent: Option<i64>,
    },

    /// 题目列表，不带筛选时沿用上次的筛选
    Problems {
        #[command(flatten)]
        filter: FilterArgs,
    },
    ProblemAdd {
        title: String,
        /// 题目图片
        #[arg(long)]
        content: String,
        /// 答案图片
        #[arg(long)]
        answer: String,
        /// 提示，可重复，按顺序编号
        #[arg(long = "hint", action = ArgAction::Append)]
        hints: Vec<String>,
        #[arg(long)]
        folder: Option<i64>,
        #[command(flatten)]
        curriculum: CurriculumArgs,
    },
    /// 修改题目，未给出的字段保持原值
    ProblemEdit {
        problem_id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        folder: Option<i64>,
        #[command(flatten)]
        curriculum: CurriculumArgs,
    },
    /// 自动裁剪；给出 --box 时按手动框选换算，不请求后端
    AutoCrop {
        image: String,
        /// 原图尺寸，宽x高
        #[arg(long, value_parser = parse_size)]
        size: ImageSize,
        /// 手动框选 x,y,宽,高
        #[arg(long = "box", value_parser = parse_rect)]
        selection: Option<CropRect>,
        /// 框选时的显示尺寸，默认等于原图尺寸
        #[arg(long, value_parser = parse_size)]
        display: Option<ImageSize>,
    },

    /// 学习会话列表
    Sessions,
    /// 新建学习会话；重复给出同一 ID 会取消选择
    SessionAdd {
        name: String,
        #[arg(long, value_enum)]
        mode: Option<StatusFilter>,
        #[arg(long = "folder", action = ArgAction::Append)]
        folders: Vec<i64>,
        #[arg(long = "curriculum", action = ArgAction::Append)]
        curriculums: Vec<i64>,
    },
    /// 统计
    Stats,

    /// 开始做题：保存的学习会话，或与 problems 相同的筛选
    Solve {
        #[arg(long)]
        session: Option<i64>,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// 继续上次的做题进度
    Resume,
    /// 把一项拖到另一项的位置
    Reorder {
        #[arg(value_enum)]
        resource: ReorderResource,
        active: i64,
        over: i64,
    },
}

/// 可以删除的对象
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DeleteTarget {
    Folder,
    Curriculum,
    Problem,
    Session,
}

/// 课程三级联动选择
#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct CurriculumArgs {
    /// 科目（一级课程 ID）
    #[arg(long)]
    pub subject: Option<i64>,
    /// 单元（二级课程 ID，需要先选科目）
    #[arg(long)]
    pub unit: Option<i64>,
    /// 小单元（三级课程 ID，需要先选单元）
    #[arg(long)]
    pub subunit: Option<i64>,
}

impl CurriculumArgs {
    pub fn is_empty(&self) -> bool {
        self.subject.is_none() && self.unit.is_none() && self.subunit.is_none()
    }
}

/// 题目筛选
#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct FilterArgs {
    #[arg(long, value_enum)]
    pub status: Option<StatusFilter>,
    #[arg(long)]
    pub folder: Option<i64>,
    #[command(flatten)]
    pub curriculum: CurriculumArgs,
    #[arg(long, value_enum)]
    pub sort: Option<ProblemSort>,
}

impl FilterArgs {
    /// 没有任何筛选选项
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.folder.is_none() && self.sort.is_none() && self.curriculum.is_empty()
    }

    /// `curriculum_id` 是联动选择解析后的课程
    pub fn to_query(&self, curriculum_id: Option<i64>, default_sort: ProblemSort) -> ProblemQuery {
        ProblemQuery {
            status: self.status.unwrap_or_default(),
            folder_id: self.folder,
            curriculum_id,
            sort_by: self.sort.unwrap_or(default_sort),
        }
    }
}

/// `--remember-x` / `--forget-x` 都没给出时为 None
pub fn remember_choice(remember: bool, forget: bool) -> Option<bool> {
    match (remember, forget) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

fn parse_size(value: &str) -> Result<ImageSize, String> {
    let (width, height) = value
        .split_once('x')
        .ok_or_else(|| format!("应为 宽x高: {}", value))?;
    Ok(ImageSize {
        width: parse_number(width)?,
        height: parse_number(height)?,
    })
}

fn parse_rect(value: &str) -> Result<CropRect, String> {
    let numbers = value
        .split(',')
        .map(parse_number)
        .collect::<Result<Vec<_>, _>>()?;
    match numbers[..] {
        [x, y, width, height] => Ok(CropRect { x, y, width, height }),
        _ => Err(format!("应为 x,y,宽,高: {}", value)),
    }
}

fn parse_number(value: &str) -> Result<f64, String> {
    value
        .trim()
        .parse()
        .map_err(|_| format!("不是数字: {}", value))
}
