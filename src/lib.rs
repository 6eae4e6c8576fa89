//! # OdapClean
//!
//! OdapClean 错题本后端（`/api/v1`）的 Rust 客户端
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（HTTP 客户端、本地存储），只暴露能力
//! - `ApiTransport` - 唯一的 `reqwest::Client` owner，统一处理 token 和 401
//! - `KeyValueStore` - 本地键值存储（`FileStore` / `MemoryStore`）
//! - `SessionContext` - 登录状态
//!
//! `clients/OdapClient` 在其上为每个 REST 操作提供带类型的方法
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，不关心终端交互
//! - `ListReorder` - 拖拽排序（本地先更新，后台保存）
//! - `CurriculumFilter` - 课程三级联动筛选
//! - `SolveAttempt` / `AttemptTimer` - 单题作答状态机和计时
//! - `PlaylistStore` - 做题列表进度
//! - `AuthService` / `Preferences` / `ProblemDraft` / `crop`
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一轮做题"的完整流程
//! - `SolveCtx` - 上下文封装（题目 + 列表位置）
//! - `SolveFlow` - 流程编排（取题 → 作答 → 提交 → 下一题）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 应用入口，管理资源并分发命令
//! - `orchestrator/solve_session` - 终端做题循环
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{OdapClient, ProblemQuery};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{ApiTransport, KeyValueStore, SessionContext};
pub use orchestrator::{App, Cli, Command};
pub use workflow::{SolveCtx, SolveFlow};
