//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 管理应用生命周期（初始化本地存储、登录状态、API 客户端）
//! - 把命令分发给业务能力或做题流程
//!
//! ### `command` - 命令行参数（clap derive）
//!
//! ### `solve_session` - 终端做题循环
//! - 读取按键命令并驱动 `SolveFlow`
//!
//! ## 层次关系
//!
//! ```text
//! app (一条命令)
//!     ↓
//! solve_session (一轮做题)
//!     ↓
//! workflow::SolveFlow (一道题的作答 + 做题列表)
//!     ↓
//! services (能力层：排序 / 筛选 / 作答 / 认证)
//!     ↓
//! clients / infrastructure (OdapClient、ApiTransport、KeyValueStore)
//! ```

pub mod app;
pub mod command;
pub mod solve_session;

pub use app::App;
pub use command::{Cli, Command};
