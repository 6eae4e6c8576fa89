//! 基础设施层
//!
//! 持有稀缺资源（HTTP 连接池、本地存储文件），只暴露能力

pub mod api_transport;
pub mod session_context;
pub mod storage;

pub use api_transport::ApiTransport;
pub use session_context::SessionContext;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
