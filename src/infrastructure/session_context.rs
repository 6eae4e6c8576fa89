//! 登录状态
//!
//! 显式构造、注入使用，不使用全局变量

use crate::error::AppResult;
use crate::infrastructure::storage::KeyValueStore;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// 存储 token 的键
pub const TOKEN_KEY: &str = "token";

/// 登录状态持有者
///
/// 职责：
/// - 启动时从存储读取 token
/// - 登录成功后写入 token
/// - 登出或 401 时清除 token
#[derive(Clone)]
pub struct SessionContext {
    store: Arc<dyn KeyValueStore>,
    token: Arc<RwLock<Option<String>>>,
}

impl SessionContext {
    /// 读取已保存的 token 初始化
    pub fn init(store: Arc<dyn KeyValueStore>) -> Self {
        let token = store.get(TOKEN_KEY).filter(|t| !t.is_empty());
        debug!("初始化登录状态: {}", if token.is_some() { "已登录" } else { "未登录" });
        Self {
            store,
            token: Arc::new(RwLock::new(token)),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().ok().and_then(|t| t.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// 保存新 token
    pub fn set_token(&self, token: impl Into<String>) -> AppResult<()> {
        let token = token.into();
        self.store.set(TOKEN_KEY, &token)?;
        if let Ok(mut slot) = self.token.write() {
            *slot = Some(token);
        }
        Ok(())
    }

    /// 清除 token（登出 / 会话过期）
    pub fn teardown(&self) -> AppResult<()> {
        if let Ok(mut slot) = self.token.write() {
            *slot = None;
        }
        self.store.remove(TOKEN_KEY)?;
        info!("已清除登录状态");
        Ok(())
    }

    /// 共享的存储能力
    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        self.store.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::MemoryStore;

    #[test]
    fn test_init_reads_persisted_token() {
        let store = Arc::new(MemoryStore::new());
        store.set(TOKEN_KEY, "saved").unwrap();

        let ctx = SessionContext::init(store);
        assert!(ctx.is_authenticated());
        assert_eq!(ctx.token().as_deref(), Some("saved"));
    }

    #[test]
    fn test_teardown_clears_memory_and_store() {
        let store = Arc::new(MemoryStore::new());
        let ctx = SessionContext::init(store.clone());
        ctx.set_token("fresh").unwrap();
        assert_eq!(store.get(TOKEN_KEY).as_deref(), Some("fresh"));

        ctx.teardown().unwrap();
        assert!(!ctx.is_authenticated());
        assert_eq!(store.get(TOKEN_KEY), None);
    }
}
