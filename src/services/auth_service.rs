//! 认证服务 - 业务能力层
//!
//! 登录、登出、注册，以及"记住账号 / 密码"

use crate::clients::OdapClient;
use crate::error::{AppError, AppResult};
use crate::infrastructure::{KeyValueStore, SessionContext};
use crate::models::UserCreate;
use std::sync::Arc;
use tracing::info;

const SAVED_USERNAME_KEY: &str = "savedUsername";
const SAVED_PASSWORD_KEY: &str = "savedPassword";

/// 记住的登录信息（明文，由用户勾选开启）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RememberedLogin {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl RememberedLogin {
    /// 记住账号 / 密码的开关
    ///
    /// 没有明确指定时，已有记住的值就保持勾选
    pub fn flags(&self, remember_username: Option<bool>, remember_password: Option<bool>) -> (bool, bool) {
        (
            remember_username.unwrap_or(self.username.is_some()),
            remember_password.unwrap_or(self.password.is_some()),
        )
    }
}

/// 认证服务
pub struct AuthService {
    client: OdapClient,
    session: SessionContext,
    store: Arc<dyn KeyValueStore>,
}

impl AuthService {
    pub fn new(client: OdapClient, session: SessionContext) -> Self {
        let store = session.store();
        Self {
            client,
            session,
            store,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// 登录并保存 token
    ///
    /// 记住账号 / 密码的开关先于请求生效
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        remember_username: bool,
        remember_password: bool,
    ) -> AppResult<()> {
        if username.trim().is_empty() {
            return Err(AppError::missing_field("用户名"));
        }
        if password.is_empty() {
            return Err(AppError::missing_field("密码"));
        }

        remember_login(
            self.store.as_ref(),
            username,
            password,
            remember_username,
            remember_password,
        )?;

        let token = self.client.login(username, password).await?;
        self.session.set_token(token.access_token)?;
        info!("✓ 登录成功: {}", username);
        Ok(())
    }

    pub fn logout(&self) -> AppResult<()> {
        self.session.teardown()
    }

    pub async fn register(&self, username: &str, email: Option<&str>, password: &str) -> AppResult<()> {
        if username.trim().is_empty() {
            return Err(AppError::missing_field("用户名"));
        }
        if password.is_empty() {
            return Err(AppError::missing_field("密码"));
        }
        let user = UserCreate {
            username: username.to_string(),
            email: email.map(str::to_string),
            password: password.to_string(),
        };
        self.client.register(&user).await?;
        info!("✓ 注册成功: {}，请登录", username);
        Ok(())
    }

    pub fn remembered(&self) -> RememberedLogin {
        RememberedLogin {
            username: self.store.get(SAVED_USERNAME_KEY),
            password: self.store.get(SAVED_PASSWORD_KEY),
        }
    }
}

/// 按开关写入或删除记住的账号 / 密码
pub fn remember_login(
    store: &dyn KeyValueStore,
    username: &str,
    password: &str,
    remember_username: bool,
    remember_password: bool,
) -> AppResult<()> {
    if remember_username {
        store.set(SAVED_USERNAME_KEY, username)?;
    } else {
        store.remove(SAVED_USERNAME_KEY)?;
    }
    if remember_password {
        store.set(SAVED_PASSWORD_KEY, password)?;
    } else {
        store.remove(SAVED_PASSWORD_KEY)?;
    }
    Ok(())
}
