use serde::{Deserialize, Serialize};

/// `POST /token` 返回的登录凭证
#[derive(Debug, Clone, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
}

/// 注册请求体
#[derive(Debug, Clone, Serialize)]
pub struct UserCreate {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub password: String,
}
