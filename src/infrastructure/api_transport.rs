//! HTTP 传输 - 基础设施层
//!
//! 唯一持有 reqwest::Client 的地方，只暴露"发请求"的能力

use crate::error::{ApiError, AppError, AppResult};
use crate::infrastructure::session_context::SessionContext;
use reqwest::{multipart::Form, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

/// HTTP 传输
///
/// 职责：
/// - 拼接 `/api/v1` 下的完整 URL
/// - 自动附带 `Authorization: Bearer <token>`
/// - 把非 2xx 状态码转换成 `ApiError`
/// - 401 时统一清除 token，调用方只需要回到登录
/// - 不认识 Folder / Problem 等业务类型
#[derive(Clone)]
pub struct ApiTransport {
    client: reqwest::Client,
    base_url: String,
    session: SessionContext,
}

impl ApiTransport {
    pub fn new(base_url: impl Into<String>, session: SessionContext) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
            session,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// GET 并解析 JSON
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> AppResult<T> {
        let builder = self.request(Method::GET, path).query(query);
        let response = self.execute(path, builder).await?;
        decode(path, response).await
    }

    /// 带 JSON 请求体发送并解析 JSON 响应
    pub async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> AppResult<T> {
        debug!("{} {} 请求体: {:?}", method, path, serde_json::to_string(body).ok());
        let builder = self.request(method, path).json(body);
        let response = self.execute(path, builder).await?;
        decode(path, response).await
    }

    /// 带 JSON 请求体发送，忽略响应体
    pub async fn send_json_unit<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> AppResult<()> {
        let builder = self.request(method, path).json(body);
        self.execute(path, builder).await?;
        Ok(())
    }

    /// DELETE，忽略响应体
    pub async fn delete(&self, path: &str) -> AppResult<()> {
        let builder = self.request(Method::DELETE, path);
        self.execute(path, builder).await?;
        Ok(())
    }

    /// 表单编码 POST（登录用）
    pub async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        fields: &[(&str, &str)],
    ) -> AppResult<T> {
        let builder = self.request(Method::POST, path).form(fields);
        let response = self.execute(path, builder).await?;
        decode(path, response).await
    }

    /// multipart POST（新建题目、自动裁剪）
    pub async fn post_multipart<T: DeserializeOwned>(&self, path: &str, form: Form) -> AppResult<T> {
        let builder = self.request(Method::POST, path).multipart(form);
        let response = self.execute(path, builder).await?;
        decode(path, response).await
    }

    /// 发送请求并检查状态码
    async fn execute(&self, endpoint: &str, builder: RequestBuilder) -> AppResult<Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint, e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            warn!("{} 返回 401，登录已过期", endpoint);
            self.session.teardown()?;
            return Err(ApiError::Unauthorized {
                endpoint: endpoint.to_string(),
            }
            .into());
        }

        let detail = response
            .json::<JsonValue>()
            .await
            .ok()
            .and_then(|body| extract_detail(&body));

        warn!("{} 返回错误状态 {}: {:?}", endpoint, status, detail);

        Err(ApiError::BadResponse {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            detail,
        }
        .into())
    }
}

async fn decode<T: DeserializeOwned>(endpoint: &str, response: Response) -> AppResult<T> {
    response.json::<T>().await.map_err(|e| {
        ApiError::DecodeFailed {
            endpoint: endpoint.to_string(),
            source: e,
        }
        .into()
    })
}

/// 提取后端的 `detail` 字段（字符串或校验错误数组）
fn extract_detail(body: &JsonValue) -> Option<String> {
    match body.get("detail")? {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Null => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::MemoryStore;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let session = SessionContext::init(Arc::new(MemoryStore::new()));
        let transport = ApiTransport::new("http://localhost:8000/api/v1/", session);
        assert_eq!(transport.url("/folders"), "http://localhost:8000/api/v1/folders");
    }

    #[test]
    fn test_extract_detail() {
        assert_eq!(
            extract_detail(&json!({"detail": "Incorrect username or password"})).as_deref(),
            Some("Incorrect username or password")
        );
        assert!(extract_detail(&json!({"detail": [{"loc": ["body", "title"]}]})).is_some());
        assert_eq!(extract_detail(&json!({"message": "x"})), None);
    }
}
