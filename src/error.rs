use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// API 调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// 本地存储错误
    #[error("存储错误: {0}")]
    Storage(#[from] StorageError),
    /// 提交前的校验错误（不会发出请求）
    #[error("校验失败: {0}")]
    Validation(#[from] ValidationError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// API 返回非成功状态码
    #[error("API返回错误响应 ({endpoint}): status={status}, detail={detail:?}")]
    BadResponse {
        endpoint: String,
        status: u16,
        detail: Option<String>,
    },
    /// 401：登录已过期，token 已被清除
    #[error("登录已过期，请重新登录 ({endpoint})")]
    Unauthorized { endpoint: String },
    /// 响应体解析失败
    #[error("响应解析失败 ({endpoint}): {source}")]
    DecodeFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
}

/// 本地存储错误
#[derive(Debug, Error)]
pub enum StorageError {
    /// 读取存储文件失败
    #[error("读取存储文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入存储文件失败
    #[error("写入存储文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 存储内容不是合法 JSON
    #[error("存储内容解析失败 ({key}): {source}")]
    CorruptValue {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 校验错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// 必填字段为空
    #[error("{field} 不能为空")]
    MissingField { field: &'static str },
    /// 新建题目必须同时带题目图片和答案图片
    #[error("题目图片和答案图片都必须上传 (缺少: {missing})")]
    MissingImage { missing: &'static str },
    /// 课程父节点不合法
    #[error("课程 {node_id:?} 的父节点 {parent_id} 不合法: {reason}")]
    InvalidParent {
        node_id: Option<i64>,
        parent_id: i64,
        reason: &'static str,
    },
    /// 当前状态下不允许的操作
    #[error("当前状态 {state} 下不能执行 {action}")]
    InvalidTransition {
        state: &'static str,
        action: &'static str,
    },
    /// 没有符合条件的题目
    #[error("没有符合条件的题目")]
    EmptyPlaylist,
    /// 裁剪区域无效
    #[error("裁剪区域无效: {width}x{height}")]
    InvalidCrop { width: i64, height: i64 },
    /// 命令行参数无法解析
    #[error("参数 {name} 无效: {value}")]
    InvalidArgument { name: String, value: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置文件读取失败
    #[error("配置文件读取失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 配置文件解析失败
    #[error("配置文件解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建API请求失败错误
    pub fn api_request_failed(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::Api(ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source,
        })
    }

    /// 创建必填字段缺失错误
    pub fn missing_field(field: &'static str) -> Self {
        AppError::Validation(ValidationError::MissingField { field })
    }

    /// 创建非法状态转换错误
    pub fn invalid_transition(state: &'static str, action: &'static str) -> Self {
        AppError::Validation(ValidationError::InvalidTransition { state, action })
    }

    /// 是否为登录过期（需要跳转登录）
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AppError::Api(ApiError::Unauthorized { .. }))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_detection() {
        let err = AppError::Api(ApiError::Unauthorized {
            endpoint: "/folders".to_string(),
        });
        assert!(err.is_unauthorized());
        assert!(!AppError::missing_field("title").is_unauthorized());
    }

    #[test]
    fn test_validation_message_names_field() {
        let err = AppError::missing_field("名称");
        assert_eq!(err.to_string(), "校验失败: 名称 不能为空");
    }
}
