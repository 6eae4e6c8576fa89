use crate::error::{AppResult, ConfigError};
use crate::models::ProblemSort;
use serde::Deserialize;
use std::path::Path;

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 后端 API 根地址（包含 /api/v1）
    pub api_base_url: String,
    /// 本地存储文件（token、记住的账号、做题进度等）
    pub storage_path: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 题目列表默认排序
    pub default_sort: ProblemSort,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000/api/v1".to_string(),
            storage_path: "odapclean_storage.json".to_string(),
            verbose_logging: false,
            default_sort: ProblemSort::DateDesc,
        }
    }
}

impl Config {
    /// 只读取环境变量，未设置的项使用默认值
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 读取 TOML 配置文件（不存在则使用默认值），再用环境变量覆盖
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let base = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
                path: path.display().to_string(),
                source: e,
            })?;
            Self::from_toml_str(&content, &path.display().to_string())?
        } else {
            Self::default()
        };
        Ok(base.with_env_overrides())
    }

    fn from_toml_str(content: &str, path: &str) -> AppResult<Self> {
        let config: Config = toml::from_str(content).map_err(|e| ConfigError::TomlParseFailed {
            path: path.to_string(),
            source: e,
        })?;
        Ok(config)
    }

    fn with_env_overrides(self) -> Self {
        Self {
            api_base_url: std::env::var("ODAP_API_BASE_URL").unwrap_or(self.api_base_url),
            storage_path: std::env::var("ODAP_STORAGE_PATH").unwrap_or(self.storage_path),
            verbose_logging: std::env::var("VERBOSE_LOGGING")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(self.verbose_logging),
            default_sort: std::env::var("ODAP_DEFAULT_SORT")
                .ok()
                .and_then(|v| ProblemSort::parse(&v))
                .unwrap_or(self.default_sort),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            api_base_url = "http://10.0.0.2:8000/api/v1"
            default_sort = "title_asc"
            "#,
            "test.toml",
        )
        .unwrap();

        assert_eq!(config.api_base_url, "http://10.0.0.2:8000/api/v1");
        assert_eq!(config.default_sort, ProblemSort::TitleAsc);
        assert_eq!(config.storage_path, Config::default().storage_path);
        assert!(!config.verbose_logging);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = Config::from_toml_str("verbose_logging = \"maybe\"", "bad.toml").unwrap_err();
        assert!(matches!(
            err,
            crate::error::AppError::Config(ConfigError::TomlParseFailed { .. })
        ));
    }
}
