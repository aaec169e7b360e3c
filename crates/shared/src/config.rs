use crate::errors::AppError;
use domain::AuthProvider;
use std::env;

/// ログの出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    fn parse(value: &str) -> Result<Self, AppError> {
        match value.trim().to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" => Ok(LogFormat::Pretty),
            other => Err(AppError::Configuration(format!(
                "LOG_FORMAT must be json or pretty, got {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: String,
    /// バックエンドのプロジェクトID
    pub project_id: String,
    pub api_key: Option<String>,
    /// 表示名が未設定のユーザーに使うラベル
    pub default_display_name: String,
    /// 有効なフェデレーション認証プロバイダ
    pub federated_providers: Vec<AuthProvider>,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "dev".to_string(),
            project_id: "personal-todo-dev".to_string(),
            api_key: None,
            default_display_name: "User".to_string(),
            federated_providers: vec![AuthProvider::Google],
            log_format: LogFormat::Pretty,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 任意のキー検索関数から設定を組み立てる
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let federated_providers = match lookup("TODO_FEDERATED_PROVIDERS") {
            Some(raw) => parse_providers(&raw)?,
            None => defaults.federated_providers,
        };
        let log_format = match lookup("LOG_FORMAT") {
            Some(raw) => LogFormat::parse(&raw)?,
            None => defaults.log_format,
        };

        Ok(Config {
            environment: lookup("ENVIRONMENT").unwrap_or(defaults.environment),
            project_id: lookup("TODO_PROJECT_ID").unwrap_or(defaults.project_id),
            api_key: lookup("TODO_API_KEY").filter(|key| !key.is_empty()),
            default_display_name: lookup("TODO_DEFAULT_DISPLAY_NAME")
                .filter(|name| !name.trim().is_empty())
                .unwrap_or(defaults.default_display_name),
            federated_providers,
            log_format,
        })
    }
}

fn parse_providers(raw: &str) -> Result<Vec<AuthProvider>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            AuthProvider::from_provider_id(id)
                .filter(AuthProvider::is_federated)
                .ok_or_else(|| {
                    AppError::Configuration(format!("Unknown federated provider: {id}"))
                })
        })
        .collect()
}
