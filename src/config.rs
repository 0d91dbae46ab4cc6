//! 应用配置：从 config/default.toml、环境 profile 与环境变量加载
//!
//! 加载顺序：config/default.toml → config/{CONSILIUM_ENV}.toml（默认 local，可选）→ 显式传入的文件
//! → 环境变量 `CONSILIUM__*`（双下划线表示嵌套，如 `CONSILIUM__APP__MODEL_TYPE=gemini`）。
//! 启动时调用 `validate()`，任何配置错误都会阻止进程对外服务。

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core::cost::ModelType;
use crate::core::SetupError;

/// 支持的 LLM 后端（均走 OpenAI 兼容端点）；mock 用于本地与测试
pub const SUPPORTED_PROVIDERS: &[&str] = &["openai", "deepseek", "gemini", "anthropic", "mock"];

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub llm: LlmSection,
    pub agents: AgentsSection,
    pub knowledge: KnowledgeSection,
    pub web: WebSection,
}

/// [app] 段：模型家族（决定成本单价）、历史长度上限
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSection {
    pub name: Option<String>,
    pub model_type: String,
    pub max_history_length: usize,
    /// model_type 不在已知家族内时，会话上展示的单价
    pub default_cost_per_token: f64,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: None,
            model_type: "openai".to_string(),
            max_history_length: 10,
            default_cost_per_token: 0.000002,
        }
    }
}

/// [llm] 段：后端、模型与超时
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LlmSection {
    /// 后端：openai / deepseek / gemini / anthropic / mock；未设置时跟随 app.model_type
    pub provider: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub timeouts: LlmTimeoutsSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmTimeoutsSection {
    pub request: u64,
}

impl Default for LlmTimeoutsSection {
    fn default() -> Self {
        Self { request: 60 }
    }
}

/// [agents] 段：单阶段超时与 Prompt 文件
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentsSection {
    pub stage_timeout_secs: u64,
    /// 覆盖内置 Prompt 的 TOML 文件（[prompts] 表）
    pub prompts_path: Option<PathBuf>,
}

impl Default for AgentsSection {
    fn default() -> Self {
        Self {
            stage_timeout_secs: 120,
            prompts_path: None,
        }
    }
}

/// [knowledge] 段：知识库后端与文档切分
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KnowledgeSection {
    /// memory / http / none
    pub backend: String,
    pub documents_dir: Option<PathBuf>,
    /// SQL 生成用的表结构文档目录
    pub schema_dir: Option<PathBuf>,
    /// GraphQL 生成用的 schema 文档目录
    pub graphql_schema_dir: Option<PathBuf>,
    /// backend = "http" 时的检索服务地址
    pub endpoint: Option<String>,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub max_entries: usize,
}

impl Default for KnowledgeSection {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            documents_dir: None,
            schema_dir: None,
            graphql_schema_dir: None,
            endpoint: None,
            chunk_size: 1000,
            chunk_overlap: 100,
            top_k: 5,
            max_entries: 10_000,
        }
    }
}

/// [web] 段
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebSection {
    pub port: u16,
}

impl Default for WebSection {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

impl AppConfig {
    /// 实际使用的 LLM 后端（小写）
    pub fn provider(&self) -> String {
        self.llm
            .provider
            .clone()
            .unwrap_or_else(|| self.app.model_type.clone())
            .to_lowercase()
    }

    /// 启动期校验：模型家族、后端名称与对应的 API Key 环境变量
    pub fn validate(&self) -> Result<(), SetupError> {
        self.app
            .model_type
            .parse::<ModelType>()
            .map_err(|_| SetupError::InvalidModelType(self.app.model_type.clone()))?;

        let provider = self.provider();
        if !SUPPORTED_PROVIDERS.contains(&provider.as_str()) {
            return Err(SetupError::UnsupportedProvider(provider));
        }
        if let Some(var) = api_key_var(&provider) {
            if std::env::var(var).map(|v| v.is_empty()).unwrap_or(true) {
                return Err(SetupError::MissingCredential(var.to_string()));
            }
        }

        match self.knowledge.backend.as_str() {
            "memory" | "none" => {}
            "http" if self.knowledge.endpoint.is_some() => {}
            "http" => {
                return Err(SetupError::Knowledge(
                    "knowledge.endpoint is required for the http backend".to_string(),
                ))
            }
            other => return Err(SetupError::UnsupportedKnowledgeBackend(other.to_string())),
        }
        Ok(())
    }
}

/// 各后端读取 API Key 的环境变量；mock 不需要
pub fn api_key_var(provider: &str) -> Option<&'static str> {
    match provider {
        "openai" => Some("OPENAI_API_KEY"),
        "deepseek" => Some("DEEPSEEK_API_KEY"),
        "gemini" => Some("GEMINI_API_KEY"),
        "anthropic" => Some("ANTHROPIC_API_KEY"),
        _ => None,
    }
}

/// 从 config 目录加载配置，环境变量 CONSILIUM__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 同目录下的 {CONSILIUM_ENV}.toml（默认 local）作为 profile 覆盖
/// 3. 若传入 config_path 且文件存在，则追加该文件
/// 4. 最后叠加环境变量 CONSILIUM__*
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let profile = std::env::var("CONSILIUM_ENV").unwrap_or_else(|_| "local".to_string());
    let default_dirs = ["config", "../config", "."];
    for dir in default_dirs {
        let default_path = Path::new(dir).join("default.toml");
        if default_path.exists() {
            builder = builder
                .add_source(config::File::from(default_path).required(false))
                .add_source(
                    config::File::from(Path::new(dir).join(format!("{profile}.toml")))
                        .required(false),
                );
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        } else {
            tracing::warn!(path = %path.display(), "Config file not found, skipping");
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("CONSILIUM")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_config() -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.llm.provider = Some("mock".to_string());
        cfg
    }

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.app.model_type, "openai");
        assert_eq!(cfg.app.max_history_length, 10);
        assert_eq!(cfg.agents.stage_timeout_secs, 120);
        assert_eq!(cfg.knowledge.chunk_size, 1000);
        assert_eq!(cfg.knowledge.chunk_overlap, 100);
        assert_eq!(cfg.web.port, 8080);
        assert_eq!(cfg.provider(), "openai");
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[app]\nmodel_type = \"gemini\"\nmax_history_length = 4\n\n[llm]\nprovider = \"mock\"\n",
        )
        .unwrap();
        let cfg = load_config(Some(path)).unwrap();
        assert_eq!(cfg.app.model_type, "gemini");
        assert_eq!(cfg.app.max_history_length, 4);
        assert_eq!(cfg.provider(), "mock");
        // 未出现的段落保持默认
        assert_eq!(cfg.knowledge.top_k, 5);
    }

    #[test]
    fn test_validate_rejects_unknown_model_type() {
        let mut cfg = mock_config();
        cfg.app.model_type = "bedrock".to_string();
        assert!(matches!(cfg.validate(), Err(SetupError::InvalidModelType(_))));
    }

    #[test]
    fn test_validate_rejects_unknown_provider() {
        let mut cfg = mock_config();
        cfg.llm.provider = Some("watsonx".to_string());
        assert!(matches!(cfg.validate(), Err(SetupError::UnsupportedProvider(_))));
    }

    #[test]
    fn test_validate_http_backend_needs_endpoint() {
        let mut cfg = mock_config();
        cfg.knowledge.backend = "http".to_string();
        assert!(matches!(cfg.validate(), Err(SetupError::Knowledge(_))));
        cfg.knowledge.endpoint = Some("http://localhost:9000".to_string());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_mock_provider_needs_no_credentials() {
        assert!(mock_config().validate().is_ok());
        assert_eq!(api_key_var("mock"), None);
        assert_eq!(api_key_var("anthropic"), Some("ANTHROPIC_API_KEY"));
    }
}
