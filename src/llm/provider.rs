//! 根据配置选择 LLM 后端
//!
//! 真实后端都走 OpenAI 兼容端点，仅 base_url、默认模型与 API Key 环境变量不同。

use std::sync::Arc;
use std::time::Duration;

use crate::config::{api_key_var, AppConfig};
use crate::core::SetupError;
use crate::llm::{LlmClient, MockLlmClient, OpenAiClient};

pub const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai/";
pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1/";

/// (默认 base_url, 默认模型)
fn provider_defaults(provider: &str) -> Option<(Option<&'static str>, &'static str)> {
    match provider {
        "openai" => Some((None, "gpt-4o-mini")),
        "deepseek" => Some((Some(DEEPSEEK_BASE_URL), "deepseek-chat")),
        "gemini" => Some((Some(GEMINI_BASE_URL), "gemini-2.0-flash")),
        "anthropic" => Some((Some(ANTHROPIC_BASE_URL), "claude-3-5-haiku-latest")),
        _ => None,
    }
}

/// 按 `llm.provider`（缺省跟随 `app.model_type`）构建客户端；缺少 API Key 视为配置错误
pub fn create_llm_from_config(cfg: &AppConfig) -> Result<Arc<dyn LlmClient>, SetupError> {
    let provider = cfg.provider();
    if provider == "mock" {
        tracing::warn!("Using Mock LLM");
        return Ok(Arc::new(MockLlmClient));
    }

    let (default_base, default_model) = provider_defaults(&provider)
        .ok_or_else(|| SetupError::UnsupportedProvider(provider.clone()))?;
    let key_var = api_key_var(&provider)
        .ok_or_else(|| SetupError::UnsupportedProvider(provider.clone()))?;
    let api_key = std::env::var(key_var)
        .ok()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| SetupError::MissingCredential(key_var.to_string()))?;

    let model = cfg.llm.model.as_deref().unwrap_or(default_model);
    let base_url = cfg.llm.base_url.as_deref().or(default_base);
    tracing::info!(provider = %provider, model, "Using LLM");

    Ok(Arc::new(OpenAiClient::new(
        base_url,
        model,
        &api_key,
        Duration::from_secs(cfg.llm.timeouts.request),
    )))
}
