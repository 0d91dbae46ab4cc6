//! Prompt 映射表：符号键 -> 提示词文本
//!
//! 启动时构建一次：先载入编译期内置的 config/prompts.toml，再用 `[agents].prompts_path` 指定的文件覆盖同名键。

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::core::SetupError;

const BUILTIN_PROMPTS: &str = include_str!("../../config/prompts.toml");

#[derive(Deserialize)]
struct PromptFile {
    #[serde(default)]
    prompts: HashMap<String, String>,
}

#[derive(Debug, Clone, Default)]
pub struct PromptRegistry {
    prompts: HashMap<String, String>,
}

impl PromptRegistry {
    /// 仅内置提示词
    pub fn builtin() -> Result<Self, SetupError> {
        Self::from_toml_str(BUILTIN_PROMPTS, "<builtin>")
    }

    pub fn from_toml_str(text: &str, origin: &str) -> Result<Self, SetupError> {
        let file: PromptFile = toml::from_str(text).map_err(|source| SetupError::PromptFile {
            path: origin.to_string(),
            source,
        })?;
        let prompts = file
            .prompts
            .into_iter()
            .map(|(k, v)| (k, v.trim().to_string()))
            .collect();
        Ok(Self { prompts })
    }

    /// 内置提示词 + 可选覆盖文件
    pub fn load(override_path: Option<&Path>) -> Result<Self, SetupError> {
        let mut registry = Self::builtin()?;
        if let Some(path) = override_path {
            let text = std::fs::read_to_string(path)?;
            let overrides = Self::from_toml_str(&text, &path.display().to_string())?;
            tracing::info!(path = %path.display(), count = overrides.prompts.len(), "Loaded prompt overrides");
            registry.prompts.extend(overrides.prompts);
        }
        Ok(registry)
    }

    pub fn get(&self, key: &str) -> Result<&str, SetupError> {
        self.prompts
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| SetupError::PromptNotFound(key.to_string()))
    }

    pub fn insert(&mut self, key: impl Into<String>, prompt: impl Into<String>) {
        self.prompts.insert(key.into(), prompt.into());
    }

    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.prompts.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}
