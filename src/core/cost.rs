//! 用量成本：按模型家族的固定单 token 单价
//!
//! token 数由调用方按空白切分估算（词数），并非真实 tokenizer。

use std::fmt;
use std::str::FromStr;

use crate::core::CostError;

/// 已知的模型家族（决定单价）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelType {
    OpenAi,
    Gemini,
    Anthropic,
}

impl ModelType {
    /// 每个 token 的美元单价
    pub fn rate(self) -> f64 {
        match self {
            ModelType::OpenAi => 0.000002,
            ModelType::Gemini => 0.00000025,
            ModelType::Anthropic => 0.000008,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ModelType::OpenAi => "openai",
            ModelType::Gemini => "gemini",
            ModelType::Anthropic => "anthropic",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelType {
    type Err = CostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(ModelType::OpenAi),
            "gemini" => Ok(ModelType::Gemini),
            "anthropic" => Ok(ModelType::Anthropic),
            _ => Err(CostError::UnknownModelType(s.to_string())),
        }
    }
}

/// 计算 num_tokens 个 token 的成本；未知模型类型返回 CostError
pub fn cost_per_token(model_type: &str, num_tokens: u64) -> Result<f64, CostError> {
    let model: ModelType = model_type.parse()?;
    Ok(num_tokens as f64 * model.rate())
}

/// 按空白切分的词数，作为 token 数的近似
pub fn estimate_tokens(text: &str) -> u64 {
    text.split_whitespace().count() as u64
}
