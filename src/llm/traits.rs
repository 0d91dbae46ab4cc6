//! LLM 客户端抽象
//!
//! 所有后端（OpenAI 兼容 / Mock）实现 LlmClient::complete（非流式）。

use async_trait::async_trait;

use crate::memory::Message;

/// LLM 客户端 trait
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 非流式完成，返回首条候选的文本
    async fn complete(&self, messages: &[Message]) -> Result<String, String>;

    /// 模型名（日志用）
    fn model(&self) -> &str;
}
