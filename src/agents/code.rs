//! 代码生成专家：生成单段可执行的 Python 代码（代码块内，不加额外解释）

use std::sync::Arc;

use async_trait::async_trait;

use crate::agents::traits::{build_messages, non_empty};
use crate::agents::{Agent, AgentKind};
use crate::core::AgentError;
use crate::llm::LlmClient;
use crate::memory::HistoryMessage;

pub struct CodeGenerator {
    llm: Arc<dyn LlmClient>,
    system_prompt: String,
}

impl CodeGenerator {
    pub fn new(llm: Arc<dyn LlmClient>, system_prompt: impl Into<String>) -> Self {
        Self {
            llm,
            system_prompt: system_prompt.into(),
        }
    }
}

#[async_trait]
impl Agent for CodeGenerator {
    fn kind(&self) -> AgentKind {
        AgentKind::CodeGenerator
    }

    async fn respond(&self, prompt: &str, history: &[HistoryMessage]) -> Result<String, AgentError> {
        let task = format!("Generate Python code for: {prompt}");
        let messages = build_messages(&self.system_prompt, history, &task);
        let reply = self
            .llm
            .complete(&messages)
            .await
            .map_err(AgentError::LlmError)?;
        non_empty(self.kind(), reply)
    }
}
