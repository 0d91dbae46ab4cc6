//! GraphQL 生成专家：按用户问题生成单条 GraphQL 查询或变更；可选的 GraphQL schema 知识库提供类型上下文

use std::sync::Arc;

use async_trait::async_trait;

use crate::agents::knowledge::render_documents;
use crate::agents::traits::{build_messages, non_empty};
use crate::agents::{Agent, AgentKind};
use crate::core::AgentError;
use crate::knowledge::KnowledgeBase;
use crate::llm::LlmClient;
use crate::memory::HistoryMessage;

pub struct GraphqlGenerator {
    llm: Arc<dyn LlmClient>,
    schema: Option<Arc<dyn KnowledgeBase>>,
    system_prompt: String,
    top_k: usize,
}

impl GraphqlGenerator {
    pub fn new(llm: Arc<dyn LlmClient>, system_prompt: impl Into<String>) -> Self {
        Self {
            llm,
            schema: None,
            system_prompt: system_prompt.into(),
            top_k: 5,
        }
    }

    pub fn with_schema(mut self, schema: Arc<dyn KnowledgeBase>, top_k: usize) -> Self {
        self.schema = Some(schema);
        self.top_k = top_k;
        self
    }
}

#[async_trait]
impl Agent for GraphqlGenerator {
    fn kind(&self) -> AgentKind {
        AgentKind::GraphqlGenerator
    }

    async fn respond(&self, prompt: &str, history: &[HistoryMessage]) -> Result<String, AgentError> {
        let mut task = format!("Generate a GraphQL query for: {prompt}");
        if let Some(schema) = &self.schema {
            let types = schema.similarity_search(prompt, self.top_k).await?;
            if !types.is_empty() {
                task.push_str("\n\nRelevant GraphQL schema:\n");
                task.push_str(&render_documents(&types));
            }
        }
        let messages = build_messages(&self.system_prompt, history, &task);
        let reply = self
            .llm
            .complete(&messages)
            .await
            .map_err(AgentError::LlmError)?;
        non_empty(self.kind(), reply)
    }
}
