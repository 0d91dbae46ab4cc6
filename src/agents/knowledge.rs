//! 知识检索专家
//!
//! 先从知识库取 top_k 片段，再把片段「塞」进 prompt，让 LLM 给出简短回答（不带代码块）。

use std::sync::Arc;

use async_trait::async_trait;

use crate::agents::traits::{build_messages, non_empty};
use crate::agents::{Agent, AgentKind};
use crate::core::AgentError;
use crate::knowledge::{Document, KnowledgeBase};
use crate::llm::LlmClient;
use crate::memory::HistoryMessage;

pub struct KnowledgeRetriever {
    llm: Arc<dyn LlmClient>,
    knowledge: Option<Arc<dyn KnowledgeBase>>,
    system_prompt: String,
    top_k: usize,
}

impl KnowledgeRetriever {
    pub fn new(llm: Arc<dyn LlmClient>, system_prompt: impl Into<String>) -> Self {
        Self {
            llm,
            knowledge: None,
            system_prompt: system_prompt.into(),
            top_k: 5,
        }
    }

    pub fn with_knowledge(mut self, knowledge: Arc<dyn KnowledgeBase>, top_k: usize) -> Self {
        self.knowledge = Some(knowledge);
        self.top_k = top_k;
        self
    }

    async fn retrieve(&self, query: &str) -> Result<Vec<Document>, AgentError> {
        match &self.knowledge {
            Some(kb) => kb.similarity_search(query, self.top_k).await,
            None => Ok(Vec::new()),
        }
    }
}

pub(crate) fn render_documents(documents: &[Document]) -> String {
    documents
        .iter()
        .map(|d| match &d.source {
            Some(source) => format!("[{}]\n{}", source, d.content.trim()),
            None => d.content.trim().to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n---\n")
}

#[async_trait]
impl Agent for KnowledgeRetriever {
    fn kind(&self) -> AgentKind {
        AgentKind::KnowledgeRetriever
    }

    async fn respond(&self, prompt: &str, history: &[HistoryMessage]) -> Result<String, AgentError> {
        let documents = self.retrieve(prompt).await?;
        tracing::debug!(hits = documents.len(), "Knowledge documents retrieved");

        let task = if documents.is_empty() {
            format!("Retrieve knowledge about: {prompt}\n\nNo knowledge base entries matched.")
        } else {
            format!(
                "Retrieve knowledge about: {prompt}\n\nKnowledge base excerpts:\n{}",
                render_documents(&documents)
            )
        };
        let messages = build_messages(&self.system_prompt, history, &task);
        let reply = self
            .llm
            .complete(&messages)
            .await
            .map_err(AgentError::LlmError)?;
        non_empty(self.kind(), reply)
    }
}
