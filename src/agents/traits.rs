//! 专家 Agent 能力接口
//!
//! 编排核心只依赖 Agent::respond(prompt, history) -> text；每个专家一个具体实现，
//! 由 LlmClient + system prompt（+ 可选知识库）组合而成。

use std::fmt;

use async_trait::async_trait;

use crate::core::AgentError;
use crate::memory::{HistoryMessage, Message};

/// 专家类别
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AgentKind {
    KnowledgeRetriever,
    SqlGenerator,
    GraphqlGenerator,
    CodeGenerator,
}

impl AgentKind {
    /// 同时也是 PromptRegistry 中的键
    pub fn as_str(self) -> &'static str {
        match self {
            AgentKind::KnowledgeRetriever => "knowledge_retriever",
            AgentKind::SqlGenerator => "sql_generator",
            AgentKind::GraphqlGenerator => "graphql_generator",
            AgentKind::CodeGenerator => "code_generator",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[async_trait]
pub trait Agent: Send + Sync {
    fn kind(&self) -> AgentKind;

    /// 根据 prompt 与当前会话历史给出文本结果；传输或模型失败时返回 AgentError
    async fn respond(&self, prompt: &str, history: &[HistoryMessage]) -> Result<String, AgentError>;
}

/// system prompt + 历史（作为先前的 assistant 轮次）+ 本轮 user 消息
pub fn build_messages(system_prompt: &str, history: &[HistoryMessage], prompt: &str) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(Message::system(system_prompt));
    messages.extend(
        history
            .iter()
            .map(|h| Message::assistant(format!("[{}] {}", h.message_type, h.content))),
    );
    messages.push(Message::user(prompt));
    messages
}

/// 空回复视为格式错误
pub(crate) fn non_empty(kind: AgentKind, reply: String) -> Result<String, AgentError> {
    if reply.trim().is_empty() {
        return Err(AgentError::MalformedResponse(format!("{kind} returned an empty reply")));
    }
    Ok(reply)
}
