//! 消息类型
//!
//! - HistoryMessage：会话历史中的一条记录（内容 + 来源阶段），对外以 `{content, type}` 序列化
//! - Message / Role：发给 LLM 的对话消息

use std::fmt;

use serde::{Deserialize, Serialize};

/// 历史记录的来源阶段
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    KnowledgeRetrieval,
    SqlGeneration,
    CodeGeneration,
}

impl MessageType {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageType::KnowledgeRetrieval => "knowledge_retrieval",
            MessageType::SqlGeneration => "sql_generation",
            MessageType::CodeGeneration => "code_generation",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 会话历史中的单条记录
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub content: String,
    #[serde(rename = "type")]
    pub message_type: MessageType,
}

impl HistoryMessage {
    pub fn new(content: impl Into<String>, message_type: MessageType) -> Self {
        Self {
            content: content.into(),
            message_type,
        }
    }
}

/// 消息角色（与 LLM API 一致）
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Assistant,
    System,
}

/// 发给 LLM 的单条消息
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// 把会话历史编码为 JSON 数组文本，嵌入下游阶段的任务描述
pub fn history_to_json(history: &[HistoryMessage]) -> String {
    serde_json::to_string(history).unwrap_or_else(|_| "[]".to_string())
}
