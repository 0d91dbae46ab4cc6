//! Mock LLM 客户端（用于本地运行与测试，无需 API）
//!
//! 取最后一条 User 消息回显，并附上 system prompt 的首行，便于看出是哪个专家在回答。

use async_trait::async_trait;

use crate::llm::LlmClient;
use crate::memory::{Message, Role};

#[derive(Debug, Default)]
pub struct MockLlmClient;

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, String> {
        let persona = messages
            .iter()
            .find(|m| matches!(m.role, Role::System))
            .and_then(|m| m.content.trim().lines().next())
            .unwrap_or("assistant");
        let last_user = messages
            .iter()
            .rev()
            .find(|m| matches!(m.role, Role::User))
            .map(|m| m.content.as_str())
            .unwrap_or("(no input)");

        Ok(format!("[mock: {}] {}", persona, last_user))
    }

    fn model(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_echoes_last_user_message() {
        let client = MockLlmClient;
        let reply = client
            .complete(&[
                Message::system("You are a SQL query generator.\nMore rules."),
                Message::user("first"),
                Message::assistant("ignored"),
                Message::user("list users"),
            ])
            .await
            .unwrap();
        assert_eq!(reply, "[mock: You are a SQL query generator.] list users");
    }
}
