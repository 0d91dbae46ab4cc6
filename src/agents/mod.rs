//! 专家 Agent：能力接口、四个具体专家与 Prompt 映射表

pub mod code;
pub mod graphql;
pub mod knowledge;
pub mod prompts;
pub mod sql;
pub mod traits;

use std::sync::Arc;

pub use code::CodeGenerator;
pub use graphql::GraphqlGenerator;
pub use knowledge::KnowledgeRetriever;
pub use prompts::PromptRegistry;
pub use sql::SqlGenerator;
pub use traits::{build_messages, Agent, AgentKind};

/// 全部专家：knowledge / sql / code 组成 Task Runner 的三段流水线，
/// graphql 不在流水线内，只能单独咨询
#[derive(Clone)]
pub struct SpecialistAgents {
    pub knowledge: Arc<dyn Agent>,
    pub sql: Arc<dyn Agent>,
    pub code: Arc<dyn Agent>,
    pub graphql: Option<Arc<dyn Agent>>,
}

impl SpecialistAgents {
    pub fn new(knowledge: Arc<dyn Agent>, sql: Arc<dyn Agent>, code: Arc<dyn Agent>) -> Self {
        Self {
            knowledge,
            sql,
            code,
            graphql: None,
        }
    }

    pub fn with_graphql(mut self, graphql: Arc<dyn Agent>) -> Self {
        self.graphql = Some(graphql);
        self
    }

    /// 按类别取专家；未配置的返回 None
    pub fn get(&self, kind: AgentKind) -> Option<&Arc<dyn Agent>> {
        match kind {
            AgentKind::KnowledgeRetriever => Some(&self.knowledge),
            AgentKind::SqlGenerator => Some(&self.sql),
            AgentKind::CodeGenerator => Some(&self.code),
            AgentKind::GraphqlGenerator => self.graphql.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::core::AgentError;
    use crate::knowledge::{Document, InMemoryKnowledgeBase, KnowledgeBase};
    use crate::llm::LlmClient;
    use crate::memory::{HistoryMessage, Message, MessageType, Role};

    /// 记录收到的消息，按预设返回
    struct RecordingLlm {
        reply: Result<String, String>,
        seen: Mutex<Vec<Vec<Message>>>,
    }

    impl RecordingLlm {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn failing(err: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(err.to_string()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn last_user(&self) -> String {
            let seen = self.seen.lock().unwrap();
            let messages = seen.last().unwrap();
            messages
                .iter()
                .rev()
                .find(|m| m.role == Role::User)
                .map(|m| m.content.clone())
                .unwrap()
        }
    }

    #[async_trait]
    impl LlmClient for RecordingLlm {
        async fn complete(&self, messages: &[Message]) -> Result<String, String> {
            self.seen.lock().unwrap().push(messages.to_vec());
            self.reply.clone()
        }

        fn model(&self) -> &str {
            "recording"
        }
    }

    #[tokio::test]
    async fn test_knowledge_retriever_stuffs_documents() {
        let llm = RecordingLlm::replying("Users have id and email.");
        let kb = Arc::new(InMemoryKnowledgeBase::default());
        kb.add_documents(vec![Document::new(
            "user records have id and email",
            Some("users.md".to_string()),
        )])
        .await
        .unwrap();

        let agent = KnowledgeRetriever::new(llm.clone(), "You are a knowledge retriever.")
            .with_knowledge(kb, 3);
        let reply = agent.respond("user email", &[]).await.unwrap();

        assert_eq!(reply, "Users have id and email.");
        let prompt = llm.last_user();
        assert!(prompt.starts_with("Retrieve knowledge about: user email"));
        assert!(prompt.contains("[users.md]"));
        assert_eq!(agent.kind(), AgentKind::KnowledgeRetriever);
    }

    #[tokio::test]
    async fn test_sql_generator_passes_history() {
        let llm = RecordingLlm::replying("```sql\nSELECT * FROM users;\n```");
        let agent = SqlGenerator::new(llm.clone(), "You are a SQL query generator.");
        let history = vec![HistoryMessage::new("users(id)", MessageType::KnowledgeRetrieval)];

        agent.respond("all users", &history).await.unwrap();

        let seen = llm.seen.lock().unwrap();
        let messages = &seen[0];
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].content, "[knowledge_retrieval] users(id)");
        assert_eq!(messages[2].content, "Generate a SQL query for: all users");
    }

    #[tokio::test]
    async fn test_sql_generator_adds_schema_context() {
        let llm = RecordingLlm::replying("SELECT 1");
        let schema = Arc::new(InMemoryKnowledgeBase::default());
        schema
            .add_documents(vec![Document::new("CREATE TABLE orders (id INT, user_id INT)", None)])
            .await
            .unwrap();
        let agent = SqlGenerator::new(llm.clone(), "sql").with_schema(schema, 2);

        agent.respond("count orders", &[]).await.unwrap();
        assert!(llm.last_user().contains("Relevant schema:\nCREATE TABLE orders"));
    }

    #[tokio::test]
    async fn test_graphql_generator_adds_schema_context() {
        let llm = RecordingLlm::replying("```graphql\nquery { users { id } }\n```");
        let schema = Arc::new(InMemoryKnowledgeBase::default());
        schema
            .add_documents(vec![Document::new(
                "type User { id: ID! email: String orders: [Order] }",
                Some("schema.graphql".to_string()),
            )])
            .await
            .unwrap();
        let agent = GraphqlGenerator::new(llm.clone(), "You are a GraphQL query generator.")
            .with_schema(schema, 2);
        let history = vec![HistoryMessage::new("users(id)", MessageType::KnowledgeRetrieval)];

        let reply = agent.respond("user email", &history).await.unwrap();
        assert!(reply.contains("query { users { id } }"));
        assert_eq!(agent.kind(), AgentKind::GraphqlGenerator);

        let prompt = llm.last_user();
        assert!(prompt.starts_with("Generate a GraphQL query for: user email"));
        assert!(prompt.contains("Relevant GraphQL schema:\n[schema.graphql]\ntype User"));
        let seen = llm.seen.lock().unwrap();
        assert_eq!(seen[0][1].content, "[knowledge_retrieval] users(id)");
    }

    #[test]
    fn test_graphql_is_outside_the_pipeline_until_added() {
        let llm: Arc<dyn LlmClient> = RecordingLlm::replying("x");
        let agents = SpecialistAgents::new(
            Arc::new(KnowledgeRetriever::new(llm.clone(), "k")),
            Arc::new(SqlGenerator::new(llm.clone(), "s")),
            Arc::new(CodeGenerator::new(llm.clone(), "c")),
        );
        assert!(agents.get(AgentKind::GraphqlGenerator).is_none());
        assert_eq!(
            agents.get(AgentKind::SqlGenerator).map(|a| a.kind()),
            Some(AgentKind::SqlGenerator)
        );

        let agents = agents.with_graphql(Arc::new(GraphqlGenerator::new(llm, "g")));
        assert_eq!(
            agents.get(AgentKind::GraphqlGenerator).map(|a| a.kind()),
            Some(AgentKind::GraphqlGenerator)
        );
    }

    #[tokio::test]
    async fn test_llm_failure_maps_to_agent_error() {
        let agent = CodeGenerator::new(RecordingLlm::failing("503"), "code");
        let err = agent.respond("x", &[]).await.unwrap_err();
        assert!(matches!(err, AgentError::LlmError(ref m) if m == "503"));
    }

    #[tokio::test]
    async fn test_empty_reply_is_malformed() {
        let agent = CodeGenerator::new(RecordingLlm::replying("   "), "code");
        let err = agent.respond("x", &[]).await.unwrap_err();
        assert!(matches!(err, AgentError::MalformedResponse(_)));
    }
}
