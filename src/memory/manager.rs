//! 会话注册表：conversation_id -> ConversationState
//!
//! 首次引用时创建；同一 id 在进程生命周期内只会有一个实例。
//! 注册表由 RwLock 保护（插入时持写锁，避免并发重复创建），每个会话各自一把 Mutex，
//! Task Runner 在整轮流水线期间持有该锁，使同一会话的并发请求串行化。

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::memory::{ConversationSettings, ConversationState, HistoryMessage};

pub type SharedConversation = Arc<Mutex<ConversationState>>;

#[derive(Debug, Default)]
pub struct ConversationManager {
    conversation_states: RwLock<HashMap<String, SharedConversation>>,
    settings: ConversationSettings,
}

impl ConversationManager {
    pub fn new(settings: ConversationSettings) -> Self {
        Self {
            conversation_states: RwLock::new(HashMap::new()),
            settings,
        }
    }

    pub fn settings(&self) -> &ConversationSettings {
        &self.settings
    }

    /// 返回已有会话，或创建并登记一个新的
    pub async fn get_or_create_conversation_state(&self, conversation_id: &str) -> SharedConversation {
        if let Some(state) = self.conversation_states.read().await.get(conversation_id) {
            return Arc::clone(state);
        }

        let mut states = self.conversation_states.write().await;
        let state = states
            .entry(conversation_id.to_string())
            .or_insert_with(|| {
                tracing::info!(conversation_id, "Created new conversation state");
                Arc::new(Mutex::new(ConversationState::new(
                    conversation_id,
                    &self.settings,
                )))
            });
        Arc::clone(state)
    }

    /// 只读查找，不会创建新会话
    pub async fn get(&self, conversation_id: &str) -> Option<SharedConversation> {
        self.conversation_states.read().await.get(conversation_id).cloned()
    }

    /// 清空指定会话；未知 id 时什么也不做
    pub async fn clear_conversation_state(&self, conversation_id: &str) {
        match self.get(conversation_id).await {
            Some(state) => state.lock().await.clear_history(),
            None => tracing::debug!(conversation_id, "Clear requested for unknown conversation"),
        }
    }

    /// 会话历史的拷贝；未知 id 返回空
    pub async fn get_conversation_history(&self, conversation_id: &str) -> Vec<HistoryMessage> {
        match self.get(conversation_id).await {
            Some(state) => state.lock().await.get_history().to_vec(),
            None => Vec::new(),
        }
    }

    pub async fn contains(&self, conversation_id: &str) -> bool {
        self.conversation_states.read().await.contains_key(conversation_id)
    }

    pub async fn len(&self) -> usize {
        self.conversation_states.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.conversation_states.read().await.is_empty()
    }

    /// 丢弃全部会话（进程停止时调用）
    pub async fn clear_all(&self) {
        let mut states = self.conversation_states.write().await;
        let count = states.len();
        states.clear();
        tracing::info!(count, "Conversation registry cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MessageType;

    #[tokio::test]
    async fn test_get_or_create_is_identity_stable() {
        let manager = ConversationManager::default();
        let a = manager.get_or_create_conversation_state("c1").await;
        let b = manager.get_or_create_conversation_state("c1").await;
        let other = manager.get_or_create_conversation_state("c2").await;
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &other));
        assert_eq!(manager.len().await, 2);
    }

    #[tokio::test]
    async fn test_new_state_uses_settings() {
        let manager = ConversationManager::new(ConversationSettings {
            max_history_length: 4,
            model_type: "gemini".to_string(),
            default_cost_per_token: 0.1,
        });
        let state = manager.get_or_create_conversation_state("c1").await;
        let state = state.lock().await;
        assert_eq!(state.conversation_id(), "c1");
        assert_eq!(state.max_history_length(), 4);
        assert_eq!(state.cost_per_token(), 0.00000025);
    }

    #[tokio::test]
    async fn test_clear_unknown_id_is_noop() {
        let manager = ConversationManager::default();
        manager.clear_conversation_state("missing").await;
        assert!(manager.is_empty().await);
        assert!(!manager.contains("missing").await);
    }

    #[tokio::test]
    async fn test_clear_delegates_to_state() {
        let manager = ConversationManager::default();
        let state = manager.get_or_create_conversation_state("c1").await;
        state
            .lock()
            .await
            .append_message("hello", MessageType::KnowledgeRetrieval);
        assert_eq!(manager.get_conversation_history("c1").await.len(), 1);

        manager.clear_conversation_state("c1").await;
        assert!(manager.get_conversation_history("c1").await.is_empty());
        assert!(manager.contains("c1").await);
    }

    #[tokio::test]
    async fn test_history_of_unknown_id_is_empty() {
        let manager = ConversationManager::default();
        assert!(manager.get_conversation_history("nope").await.is_empty());
        assert!(manager.is_empty().await);
    }

    #[tokio::test]
    async fn test_concurrent_creation_yields_single_instance() {
        let manager = Arc::new(ConversationManager::default());
        let handles = (0..16).map(|_| {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move { manager.get_or_create_conversation_state("shared").await })
        });
        let states: Vec<SharedConversation> = futures_util::future::join_all(handles)
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();
        assert!(states.iter().all(|s| Arc::ptr_eq(s, &states[0])));
        assert_eq!(manager.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_never_creates() {
        let manager = ConversationManager::default();
        assert!(manager.get("c1").await.is_none());
        assert!(manager.is_empty().await);

        let created = manager.get_or_create_conversation_state("c1").await;
        let found = manager.get("c1").await.unwrap();
        assert!(Arc::ptr_eq(&created, &found));

        manager.clear_all().await;
        assert!(manager.get("c1").await.is_none());
        assert!(manager.is_empty().await);
    }

    #[tokio::test]
    async fn test_clear_all_drops_states() {
        let manager = ConversationManager::default();
        manager.get_or_create_conversation_state("a").await;
        manager.get_or_create_conversation_state("b").await;
        manager.clear_all().await;
        assert!(manager.is_empty().await);
    }
}
