//! 会话记忆：消息类型、单会话状态、会话注册表

pub mod conversation;
pub mod manager;
pub mod message;

pub use conversation::{ConversationSettings, ConversationState, UsageSnapshot};
pub use manager::{ConversationManager, SharedConversation};
pub use message::{history_to_json, HistoryMessage, Message, MessageType, Role};
