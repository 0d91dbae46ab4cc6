//! 单个会话的状态：有界历史 + 累计用量成本
//!
//! 历史超出 max_history_length 时按 FIFO 丢弃最旧的一条；成本在每个完整任务周期结束后累加一次。

use serde::Serialize;

use crate::core::cost::{cost_per_token, estimate_tokens, ModelType};
use crate::core::CostError;
use crate::memory::{HistoryMessage, MessageType};

/// 新建会话时使用的参数（由 ConversationManager 统一持有）
#[derive(Clone, Debug)]
pub struct ConversationSettings {
    pub max_history_length: usize,
    pub model_type: String,
    /// 模型类型不属于已知家族时的展示用单价
    pub default_cost_per_token: f64,
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self {
            max_history_length: 10,
            model_type: "openai".to_string(),
            default_cost_per_token: 0.000002,
        }
    }
}

/// 会话用量快照
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UsageSnapshot {
    pub conversation_id: String,
    pub total_tokens: u64,
    pub total_cost: f64,
    pub last_message_cost: f64,
}

#[derive(Debug)]
pub struct ConversationState {
    conversation_id: String,
    history: Vec<HistoryMessage>,
    max_history_length: usize,
    model_type: String,
    cost_per_token: f64,
    last_message_cost: f64,
    total_tokens: u64,
    total_cost: f64,
}

impl ConversationState {
    pub fn new(conversation_id: impl Into<String>, settings: &ConversationSettings) -> Self {
        let cost_per_token = settings
            .model_type
            .parse::<ModelType>()
            .map(ModelType::rate)
            .unwrap_or(settings.default_cost_per_token);
        Self {
            conversation_id: conversation_id.into(),
            history: Vec::new(),
            max_history_length: settings.max_history_length,
            model_type: settings.model_type.clone(),
            cost_per_token,
            last_message_cost: 0.0,
            total_tokens: 0,
            total_cost: 0.0,
        }
    }

    /// 追加一条记录；超出上限时移除最旧的一条
    pub fn append_message(&mut self, content: impl Into<String>, message_type: MessageType) {
        self.history.push(HistoryMessage::new(content, message_type));
        if self.history.len() > self.max_history_length {
            let excess = self.history.len() - self.max_history_length;
            self.history.drain(..excess);
        }
        tracing::info!(
            conversation_id = %self.conversation_id,
            message_type = %message_type,
            history_len = self.history.len(),
            "Appended message"
        );
    }

    pub fn get_history(&self) -> &[HistoryMessage] {
        &self.history
    }

    /// 最近 n 条（保持原顺序）；n 不小于历史长度时返回全部
    pub fn get_last_n_messages(&self, n: usize) -> &[HistoryMessage] {
        let history = self.get_history();
        if n >= history.len() {
            return history;
        }
        &history[history.len() - n..]
    }

    /// 清空历史并把所有计数归零；可重复调用
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.total_cost = 0.0;
        self.total_tokens = 0;
        self.last_message_cost = 0.0;
        tracing::info!(conversation_id = %self.conversation_id, "History cleared");
    }

    /// 按四段文本的词数估算 token 并累加成本，返回本轮成本
    ///
    /// 未知模型类型时返回错误，计数保持不变。
    pub fn calculate_usage_cost(
        &mut self,
        user_query: &str,
        knowledge_result: &str,
        sql_result: &str,
        code_result: &str,
    ) -> Result<f64, CostError> {
        let content = [user_query, knowledge_result, sql_result, code_result].concat();
        let num_tokens = estimate_tokens(&content);
        let cost = cost_per_token(&self.model_type, num_tokens)?;

        self.last_message_cost = cost;
        self.total_tokens += num_tokens;
        self.total_cost += cost;
        tracing::info!(
            conversation_id = %self.conversation_id,
            num_tokens,
            last_message_cost = self.last_message_cost,
            total_cost = self.total_cost,
            total_tokens = self.total_tokens,
            "Updated usage cost"
        );
        Ok(cost)
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    pub fn last_message_cost(&self) -> f64 {
        self.last_message_cost
    }

    pub fn total_tokens(&self) -> u64 {
        self.total_tokens
    }

    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    pub fn cost_per_token(&self) -> f64 {
        self.cost_per_token
    }

    pub fn model_type(&self) -> &str {
        &self.model_type
    }

    pub fn max_history_length(&self) -> usize {
        self.max_history_length
    }

    pub fn usage(&self) -> UsageSnapshot {
        UsageSnapshot {
            conversation_id: self.conversation_id.clone(),
            total_tokens: self.total_tokens,
            total_cost: self.total_cost,
            last_message_cost: self.last_message_cost,
        }
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}
