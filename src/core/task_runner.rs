//! Task Runner：知识检索 → SQL 生成 → 代码生成 三段串行流水线
//!
//! 每段的输入依赖上一段写入的会话历史，所以三段严格串行。
//! 每段返回显式的 StageOutcome；任一段失败即跳过后续阶段，返回固定的哨兵三元组，不计算成本。
//! 三段都成功后调用一次 calculate_usage_cost；未知模型类型作为 TaskError 传给调用方。

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::time::timeout;

use crate::agents::{Agent, SpecialistAgents};
use crate::core::{AgentError, TaskError};
use crate::memory::{history_to_json, ConversationState, MessageType};

pub const KNOWLEDGE_ERROR: &str = "Error during knowledge retrieval.";
pub const SQL_ERROR: &str = "Error during SQL query generation.";
pub const CODE_ERROR: &str = "Error during code generation.";

/// 默认单阶段超时
pub const DEFAULT_STAGE_TIMEOUT: Duration = Duration::from_secs(120);

/// 流水线阶段
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Knowledge,
    Sql,
    Code,
}

impl Stage {
    pub fn message_type(self) -> MessageType {
        match self {
            Stage::Knowledge => MessageType::KnowledgeRetrieval,
            Stage::Sql => MessageType::SqlGeneration,
            Stage::Code => MessageType::CodeGeneration,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message_type().as_str())
    }
}

/// 单个阶段的结果
#[derive(Debug)]
pub enum StageOutcome {
    Completed(String),
    Failed(AgentError),
}

/// 对外返回的三段结果
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub knowledge_result: String,
    pub sql_query_result: String,
    pub code_result: String,
}

impl TaskResult {
    /// 失败时返回的固定哨兵三元组
    pub fn sentinel() -> Self {
        Self {
            knowledge_result: KNOWLEDGE_ERROR.to_string(),
            sql_query_result: SQL_ERROR.to_string(),
            code_result: CODE_ERROR.to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    Failed { stage: Stage },
}

/// 一次完整运行：结果 + 是否成功
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TaskRun {
    pub result: TaskResult,
    pub status: RunStatus,
}

impl TaskRun {
    pub fn is_completed(&self) -> bool {
        matches!(self.status, RunStatus::Completed)
    }

    fn failed(stage: Stage) -> Self {
        Self {
            result: TaskResult::sentinel(),
            status: RunStatus::Failed { stage },
        }
    }
}

/// 调用一个专家，施加超时，并输出 JSON 审计日志
async fn run_stage(
    stage: Stage,
    agent: &dyn Agent,
    prompt: &str,
    state: &ConversationState,
    stage_timeout: Duration,
) -> StageOutcome {
    let start = Instant::now();
    let history = state.get_history();
    let result = timeout(stage_timeout, agent.respond(prompt, history)).await;

    let outcome = match result {
        Ok(Ok(content)) => StageOutcome::Completed(content),
        Ok(Err(e)) => StageOutcome::Failed(e),
        Err(_) => StageOutcome::Failed(AgentError::Timeout(format!(
            "{} exceeded {}s",
            agent.kind(),
            stage_timeout.as_secs()
        ))),
    };

    let label = match &outcome {
        StageOutcome::Completed(_) => "ok",
        StageOutcome::Failed(AgentError::Timeout(_)) => "timeout",
        StageOutcome::Failed(_) => "error",
    };
    let audit = serde_json::json!({
        "event": "stage_audit",
        "conversation_id": state.conversation_id(),
        "stage": stage.to_string(),
        "agent": agent.kind().as_str(),
        "history_len": history.len(),
        "ok": matches!(outcome, StageOutcome::Completed(_)),
        "outcome": label,
        "duration_ms": start.elapsed().as_millis() as u64,
    });
    tracing::info!(audit = %audit, "stage");
    outcome
}

fn sql_task(user_query: &str, state: &ConversationState) -> String {
    format!(
        "Based on this user query: {} , generate sql query, also the conversation history is: {}",
        user_query,
        history_to_json(state.get_history())
    )
}

fn code_task(user_query: &str, state: &ConversationState) -> String {
    format!(
        "Based on this user query: {} , generate python code, also the conversation history is: {}",
        user_query,
        history_to_json(state.get_history())
    )
}

/// 跑一个阶段：成功时写入历史并返回内容，失败时记录日志并返回 None
async fn complete_stage(
    stage: Stage,
    agent: &dyn Agent,
    prompt: &str,
    state: &mut ConversationState,
    stage_timeout: Duration,
) -> Option<String> {
    match run_stage(stage, agent, prompt, state, stage_timeout).await {
        StageOutcome::Completed(content) => {
            state.append_message(content.clone(), stage.message_type());
            Some(content)
        }
        StageOutcome::Failed(err) => {
            tracing::error!(
                conversation_id = %state.conversation_id(),
                stage = %stage,
                error = %err,
                "Task run failed, skipping remaining stages"
            );
            None
        }
    }
}

/// 跑完整的三段流水线，结果逐段写入会话历史
///
/// 调用方需独占 `state`（同一会话的并发请求由会话锁串行化）。
pub async fn run_task(
    agents: &SpecialistAgents,
    user_query: &str,
    state: &mut ConversationState,
    stage_timeout: Duration,
) -> Result<TaskRun, TaskError> {
    let Some(knowledge_result) = complete_stage(
        Stage::Knowledge,
        agents.knowledge.as_ref(),
        user_query,
        state,
        stage_timeout,
    )
    .await
    else {
        return Ok(TaskRun::failed(Stage::Knowledge));
    };

    let task = sql_task(user_query, state);
    let Some(sql_query_result) =
        complete_stage(Stage::Sql, agents.sql.as_ref(), &task, state, stage_timeout).await
    else {
        return Ok(TaskRun::failed(Stage::Sql));
    };

    let task = code_task(user_query, state);
    let Some(code_result) =
        complete_stage(Stage::Code, agents.code.as_ref(), &task, state, stage_timeout).await
    else {
        return Ok(TaskRun::failed(Stage::Code));
    };

    state.calculate_usage_cost(user_query, &knowledge_result, &sql_query_result, &code_result)?;

    Ok(TaskRun {
        result: TaskResult {
            knowledge_result,
            sql_query_result,
            code_result,
        },
        status: RunStatus::Completed,
    })
}
