//! 错误类型
//!
//! - SetupError：启动期配置错误（模型类型、凭据、Prompt、知识库目录），致命，进程不对外服务
//! - AgentError：单个专家 Agent 调用失败，由 Task Runner 在阶段内吸收为哨兵字符串
//! - CostError：成本计算时遇到未知模型类型，必须向调用方传播
//! - TaskError：Task Runner 向调用方返回的错误（HTTP 500）

use thiserror::Error;

/// 专家 Agent 调用过程中的失败（网络、模型、检索、超时）
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Knowledge lookup failed: {0}")]
    KnowledgeError(String),

    #[error("Agent timeout: {0}")]
    Timeout(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Agent not available: {0}")]
    Unavailable(String),
}

/// 成本函数错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CostError {
    #[error("Unknown model type: {0}")]
    UnknownModelType(String),
}

/// Task Runner 无法在本地恢复、需要交给调用方的错误
#[derive(Error, Debug)]
pub enum TaskError {
    #[error(transparent)]
    Cost(#[from] CostError),
}

/// 启动期错误：任何一个都会阻止进程开始处理请求
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid model type: {0}")]
    InvalidModelType(String),

    #[error("Unsupported LLM provider: {0}")]
    UnsupportedProvider(String),

    #[error("Missing credential: {0} is not set")]
    MissingCredential(String),

    #[error("Prompt '{0}' not found")]
    PromptNotFound(String),

    #[error("Invalid prompt file {path}: {source}")]
    PromptFile {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Unsupported knowledge backend: {0}")]
    UnsupportedKnowledgeBackend(String),

    #[error("Knowledge base error: {0}")]
    Knowledge(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
