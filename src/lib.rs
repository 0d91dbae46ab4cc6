//! Consilium - 多智能体编排服务
//!
//! 模块划分：
//! - **agents**: 专家 Agent 能力接口、四个专家实现、Prompt 映射表
//! - **cli**: 命令行参数（clap）与交互命令
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型、成本函数、Task Runner、编排上下文
//! - **knowledge**: 知识库接口（内存 / HTTP）与文档切分
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / Mock）
//! - **memory**: 消息类型、单会话状态、会话注册表
//! - **web**: HTTP 接口（feature = "web"）

pub mod agents;
pub mod cli;
pub mod config;
pub mod core;
pub mod knowledge;
pub mod llm;
pub mod memory;
pub mod observability;
#[cfg(feature = "web")]
pub mod web;

pub use crate::core::{OrchestrationContext, TaskResult};
