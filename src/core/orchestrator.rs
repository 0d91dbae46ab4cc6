//! 编排上下文：启动时显式构建，注入 CLI 循环与 HTTP handler
//!
//! 负责：加载 Prompt 与知识库、创建 LLM 与四个专家、持有会话注册表；
//! chat() 取得会话锁后跑完整流水线，保证同一会话的请求串行执行；
//! consult() 把问题交给单个专家（如 GraphQL 生成），只读会话历史，不写历史也不计成本。

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::agents::{
    AgentKind, CodeGenerator, GraphqlGenerator, KnowledgeRetriever, PromptRegistry,
    SpecialistAgents, SqlGenerator,
};
use crate::config::{AppConfig, KnowledgeSection};
use crate::core::task_runner::{run_task, TaskResult, TaskRun};
use crate::core::{AgentError, SetupError, TaskError};
use crate::knowledge::{
    load_documents, HttpKnowledgeBase, InMemoryKnowledgeBase, KnowledgeBase,
};
use crate::llm::{create_llm_from_config, LlmClient};
use crate::memory::{ConversationManager, ConversationSettings, HistoryMessage, UsageSnapshot};

pub struct OrchestrationContext {
    agents: SpecialistAgents,
    manager: ConversationManager,
    stage_timeout: Duration,
}

impl OrchestrationContext {
    pub fn new(agents: SpecialistAgents, manager: ConversationManager, stage_timeout: Duration) -> Self {
        Self {
            agents,
            manager,
            stage_timeout,
        }
    }

    /// 按配置构建全部组件；任何错误都是启动期致命错误
    pub async fn from_config(cfg: &AppConfig) -> Result<Self, SetupError> {
        cfg.validate()?;
        let llm = create_llm_from_config(cfg)?;
        Self::with_llm(cfg, llm).await
    }

    /// 与 from_config 相同，但使用外部提供的 LLM 客户端
    pub async fn with_llm(cfg: &AppConfig, llm: Arc<dyn LlmClient>) -> Result<Self, SetupError> {
        let prompts = PromptRegistry::load(cfg.agents.prompts_path.as_deref())?;
        let knowledge = build_knowledge_base(&cfg.knowledge, cfg.knowledge.documents_dir.as_deref()).await?;
        let schema = match &cfg.knowledge.schema_dir {
            Some(dir) => build_knowledge_base(&cfg.knowledge, Some(dir.as_path())).await?,
            None => None,
        };
        let graphql_schema = match &cfg.knowledge.graphql_schema_dir {
            Some(dir) => build_knowledge_base(&cfg.knowledge, Some(dir.as_path())).await?,
            None => None,
        };

        let mut knowledge_agent = KnowledgeRetriever::new(
            llm.clone(),
            prompts.get(AgentKind::KnowledgeRetriever.as_str())?,
        );
        if let Some(kb) = knowledge {
            knowledge_agent = knowledge_agent.with_knowledge(kb, cfg.knowledge.top_k);
        }
        let mut sql_agent = SqlGenerator::new(llm.clone(), prompts.get(AgentKind::SqlGenerator.as_str())?);
        if let Some(kb) = schema {
            sql_agent = sql_agent.with_schema(kb, cfg.knowledge.top_k);
        }
        let mut graphql_agent =
            GraphqlGenerator::new(llm.clone(), prompts.get(AgentKind::GraphqlGenerator.as_str())?);
        if let Some(kb) = graphql_schema {
            graphql_agent = graphql_agent.with_schema(kb, cfg.knowledge.top_k);
        }
        let code_agent = CodeGenerator::new(llm, prompts.get(AgentKind::CodeGenerator.as_str())?);

        let agents = SpecialistAgents::new(
            Arc::new(knowledge_agent),
            Arc::new(sql_agent),
            Arc::new(code_agent),
        )
        .with_graphql(Arc::new(graphql_agent));
        let manager = ConversationManager::new(ConversationSettings {
            max_history_length: cfg.app.max_history_length,
            model_type: cfg.app.model_type.clone(),
            default_cost_per_token: cfg.app.default_cost_per_token,
        });
        tracing::info!(model_type = %cfg.app.model_type, "Agents initialized successfully");
        Ok(Self::new(
            agents,
            manager,
            Duration::from_secs(cfg.agents.stage_timeout_secs),
        ))
    }

    pub fn manager(&self) -> &ConversationManager {
        &self.manager
    }

    pub fn stage_timeout(&self) -> Duration {
        self.stage_timeout
    }

    /// 对指定会话跑一轮流水线，返回完整运行信息
    pub async fn run(&self, conversation_id: &str, query: &str) -> Result<TaskRun, TaskError> {
        let state = self.manager.get_or_create_conversation_state(conversation_id).await;
        let mut state = state.lock().await;
        let run = run_task(&self.agents, query, &mut state, self.stage_timeout).await?;
        if run.is_completed() {
            tracing::info!(
                conversation_id,
                total_tokens = state.total_tokens(),
                total_cost = state.total_cost(),
                "Task run completed"
            );
        }
        Ok(run)
    }

    /// 对外接口：只返回三段结果（失败时为哨兵三元组）
    pub async fn chat(&self, conversation_id: &str, query: &str) -> Result<TaskResult, TaskError> {
        Ok(self.run(conversation_id, query).await?.result)
    }

    pub async fn clear(&self, conversation_id: &str) {
        self.manager.clear_conversation_state(conversation_id).await;
    }

    pub async fn history(&self, conversation_id: &str) -> Vec<HistoryMessage> {
        self.manager.get_conversation_history(conversation_id).await
    }

    /// 已存在会话的用量；未知 id 返回 None
    pub async fn usage(&self, conversation_id: &str) -> Option<UsageSnapshot> {
        let state = self.manager.get(conversation_id).await?;
        let usage = state.lock().await.usage();
        Some(usage)
    }

    /// 单独咨询一个专家：以会话当前历史为上下文，受阶段超时约束
    ///
    /// 未知会话按空历史处理且不会被创建。
    pub async fn consult(
        &self,
        kind: AgentKind,
        conversation_id: &str,
        prompt: &str,
    ) -> Result<String, AgentError> {
        let agent = self
            .agents
            .get(kind)
            .ok_or_else(|| AgentError::Unavailable(kind.to_string()))?;
        let history = self.manager.get_conversation_history(conversation_id).await;
        let reply = tokio::time::timeout(self.stage_timeout, agent.respond(prompt, &history))
            .await
            .map_err(|_| {
                AgentError::Timeout(format!("{kind} exceeded {}s", self.stage_timeout.as_secs()))
            })?;
        match &reply {
            Ok(_) => tracing::info!(conversation_id, agent = %kind, "Consultation completed"),
            Err(e) => tracing::warn!(conversation_id, agent = %kind, error = %e, "Consultation failed"),
        }
        reply
    }

    /// 进程停止时调用：释放全部会话
    pub async fn shutdown(&self) {
        tracing::info!("Shutting down...");
        self.manager.clear_all().await;
        tracing::info!("Agents cleared successfully");
    }
}

/// 按 [knowledge].backend 构建知识库；memory 后端在 dir 存在时加载其中文档
async fn build_knowledge_base(
    section: &KnowledgeSection,
    dir: Option<&Path>,
) -> Result<Option<Arc<dyn KnowledgeBase>>, SetupError> {
    match section.backend.as_str() {
        "none" => Ok(None),
        "http" => {
            let endpoint = section.endpoint.as_deref().ok_or_else(|| {
                SetupError::Knowledge("knowledge.endpoint is required for the http backend".to_string())
            })?;
            let kb = HttpKnowledgeBase::new(endpoint, 30)
                .map_err(|e| SetupError::Knowledge(e.to_string()))?;
            Ok(Some(Arc::new(kb)))
        }
        "memory" => {
            let kb = InMemoryKnowledgeBase::new(section.max_entries);
            match dir {
                Some(dir) if dir.is_dir() => {
                    let documents = load_documents(dir, section.chunk_size, section.chunk_overlap)?;
                    kb.add_documents(documents)
                        .await
                        .map_err(|e| SetupError::Knowledge(e.to_string()))?;
                }
                Some(dir) => {
                    tracing::warn!(dir = %dir.display(), "Knowledge directory not found, starting empty");
                }
                None => {}
            }
            Ok(Some(Arc::new(kb)))
        }
        other => Err(SetupError::UnsupportedKnowledgeBackend(other.to_string())),
    }
}
