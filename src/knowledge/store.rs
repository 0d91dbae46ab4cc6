//! 知识库检索
//!
//! KnowledgeBase 支持 add_documents 与 similarity_search(query, k)。
//! InMemoryKnowledgeBase 按关键词重叠打分；HttpKnowledgeBase 转发给外部检索服务。

use std::collections::HashSet;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::AgentError;

/// 一段可检索的文档片段
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    /// 来源（文件名或外部 id）
    #[serde(default)]
    pub source: Option<String>,
}

impl Document {
    pub fn new(content: impl Into<String>, source: Option<String>) -> Self {
        Self {
            content: content.into(),
            source,
        }
    }
}

#[async_trait]
pub trait KnowledgeBase: Send + Sync {
    async fn add_documents(&self, documents: Vec<Document>) -> Result<(), AgentError>;

    /// 按查询检索最相关的 k 条
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<Document>, AgentError>;
}

/// 将文本切分为小写词集合，用于简单相似度（词重叠数）
fn tokenize_lower(s: &str) -> HashSet<String> {
    s.split(|c: char| !c.is_alphanumeric() && c != '_')
        .map(|w| w.to_lowercase())
        .filter(|w| w.len() > 1)
        .collect()
}

/// 内存实现：按关键词重叠检索，超过 max_entries 时丢弃最早写入的片段
#[derive(Clone)]
pub struct InMemoryKnowledgeBase {
    store: Arc<RwLock<Vec<(Document, HashSet<String>)>>>,
    max_entries: usize,
}

impl InMemoryKnowledgeBase {
    pub fn new(max_entries: usize) -> Self {
        Self {
            store: Arc::new(RwLock::new(Vec::new())),
            max_entries,
        }
    }

    pub fn len(&self) -> usize {
        self.store.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryKnowledgeBase {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[async_trait]
impl KnowledgeBase for InMemoryKnowledgeBase {
    async fn add_documents(&self, documents: Vec<Document>) -> Result<(), AgentError> {
        let mut store = self
            .store
            .write()
            .map_err(|e| AgentError::KnowledgeError(e.to_string()))?;
        for doc in documents {
            if doc.content.trim().is_empty() {
                continue;
            }
            let tokens = tokenize_lower(&doc.content);
            store.push((doc, tokens));
        }
        let n = store.len();
        if n > self.max_entries {
            store.drain(0..n - self.max_entries);
        }
        Ok(())
    }

    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<Document>, AgentError> {
        let query_tokens = tokenize_lower(query);
        if query_tokens.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        let store = self
            .store
            .read()
            .map_err(|e| AgentError::KnowledgeError(e.to_string()))?;
        let mut scored: Vec<(usize, &Document)> = store
            .iter()
            .map(|(doc, tokens)| (query_tokens.intersection(tokens).count(), doc))
            .filter(|(score, _)| *score > 0)
            .collect();
        // 稳定排序：同分时保持写入顺序
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(scored.into_iter().take(k).map(|(_, d)| d.clone()).collect())
    }
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    k: usize,
}

#[derive(Serialize)]
struct AddRequest<'a> {
    documents: &'a [Document],
}

#[derive(Deserialize)]
struct SearchResponse {
    documents: Vec<Document>,
}

/// 外部检索服务适配器：POST {endpoint}/search 与 POST {endpoint}/documents
pub struct HttpKnowledgeBase {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpKnowledgeBase {
    pub fn new(endpoint: &str, timeout_secs: u64) -> Result<Self, AgentError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AgentError::KnowledgeError(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl KnowledgeBase for HttpKnowledgeBase {
    async fn add_documents(&self, documents: Vec<Document>) -> Result<(), AgentError> {
        self.client
            .post(format!("{}/documents", self.endpoint))
            .json(&AddRequest {
                documents: &documents,
            })
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AgentError::KnowledgeError(e.to_string()))?;
        Ok(())
    }

    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<Document>, AgentError> {
        let response = self
            .client
            .post(format!("{}/search", self.endpoint))
            .json(&SearchRequest { query, k })
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AgentError::KnowledgeError(e.to_string()))?;
        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| AgentError::MalformedResponse(e.to_string()))?;
        Ok(body.documents)
    }
}
