//! 知识库协作方：文档检索接口、内存与 HTTP 实现、文档加载与切分
//!
//! 相似度算法本身不在本系统职责内：内存实现只做词重叠排序，真实向量检索交给外部服务（HttpKnowledgeBase）。

pub mod loader;
pub mod store;

pub use loader::{chunk_text, load_documents};
pub use store::{Document, HttpKnowledgeBase, InMemoryKnowledgeBase, KnowledgeBase};
