//! 文档加载与切分
//!
//! 读取目录下的 .txt / .md 文件，按字符窗口切成有重叠的片段（默认 1000 / 100）。

use std::path::Path;

use crate::knowledge::Document;

const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "md"];

/// 按字符数切分，相邻片段重叠 chunk_overlap 个字符；overlap 不小于 size 时按 size - 1 处理
pub fn chunk_text(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() || chunk_size == 0 {
        return Vec::new();
    }
    let overlap = chunk_overlap.min(chunk_size - 1);
    let step = chunk_size - overlap;

    let mut chunks = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + chunk_size).min(chars.len());
        let chunk: String = chars[start..end].iter().collect();
        if !chunk.trim().is_empty() {
            chunks.push(chunk);
        }
        if end == chars.len() {
            break;
        }
        start += step;
    }
    chunks
}

/// 加载目录下所有支持的文件并切分；按文件名排序，保证结果稳定
pub fn load_documents(
    dir: &Path,
    chunk_size: usize,
    chunk_overlap: usize,
) -> std::io::Result<Vec<Document>> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|e| e.to_str())
                    .map(|e| SUPPORTED_EXTENSIONS.contains(&e))
                    .unwrap_or(false)
        })
        .collect();
    paths.sort();

    let mut documents = Vec::new();
    for path in paths {
        let text = std::fs::read_to_string(&path)?;
        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        documents.extend(
            chunk_text(&text, chunk_size, chunk_overlap)
                .into_iter()
                .map(|chunk| Document::new(chunk, source.clone())),
        );
    }
    tracing::info!(dir = %dir.display(), chunks = documents.len(), "Loaded knowledge documents");
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunks_overlap() {
        let chunks = chunk_text("abcdefghij", 4, 1);
        assert_eq!(chunks, vec!["abcd", "defg", "ghij"]);
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        assert_eq!(chunk_text("hello", 1000, 100), vec!["hello"]);
        assert!(chunk_text("", 10, 2).is_empty());
        assert!(chunk_text("abc", 0, 0).is_empty());
    }

    #[test]
    fn test_overlap_larger_than_size_still_progresses() {
        let chunks = chunk_text("abcd", 2, 5);
        assert_eq!(chunks, vec!["ab", "bc", "cd"]);
    }

    #[test]
    fn test_load_documents_filters_extensions() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.md"), "users have emails").unwrap();
        std::fs::write(dir.path().join("a.txt"), "orders have totals").unwrap();
        std::fs::write(dir.path().join("c.json"), "{}").unwrap();

        let docs = load_documents(dir.path(), 1000, 100).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].source.as_deref(), Some("a.txt"));
        assert_eq!(docs[1].content, "users have emails");
    }

    #[test]
    fn test_missing_dir_is_error() {
        assert!(load_documents(Path::new("/definitely/not/here"), 10, 1).is_err());
    }
}
