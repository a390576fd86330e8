//! Document chunks and their identity.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::common::Metadata;

/// Stable identity of a chunk: the owning document plus the chunk's ordinal.
///
/// Two search results that carry the same key refer to the same document
/// content, whichever retriever produced them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkKey {
    pub document_id: String,
    pub index: usize,
}

impl fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.document_id, self.index)
    }
}

/// A unit of indexed document content.
///
/// Produced by the ingestion pipeline and immutable afterwards. Results hold
/// it behind an `Arc` so fusion never copies chunk text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// Identifier of the source document.
    pub document_id: String,

    /// Text content of the chunk.
    pub content: String,

    /// Ordinal position within the source document.
    pub index: usize,

    /// Additional metadata.
    #[serde(default)]
    pub metadata: Metadata,
}

impl DocumentChunk {
    pub fn new(document_id: impl Into<String>, index: usize, content: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            content: content.into(),
            index,
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Identity used for deduplication and fusion.
    pub fn key(&self) -> ChunkKey {
        ChunkKey {
            document_id: self.document_id.clone(),
            index: self.index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_new() {
        let chunk = DocumentChunk::new("doc-1", 2, "hello");
        assert_eq!(chunk.document_id, "doc-1");
        assert_eq!(chunk.index, 2);
        assert_eq!(chunk.content, "hello");
        assert!(chunk.metadata.is_empty());
    }

    #[test]
    fn test_chunk_key_ignores_content() {
        let a = DocumentChunk::new("doc-1", 0, "first version");
        let b = DocumentChunk::new("doc-1", 0, "second version");
        assert_eq!(a.key(), b.key());
        assert_ne!(a.key(), DocumentChunk::new("doc-1", 1, "first version").key());
    }

    #[test]
    fn test_chunk_key_display() {
        let key = DocumentChunk::new("report.pdf", 7, "x").key();
        assert_eq!(key.to_string(), "report.pdf#7");
    }

    #[test]
    fn test_chunk_with_metadata() {
        let chunk = DocumentChunk::new("doc", 0, "text")
            .with_metadata("page", serde_json::json!(3));
        assert_eq!(chunk.metadata["page"], serde_json::json!(3));
    }

    #[test]
    fn test_chunk_deserialization_defaults_metadata() {
        let json = r#"{"document_id":"d","content":"c","index":1}"#;
        let chunk: DocumentChunk = serde_json::from_str(json).unwrap();
        assert_eq!(chunk.index, 1);
        assert!(chunk.metadata.is_empty());
    }
}
