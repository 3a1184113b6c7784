//! Document store: chunks reference text and answers top-k retrieval
//! queries, embedding-ranked when vectors are available and lexical
//! otherwise.

use crate::defaults;
use crate::engine::embedder::{Embedder, dot};
use std::path::Path;
use std::sync::Arc;

/// Text extraction collaborator contract.
///
/// Tolerant: an empty result means "no document" — extraction failures are
/// never surfaced as errors.
pub trait DocumentExtractor: Send + Sync {
    /// Extract ordered (page number, text) pairs from a document.
    fn extract(&self, path: &Path) -> Vec<(u32, String)>;
}

/// Extractor for plain UTF-8 text files.
///
/// Form feed characters separate pages; a file without any is one page.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl DocumentExtractor for PlainTextExtractor {
    fn extract(&self, path: &Path) -> Vec<(u32, String)> {
        let Ok(contents) = std::fs::read_to_string(path) else {
            return Vec::new();
        };
        contents
            .split('\u{c}')
            .enumerate()
            .filter(|(_, text)| !text.trim().is_empty())
            .map(|(i, text)| (i as u32 + 1, text.to_string()))
            .collect()
    }
}

/// A chunk of reference text tagged with its source page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentChunk {
    pub text: String,
    pub page: u32,
}

/// One retrieval result. Both ranking paths produce this same shape.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalHit {
    pub text: String,
    pub page: u32,
    pub score: f32,
}

/// Chunked, optionally embedded reference document index.
///
/// The chunk set is built in one shot and replaced wholesale on
/// reconfiguration; retrieval never mutates it.
pub struct DocumentStore {
    embedder: Arc<dyn Embedder>,
    chunks: Vec<DocumentChunk>,
    /// Chunk vectors, present only when every chunk embedded successfully.
    vectors: Option<Vec<Vec<f32>>>,
}

impl DocumentStore {
    /// Empty store.
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            chunks: Vec::new(),
            vectors: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Replace the index with chunks built from extracted pages.
    ///
    /// Each page's text is whitespace-normalized and split into
    /// overlapping fixed-length windows. When the embedder is available,
    /// chunks are embedded at load time; a partial embedding run discards
    /// all vectors so retrieval falls back to lexical ranking.
    pub fn load(&mut self, pages: &[(u32, String)]) {
        let mut chunks = Vec::new();
        for (page, text) in pages {
            let normalized: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
            if normalized.is_empty() {
                continue;
            }
            for part in chunk_text(&normalized, defaults::CHUNK_CHARS, defaults::CHUNK_OVERLAP) {
                chunks.push(DocumentChunk {
                    text: part,
                    page: *page,
                });
            }
        }

        let vectors = if self.embedder.is_available() && !chunks.is_empty() {
            chunks
                .iter()
                .map(|chunk| self.embedder.embed(&chunk.text))
                .collect::<Option<Vec<_>>>()
        } else {
            None
        };

        self.chunks = chunks;
        self.vectors = vectors;
    }

    /// Load through an extraction collaborator.
    ///
    /// Returns false when extraction produced nothing (missing file, parse
    /// failure, empty document) — the store is left empty in that case.
    pub fn load_from(&mut self, path: &Path, extractor: &dyn DocumentExtractor) -> bool {
        let pages = extractor.extract(path);
        self.load(&pages);
        !self.is_empty()
    }

    /// Top-k retrieval for a query.
    ///
    /// Ranks by cosine similarity when both the query and all chunks have
    /// vectors; otherwise scores each chunk by how often the query tokens
    /// occur in it (ties keep original chunk order).
    pub fn retrieve(&self, query: &str, k: usize) -> Vec<RetrievalHit> {
        if self.chunks.is_empty() || k == 0 {
            return Vec::new();
        }

        if let Some(vectors) = &self.vectors
            && let Some(query_vec) = self.embedder.embed(query)
        {
            return self.rank_by_similarity(&query_vec, vectors, k);
        }

        self.rank_lexically(query, k)
    }

    fn rank_by_similarity(
        &self,
        query_vec: &[f32],
        vectors: &[Vec<f32>],
        k: usize,
    ) -> Vec<RetrievalHit> {
        let mut hits: Vec<RetrievalHit> = self
            .chunks
            .iter()
            .zip(vectors.iter())
            .map(|(chunk, vector)| RetrievalHit {
                text: chunk.text.clone(),
                page: chunk.page,
                score: dot(query_vec, vector),
            })
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(k);
        hits
    }

    fn rank_lexically(&self, query: &str, k: usize) -> Vec<RetrievalHit> {
        let query_lower = query.to_lowercase();
        let tokens: Vec<&str> = query_lower.split_whitespace().collect();

        let mut hits: Vec<RetrievalHit> = self
            .chunks
            .iter()
            .map(|chunk| {
                let haystack = chunk.text.to_lowercase();
                let score: usize = tokens
                    .iter()
                    .map(|token| haystack.matches(token).count())
                    .sum();
                RetrievalHit {
                    text: chunk.text.clone(),
                    page: chunk.page,
                    score: score as f32,
                }
            })
            .collect();

        // Stable sort: equal scores keep original chunk order.
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(k);
        hits
    }
}

/// Split normalized text into overlapping fixed-length character windows.
fn chunk_text(text: &str, chunk_chars: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= chunk_chars {
        return vec![text.to_string()];
    }

    let mut out = Vec::new();
    let mut start = 0usize;
    loop {
        let end = usize::min(chars.len(), start + chunk_chars);
        out.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start = end.saturating_sub(overlap);
    }
    out
}
