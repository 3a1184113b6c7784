//! Text embedding collaborator contract.

use std::collections::HashMap;

/// Trait for text embedding.
///
/// `embed` returns `None` whenever the capability is unavailable or the
/// text cannot be embedded; callers treat that uniformly as "no vector".
/// Returned vectors are normalized, so cosine similarity is the plain dot
/// product.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Option<Vec<f32>>;

    /// Whether an embedding model is loaded. Resolved once at startup.
    fn is_available(&self) -> bool;
}

/// Dot product of two normalized vectors (cosine similarity).
///
/// Extra dimensions in the longer vector are ignored.
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Embedder used when no embedding model is wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEmbedder;

impl Embedder for NoopEmbedder {
    fn embed(&self, _text: &str) -> Option<Vec<f32>> {
        None
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// Mock embedder for testing: a text → vector table.
#[derive(Debug, Clone, Default)]
pub struct MockEmbedder {
    table: HashMap<String, Vec<f32>>,
    fallback: Option<Vec<f32>>,
}

impl MockEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a specific text to a vector.
    pub fn with_vector(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.table.insert(text.to_string(), vector);
        self
    }

    /// Vector returned for texts not in the table (default: None).
    pub fn with_fallback(mut self, vector: Vec<f32>) -> Self {
        self.fallback = Some(vector);
        self
    }
}

impl Embedder for MockEmbedder {
    fn embed(&self, text: &str) -> Option<Vec<f32>> {
        self.table.get(text).cloned().or_else(|| self.fallback.clone())
    }

    fn is_available(&self) -> bool {
        true
    }
}
