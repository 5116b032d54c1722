/// Sentence-embedding seam and its fastembed-backed implementation.
///
/// `EmbeddingProvider` is synchronous: encoding is CPU-bound ONNX inference, so async
/// callers dispatch whole audits through `tokio::task::spawn_blocking` rather than each
/// encode call. The trait is object-safe so the matcher can hold `Arc<dyn EmbeddingProvider>`
/// and tests can inject a deterministic fake.
///
/// The all-MiniLM-L6-v2 model takes raw sentences; unlike task-prefixed models no
/// `search_document:`/`search_query:` prefix is added.
use crate::error::CommonError;

/// Inference batch size. Policies are short, so this mostly bounds peak memory on very long
/// pasted documents.
const ENCODE_BATCH_SIZE: usize = 32;

/// Turns text into fixed-length vectors. Implementations must be deterministic for a given
/// input and model version and must return exactly one vector per input, in input order.
pub trait EmbeddingProvider: Send + Sync {
    /// Human-readable model identifier. Feeds cache namespacing, so two providers must only
    /// share a name if they produce identical vectors.
    fn model_name(&self) -> &str;

    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, CommonError>;
}

/// Wraps fastembed's `TextEmbedding` loaded with all-MiniLM-L6-v2 (384 dimensions).
pub struct FastEmbedder {
    model: fastembed::TextEmbedding,
}

impl FastEmbedder {
    pub const MODEL_NAME: &'static str = "sentence-transformers/all-MiniLM-L6-v2";

    /// Load the embedding model.
    ///
    /// Downloads the ONNX weights on first run (~90MB). Loading is blocking, so it runs on a
    /// blocking thread.
    pub async fn new() -> Result<Self, CommonError> {
        let model = tokio::task::spawn_blocking(|| {
            let options = fastembed::InitOptions::new(fastembed::EmbeddingModel::AllMiniLML6V2)
                .with_show_download_progress(true);
            fastembed::TextEmbedding::try_new(options)
        })
        .await
        .map_err(|e| CommonError::Embedding(format!("spawn_blocking join error: {e}")))?
        .map_err(|e| CommonError::Embedding(format!("model initialization failed: {e}")))?;

        Ok(Self { model })
    }

    /// Returns the dimensionality of the embedding vectors (384 for all-MiniLM-L6-v2).
    pub fn dimensions(&self) -> usize {
        384
    }
}

impl EmbeddingProvider for FastEmbedder {
    fn model_name(&self) -> &str {
        Self::MODEL_NAME
    }

    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, CommonError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let inputs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let vectors = self
            .model
            .embed(inputs, Some(ENCODE_BATCH_SIZE))
            .map_err(|e| CommonError::Embedding(format!("encoding failed: {e}")))?;

        if vectors.len() != texts.len() {
            return Err(CommonError::Embedding(format!(
                "model returned {} vectors for {} inputs",
                vectors.len(),
                texts.len()
            )));
        }
        Ok(vectors)
    }
}

/// Cosine similarity in `[-1, 1]`. Returns 0.0 when either vector has zero norm.
///
/// Both vectors must come from the same provider; lengths are not reconciled.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "embedding dimensions differ");

    let mut dot = 0.0_f32;
    let mut norm_a = 0.0_f32;
    let mut norm_b = 0.0_f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}
