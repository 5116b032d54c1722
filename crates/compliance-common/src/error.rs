/// Error types shared by the compliance crates.
///
/// These cover infrastructure failures (today only the embedding backend). Redis failures
/// never surface here: the cache degrades to a no-op instead. Application errors live in
/// each binary crate and wrap `CommonError` via `#[from]`.

#[derive(Debug, thiserror::Error)]
pub enum CommonError {
    #[error("embedding error: {0}")]
    Embedding(String),
}
