use compliance_common::error::CommonError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Common(#[from] CommonError),

    #[error("config error: {0}")]
    Config(String),

    #[error("threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f32),
}
