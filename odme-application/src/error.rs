use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("anomaly not found")]
    NotFound,
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Any persistence failure. The message stays generic; the source chain is
    /// only meant for logs.
    #[error("storage failure")]
    Storage(#[from] anyhow::Error),
}
