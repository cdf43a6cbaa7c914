use thiserror::Error;

use crate::store::StoreError;

/// Connection- and dispatch-level failure taxonomy. None of these crash the
/// process: session errors end one connection, persistence errors surface to
/// the caller of the mutating action only.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("forbidden")]
    Forbidden,
    #[error(transparent)]
    Persistence(#[from] StoreError),
    #[error("transport error: {0}")]
    Transport(String),
}
