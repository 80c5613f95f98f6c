use thiserror::Error;

use crate::events::EventKind;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("unknown event name `{0}`")]
    UnknownEvent(String),

    #[error("event `{0}` is not part of the declared vocabulary")]
    UndeclaredEvent(EventKind),

    #[error("component `{0}` not found")]
    NotFound(String),

    #[error("component `{key}` is not a `{expected}`")]
    ComponentTypeMismatch { key: String, expected: &'static str },

    #[error("component `{0}` is already registered")]
    DuplicateComponent(String),

    #[error("component registry is sealed, cannot register `{0}`")]
    RegistrySealed(String),

    #[error("component `{0}` was already initialized")]
    AlreadyInitialized(String),

    #[error("component is not initialized")]
    NotInitialized,

    #[error("heterogeneous sync keys can't have the same value `{0}`")]
    SyncKeyConflict(String),

    #[error("chart has been destroyed")]
    Destroyed,

    #[error("invalid data: {0}")]
    InvalidData(String),
}
