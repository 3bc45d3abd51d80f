use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Every status other than success that an operation can report.
#[derive(Debug, Error)]
pub enum Error {
    #[error("non-fatal failure")]
    Failure,
    #[error("unknown system error")]
    Unknown,
    #[error("invalid or missing backend")]
    BadBackend,
    #[error("invalid view configuration")]
    BadConfiguration,
    #[error("invalid parameter")]
    BadParameter,
    #[error("invalid call")]
    BadCall,
    #[error("backend initialization failed")]
    BackendFailed,
    #[error("system view realization failed")]
    RealizeFailed,
    #[error("failed to set pixel format")]
    SetFormatFailed,
    #[error("failed to create drawing context")]
    CreateContextFailed,
    #[error("unsupported operation")]
    Unsupported,
    #[error("unsupported data type")]
    UnsupportedType,
    #[error("platform connection error: {0}")]
    Platform(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    #[inline]
    pub fn platform<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Platform(Box::new(error))
    }
}
