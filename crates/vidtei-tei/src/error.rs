use thiserror::Error;
use vidtei_core::CoreError;

#[derive(Debug, Error)]
pub enum TeiError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("write error: {0}")]
    Io(#[from] std::io::Error),

    #[error("document is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
