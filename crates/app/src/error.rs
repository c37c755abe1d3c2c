use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("recognizer error: {0}")]
    Recognizer(#[from] recognizer::RecognitionError),
    #[error("invalid server address: {0}")]
    Address(#[from] std::net::AddrParseError),
}
