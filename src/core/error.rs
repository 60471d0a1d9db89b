use thiserror::Error;

#[derive(Error, Debug)]
pub enum ColoniesError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid map: {0}")]
    InvalidMap(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ColoniesError>;
