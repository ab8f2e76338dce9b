use thiserror::Error;

pub type VerityResult<T> = Result<T, VerityError>;

#[derive(Error, Debug)]
pub enum VerityError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Config encode error: {0}")]
    TomlEncode(#[from] toml::ser::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Analysis {id} failed: {reason}")]
    AnalysisFailed { id: u64, reason: String },

    #[error("Engine is not running")]
    EngineStopped,
}
