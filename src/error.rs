use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bad glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("malformed job token '{0}': expected name,link")]
    MalformedJob(String),

    #[error("sample name '{0}' is empty after sanitizing")]
    EmptyName(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
