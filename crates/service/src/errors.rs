use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("dependency not found: {name}")]
    DependencyNotFound { name: String },
    #[error("container entry {key} is not a {expected}")]
    TypeMismatch { key: String, expected: &'static str },
    #[error("failed to build {key}: {message}")]
    Factory { key: String, message: String },
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("cache error: {0}")]
    Cache(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("route error: {0}")]
    Route(String),
    #[error("render error: {0}")]
    Render(String),
}

impl ServiceError {
    pub fn not_found(name: &str) -> Self { Self::DependencyNotFound { name: name.to_string() } }

    pub fn is_not_found(&self) -> bool { matches!(self, Self::DependencyNotFound { .. }) }
}
