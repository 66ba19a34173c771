use std::sync::Arc;

use serde_json::Value;

use crate::errors::ServiceError;

/// Template renderer registered by the host application.
pub trait Renderer: Send + Sync {
    fn render(&self, template: &str, data: &Value) -> Result<String, ServiceError>;
}

pub type SharedRenderer = Arc<dyn Renderer>;
