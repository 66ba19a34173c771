//! Name-based lookup of models, services and infrastructure handles.
//!
//! A name resolves, in order, as a model (`App\Model\` + capitalised name),
//! as a service (`App\Service\` + capitalised name), then through the fixed
//! alias table in [`crate::naming::ALIASES`]. Anything else is
//! [`ServiceError::DependencyNotFound`].

use std::any::{type_name, Any};
use std::sync::Arc;

use tracing::debug;

use crate::container::Container;
use crate::errors::ServiceError;
use crate::infra::{Logger, Request, SharedCache, SharedFilesystem, SharedRenderer, SharedRouter};
use crate::naming;

#[derive(Debug, Clone)]
pub struct Locator {
    container: Arc<Container>,
}

impl Locator {
    pub fn new(container: Arc<Container>) -> Self { Self { container } }

    pub fn container(&self) -> &Arc<Container> { &self.container }

    /// The container key `name` resolves to, without building anything.
    pub fn locate_key(&self, name: &str) -> Result<String, ServiceError> {
        let model = naming::model_key(name);
        if self.container.has(&model) {
            return Ok(model);
        }
        let service = naming::service_key(name);
        if self.container.has(&service) {
            return Ok(service);
        }
        match naming::alias_key(name) {
            Some(key) if self.container.has(key) => Ok(key.to_string()),
            _ => {
                debug!(%name, "dependency not found");
                Err(ServiceError::not_found(name))
            }
        }
    }

    /// Untyped lookup.
    pub fn locate(&self, name: &str) -> Result<&(dyn Any + Send + Sync), ServiceError> {
        let key = self.locate_key(name)?;
        self.container.get(&key)
    }

    /// Typed lookup: the handle registered for `name`, cloned as a `T`.
    pub fn resolve<T: Clone + 'static>(&self, name: &str) -> Result<T, ServiceError> {
        let key = self.locate_key(name)?;
        self.container
            .get(&key)?
            .downcast_ref::<T>()
            .cloned()
            .ok_or(ServiceError::TypeMismatch { key, expected: type_name::<T>() })
    }

    pub fn filesystem_cache(&self) -> Result<SharedCache, ServiceError> { self.resolve("filesystemCache") }

    pub fn distributed_cache(&self) -> Result<SharedCache, ServiceError> { self.resolve("distributedCache") }

    pub fn cache(&self) -> Result<SharedCache, ServiceError> { self.resolve("cache") }

    pub fn logger(&self) -> Result<Logger, ServiceError> { self.resolve("logger") }

    pub fn filesystem(&self) -> Result<SharedFilesystem, ServiceError> { self.resolve("filesystem") }

    pub fn request(&self) -> Result<Arc<Request>, ServiceError> { self.resolve("request") }

    pub fn router(&self) -> Result<SharedRouter, ServiceError> { self.resolve("router") }

    pub fn view(&self) -> Result<SharedRenderer, ServiceError> { self.resolve("view") }
}
