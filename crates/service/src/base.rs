//! Shared behaviour of every concrete service.
//!
//! A concrete service owns a [`ServiceBase`], names its class through
//! [`Service::CLASS`] and declares its allow-lists by overriding the hooks.
//!
//! ```
//! use std::sync::Arc;
//! use service::base::{Service, ServiceBase};
//! use service::bootstrap::request_scope;
//! use service::container::Container;
//! use service::infra::Request;
//! use service::query::OrderSpec;
//!
//! struct TopicService { base: ServiceBase }
//!
//! impl Service for TopicService {
//!     const CLASS: &'static str = "App\\Service\\TopicService";
//!     fn base(&self) -> &ServiceBase { &self.base }
//!     fn allow_order_fields(&self) -> &[&str] { &["topic_id", "follower_count"] }
//! }
//!
//! let scope = request_scope(&Container::empty(), Request::parse("/topics?order=-follower_count").unwrap());
//! let svc = TopicService { base: ServiceBase::for_service::<TopicService>(scope).unwrap() };
//! assert_eq!(svc.get_order(OrderSpec::asc("topic_id")).unwrap(), OrderSpec::desc("follower_count"));
//! ```

use std::any::{type_name, Any};
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::container::Container;
use crate::errors::ServiceError;
use crate::infra::{Logger, Request, SharedCache, SharedFilesystem, SharedRenderer, SharedRouter};
use crate::locator::Locator;
use crate::naming;
use crate::pagination::Pagination;
use crate::privacy;
use crate::query::{self, FilterSpec, OrderSpec};

/// Container access plus the companion model bound at construction.
#[derive(Debug, Clone)]
pub struct ServiceBase {
    class: &'static str,
    locator: Locator,
    current_model: Option<String>,
}

impl ServiceBase {
    /// Bind to `container` and eagerly resolve the companion model of `class`.
    ///
    /// An explicit pairing registered with `ContainerBuilder::companion` wins
    /// over the `App\Service\XyzService` → `App\Model\XyzModel` convention.
    /// A missing companion is not an error; a failing one is.
    pub fn new(container: Arc<Container>, class: &'static str) -> Result<Self, ServiceError> {
        let candidate = match container.companion_of(class) {
            Some(key) => Some(key.to_string()),
            None => naming::companion_model_key(class),
        };
        let current_model = match candidate {
            Some(key) if container.has(&key) => {
                container.get(&key)?;
                debug!(service = class, model = %key, "companion model bound");
                Some(key)
            }
            _ => None,
        };
        Ok(Self { class, locator: Locator::new(container), current_model })
    }

    pub fn for_service<S: Service>(container: Arc<Container>) -> Result<Self, ServiceError> {
        Self::new(container, S::CLASS)
    }

    pub fn class(&self) -> &'static str { self.class }

    pub fn locator(&self) -> &Locator { &self.locator }

    /// Container key of the bound companion model.
    pub fn current_model_key(&self) -> Option<&str> { self.current_model.as_deref() }

    /// The bound companion model as a `T`; `Ok(None)` when nothing is bound.
    pub fn current_model<T: Clone + 'static>(&self) -> Result<Option<T>, ServiceError> {
        let Some(key) = &self.current_model else { return Ok(None) };
        let model = self
            .locator
            .container()
            .get(key)?
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| ServiceError::TypeMismatch { key: key.clone(), expected: type_name::<T>() })?;
        Ok(Some(model))
    }
}

pub trait Service {
    /// Fully-qualified class name, e.g. `App\Service\QuestionService`.
    const CLASS: &'static str;

    fn base(&self) -> &ServiceBase;

    /// Fields never returned to clients.
    fn privacy_fields(&self) -> &[&str] { &[] }

    /// Fields accepted by the `order` query parameter.
    fn allow_order_fields(&self) -> &[&str] { &[] }

    /// Query parameters accepted as filter conditions.
    fn allow_filter_fields(&self) -> &[&str] { &[] }

    fn locate(&self, name: &str) -> Result<&(dyn Any + Send + Sync), ServiceError> {
        self.base().locator().locate(name)
    }

    fn resolve<T: Clone + 'static>(&self, name: &str) -> Result<T, ServiceError>
    where
        Self: Sized,
    {
        self.base().locator().resolve(name)
    }

    fn filesystem_cache(&self) -> Result<SharedCache, ServiceError> { self.base().locator().filesystem_cache() }
    fn distributed_cache(&self) -> Result<SharedCache, ServiceError> { self.base().locator().distributed_cache() }
    fn cache(&self) -> Result<SharedCache, ServiceError> { self.base().locator().cache() }
    fn logger(&self) -> Result<Logger, ServiceError> { self.base().locator().logger() }
    fn filesystem(&self) -> Result<SharedFilesystem, ServiceError> { self.base().locator().filesystem() }
    fn request(&self) -> Result<Arc<Request>, ServiceError> { self.base().locator().request() }
    fn router(&self) -> Result<SharedRouter, ServiceError> { self.base().locator().router() }
    fn view(&self) -> Result<SharedRenderer, ServiceError> { self.base().locator().view() }

    /// Sort order from the current request's `order` parameter.
    ///
    /// `order=field` → ASC, `order=-field` → DESC. Falls back to `default`
    /// when the parameter is absent, empty, or names a field outside
    /// [`Service::allow_order_fields`]. Fails only if no request is bound.
    fn get_order(&self, default: OrderSpec) -> Result<OrderSpec, ServiceError> {
        let request = self.request()?;
        Ok(query::resolve_order(request.query_params(), self.allow_order_fields(), default))
    }

    /// Filter conditions from the current request's query parameters,
    /// restricted to [`Service::allow_filter_fields`] and merged over `default`.
    fn get_where(&self, default: FilterSpec) -> Result<FilterSpec, ServiceError> {
        let request = self.request()?;
        Ok(query::resolve_where(request.query_params(), self.allow_filter_fields(), default))
    }

    fn get_pagination(&self) -> Result<Pagination, ServiceError> {
        let request = self.request()?;
        Ok(Pagination::from_query(request.query_params()))
    }

    /// Drop [`Service::privacy_fields`] from a record or a list of records.
    fn hide_privacy_fields(&self, record: Value) -> Value {
        privacy::strip_fields(record, self.privacy_fields())
    }
}
