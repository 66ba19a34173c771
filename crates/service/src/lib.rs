//! Service layer shared by every forum service.
//! - A string-keyed DI container and a locator resolving models, services
//!   and infrastructure handles by short name.
//! - `order`/filter query helpers restricted by per-service allow-lists.
//! - Minimal cache, logger, filesystem, request, router and view handles.

pub mod errors;
pub mod naming;
pub mod container;
pub mod locator;
pub mod query;
pub mod pagination;
pub mod privacy;
pub mod base;
pub mod infra;
pub mod orm;
pub mod bootstrap;

pub use base::{Service, ServiceBase};
pub use container::{Container, ContainerBuilder};
pub use errors::ServiceError;
pub use locator::Locator;
pub use query::{Direction, FilterSpec, OrderSpec, QueryParams};
