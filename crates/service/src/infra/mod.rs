//! Collaborators reachable through the locator's alias table.

pub mod cache;
pub mod filesystem;
pub mod logger;
pub mod request;
pub mod router;
pub mod view;

pub use cache::{MemoryCache, SharedCache, SimpleCache};
pub use filesystem::{Filesystem, LocalFilesystem, SharedFilesystem};
pub use logger::{Level, Logger};
pub use request::Request;
pub use router::{RouteTable, SharedRouter};
pub use view::{Renderer, SharedRenderer};
