//! Composition root: default collaborators and per-request scopes.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use configs::AppConfig;
use tracing::info;

use crate::container::{Container, ContainerBuilder};
use crate::infra::{LocalFilesystem, Logger, MemoryCache, Request, RouteTable, SharedCache, SharedFilesystem, SharedRouter};
use crate::naming;

/// Application-scope container with `cache`, `logger`, `filesystem` and `router`.
///
/// `filesystemCache`, `distributedCache` and `view` have no default backend;
/// hosts register them with [`app_builder`] when they need them.
pub fn build_app_container(cfg: &AppConfig) -> anyhow::Result<Arc<Container>> {
    Ok(app_builder(cfg)?.build())
}

/// The default registrations, open for the host to extend before `build()`.
pub fn app_builder(cfg: &AppConfig) -> anyhow::Result<ContainerBuilder> {
    let root = PathBuf::from(&cfg.storage.root);
    common::env::ensure_storage_root(&root)?;

    let max_capacity = cfg.cache.max_capacity;
    let default_ttl = cfg.cache.default_ttl_secs.map(Duration::from_secs);
    let router: SharedRouter = Arc::new(RouteTable::from_map(cfg.routes.clone()));

    info!(
        app = %cfg.app.name,
        storage_root = %root.display(),
        cache_capacity = max_capacity,
        routes = cfg.routes.len(),
        "container configured"
    );

    Ok(ContainerBuilder::new()
        .singleton(naming::CACHE, move |_| Ok(Arc::new(MemoryCache::new(max_capacity, default_ttl)) as SharedCache))
        .instance(naming::LOGGER, Logger::new(cfg.app.name.as_str()))
        .singleton(naming::FILESYSTEM, move |_| Ok(Arc::new(LocalFilesystem::new(root.clone())) as SharedFilesystem))
        .instance(naming::ROUTER, router))
}

/// Child container for one request, layered over `app`.
pub fn request_scope(app: &Arc<Container>, request: Request) -> Arc<Container> {
    ContainerBuilder::with_parent(Arc::clone(app))
        .instance(naming::REQUEST, Arc::new(request))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ServiceError;
    use crate::locator::Locator;
    use serde_json::json;

    fn config(root: &std::path::Path) -> AppConfig {
        let mut cfg = configs::load_from_str(r#"
            [app]
            name = "forum-test"
            [routes]
            question = "/questions/{question_id}"
        "#).unwrap();
        cfg.storage.root = root.display().to_string();
        cfg
    }

    #[test]
    fn default_collaborators_resolve() {
        let tmp = tempfile::tempdir().unwrap();
        let app = build_app_container(&config(&tmp.path().join("data"))).unwrap();
        let locator = Locator::new(app);

        let cache = locator.cache().unwrap();
        cache.set("answer_count_1", json!(4), None).unwrap();
        assert_eq!(locator.cache().unwrap().get("answer_count_1"), Some(json!(4)));

        assert_eq!(locator.logger().unwrap().channel(), "forum-test");
        assert_eq!(
            locator.router().unwrap().url_for("question", &[("question_id", "5")]).unwrap(),
            "/questions/5"
        );

        let fs = locator.filesystem().unwrap();
        fs.write("x.txt", b"1").unwrap();
        assert!(tmp.path().join("data/x.txt").exists());

        assert!(locator.request().unwrap_err().is_not_found());
        assert!(matches!(locator.view(), Err(ServiceError::DependencyNotFound { .. })));
        assert!(matches!(locator.filesystem_cache(), Err(ServiceError::DependencyNotFound { .. })));
    }

    #[test]
    fn request_scope_adds_request_only() {
        let tmp = tempfile::tempdir().unwrap();
        let app = build_app_container(&config(tmp.path())).unwrap();
        let scope = request_scope(&app, Request::parse("/questions?order=-vote_count").unwrap());
        let locator = Locator::new(scope);
        assert_eq!(locator.request().unwrap().query_param("order"), Some("-vote_count"));
        assert!(locator.cache().is_ok());
        assert!(!app.has(naming::REQUEST));
    }
}
