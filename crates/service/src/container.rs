//! Dependency-injection container.
//!
//! Keys are strings: fully-qualified names such as `App\Model\UserModel` or
//! short aliases such as `request`. Values are clonable handles (usually an
//! `Arc<_>`) stored as `dyn Any` and downcast on the way out. A container is
//! immutable once built; per-request state goes into a child container
//! layered over the application one.

use std::any::{type_name, Any};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, ThreadId};

use once_cell::sync::OnceCell;
use tracing::{debug, warn};

use crate::errors::ServiceError;

type Handle = Box<dyn Any + Send + Sync>;
type Factory = Box<dyn Fn(&Arc<Container>) -> anyhow::Result<Handle> + Send + Sync>;

enum Entry {
    Instance(Handle),
    /// Built on first read, then shared.
    Singleton { cell: OnceCell<Handle>, factory: Factory, building: Building },
}

/// Threads currently inside a singleton's initialisation.
#[derive(Default)]
struct Building(Mutex<Vec<ThreadId>>);

impl Building {
    fn threads(&self) -> MutexGuard<'_, Vec<ThreadId>> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record the current thread; `None` if it is already inside.
    fn enter(&self) -> Option<BuildGuard<'_>> {
        let me = thread::current().id();
        let mut threads = self.threads();
        if threads.contains(&me) {
            return None;
        }
        threads.push(me);
        Some(BuildGuard { building: self, thread: me })
    }
}

struct BuildGuard<'a> {
    building: &'a Building,
    thread: ThreadId,
}

impl Drop for BuildGuard<'_> {
    fn drop(&mut self) { self.building.threads().retain(|t| *t != self.thread); }
}

pub struct Container {
    entries: HashMap<String, Entry>,
    companions: HashMap<String, String>,
    parent: Option<Arc<Container>>,
}

impl Container {
    /// A container with no entries and no parent.
    pub fn empty() -> Arc<Self> { ContainerBuilder::new().build() }

    /// Whether `key` is registered here or in any parent.
    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key) || self.parent.as_ref().is_some_and(|p| p.has(key))
    }

    /// Fetch the instance registered under `key`, building a lazy singleton if needed.
    pub fn get<'a>(self: &'a Arc<Self>, key: &str) -> Result<&'a (dyn Any + Send + Sync), ServiceError> {
        match self.entries.get(key) {
            Some(Entry::Instance(handle)) => Ok(handle.as_ref()),
            Some(Entry::Singleton { cell, factory, building }) => {
                if let Some(handle) = cell.get() {
                    return Ok(handle.as_ref());
                }
                // once_cell deadlocks when a factory re-enters its own cell
                let Some(_guard) = building.enter() else {
                    warn!(%key, "singleton requested while it is being built");
                    return Err(ServiceError::Factory {
                        key: key.to_string(),
                        message: "dependency cycle: singleton resolved itself while being built".to_string(),
                    });
                };
                let handle = cell.get_or_try_init(|| {
                    debug!(%key, "building singleton");
                    factory(self).map_err(|e| ServiceError::Factory { key: key.to_string(), message: e.to_string() })
                })?;
                Ok(handle.as_ref())
            }
            None => match &self.parent {
                Some(parent) => parent.get(key),
                None => Err(ServiceError::not_found(key)),
            },
        }
    }

    /// Typed fetch: clone the handle stored under `key` as a `T`.
    pub fn get_as<T: Clone + 'static>(self: &Arc<Self>, key: &str) -> Result<T, ServiceError> {
        self.get(key)?
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| ServiceError::TypeMismatch { key: key.to_string(), expected: type_name::<T>() })
    }

    /// Explicitly paired companion model key for a service class, if registered.
    pub fn companion_of(&self, service_class: &str) -> Option<&str> {
        match self.companions.get(service_class) {
            Some(key) => Some(key.as_str()),
            None => self.parent.as_deref().and_then(|p| p.companion_of(service_class)),
        }
    }

    /// All keys visible from this container, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: BTreeSet<String> = self.entries.keys().cloned().collect();
        if let Some(parent) = &self.parent {
            keys.extend(parent.keys());
        }
        keys.into_iter().collect()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("keys", &self.keys())
            .field("companions", &self.companions)
            .finish()
    }
}

/// Composition-time registration. Later registrations of the same key replace earlier ones.
#[derive(Default)]
pub struct ContainerBuilder {
    entries: HashMap<String, Entry>,
    companions: HashMap<String, String>,
    parent: Option<Arc<Container>>,
}

impl ContainerBuilder {
    pub fn new() -> Self { Self::default() }

    /// Start a child scope; keys missing here are looked up in `parent`.
    pub fn with_parent(parent: Arc<Container>) -> Self {
        Self { parent: Some(parent), ..Self::default() }
    }

    /// Register an already-built shared instance.
    pub fn instance<T>(mut self, key: impl Into<String>, value: T) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        self.insert(key.into(), Entry::Instance(Box::new(value)));
        self
    }

    /// Register a lazily-built singleton. The factory runs at most once and sees
    /// the container it was registered in. A factory that ends up resolving its
    /// own key, directly or through another singleton, fails with
    /// [`ServiceError::Factory`].
    pub fn singleton<T, F>(mut self, key: impl Into<String>, factory: F) -> Self
    where
        T: Clone + Send + Sync + 'static,
        F: Fn(&Arc<Container>) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        let factory: Factory = Box::new(move |c| factory(c).map(|v| Box::new(v) as Handle));
        self.insert(key.into(), Entry::Singleton { cell: OnceCell::new(), factory, building: Building::default() });
        self
    }

    /// Pair a service class with its companion model key, overriding the naming convention.
    pub fn companion(mut self, service_class: impl Into<String>, model_key: impl Into<String>) -> Self {
        self.companions.insert(service_class.into(), model_key.into());
        self
    }

    pub fn build(self) -> Arc<Container> {
        Arc::new(Container { entries: self.entries, companions: self.companions, parent: self.parent })
    }

    fn insert(&mut self, key: String, entry: Entry) {
        if self.entries.contains_key(&key) {
            warn!(%key, "container key registered twice; keeping the later one");
        }
        self.entries.insert(key, entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Debug, PartialEq)]
    struct VoteModel {
        table: &'static str,
    }

    #[test]
    fn instance_roundtrip_and_has() {
        let c = ContainerBuilder::new()
            .instance("App\\Model\\VoteModel", Arc::new(VoteModel { table: "vote" }))
            .build();
        assert!(c.has("App\\Model\\VoteModel"));
        assert!(!c.has("App\\Model\\UserModel"));
        let m: Arc<VoteModel> = c.get_as("App\\Model\\VoteModel").unwrap();
        assert_eq!(m.table, "vote");
    }

    #[test]
    fn missing_key_is_not_found() {
        let c = Container::empty();
        let err = c.get("router").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn wrong_type_is_mismatch() {
        let c = ContainerBuilder::new().instance("router", 42_u32).build();
        let err = c.get_as::<String>("router").unwrap_err();
        assert!(matches!(err, ServiceError::TypeMismatch { .. }));
    }

    #[test]
    fn singleton_is_built_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let c = ContainerBuilder::new()
            .singleton("App\\Model\\VoteModel", move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Arc::new(VoteModel { table: "vote" }))
            })
            .build();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        let a: Arc<VoteModel> = c.get_as("App\\Model\\VoteModel").unwrap();
        let b: Arc<VoteModel> = c.get_as("App\\Model\\VoteModel").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn singleton_can_depend_on_other_entries() {
        let c = ContainerBuilder::new()
            .instance("table", "answer".to_string())
            .singleton("App\\Model\\AnswerModel", |c| {
                let table: String = c.get_as("table")?;
                Ok(Arc::new(table))
            })
            .build();
        let m: Arc<String> = c.get_as("App\\Model\\AnswerModel").unwrap();
        assert_eq!(m.as_str(), "answer");
    }

    #[test]
    fn failing_factory_reports_key() {
        let c = ContainerBuilder::new()
            .singleton::<u8, _>("Slim\\Views\\PhpRenderer", |_| Err(anyhow::anyhow!("no templates")))
            .build();
        match c.get("Slim\\Views\\PhpRenderer").unwrap_err() {
            ServiceError::Factory { key, message } => {
                assert_eq!(key, "Slim\\Views\\PhpRenderer");
                assert!(message.contains("no templates"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn mutually_dependent_singletons_fail_instead_of_hanging() {
        let c = ContainerBuilder::new()
            .singleton("App\\Service\\AnswerService", |c| {
                let question: Arc<String> = c.get_as("App\\Service\\QuestionService")?;
                Ok(Arc::new(format!("answers of {question}")))
            })
            .singleton("App\\Service\\QuestionService", |c| {
                let answers: Arc<String> = c.get_as("App\\Service\\AnswerService")?;
                Ok(Arc::new(format!("questions with {answers}")))
            })
            .build();
        match c.get("App\\Service\\AnswerService").unwrap_err() {
            ServiceError::Factory { key, message } => {
                assert_eq!(key, "App\\Service\\AnswerService");
                assert!(message.contains("dependency cycle"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
        // a failed build leaves the cell empty and the guard released
        assert!(matches!(
            c.get("App\\Service\\QuestionService"),
            Err(ServiceError::Factory { .. })
        ));
    }

    #[test]
    fn singleton_built_once_across_threads() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let c = ContainerBuilder::new()
            .singleton("App\\Model\\VoteModel", move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                std::thread::sleep(std::time::Duration::from_millis(20));
                Ok(Arc::new(VoteModel { table: "vote" }))
            })
            .build();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let c = Arc::clone(&c);
                std::thread::spawn(move || c.get_as::<Arc<VoteModel>>("App\\Model\\VoteModel").is_ok())
            })
            .collect();
        for h in handles {
            assert!(h.join().unwrap());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn child_falls_through_to_parent_and_shadows() {
        let app = ContainerBuilder::new()
            .instance("router", "app-router".to_string())
            .instance("request", "none".to_string())
            .companion("App\\Service\\VoteService", "App\\Model\\VoteModel")
            .build();
        let scope = ContainerBuilder::with_parent(Arc::clone(&app))
            .instance("request", "GET /questions".to_string())
            .build();
        assert_eq!(scope.get_as::<String>("router").unwrap(), "app-router");
        assert_eq!(scope.get_as::<String>("request").unwrap(), "GET /questions");
        assert_eq!(app.get_as::<String>("request").unwrap(), "none");
        assert_eq!(scope.companion_of("App\\Service\\VoteService"), Some("App\\Model\\VoteModel"));
        assert_eq!(scope.keys(), vec!["request".to_string(), "router".to_string()]);
    }
}
