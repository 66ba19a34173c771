//! Container key conventions.
//!
//! Models live under `App\Model\`, services under `App\Service\`. A service
//! `App\Service\XyzService` pairs with the model `App\Model\XyzModel`.
//! Infrastructure handles are keyed by the interface names the forum's
//! hosts already register, or by a bare alias (`request`, `router`).

pub const MODEL_NAMESPACE: &str = "App\\Model\\";
pub const SERVICE_NAMESPACE: &str = "App\\Service\\";

pub const FILESYSTEM_CACHE: &str = "App\\Interfaces\\FilesystemCacheInterface";
pub const DISTRIBUTED_CACHE: &str = "App\\Interfaces\\DistributedCacheInterface";
pub const CACHE: &str = "Psr\\SimpleCache\\CacheInterface";
pub const LOGGER: &str = "Psr\\Log\\LoggerInterface";
pub const FILESYSTEM: &str = "League\\Flysystem\\FilesystemInterface";
pub const REQUEST: &str = "request";
pub const ROUTER: &str = "router";
pub const VIEW: &str = "Slim\\Views\\PhpRenderer";

/// Short alias → container key. Fixed; lookups outside this table fail.
pub const ALIASES: [(&str, &str); 8] = [
    ("filesystemCache", FILESYSTEM_CACHE),
    ("distributedCache", DISTRIBUTED_CACHE),
    ("cache", CACHE),
    ("logger", LOGGER),
    ("filesystem", FILESYSTEM),
    ("request", REQUEST),
    ("router", ROUTER),
    ("view", VIEW),
];

pub fn alias_key(name: &str) -> Option<&'static str> {
    ALIASES.iter().find(|(alias, _)| *alias == name).map(|(_, key)| *key)
}

/// Upper-case the first character, leaving the rest untouched.
pub fn ucfirst(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn model_key(name: &str) -> String { format!("{MODEL_NAMESPACE}{}", ucfirst(name)) }

pub fn service_key(name: &str) -> String { format!("{SERVICE_NAMESPACE}{}", ucfirst(name)) }

/// `App\Service\XyzService` → `App\Model\XyzModel`.
///
/// Returns `None` for class names without the `Service` suffix.
pub fn companion_model_key(service_class: &str) -> Option<String> {
    let stem = service_class.strip_suffix("Service")?;
    Some(format!("{stem}Model").replace("\\Service\\", "\\Model\\"))
}
