use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Emergency,
    Alert,
    Critical,
    Error,
    Warning,
    Notice,
    Info,
    Debug,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Emergency => "emergency",
            Level::Alert => "alert",
            Level::Critical => "critical",
            Level::Error => "error",
            Level::Warning => "warning",
            Level::Notice => "notice",
            Level::Info => "info",
            Level::Debug => "debug",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Channel-tagged logger handed to services; events go through `tracing`.
#[derive(Debug, Clone)]
pub struct Logger {
    channel: Arc<str>,
}

impl Logger {
    pub fn new(channel: impl Into<Arc<str>>) -> Self { Self { channel: channel.into() } }

    pub fn channel(&self) -> &str { &self.channel }

    pub fn log(&self, level: Level, message: &str) {
        let channel = &*self.channel;
        let severity = level.as_str();
        match level {
            Level::Emergency | Level::Alert | Level::Critical | Level::Error => error!(channel, severity, "{message}"),
            Level::Warning => warn!(channel, severity, "{message}"),
            Level::Notice | Level::Info => info!(channel, severity, "{message}"),
            Level::Debug => debug!(channel, severity, "{message}"),
        }
    }

    pub fn emergency(&self, message: &str) { self.log(Level::Emergency, message) }
    pub fn alert(&self, message: &str) { self.log(Level::Alert, message) }
    pub fn critical(&self, message: &str) { self.log(Level::Critical, message) }
    pub fn error(&self, message: &str) { self.log(Level::Error, message) }
    pub fn warning(&self, message: &str) { self.log(Level::Warning, message) }
    pub fn notice(&self, message: &str) { self.log(Level::Notice, message) }
    pub fn info(&self, message: &str) { self.log(Level::Info, message) }
    pub fn debug(&self, message: &str) { self.log(Level::Debug, message) }
}
