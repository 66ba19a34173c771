use std::io;

use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{fmt, EnvFilter};

type BoxedSubscriber = Box<dyn Subscriber + Send + Sync + 'static>;

/// Initialize tracing subscriber with sensible defaults and stdout writer.
/// - Respects `RUST_LOG` if set
/// - Falls back to `info,service=info`
/// - Writes to stdout to improve visibility in environments that hide stderr
pub fn init_logging_default() {
    install(subscriber("compact", io::stdout));
}

/// Initialize tracing subscriber with JSON structured output.
/// - Respects `RUST_LOG` if set, defaults to `info`
/// - Emits structured JSON logs for better machine parsing
pub fn init_logging_json() {
    install(subscriber("json", io::stdout));
}

/// Pick the subscriber by its configured name; unknown names fall back to compact.
pub fn init_logging_named(format: &str) {
    install(subscriber(format, io::stdout));
}

/// Same as [`init_logging_named`], but writes to `writer`. Tools whose stdout
/// is their result stream pass `io::stderr`.
pub fn init_logging_to<W>(format: &str, writer: W)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    install(subscriber(format, writer));
}

/// Build, without installing, the subscriber for `format`.
pub fn subscriber<W>(format: &str, writer: W) -> BoxedSubscriber
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        "json" => {
            // locator resolution is logged at debug; enable with RUST_LOG=info,service::locator=debug
            let env_filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"));
            Box::new(
                fmt()
                    .with_env_filter(env_filter)
                    .with_target(true)
                    .json()
                    .with_writer(writer)
                    .finish(),
            )
        }
        _ => {
            let env_filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,service=info"));
            Box::new(
                fmt()
                    .with_env_filter(env_filter)
                    .with_target(false)
                    .compact()
                    .with_writer(writer)
                    .finish(),
            )
        }
    }
}

fn install(subscriber: BoxedSubscriber) {
    // a second init (tests, embedding hosts) keeps the first subscriber
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> { Ok(()) }
    }

    impl Captured {
        fn text(&self) -> String { String::from_utf8(self.0.lock().unwrap().clone()).unwrap() }
    }

    #[test]
    fn json_logs_go_to_the_given_writer() {
        let sink = Captured::default();
        let writer = sink.clone();
        tracing::subscriber::with_default(subscriber("json", move || writer.clone()), || {
            tracing::warn!(root = "data", "storage root missing");
        });
        let out = sink.text();
        assert!(out.contains("\"level\":\"WARN\""), "{out}");
        assert!(out.contains("storage root missing"), "{out}");
    }

    #[test]
    fn unknown_format_is_compact() {
        let sink = Captured::default();
        let writer = sink.clone();
        tracing::subscriber::with_default(subscriber("pretty", move || writer.clone()), || {
            tracing::warn!("config file unavailable");
        });
        let out = sink.text();
        assert!(out.contains("config file unavailable"), "{out}");
        assert!(!out.trim_start().starts_with('{'), "{out}");
    }
}
