use std::io::IsTerminal;

use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub log_level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { log_level: "info".to_string() }
    }
}

/// Build the subscriber without installing it.  `RUST_LOG` overrides
/// `log_level`.
pub fn subscriber<W>(config: &LogConfig, writer: W, ansi: bool) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_ansi(ansi)
        .with_writer(writer);

    Registry::default().with(env_filter).with(fmt_layer)
}

/// Install the global subscriber.  Logs go to stderr; stdout is reserved for
/// the headless event stream.
pub fn init_tracing(config: &LogConfig) {
    let ansi = std::io::stderr().is_terminal();
    // A subscriber installed earlier (tests, embedding) is kept.
    let _ = subscriber(config, std::io::stderr, ansi).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> { Ok(()) }
    }

    #[test]
    fn init_is_idempotent() {
        let cfg = LogConfig::default();
        init_tracing(&cfg);
        init_tracing(&cfg);
    }

    #[test]
    fn events_go_to_the_given_writer_without_colour() {
        let captured = Captured::default();
        let sink = captured.clone();
        let sub = subscriber(&LogConfig { log_level: "warn".into() }, move || sink.clone(), false);

        tracing::subscriber::with_default(sub, || {
            tracing::warn!(frame = 3, "rejecting frame");
        });

        let text = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(text.contains("rejecting frame"));
        assert!(text.contains("WARN"));
        assert!(!text.contains('\u{1b}'));
    }
}
