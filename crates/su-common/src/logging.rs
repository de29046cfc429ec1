use std::panic;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Where log events go. stdout is never a sink: the CLI prints its JSON results there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSink {
    Stderr,
    /// `<dir>/<file_name>`, rotated daily.
    DailyFile { dir: PathBuf, file_name: String },
}

impl LogSink {
    /// `SU_LOG_DIR` selects a daily file named after the application; unset or blank → stderr.
    pub fn from_lookup(app_name: &str, lookup: impl Fn(&str) -> Option<String>) -> Self {
        match lookup("SU_LOG_DIR")
            .map(|dir| dir.trim().to_string())
            .filter(|dir| !dir.is_empty())
        {
            Some(dir) => LogSink::DailyFile {
                dir: PathBuf::from(dir),
                file_name: format!("{app_name}.log"),
            },
            None => LogSink::Stderr,
        }
    }

    /// Build the writer, creating the log directory if needed.
    fn make_writer(&self) -> std::io::Result<BoxMakeWriter> {
        match self {
            LogSink::Stderr => Ok(BoxMakeWriter::new(std::io::stderr)),
            LogSink::DailyFile { dir, file_name } => {
                std::fs::create_dir_all(dir)?;
                let appender = tracing_appender::rolling::daily(dir, file_name);
                let (non_blocking, guard) = tracing_appender::non_blocking(appender);
                let _ = LOG_GUARD.set(guard);
                Ok(BoxMakeWriter::new(non_blocking))
            }
        }
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Route panics through `tracing` so they land in the configured [`LogSink`].
/// Installed at most once per process; `SU_LOG_INCLUDE_BACKTRACE=1` also runs the default hook.
pub fn install_tracing_panic_hook(app_name: &'static str) {
    static INSTALLED: OnceLock<()> = OnceLock::new();

    INSTALLED.get_or_init(|| {
        let default_hook = panic::take_hook();
        let include_backtrace = env_flag("SU_LOG_INCLUDE_BACKTRACE");

        panic::set_hook(Box::new(move |info| {
            let location = info
                .location()
                .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()));
            let message = info
                .payload()
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| info.payload().downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "panic payload not string".into());

            tracing::error!(
                application = app_name,
                location = location.as_deref().unwrap_or("unknown"),
                panic_message = %message,
                "panic captured"
            );

            if include_backtrace {
                default_hook(info);
            }
        }));
    });
}

/// Initialize the global subscriber. `RUST_LOG` controls filtering (default `info`).
///
/// A log directory that cannot be created degrades to stderr; the reason is logged once the
/// subscriber is up.
pub fn init_tracing_subscriber(app_name: &'static str) {
    let sink = LogSink::from_lookup(app_name, |key| std::env::var(key).ok());
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (writer, fallback) = match sink.make_writer() {
        Ok(writer) => (writer, None),
        Err(err) => (BoxMakeWriter::new(std::io::stderr), Some(err)),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .try_init();

    if let Some(err) = fallback {
        tracing::warn!(?sink, error = %err, "log directory unavailable; logging to stderr");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("su-logging-{}", ulid::Ulid::new()))
    }

    #[test]
    fn sink_defaults_to_stderr() {
        assert_eq!(LogSink::from_lookup("su-cli", |_| None), LogSink::Stderr);
        assert_eq!(
            LogSink::from_lookup("su-cli", |_| Some("  ".to_string())),
            LogSink::Stderr
        );
    }

    #[test]
    fn log_dir_selects_daily_file_named_after_app() {
        let sink = LogSink::from_lookup("su-cli", |key| {
            (key == "SU_LOG_DIR").then(|| " /var/log/sureus ".to_string())
        });
        assert_eq!(
            sink,
            LogSink::DailyFile {
                dir: PathBuf::from("/var/log/sureus"),
                file_name: "su-cli.log".into(),
            }
        );
    }

    #[test]
    fn file_sink_creates_its_directory() {
        let dir = scratch_dir().join("nested");
        let sink = LogSink::DailyFile {
            dir: dir.clone(),
            file_name: "su-cli.log".into(),
        };

        assert!(sink.make_writer().is_ok());
        assert!(dir.is_dir());
        let _ = std::fs::remove_dir_all(dir.parent().unwrap());
    }

    #[test]
    fn unusable_directory_is_an_error() {
        let blocker = scratch_dir();
        std::fs::write(&blocker, b"not a directory").unwrap();
        let sink = LogSink::DailyFile {
            dir: blocker.join("logs"),
            file_name: "su-cli.log".into(),
        };

        assert!(sink.make_writer().is_err());
        let _ = std::fs::remove_file(blocker);
    }
}
