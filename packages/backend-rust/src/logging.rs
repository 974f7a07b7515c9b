//! Tracing setup for the service.
//!
//! Everything goes to stdout. When [`Config::enable_file_logs`] is set, the
//! same events are also written, without ANSI colours, to a daily rolling
//! file under [`Config::log_dir`].

use std::path::PathBuf;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Keeps the non-blocking file writer flushing until dropped.
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSink {
    pub dir: PathBuf,
    pub prefix: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub filter: String,
    pub file: Option<FileSink>,
}

impl LogSettings {
    pub fn from_config(config: &Config) -> Self {
        let file = config.enable_file_logs.then(|| FileSink {
            dir: config.log_dir.clone(),
            prefix: config.log_file_prefix.clone(),
        });
        Self {
            filter: config.log_level.clone(),
            file,
        }
    }
}

fn open_file_writer(sink: &FileSink) -> std::io::Result<(NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(&sink.dir)?;
    let appender = RollingFileAppender::new(Rotation::DAILY, &sink.dir, &sink.prefix);
    Ok(tracing_appender::non_blocking(appender))
}

/// Installs the global subscriber. Hold the returned guard for the life of
/// the process or buffered file lines are lost.
pub fn init_tracing(config: &Config) -> Option<FileLogGuard> {
    let settings = LogSettings::from_config(config);
    let env_filter =
        EnvFilter::try_new(&settings.filter).unwrap_or_else(|_| EnvFilter::new("info"));

    let mut file_error = None;
    let writer = settings.file.as_ref().and_then(|sink| match open_file_writer(sink) {
        Ok(writer) => Some(writer),
        Err(err) => {
            file_error = Some((sink.dir.clone(), err));
            None
        }
    });
    let (file_layer, guard) = match writer {
        Some((writer, guard)) => {
            let layer = fmt::layer().with_writer(writer).with_ansi(false).with_target(true);
            (Some(layer), Some(FileLogGuard { _guard: guard }))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .with(file_layer)
        .init();

    if let Some((dir, err)) = file_error {
        tracing::warn!(error = %err, dir = %dir.display(), "file logging disabled");
    }
    guard
}
