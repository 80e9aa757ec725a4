use crate::config::LoggingConfig;
use std::{
    io::Write,
    path::Path,
    sync::{Arc, Mutex},
};
use tracing::Level;
use tracing_subscriber::{
    filter::LevelFilter,
    fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    ContentLimit, FileRotate,
};

// -------- level helpers --------
fn parse_level_filter(s: &str) -> LevelFilter {
    match s.to_ascii_lowercase().as_str() {
        "trace" => LevelFilter::from_level(Level::TRACE),
        "debug" => LevelFilter::from_level(Level::DEBUG),
        "info" => LevelFilter::from_level(Level::INFO),
        "warn" => LevelFilter::from_level(Level::WARN),
        "error" => LevelFilter::from_level(Level::ERROR),
        "off" | "none" => LevelFilter::OFF,
        _ => LevelFilter::from_level(Level::INFO),
    }
}

// -------- rotating writer for the log file --------
#[derive(Clone)]
struct RotWriter(Arc<Mutex<FileRotate<AppendTimestamp>>>);

impl<'a> fmt::MakeWriter<'a> for RotWriter {
    type Writer = RotWriterHandle;
    fn make_writer(&'a self) -> Self::Writer {
        RotWriterHandle(self.0.clone())
    }
}

#[derive(Clone)]
struct RotWriterHandle(Arc<Mutex<FileRotate<AppendTimestamp>>>);

impl Write for RotWriterHandle {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0.lock().unwrap().flush()
    }
}

/// Initialize logging from config: a console layer plus an optional
/// rotating file layer. `home_dir` anchors relative log file paths.
pub fn init_logging_from_config(config: &LoggingConfig, home_dir: &Path) {
    let console_filter = parse_level_filter(&config.console_level);
    let console_layer = fmt::layer().with_target(true).with_filter(console_filter);

    let file_layer = if config.file.trim().is_empty() {
        None
    } else {
        let mut path = std::path::PathBuf::from(&config.file);
        if path.is_relative() {
            path = home_dir.join(path);
        }
        if let Some(dir) = path.parent() {
            let _ = std::fs::create_dir_all(dir);
        }

        let max_files = config.max_backups.unwrap_or(3);
        let max_bytes = config.max_size_mb.unwrap_or(100).saturating_mul(1024 * 1024) as usize;
        let rotate = FileRotate::new(
            &path,
            AppendTimestamp::default(FileLimit::MaxFiles(max_files)),
            ContentLimit::Bytes(max_bytes),
            Compression::None,
            #[cfg(unix)]
            None,
        );

        let file_level = if config.file_level.trim().is_empty() {
            config.console_level.as_str()
        } else {
            config.file_level.as_str()
        };

        Some(
            fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(RotWriter(Arc::new(Mutex::new(rotate))))
                .with_filter(parse_level_filter(file_level)),
        )
    };

    // try_init: tests may install a subscriber more than once.
    let _ = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_parsing_accepts_known_levels() {
        assert_eq!(parse_level_filter("trace"), LevelFilter::TRACE);
        assert_eq!(parse_level_filter("DEBUG"), LevelFilter::DEBUG);
        assert_eq!(parse_level_filter("off"), LevelFilter::OFF);
        // Unknown strings fall back to info.
        assert_eq!(parse_level_filter("verbose"), LevelFilter::INFO);
    }

    #[test]
    fn init_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = LoggingConfig {
            console_level: "off".into(),
            file: String::new(),
            ..Default::default()
        };
        init_logging_from_config(&cfg, dir.path());
        init_logging_from_config(&cfg, dir.path());
    }
}
