use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;

pub const APP_NAME: &str = "hueprint";

struct LogState {
    buffer: Vec<u8>,
    stream: bool,
}

/// Session log file. Buffered in memory until `flush_to_disk`, or written
/// through line by line when streaming.
///
/// Library code only emits `tracing` events; `init_logging` routes them here
/// and to stderr.
#[derive(Clone)]
pub struct SessionLog {
    state: Arc<Mutex<LogState>>,
    log_path: PathBuf,
}

impl SessionLog {
    pub fn create(log_dir: &Path, retention_count: usize, stream: bool) -> Result<Self> {
        fs::create_dir_all(log_dir)
            .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

        // Make room for the file about to be created
        prune_old_logs(log_dir, APP_NAME, retention_count.saturating_sub(1));

        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let log_path = log_dir.join(format!("{}_{}.log", APP_NAME, timestamp));

        Ok(Self {
            state: Arc::new(Mutex::new(LogState {
                buffer: Vec::new(),
                stream,
            })),
            log_path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }

    fn append(&self, bytes: &[u8]) -> io::Result<()> {
        let mut state = self.lock_state();

        if state.stream {
            let mut file = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.log_path)?;
            file.write_all(bytes)?;
            file.flush()
        } else {
            state.buffer.extend_from_slice(bytes);
            Ok(())
        }
    }

    // A panic mid-write leaves at worst a partial line; keep the rest
    fn lock_state(&self) -> MutexGuard<'_, LogState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn flush_to_disk(&self) -> Result<()> {
        let mut state = self.lock_state();
        if state.buffer.is_empty() {
            return Ok(());
        }

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("Failed to open log file {}", self.log_path.display()))?;
        file.write_all(&state.buffer)?;
        file.flush()?;

        state.buffer.clear();
        Ok(())
    }
}

pub struct SessionLogWriter {
    log: SessionLog,
}

impl Write for SessionLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.log.append(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for SessionLog {
    type Writer = SessionLogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        SessionLogWriter { log: self.clone() }
    }
}

/// Keep only the `keep` newest `<app>_*.log` files in `log_dir`.
pub fn prune_old_logs(log_dir: &Path, app_name: &str, keep: usize) {
    let prefix = format!("{}_", app_name);

    let Ok(entries) = fs::read_dir(log_dir) else {
        return;
    };

    let mut log_files: Vec<(PathBuf, std::time::SystemTime)> = entries
        .flatten()
        .filter_map(|entry| {
            let path = entry.path();
            let name = path.file_name()?.to_str()?;
            if !name.starts_with(&prefix) || path.extension()? != "log" {
                return None;
            }
            let modified = entry.metadata().ok()?.modified().ok()?;
            Some((path, modified))
        })
        .collect();

    // Newest first
    log_files.sort_by(|a, b| b.1.cmp(&a.1));

    for (path, _) in log_files.iter().skip(keep) {
        let _ = fs::remove_file(path);
    }
}

static SESSION_LOG: OnceCell<SessionLog> = OnceCell::new();

/// Install the global subscriber: human-readable output on stderr at the
/// requested level, everything down to DEBUG in the session file.
pub fn init_logging(log_dir: &Path, retention_count: usize, stream: bool, verbose: bool) -> Result<()> {
    let log = SessionLog::create(log_dir, retention_count, stream)?;

    let console_level = if verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .with_filter(console_level),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(log.clone())
                .with_ansi(false)
                .with_filter(LevelFilter::DEBUG),
        )
        .try_init()
        .context("Logging already initialized")?;

    SESSION_LOG
        .set(log)
        .map_err(|_| anyhow::anyhow!("Session log already initialized"))?;

    tracing::info!("=== {} session started ===", APP_NAME);
    Ok(())
}

pub fn log_path() -> Option<PathBuf> {
    SESSION_LOG.get().map(|log| log.path().to_path_buf())
}

pub fn log_info(message: impl AsRef<str>) {
    tracing::info!("{}", message.as_ref());
}

pub fn log_warn(message: impl AsRef<str>) {
    tracing::warn!("{}", message.as_ref());
}

pub fn log_error(message: impl AsRef<str>) {
    tracing::error!("{}", message.as_ref());
}

pub fn finalize_logs() -> Result<()> {
    if let Some(log) = SESSION_LOG.get() {
        tracing::info!("=== {} session ended ===", APP_NAME);
        log.flush_to_disk()?;
    }
    Ok(())
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::logger::log_info(format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::logger::log_warn(format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::logger::log_error(format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("hueprint-logs-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn buffered_log_writes_on_flush() {
        let dir = scratch_dir("buffered");
        let log = SessionLog::create(&dir, 10, false).unwrap();

        log.make_writer().write_all(b"first line\n").unwrap();
        assert!(!log.path().exists());

        log.flush_to_disk().unwrap();
        assert_eq!(fs::read_to_string(log.path()).unwrap(), "first line\n");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn streaming_log_writes_immediately() {
        let dir = scratch_dir("streaming");
        let log = SessionLog::create(&dir, 10, true).unwrap();

        log.make_writer().write_all(b"now\n").unwrap();
        assert_eq!(fs::read_to_string(log.path()).unwrap(), "now\n");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn poisoned_log_still_flushes() {
        let dir = scratch_dir("poisoned");
        let log = SessionLog::create(&dir, 10, false).unwrap();
        log.make_writer().write_all(b"before\n").unwrap();

        let holder = log.clone();
        let result = std::thread::spawn(move || {
            let _guard = holder.state.lock().unwrap();
            panic!("writer died holding the lock");
        })
        .join();
        assert!(result.is_err());
        assert!(log.state.is_poisoned());

        log.make_writer().write_all(b"after\n").unwrap();
        log.flush_to_disk().unwrap();
        assert_eq!(fs::read_to_string(log.path()).unwrap(), "before\nafter\n");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn macros_reach_the_installed_subscriber() {
        let dir = scratch_dir("macros");
        let log = SessionLog::create(&dir, 10, false).unwrap();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(log.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            crate::log_info!("wrote {} colors", 30);
            crate::log_warn!("slot {} is short", "Neck");
            crate::log_error!("bad hex {:?}", "#zz0000");
        });
        log.flush_to_disk().unwrap();

        let contents = fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("INFO") && lines[0].contains("wrote 30 colors"));
        assert!(lines[1].contains("WARN") && lines[1].contains("slot Neck is short"));
        assert!(lines[2].contains("ERROR") && lines[2].contains("bad hex \"#zz0000\""));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn pruning_keeps_newest_matching_files() {
        let dir = scratch_dir("prune");
        for i in 0..4 {
            fs::write(dir.join(format!("hueprint_2025010{}_000000.log", i)), "x").unwrap();
            std::thread::sleep(std::time::Duration::from_millis(20));
        }
        fs::write(dir.join("other_20250101_000000.log"), "x").unwrap();
        fs::write(dir.join("hueprint_notes.txt"), "x").unwrap();

        prune_old_logs(&dir, APP_NAME, 2);

        let mut remaining: Vec<String> = fs::read_dir(&dir)
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        remaining.sort();
        assert_eq!(
            remaining,
            [
                "hueprint_20250102_000000.log",
                "hueprint_20250103_000000.log",
                "hueprint_notes.txt",
                "other_20250101_000000.log",
            ]
        );
        let _ = fs::remove_dir_all(&dir);
    }
}
