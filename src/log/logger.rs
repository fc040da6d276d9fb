use crate::{
    config::{Config, ConfigError},
    log::{log_level::LogLevel, log_msg::LogMsg, logger_handle::LoggerHandle},
};

use std::{
    fs::{self, OpenOptions},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
    sync::mpsc::{self, TrySendError},
    thread,
    time::{SystemTime, UNIX_EPOCH},
};

pub const LOGGING_SECTION: &str = "Logging";

/// Flush every 100 lines when debugging, to see failures near real time.
#[cfg(feature = "log-debug")]
const FLUSH_BATCH_SIZE: u32 = 100;

#[cfg(not(feature = "log-debug"))]
const FLUSH_BATCH_SIZE: u32 = 1_000;

/// Bounded, non-blocking logger backed by a worker thread.
///
/// # Architecture
///
/// 1. **Producers**: any code holding a [`LoggerHandle`] (usually as an
///    `Arc<dyn LogSink>`) calls `log`/`try_log`.
/// 2. **Queue**: a bounded `mpsc` channel buffers records.
/// 3. **Consumer**: the worker writes one line per record and flushes every
///    `FLUSH_BATCH_SIZE` lines and when the last handle is dropped.
pub struct Logger {
    handle: LoggerHandle,
    thread: Option<thread::JoinHandle<()>>,
    file_path: Option<PathBuf>,
}

impl Logger {
    /// Starts a file logger configured from the `[Logging]` section.
    ///
    /// Keys: `log_path` (directory, `~` expanded; defaults to `logs/` next to
    /// the executable), `log_filename` (file prefix) and `level` (minimum level,
    /// default `info`).
    ///
    /// # Errors
    /// [`ConfigError::InvalidValue`] for an unknown `level`.
    pub fn from_config(cap: usize, config: &Config) -> Result<Self, ConfigError> {
        let level = match config.get_non_empty(LOGGING_SECTION, "level") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                section: LOGGING_SECTION,
                key: "level",
                value: raw.to_string(),
            })?,
            None => LogLevel::Info,
        };
        let app_name = config.get_non_empty(LOGGING_SECTION, "log_filename");
        let dir = config
            .get_non_empty(LOGGING_SECTION, "log_path")
            .map_or_else(|| exe_dir_fallback_cwd().join("logs"), expand_path);
        Ok(Self::start_in_dir(dir, app_name, cap, level))
    }

    /// Starts the logger in `dir`, creating it when missing.
    ///
    /// The file is named `<app>-<YYYYMMDD_HHMMSS>-pid<pid>.log`. If it cannot be
    /// opened the worker falls back to a file in the temp dir, then to `io::sink()`.
    pub fn start_in_dir<D: AsRef<Path>>(
        dir: D,
        app_name: Option<&str>,
        cap: usize,
        min_level: LogLevel,
    ) -> Self {
        let dir = dir.as_ref().to_path_buf();
        let _ = fs::create_dir_all(&dir);

        let ts = timestamp_for_filename();
        let pid = std::process::id();
        let fname = match app_name {
            Some(name) => format!("{name}-{ts}-pid{pid}.log"),
            None => format!("{ts}-pid{pid}.log"),
        };
        let file_path = dir.join(fname);

        let writer: Box<dyn Write + Send> = match OpenOptions::new().create(true).append(true).open(&file_path) {
            Ok(f) => Box::new(f),
            Err(_) => {
                let fallback = std::env::temp_dir().join("rustyjsep-fallback.log");
                match OpenOptions::new().create(true).append(true).open(&fallback) {
                    Ok(f) => Box::new(f),
                    Err(_) => Box::new(io::sink()),
                }
            }
        };

        let mut logger = Self::start_with_writer(writer, cap, min_level);
        logger.file_path = Some(file_path);
        logger
    }

    /// Starts the worker over an arbitrary writer.
    pub fn start_with_writer(writer: Box<dyn Write + Send>, cap: usize, min_level: LogLevel) -> Self {
        let (tx, rx) = mpsc::sync_channel::<LogMsg>(cap);

        let thread = thread::Builder::new()
            .name("logger-worker".into())
            .spawn(move || {
                let mut out = BufWriter::new(writer);
                let mut lines_written: u32 = 0;

                while let Ok(m) = rx.recv() {
                    let _ = writeln!(&mut out, "{m}");
                    lines_written = lines_written.wrapping_add(1);
                    if lines_written.is_multiple_of(FLUSH_BATCH_SIZE) {
                        let _ = out.flush();
                    }
                }

                let _ = out.flush();
            })
            .ok();

        Self {
            handle: LoggerHandle { tx, min_level },
            thread,
            file_path: None,
        }
    }

    /// Enqueues a record without blocking; see [`LoggerHandle::try_log`].
    ///
    /// # Errors
    /// The record is returned when the queue is full or the worker is gone.
    pub fn try_log<S: Into<String>>(
        &self,
        level: LogLevel,
        text: S,
        target: &'static str,
    ) -> Result<(), TrySendError<LogMsg>> {
        self.handle.try_log(level, text, target)
    }

    #[must_use]
    pub fn handle(&self) -> LoggerHandle {
        self.handle.clone()
    }

    /// Path of the log file, when logging to a file.
    #[must_use]
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Drops this logger's handle and waits for the worker to drain.
    ///
    /// The worker only exits once every cloned handle is gone too.
    pub fn shutdown(self) {
        let Self { handle, thread, .. } = self;
        drop(handle);
        if let Some(t) = thread {
            let _ = t.join();
        }
    }
}

/// Directory of the executable, or the current directory.
fn exe_dir_fallback_cwd() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// `YYYYMMDD_HHMMSS` in UTC, or `unix_<secs>` if the date cannot be represented.
fn timestamp_for_filename() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    unix_to_utc(secs).map_or_else(
        || format!("unix_{secs}"),
        |tm| {
            format!(
                "{:04}{:02}{:02}_{:02}{:02}{:02}",
                tm.year, tm.mon, tm.day, tm.hour, tm.min, tm.sec
            )
        },
    )
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SimpleUtc {
    year: i32,
    mon: u32,
    day: u32,
    hour: u32,
    min: u32,
    sec: u32,
}

/// Civil-from-days conversion of a Unix timestamp.
#[allow(clippy::many_single_char_names, clippy::cast_possible_truncation)]
fn unix_to_utc(mut s: u64) -> Option<SimpleUtc> {
    let sec = (s % 60) as u32;
    s /= 60;
    let min = (s % 60) as u32;
    s /= 60;
    let hour = (s % 24) as u32;
    s /= 24;

    let z: i128 = i128::from(s) + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097; // [0, 146096]
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100); // [0, 365]
    let mp = (5 * doy + 2) / 153; // [0, 11]
    let d = doy - (153 * mp + 2) / 5 + 1; // [1, 31]
    let m = mp + if mp < 10 { 3 } else { -9 }; // [1, 12]

    Some(SimpleUtc {
        year: i32::try_from(y + i128::from(m <= 2)).ok()?,
        mon: u32::try_from(m).ok()?,
        day: u32::try_from(d).ok()?,
        hour,
        min,
        sec,
    })
}

/// Expands a leading `~` to the home directory.
fn expand_path(path_str: &str) -> PathBuf {
    let home = || {
        std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .ok()
            .map(PathBuf::from)
    };
    if path_str == "~" {
        if let Some(h) = home() {
            return h;
        }
    }
    if let Some(rest) = path_str.strip_prefix("~/").or_else(|| path_str.strip_prefix("~\\")) {
        if let Some(mut h) = home() {
            h.push(rest);
            return h;
        }
    }
    PathBuf::from(path_str)
}
