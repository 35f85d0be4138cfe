use std::{
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use tracing_subscriber::{fmt, fmt::writer::MakeWriter, prelude::*, EnvFilter};

use crate::{config::LogSettings, errors::Error, Result};

/// Initialize logging for the bot: console plus a size-capped rotating file.
///
/// The default filter is `info` for everything; override with `RUST_LOG`.
pub fn init(service_name: &str, settings: &LogSettings) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "info,hwbot_core=info,{}=info",
            service_name.replace('-', "_")
        ))
    });

    let file = RotatingFileWriter::open(&settings.file, settings.max_bytes, settings.backups)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_ansi(true))
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(file),
        )
        .try_init()
        .map_err(|e| Error::External(format!("failed to install log subscriber: {e}")))?;

    Ok(())
}

/// Append-only log file that rolls over once it would grow past `max_bytes`.
///
/// Rotation shifts `log.N-1 -> log.N ... log -> log.1`, dropping anything
/// beyond `backups`. With `backups == 0` the file is truncated in place.
#[derive(Clone, Debug)]
pub struct RotatingFileWriter {
    inner: Arc<Mutex<RotatingFile>>,
}

#[derive(Debug)]
struct RotatingFile {
    path: PathBuf,
    max_bytes: u64,
    backups: usize,
    file: File,
    size: u64,
}

impl RotatingFileWriter {
    pub fn open(path: impl Into<PathBuf>, max_bytes: u64, backups: usize) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = open_append(&path)?;
        let size = file.metadata()?.len();

        Ok(Self {
            inner: Arc::new(Mutex::new(RotatingFile {
                path,
                max_bytes,
                backups,
                file,
                size,
            })),
        })
    }
}

impl RotatingFile {
    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        if self.backups == 0 {
            self.file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&self.path)?;
            self.size = 0;
            return Ok(());
        }

        for idx in (1..self.backups).rev() {
            let from = backup_path(&self.path, idx);
            if from.exists() {
                fs::rename(&from, backup_path(&self.path, idx + 1))?;
            }
        }
        fs::rename(&self.path, backup_path(&self.path, 1))?;

        self.file = open_append(&self.path)?;
        self.size = 0;
        Ok(())
    }
}

impl Write for RotatingFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log file lock poisoned"))?;

        if guard.size > 0 && guard.size + buf.len() as u64 > guard.max_bytes {
            guard.rotate()?;
        }

        let n = guard.file.write(buf)?;
        guard.size += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log file lock poisoned"))?;
        guard.file.flush()
    }
}

impl<'a> MakeWriter<'a> for RotatingFileWriter {
    type Writer = RotatingFileWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// `logfile.log` + 2 -> `logfile.log.2`
pub fn backup_path(path: &Path, idx: usize) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".{idx}"));
    PathBuf::from(name)
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let root = PathBuf::from(format!("/tmp/hwbot-log-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(&root).unwrap();
        root
    }

    #[test]
    fn rotates_when_size_cap_is_reached() {
        let root = scratch_dir("rotate");
        let log = root.join("bot.log");
        let mut w = RotatingFileWriter::open(&log, 10, 2).unwrap();

        w.write_all(b"first-123\n").unwrap();
        w.write_all(b"second-12\n").unwrap();
        w.write_all(b"third-123\n").unwrap();
        w.flush().unwrap();

        assert_eq!(fs::read_to_string(&log).unwrap(), "third-123\n");
        assert_eq!(
            fs::read_to_string(backup_path(&log, 1)).unwrap(),
            "second-12\n"
        );
        assert_eq!(
            fs::read_to_string(backup_path(&log, 2)).unwrap(),
            "first-123\n"
        );

        // Oldest backup is dropped once the backup count is exhausted.
        w.write_all(b"fourth-12\n").unwrap();
        assert_eq!(
            fs::read_to_string(backup_path(&log, 2)).unwrap(),
            "second-12\n"
        );
        assert!(!backup_path(&log, 3).exists());

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn zero_backups_truncates_in_place() {
        let root = scratch_dir("truncate");
        let log = root.join("bot.log");
        let mut w = RotatingFileWriter::open(&log, 8, 0).unwrap();

        w.write_all(b"aaaaaa\n").unwrap();
        w.write_all(b"bbbbbb\n").unwrap();
        w.flush().unwrap();

        assert_eq!(fs::read_to_string(&log).unwrap(), "bbbbbb\n");
        assert!(!backup_path(&log, 1).exists());

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn appends_to_existing_file_and_counts_its_size() {
        let root = scratch_dir("append");
        let log = root.join("nested").join("bot.log");
        fs::create_dir_all(log.parent().unwrap()).unwrap();
        fs::write(&log, "old-line\n").unwrap();

        let mut w = RotatingFileWriter::open(&log, 12, 1).unwrap();
        w.write_all(b"new-line\n").unwrap();
        w.flush().unwrap();

        assert_eq!(fs::read_to_string(&log).unwrap(), "new-line\n");
        assert_eq!(
            fs::read_to_string(backup_path(&log, 1)).unwrap(),
            "old-line\n"
        );

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn formatted_events_land_in_the_file() {
        let root = scratch_dir("events");
        let log = root.join("bot.log");
        let writer = RotatingFileWriter::open(&log, 1024 * 1024, 1).unwrap();

        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_target(false)
            .with_writer(writer)
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("no new homework");
        });

        let contents = fs::read_to_string(&log).unwrap();
        assert!(contents.contains("WARN"));
        assert!(contents.contains("no new homework"));

        let _ = fs::remove_dir_all(&root);
    }
}
