//! # Command Log
//!
//! Appends every published [`DriveCommand`] to a JSONL file:
//!
//! ```text
//! {"timestamp":"2024-05-01T12:00:00.123Z","seq":0,"steering_angle":0.0,"speed":150.0}
//! ```
//!
//! Files are named `commands_<YYYYMMDD_HHMMSS>_<NNNN>.jsonl`. A new file is
//! started every `max_records_per_file` records, after which only the newest
//! `max_files_to_keep` command files are kept.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::TelemetryConfig;
use crate::error::Result;
use crate::messages::DriveCommand;

/// File name prefix shared by all command log files.
const FILE_PREFIX: &str = "commands_";

/// File name extension for command log files.
const FILE_EXTENSION: &str = "jsonl";

/// One line of the command log.
#[derive(Debug, Clone, Serialize)]
pub struct CommandRecord {
    /// RFC 3339 UTC timestamp with millisecond precision.
    pub timestamp: String,
    /// Sequence number across all files of this log.
    pub seq: u64,
    pub steering_angle: f32,
    pub speed: f32,
}

/// Rotating JSONL writer for drive commands.
pub struct CommandLog {
    dir: PathBuf,
    max_records_per_file: usize,
    max_files_to_keep: usize,
    writer: BufWriter<File>,
    current_path: PathBuf,
    records_in_file: usize,
    files_opened: u32,
    seq: u64,
}

impl std::fmt::Debug for CommandLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandLog")
            .field("current_path", &self.current_path)
            .field("records_in_file", &self.records_in_file)
            .field("seq", &self.seq)
            .finish_non_exhaustive()
    }
}

impl CommandLog {
    /// Opens a command log using telemetry settings.
    ///
    /// # Errors
    ///
    /// Returns error if the log directory cannot be created or the first file
    /// cannot be opened.
    pub fn open(config: &TelemetryConfig) -> Result<Self> {
        Self::open_in(
            &config.log_dir,
            config.max_records_per_file,
            config.max_files_to_keep,
        )
    }

    /// Opens a command log in `dir`, creating the directory if missing.
    ///
    /// # Errors
    ///
    /// Returns error if the directory or the first file cannot be created.
    pub fn open_in<P: AsRef<Path>>(
        dir: P,
        max_records_per_file: usize,
        max_files_to_keep: usize,
    ) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let (writer, current_path, index) = Self::create_file(&dir, 0)?;
        info!("Recording drive commands to {}", current_path.display());

        Ok(Self {
            dir,
            max_records_per_file: max_records_per_file.max(1),
            max_files_to_keep: max_files_to_keep.max(1),
            writer,
            current_path,
            records_in_file: 0,
            files_opened: index + 1,
            seq: 0,
        })
    }

    /// Appends one command, rotating first if the current file is full.
    ///
    /// # Errors
    ///
    /// Returns error on any file system failure.
    pub fn record(&mut self, command: &DriveCommand) -> Result<()> {
        if self.records_in_file >= self.max_records_per_file {
            self.rotate()?;
        }

        let record = CommandRecord {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            seq: self.seq,
            steering_angle: command.steering_angle,
            speed: command.speed,
        };

        serde_json::to_writer(&mut self.writer, &record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;

        self.records_in_file += 1;
        self.seq += 1;
        Ok(())
    }

    /// Path of the file currently being written.
    pub fn current_path(&self) -> &Path {
        &self.current_path
    }

    /// Total records written.
    pub fn records_written(&self) -> u64 {
        self.seq
    }

    fn rotate(&mut self) -> Result<()> {
        self.writer.flush()?;

        let (writer, path, index) = Self::create_file(&self.dir, self.files_opened)?;
        debug!("Rotated command log to {}", path.display());

        self.writer = writer;
        self.current_path = path;
        self.records_in_file = 0;
        self.files_opened = index + 1;

        self.prune()
    }

    /// Deletes the oldest command files beyond `max_files_to_keep`.
    fn prune(&self) -> Result<()> {
        let mut files = Self::list_log_files(&self.dir)?;
        if files.len() <= self.max_files_to_keep {
            return Ok(());
        }

        // Names sort chronologically: timestamp then counter
        files.sort();
        let excess = files.len() - self.max_files_to_keep;
        for path in files.into_iter().take(excess) {
            debug!("Removing old command log {}", path.display());
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn list_log_files(dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let is_log = path
                .file_name()
                .map(|name| name.to_string_lossy())
                .is_some_and(|name| {
                    name.starts_with(FILE_PREFIX) && name.ends_with(&format!(".{}", FILE_EXTENSION))
                });
            if is_log {
                files.push(path);
            }
        }
        Ok(files)
    }

    /// Creates the next unused log file, starting at counter `index`.
    ///
    /// Never opens an existing file, so a log started within the same second
    /// as an earlier one gets a higher counter instead of truncating it.
    fn create_file(dir: &Path, mut index: u32) -> Result<(BufWriter<File>, PathBuf, u32)> {
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
        loop {
            let name = format!(
                "{}{}_{:04}.{}",
                FILE_PREFIX, timestamp, index, FILE_EXTENSION
            );
            let path = dir.join(name);

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((BufWriter::new(file), path, index)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    debug!("{} already exists", path.display());
                    index += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn command(speed: f32) -> DriveCommand {
        DriveCommand { steering_angle: 0.0, speed }
    }

    fn read_lines(path: &Path) -> Vec<serde_json::Value> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_records_are_jsonl() {
        let dir = TempDir::new().unwrap();
        let mut log = CommandLog::open_in(dir.path(), 100, 10).unwrap();

        log.record(&DriveCommand { steering_angle: -45.0, speed: 80.0 }).unwrap();
        log.record(&command(120.0)).unwrap();

        let lines = read_lines(log.current_path());
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["seq"], 0);
        assert_eq!(lines[0]["steering_angle"], -45.0);
        assert_eq!(lines[0]["speed"], 80.0);
        assert_eq!(lines[1]["seq"], 1);
        assert!(lines[0]["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let log = CommandLog::open_in(&nested, 10, 2).unwrap();
        assert!(log.current_path().starts_with(&nested));
        assert!(log.current_path().exists());
    }

    #[test]
    fn test_rotates_after_max_records() {
        let dir = TempDir::new().unwrap();
        let mut log = CommandLog::open_in(dir.path(), 2, 10).unwrap();
        let first_path = log.current_path().to_path_buf();

        for _ in 0..3 {
            log.record(&command(120.0)).unwrap();
        }

        assert_ne!(log.current_path(), first_path.as_path());
        assert_eq!(read_lines(&first_path).len(), 2);
        let second = read_lines(log.current_path());
        assert_eq!(second.len(), 1);
        assert_eq!(second[0]["seq"], 2);
        assert_eq!(log.records_written(), 3);
    }

    #[test]
    fn test_keeps_only_newest_files() {
        let dir = TempDir::new().unwrap();
        let mut log = CommandLog::open_in(dir.path(), 1, 2).unwrap();

        for _ in 0..5 {
            log.record(&command(150.0)).unwrap();
        }

        let files = CommandLog::list_log_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().any(|path| path == log.current_path()));
    }

    #[test]
    fn test_reopening_does_not_truncate_existing_log() {
        let dir = TempDir::new().unwrap();

        let mut first = CommandLog::open_in(dir.path(), 100, 10).unwrap();
        first.record(&command(80.0)).unwrap();
        first.record(&command(150.0)).unwrap();
        let first_path = first.current_path().to_path_buf();
        drop(first);

        let mut second = CommandLog::open_in(dir.path(), 100, 10).unwrap();
        second.record(&command(120.0)).unwrap();

        assert_ne!(second.current_path(), first_path.as_path());
        let lines = read_lines(&first_path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["speed"], 80.0);
        assert_eq!(lines[1]["speed"], 150.0);
        assert_eq!(read_lines(second.current_path()).len(), 1);
    }

    #[test]
    fn test_create_file_skips_taken_names() {
        let dir = TempDir::new().unwrap();

        let (_, first_path, _) = CommandLog::create_file(dir.path(), 0).unwrap();
        fs::write(&first_path, "existing\n").unwrap();
        let (_, second_path, _) = CommandLog::create_file(dir.path(), 0).unwrap();

        assert_ne!(first_path, second_path);
        assert_eq!(fs::read_to_string(&first_path).unwrap(), "existing\n");
    }

    #[test]
    fn test_ignores_unrelated_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("notes.txt"), "keep me").unwrap();

        let mut log = CommandLog::open_in(dir.path(), 1, 1).unwrap();
        for _ in 0..3 {
            log.record(&command(80.0)).unwrap();
        }

        assert!(dir.path().join("notes.txt").exists());
    }
}
