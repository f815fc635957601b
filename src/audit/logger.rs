use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use chrono::Utc;

const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024; // 10MB

/// Append-only record of what this server executed and what it refused.
pub struct AuditLogger {
    log_path: PathBuf,
}

impl AuditLogger {
    /// Create a new AuditLogger with the default log path
    pub fn new() -> std::io::Result<Self> {
        let log_path = Self::default_log_path()?;
        Self::with_path(log_path)
    }

    /// Create an AuditLogger with a custom log path
    pub fn with_path<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let log_path = path.as_ref().to_path_buf();

        // Ensure directory exists
        if let Some(parent) = log_path.parent() {
            fs::create_dir_all(parent)?;
        }

        Ok(Self { log_path })
    }

    /// Get the default log path: ~/.config/gitward/history.log
    fn default_log_path() -> std::io::Result<PathBuf> {
        let home = std::env::var("HOME").map_err(|_| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "HOME environment variable not set",
            )
        })?;

        Ok(PathBuf::from(home)
            .join(".config")
            .join("gitward")
            .join("history.log"))
    }

    /// Log a command execution
    pub fn log_command(
        &self,
        command: &str,
        workdir: &Path,
        exit_code: i32,
    ) -> std::io::Result<()> {
        self.rotate_if_needed()?;

        let timestamp = Utc::now().to_rfc3339();
        let entry = format!(
            "[{}] [{}] [exit:{}] {}\n",
            timestamp,
            workdir.display(),
            exit_code,
            command
        );
        self.append(&entry)
    }

    /// Log a validation rejection for forensics
    ///
    /// Rejected input is worth keeping: repeated rejections are how you spot
    /// a misbehaving or hostile client.
    pub fn log_rejection(&self, command: &str, reason: &str) -> std::io::Result<()> {
        self.rotate_if_needed()?;

        let timestamp = Utc::now().to_rfc3339();
        let entry = format!(
            "[{}] [REJECTED] command=\"{}\" reason=\"{}\"\n",
            timestamp, command, reason
        );
        self.append(&entry)
    }

    fn append(&self, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;

        file.write_all(entry.as_bytes())?;
        file.flush()?;

        Ok(())
    }

    /// Rotate log file if it exceeds MAX_LOG_SIZE
    fn rotate_if_needed(&self) -> std::io::Result<()> {
        if !self.log_path.exists() {
            return Ok(());
        }

        let metadata = fs::metadata(&self.log_path)?;
        if metadata.len() < MAX_LOG_SIZE {
            return Ok(());
        }

        let rotated = self.log_path.with_extension("log.old");
        fs::rename(&self.log_path, rotated)?;
        Ok(())
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_log_command_appends() {
        let temp = TempDir::new().unwrap();
        let log_path = temp.path().join("history.log");
        let logger = AuditLogger::with_path(&log_path).unwrap();

        logger
            .log_command("status", Path::new("/tmp/repo"), 0)
            .unwrap();
        logger
            .log_command("push origin main", Path::new("/tmp/repo"), 1)
            .unwrap();

        let contents = fs::read_to_string(&log_path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("[exit:0] status"));
        assert!(lines[1].contains("[exit:1] push origin main"));
    }

    #[test]
    fn test_log_rejection_format() {
        let temp = TempDir::new().unwrap();
        let log_path = temp.path().join("history.log");
        let logger = AuditLogger::with_path(&log_path).unwrap();

        logger
            .log_rejection("push --force", "dangerous pattern: force-flag")
            .unwrap();

        let contents = fs::read_to_string(&log_path).unwrap();
        assert!(contents.contains("[REJECTED]"));
        assert!(contents.contains("push --force"));
    }

    #[test]
    fn test_creates_parent_directory() {
        let temp = TempDir::new().unwrap();
        let log_path = temp.path().join("nested").join("dir").join("history.log");
        let logger = AuditLogger::with_path(&log_path).unwrap();

        logger.log_command("status", Path::new("/r"), 0).unwrap();
        assert!(log_path.exists());
    }
}
