use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use kirlian_shared::ChakraEnergyProfile;
use serde::Serialize;

use crate::config::LoggingConfig;
use crate::render::FieldStatistics;

fn append_json_line<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    serde_json::to_writer(&mut file, value)
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
    file.write_all(b"\n")
}

fn timestamp_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}

#[derive(Debug, Serialize)]
pub struct OperationLogEntry {
    pub operation: String,
    pub timestamp_ms: u128,
    pub width: u32,
    pub height: u32,
    pub mean_rgb: [f32; 3],
    pub mean_alpha: f32,
    pub coverage: f32,
}

#[derive(Debug, Serialize)]
pub struct ProfileLogEntry {
    pub source: String,
    pub timestamp_ms: u128,
    pub energies: ChakraEnergyProfile,
    pub average: f32,
}

/// Append-only JSON-lines log of render operations and computed profiles.
#[derive(Debug, Clone)]
pub struct OperationLog {
    dir: PathBuf,
    enabled: bool,
}

impl OperationLog {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self {
            dir: dir.into(),
            enabled: true,
        }
    }

    pub fn disabled() -> Self {
        Self {
            dir: PathBuf::new(),
            enabled: false,
        }
    }

    pub fn from_config(config: &LoggingConfig) -> Self {
        Self {
            dir: config.log_dir.clone(),
            enabled: config.enabled,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn log_operation(&self, operation: &str, stats: &FieldStatistics) -> io::Result<()> {
        if !self.enabled {
            return Ok(());
        }
        fs::create_dir_all(&self.dir)?;
        let entry = OperationLogEntry {
            operation: operation.to_string(),
            timestamp_ms: timestamp_ms(),
            width: stats.width,
            height: stats.height,
            mean_rgb: stats.mean_rgb,
            mean_alpha: stats.mean_alpha,
            coverage: stats.coverage,
        };
        append_json_line(self.dir.join("operations.jsonl"), &entry)
    }

    pub fn log_profile(&self, source: &str, profile: &ChakraEnergyProfile) -> io::Result<()> {
        if !self.enabled {
            return Ok(());
        }
        fs::create_dir_all(&self.dir)?;
        let entry = ProfileLogEntry {
            source: source.to_string(),
            timestamp_ms: timestamp_ms(),
            energies: *profile,
            average: profile.average(),
        };
        append_json_line(self.dir.join("profiles.jsonl"), &entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_one_line_per_entry() {
        let dir = tempfile::tempdir().unwrap();
        let log = OperationLog::new(dir.path().join("logs"));
        let stats = FieldStatistics {
            width: 2,
            height: 2,
            mean_rgb: [10.0, 20.0, 30.0],
            mean_alpha: 5.0,
            coverage: 0.25,
        };
        log.log_operation("aura", &stats).unwrap();
        log.log_operation("aura", &stats).unwrap();
        log.log_profile("manual", &ChakraEnergyProfile::uniform(40.0))
            .unwrap();

        let ops = fs::read_to_string(log.dir().join("operations.jsonl")).unwrap();
        assert_eq!(ops.lines().count(), 2);
        let first: serde_json::Value = serde_json::from_str(ops.lines().next().unwrap()).unwrap();
        assert_eq!(first["operation"], "aura");
        assert_eq!(first["width"], 2);

        let profiles = fs::read_to_string(log.dir().join("profiles.jsonl")).unwrap();
        assert!(profiles.contains("\"source\":\"manual\""));
    }

    #[test]
    fn disabled_log_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let log = OperationLog {
            dir: dir.path().join("logs"),
            enabled: false,
        };
        log.log_profile("manual", &ChakraEnergyProfile::zeros())
            .unwrap();
        assert!(!dir.path().join("logs").exists());
    }
}
