//! JSONL file writer for resolution audit events.
//!
//! Each [`ResolutionEvent`] is serialized as a single JSON line with a
//! `type` field and `timestamp`, appended to the file via a buffered writer.

use ensemble_application::{ResolutionEvent, ResolutionLogger};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Append-only JSONL audit log, one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Write failures are swallowed:
/// the audit log never affects a resolution.
pub struct JsonlResolutionLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlResolutionLogger {
    /// Open (or create) the log at the given path, appending to it.
    ///
    /// Creates parent directories if needed. Returns `None` if the file
    /// cannot be opened.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create audit log directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open audit log file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResolutionLogger for JsonlResolutionLogger {
    fn log(&self, event: ResolutionEvent) {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        let record = if let serde_json::Value::Object(mut map) = event.payload {
            map.insert(
                "type".to_string(),
                serde_json::Value::String(event.event_type.to_string()),
            );
            map.insert(
                "timestamp".to_string(),
                serde_json::Value::String(timestamp),
            );
            serde_json::Value::Object(map)
        } else {
            serde_json::json!({
                "type": event.event_type,
                "timestamp": timestamp,
                "data": event.payload,
            })
        };

        let Ok(line) = serde_json::to_string(&record) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            // One line per event survives a crash
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlResolutionLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn read_lines(path: &Path) -> Vec<serde_json::Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_writes_one_record_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit").join("resolutions.jsonl");
        let logger = JsonlResolutionLogger::new(&path).unwrap();

        logger.log(ResolutionEvent::new(
            "provider_result",
            json!({"provider_id": "gemini-2.5-flash", "succeeded": true, "attempts": 1}),
        ));
        logger.log(ResolutionEvent::new(
            "resolution",
            json!({"final_answer": "A", "method": "majority"}),
        ));
        drop(logger);

        let records = read_lines(&path);
        assert_eq!(records.len(), 2);
        for record in &records {
            assert!(record.get("timestamp").is_some());
        }
        assert_eq!(records[0]["type"], "provider_result");
        assert_eq!(records[0]["provider_id"], "gemini-2.5-flash");
        assert_eq!(records[1]["type"], "resolution");
        assert_eq!(records[1]["method"], "majority");
    }

    #[test]
    fn test_appends_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resolutions.jsonl");

        for answer in ["A", "B"] {
            let logger = JsonlResolutionLogger::new(&path).unwrap();
            logger.log(ResolutionEvent::new("resolution", json!({"final_answer": answer})));
        }

        let records = read_lines(&path);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["final_answer"], "B");
    }

    #[test]
    fn test_non_object_payload_is_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resolutions.jsonl");
        let logger = JsonlResolutionLogger::new(&path).unwrap();

        logger.log(ResolutionEvent::new("cache_hit", json!("just a string")));
        drop(logger);

        let records = read_lines(&path);
        assert_eq!(records[0]["type"], "cache_hit");
        assert_eq!(records[0]["data"], "just a string");
    }

    #[test]
    fn test_returns_none_when_path_is_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(JsonlResolutionLogger::new(dir.path()).is_none());
    }
}
