//! Event Logger
//!
//! Append-only JSONL log of lifecycle events.

use bevy_ecs::prelude::*;
use flood_events::LifecycleEvent;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Resource for logging events to a JSONL file
#[derive(Resource)]
pub struct EventLogger {
    writer: Option<BufWriter<File>>,
    event_count: u64,
}

impl EventLogger {
    /// Create a new event logger writing to the specified path
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            writer: Some(BufWriter::new(file)),
            event_count: 0,
        })
    }

    /// Create a logger that only counts events
    pub fn null() -> Self {
        Self {
            writer: None,
            event_count: 0,
        }
    }

    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    pub fn log(&mut self, event: &LifecycleEvent) -> std::io::Result<()> {
        self.event_count += 1;
        if let Some(ref mut writer) = self.writer {
            let json = serde_json::to_string(event)?;
            writeln!(writer, "{}", json)?;
        }
        Ok(())
    }

    pub fn log_batch(&mut self, events: &[LifecycleEvent]) -> std::io::Result<()> {
        for event in events {
            self.log(event)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for EventLogger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!("Failed to flush event logger: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flood_events::{DeathCause, DisasterPhase, LifecycleEventKind, SimTimestamp};
    use std::io::BufRead;

    #[test]
    fn test_event_logging() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");

        {
            let mut logger = EventLogger::new(&path).unwrap();
            let ts = SimTimestamp::new(300, DisasterPhase::DuringFlood);
            logger
                .log_batch(&[
                    LifecycleEvent::new("evt_00000001", ts, 4, LifecycleEventKind::Stranded),
                    LifecycleEvent::new(
                        "evt_00000002",
                        ts,
                        4,
                        LifecycleEventKind::Died {
                            cause: DeathCause::Stranded,
                        },
                    ),
                ])
                .unwrap();
            assert_eq!(logger.event_count(), 2);
        }

        let file = File::open(&path).unwrap();
        let lines: Vec<String> = std::io::BufReader::new(file)
            .lines()
            .map(|l| l.unwrap())
            .collect();
        assert_eq!(lines.len(), 2);

        let parsed: LifecycleEvent = serde_json::from_str(&lines[1]).unwrap();
        assert!(parsed.is_death());
        assert_eq!(parsed.person_id, 4);
    }

    #[test]
    fn test_null_logger_counts() {
        let mut logger = EventLogger::null();
        let ts = SimTimestamp::new(0, DisasterPhase::Baseline);
        logger
            .log(&LifecycleEvent::new("evt_00000001", ts, 1, LifecycleEventKind::Returned))
            .unwrap();
        assert_eq!(logger.event_count(), 1);
    }
}
