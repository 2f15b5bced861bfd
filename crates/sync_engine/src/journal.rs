//! Durable ride journal
//!
//! Append-only JSON-lines log per ride under a spool directory. Buffered
//! rows must survive a crash between append and drain; the journal is the
//! crash-safe copy, replayed at startup to finalize rides the process never
//! got to upload.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use contracts::{CoreError, RideId, TelemetryRow};
use tracing::{debug, warn};

/// Append-only per-ride row log
#[derive(Debug)]
pub struct RideJournal {
    dir: PathBuf,
}

impl RideJournal {
    /// Open (creating if needed) a journal under `dir`
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn ride_file(&self, ride_id: RideId) -> PathBuf {
        self.dir.join(format!("ride-{ride_id}.jsonl"))
    }

    /// Append one row to a ride's log
    pub fn append(&self, ride_id: RideId, row: &TelemetryRow) -> Result<(), CoreError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.ride_file(ride_id))?;

        let line = serde_json::to_string(row)
            .map_err(|e| CoreError::Other(format!("journal encode: {e}")))?;
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")?;
        Ok(())
    }

    /// Load all rows logged for a ride, in append order
    ///
    /// A torn trailing line (crash mid-write) is skipped; torn interior
    /// lines are skipped with a warning rather than failing the whole load.
    pub fn load(&self, ride_id: RideId) -> Result<Vec<TelemetryRow>, CoreError> {
        let path = self.ride_file(ride_id);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut rows = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<TelemetryRow>(&line) {
                Ok(row) => rows.push(row),
                Err(e) => {
                    warn!(
                        ride_id,
                        line_number = index + 1,
                        error = %e,
                        "skipping torn journal line"
                    );
                }
            }
        }
        Ok(rows)
    }

    /// Delete a ride's log after a successful finalize
    pub fn remove(&self, ride_id: RideId) -> Result<(), CoreError> {
        match fs::remove_file(self.ride_file(ride_id)) {
            Ok(()) => {
                debug!(ride_id, "journal removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Ride ids with a journal on disk, oldest id first
    pub fn pending(&self) -> Result<Vec<RideId>, CoreError> {
        let mut rides = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if let Some(ride_id) = parse_journal_name(&entry.path()) {
                rides.push(ride_id);
            }
        }
        rides.sort_unstable();
        Ok(rides)
    }
}

fn parse_journal_name(path: &Path) -> Option<RideId> {
    let name = path.file_name()?.to_str()?;
    let id = name.strip_prefix("ride-")?.strip_suffix(".jsonl")?;
    id.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{HazardSeverity, TelemetrySample};

    fn make_row(timestamp: i64) -> TelemetryRow {
        TelemetryRow::from_sample(&TelemetrySample::empty(timestamp), HazardSeverity::Clear)
    }

    #[test]
    fn test_append_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let journal = RideJournal::open(dir.path()).unwrap();

        for ts in [1, 2, 3] {
            journal.append(7, &make_row(ts)).unwrap();
        }

        let rows = journal.load(7).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].timestamp, 1);
        assert_eq!(rows[2].timestamp, 3);
    }

    #[test]
    fn test_load_missing_ride_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let journal = RideJournal::open(dir.path()).unwrap();
        assert!(journal.load(99).unwrap().is_empty());
    }

    #[test]
    fn test_torn_trailing_line_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let journal = RideJournal::open(dir.path()).unwrap();
        journal.append(1, &make_row(10)).unwrap();

        // Simulate a crash mid-append
        let path = dir.path().join("ride-1.jsonl");
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(b"{\"timestamp\": 11, \"acc").unwrap();

        let rows = journal.load(1).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].timestamp, 10);
    }

    #[test]
    fn test_pending_lists_rides_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let journal = RideJournal::open(dir.path()).unwrap();
        journal.append(5, &make_row(1)).unwrap();
        journal.append(2, &make_row(1)).unwrap();

        assert_eq!(journal.pending().unwrap(), vec![2, 5]);

        journal.remove(2).unwrap();
        assert_eq!(journal.pending().unwrap(), vec![5]);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let journal = RideJournal::open(dir.path()).unwrap();
        assert!(journal.remove(3).is_ok());
    }
}
