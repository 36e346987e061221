//! Collection snapshot files
//!
//! A snapshot is either a JSON array of records (`<name>.json`) or one record
//! per line (`<name>.jsonl`). The file stem names the collection.

use chrono::Utc;
use mybay_core::{Error, Record, Result};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Array,
    Lines,
}

impl SnapshotFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "json" => Some(SnapshotFormat::Array),
            "jsonl" => Some(SnapshotFormat::Lines),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            SnapshotFormat::Array => "json",
            SnapshotFormat::Lines => "jsonl",
        }
    }
}

/// Read every record from a snapshot file.
///
/// Records missing `insertedAt` are stamped with the load time.
pub fn read_snapshot(path: &Path) -> Result<Vec<Record>> {
    let format = SnapshotFormat::from_path(path).ok_or_else(|| {
        Error::Storage(format!("{}: not a .json or .jsonl snapshot", path.display()))
    })?;

    let mut records: Vec<Record> = match format {
        SnapshotFormat::Array => {
            let data = std::fs::read(path)?;
            serde_json::from_slice(&data)
                .map_err(|e| Error::Storage(format!("{}: {}", path.display(), e)))?
        }
        SnapshotFormat::Lines => {
            let reader = BufReader::new(std::fs::File::open(path)?);
            let mut records = Vec::new();
            for (line_no, line) in reader.lines().enumerate() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let record = serde_json::from_str(&line).map_err(|e| {
                    Error::Storage(format!("{}:{}: {}", path.display(), line_no + 1, e))
                })?;
                records.push(record);
            }
            records
        }
    };

    let now = Utc::now();
    let mut unstamped = 0;
    for record in records.iter_mut().filter(|r| r.inserted_at.is_none()) {
        record.inserted_at = Some(now);
        unstamped += 1;
    }
    if unstamped > 0 {
        warn!(path = %path.display(), unstamped, "records without insertedAt, using load time");
    }
    Ok(records)
}

/// Write records to `path`, replacing any previous file atomically
pub fn write_snapshot(path: &Path, records: &[Record]) -> Result<()> {
    let format = SnapshotFormat::from_path(path).ok_or_else(|| {
        Error::Storage(format!("{}: not a .json or .jsonl snapshot", path.display()))
    })?;

    let data = match format {
        SnapshotFormat::Array => serde_json::to_vec_pretty(records)?,
        SnapshotFormat::Lines => {
            let mut out = Vec::new();
            for record in records {
                serde_json::to_writer(&mut out, record)?;
                out.push(b'\n');
            }
            out
        }
    };

    let temp_file = temp_path(path);
    std::fs::write(&temp_file, &data)?;
    std::fs::rename(&temp_file, path)?;
    Ok(())
}

/// `x.json` -> `x.json.tmp`, so `x.json` and `x.jsonl` never share a temp file
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}
