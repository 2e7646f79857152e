//! JSON file helpers
//!
//! Reads fall back to the type's default when the file is missing; writes
//! go through a sibling temp file and a rename so a crash never leaves a
//! half-written data file behind.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{CycleError, CycleResult};

/// Read JSON from `path`, or `T::default()` when the file does not exist
pub fn read_json<T, P>(path: P) -> CycleResult<T>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return Ok(T::default());
    }

    let file = File::open(path)
        .map_err(|e| CycleError::Storage(format!("Cannot open {}: {}", path.display(), e)))?;

    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| CycleError::Storage(format!("Corrupt data in {}: {}", path.display(), e)))
}

/// Write pretty JSON to `path` atomically
pub fn write_json_atomic<T, P>(path: P, data: &T) -> CycleResult<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            CycleError::Storage(format!("Cannot create {}: {}", parent.display(), e))
        })?;
    }

    let temp_path = path.with_extension("json.tmp");
    let file = File::create(&temp_path).map_err(|e| {
        CycleError::Storage(format!("Cannot create {}: {}", temp_path.display(), e))
    })?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data)
        .map_err(|e| CycleError::Storage(format!("Cannot serialize data: {}", e)))?;
    writer
        .flush()
        .and_then(|_| writer.get_ref().sync_all())
        .map_err(|e| CycleError::Storage(format!("Cannot flush {}: {}", temp_path.display(), e)))?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        CycleError::Storage(format!("Cannot replace {}: {}", path.display(), e))
    })
}
