use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use splitledger_domain::Trip;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to access '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid trip snapshot in '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

type StagedWriter<'a> = BufWriter<&'a mut NamedTempFile>;

/// Trip snapshot kept as a single JSON document on disk.
///
/// Saves go to a temporary file next to the target that is renamed over it
/// once fully written, so a failed save leaves the previous snapshot intact.
pub struct JsonTripStore {
    path: PathBuf,
}

impl JsonTripStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<Trip, StoreError> {
        let file = File::open(&self.path).map_err(|source| self.io_error(source))?;
        let trip: Trip = serde_json::from_reader(BufReader::new(file))
            .map_err(|source| self.json_error(source))?;
        tracing::debug!(
            path = %self.path.display(),
            trip_id = %trip.id,
            members = trip.members.len(),
            expenses = trip.expenses.len(),
            "loaded trip snapshot"
        );
        Ok(trip)
    }

    pub fn save(&self, trip: &Trip) -> Result<(), StoreError> {
        self.write_atomically(|writer| {
            serde_json::to_writer_pretty(writer, trip).map_err(|source| self.json_error(source))
        })?;
        tracing::debug!(path = %self.path.display(), trip_id = %trip.id, "saved trip snapshot");
        Ok(())
    }

    fn write_atomically<F>(&self, write: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut StagedWriter<'_>) -> Result<(), StoreError>,
    {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut staged = NamedTempFile::new_in(dir).map_err(|source| self.io_error(source))?;

        {
            let mut writer = BufWriter::new(&mut staged);
            write(&mut writer)?;
            writer.flush().map_err(|source| self.io_error(source))?;
        }
        staged
            .as_file()
            .sync_all()
            .map_err(|source| self.io_error(source))?;
        staged
            .persist(&self.path)
            .map_err(|err| self.io_error(err.error))?;
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn json_error(&self, source: serde_json::Error) -> StoreError {
        StoreError::Json {
            path: self.path.clone(),
            source,
        }
    }
}
