//! CSV serialization and deserialization utilities.
//!
//! Provides generic functions for reading command scripts and writing
//! reports.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Creates an iterator that reads CSV records from a file.
/// Each record is deserialized into type T.
pub fn read_csv<T, P>(path: P) -> csv::Result<impl Iterator<Item = csv::Result<T>>>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    Ok(csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?
        .into_deserialize())
}

/// Writes an iterator of records to a CSV writer.
/// Each record must implement Serialize.
pub fn write_csv<T, W>(writer: W, records: impl Iterator<Item = T>) -> csv::Result<()>
where
    T: Serialize,
    W: Write,
{
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}
