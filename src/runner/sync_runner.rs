use std::error::Error;
use std::io::Write;
use std::path::Path;

use tracing::{info, warn};

use crate::{
    csv_utils::{read_csv, write_csv},
    dto::Command,
    runner::{account_report, apply_command},
    Database,
};

/// Runs a command script against a fresh in-memory bank and writes the
/// resulting account balances to the provided writer.
///
/// # Arguments
/// * `bank_name` - Display name of the bank, used in logs
/// * `input_path` - Path to the input CSV file containing commands
/// * `writer` - Where to write the account balances (e.g. stdout)
///
/// # Errors
/// Returns an error if:
/// * The input file cannot be read
/// * The CSV is malformed
/// * Writing to the output fails
pub fn run<P, W>(bank_name: &str, input_path: P, writer: W) -> Result<(), Box<dyn Error>>
where
    P: AsRef<Path>,
    W: Write,
{
    let mut db = Database::new(bank_name);
    let mut applied = 0usize;
    let mut skipped = 0usize;

    for command in read_csv::<Command, _>(input_path)? {
        // CSV parsing errors are critical - propagate them
        let command = command?;
        // Rejected commands are logged and skipped
        match apply_command(&mut db, command) {
            Ok(()) => applied += 1,
            Err(err) => {
                skipped += 1;
                warn!(%err, "skipping command");
            }
        }
    }
    info!(bank = db.name(), applied, skipped, "processed commands");

    write_csv(writer, account_report(&db)?.into_iter())?;
    Ok(())
}
