use std::error::Error;
use std::io::Write;
use std::path::Path;

use crate::{
    csv_utils::write_csv,
    dto::Command,
    runner::{account_report, apply_command},
    Database,
};

use csv_async::{AsyncReaderBuilder, Error as CsvError, Trim};
use tokio::fs::File;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tracing::{info, warn};

const BUFFER_SIZE: usize = 1024;

type Result<T, E = Box<dyn Error + Send + Sync>> = std::result::Result<T, E>;

/// Runs a command script async against a fresh in-memory bank and writes the
/// resulting account balances to the provided writer.
/// Spawns two tasks:
/// * CSV reader - streams commands from the input file, deserializes them and sends them to the processor via channel.
/// * Processor - owns the database, applies commands from the channel until it is closed.
///
/// The processor is the only owner of the database, so commands are applied
/// one at a time in file order.
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
pub async fn run<P, W>(bank_name: &str, input_path: P, writer: W) -> Result<()>
where
    P: AsRef<Path>,
    W: Write,
{
    // Create channel for passing commands from reader to processor
    let (tx, rx) = mpsc::channel(BUFFER_SIZE);
    let input_path = input_path.as_ref().to_owned();

    let reader_handle = tokio::spawn(read_commands(input_path, tx));
    let processor_handle = tokio::spawn(process_commands(Database::new(bank_name), rx));

    // Wait for reader to finish and propagate any errors
    reader_handle.await??;

    // Get final database state
    let db = processor_handle.await?;

    write_csv(writer, account_report(&db)?.into_iter())?;
    Ok(())
}

/// Reads and deserializes commands from a CSV file.
/// Returns them through the provided channel.
async fn read_commands(
    input_path: impl AsRef<Path> + Send,
    tx: mpsc::Sender<Command>,
) -> Result<(), CsvError> {
    let file = File::open(input_path).await?;
    let mut csv_reader = AsyncReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .create_deserializer(file);

    let mut records = csv_reader.deserialize::<Command>();
    while let Some(result) = records.next().await {
        match result {
            Ok(command) => {
                if tx.send(command).await.is_err() {
                    // Receiver dropped, exit gracefully
                    break;
                }
            }
            // CSV parsing errors are critical - propagate them
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// Applies commands received through the channel.
/// Returns the final database once the channel is closed by the reader.
async fn process_commands(mut db: Database, mut rx: mpsc::Receiver<Command>) -> Database {
    let (mut applied, mut skipped) = (0usize, 0usize);
    while let Some(command) = rx.recv().await {
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
    db
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_example_commands() -> Result<()> {
        let mut output = Vec::new();
        run("TestBank", "data/example_commands.csv", &mut output).await?;

        let expected = "account,user,kind,balance
1,1,checking,124.5
2,1,savings,25.5
3,2,checking,999.75
";
        assert_eq!(String::from_utf8(output)?, expected);
        Ok(())
    }

    #[tokio::test]
    async fn test_lifecycle_commands() -> Result<()> {
        let mut output = Vec::new();
        run("TestBank", "data/lifecycle_commands.csv", &mut output).await?;

        let expected = "account,user,kind,balance
1,1,checking,10
4,1,savings,40
";
        assert_eq!(String::from_utf8(output)?, expected);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_input_file() {
        let mut output = Vec::new();
        assert!(run("TestBank", "data/does_not_exist.csv", &mut output)
            .await
            .is_err());
    }
}
