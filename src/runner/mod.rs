//! The runner is responsible for setting up a file stream for reading a
//! command script, applying the commands to a [`Database`], and writing the
//! resulting account balances to a writer.
//!
//! This module provides both a synchronous and an asynchronous runner implementations.
//!
mod async_runner;
mod sync_runner;

pub use async_runner::run as run_async;
pub use sync_runner::run;

use rust_decimal::Decimal;

use crate::database::{Database, UserUpdate};
use crate::dto::{AccountRow, Command, CommandType};
use crate::records::AccountId;
use crate::stores::Storage;
use crate::Error;

/// Applies one command. Errors are per-command and leave the database as it
/// was before the command.
pub(crate) fn apply_command<S: Storage>(
    db: &mut Database<S>,
    command: Command,
) -> Result<(), Error> {
    match command.cmd_type {
        CommandType::User => {
            let name = command.name.ok_or(Error::InvalidCommand("user needs a name"))?;
            let email = command.email.ok_or(Error::InvalidCommand("user needs an email"))?;
            db.create_user(name, email, command.address)?;
        }
        CommandType::Update => {
            let user_id = command.user.ok_or(Error::InvalidCommand("update needs a user"))?;
            let update = UserUpdate {
                name: command.name,
                email: command.email,
                address: command.address,
            };
            db.update_user(user_id, update)?
                .ok_or(Error::UserNotFound(user_id))?;
        }
        CommandType::Remove => {
            let user_id = command.user.ok_or(Error::InvalidCommand("remove needs a user"))?;
            if !db.delete_user(user_id)? {
                return Err(Error::UserNotFound(user_id));
            }
        }
        CommandType::Account => {
            let user_id = command.user.ok_or(Error::InvalidCommand("account needs a user"))?;
            let kind = command.kind.ok_or(Error::InvalidCommand("account needs a kind"))?;
            db.create_account(user_id, kind, command.amount.unwrap_or(Decimal::ZERO))?;
        }
        CommandType::Close => {
            let account_id = command
                .account
                .ok_or(Error::InvalidCommand("close needs an account"))?;
            if !db.delete_account(account_id)? {
                return Err(Error::AccountNotFound(account_id));
            }
        }
        CommandType::Deposit => {
            let (account_id, amount) = account_and_amount(&command)?;
            db.deposit(account_id, amount)?;
        }
        CommandType::Withdrawal => {
            let (account_id, amount) = account_and_amount(&command)?;
            db.withdraw(account_id, amount)?;
        }
        CommandType::Transfer => {
            let (from_id, amount) = account_and_amount(&command)?;
            let to_id = command.to.ok_or(Error::InvalidCommand("transfer needs a target"))?;
            db.transfer(from_id, to_id, amount)?;
        }
    }
    Ok(())
}

fn account_and_amount(command: &Command) -> Result<(AccountId, Decimal), Error> {
    let account_id = command
        .account
        .ok_or(Error::InvalidCommand("missing account"))?;
    let amount = command.amount.ok_or(Error::InvalidCommand("missing amount"))?;
    Ok((account_id, amount))
}

/// Report rows for every stored account, in account id order.
pub(crate) fn account_report<S: Storage>(db: &Database<S>) -> Result<Vec<AccountRow>, Error> {
    let mut rows: Vec<_> = db
        .list_accounts()?
        .into_iter()
        .map(AccountRow::from)
        .collect();
    rows.sort_by_key(|row| row.account);
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn command(cmd_type: CommandType) -> Command {
        Command::new(cmd_type)
    }

    fn seeded() -> Database {
        let mut db = Database::new("TestBank");
        db.create_user("Ann", "a@x.com", None).unwrap();
        db.create_account(1, "checking", dec!(10)).unwrap();
        db
    }

    #[test]
    fn test_missing_fields_are_invalid() {
        let mut db = seeded();
        assert!(matches!(
            apply_command(&mut db, command(CommandType::User)),
            Err(Error::InvalidCommand(_))
        ));
        assert!(matches!(
            apply_command(
                &mut db,
                Command {
                    account: Some(1),
                    ..command(CommandType::Deposit)
                }
            ),
            Err(Error::InvalidCommand(_))
        ));
        assert!(matches!(
            apply_command(
                &mut db,
                Command {
                    account: Some(1),
                    amount: Some(dec!(1)),
                    ..command(CommandType::Transfer)
                }
            ),
            Err(Error::InvalidCommand(_))
        ));
        assert_eq!(db.get_account_balance(1).unwrap(), dec!(10));
    }

    #[test]
    fn test_update_and_remove_unknown_user() {
        let mut db = seeded();
        let update = Command {
            user: Some(5),
            name: Some("Zed".into()),
            ..command(CommandType::Update)
        };
        assert_eq!(apply_command(&mut db, update), Err(Error::UserNotFound(5)));
        let remove = Command {
            user: Some(5),
            ..command(CommandType::Remove)
        };
        assert_eq!(apply_command(&mut db, remove), Err(Error::UserNotFound(5)));
    }

    #[test]
    fn test_close_unknown_account() {
        let mut db = seeded();
        let close = Command {
            account: Some(8),
            ..command(CommandType::Close)
        };
        assert_eq!(apply_command(&mut db, close), Err(Error::AccountNotFound(8)));
    }

    #[test]
    fn test_account_defaults_to_zero_balance() {
        let mut db = seeded();
        let open = Command {
            user: Some(1),
            kind: Some("savings".into()),
            ..command(CommandType::Account)
        };
        apply_command(&mut db, open).unwrap();
        assert_eq!(db.get_account_balance(2).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_account_report() {
        let mut db = seeded();
        db.create_account(1, "savings", dec!(2.50)).unwrap();
        let rows = account_report(&db).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].kind, "savings");
        assert_eq!(rows[1].balance.to_string(), "2.5");
    }
}
