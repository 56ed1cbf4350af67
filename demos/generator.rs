//! This example generates a CSV command script for a number of users
//! (configurable through the constants) supplied as a command-line argument.
//!
//! The script can then be replayed with the `bank-ledger` binary.
//!
//! Example (100 users):
//! ```bash
//! cargo run --example generator 100 > data/100_users.csv
//! ```
//! ### Maths
//! Let:
//! - D = NUM_DEPOSITS, W = NUM_WITHDRAWALS, T = NUM_TRANSFERS,
//! - A_d, A_w, A_t the base deposit, withdrawal and transfer amounts,
//! - N the number of users and i the user id.
//!
//! User i owns checking account i and savings account N + i, both opened
//! empty.
//!
//! **Step 1: Deposits & Withdrawals** on checking:
//! D·A_d·i – W·A_w·i = 50·10·i – 10·20·i = 300·i.
//!
//! **Step 2: Transfers** of A_t·i from checking to savings, T times:
//! checking = 300·i – 20·5·i = 200·i, savings = 100·i.
//!
//! **Step 3: Final command**
//! - Odd i: a withdrawal far above the balance, rejected; nothing changes.
//! - Even i: the savings account is closed and drops out of the report.
//!
//! **Final State for user i:**
//! - checking i: balance 200·i
//! - savings N + i: balance 100·i for odd i, absent for even i

use bank_ledger::{Command, CommandType};
use csv::Writer;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::{env, error::Error};

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: cargo run --example generator <num_users>");
        std::process::exit(1);
    }

    let num_users: u32 = match args[1].parse() {
        Ok(n) if n > 0 => n,
        _ => {
            eprintln!("Error: <num_users> must be a positive integer.");
            std::process::exit(1);
        }
    };

    const NUM_DEPOSITS: usize = 50;
    const NUM_WITHDRAWALS: usize = 10;
    const NUM_TRANSFERS: usize = 20;

    // Base amounts; these will be scaled by the user ID.
    const BASE_DEPOSIT_AMOUNT: Decimal = dec!(10.0);
    const BASE_WITHDRAWAL_AMOUNT: Decimal = dec!(20.0);
    const BASE_TRANSFER_AMOUNT: Decimal = dec!(5.0);
    const OVERDRAFT_AMOUNT: Decimal = dec!(1000000);

    let mut wtr = Writer::from_writer(std::io::stdout());

    // Setup rounds: users, then checking accounts, then savings accounts,
    // so ids line up with the maths above.
    for user in 1..=num_users {
        wtr.serialize(Command {
            name: Some(format!("User {user}")),
            email: Some(format!("user{user}@example.com")),
            ..Command::new(CommandType::User)
        })?;
    }
    for kind in ["checking", "savings"] {
        for user in 1..=num_users {
            wtr.serialize(Command {
                user: Some(user),
                kind: Some(kind.to_owned()),
                ..Command::new(CommandType::Account)
            })?;
        }
    }

    // In each round, every user produces its next command.
    for round in 0..NUM_DEPOSITS + NUM_WITHDRAWALS + NUM_TRANSFERS {
        for user in 1..=num_users {
            let scale = Decimal::from(user);
            let command = if round < NUM_DEPOSITS {
                Command {
                    account: Some(user),
                    amount: Some(BASE_DEPOSIT_AMOUNT * scale),
                    ..Command::new(CommandType::Deposit)
                }
            } else if round < NUM_DEPOSITS + NUM_WITHDRAWALS {
                Command {
                    account: Some(user),
                    amount: Some(BASE_WITHDRAWAL_AMOUNT * scale),
                    ..Command::new(CommandType::Withdrawal)
                }
            } else {
                Command {
                    account: Some(user),
                    to: Some(num_users + user),
                    amount: Some(BASE_TRANSFER_AMOUNT * scale),
                    ..Command::new(CommandType::Transfer)
                }
            };
            wtr.serialize(command)?;
        }
    }

    // Final round: odd users overdraw, even users close their savings.
    for user in 1..=num_users {
        let command = if user % 2 == 1 {
            Command {
                account: Some(user),
                amount: Some(OVERDRAFT_AMOUNT * Decimal::from(user)),
                ..Command::new(CommandType::Withdrawal)
            }
        } else {
            Command {
                account: Some(num_users + user),
                ..Command::new(CommandType::Close)
            }
        };
        wtr.serialize(command)?;
    }
    wtr.flush()?;
    Ok(())
}
