//! An embedded ledger of bank users and their accounts.
//!
//! - [`Database`] is the facade: user/account management and the balance
//!   operations (deposit, withdraw, transfer) with their rules.
//! - [`Storage`] is the backend contract; [`MemoryStorage`] implements it.
//! - [`Index`] maps a field's values to record ids, independently of storage.
//! - [`BankQuery`] filters and sorts users or accounts by full scan.
//! - [`run`] and [`run_async`] replay a CSV command script and report the
//!   resulting balances as CSV.

mod csv_utils;
mod database;
mod dto;
mod error;
mod index;
mod query;
mod records;
mod runner;
mod stores;

pub use database::{Database, UserUpdate};
pub use dto::{AccountRow, Command, CommandType};
pub use error::Error;
pub use index::Index;
pub use query::{account_ids, BankQuery, Condition, Operator, QueryPlan, Row, Target};
pub use records::{
    Account, AccountField, AccountId, Field, FieldValue, Record, User, UserField, UserId,
};
pub use runner::{run, run_async};
pub use stores::{MemoryStorage, Storage};
