//! Domain-specific errors for the bank ledger.
//!
//! Contains error variants for common failure cases like:
//! - Lookup errors (user or account not found)
//! - Balance rule violations (non-positive amount, insufficient funds)
//! - Query misuse (no collection selected)
//! - Malformed runner commands and backend failures
//!
//! Looking up a record that does not exist is not an error: storage and
//! facade getters return `Ok(None)` for that.

use thiserror::Error;

use crate::records::{AccountId, UserId};

#[derive(Debug, Error, PartialEq)]
pub enum Error {
    #[error("user {0} not found")]
    UserNotFound(UserId),
    #[error("account {0} not found")]
    AccountNotFound(AccountId),
    #[error("amount must be positive")]
    AmountMustBePositive,
    #[error("insufficient funds")]
    InsufficientFunds,
    #[error("query type not specified, call users() or accounts() first")]
    QueryTypeNotSpecified,
    #[error("invalid command: {0}")]
    InvalidCommand(&'static str),
    #[error("storage failure: {0}")]
    Storage(String),
}
