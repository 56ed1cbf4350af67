//! Storage layer for the bank ledger. Provides:
//! - The [`Storage`] contract every backend satisfies
//! - [`MemoryStorage`], the reference in-memory backend
//!
//! Backends own the canonical copy of every record. Reads hand out owned
//! clones; changes to a clone are only visible to others after it is saved.

mod memory;

pub use memory::MemoryStorage;

use crate::records::{Account, AccountId, User, UserId};
use crate::Error;

/// CRUD over users and accounts.
///
/// Every method is fallible so that durable backends can report I/O
/// problems; the in-memory backend never fails.
pub trait Storage {
    /// Persists a user, assigning a fresh id if it has none yet.
    fn save_user(&mut self, user: User) -> Result<User, Error>;

    fn get_user(&self, id: UserId) -> Result<Option<User>, Error>;

    /// Deletes a user and every account it owns.
    /// Returns whether the user existed.
    fn delete_user(&mut self, id: UserId) -> Result<bool, Error>;

    fn list_users(&self) -> Result<Vec<User>, Error>;

    /// Persists an account, assigning a fresh id if it has none yet.
    fn save_account(&mut self, account: Account) -> Result<Account, Error>;

    fn get_account(&self, id: AccountId) -> Result<Option<Account>, Error>;

    /// Deletes a single account. The owning user is not affected.
    fn delete_account(&mut self, id: AccountId) -> Result<bool, Error>;

    fn list_accounts(&self) -> Result<Vec<Account>, Error>;

    fn accounts_for_user(&self, user_id: UserId) -> Result<Vec<Account>, Error>;
}
