//! The bank facade: user and account management plus balance operations.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::index::Index;
use crate::query::BankQuery;
use crate::records::{Account, AccountField, AccountId, User, UserField, UserId};
use crate::stores::{MemoryStorage, Storage};
use crate::Error;

/// Partial update for [`Database::update_user`]; `None` fields are left alone.
#[derive(Debug, Default, Clone)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// Entry point combining a storage backend with the banking rules.
///
/// Mutating operations take `&mut self`, so one `Database` is never changed
/// by two callers at once. Share it across tasks by giving it a single owner
/// (see [`run_async`](crate::run_async)).
pub struct Database<S: Storage = MemoryStorage> {
    name: String,
    storage: S,
}

impl Database<MemoryStorage> {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_storage(name, MemoryStorage::new())
    }
}

impl<S: Storage> Database<S> {
    pub fn with_storage(name: impl Into<String>, storage: S) -> Self {
        Self {
            name: name.into(),
            storage,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn query(&self) -> BankQuery<'_, S> {
        BankQuery::new(&self.storage)
    }

    // Users

    /// Creates a user. Emails are not checked for uniqueness.
    pub fn create_user(
        &mut self,
        name: impl Into<String>,
        email: impl Into<String>,
        address: Option<String>,
    ) -> Result<User, Error> {
        let user = self.storage.save_user(User::new(name, email, address))?;
        debug!(bank = %self.name, user_id = ?user.id, "created user");
        Ok(user)
    }

    pub fn get_user(&self, user_id: UserId) -> Result<Option<User>, Error> {
        self.storage.get_user(user_id)
    }

    /// Applies the set fields of `update`. Returns `None` for unknown users.
    pub fn update_user(
        &mut self,
        user_id: UserId,
        update: UserUpdate,
    ) -> Result<Option<User>, Error> {
        let Some(mut user) = self.storage.get_user(user_id)? else {
            return Ok(None);
        };
        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(email) = update.email {
            user.email = email;
        }
        if let Some(address) = update.address {
            user.address = Some(address);
        }
        self.storage.save_user(user).map(Some)
    }

    /// Deletes a user together with all of their accounts.
    pub fn delete_user(&mut self, user_id: UserId) -> Result<bool, Error> {
        let deleted = self.storage.delete_user(user_id)?;
        debug!(bank = %self.name, user_id, deleted, "deleted user");
        Ok(deleted)
    }

    pub fn list_users(&self) -> Result<Vec<User>, Error> {
        self.storage.list_users()
    }

    // Accounts

    /// Opens an account for an existing user. The initial balance is taken
    /// as given.
    pub fn create_account(
        &mut self,
        user_id: UserId,
        account_type: impl Into<String>,
        initial_balance: Decimal,
    ) -> Result<Account, Error> {
        if self.storage.get_user(user_id)?.is_none() {
            return Err(Error::UserNotFound(user_id));
        }
        let account = self
            .storage
            .save_account(Account::new(user_id, account_type, initial_balance))?;
        debug!(bank = %self.name, user_id, account_id = ?account.id, "created account");
        Ok(account)
    }

    pub fn get_account(&self, account_id: AccountId) -> Result<Option<Account>, Error> {
        self.storage.get_account(account_id)
    }

    pub fn delete_account(&mut self, account_id: AccountId) -> Result<bool, Error> {
        self.storage.delete_account(account_id)
    }

    pub fn list_accounts(&self) -> Result<Vec<Account>, Error> {
        self.storage.list_accounts()
    }

    pub fn get_user_accounts(&self, user_id: UserId) -> Result<Vec<Account>, Error> {
        self.storage.accounts_for_user(user_id)
    }

    // Balances

    pub fn deposit(&mut self, account_id: AccountId, amount: Decimal) -> Result<Decimal, Error> {
        let mut account = self.require_account(account_id)?;
        let balance = account.deposit(amount)?;
        self.storage.save_account(account)?;
        debug!(account_id, %amount, %balance, "deposit");
        Ok(balance)
    }

    pub fn withdraw(&mut self, account_id: AccountId, amount: Decimal) -> Result<Decimal, Error> {
        let mut account = self.require_account(account_id)?;
        let balance = account.withdraw(amount)?;
        self.storage.save_account(account)?;
        debug!(account_id, %amount, %balance, "withdrawal");
        Ok(balance)
    }

    /// Moves `amount` from one account to another and returns both new
    /// balances.
    ///
    /// Both accounts are resolved and both balance changes validated before
    /// anything is written. If saving the destination fails after the source
    /// was saved, the source is written back with its original balance.
    pub fn transfer(
        &mut self,
        from_id: AccountId,
        to_id: AccountId,
        amount: Decimal,
    ) -> Result<(Decimal, Decimal), Error> {
        let original = self.require_account(from_id)?;
        let mut to = self.require_account(to_id)?;

        let mut from = original.clone();
        let from_balance = from.withdraw(amount)?;
        if from_id == to_id {
            // Nets out to nothing; only the withdrawal needed validating.
            return Ok((original.balance, original.balance));
        }
        let to_balance = to.deposit(amount)?;

        self.storage.save_account(from)?;
        if let Err(err) = self.storage.save_account(to) {
            warn!(from_id, to_id, %err, "transfer failed, restoring source account");
            self.storage.save_account(original)?;
            return Err(err);
        }
        debug!(from_id, to_id, %amount, "transfer");
        Ok((from_balance, to_balance))
    }

    pub fn get_account_balance(&self, account_id: AccountId) -> Result<Decimal, Error> {
        Ok(self.require_account(account_id)?.balance)
    }

    // Indexes

    /// Builds an index over the current users. It is not kept in sync with
    /// later changes.
    pub fn index_users(&self, field: UserField) -> Result<Index<User>, Error> {
        let mut index = Index::new(field);
        for user in self.storage.list_users()? {
            index.add(&user);
        }
        Ok(index)
    }

    /// Builds an index over the current accounts. It is not kept in sync with
    /// later changes.
    pub fn index_accounts(&self, field: AccountField) -> Result<Index<Account>, Error> {
        let mut index = Index::new(field);
        for account in self.storage.list_accounts()? {
            index.add(&account);
        }
        Ok(index)
    }

    fn require_account(&self, account_id: AccountId) -> Result<Account, Error> {
        self.storage
            .get_account(account_id)?
            .ok_or(Error::AccountNotFound(account_id))
    }
}
