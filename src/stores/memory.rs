use std::collections::BTreeMap;

use crate::records::{Account, AccountId, User, UserId};
use crate::stores::Storage;
use crate::Error;

/// Keeps users and accounts in two id-keyed maps.
///
/// Ids are handed out from two independent counters starting at 1. Listings
/// come back in ascending id order, which is insertion order for every id
/// this backend assigned itself. A counter that has run past `u32::MAX` is
/// `None`, and saving a record without an id then fails.
#[derive(Debug)]
pub struct MemoryStorage {
    users: BTreeMap<UserId, User>,
    accounts: BTreeMap<AccountId, Account>,
    next_user_id: Option<UserId>,
    next_account_id: Option<AccountId>,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            users: BTreeMap::new(),
            accounts: BTreeMap::new(),
            next_user_id: Some(1),
            next_account_id: Some(1),
        }
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }
}

/// Returns the id to store a record under, assigning one if needed.
/// A caller-supplied id pushes the counter past it so it is never handed out.
fn claim_id(id: Option<u32>, next: &mut Option<u32>) -> Result<u32, Error> {
    match id {
        Some(id) => {
            if next.is_some_and(|next_id| id >= next_id) {
                *next = id.checked_add(1);
            }
            Ok(id)
        }
        None => {
            let id = next.ok_or_else(|| Error::Storage("id space exhausted".into()))?;
            *next = id.checked_add(1);
            Ok(id)
        }
    }
}

impl Storage for MemoryStorage {
    fn save_user(&mut self, mut user: User) -> Result<User, Error> {
        let id = claim_id(user.id, &mut self.next_user_id)?;
        user.id = Some(id);
        self.users.insert(id, user.clone());
        Ok(user)
    }

    fn get_user(&self, id: UserId) -> Result<Option<User>, Error> {
        Ok(self.users.get(&id).cloned())
    }

    fn delete_user(&mut self, id: UserId) -> Result<bool, Error> {
        if self.users.remove(&id).is_none() {
            return Ok(false);
        }
        self.accounts.retain(|_, account| account.user_id != id);
        Ok(true)
    }

    fn list_users(&self) -> Result<Vec<User>, Error> {
        Ok(self.users.values().cloned().collect())
    }

    fn save_account(&mut self, mut account: Account) -> Result<Account, Error> {
        let id = claim_id(account.id, &mut self.next_account_id)?;
        account.id = Some(id);
        self.accounts.insert(id, account.clone());
        Ok(account)
    }

    fn get_account(&self, id: AccountId) -> Result<Option<Account>, Error> {
        Ok(self.accounts.get(&id).cloned())
    }

    fn delete_account(&mut self, id: AccountId) -> Result<bool, Error> {
        Ok(self.accounts.remove(&id).is_some())
    }

    fn list_accounts(&self) -> Result<Vec<Account>, Error> {
        Ok(self.accounts.values().cloned().collect())
    }

    fn accounts_for_user(&self, user_id: UserId) -> Result<Vec<Account>, Error> {
        Ok(self
            .accounts
            .values()
            .filter(|account| account.user_id == user_id)
            .cloned()
            .collect())
    }
}
