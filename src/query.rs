//! Fluent filtered and sorted retrieval of users or accounts.
//!
//! A [`BankQuery`] accumulates a target collection, conditions and a sort
//! key, then freezes into a [`QueryPlan`] when executed. Execution is always a
//! full scan of storage; [`Index`](crate::Index) is never consulted here.
//!
//! The user/account filter methods pick the collection for you: name and
//! email filters switch the query to users, every other filter switches it to
//! accounts, even if the other collection was chosen before. Mixing the two
//! families therefore leaves the query on the collection of the last filter,
//! and the earlier conditions then read a field that collection lacks and
//! fail.

use std::cmp::{Ordering, Reverse};

use rust_decimal::Decimal;
use tracing::debug;

use crate::records::{Account, AccountId, FieldValue, Record, User, UserId};
use crate::stores::Storage;
use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Users,
    Accounts,
}

/// A comparison against the value a condition reads from a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operator {
    Eq(FieldValue),
    Ne(FieldValue),
    Gt(FieldValue),
    Lt(FieldValue),
    Ge(FieldValue),
    Le(FieldValue),
    /// Case-insensitive substring match on text fields.
    Contains(String),
    /// Membership in a list of values.
    In(Vec<FieldValue>),
    /// Case-sensitive prefix match on text fields.
    StartsWith(String),
    /// Case-sensitive suffix match on text fields.
    EndsWith(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub op: Operator,
}

impl Condition {
    /// Ordering and containment checks fail on a missing or falsy field
    /// value instead of erroring. Prefix and suffix checks fail on anything
    /// but text.
    pub fn matches(&self, value: Option<&FieldValue>) -> bool {
        let ordering = |bound: &FieldValue| {
            value
                .filter(|value| value.is_truthy())
                .and_then(|value| value.compare(bound))
        };
        let text = match value {
            Some(FieldValue::Text(text)) => Some(text.as_str()),
            _ => None,
        };
        match &self.op {
            Operator::Eq(expected) => value == Some(expected),
            Operator::Ne(expected) => value != Some(expected),
            Operator::Gt(bound) => ordering(bound) == Some(Ordering::Greater),
            Operator::Lt(bound) => ordering(bound) == Some(Ordering::Less),
            Operator::Ge(bound) => {
                matches!(ordering(bound), Some(Ordering::Greater | Ordering::Equal))
            }
            Operator::Le(bound) => {
                matches!(ordering(bound), Some(Ordering::Less | Ordering::Equal))
            }
            Operator::Contains(needle) => text.is_some_and(|text| {
                !text.is_empty() && text.to_lowercase().contains(&needle.to_lowercase())
            }),
            Operator::In(values) => value.is_some_and(|value| values.contains(value)),
            Operator::StartsWith(prefix) => text.is_some_and(|text| text.starts_with(prefix)),
            Operator::EndsWith(suffix) => text.is_some_and(|text| text.ends_with(suffix)),
        }
    }
}

/// One query result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    User(User),
    Account(Account),
}

impl Row {
    pub fn lookup(&self, field: &str) -> Option<FieldValue> {
        match self {
            Row::User(user) => user.lookup(field),
            Row::Account(account) => account.lookup(field),
        }
    }

    pub fn id(&self) -> Option<u32> {
        match self {
            Row::User(user) => user.id,
            Row::Account(account) => account.id,
        }
    }

    pub fn as_user(&self) -> Option<&User> {
        match self {
            Row::User(user) => Some(user),
            Row::Account(_) => None,
        }
    }

    pub fn as_account(&self) -> Option<&Account> {
        match self {
            Row::Account(account) => Some(account),
            Row::User(_) => None,
        }
    }

    pub fn into_user(self) -> Option<User> {
        match self {
            Row::User(user) => Some(user),
            Row::Account(_) => None,
        }
    }

    pub fn into_account(self) -> Option<Account> {
        match self {
            Row::Account(account) => Some(account),
            Row::User(_) => None,
        }
    }
}

/// An immutable, fully specified query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub target: Target,
    pub conditions: Vec<Condition>,
    pub sort: Option<(String, bool)>,
    pub skip: usize,
    pub limit: Option<usize>,
}

impl QueryPlan {
    pub fn run<S: Storage>(&self, storage: &S) -> Result<Vec<Row>, Error> {
        let mut rows = self.candidates(storage)?;
        rows.retain(|row| {
            self.conditions
                .iter()
                .all(|condition| condition.matches(row.lookup(&condition.field).as_ref()))
        });

        if let Some((field, reverse)) = &self.sort {
            // Missing fields sort first ascending
            if *reverse {
                rows.sort_by_cached_key(|row| Reverse(row.lookup(field)));
            } else {
                rows.sort_by_cached_key(|row| row.lookup(field));
            }
        }

        let rows = rows.into_iter().skip(self.skip);
        Ok(match self.limit {
            Some(limit) => rows.take(limit).collect(),
            None => rows.collect(),
        })
    }

    /// Accounts are gathered user by user, so accounts whose owner is gone
    /// never show up.
    fn candidates<S: Storage>(&self, storage: &S) -> Result<Vec<Row>, Error> {
        let users = storage.list_users()?;
        match self.target {
            Target::Users => Ok(users.into_iter().map(Row::User).collect()),
            Target::Accounts => {
                let mut rows = Vec::new();
                for user_id in users.iter().filter_map(|user| user.id) {
                    rows.extend(
                        storage
                            .accounts_for_user(user_id)?
                            .into_iter()
                            .map(Row::Account),
                    );
                }
                Ok(rows)
            }
        }
    }
}

#[must_use]
pub struct BankQuery<'a, S: Storage> {
    storage: &'a S,
    target: Option<Target>,
    conditions: Vec<Condition>,
    sort: Option<(String, bool)>,
    skip: usize,
    limit: Option<usize>,
}

impl<'a, S: Storage> BankQuery<'a, S> {
    pub fn new(storage: &'a S) -> Self {
        Self {
            storage,
            target: None,
            conditions: Vec::new(),
            sort: None,
            skip: 0,
            limit: None,
        }
    }

    pub fn users(mut self) -> Self {
        self.target = Some(Target::Users);
        self
    }

    pub fn accounts(mut self) -> Self {
        self.target = Some(Target::Accounts);
        self
    }

    /// Appends a condition without changing the target collection.
    pub fn filter(mut self, field: &str, op: Operator) -> Self {
        self.conditions.push(Condition {
            field: field.to_owned(),
            op,
        });
        self
    }

    /// Users whose name contains `name`, ignoring case. Switches to users.
    pub fn filter_name(self, name: &str) -> Self {
        self.users()
            .filter("name", Operator::Contains(name.to_lowercase()))
    }

    /// Users with exactly this email. Switches to users.
    pub fn filter_email(self, email: &str) -> Self {
        self.users().filter("email", Operator::Eq(email.into()))
    }

    /// Accounts owned by `user_id`. Switches to accounts.
    pub fn filter_user_id(self, user_id: UserId) -> Self {
        self.accounts().filter("user_id", Operator::Eq(user_id.into()))
    }

    /// Accounts of this type. Switches to accounts.
    pub fn filter_account_type(self, account_type: &str) -> Self {
        self.accounts()
            .filter("account_type", Operator::Eq(account_type.into()))
    }

    /// Accounts with at least this balance. Switches to accounts.
    ///
    /// Zero balances never match, whatever the bound.
    pub fn filter_min_balance(self, min_balance: Decimal) -> Self {
        self.accounts()
            .filter("balance", Operator::Ge(min_balance.into()))
    }

    /// Accounts with at most this balance. Switches to accounts.
    ///
    /// Zero balances never match, whatever the bound.
    pub fn filter_max_balance(self, max_balance: Decimal) -> Self {
        self.accounts()
            .filter("balance", Operator::Le(max_balance.into()))
    }

    pub fn sort_by(mut self, field: &str, reverse: bool) -> Self {
        self.sort = Some((field.to_owned(), reverse));
        self
    }

    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Freezes the builder. Fails if no collection was selected.
    pub fn plan(&self) -> Result<QueryPlan, Error> {
        let target = self.target.ok_or(Error::QueryTypeNotSpecified)?;
        Ok(QueryPlan {
            target,
            conditions: self.conditions.clone(),
            sort: self.sort.clone(),
            skip: self.skip,
            limit: self.limit,
        })
    }

    pub fn execute(&self) -> Result<Vec<Row>, Error> {
        let plan = self.plan()?;
        debug!(?plan, "executing query");
        plan.run(self.storage)
    }

    pub fn count(&self) -> Result<usize, Error> {
        Ok(self.execute()?.len())
    }

    pub fn first(&self) -> Result<Option<Row>, Error> {
        Ok(self.execute()?.into_iter().next())
    }
}

/// Ids of the accounts in a result set, in result order.
pub fn account_ids(rows: &[Row]) -> Vec<AccountId> {
    rows.iter()
        .filter_map(Row::as_account)
        .filter_map(|account| account.id)
        .collect()
}
