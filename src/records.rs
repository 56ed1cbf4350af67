//! Entity model: users, their accounts, and typed field access.
//!
//! Fields are addressed through small tag enums ([`UserField`],
//! [`AccountField`]) instead of by looking names up at runtime. A tag resolves
//! to a typed accessor via [`Record::get`], and names coming from callers are
//! resolved to tags once through [`Field::from_name`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use crate::Error;

pub type UserId = u32;
pub type AccountId = u32;

/// A value read out of a record field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldValue {
    Id(u32),
    Text(String),
    Amount(Decimal),
}

impl FieldValue {
    /// Zero ids, zero amounts and empty strings are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Id(id) => *id != 0,
            FieldValue::Text(text) => !text.is_empty(),
            FieldValue::Amount(amount) => !amount.is_zero(),
        }
    }

    /// Orders two values of the same kind; values of different kinds are
    /// not comparable.
    pub fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        match (self, other) {
            (FieldValue::Id(a), FieldValue::Id(b)) => Some(a.cmp(b)),
            (FieldValue::Text(a), FieldValue::Text(b)) => Some(a.cmp(b)),
            (FieldValue::Amount(a), FieldValue::Amount(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Id(id) => write!(f, "{id}"),
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::Amount(amount) => write!(f, "{amount}"),
        }
    }
}

impl From<u32> for FieldValue {
    fn from(id: u32) -> Self {
        FieldValue::Id(id)
    }
}

impl From<Decimal> for FieldValue {
    fn from(amount: Decimal) -> Self {
        FieldValue::Amount(amount)
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        FieldValue::Text(text.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(text: String) -> Self {
        FieldValue::Text(text)
    }
}

/// A field tag of one record type.
pub trait Field: Copy + Eq + fmt::Debug + 'static {
    const ALL: &'static [Self];

    fn name(self) -> &'static str;

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|field| field.name() == name)
    }
}

/// Something storage can persist: it has an identity once saved and can be
/// rendered as a flat mapping of field name to value.
pub trait Record {
    type Field: Field;

    fn id(&self) -> Option<u32>;

    fn get(&self, field: Self::Field) -> Option<FieldValue>;

    /// Looks a field up by name; unknown names read as a missing field.
    fn lookup(&self, name: &str) -> Option<FieldValue> {
        Self::Field::from_name(name).and_then(|field| self.get(field))
    }

    fn to_map(&self) -> BTreeMap<&'static str, Option<FieldValue>> {
        Self::Field::ALL
            .iter()
            .map(|field| (field.name(), self.get(*field)))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserField {
    Id,
    Name,
    Email,
    Address,
}

impl Field for UserField {
    const ALL: &'static [Self] = &[
        UserField::Id,
        UserField::Name,
        UserField::Email,
        UserField::Address,
    ];

    fn name(self) -> &'static str {
        match self {
            UserField::Id => "id",
            UserField::Name => "name",
            UserField::Email => "email",
            UserField::Address => "address",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountField {
    Id,
    UserId,
    AccountType,
    Balance,
}

impl Field for AccountField {
    const ALL: &'static [Self] = &[
        AccountField::Id,
        AccountField::UserId,
        AccountField::AccountType,
        AccountField::Balance,
    ];

    fn name(self) -> &'static str {
        match self {
            AccountField::Id => "id",
            AccountField::UserId => "user_id",
            AccountField::AccountType => "account_type",
            AccountField::Balance => "balance",
        }
    }
}

/// A bank customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Option<UserId>,
    pub name: String,
    pub email: String,
    pub address: Option<String>,
}

impl User {
    pub fn new(name: impl Into<String>, email: impl Into<String>, address: Option<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: email.into(),
            address,
        }
    }
}

impl Record for User {
    type Field = UserField;

    fn id(&self) -> Option<u32> {
        self.id
    }

    fn get(&self, field: UserField) -> Option<FieldValue> {
        match field {
            UserField::Id => self.id.map(FieldValue::Id),
            UserField::Name => Some(FieldValue::Text(self.name.clone())),
            UserField::Email => Some(FieldValue::Text(self.email.clone())),
            UserField::Address => self.address.clone().map(FieldValue::Text),
        }
    }
}

/// A bank account owned by a user.
///
/// `user_id` is a plain reference; nothing at this level checks that the
/// user exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Option<AccountId>,
    pub user_id: UserId,
    pub account_type: String,
    pub balance: Decimal,
}

impl Account {
    pub fn new(user_id: UserId, account_type: impl Into<String>, balance: Decimal) -> Self {
        Self {
            id: None,
            user_id,
            account_type: account_type.into(),
            balance,
        }
    }

    /// Adds a strictly positive amount and returns the new balance.
    pub fn deposit(&mut self, amount: Decimal) -> Result<Decimal, Error> {
        if amount <= Decimal::ZERO {
            return Err(Error::AmountMustBePositive);
        }
        self.balance += amount;
        Ok(self.balance)
    }

    /// Removes a strictly positive amount not exceeding the balance and
    /// returns the new balance. The balance is untouched on failure.
    pub fn withdraw(&mut self, amount: Decimal) -> Result<Decimal, Error> {
        if amount <= Decimal::ZERO {
            return Err(Error::AmountMustBePositive);
        }
        if amount > self.balance {
            return Err(Error::InsufficientFunds);
        }
        self.balance -= amount;
        Ok(self.balance)
    }
}

impl Record for Account {
    type Field = AccountField;

    fn id(&self) -> Option<u32> {
        self.id
    }

    fn get(&self, field: AccountField) -> Option<FieldValue> {
        match field {
            AccountField::Id => self.id.map(FieldValue::Id),
            AccountField::UserId => Some(FieldValue::Id(self.user_id)),
            AccountField::AccountType => Some(FieldValue::Text(self.account_type.clone())),
            AccountField::Balance => Some(FieldValue::Amount(self.balance)),
        }
    }
}
