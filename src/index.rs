//! Secondary-field lookup for users and accounts.
//!
//! An [`Index`] maps the values of one field to the ids of the records
//! holding them. It stores ids only and is never told about record changes
//! on its own: after mutating an indexed field, call [`Index::update`] with
//! the previous value or the index goes stale.

use std::collections::{BTreeMap, BTreeSet};

use crate::records::{FieldValue, Record};

#[derive(Debug, Clone)]
pub struct Index<R: Record> {
    field: R::Field,
    entries: BTreeMap<FieldValue, BTreeSet<u32>>,
}

impl<R: Record> Index<R> {
    pub fn new(field: R::Field) -> Self {
        Self {
            field,
            entries: BTreeMap::new(),
        }
    }

    pub fn field(&self) -> R::Field {
        self.field
    }

    /// Indexes a record under its current field value.
    /// Returns false for unsaved records and records lacking the field.
    pub fn add(&mut self, record: &R) -> bool {
        let Some(id) = record.id() else {
            return false;
        };
        let Some(value) = record.get(self.field) else {
            return false;
        };
        self.entries.entry(value).or_default().insert(id);
        true
    }

    /// Removes a record from the bucket of its current field value.
    /// Returns whether an id was actually removed.
    pub fn remove(&mut self, record: &R) -> bool {
        let (Some(id), Some(value)) = (record.id(), record.get(self.field)) else {
            return false;
        };
        self.remove_id(&value, id)
    }

    /// Re-indexes a record after its field changed from `old_value`.
    pub fn update(&mut self, record: &R, old_value: Option<FieldValue>) -> bool {
        if let (Some(id), Some(old_value)) = (record.id(), old_value) {
            self.remove_id(&old_value, id);
        }
        self.add(record)
    }

    /// Ids of all records whose field equals `value`.
    pub fn find(&self, value: impl Into<FieldValue>) -> BTreeSet<u32> {
        self.entries
            .get(&value.into())
            .cloned()
            .unwrap_or_default()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Distinct indexed values, in ascending order.
    pub fn values(&self) -> Vec<FieldValue> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes `id` from the bucket of `value`, for callers that no longer
    /// hold the record. Returns whether an id was actually removed.
    pub fn remove_id(&mut self, value: &FieldValue, id: u32) -> bool {
        let Some(ids) = self.entries.get_mut(value) else {
            return false;
        };
        let removed = ids.remove(&id);
        if ids.is_empty() {
            self.entries.remove(value);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Account, AccountField, User, UserField};
    use rust_decimal_macros::dec;

    fn user(id: u32, name: &str, email: &str) -> User {
        let mut user = User::new(name, email, None);
        user.id = Some(id);
        user
    }

    fn account(id: u32, user_id: u32, kind: &str) -> Account {
        let mut account = Account::new(user_id, kind, dec!(0));
        account.id = Some(id);
        account
    }

    #[test]
    fn test_add_and_find() {
        let mut index = Index::<User>::new(UserField::Email);
        assert!(index.add(&user(1, "Ann", "a@x.com")));
        assert_eq!(index.find("a@x.com"), BTreeSet::from([1]));
        assert!(index.find("nobody@x.com").is_empty());
    }

    #[test]
    fn test_shared_values_aggregate() {
        let mut index = Index::<Account>::new(AccountField::AccountType);
        index.add(&account(1, 1, "checking"));
        index.add(&account(2, 1, "savings"));
        index.add(&account(3, 2, "checking"));

        assert_eq!(index.find("checking"), BTreeSet::from([1, 3]));
        assert_eq!(
            index.values(),
            vec![FieldValue::from("checking"), FieldValue::from("savings")]
        );
    }

    #[test]
    fn test_add_skips_unsaved_and_missing_fields() {
        let mut index = Index::<User>::new(UserField::Address);
        assert!(!index.add(&User::new("Ann", "a@x.com", Some("1 Main St".into()))));
        assert!(!index.add(&user(1, "Bob", "b@x.com")));
        assert!(index.is_empty());
    }

    #[test]
    fn test_remove_drops_empty_keys() {
        let mut index = Index::<Account>::new(AccountField::UserId);
        let first = account(1, 7, "checking");
        let second = account(2, 7, "savings");
        index.add(&first);
        index.add(&second);

        assert!(index.remove(&first));
        assert_eq!(index.find(7u32), BTreeSet::from([2]));
        assert!(index.remove(&second));
        assert!(index.find(7u32).is_empty());
        assert!(index.values().is_empty());

        // Nothing left to remove
        assert!(!index.remove(&second));
    }

    #[test]
    fn test_update_moves_record_between_buckets() {
        let mut index = Index::<User>::new(UserField::Email);
        let mut ann = user(1, "Ann", "a@x.com");
        index.add(&ann);

        let old = ann.email.clone();
        ann.email = "ann@y.com".into();
        assert!(index.update(&ann, Some(old.into())));

        assert!(index.find("a@x.com").is_empty());
        assert_eq!(index.find("ann@y.com"), BTreeSet::from([1]));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_update_without_old_value_only_adds() {
        let mut index = Index::<User>::new(UserField::Email);
        let mut ann = user(1, "Ann", "a@x.com");
        index.add(&ann);

        ann.email = "ann@y.com".into();
        assert!(index.update(&ann, None));
        // The old bucket is left alone
        assert_eq!(index.find("a@x.com"), BTreeSet::from([1]));
        assert_eq!(index.find("ann@y.com"), BTreeSet::from([1]));

        // Re-adding under the same value is idempotent
        assert!(index.update(&ann, None));
        assert_eq!(index.len(), 2);
        assert!(!index.update(&User::new("Bob", "b@x.com", None), None));
    }

    #[test]
    fn test_remove_id_clears_stale_entry() {
        let mut index = Index::<User>::new(UserField::Name);
        index.add(&user(1, "Ann", "a@x.com"));
        index.add(&user(2, "Ann", "b@x.com"));

        assert!(index.remove_id(&"Ann".into(), 1));
        assert_eq!(index.find("Ann"), BTreeSet::from([2]));
        assert!(!index.remove_id(&"Ann".into(), 1));
        assert!(!index.remove_id(&"Bob".into(), 2));

        assert!(index.remove_id(&"Ann".into(), 2));
        assert!(index.is_empty());
    }

    #[test]
    fn test_index_goes_stale_without_update() {
        let mut index = Index::<User>::new(UserField::Name);
        let mut ann = user(1, "Ann", "a@x.com");
        index.add(&ann);
        ann.name = "Anna".into();

        assert_eq!(index.find("Ann"), BTreeSet::from([1]));
        assert!(index.find("Anna").is_empty());
    }

    #[test]
    fn test_balance_index_matches_numerically() {
        let mut index = Index::<Account>::new(AccountField::Balance);
        let mut acct = account(1, 1, "checking");
        acct.balance = dec!(10.50);
        index.add(&acct);
        assert_eq!(index.find(dec!(10.5)), BTreeSet::from([1]));
    }

    #[test]
    fn test_clear() {
        let mut index = Index::<User>::new(UserField::Name);
        index.add(&user(1, "Ann", "a@x.com"));
        index.clear();
        assert!(index.is_empty());
        assert_eq!(index.field(), UserField::Name);
    }
}
