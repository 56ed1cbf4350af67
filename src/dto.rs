use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};

use crate::records::{Account, AccountId, UserId};

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum CommandType {
    User,
    Update,
    Remove,
    Account,
    Close,
    Deposit,
    Withdrawal,
    Transfer,
}

/// One row of a command script. Which columns are required depends on
/// `cmd_type`; the rest are left empty.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Command {
    #[serde(rename = "type")]
    pub cmd_type: CommandType,
    pub user: Option<UserId>,
    pub account: Option<AccountId>,
    pub to: Option<AccountId>,
    #[serde(deserialize_with = "deserialize_decimal_4dp")]
    pub amount: Option<Decimal>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub kind: Option<String>,
}

impl Command {
    /// A command of the given type with every column empty.
    pub fn new(cmd_type: CommandType) -> Self {
        Self {
            cmd_type,
            user: None,
            account: None,
            to: None,
            amount: None,
            name: None,
            email: None,
            address: None,
            kind: None,
        }
    }
}

fn deserialize_decimal_4dp<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Decimal>::deserialize(deserializer)
        .map(|opt_dec| opt_dec.map(|dec| dec.round_dp_with_strategy(4, RoundingStrategy::ToZero)))
}

/// One line of the balance report.
#[derive(Debug, Serialize, PartialEq)]
pub struct AccountRow {
    pub account: AccountId,
    pub user: UserId,
    pub kind: String,
    pub balance: Decimal,
}

impl From<Account> for AccountRow {
    fn from(account: Account) -> Self {
        Self {
            account: account.id.unwrap_or_default(),
            user: account.user_id,
            kind: account.account_type,
            balance: account.balance.normalize(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn parse_csv_row(row: &str) -> Result<Command, csv::Error> {
        let data_with_header = format!("type,user,account,to,amount,name,email,address,kind\n{}", row);
        let mut reader = csv::Reader::from_reader(data_with_header.as_bytes());
        reader.deserialize().next().unwrap()
    }

    #[test]
    fn test_parse_user() {
        assert_eq!(
            parse_csv_row("user,,,,,Ann Lee,ann@x.com,1 Main St,").unwrap(),
            Command {
                name: Some("Ann Lee".into()),
                email: Some("ann@x.com".into()),
                address: Some("1 Main St".into()),
                ..Command::new(CommandType::User)
            }
        );
    }

    #[test]
    fn test_parse_account() {
        assert_eq!(
            parse_csv_row("account,3,,,100,,,,savings").unwrap(),
            Command {
                user: Some(3),
                amount: Some(dec!(100)),
                kind: Some("savings".into()),
                ..Command::new(CommandType::Account)
            }
        );
    }

    #[test]
    fn test_parse_transfer() {
        assert_eq!(
            parse_csv_row("transfer,,1,2,25.5,,,,").unwrap(),
            Command {
                account: Some(1),
                to: Some(2),
                amount: Some(dec!(25.5)),
                ..Command::new(CommandType::Transfer)
            }
        );
    }

    #[test]
    fn test_parse_close() {
        assert_eq!(
            parse_csv_row("close,,4,,,,,,").unwrap(),
            Command {
                account: Some(4),
                ..Command::new(CommandType::Close)
            }
        );
    }

    #[test]
    fn test_parse_invalid_amount_format() {
        let result = parse_csv_row("deposit,,1,,abc,,,,");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_invalid_command_type() {
        let result = parse_csv_row("chargeback,,1,,1.0,,,,");
        assert!(result.is_err());
    }

    #[test]
    fn test_account_id_overflow() {
        let result = parse_csv_row("deposit,,4294967296,,1.0,,,,"); // u32::MAX + 1
        assert!(result.is_err());
    }

    #[test]
    fn test_rounds_to_4_decimal_places() {
        assert_eq!(
            parse_csv_row("deposit,,1,,0.12345,,,,").unwrap().amount,
            Some(dec!(0.1234)) // Rounded down from 0.12345
        );
        assert_eq!(
            parse_csv_row("withdrawal,,1,,0.123499999,,,,").unwrap().amount,
            Some(dec!(0.1234))
        );
    }

    #[test]
    fn test_account_row_normalizes_balance() {
        let mut account = Account::new(2, "checking", dec!(150.00));
        account.id = Some(7);
        assert_eq!(
            AccountRow::from(account),
            AccountRow {
                account: 7,
                user: 2,
                kind: "checking".into(),
                balance: dec!(150),
            }
        );
    }
}
