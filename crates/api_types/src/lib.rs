use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub mod account {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct AccountView {
        pub id: String,
        pub description: String,
        /// RFC3339 timestamp of the account opening.
        pub created: DateTime<Utc>,
        #[serde(default)]
        pub closed: bool,
    }

    /// Body of `GET accounts`.
    ///
    /// The list defaults to empty so the `{}` returned for an unauthorized
    /// client decodes as "no accounts".
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AccountsResponse {
        #[serde(default)]
        pub accounts: Vec<AccountView>,
    }
}

pub mod balance {
    use super::*;

    /// Body of `GET balance?account_id=<id>`. Amounts are minor units.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct BalanceResponse {
        pub balance: i64,
        #[serde(default)]
        pub total_balance: Option<i64>,
        pub currency: String,
        pub spend_today: i64,
    }
}

pub mod pot {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct PotView {
        pub id: String,
        pub name: String,
        pub style: String,
        /// Minor units.
        pub balance: i64,
        pub currency: String,
        pub created: DateTime<Utc>,
        pub updated: DateTime<Utc>,
        #[serde(default)]
        pub deleted: bool,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct PotsResponse {
        #[serde(default)]
        pub pots: Vec<PotView>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: String,
        /// Signed minor units; negative for spending.
        pub amount: i64,
        pub currency: String,
        pub account_balance: i64,
        pub created: DateTime<Utc>,
        pub description: String,
        /// Merchant id, expanded merchant object, or null. Kept opaque.
        #[serde(default)]
        pub merchant: serde_json::Value,
        #[serde(default)]
        pub notes: String,
        /// The provider sends either a boolean or the settlement timestamp
        /// (empty string while pending).
        #[serde(default, deserialize_with = "deserialize_settled")]
        pub settled: bool,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionsResponse {
        #[serde(default)]
        pub transactions: Vec<TransactionView>,
    }

    /// Body of `GET transactions/<id>`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionResponse {
        #[serde(default)]
        pub transaction: Option<TransactionView>,
    }

    fn deserialize_settled<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Settled {
            Flag(bool),
            Timestamp(String),
        }

        Ok(match Option::<Settled>::deserialize(deserializer)? {
            Some(Settled::Flag(flag)) => flag,
            Some(Settled::Timestamp(at)) => !at.trim().is_empty(),
            None => false,
        })
    }
}

pub mod oauth {
    use super::*;

    /// Successful body of the token endpoint.
    ///
    /// `expires_in` is kept as raw JSON: some deployments send it as a string.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TokenResponse {
        pub access_token: String,
        #[serde(default)]
        pub refresh_token: Option<String>,
        #[serde(default)]
        pub expires_in: Option<serde_json::Value>,
        #[serde(default)]
        pub token_type: Option<String>,
    }

    /// Provider error envelope, returned with HTTP 4xx/5xx.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ErrorResponse {
        pub code: String,
        #[serde(default)]
        pub message: String,
    }
}

#[cfg(test)]
mod tests {
    use super::transaction::{TransactionResponse, TransactionView, TransactionsResponse};
    use super::{account::AccountsResponse, pot::PotsResponse};

    fn transaction_json(settled: &str) -> String {
        format!(
            r#"{{
                "id": "tx_1",
                "amount": -510,
                "currency": "GBP",
                "account_balance": 13013,
                "created": "2015-08-22T12:20:18Z",
                "description": "THE DE BEAUVOIR DELI C LONDON GBR",
                "merchant": "merch_1",
                "notes": "Salmon sandwich",
                "settled": {settled}
            }}"#
        )
    }

    #[test]
    fn settled_accepts_flag_and_timestamp() {
        let tx: TransactionView = serde_json::from_str(&transaction_json("true")).unwrap();
        assert!(tx.settled);

        let tx: TransactionView =
            serde_json::from_str(&transaction_json("\"2015-08-23T12:20:18Z\"")).unwrap();
        assert!(tx.settled);

        let tx: TransactionView = serde_json::from_str(&transaction_json("\"\"")).unwrap();
        assert!(!tx.settled);

        let tx: TransactionView = serde_json::from_str(&transaction_json("null")).unwrap();
        assert!(!tx.settled);
    }

    #[test]
    fn merchant_stays_opaque() {
        let tx: TransactionView = serde_json::from_str(&transaction_json("true")).unwrap();
        assert_eq!(tx.merchant, serde_json::json!("merch_1"));
        assert_eq!(tx.amount, -510);
        assert_eq!(tx.created.to_rfc3339(), "2015-08-22T12:20:18+00:00");
    }

    #[test]
    fn empty_object_decodes_as_empty_listing() {
        let accounts: AccountsResponse = serde_json::from_str("{}").unwrap();
        assert!(accounts.accounts.is_empty());
        let pots: PotsResponse = serde_json::from_str("{}").unwrap();
        assert!(pots.pots.is_empty());
        let txs: TransactionsResponse = serde_json::from_str("{}").unwrap();
        assert!(txs.transactions.is_empty());
        let tx: TransactionResponse = serde_json::from_str("{}").unwrap();
        assert!(tx.transaction.is_none());
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let raw = r#"{"accounts": [{"id": "acc_1", "created": "2015-11-13T12:17:42Z"}]}"#;
        assert!(serde_json::from_str::<AccountsResponse>(raw).is_err());
    }
}
