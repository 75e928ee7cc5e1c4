use api_types::transaction::{TransactionResponse, TransactionView};
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::{AuthorizedClient, ClientError, Price, ResultClient};

/// A single card payment, top up or transfer on an account.
#[derive(Clone, Debug, PartialEq)]
pub struct Transaction {
    pub id: String,
    /// Signed minor units; negative for spending.
    pub amount: i64,
    pub currency: String,
    /// Account balance right after this transaction, minor units.
    pub account_balance: i64,
    pub created: DateTime<Utc>,
    pub description: String,
    /// Provider merchant data: an id, an expanded object, or null.
    pub merchant: Value,
    pub notes: String,
    pub settled: bool,
}

impl Transaction {
    /// Builds a transaction from an already fetched payload, without any
    /// network call.
    pub fn from_payload(payload: TransactionView) -> Self {
        Self {
            id: payload.id,
            amount: payload.amount,
            currency: payload.currency,
            account_balance: payload.account_balance,
            created: payload.created,
            description: payload.description,
            merchant: payload.merchant,
            notes: payload.notes,
            settled: payload.settled,
        }
    }

    /// Fetches one transaction, with its merchant expanded.
    pub async fn fetch(client: &AuthorizedClient, id: &str) -> ResultClient<Self> {
        let path = format!("transactions/{id}");
        let response: TransactionResponse =
            client.query_as(&path, &[("expand[]", "merchant")]).await?;

        response
            .transaction
            .filter(|tx| tx.id == id)
            .map(Self::from_payload)
            .ok_or_else(|| ClientError::not_found("transaction", id))
    }

    pub fn amount(&self) -> Price {
        Price::new(self.amount, self.currency.clone())
    }

    pub fn account_balance(&self) -> Price {
        Price::new(self.account_balance, self.currency.clone())
    }

    /// Merchant name when the merchant was expanded.
    pub fn merchant_name(&self) -> Option<&str> {
        self.merchant.get("name").and_then(Value::as_str)
    }
}

impl From<TransactionView> for Transaction {
    fn from(payload: TransactionView) -> Self {
        Self::from_payload(payload)
    }
}
