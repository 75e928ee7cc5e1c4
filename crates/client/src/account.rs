//! Accounts and their lazily fetched balance and transactions.

use api_types::{
    account::{AccountView, AccountsResponse},
    balance::BalanceResponse,
    transaction::TransactionsResponse,
};
use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;

use crate::{AuthorizedClient, ClientError, Pot, Price, ResultClient, Transaction};

/// A Monzo account.
///
/// Identity fields are copied from the listing payload. Balance, spend today
/// and transactions are fetched on first access and then kept for the life
/// of this value; they are never refreshed. Concurrent first accesses share
/// one request.
#[derive(Debug)]
pub struct Account {
    client: AuthorizedClient,
    pub id: String,
    pub description: String,
    pub created: DateTime<Utc>,
    pub closed: bool,
    balance: OnceCell<BalanceResponse>,
    transactions: OnceCell<Vec<Transaction>>,
}

impl Account {
    /// Builds an account from an already fetched payload, without any
    /// network call.
    pub fn from_payload(client: &AuthorizedClient, payload: AccountView) -> Self {
        Self {
            client: client.clone(),
            id: payload.id,
            description: payload.description,
            created: payload.created,
            closed: payload.closed,
            balance: OnceCell::new(),
            transactions: OnceCell::new(),
        }
    }

    /// Looks `id` up in the full account listing (one query).
    pub async fn fetch(client: &AuthorizedClient, id: &str) -> ResultClient<Self> {
        let listing: AccountsResponse = client.query_as("accounts", &[]).await?;
        listing
            .accounts
            .into_iter()
            .find(|account| account.id == id)
            .map(|payload| Self::from_payload(client, payload))
            .ok_or_else(|| ClientError::not_found("account", id))
    }

    pub(crate) async fn list(client: &AuthorizedClient) -> ResultClient<Vec<Self>> {
        let listing: AccountsResponse = client.query_as("accounts", &[]).await?;
        Ok(listing
            .accounts
            .into_iter()
            .map(|payload| Self::from_payload(client, payload))
            .collect())
    }

    /// Current balance. Fetched once, shared with [`Account::spent_today`].
    pub async fn balance(&self) -> ResultClient<Price> {
        let snapshot = self.balance_snapshot().await?;
        Ok(Price::new(snapshot.balance, snapshot.currency.clone()))
    }

    /// Amount spent today, as reported with the balance.
    pub async fn spent_today(&self) -> ResultClient<Price> {
        let snapshot = self.balance_snapshot().await?;
        Ok(Price::new(snapshot.spend_today, snapshot.currency.clone()))
    }

    /// Transactions of the account, fetched once.
    pub async fn transactions(&self) -> ResultClient<&[Transaction]> {
        let transactions = self
            .transactions
            .get_or_try_init(|| self.fetch_transactions(false))
            .await?;
        Ok(transactions.as_slice())
    }

    /// Transactions with merchants expanded. Not cached.
    pub async fn transactions_expanded(&self) -> ResultClient<Vec<Transaction>> {
        self.fetch_transactions(true).await
    }

    /// Every pot visible to the authorized user. Not cached.
    pub async fn pots(&self) -> ResultClient<Vec<Pot>> {
        Pot::list(&self.client).await
    }

    async fn balance_snapshot(&self) -> ResultClient<&BalanceResponse> {
        self.balance
            .get_or_try_init(|| async {
                self.client
                    .query_as::<BalanceResponse>("balance", &[("account_id", self.id.as_str())])
                    .await
            })
            .await
    }

    async fn fetch_transactions(&self, expand_merchant: bool) -> ResultClient<Vec<Transaction>> {
        let mut options = vec![("account_id", self.id.as_str())];
        if expand_merchant {
            options.push(("expand[]", "merchant"));
        }
        let response: TransactionsResponse = self.client.query_as("transactions", &options).await?;
        Ok(response
            .transactions
            .into_iter()
            .map(Transaction::from_payload)
            .collect())
    }
}
