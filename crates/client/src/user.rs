use tokio::sync::OnceCell;

use crate::{
    Account, AuthorizedClient, Pot, Price, ResultClient, price::REFERENCE_CURRENCY,
};

/// Every account and pot of the authorized user.
///
/// Collections are fetched on first access and kept until [`refresh`] is
/// called, even if the provider state changes meanwhile.
///
/// [`refresh`]: UserAggregate::refresh
#[derive(Debug)]
pub struct UserAggregate {
    client: AuthorizedClient,
    accounts: OnceCell<Vec<Account>>,
    pots: OnceCell<Vec<Pot>>,
    total_balance: OnceCell<Price>,
}

impl UserAggregate {
    pub fn new(client: &AuthorizedClient) -> Self {
        Self {
            client: client.clone(),
            accounts: OnceCell::new(),
            pots: OnceCell::new(),
            total_balance: OnceCell::new(),
        }
    }

    pub async fn get_accounts(&self) -> ResultClient<&[Account]> {
        let accounts = self
            .accounts
            .get_or_try_init(|| Account::list(&self.client))
            .await?;
        Ok(accounts.as_slice())
    }

    pub async fn get_pots(&self) -> ResultClient<&[Pot]> {
        let pots = self
            .pots
            .get_or_try_init(|| Pot::list(&self.client))
            .await?;
        Ok(pots.as_slice())
    }

    /// Sum of every account balance and every pot balance, in GBP.
    ///
    /// Fails with [`ClientError::CurrencyMismatch`] as soon as one balance is
    /// in another currency, and with the query error if any lookup fails; no
    /// partial total is kept in either case.
    ///
    /// [`ClientError::CurrencyMismatch`]: crate::ClientError::CurrencyMismatch
    pub async fn get_total_balance(&self) -> ResultClient<&Price> {
        self.total_balance
            .get_or_try_init(|| self.compute_total_balance())
            .await
    }

    /// Drops every memoized value; the next access fetches again.
    pub fn refresh(&mut self) {
        self.accounts = OnceCell::new();
        self.pots = OnceCell::new();
        self.total_balance = OnceCell::new();
    }

    async fn compute_total_balance(&self) -> ResultClient<Price> {
        let mut total = Price::zero(REFERENCE_CURRENCY);

        for account in self.get_accounts().await? {
            let balance = account.balance().await?;
            total = total.try_add(&balance).inspect_err(|err| {
                tracing::warn!(account_id = %account.id, "cannot add account balance: {err}");
            })?;
        }

        for pot in self.get_pots().await? {
            total = total.try_add(&pot.balance()).inspect_err(|err| {
                tracing::warn!(pot_id = %pot.id, "cannot add pot balance: {err}");
            })?;
        }

        Ok(total)
    }
}
