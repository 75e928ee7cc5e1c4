use api_types::pot::{PotView, PotsResponse};
use chrono::{DateTime, Utc};

use crate::{AuthorizedClient, ClientError, Price, ResultClient};

/// A pot: money set aside from the current account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pot {
    pub id: String,
    pub name: String,
    pub style: String,
    /// Minor units, see [`Pot::balance`].
    pub balance: i64,
    pub currency: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub deleted: bool,
}

impl Pot {
    pub fn from_payload(payload: PotView) -> Self {
        Self {
            id: payload.id,
            name: payload.name,
            style: payload.style,
            balance: payload.balance,
            currency: payload.currency,
            created: payload.created,
            updated: payload.updated,
            deleted: payload.deleted,
        }
    }

    /// Looks `id` up in the full pot listing (one query).
    pub async fn fetch(client: &AuthorizedClient, id: &str) -> ResultClient<Self> {
        let listing: PotsResponse = client.query_as("pots", &[]).await?;
        listing
            .pots
            .into_iter()
            .find(|pot| pot.id == id)
            .map(Self::from_payload)
            .ok_or_else(|| ClientError::not_found("pot", id))
    }

    pub(crate) async fn list(client: &AuthorizedClient) -> ResultClient<Vec<Self>> {
        let listing: PotsResponse = client.query_as("pots", &[]).await?;
        Ok(listing.pots.into_iter().map(Self::from_payload).collect())
    }

    pub fn balance(&self) -> Price {
        Price::new(self.balance, self.currency.clone())
    }
}

impl From<PotView> for Pot {
    fn from(payload: PotView) -> Self {
        Self::from_payload(payload)
    }
}
