use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ClientError;

/// Currency every total balance starts from.
pub const REFERENCE_CURRENCY: &str = "GBP";

/// Immutable monetary value in **minor units** (pence, cents) of a currency.
///
/// Prices only add up within the same currency; there is no conversion.
///
/// # Examples
///
/// ```rust
/// use monzo_oauth::Price;
///
/// let a = Price::new(100, "GBP");
/// let b = Price::new(50, "GBP");
/// assert_eq!(a.add(&b), Some(Price::new(150, "GBP")));
/// assert_eq!(a.add(&Price::new(50, "USD")), None);
/// assert_eq!(Price::new(-1050, "GBP").to_string(), "-10.50 GBP");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Price {
    amount: i64,
    currency_code: String,
}

impl Price {
    #[must_use]
    pub fn new(amount: i64, currency_code: impl Into<String>) -> Self {
        Self {
            amount,
            currency_code: currency_code.into(),
        }
    }

    #[must_use]
    pub fn zero(currency_code: impl Into<String>) -> Self {
        Self::new(0, currency_code)
    }

    /// Returns the raw value in minor units.
    #[must_use]
    pub const fn amount(&self) -> i64 {
        self.amount
    }

    #[must_use]
    pub fn currency_code(&self) -> &str {
        &self.currency_code
    }

    /// Sums two prices of the same currency.
    ///
    /// Returns `None` when the currency codes differ (byte comparison) or the
    /// sum overflows.
    #[must_use]
    pub fn add(&self, other: &Price) -> Option<Price> {
        if self.currency_code != other.currency_code {
            return None;
        }
        self.amount
            .checked_add(other.amount)
            .map(|amount| Price::new(amount, self.currency_code.clone()))
    }

    /// Like [`Price::add`], but names the failure.
    pub fn try_add(&self, other: &Price) -> Result<Price, ClientError> {
        if self.currency_code != other.currency_code {
            return Err(ClientError::CurrencyMismatch(format!(
                "cannot add {} to {}",
                other.currency_code, self.currency_code
            )));
        }
        self.add(other)
            .ok_or_else(|| ClientError::CurrencyMismatch("amount too large".to_string()))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.amount < 0 { "-" } else { "" };
        let abs = self.amount.unsigned_abs();
        let major = abs / 100;
        let minor = abs % 100;
        write!(f, "{sign}{major}.{minor:02} {}", self.currency_code)
    }
}
