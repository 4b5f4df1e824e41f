//! Inputs the provider flows are called with.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An amount in the currency's minor unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Money {
    amount: u64,
    currency: String,
}

impl Money {
    #[must_use]
    pub fn new(amount: u64, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into().to_uppercase(),
        }
    }

    #[must_use]
    pub fn amount(&self) -> u64 {
        self.amount
    }

    #[must_use]
    pub fn currency(&self) -> &str {
        &self.currency
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Card {
    pub number: String,
    pub month: u8,
    pub year: u16,
    pub verification_value: String,
    pub name: String,
}

impl Card {
    /// Expiry as `YYMM`.
    #[must_use]
    pub fn expiry(&self) -> String {
        format!("{:02}{:02}", self.year % 100, self.month)
    }

    #[must_use]
    pub fn last_four(&self) -> &str {
        let start = self.number.len().saturating_sub(4);
        self.number.get(start..).unwrap_or_default()
    }
}

impl fmt::Debug for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Card")
            .field("number", &format_args!("****{}", self.last_four()))
            .field("month", &self.month)
            .field("year", &self.year)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub name: Option<String>,
    pub company: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
}

/// How a payment method is presented to a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentInput {
    /// A handle to an instrument the provider already stores.
    ExistingHandle(String),
    NewInstrument(Card),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerDetails {
    pub email: Option<String>,
    pub organization: Option<String>,
    pub phone: Option<String>,
    pub billing_address: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomerRef {
    Existing(String),
    New(CustomerDetails),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderDetails {
    pub order_id: String,
    pub billing_address: Option<Address>,
    pub shipping_address: Option<Address>,
}

impl OrderDetails {
    #[must_use]
    pub fn new(order_id: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
            ..Self::default()
        }
    }
}

/// A recurring agreement a card is stored against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    /// Amount authorized on the card when the subscription is stored.
    pub money: Money,
    pub order_id: String,
    pub description: String,
}
