//! Configuration
//!
//! YAML loading for adjustment sources and sample orders.

use std::{fs, path::Path, str::FromStr};

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    amounts::ROUNDING,
    ids::{ChannelUuid, CustomerGroupUuid, TaxCategoryUuid, ZoneUuid},
    orders::{Order, OrderError, OrderLine, OrderLineUuid, OrderUuid},
    promotions::{Promotion, PromotionInput, registry::PromotionRegistry},
    tax::{TaxRate, TaxRateError, TaxRateInput},
};

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading a config file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// A line price is in a different currency to its order (line index, line currency,
    /// order currency).
    #[error("Line {0} is priced in {1}, but order is in {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),

    /// A tax rate failed validation
    #[error(transparent)]
    TaxRate(#[from] TaxRateError),

    /// The order could not be assembled
    #[error(transparent)]
    Order(#[from] OrderError),
}

/// Promotions and tax rates, in their persisted shapes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentConfig {
    /// Promotions
    #[serde(default)]
    pub promotions: Vec<PromotionInput>,

    /// Tax rates
    #[serde(default)]
    pub tax_rates: Vec<TaxRateInput>,
}

impl AdjustmentConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        fs::read_to_string(path)?.parse()
    }

    /// Resolve promotions against `registry` and validate tax rates.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TaxRate`] if any tax rate is invalid.
    pub fn build(
        self,
        registry: &PromotionRegistry,
    ) -> Result<(Vec<Promotion>, Vec<TaxRate>), ConfigError> {
        let promotions = self
            .promotions
            .into_iter()
            .map(|input| Promotion::new(input, registry))
            .collect();

        let tax_rates = self
            .tax_rates
            .into_iter()
            .map(TaxRate::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((promotions, tax_rates))
    }
}

impl FromStr for AdjustmentConfig {
    type Err = ConfigError;

    fn from_str(contents: &str) -> Result<Self, Self::Err> {
        Ok(serde_norway::from_str(contents)?)
    }
}

/// Order Fixture
#[derive(Debug, Clone, Deserialize)]
pub struct OrderFixture {
    /// Order identity, generated when absent
    #[serde(default)]
    pub id: Option<OrderUuid>,

    /// Channel the order was placed in
    pub channel: ChannelUuid,

    /// Customer group of the order's customer
    #[serde(default)]
    pub customer_group: Option<CustomerGroupUuid>,

    /// Zone used to select tax rates
    pub zone: ZoneUuid,

    /// Order currency (e.g. "GBP")
    pub currency: String,

    /// Order lines
    #[serde(default)]
    pub lines: Vec<OrderLineFixture>,
}

/// Order Line Fixture
#[derive(Debug, Clone, Deserialize)]
pub struct OrderLineFixture {
    /// Tax category of the product
    pub tax_category: TaxCategoryUuid,

    /// Unit price (e.g. "12.50 GBP")
    pub unit_price: String,

    /// Number of units
    pub quantity: usize,
}

impl OrderFixture {
    /// Load an order fixture from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;

        Ok(serde_norway::from_str(&contents)?)
    }

    /// Build the order.
    ///
    /// # Errors
    ///
    /// Returns an error if a price is malformed, a currency is unknown, or a line is priced
    /// in a different currency to the order.
    pub fn into_order(self) -> Result<Order<'static>, ConfigError> {
        let currency = find_currency(&self.currency)?;

        let mut order = Order::new(
            self.id.unwrap_or_else(OrderUuid::new_v4),
            self.channel,
            currency,
        );

        if let Some(group) = self.customer_group {
            order = order.with_customer_group(group);
        }

        for (idx, line) in self.lines.into_iter().enumerate() {
            let (minor_units, line_currency) = parse_price(&line.unit_price)?;

            if line_currency != currency {
                return Err(ConfigError::CurrencyMismatch(
                    idx,
                    line_currency.iso_alpha_code,
                    currency.iso_alpha_code,
                ));
            }

            order = order.with_line(OrderLine::new(
                OrderLineUuid::new_v4(),
                line.tax_category,
                Money::from_minor(minor_units, currency),
                line.quantity,
            ))?;
        }

        Ok(order)
    }
}

/// Parse a price string (e.g. "2.99 GBP") into minor units and currency.
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY", if the amount is
/// not a decimal, or if the currency code is not recognised.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), ConfigError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    let [amount, code] = parts.as_slice() else {
        return Err(ConfigError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| ConfigError::InvalidPrice(s.to_string()))?;

    let currency = find_currency(code)?;

    let minor_units = 10_i64
        .checked_pow(currency.exponent)
        .and_then(|scale| amount.checked_mul(Decimal::from(scale)))
        .and_then(|value| value.round_dp_with_strategy(0, ROUNDING).to_i64())
        .ok_or_else(|| ConfigError::InvalidPrice(s.to_string()))?;

    Ok((minor_units, currency))
}

fn find_currency(code: &str) -> Result<&'static Currency, ConfigError> {
    iso::find(code).ok_or_else(|| ConfigError::UnknownCurrency(code.to_string()))
}
