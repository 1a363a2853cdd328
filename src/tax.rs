//! Tax Rates
//!
//! A [`TaxRate`] pairs a tax category and a zone with a percentage. It converts between gross
//! (tax-inclusive) and net prices in whole minor units, rounding each result half away from
//! zero. Rounding is not invertible: `gross_price_of(net_price_of(g))` may differ from `g` by
//! one minor unit.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    adjustments::{Adjustment, AdjustmentSource, AdjustmentType},
    amounts::round_to_minor,
    ids::{CustomerGroupUuid, TaxCategoryUuid, TypedUuid, ZoneUuid},
};

/// Tax rate identity
pub type TaxRateUuid = TypedUuid<TaxRate>;

/// Errors building a tax rate or computing tax.
#[derive(Debug, Error, PartialEq)]
pub enum TaxRateError {
    /// The configured value is below zero.
    #[error("tax rate {name} has negative value {value}")]
    NegativeRate {
        /// Rate name
        name: String,

        /// Configured value, in percentage points
        value: Decimal,
    },

    /// The calculation left the representable range.
    #[error("tax calculation overflowed for amount {0}")]
    Overflow(i64),
}

/// Persisted shape of a tax rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxRateInput {
    /// Tax rate identity
    pub id: TaxRateUuid,

    /// Rate name, used as the adjustment description
    pub name: String,

    /// Disabled rates must be filtered out before evaluation
    pub enabled: bool,

    /// Rate in percentage points (`20` means 20%)
    pub value: Decimal,

    /// Tax category the rate applies to
    pub category: TaxCategoryUuid,

    /// Zone the rate applies in
    pub zone: ZoneUuid,

    /// Optional customer group restriction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_group: Option<CustomerGroupUuid>,
}

/// A tax rate for one `(category, zone)` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxRate {
    id: TaxRateUuid,
    name: String,
    enabled: bool,
    value: Decimal,
    category: TaxCategoryUuid,
    zone: ZoneUuid,
    customer_group: Option<CustomerGroupUuid>,
}

impl TryFrom<TaxRateInput> for TaxRate {
    type Error = TaxRateError;

    fn try_from(input: TaxRateInput) -> Result<Self, Self::Error> {
        if input.value < Decimal::ZERO {
            return Err(TaxRateError::NegativeRate {
                name: input.name,
                value: input.value,
            });
        }

        Ok(Self {
            id: input.id,
            name: input.name,
            enabled: input.enabled,
            value: input.value,
            category: input.category,
            zone: input.zone,
            customer_group: input.customer_group,
        })
    }
}

impl TaxRate {
    /// Tax rate identity
    pub fn id(&self) -> TaxRateUuid {
        self.id
    }

    /// Rate name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the rate is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Rate in percentage points
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Tax category
    pub fn category(&self) -> TaxCategoryUuid {
        self.category
    }

    /// Zone
    pub fn zone(&self) -> ZoneUuid {
        self.zone
    }

    /// Customer group restriction, if any
    pub fn customer_group(&self) -> Option<CustomerGroupUuid> {
        self.customer_group
    }

    /// Return the persisted shape.
    pub fn to_input(&self) -> TaxRateInput {
        TaxRateInput {
            id: self.id,
            name: self.name.clone(),
            enabled: self.enabled,
            value: self.value,
            category: self.category,
            zone: self.zone,
            customer_group: self.customer_group,
        }
    }

    /// Tax component contained in a gross price.
    ///
    /// # Errors
    ///
    /// Returns [`TaxRateError::Overflow`] if the result does not fit in minor units.
    pub fn tax_component_of(&self, gross_price: i64) -> Result<i64, TaxRateError> {
        let gross = Decimal::from(gross_price);
        let hundred = Decimal::ONE_HUNDRED;

        let net = hundred
            .checked_add(self.value)
            .and_then(|divisor| gross.checked_mul(hundred)?.checked_div(divisor))
            .ok_or(TaxRateError::Overflow(gross_price))?;

        gross
            .checked_sub(net)
            .and_then(round_to_minor)
            .ok_or(TaxRateError::Overflow(gross_price))
    }

    /// Net price contained in a gross price.
    ///
    /// # Errors
    ///
    /// Returns [`TaxRateError::Overflow`] if the result does not fit in minor units.
    pub fn net_price_of(&self, gross_price: i64) -> Result<i64, TaxRateError> {
        gross_price
            .checked_sub(self.tax_component_of(gross_price)?)
            .ok_or(TaxRateError::Overflow(gross_price))
    }

    /// Tax payable on a net price.
    ///
    /// # Errors
    ///
    /// Returns [`TaxRateError::Overflow`] if the result does not fit in minor units.
    pub fn tax_payable_on(&self, net_price: i64) -> Result<i64, TaxRateError> {
        Decimal::from(net_price)
            .checked_mul(self.value)
            .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
            .and_then(round_to_minor)
            .ok_or(TaxRateError::Overflow(net_price))
    }

    /// Gross price for a net price.
    ///
    /// # Errors
    ///
    /// Returns [`TaxRateError::Overflow`] if the result does not fit in minor units.
    pub fn gross_price_of(&self, net_price: i64) -> Result<i64, TaxRateError> {
        net_price
            .checked_add(self.tax_payable_on(net_price)?)
            .ok_or(TaxRateError::Overflow(net_price))
    }

    /// Tax adjustment for a net price.
    ///
    /// A zero rate still produces an adjustment, with amount `0`.
    ///
    /// # Errors
    ///
    /// Returns [`TaxRateError::Overflow`] if the tax does not fit in minor units.
    pub fn apply(&self, price: i64) -> Result<Adjustment, TaxRateError> {
        Ok(Adjustment::new(
            AdjustmentType::Tax,
            self.tax_payable_on(price)?,
            self.name.clone(),
            self.source_id(),
        ))
    }

    /// Whether this rate is configured for the zone and tax category.
    pub fn test(&self, zone: ZoneUuid, category: TaxCategoryUuid) -> bool {
        self.category == category && self.zone == zone
    }
}

impl AdjustmentSource for TaxRate {
    fn source_uuid(&self) -> Uuid {
        self.id.into_uuid()
    }

    fn adjustment_type(&self) -> AdjustmentType {
        AdjustmentType::Tax
    }
}
