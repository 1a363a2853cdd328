//! Adjustments
//!
//! An [`Adjustment`] is the immutable record produced when an [`AdjustmentSource`] (a
//! promotion or a tax rate) is applied to an order or order item.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Origin of an adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum AdjustmentType {
    /// Discount produced by a promotion.
    Promotion,

    /// Tax produced by a tax rate.
    Tax,

    /// Shipping charge.
    Shipping,
}

impl AdjustmentType {
    /// Return the canonical upper-case name used in source ids.
    pub const fn as_str(self) -> &'static str {
        match self {
            AdjustmentType::Promotion => "PROMOTION",
            AdjustmentType::Tax => "TAX",
            AdjustmentType::Shipping => "SHIPPING",
        }
    }
}

impl fmt::Display for AdjustmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors decoding a [`SourceId`].
#[derive(Debug, Error, PartialEq)]
pub enum SourceIdError {
    /// The value was not of the form `TYPE:uuid`.
    #[error("malformed source id: {0}")]
    Malformed(String),

    /// The type prefix is not a known adjustment type.
    #[error("unknown adjustment type: {0}")]
    UnknownType(String),

    /// The identity part is not a valid uuid.
    #[error("invalid source uuid: {0}")]
    InvalidUuid(String),
}

/// Stable reference from an adjustment back to the source that produced it.
///
/// Rendered as `TYPE:uuid`, e.g. `PROMOTION:67e55044-10b1-426f-9247-bb680e5fe0c8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId {
    adjustment_type: AdjustmentType,
    uuid: Uuid,
}

impl SourceId {
    /// Create a source id.
    pub const fn new(adjustment_type: AdjustmentType, uuid: Uuid) -> Self {
        Self {
            adjustment_type,
            uuid,
        }
    }

    /// Return the adjustment type of the source.
    pub const fn adjustment_type(&self) -> AdjustmentType {
        self.adjustment_type
    }

    /// Return the identity of the source.
    pub const fn uuid(&self) -> Uuid {
        self.uuid
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.adjustment_type, self.uuid)
    }
}

impl FromStr for SourceId {
    type Err = SourceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, uuid) = s
            .split_once(':')
            .ok_or_else(|| SourceIdError::Malformed(s.to_string()))?;

        let adjustment_type = match prefix {
            "PROMOTION" => AdjustmentType::Promotion,
            "TAX" => AdjustmentType::Tax,
            "SHIPPING" => AdjustmentType::Shipping,
            other => return Err(SourceIdError::UnknownType(other.to_string())),
        };

        let uuid =
            Uuid::parse_str(uuid).map_err(|_err| SourceIdError::InvalidUuid(uuid.to_string()))?;

        Ok(Self::new(adjustment_type, uuid))
    }
}

impl Serialize for SourceId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SourceId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;

        value.parse().map_err(serde::de::Error::custom)
    }
}

/// Common identity shared by promotions and tax rates.
pub trait AdjustmentSource {
    /// Persisted identity of the source.
    fn source_uuid(&self) -> Uuid;

    /// Kind of adjustment this source produces. Fixed per implementor.
    fn adjustment_type(&self) -> AdjustmentType;

    /// Reference usable as [`Adjustment::source`].
    fn source_id(&self) -> SourceId {
        SourceId::new(self.adjustment_type(), self.source_uuid())
    }
}

/// A monetary amount applied to an order or order item.
///
/// Negative amounts are discounts, positive amounts are charges such as tax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjustment {
    adjustment_type: AdjustmentType,
    amount: i64,
    description: String,
    source: SourceId,
}

impl Adjustment {
    /// Create an adjustment attributed to `source`.
    pub fn new(
        adjustment_type: AdjustmentType,
        amount: i64,
        description: impl Into<String>,
        source: SourceId,
    ) -> Self {
        Self {
            adjustment_type,
            amount,
            description: description.into(),
            source,
        }
    }

    /// Kind of adjustment
    pub const fn adjustment_type(&self) -> AdjustmentType {
        self.adjustment_type
    }

    /// Signed amount in minor units
    pub const fn amount(&self) -> i64 {
        self.amount
    }

    /// Human-readable label, usually the source name
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Source that produced this adjustment
    pub const fn source(&self) -> SourceId {
        self.source
    }
}

/// Sum the amounts of all adjustments of the given type, saturating at the `i64` bounds.
pub fn sum_of_type<'a>(
    adjustments: impl IntoIterator<Item = &'a Adjustment>,
    adjustment_type: AdjustmentType,
) -> i64 {
    adjustments
        .into_iter()
        .filter(|adjustment| adjustment.adjustment_type == adjustment_type)
        .map(Adjustment::amount)
        .fold(0, i64::saturating_add)
}
