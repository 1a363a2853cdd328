//! Evaluation
//!
//! Runs a set of tax rates and promotions against an order. Taxes are attached first, then
//! promotions in ascending priority score, each tested against the order as left by the
//! promotions before it.

use std::slice;

use thiserror::Error;
use tracing::{Span, debug, info};

use crate::{
    adjustments::Adjustment,
    ids::{TaxCategoryUuid, ZoneUuid},
    orders::{AdjustmentTarget, Order, OrderError},
    promotions::Promotion,
    tax::{TaxRate, TaxRateError, TaxRateUuid},
};

/// Errors raised while evaluating an order.
#[derive(Debug, Error, PartialEq)]
pub enum EvaluationError {
    /// More than one tax rate matches a line at the same specificity.
    #[error("tax rates {first} and {second} both apply to category {category} in zone {zone}")]
    AmbiguousTaxRate {
        /// Line tax category
        category: TaxCategoryUuid,
        /// Order zone
        zone: ZoneUuid,
        /// First matching rate
        first: TaxRateUuid,
        /// Second matching rate
        second: TaxRateUuid,
    },

    /// Tax could not be computed.
    #[error(transparent)]
    TaxRate(#[from] TaxRateError),

    /// An adjustment could not be attached.
    #[error(transparent)]
    Order(#[from] OrderError),
}

/// An adjustment and where it was attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedAdjustment {
    /// Attachment target
    pub target: AdjustmentTarget,

    /// The attached adjustment
    pub adjustment: Adjustment,
}

/// Result of evaluating an order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evaluation {
    /// Adjustments in attachment order
    pub applied: Vec<AppliedAdjustment>,
}

impl Evaluation {
    /// Number of attached adjustments
    pub fn len(&self) -> usize {
        self.applied.len()
    }

    /// Whether nothing was attached
    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }

    /// Iterate the attached adjustments.
    pub fn iter(&self) -> slice::Iter<'_, AppliedAdjustment> {
        self.applied.iter()
    }

    fn record(
        &mut self,
        order: &mut Order<'_>,
        target: AdjustmentTarget,
        adjustment: Adjustment,
    ) -> Result<(), OrderError> {
        order.attach(target, adjustment.clone())?;

        self.applied.push(AppliedAdjustment { target, adjustment });

        Ok(())
    }
}

impl<'a> IntoIterator for &'a Evaluation {
    type Item = &'a AppliedAdjustment;
    type IntoIter = slice::Iter<'a, AppliedAdjustment>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Enabled sources, ready to evaluate orders.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    promotions: Vec<Promotion>,
    tax_rates: Vec<TaxRate>,
}

impl Evaluator {
    /// Keep the enabled sources and order promotions by ascending priority score.
    ///
    /// Promotions with equal scores keep their given order.
    pub fn new(
        promotions: impl IntoIterator<Item = Promotion>,
        tax_rates: impl IntoIterator<Item = TaxRate>,
    ) -> Self {
        let mut promotions: Vec<Promotion> = promotions
            .into_iter()
            .filter(Promotion::is_enabled)
            .collect();

        promotions.sort_by_key(Promotion::priority_score);

        let tax_rates = tax_rates.into_iter().filter(TaxRate::is_enabled).collect();

        Self {
            promotions,
            tax_rates,
        }
    }

    /// Enabled promotions, in evaluation order
    pub fn promotions(&self) -> &[Promotion] {
        &self.promotions
    }

    /// Enabled tax rates
    pub fn tax_rates(&self) -> &[TaxRate] {
        &self.tax_rates
    }

    /// Replace the order's adjustments with those of the configured sources.
    ///
    /// # Errors
    ///
    /// Returns an [`EvaluationError`] if a line matches more than one tax rate at the same
    /// specificity, or if tax overflows.
    #[tracing::instrument(
        name = "evaluation.evaluate",
        skip(self, order),
        fields(
            order_uuid = %order.id(),
            zone_uuid = %zone,
            applied_count = tracing::field::Empty
        ),
        err
    )]
    pub fn evaluate(
        &self,
        order: &mut Order<'_>,
        zone: ZoneUuid,
    ) -> Result<Evaluation, EvaluationError> {
        let mut evaluation = Evaluation::default();

        order.clear_adjustments();

        self.apply_taxes(order, zone, &mut evaluation)?;
        self.apply_promotions(order, &mut evaluation)?;

        Span::current().record("applied_count", evaluation.len());

        info!(
            sub_total = order.sub_total_minor(),
            total = order.total_minor(),
            tax_total = order.tax_total_minor(),
            "evaluated order"
        );

        Ok(evaluation)
    }

    /// Select the tax rate for a line.
    ///
    /// A rate scoped to the order's customer group beats an unscoped one. Rates scoped to
    /// another group never apply.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluationError::AmbiguousTaxRate`] if two rates match at the same level.
    pub fn select_tax_rate(
        &self,
        order: &Order<'_>,
        category: TaxCategoryUuid,
        zone: ZoneUuid,
    ) -> Result<Option<&TaxRate>, EvaluationError> {
        let candidates = self
            .tax_rates
            .iter()
            .filter(|tax_rate| tax_rate.test(zone, category));

        let mut scoped: Option<&TaxRate> = None;
        let mut unscoped: Option<&TaxRate> = None;

        for tax_rate in candidates {
            let slot = match tax_rate.customer_group() {
                None => &mut unscoped,
                Some(group) if Some(group) == order.customer_group() => &mut scoped,
                Some(_) => continue,
            };

            if let Some(existing) = slot {
                return Err(EvaluationError::AmbiguousTaxRate {
                    category,
                    zone,
                    first: existing.id(),
                    second: tax_rate.id(),
                });
            }

            *slot = Some(tax_rate);
        }

        Ok(scoped.or(unscoped))
    }

    fn apply_taxes(
        &self,
        order: &mut Order<'_>,
        zone: ZoneUuid,
        evaluation: &mut Evaluation,
    ) -> Result<(), EvaluationError> {
        let mut taxes = Vec::with_capacity(order.item_count());

        for (line_idx, line) in order.lines().iter().enumerate() {
            let Some(tax_rate) = self.select_tax_rate(order, line.tax_category(), zone)? else {
                debug!(
                    line = line_idx,
                    tax_category = %line.tax_category(),
                    "no tax rate for line; leaving untaxed"
                );

                continue;
            };

            for (item_idx, item) in line.items().iter().enumerate() {
                let target = AdjustmentTarget::OrderItem {
                    line: line_idx,
                    item: item_idx,
                };

                taxes.push((target, tax_rate.apply(item.unit_price().to_minor_units())?));
            }
        }

        for (target, adjustment) in taxes {
            evaluation.record(order, target, adjustment)?;
        }

        Ok(())
    }

    fn apply_promotions(
        &self,
        order: &mut Order<'_>,
        evaluation: &mut Evaluation,
    ) -> Result<(), EvaluationError> {
        for promotion in &self.promotions {
            if !promotion.is_in_channel(order.channel()) {
                debug!(promotion = %promotion.name(), "promotion not in order channel");

                continue;
            }

            if !promotion.test(order) {
                debug!(promotion = %promotion.name(), "promotion conditions not met");

                continue;
            }

            let item_adjustments: Vec<(AdjustmentTarget, Adjustment)> = order
                .items()
                .filter_map(|(target, line, item)| {
                    promotion
                        .apply_to_order_item(item, line)
                        .map(|adjustment| (target, adjustment))
                })
                .collect();

            for (target, adjustment) in item_adjustments {
                evaluation.record(order, target, adjustment)?;
            }

            if let Some(adjustment) = promotion.apply_to_order(order) {
                evaluation.record(order, AdjustmentTarget::Order, adjustment)?;
            }

            debug!(
                promotion = %promotion.name(),
                priority_score = promotion.priority_score(),
                total = order.total_minor(),
                "applied promotion"
            );
        }

        Ok(())
    }
}
