//! Report
//!
//! Plain-text rendering of an evaluated order.

use std::io;

use rusty_money::{Money, iso::Currency};
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    evaluation::{AppliedAdjustment, Evaluation},
    orders::{AdjustmentTarget, Order},
};

/// Errors that can occur while writing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Writing to the output failed
    #[error("Failed to write report: {0}")]
    Io(#[from] io::Error),
}

/// Write a table of applied adjustments followed by the order totals.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub fn write_report(
    mut out: impl io::Write,
    order: &Order<'_>,
    evaluation: &Evaluation,
) -> Result<(), ReportError> {
    let mut builder = Builder::default();

    builder.push_record(["Target", "Type", "Description", "Amount"]);

    for applied in evaluation {
        builder.push_record(adjustment_row(order, applied));
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(3..4), Alignment::right());

    writeln!(out, "\n{table}")?;

    let currency = order.currency();

    writeln!(out, " Subtotal:  {}", order.sub_total())?;
    writeln!(out, " Discounts: {}", money(order.promotion_total_minor(), currency))?;
    writeln!(out, " Tax:       {}", money(order.tax_total_minor(), currency))?;
    writeln!(out, " \x1b[1mTotal:     {}\x1b[0m", order.total_with_tax())?;
    writeln!(out)?;

    Ok(())
}

fn adjustment_row(order: &Order<'_>, applied: &AppliedAdjustment) -> [String; 4] {
    let target = match applied.target {
        AdjustmentTarget::Order => "Order".to_string(),
        AdjustmentTarget::OrderItem { line, item } => {
            format!("Line {} item {}", line + 1, item + 1)
        }
    };

    [
        target,
        applied.adjustment.adjustment_type().to_string(),
        applied.adjustment.description().to_string(),
        money(applied.adjustment.amount(), order.currency()).to_string(),
    ]
}

fn money(minor: i64, currency: &Currency) -> Money<'_, Currency> {
    Money::from_minor(minor, currency)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::{
        evaluation::Evaluator,
        ids::ZoneUuid,
        promotions::{
            Promotion, PromotionInput, PromotionUuid, args::ConfigArgs,
            operations::AdjustmentOperation, registry::PromotionRegistry, test_support::gbp_order,
        },
        tax::{TaxRate, TaxRateInput, TaxRateUuid},
    };

    use super::*;

    #[test]
    fn report_lists_adjustments_and_totals() -> TestResult {
        let zone = ZoneUuid::new_v4();
        let mut order = gbp_order(&[(1_000, 2)])?;
        let category = order
            .lines()
            .first()
            .map(|line| line.tax_category())
            .ok_or("missing line")?;

        let promotion = Promotion::new(
            PromotionInput {
                id: PromotionUuid::new_v4(),
                name: "Five off".to_string(),
                enabled: true,
                channels: vec![order.channel()],
                conditions: vec![],
                actions: vec![AdjustmentOperation::new(
                    "order_fixed_discount",
                    ConfigArgs::new().with("amount", "500"),
                )],
                priority_score: None,
            },
            &PromotionRegistry::with_defaults(),
        );

        let tax_rate = TaxRate::try_from(TaxRateInput {
            id: TaxRateUuid::new_v4(),
            name: "VAT".to_string(),
            enabled: true,
            value: Decimal::from(20),
            category,
            zone,
            customer_group: None,
        })?;

        let evaluation = Evaluator::new([promotion], [tax_rate]).evaluate(&mut order, zone)?;

        let mut out = Vec::new();

        write_report(&mut out, &order, &evaluation)?;

        let report = String::from_utf8(out)?;

        assert!(report.contains("Line 1 item 2"));
        assert!(report.contains("Five off"));
        assert!(report.contains("PROMOTION"));
        assert!(report.contains("£20.00"));
        assert!(report.contains("£4.00"));
        assert!(report.contains("£19.00"));

        Ok(())
    }
}
