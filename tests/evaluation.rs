//! End-to-end evaluation of YAML-configured promotions and tax rates.

use std::path::PathBuf;

use adjustments::prelude::*;
use testresult::TestResult;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn evaluator(registry: &PromotionRegistry) -> TestResult<Evaluator> {
    let (promotions, tax_rates) =
        AdjustmentConfig::from_path(fixture("adjustments.yml"))?.build(registry)?;

    Ok(Evaluator::new(promotions, tax_rates))
}

fn order_fixture() -> TestResult<OrderFixture> {
    Ok(OrderFixture::from_path(fixture("order.yml"))?)
}

#[test]
fn promotions_run_in_priority_order() -> TestResult {
    let evaluator = evaluator(&PromotionRegistry::with_defaults())?;

    let names: Vec<&str> = evaluator.promotions().iter().map(Promotion::name).collect();

    assert_eq!(
        names,
        vec!["Half price everything", "Retired offer", "Spend 90, save 10"]
    );

    Ok(())
}

#[test]
fn evaluates_fixture_order() -> TestResult {
    let evaluator = evaluator(&PromotionRegistry::with_defaults())?;
    let fixture = order_fixture()?;
    let zone = fixture.zone;
    let mut order = fixture.into_order()?;

    let evaluation = evaluator.evaluate(&mut order, zone)?;

    let taxes = evaluation
        .iter()
        .filter(|applied| applied.adjustment.adjustment_type() == AdjustmentType::Tax)
        .count();

    assert_eq!(evaluation.len(), 6);
    assert_eq!(taxes, 3);

    // Half price takes the sub-total below the spend threshold.
    assert_eq!(order.sub_total_minor(), 6_999);
    assert_eq!(order.total_minor(), 6_999);
    assert!(order.adjustments().is_empty());

    // 20% of 60.00 twice, plus 5% of 19.99 rounded up.
    assert_eq!(order.tax_total_minor(), 2_500);
    assert_eq!(order.total_with_tax().to_minor_units(), 9_499);

    Ok(())
}

#[test]
fn customer_group_rate_replaces_standard_rate() -> TestResult {
    let evaluator = evaluator(&PromotionRegistry::with_defaults())?;
    let mut fixture = order_fixture()?;

    fixture.customer_group = Some("4c5d6e7f-8a9b-4c0d-9e1f-2a3b4c5d6e01".parse()?);

    let zone = fixture.zone;
    let mut order = fixture.into_order()?;

    let evaluation = evaluator.evaluate(&mut order, zone)?;

    let trade_rate_amounts: Vec<i64> = evaluation
        .iter()
        .filter(|applied| applied.adjustment.description() == "Trade rate")
        .map(|applied| applied.adjustment.amount())
        .collect();

    assert_eq!(trade_rate_amounts, vec![0, 0]);
    assert_eq!(order.tax_total_minor(), 100);

    Ok(())
}

#[test]
fn orders_outside_promotion_channels_are_only_taxed() -> TestResult {
    let evaluator = evaluator(&PromotionRegistry::with_defaults())?;
    let mut fixture = order_fixture()?;

    fixture.channel = ChannelUuid::new_v4();

    let zone = fixture.zone;
    let mut order = fixture.into_order()?;

    evaluator.evaluate(&mut order, zone)?;

    assert_eq!(order.sub_total_minor(), 13_999);
    assert_eq!(order.tax_total_minor(), 2_500);

    Ok(())
}

#[derive(Debug)]
struct LoyaltyTier;

impl ConfigurableOperation for LoyaltyTier {
    fn code(&self) -> &str {
        "loyalty_tier"
    }

    fn description(&self) -> &str {
        "If the customer is in loyalty tier { tier }"
    }
}

impl PromotionCondition for LoyaltyTier {
    fn check(&self, _order: &Order<'_>, args: &ConfigArgs) -> Result<bool, ArgsError> {
        let tier: String = args.parse("tier")?;

        Ok(tier == "gold")
    }
}

#[test]
fn custom_conditions_resolve_from_supplied_registry() -> TestResult {
    let registry = PromotionRegistry::with_defaults().with_condition(LoyaltyTier);
    let evaluator = evaluator(&registry)?;
    let fixture = order_fixture()?;
    let zone = fixture.zone;
    let mut order = fixture.into_order()?;

    evaluator.evaluate(&mut order, zone)?;

    let order_adjustments: Vec<(&str, i64)> = order
        .adjustments()
        .iter()
        .map(|adjustment| (adjustment.description(), adjustment.amount()))
        .collect();

    // 25% of 69.99, rounded half away from zero.
    assert_eq!(order_adjustments, vec![("Retired offer", -1_750)]);
    assert_eq!(order.total_minor(), 5_249);

    Ok(())
}

#[test]
fn unresolved_codes_are_reported() -> TestResult {
    let (promotions, _) = AdjustmentConfig::from_path(fixture("adjustments.yml"))?
        .build(&PromotionRegistry::with_defaults())?;

    let unresolved: Vec<&str> = promotions
        .iter()
        .flat_map(Promotion::unresolved_codes)
        .collect();

    assert_eq!(unresolved, vec!["loyalty_tier"]);

    Ok(())
}
