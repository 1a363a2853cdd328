//! Promotion Conditions
//!
//! Order-scoped predicates that decide whether a promotion applies.

use crate::{
    ids::CustomerGroupUuid,
    orders::Order,
    promotions::{
        args::{ArgsError, ConfigArgs},
        operations::ConfigurableOperation,
    },
};

/// An order-scoped eligibility predicate.
pub trait PromotionCondition: ConfigurableOperation {
    /// Check the condition against the order's current state.
    ///
    /// # Errors
    ///
    /// Returns an [`ArgsError`] if the stored arguments are missing or malformed.
    fn check(&self, order: &Order<'_>, args: &ConfigArgs) -> Result<bool, ArgsError>;
}

/// Order sub-total (after item promotions) is at least `amount` minor units.
///
/// Carries a higher priority value so that it is evaluated after item-level promotions
/// have reduced the sub-total.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinimumOrderAmount;

impl ConfigurableOperation for MinimumOrderAmount {
    fn code(&self) -> &str {
        "minimum_order_amount"
    }

    fn description(&self) -> &str {
        "If order sub-total is at least { amount }"
    }

    fn priority_value(&self) -> i32 {
        10
    }
}

impl PromotionCondition for MinimumOrderAmount {
    fn check(&self, order: &Order<'_>, args: &ConfigArgs) -> Result<bool, ArgsError> {
        let amount: i64 = args.parse("amount")?;

        Ok(order.sub_total_minor() >= amount)
    }
}

/// Order contains at least `quantity` items across all lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinimumItemQuantity;

impl ConfigurableOperation for MinimumItemQuantity {
    fn code(&self) -> &str {
        "minimum_item_quantity"
    }

    fn description(&self) -> &str {
        "If order contains at least { quantity } items"
    }
}

impl PromotionCondition for MinimumItemQuantity {
    fn check(&self, order: &Order<'_>, args: &ConfigArgs) -> Result<bool, ArgsError> {
        let quantity: usize = args.parse("quantity")?;

        Ok(order.item_count() >= quantity)
    }
}

/// Order's customer belongs to `group`.
#[derive(Debug, Clone, Copy, Default)]
pub struct InCustomerGroup;

impl ConfigurableOperation for InCustomerGroup {
    fn code(&self) -> &str {
        "customer_group"
    }

    fn description(&self) -> &str {
        "If customer belongs to group { group }"
    }
}

impl PromotionCondition for InCustomerGroup {
    fn check(&self, order: &Order<'_>, args: &ConfigArgs) -> Result<bool, ArgsError> {
        let group: CustomerGroupUuid = args.parse("group")?;

        Ok(order.customer_group() == Some(group))
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::GBP};
    use testresult::TestResult;

    use crate::{
        ids::{ChannelUuid, TaxCategoryUuid},
        orders::{OrderLine, OrderLineUuid, OrderUuid},
    };

    use super::*;

    fn order(unit_minor: i64, quantity: usize) -> TestResult<Order<'static>> {
        Ok(
            Order::new(OrderUuid::new_v4(), ChannelUuid::new_v4(), GBP).with_line(
                OrderLine::new(
                    OrderLineUuid::new_v4(),
                    TaxCategoryUuid::new_v4(),
                    Money::from_minor(unit_minor, GBP),
                    quantity,
                ),
            )?,
        )
    }

    #[test]
    fn minimum_order_amount_compares_sub_total() -> TestResult {
        let order = order(2500, 2)?;

        assert!(MinimumOrderAmount.check(&order, &ConfigArgs::new().with("amount", "5000"))?);
        assert!(!MinimumOrderAmount.check(&order, &ConfigArgs::new().with("amount", "5001"))?);
        assert_eq!(MinimumOrderAmount.priority_value(), 10);

        Ok(())
    }

    #[test]
    fn minimum_order_amount_requires_amount() -> TestResult {
        let order = order(2500, 2)?;

        assert_eq!(
            MinimumOrderAmount.check(&order, &ConfigArgs::new()),
            Err(ArgsError::Missing("amount".to_string()))
        );

        Ok(())
    }

    #[test]
    fn minimum_item_quantity_counts_items() -> TestResult {
        let order = order(100, 3)?;

        assert!(MinimumItemQuantity.check(&order, &ConfigArgs::new().with("quantity", "3"))?);
        assert!(!MinimumItemQuantity.check(&order, &ConfigArgs::new().with("quantity", "4"))?);

        Ok(())
    }

    #[test]
    fn customer_group_matches_order_group() -> TestResult {
        let group = CustomerGroupUuid::new_v4();
        let args = ConfigArgs::new().with("group", group.to_string());

        let anonymous = order(100, 1)?;
        let member = order(100, 1)?.with_customer_group(group);

        assert!(!InCustomerGroup.check(&anonymous, &args)?);
        assert!(InCustomerGroup.check(&member, &args)?);

        Ok(())
    }
}
