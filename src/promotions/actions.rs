//! Promotion Actions
//!
//! Effects that compute a raw (unrounded) discount amount, either for a single order item or
//! for the order as a whole. The scope is fixed when an action is registered, via
//! [`PromotionAction`].

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::{
    amounts::percent_of,
    orders::{Order, OrderItem, OrderLine},
    promotions::{
        args::{ArgsError, ConfigArgs},
        operations::ConfigurableOperation,
    },
};

/// An item-scoped effect.
pub trait PromotionItemAction: ConfigurableOperation {
    /// Compute the raw amount for one item. Discounts are negative.
    ///
    /// # Errors
    ///
    /// Returns an [`ArgsError`] if the stored arguments are missing or malformed.
    fn execute(
        &self,
        item: &OrderItem<'_>,
        line: &OrderLine<'_>,
        args: &ConfigArgs,
    ) -> Result<Decimal, ArgsError>;
}

/// An order-scoped effect.
pub trait PromotionOrderAction: ConfigurableOperation {
    /// Compute the raw amount for the order. Discounts are negative.
    ///
    /// # Errors
    ///
    /// Returns an [`ArgsError`] if the stored arguments are missing or malformed.
    fn execute(&self, order: &Order<'_>, args: &ConfigArgs) -> Result<Decimal, ArgsError>;
}

/// Which call shape an action responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionScope {
    /// Applied per order item
    Item,

    /// Applied once per order
    Order,
}

/// A registered action, tagged with its scope.
#[derive(Debug, Clone)]
pub enum PromotionAction {
    /// Item-scoped action
    Item(Arc<dyn PromotionItemAction>),

    /// Order-scoped action
    Order(Arc<dyn PromotionOrderAction>),
}

impl PromotionAction {
    /// Wrap an item-scoped action.
    pub fn item<A: PromotionItemAction + 'static>(action: A) -> Self {
        PromotionAction::Item(Arc::new(action))
    }

    /// Wrap an order-scoped action.
    pub fn order<A: PromotionOrderAction + 'static>(action: A) -> Self {
        PromotionAction::Order(Arc::new(action))
    }

    /// Return the scope tag.
    pub fn scope(&self) -> ActionScope {
        match self {
            PromotionAction::Item(_) => ActionScope::Item,
            PromotionAction::Order(_) => ActionScope::Order,
        }
    }

    /// Return the registered code.
    pub fn code(&self) -> &str {
        match self {
            PromotionAction::Item(action) => action.code(),
            PromotionAction::Order(action) => action.code(),
        }
    }

    /// Return the priority value.
    pub fn priority_value(&self) -> i32 {
        match self {
            PromotionAction::Item(action) => action.priority_value(),
            PromotionAction::Order(action) => action.priority_value(),
        }
    }
}

/// Discount the order by a percentage (`discount`, a fraction in `[0, 1]`) of its current total.
///
/// The current total includes order-level promotions already attached, floored at zero, so
/// stacked order discounts never take the order below zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderPercentageDiscount;

impl ConfigurableOperation for OrderPercentageDiscount {
    fn code(&self) -> &str {
        "order_percentage_discount"
    }

    fn description(&self) -> &str {
        "Discount order by { discount }"
    }

    fn priority_value(&self) -> i32 {
        20
    }
}

impl PromotionOrderAction for OrderPercentageDiscount {
    fn execute(&self, order: &Order<'_>, args: &ConfigArgs) -> Result<Decimal, ArgsError> {
        discount_percent_of(args, order.total_minor().max(0))
    }
}

/// Take a fixed, non-negative `amount` off the order, never more than its current total.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderFixedDiscount;

impl ConfigurableOperation for OrderFixedDiscount {
    fn code(&self) -> &str {
        "order_fixed_discount"
    }

    fn description(&self) -> &str {
        "Discount order by fixed amount { amount }"
    }

    fn priority_value(&self) -> i32 {
        20
    }
}

impl PromotionOrderAction for OrderFixedDiscount {
    fn execute(&self, order: &Order<'_>, args: &ConfigArgs) -> Result<Decimal, ArgsError> {
        discount_fixed_amount(args, order.total_minor())
    }
}

/// Discount each item by a percentage (`discount`, a fraction in `[0, 1]`) of its promoted price.
#[derive(Debug, Clone, Copy, Default)]
pub struct ItemPercentageDiscount;

impl ConfigurableOperation for ItemPercentageDiscount {
    fn code(&self) -> &str {
        "item_percentage_discount"
    }

    fn description(&self) -> &str {
        "Discount every item by { discount }"
    }
}

impl PromotionItemAction for ItemPercentageDiscount {
    fn execute(
        &self,
        item: &OrderItem<'_>,
        _line: &OrderLine<'_>,
        args: &ConfigArgs,
    ) -> Result<Decimal, ArgsError> {
        discount_percent_of(args, item.unit_price_with_promotions_minor())
    }
}

/// Take a fixed, non-negative `amount` off each item, never more than its promoted price.
#[derive(Debug, Clone, Copy, Default)]
pub struct ItemFixedDiscount;

impl ConfigurableOperation for ItemFixedDiscount {
    fn code(&self) -> &str {
        "item_fixed_discount"
    }

    fn description(&self) -> &str {
        "Discount every item by fixed amount { amount }"
    }
}

impl PromotionItemAction for ItemFixedDiscount {
    fn execute(
        &self,
        item: &OrderItem<'_>,
        _line: &OrderLine<'_>,
        args: &ConfigArgs,
    ) -> Result<Decimal, ArgsError> {
        discount_fixed_amount(args, item.unit_price_with_promotions_minor())
    }
}

fn out_of_range(args: &ConfigArgs, name: &str) -> ArgsError {
    ArgsError::Invalid {
        name: name.to_string(),
        value: args.get(name).unwrap_or_default().to_string(),
    }
}

fn discount_percent_of(args: &ConfigArgs, minor: i64) -> Result<Decimal, ArgsError> {
    let discount = args.percentage("discount")?;
    let fraction = discount * Decimal::ONE;

    if fraction < Decimal::ZERO || fraction > Decimal::ONE {
        return Err(out_of_range(args, "discount"));
    }

    percent_of(&discount, minor)
        .map(|amount| -amount)
        .ok_or_else(|| out_of_range(args, "discount"))
}

fn discount_fixed_amount(args: &ConfigArgs, ceiling_minor: i64) -> Result<Decimal, ArgsError> {
    let amount: i64 = args.parse("amount")?;

    if amount < 0 {
        return Err(out_of_range(args, "amount"));
    }

    Ok(-Decimal::from(amount.min(ceiling_minor.max(0))))
}
