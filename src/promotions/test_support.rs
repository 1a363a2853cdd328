use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use rust_decimal::Decimal;
use rusty_money::{Money, iso::GBP};

use crate::{
    ids::{ChannelUuid, TaxCategoryUuid},
    orders::{Order, OrderError, OrderItem, OrderLine, OrderLineUuid, OrderUuid},
    promotions::{
        actions::{PromotionItemAction, PromotionOrderAction},
        args::{ArgsError, ConfigArgs},
        conditions::PromotionCondition,
        operations::ConfigurableOperation,
    },
};

/// Condition with a fixed outcome that counts how often it is checked.
#[derive(Debug, Clone)]
pub(crate) struct FixedCondition {
    pub(crate) code: &'static str,
    pub(crate) outcome: bool,
    pub(crate) priority: i32,
    pub(crate) calls: Arc<AtomicUsize>,
}

impl FixedCondition {
    pub(crate) fn new(code: &'static str, outcome: bool) -> Self {
        Self {
            code,
            outcome,
            priority: 0,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ConfigurableOperation for FixedCondition {
    fn code(&self) -> &str {
        self.code
    }

    fn description(&self) -> &str {
        "fixed outcome"
    }

    fn priority_value(&self) -> i32 {
        self.priority
    }
}

impl PromotionCondition for FixedCondition {
    fn check(&self, _order: &Order<'_>, _args: &ConfigArgs) -> Result<bool, ArgsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        Ok(self.outcome)
    }
}

/// Item action returning the same raw amount for every item.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FixedItemAction {
    pub(crate) code: &'static str,
    pub(crate) amount: Decimal,
    pub(crate) priority: i32,
}

impl ConfigurableOperation for FixedItemAction {
    fn code(&self) -> &str {
        self.code
    }

    fn description(&self) -> &str {
        "fixed item amount"
    }

    fn priority_value(&self) -> i32 {
        self.priority
    }
}

impl PromotionItemAction for FixedItemAction {
    fn execute(
        &self,
        _item: &OrderItem<'_>,
        _line: &OrderLine<'_>,
        _args: &ConfigArgs,
    ) -> Result<Decimal, ArgsError> {
        Ok(self.amount)
    }
}

/// Order action returning a fixed raw amount.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FixedOrderAction {
    pub(crate) code: &'static str,
    pub(crate) amount: Decimal,
    pub(crate) priority: i32,
}

impl ConfigurableOperation for FixedOrderAction {
    fn code(&self) -> &str {
        self.code
    }

    fn description(&self) -> &str {
        "fixed order amount"
    }

    fn priority_value(&self) -> i32 {
        self.priority
    }
}

impl PromotionOrderAction for FixedOrderAction {
    fn execute(&self, _order: &Order<'_>, _args: &ConfigArgs) -> Result<Decimal, ArgsError> {
        Ok(self.amount)
    }
}

/// Build a GBP order with one line per `(unit price, quantity)` pair.
pub(crate) fn gbp_order(lines: &[(i64, usize)]) -> Result<Order<'static>, OrderError> {
    lines.iter().try_fold(
        Order::new(OrderUuid::new_v4(), ChannelUuid::new_v4(), GBP),
        |order, &(unit_minor, quantity)| {
            order.with_line(OrderLine::new(
                OrderLineUuid::new_v4(),
                TaxCategoryUuid::new_v4(),
                Money::from_minor(unit_minor, GBP),
                quantity,
            ))
        },
    )
}
