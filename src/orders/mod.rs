//! Orders
//!
//! The read-mostly order model adjustment sources are evaluated against. Orders own their
//! lines, lines own one item per unit, and adjustments are attached either to an item or to
//! the order as a whole (see [`AdjustmentTarget`]).

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    adjustments::{Adjustment, AdjustmentType, sum_of_type},
    ids::{ChannelUuid, CustomerGroupUuid, TypedUuid},
};

pub mod lines;

pub use lines::{OrderItem, OrderItemUuid, OrderLine, OrderLineUuid};

/// Order identity
pub type OrderUuid = TypedUuid<Order<'static>>;

/// Errors related to order construction or adjustment attachment.
#[derive(Debug, Error, PartialEq)]
pub enum OrderError {
    /// A line's item currency differs from the order currency (line index, item currency,
    /// order currency).
    #[error("Line {0} has currency {1}, but order has currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),

    /// An adjustment target does not exist in the order.
    #[error("Order item {line}/{item} not found")]
    ItemNotFound {
        /// Line index
        line: usize,
        /// Item index within the line
        item: usize,
    },
}

/// Where an adjustment is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdjustmentTarget {
    /// The order as a whole
    Order,

    /// A single item, addressed by line index and item index within that line
    OrderItem {
        /// Line index
        line: usize,
        /// Item index within the line
        item: usize,
    },
}

/// An order being priced.
#[derive(Debug, Clone, PartialEq)]
pub struct Order<'a> {
    id: OrderUuid,
    channel: ChannelUuid,
    customer_group: Option<CustomerGroupUuid>,
    currency: &'static Currency,
    lines: Vec<OrderLine<'a>>,
    adjustments: Vec<Adjustment>,
}

impl<'a> Order<'a> {
    /// Create an empty order in the given channel and currency.
    pub fn new(id: OrderUuid, channel: ChannelUuid, currency: &'static Currency) -> Self {
        Self {
            id,
            channel,
            customer_group: None,
            currency,
            lines: Vec::new(),
            adjustments: Vec::new(),
        }
    }

    /// Scope the order to a customer group.
    #[must_use]
    pub fn with_customer_group(mut self, customer_group: CustomerGroupUuid) -> Self {
        self.customer_group = Some(customer_group);
        self
    }

    /// Add a line to the order.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::CurrencyMismatch`] if any item in the line is priced in a
    /// different currency to the order.
    pub fn with_line(mut self, line: OrderLine<'a>) -> Result<Self, OrderError> {
        if let Some(item) = line
            .items()
            .iter()
            .find(|item| item.unit_price().currency() != self.currency)
        {
            return Err(OrderError::CurrencyMismatch(
                self.lines.len(),
                item.unit_price().currency().iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        self.lines.push(line);

        Ok(self)
    }

    /// Order identity
    pub fn id(&self) -> OrderUuid {
        self.id
    }

    /// Channel the order was placed in
    pub fn channel(&self) -> ChannelUuid {
        self.channel
    }

    /// Customer group of the order's customer, if any
    pub fn customer_group(&self) -> Option<CustomerGroupUuid> {
        self.customer_group
    }

    /// Order currency
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Order lines
    pub fn lines(&self) -> &[OrderLine<'a>] {
        &self.lines
    }

    /// Order-level adjustments, in attachment order
    pub fn adjustments(&self) -> &[Adjustment] {
        &self.adjustments
    }

    /// Iterate every item with its line and position.
    pub fn items(
        &self,
    ) -> impl Iterator<Item = (AdjustmentTarget, &OrderLine<'a>, &OrderItem<'a>)> {
        self.lines.iter().enumerate().flat_map(|(line_idx, line)| {
            line.items().iter().enumerate().map(move |(item_idx, item)| {
                let target = AdjustmentTarget::OrderItem {
                    line: line_idx,
                    item: item_idx,
                };

                (target, line, item)
            })
        })
    }

    /// Total number of items across all lines.
    pub fn item_count(&self) -> usize {
        self.lines.iter().map(OrderLine::quantity).sum()
    }

    /// Attach an adjustment to the order or to one of its items.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::ItemNotFound`] if the target item does not exist.
    pub fn attach(
        &mut self,
        target: AdjustmentTarget,
        adjustment: Adjustment,
    ) -> Result<(), OrderError> {
        match target {
            AdjustmentTarget::Order => self.adjustments.push(adjustment),
            AdjustmentTarget::OrderItem { line, item } => self
                .lines
                .get_mut(line)
                .and_then(|order_line| order_line.items_mut().get_mut(item))
                .ok_or(OrderError::ItemNotFound { line, item })?
                .add_adjustment(adjustment),
        }

        Ok(())
    }

    /// Remove every adjustment from the order and its items.
    pub fn clear_adjustments(&mut self) {
        self.adjustments.clear();

        for line in &mut self.lines {
            for item in line.items_mut() {
                item.clear_adjustments();
            }
        }
    }

    /// Sum of item prices after item-level promotions, in minor units.
    ///
    /// Totals saturate at the `i64` bounds rather than overflowing.
    pub fn sub_total_minor(&self) -> i64 {
        self.lines
            .iter()
            .map(OrderLine::total_price_minor)
            .fold(0, i64::saturating_add)
    }

    /// Sum of item prices after item-level promotions.
    pub fn sub_total(&self) -> Money<'a, Currency> {
        Money::from_minor(self.sub_total_minor(), self.currency)
    }

    /// Sub-total after order-level promotions, in minor units.
    pub fn total_minor(&self) -> i64 {
        self.sub_total_minor()
            .saturating_add(sum_of_type(&self.adjustments, AdjustmentType::Promotion))
    }

    /// Sub-total after order-level promotions.
    pub fn total(&self) -> Money<'a, Currency> {
        Money::from_minor(self.total_minor(), self.currency)
    }

    /// Promotion adjustments on items and on the order, in minor units.
    pub fn promotion_total_minor(&self) -> i64 {
        let items = self
            .items()
            .map(|(_, _, item)| sum_of_type(item.adjustments(), AdjustmentType::Promotion));

        items
            .fold(0, i64::saturating_add)
            .saturating_add(sum_of_type(&self.adjustments, AdjustmentType::Promotion))
    }

    /// Tax attached to all items, in minor units.
    pub fn tax_total_minor(&self) -> i64 {
        self.lines
            .iter()
            .map(OrderLine::tax_total_minor)
            .fold(0, i64::saturating_add)
    }

    /// Total including tax.
    pub fn total_with_tax(&self) -> Money<'a, Currency> {
        Money::from_minor(
            self.total_minor().saturating_add(self.tax_total_minor()),
            self.currency,
        )
    }
}
