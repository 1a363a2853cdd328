//! Order Lines & Items

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;

use crate::{
    adjustments::{Adjustment, AdjustmentType, sum_of_type},
    ids::{TaxCategoryUuid, TypedUuid},
};

/// Order line identity
pub type OrderLineUuid = TypedUuid<OrderLine<'static>>;

/// Order item identity
pub type OrderItemUuid = TypedUuid<OrderItem<'static>>;

/// A single unit of a product within an order line.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem<'a> {
    id: OrderItemUuid,
    unit_price: Money<'a, Currency>,
    adjustments: SmallVec<[Adjustment; 2]>,
}

impl<'a> OrderItem<'a> {
    /// Create an item with no adjustments.
    pub fn new(id: OrderItemUuid, unit_price: Money<'a, Currency>) -> Self {
        Self {
            id,
            unit_price,
            adjustments: SmallVec::new(),
        }
    }

    /// Item identity
    pub fn id(&self) -> OrderItemUuid {
        self.id
    }

    /// Net unit price before any adjustments
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Adjustments attached to this item, in attachment order
    pub fn adjustments(&self) -> &[Adjustment] {
        &self.adjustments
    }

    /// Attach an adjustment.
    pub fn add_adjustment(&mut self, adjustment: Adjustment) {
        self.adjustments.push(adjustment);
    }

    /// Remove all attached adjustments.
    pub fn clear_adjustments(&mut self) {
        self.adjustments.clear();
    }

    /// Unit price after promotion adjustments, in minor units.
    pub fn unit_price_with_promotions_minor(&self) -> i64 {
        self.unit_price
            .to_minor_units()
            .saturating_add(sum_of_type(&self.adjustments, AdjustmentType::Promotion))
    }

    /// Unit price after promotion adjustments.
    pub fn unit_price_with_promotions(&self) -> Money<'a, Currency> {
        Money::from_minor(
            self.unit_price_with_promotions_minor(),
            self.unit_price.currency(),
        )
    }

    /// Tax attached to this item, in minor units.
    pub fn tax_total_minor(&self) -> i64 {
        sum_of_type(&self.adjustments, AdjustmentType::Tax)
    }

    /// Unit price after promotions, plus tax.
    pub fn unit_price_with_tax(&self) -> Money<'a, Currency> {
        Money::from_minor(
            self.unit_price_with_promotions_minor()
                .saturating_add(self.tax_total_minor()),
            self.unit_price.currency(),
        )
    }
}

/// A product line in an order, holding one [`OrderItem`] per unit.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine<'a> {
    id: OrderLineUuid,
    tax_category: TaxCategoryUuid,
    items: Vec<OrderItem<'a>>,
}

impl<'a> OrderLine<'a> {
    /// Create a line of `quantity` identically priced items.
    pub fn new(
        id: OrderLineUuid,
        tax_category: TaxCategoryUuid,
        unit_price: Money<'a, Currency>,
        quantity: usize,
    ) -> Self {
        let items = (0..quantity)
            .map(|_| OrderItem::new(OrderItemUuid::new_v4(), unit_price))
            .collect();

        Self::with_items(id, tax_category, items)
    }

    /// Create a line from existing items.
    pub fn with_items(
        id: OrderLineUuid,
        tax_category: TaxCategoryUuid,
        items: Vec<OrderItem<'a>>,
    ) -> Self {
        Self {
            id,
            tax_category,
            items,
        }
    }

    /// Line identity
    pub fn id(&self) -> OrderLineUuid {
        self.id
    }

    /// Tax category of the line's product
    pub fn tax_category(&self) -> TaxCategoryUuid {
        self.tax_category
    }

    /// Items in this line
    pub fn items(&self) -> &[OrderItem<'a>] {
        &self.items
    }

    /// Items in this line, mutably.
    pub fn items_mut(&mut self) -> &mut [OrderItem<'a>] {
        &mut self.items
    }

    /// Number of units in the line
    pub fn quantity(&self) -> usize {
        self.items.len()
    }

    /// Sum of item prices after promotions, in minor units.
    pub fn total_price_minor(&self) -> i64 {
        self.items
            .iter()
            .map(OrderItem::unit_price_with_promotions_minor)
            .fold(0, i64::saturating_add)
    }

    /// Sum of item tax, in minor units.
    pub fn tax_total_minor(&self) -> i64 {
        self.items
            .iter()
            .map(OrderItem::tax_total_minor)
            .fold(0, i64::saturating_add)
    }
}
