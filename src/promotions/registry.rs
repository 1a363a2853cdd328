//! Promotion Registry
//!
//! Maps condition and action codes to their implementations. A registry is built once from
//! configuration and passed explicitly to [`Promotion::new`](crate::promotions::Promotion::new).

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::promotions::{
    actions::{
        ItemFixedDiscount, ItemPercentageDiscount, OrderFixedDiscount, OrderPercentageDiscount,
        PromotionAction, PromotionItemAction, PromotionOrderAction,
    },
    conditions::{InCustomerGroup, MinimumItemQuantity, MinimumOrderAmount, PromotionCondition},
};

/// Registered conditions and actions, keyed by code.
#[derive(Debug, Clone, Default)]
pub struct PromotionRegistry {
    conditions: FxHashMap<String, Arc<dyn PromotionCondition>>,
    actions: FxHashMap<String, PromotionAction>,
}

impl PromotionRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in condition and action.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new()
            .with_condition(MinimumOrderAmount)
            .with_condition(MinimumItemQuantity)
            .with_condition(InCustomerGroup)
            .with_order_action(OrderPercentageDiscount)
            .with_order_action(OrderFixedDiscount)
            .with_item_action(ItemPercentageDiscount)
            .with_item_action(ItemFixedDiscount)
    }

    /// Register a condition, replacing any existing condition with the same code.
    #[must_use]
    pub fn with_condition<C: PromotionCondition + 'static>(mut self, condition: C) -> Self {
        self.conditions
            .insert(condition.code().to_string(), Arc::new(condition));

        self
    }

    /// Register an item-scoped action, replacing any existing action with the same code.
    #[must_use]
    pub fn with_item_action<A: PromotionItemAction + 'static>(self, action: A) -> Self {
        self.with_action(PromotionAction::item(action))
    }

    /// Register an order-scoped action, replacing any existing action with the same code.
    #[must_use]
    pub fn with_order_action<A: PromotionOrderAction + 'static>(self, action: A) -> Self {
        self.with_action(PromotionAction::order(action))
    }

    /// Register an already-wrapped action.
    #[must_use]
    pub fn with_action(mut self, action: PromotionAction) -> Self {
        self.actions.insert(action.code().to_string(), action);

        self
    }

    /// Look up a condition by code.
    pub fn condition(&self, code: &str) -> Option<&Arc<dyn PromotionCondition>> {
        self.conditions.get(code)
    }

    /// Look up an action by code.
    pub fn action(&self, code: &str) -> Option<&PromotionAction> {
        self.actions.get(code)
    }

    /// Registered condition codes, sorted.
    pub fn condition_codes(&self) -> Vec<&str> {
        sorted_codes(self.conditions.keys())
    }

    /// Registered action codes, sorted.
    pub fn action_codes(&self) -> Vec<&str> {
        sorted_codes(self.actions.keys())
    }
}

fn sorted_codes<'a>(codes: impl Iterator<Item = &'a String>) -> Vec<&'a str> {
    let mut codes: Vec<&str> = codes.map(String::as_str).collect();

    codes.sort_unstable();

    codes
}

#[cfg(test)]
mod tests {
    use crate::{
        orders::Order,
        promotions::{
            actions::ActionScope,
            args::{ArgsError, ConfigArgs},
            operations::ConfigurableOperation,
        },
    };

    use super::*;

    #[test]
    fn defaults_register_builtin_codes() {
        let registry = PromotionRegistry::with_defaults();

        assert_eq!(
            registry.condition_codes(),
            vec![
                "customer_group",
                "minimum_item_quantity",
                "minimum_order_amount"
            ]
        );
        assert_eq!(
            registry.action_codes(),
            vec![
                "item_fixed_discount",
                "item_percentage_discount",
                "order_fixed_discount",
                "order_percentage_discount"
            ]
        );
    }

    #[test]
    fn lookups_resolve_by_code() {
        let registry = PromotionRegistry::with_defaults();

        assert!(
            registry
                .condition("minimum_order_amount")
                .is_some_and(|condition| condition.priority_value() == 10)
        );
        assert!(
            registry
                .action("item_fixed_discount")
                .is_some_and(|action| action.scope() == ActionScope::Item)
        );
        assert!(registry.condition("unknown").is_none());
        assert!(registry.action("unknown").is_none());
    }

    #[derive(Debug)]
    struct StricterMinimum;

    impl ConfigurableOperation for StricterMinimum {
        fn code(&self) -> &str {
            "minimum_order_amount"
        }

        fn description(&self) -> &str {
            "Replacement minimum"
        }

        fn priority_value(&self) -> i32 {
            50
        }
    }

    impl PromotionCondition for StricterMinimum {
        fn check(&self, _order: &Order<'_>, _args: &ConfigArgs) -> Result<bool, ArgsError> {
            Ok(false)
        }
    }

    #[test]
    fn later_registration_replaces_code() {
        let registry = PromotionRegistry::with_defaults().with_condition(StricterMinimum);

        assert_eq!(registry.condition_codes().len(), 3);
        assert!(
            registry
                .condition("minimum_order_amount")
                .is_some_and(|condition| condition.priority_value() == 50)
        );
    }
}
