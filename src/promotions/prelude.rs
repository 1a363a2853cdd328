//! Promotion extension prelude.
//!
//! Use this when implementing custom conditions and actions.

pub use crate::promotions::{
    actions::{ActionScope, PromotionAction, PromotionItemAction, PromotionOrderAction},
    args::{ArgsError, ConfigArgs},
    conditions::PromotionCondition,
    operations::{AdjustmentOperation, ConfigurableOperation},
    registry::PromotionRegistry,
};
