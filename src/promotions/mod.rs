//! Promotions
//!
//! A [`Promotion`] is an adjustment source built from stored condition and action
//! references. Codes are resolved once, at construction, against an explicitly supplied
//! [`PromotionRegistry`]; evaluation never consults any other registry.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    adjustments::{Adjustment, AdjustmentSource, AdjustmentType},
    amounts::round_to_minor,
    ids::{ChannelUuid, TypedUuid},
    orders::{Order, OrderItem, OrderLine},
    promotions::{
        actions::PromotionAction,
        args::ArgsError,
        conditions::PromotionCondition,
        operations::AdjustmentOperation,
        registry::PromotionRegistry,
    },
};

pub mod actions;
pub mod args;
pub mod conditions;
pub mod operations;
pub mod prelude;
pub mod registry;

#[cfg(test)]
pub(crate) mod test_support;

/// Promotion identity
pub type PromotionUuid = TypedUuid<Promotion>;

/// Persisted shape of a promotion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromotionInput {
    /// Promotion identity
    pub id: PromotionUuid,

    /// Promotion name, used as the adjustment description
    pub name: String,

    /// Disabled promotions must be filtered out before evaluation
    pub enabled: bool,

    /// Channels the promotion is visible in
    #[serde(default)]
    pub channels: Vec<ChannelUuid>,

    /// Conditions, checked in order
    #[serde(default)]
    pub conditions: Vec<AdjustmentOperation>,

    /// Actions, applied in order
    #[serde(default)]
    pub actions: Vec<AdjustmentOperation>,

    /// Previously computed priority score. Always recomputed on construction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_score: Option<i32>,
}

/// A stored condition reference and its implementation, if the code resolved.
#[derive(Debug, Clone)]
struct ResolvedCondition {
    operation: AdjustmentOperation,
    implementation: Option<Arc<dyn PromotionCondition>>,
}

impl ResolvedCondition {
    fn check(&self, promotion: &str, order: &Order<'_>) -> bool {
        let Some(condition) = &self.implementation else {
            debug!(
                promotion,
                code = %self.operation.code,
                "condition code not registered; treating as failed"
            );

            return false;
        };

        match condition.check(order, &self.operation.args) {
            Ok(passed) => passed,
            Err(error) => {
                warn!(
                    promotion,
                    code = %self.operation.code,
                    %error,
                    "condition arguments invalid; treating as failed"
                );

                false
            }
        }
    }
}

/// A stored action reference and its implementation, if the code resolved.
#[derive(Debug, Clone)]
struct ResolvedAction {
    operation: AdjustmentOperation,
    implementation: Option<PromotionAction>,
}

impl ResolvedAction {
    /// Round one action's raw result to minor units. Failures contribute nothing.
    fn contribution(&self, promotion: &str, result: Result<Decimal, ArgsError>) -> i64 {
        match result {
            Ok(raw) => round_to_minor(raw).unwrap_or_else(|| {
                warn!(
                    promotion,
                    code = %self.operation.code,
                    %raw,
                    "action result does not fit in minor units; skipping"
                );

                0
            }),
            Err(error) => {
                warn!(
                    promotion,
                    code = %self.operation.code,
                    %error,
                    "action arguments invalid; skipping"
                );

                0
            }
        }
    }
}

/// A promotion rule: ordered conditions gating ordered actions.
#[derive(Debug, Clone)]
pub struct Promotion {
    id: PromotionUuid,
    name: String,
    enabled: bool,
    channels: SmallVec<[ChannelUuid; 2]>,
    conditions: SmallVec<[ResolvedCondition; 2]>,
    actions: SmallVec<[ResolvedAction; 2]>,
    priority_score: i32,
}

impl Promotion {
    /// Build a promotion, resolving its condition and action codes against `registry`.
    ///
    /// Codes that do not resolve are kept as stored data; they fail (conditions) or are
    /// skipped (actions) at evaluation time.
    pub fn new(input: PromotionInput, registry: &PromotionRegistry) -> Self {
        let conditions: SmallVec<[ResolvedCondition; 2]> = input
            .conditions
            .into_iter()
            .map(|operation| ResolvedCondition {
                implementation: registry.condition(&operation.code).cloned(),
                operation,
            })
            .collect();

        let actions: SmallVec<[ResolvedAction; 2]> = input
            .actions
            .into_iter()
            .map(|operation| ResolvedAction {
                implementation: registry.action(&operation.code).cloned(),
                operation,
            })
            .collect();

        let condition_score = conditions
            .iter()
            .filter_map(|condition| condition.implementation.as_ref())
            .map(|condition| condition.priority_value());

        let action_score = actions
            .iter()
            .filter_map(|action| action.implementation.as_ref())
            .map(PromotionAction::priority_value);

        let priority_score = condition_score
            .chain(action_score)
            .fold(0, i32::saturating_add);

        if input
            .priority_score
            .is_some_and(|stored| stored != priority_score)
        {
            debug!(
                promotion = %input.name,
                stored = ?input.priority_score,
                priority_score,
                "stored priority score is stale; using recomputed score"
            );
        }

        Self {
            id: input.id,
            name: input.name,
            enabled: input.enabled,
            channels: input.channels.into_iter().collect(),
            conditions,
            actions,
            priority_score,
        }
    }

    /// Promotion identity
    pub fn id(&self) -> PromotionUuid {
        self.id
    }

    /// Promotion name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the promotion is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Channels the promotion is visible in
    pub fn channels(&self) -> &[ChannelUuid] {
        &self.channels
    }

    /// Whether the promotion is visible in `channel`.
    pub fn is_in_channel(&self, channel: ChannelUuid) -> bool {
        self.channels.contains(&channel)
    }

    /// Sum of the priority values of every resolved condition and action.
    pub fn priority_score(&self) -> i32 {
        self.priority_score
    }

    /// Stored condition references, in order
    pub fn conditions(&self) -> impl Iterator<Item = &AdjustmentOperation> {
        self.conditions.iter().map(|condition| &condition.operation)
    }

    /// Stored action references, in order
    pub fn actions(&self) -> impl Iterator<Item = &AdjustmentOperation> {
        self.actions.iter().map(|action| &action.operation)
    }

    /// Codes that were not found in the registry at construction.
    pub fn unresolved_codes(&self) -> Vec<&str> {
        let conditions = self
            .conditions
            .iter()
            .filter(|condition| condition.implementation.is_none())
            .map(|condition| condition.operation.code.as_str());

        let actions = self
            .actions
            .iter()
            .filter(|action| action.implementation.is_none())
            .map(|action| action.operation.code.as_str());

        conditions.chain(actions).collect()
    }

    /// Return the persisted shape, carrying the recomputed priority score.
    pub fn to_input(&self) -> PromotionInput {
        PromotionInput {
            id: self.id,
            name: self.name.clone(),
            enabled: self.enabled,
            channels: self.channels.to_vec(),
            conditions: self.conditions().cloned().collect(),
            actions: self.actions().cloned().collect(),
            priority_score: Some(self.priority_score),
        }
    }

    /// Check whether every condition holds for the order.
    ///
    /// Conditions are checked in stored order and evaluation stops at the first failure. A
    /// condition whose code did not resolve always fails. With no conditions the promotion
    /// always applies.
    pub fn test(&self, order: &Order<'_>) -> bool {
        self.conditions
            .iter()
            .all(|condition| condition.check(&self.name, order))
    }

    /// Apply the order-scoped actions to the order.
    ///
    /// Item-scoped and unresolved actions are skipped. Each action's result is rounded
    /// before summing; a zero total yields no adjustment.
    pub fn apply_to_order(&self, order: &Order<'_>) -> Option<Adjustment> {
        let contributions = self
            .actions
            .iter()
            .filter_map(|action| match &action.implementation {
                Some(PromotionAction::Order(implementation)) => Some(action.contribution(
                    &self.name,
                    implementation.execute(order, &action.operation.args),
                )),
                Some(PromotionAction::Item(_)) => None,
                None => {
                    debug!(
                        promotion = %self.name,
                        code = %action.operation.code,
                        "action code not registered; skipping"
                    );

                    None
                }
            });

        self.adjustment_from(contributions)
    }

    /// Apply the item-scoped actions to one item of `line`.
    ///
    /// Order-scoped and unresolved actions are skipped. Each action's result is rounded
    /// before summing; a zero total yields no adjustment.
    pub fn apply_to_order_item(
        &self,
        item: &OrderItem<'_>,
        line: &OrderLine<'_>,
    ) -> Option<Adjustment> {
        let contributions = self
            .actions
            .iter()
            .filter_map(|action| match &action.implementation {
                Some(PromotionAction::Item(implementation)) => Some(action.contribution(
                    &self.name,
                    implementation.execute(item, line, &action.operation.args),
                )),
                Some(PromotionAction::Order(_)) => None,
                None => {
                    debug!(
                        promotion = %self.name,
                        code = %action.operation.code,
                        "action code not registered; skipping"
                    );

                    None
                }
            });

        self.adjustment_from(contributions)
    }

    fn adjustment_from(&self, contributions: impl Iterator<Item = i64>) -> Option<Adjustment> {
        let amount = contributions.fold(0, i64::saturating_add);

        (amount != 0).then(|| {
            Adjustment::new(
                AdjustmentType::Promotion,
                amount,
                self.name.clone(),
                self.source_id(),
            )
        })
    }
}

impl AdjustmentSource for Promotion {
    fn source_uuid(&self) -> Uuid {
        self.id.into_uuid()
    }

    fn adjustment_type(&self) -> AdjustmentType {
        AdjustmentType::Promotion
    }
}
