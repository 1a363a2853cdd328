//! Adjustments prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    adjustments::{Adjustment, AdjustmentSource, AdjustmentType, SourceId, SourceIdError},
    config::{AdjustmentConfig, ConfigError, OrderFixture},
    evaluation::{AppliedAdjustment, Evaluation, EvaluationError, Evaluator},
    ids::{ChannelUuid, CustomerGroupUuid, TaxCategoryUuid, ZoneUuid},
    orders::{
        AdjustmentTarget, Order, OrderError, OrderItem, OrderItemUuid, OrderLine, OrderLineUuid,
        OrderUuid,
    },
    promotions::{Promotion, PromotionInput, PromotionUuid, prelude::*},
    report::{ReportError, write_report},
    tax::{TaxRate, TaxRateError, TaxRateInput, TaxRateUuid},
};
