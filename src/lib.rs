//! Adjustments
//!
//! Adjustments is an evaluation engine for order adjustments: promotions built from registered
//! conditions and actions, and tax rates with exact gross/net conversion in minor units.

pub mod adjustments;
pub mod amounts;
pub mod config;
pub mod evaluation;
pub mod ids;
pub mod orders;
pub mod prelude;
pub mod promotions;
pub mod report;
pub mod tax;
