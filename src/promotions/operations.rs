//! Configurable Operations
//!
//! Conditions and actions are registered implementations identified by a string code. A
//! promotion stores only `{code, args}` pairs ([`AdjustmentOperation`]) and resolves them
//! against a [`PromotionRegistry`](crate::promotions::registry::PromotionRegistry).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::promotions::args::ConfigArgs;

/// Identity and ordering metadata shared by every condition and action.
pub trait ConfigurableOperation: fmt::Debug + Send + Sync {
    /// Unique code used to reference this operation from stored promotions.
    fn code(&self) -> &str;

    /// Human-readable description for configuration tooling.
    fn description(&self) -> &str;

    /// Contribution to a promotion's priority score. Higher runs later.
    fn priority_value(&self) -> i32 {
        0
    }
}

/// A stored reference to a condition or action: its code plus arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentOperation {
    /// Registered operation code
    pub code: String,

    /// Arguments passed to the operation
    #[serde(default)]
    pub args: ConfigArgs,
}

impl AdjustmentOperation {
    /// Create an operation reference.
    pub fn new(code: impl Into<String>, args: ConfigArgs) -> Self {
        Self {
            code: code.into(),
            args,
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn args_default_to_empty_when_omitted() -> TestResult {
        let operation: AdjustmentOperation = serde_norway::from_str("code: free_delivery\n")?;

        assert_eq!(
            operation,
            AdjustmentOperation::new("free_delivery", ConfigArgs::new())
        );

        Ok(())
    }
}
