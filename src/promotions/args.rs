//! Rule Arguments
//!
//! The argument bag stored alongside each condition/action code, with typed accessors for
//! rule implementations.

use std::{slice, str::FromStr};

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reading rule arguments.
#[derive(Debug, Error, PartialEq)]
pub enum ArgsError {
    /// A required argument is absent.
    #[error("missing argument: {0}")]
    Missing(String),

    /// An argument could not be parsed as the expected type.
    #[error("invalid value for argument {name}: {value}")]
    Invalid {
        /// Argument name
        name: String,
        /// Raw value
        value: String,
    },
}

/// A single named argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigArg {
    /// Argument name
    pub name: String,

    /// Raw string value
    pub value: String,
}

/// Ordered argument bag for a condition or action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigArgs(Vec<ConfigArg>);

impl ConfigArgs {
    /// An empty argument bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an argument, builder style.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.push(ConfigArg {
            name: name.into(),
            value: value.into(),
        });

        self
    }

    /// Raw value of the first argument called `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|arg| arg.name == name)
            .map(|arg| arg.value.as_str())
    }

    /// Iterate the arguments in stored order.
    pub fn iter(&self) -> slice::Iter<'_, ConfigArg> {
        self.0.iter()
    }

    /// Parse a required argument.
    ///
    /// # Errors
    ///
    /// Returns [`ArgsError::Missing`] if the argument is absent, or [`ArgsError::Invalid`] if
    /// it does not parse as `T`.
    pub fn parse<T: FromStr>(&self, name: &str) -> Result<T, ArgsError> {
        let value = self.require(name)?;

        value.trim().parse().map_err(|_err| invalid(name, value))
    }

    /// Parse a required decimal argument.
    ///
    /// # Errors
    ///
    /// See [`ConfigArgs::parse`].
    pub fn decimal(&self, name: &str) -> Result<Decimal, ArgsError> {
        self.parse(name)
    }

    /// Parse a required percentage argument, given as a fraction (`"0.1"` is 10%).
    ///
    /// # Errors
    ///
    /// See [`ConfigArgs::parse`].
    pub fn percentage(&self, name: &str) -> Result<Percentage, ArgsError> {
        let value = self.require(name)?;

        Percentage::try_from(value.trim()).map_err(|_err| invalid(name, value))
    }

    fn require(&self, name: &str) -> Result<&str, ArgsError> {
        self.get(name)
            .ok_or_else(|| ArgsError::Missing(name.to_string()))
    }
}

impl<'a> IntoIterator for &'a ConfigArgs {
    type Item = &'a ConfigArg;
    type IntoIter = slice::Iter<'a, ConfigArg>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn invalid(name: &str, value: &str) -> ArgsError {
    ArgsError::Invalid {
        name: name.to_string(),
        value: value.to_string(),
    }
}
