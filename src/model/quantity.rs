use std::fmt;

use serde::{Deserialize, Serialize};

/// A scalar value carrying the physical unit of the data it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub value: f64,
    pub unit: Option<String>,
}

impl Quantity {
    pub fn new(value: f64, unit: Option<String>) -> Self {
        Self { value, unit }
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            value: self.value * factor,
            unit: self.unit.clone(),
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.unit {
            Some(unit) if !unit.is_empty() => write!(formatter, "{} {unit}", self.value),
            _ => write!(formatter, "{}", self.value),
        }
    }
}
