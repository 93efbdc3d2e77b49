//! Device GPU counter descriptor.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Specification of one hardware or software counter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterSpec {
    pub counter_id: u32,
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub numerator_units: Vec<String>,

    #[serde(default)]
    pub denominator_units: Vec<String>,

    #[serde(default)]
    pub select_by_default: bool,
}

/// Counters a device exposes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CounterDescriptor {
    #[serde(default)]
    pub specs: Vec<CounterSpec>,
}

impl CounterDescriptor {
    /// Name -> spec table for exact-name matching
    ///
    /// With duplicate names the last spec wins.
    pub fn specs_by_name(&self) -> HashMap<&str, &CounterSpec> {
        self.specs.iter().map(|s| (s.name.as_str(), s)).collect()
    }
}
