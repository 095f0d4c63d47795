use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::value::Scalar;

/// Display callback for a field: receives the cell value and the full record
/// row, returns the text to show. Supplied in memory by the host; never part
/// of the serialized configuration.
pub type Formatter = Arc<dyn Fn(&Scalar, &[Scalar]) -> String + Send + Sync>;

/// Add-minus-subtract contribution policy for a total column.
///
/// When present, a record's contribution to the column is
/// `sum(add fields) - sum(subtract fields)` instead of the column's raw value,
/// optionally opened at `initial_balance`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BalanceBehavior {
    pub add: Vec<String>,
    pub subtract: Vec<String>,
    pub initial_balance: Option<f64>,
}

/// Per-field display/aggregation metadata. Every property is optional and
/// defaults through [`FieldCatalog`]'s resolver getters.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldMeta {
    pub label: Option<String>,
    pub decimals: Option<u8>,
    /// Secondary field bucketing this column's totals into a keyed mapping.
    pub sub_total_by: Option<String>,
    pub balance_behavior: Option<BalanceBehavior>,
    /// Show the distinct descendant values at non-leaf group levels.
    pub toggles_up: bool,
    pub class: Option<String>,
    pub label_class: Option<String>,
    pub icon: Option<String>,
    #[serde(skip)]
    pub formatter: Option<Formatter>,
}

impl fmt::Debug for FieldMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldMeta")
            .field("label", &self.label)
            .field("decimals", &self.decimals)
            .field("sub_total_by", &self.sub_total_by)
            .field("balance_behavior", &self.balance_behavior)
            .field("toggles_up", &self.toggles_up)
            .field("class", &self.class)
            .field("label_class", &self.label_class)
            .field("icon", &self.icon)
            .field("formatter", &self.formatter.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

// Formatter callbacks have no useful equality; two metas compare equal when
// their declarative properties do.
impl PartialEq for FieldMeta {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label
            && self.decimals == other.decimals
            && self.sub_total_by == other.sub_total_by
            && self.balance_behavior == other.balance_behavior
            && self.toggles_up == other.toggles_up
            && self.class == other.class
            && self.label_class == other.label_class
            && self.icon == other.icon
    }
}

/// Field-name keyed metadata lookup with the documented defaults.
///
/// Absent configuration never errors; every getter yields its default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldCatalog {
    entries: HashMap<String, FieldMeta>,
}

impl FieldCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, meta: FieldMeta) -> &mut Self {
        self.entries.insert(field.into(), meta);
        self
    }

    pub fn meta(&self, field: &str) -> Option<&FieldMeta> {
        self.entries.get(field)
    }

    /// Display name; defaults to the field name with its first letter
    /// capitalized.
    pub fn label(&self, field: &str) -> String {
        if let Some(label) = self.meta(field).and_then(|m| m.label.as_deref()) {
            return label.to_string();
        }
        let mut chars = field.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn decimals(&self, field: &str) -> u8 {
        self.meta(field).and_then(|m| m.decimals).unwrap_or(2)
    }

    pub fn sub_total_by(&self, field: &str) -> Option<&str> {
        self.meta(field).and_then(|m| m.sub_total_by.as_deref())
    }

    pub fn balance_behavior(&self, field: &str) -> Option<&BalanceBehavior> {
        self.meta(field).and_then(|m| m.balance_behavior.as_ref())
    }

    pub fn toggles_up(&self, field: &str) -> bool {
        self.meta(field).is_some_and(|m| m.toggles_up)
    }

    pub fn formatter(&self, field: &str) -> Option<&Formatter> {
        self.meta(field).and_then(|m| m.formatter.as_ref())
    }

    pub fn class(&self, field: &str) -> &str {
        self.meta(field)
            .and_then(|m| m.class.as_deref())
            .unwrap_or("")
    }

    pub fn label_class(&self, field: &str) -> &str {
        self.meta(field)
            .and_then(|m| m.label_class.as_deref())
            .unwrap_or("")
    }

    pub fn icon(&self, field: &str) -> &str {
        self.meta(field)
            .and_then(|m| m.icon.as_deref())
            .unwrap_or("")
    }
}
