//! Column aggregation: per-render policy resolution, subset aggregation and
//! grand totals.
//!
//! Each configured total column resolves once per render cycle into a
//! [`TotalColumn`] carrying field indices and a tagged [`AggregatePolicy`],
//! so the tree walk and the ledger never re-derive metadata per record.

use std::collections::BTreeMap;

use drilldown_model::{FieldCatalog, RecordSet};
use serde::{Deserialize, Serialize};

/// How a record contributes to a total column.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregatePolicy {
    /// The record's own numeric value for the column.
    Plain,
    /// `sum(add fields) - sum(subtract fields)`; the column itself need not
    /// exist as a record field. `initial` seeds grand totals and running
    /// balances.
    Balance {
        add: Vec<usize>,
        subtract: Vec<usize>,
        initial: Option<f64>,
    },
}

/// A total column resolved against a concrete record set.
#[derive(Debug, Clone, PartialEq)]
pub struct TotalColumn {
    pub name: String,
    pub field: Option<usize>,
    pub policy: AggregatePolicy,
    /// Bucket aggregates by this field instead of summing into one scalar.
    pub sub_total_by: Option<usize>,
}

impl TotalColumn {
    pub fn resolve(records: &RecordSet, name: &str, catalog: &FieldCatalog) -> Self {
        let policy = match catalog.balance_behavior(name) {
            Some(behavior) => AggregatePolicy::Balance {
                add: resolve_indices(records, &behavior.add),
                subtract: resolve_indices(records, &behavior.subtract),
                initial: behavior.initial_balance,
            },
            None => AggregatePolicy::Plain,
        };
        Self {
            name: name.to_string(),
            field: records.field_index(name),
            policy,
            sub_total_by: catalog
                .sub_total_by(name)
                .and_then(|f| records.field_index(f)),
        }
    }

    pub fn has_balance(&self) -> bool {
        matches!(self.policy, AggregatePolicy::Balance { .. })
    }

    pub fn initial_balance(&self) -> Option<f64> {
        match &self.policy {
            AggregatePolicy::Balance { initial, .. } => *initial,
            AggregatePolicy::Plain => None,
        }
    }

    /// A single record's numeric contribution to this column. Missing and
    /// non-numeric fields contribute 0.
    pub fn impact(&self, records: &RecordSet, row: usize) -> f64 {
        match &self.policy {
            AggregatePolicy::Plain => self
                .field
                .and_then(|idx| records.value(row, idx).coerce_number())
                .unwrap_or(0.0),
            AggregatePolicy::Balance { add, subtract, .. } => {
                let mut total = 0.0;
                for &idx in add {
                    total += records.value(row, idx).coerce_number().unwrap_or(0.0);
                }
                for &idx in subtract {
                    total -= records.value(row, idx).coerce_number().unwrap_or(0.0);
                }
                total
            }
        }
    }
}

fn resolve_indices(records: &RecordSet, names: &[String]) -> Vec<usize> {
    // Unknown add/subtract fields would only ever contribute 0; drop them here.
    names
        .iter()
        .filter_map(|n| records.field_index(n))
        .collect()
}

/// A computed aggregate: one scalar, or a keyed mapping when the column
/// subtotals by a secondary field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum AggregateValue {
    Scalar(f64),
    Keyed(BTreeMap<String, f64>),
}

/// Aggregates the given rows (indices into `records`) for one total column.
///
/// In keyed mode, records whose bucket key is blank are skipped for plain
/// columns; balance columns always contribute, with blank keys bucketing
/// under `"(blank)"`.
pub fn aggregate_rows(records: &RecordSet, rows: &[usize], column: &TotalColumn) -> AggregateValue {
    match column.sub_total_by {
        None => {
            let mut sum = 0.0;
            for &row in rows {
                sum += column.impact(records, row);
            }
            AggregateValue::Scalar(sum)
        }
        Some(bucket_field) => {
            let mut buckets: BTreeMap<String, f64> = BTreeMap::new();
            for &row in rows {
                let key = records.value(row, bucket_field);
                if key.is_blank() && !column.has_balance() {
                    continue;
                }
                let bucket = key.to_key_part().display_string();
                *buckets.entry(bucket).or_insert(0.0) += column.impact(records, row);
            }
            AggregateValue::Keyed(buckets)
        }
    }
}

/// Grand totals per configured total column over the entire dataset.
pub type GrandTotals = BTreeMap<String, AggregateValue>;

/// Computes the grand totals; always a full recompute over every record.
/// Scalar balance columns open at their configured initial balance.
pub fn grand_totals(records: &RecordSet, totals: &[String], catalog: &FieldCatalog) -> GrandTotals {
    let all_rows: Vec<usize> = (0..records.len()).collect();
    let mut out = GrandTotals::new();
    for name in totals {
        let column = TotalColumn::resolve(records, name, catalog);
        let mut value = aggregate_rows(records, &all_rows, &column);
        if let Some(initial) = column.initial_balance() {
            if let AggregateValue::Scalar(sum) = value {
                value = AggregateValue::Scalar(sum + initial);
            }
        }
        out.insert(name.clone(), value);
    }
    out
}
