//! Flat ledger projection with two-pass running balances.
//!
//! Balances are always accumulated oldest-to-newest, no matter how the
//! ledger displays: pass 1 walks the records in ascending chronological
//! order (the ledger's sort keys with descending markers stripped) and
//! snapshots the post-impact balance against each row; pass 2 orders the
//! same rows by the configured display sort and reuses the snapshots
//! verbatim. Reversing the display never recomputes a balance.

use std::collections::{BTreeMap, HashMap};

use drilldown_model::{DrillConfig, FieldCatalog, LedgerSpec, RecordSet, SortKey};
use serde::{Deserialize, Serialize};

use crate::aggregate::TotalColumn;
use crate::sort::sort_row_indices;

/// Where the synthesized initial-balance row belongs in display order: before
/// the first chronological transaction, so top for an ascending ledger and
/// bottom for a descending one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InitialBalancePosition {
    Top,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialBalanceRow {
    pub position: InitialBalancePosition,
    /// Opening balance per balance column that configures one.
    pub balances: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRow {
    /// Index into the record set.
    pub row: usize,
    /// Running balance per balance column as of this record, accumulated in
    /// chronological order.
    pub balances: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerProjection {
    /// Rows in display order.
    pub rows: Vec<LedgerRow>,
    /// Display columns for this ledger (its `cols` minus configured totals).
    pub columns: Vec<String>,
    pub initial_balance: Option<InitialBalanceRow>,
}

/// Projects the flat ledger view. Row order inside `records` is left
/// untouched; both passes order row indices instead, so a `LedgerRow`'s
/// `row` stays a stable handle into the record set.
pub fn project_ledger(
    records: &RecordSet,
    ledger: &LedgerSpec,
    config: &DrillConfig,
    catalog: &FieldCatalog,
) -> LedgerProjection {
    let balance_columns: Vec<TotalColumn> = config
        .totals
        .iter()
        .map(|name| TotalColumn::resolve(records, name, catalog))
        .filter(|c| c.has_balance())
        .collect();

    // Pass 1: chronological accumulation, descending markers stripped.
    let chronological_keys: Vec<SortKey> = ledger
        .sort
        .iter()
        .map(|k| SortKey::ascending(k.field.clone()))
        .collect();
    let mut chronological: Vec<usize> = (0..records.len()).collect();
    sort_row_indices(records, &mut chronological, &chronological_keys);

    let mut running: Vec<f64> = balance_columns
        .iter()
        .map(|c| c.initial_balance().unwrap_or(0.0))
        .collect();
    let mut snapshots: HashMap<usize, BTreeMap<String, f64>> =
        HashMap::with_capacity(records.len());
    for &row in &chronological {
        let mut at_row = BTreeMap::new();
        for (column, total) in balance_columns.iter().zip(running.iter_mut()) {
            *total += column.impact(records, row);
            at_row.insert(column.name.clone(), *total);
        }
        snapshots.insert(row, at_row);
    }

    // Pass 2: display order, snapshots reused as-is.
    let mut display: Vec<usize> = (0..records.len()).collect();
    sort_row_indices(records, &mut display, &ledger.sort);
    let rows = display
        .into_iter()
        .map(|row| LedgerRow {
            row,
            balances: snapshots.remove(&row).unwrap_or_default(),
        })
        .collect();

    let opening: BTreeMap<String, f64> = balance_columns
        .iter()
        .filter_map(|c| c.initial_balance().map(|initial| (c.name.clone(), initial)))
        .collect();
    let initial_balance = if opening.is_empty() {
        None
    } else {
        Some(InitialBalanceRow {
            position: if ledger.is_descending() {
                InitialBalancePosition::Bottom
            } else {
                InitialBalancePosition::Top
            },
            balances: opening,
        })
    };

    LedgerProjection {
        rows,
        columns: config.ledger_display_columns(ledger),
        initial_balance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use drilldown_model::{BalanceBehavior, FieldMeta, Scalar};
    use pretty_assertions::assert_eq;

    fn date(day: u32) -> Scalar {
        Scalar::Date(NaiveDate::from_ymd_opt(2024, 3, day).unwrap())
    }

    fn statement_records() -> RecordSet {
        // Inserted newest-first on purpose; chronology comes from the sort.
        RecordSet::new(
            vec![
                "date".to_string(),
                "credit".to_string(),
                "debit".to_string(),
                "memo".to_string(),
            ],
            vec![
                vec![date(2), Scalar::Blank, 20.into(), "coffee".into()],
                vec![date(1), 50.into(), Scalar::Blank, "deposit".into()],
            ],
        )
    }

    fn statement_config(descending: bool, initial: Option<f64>) -> (DrillConfig, FieldCatalog) {
        let mut catalog = FieldCatalog::new();
        catalog.insert(
            "balance",
            FieldMeta {
                balance_behavior: Some(BalanceBehavior {
                    add: vec!["credit".to_string()],
                    subtract: vec!["debit".to_string()],
                    initial_balance: initial,
                }),
                ..FieldMeta::default()
            },
        );
        let config = DrillConfig {
            totals: vec!["balance".to_string()],
            ledgers: vec![LedgerSpec {
                label: "Statement".to_string(),
                sort: vec![if descending {
                    SortKey::descending("date")
                } else {
                    SortKey::ascending("date")
                }],
                cols: vec![
                    "date".to_string(),
                    "balance".to_string(),
                    "memo".to_string(),
                ],
            }],
            ..DrillConfig::default()
        };
        (config, catalog)
    }

    fn balance_of(row: &LedgerRow) -> f64 {
        *row.balances.get("balance").unwrap()
    }

    #[test]
    fn running_balances_accumulate_chronologically() {
        let records = statement_records();
        let (config, catalog) = statement_config(false, Some(100.0));
        let ledger = config.active_ledger().unwrap();

        let projection = project_ledger(&records, ledger, &config, &catalog);

        // Display ascending: deposit day 1 first, then the day-2 debit.
        assert_eq!(projection.rows.len(), 2);
        assert_eq!(projection.rows[0].row, 1);
        assert_eq!(balance_of(&projection.rows[0]), 150.0);
        assert_eq!(projection.rows[1].row, 0);
        assert_eq!(balance_of(&projection.rows[1]), 130.0);

        let initial = projection.initial_balance.unwrap();
        assert_eq!(initial.position, InitialBalancePosition::Top);
        assert_eq!(initial.balances.get("balance"), Some(&100.0));

        assert_eq!(
            projection.columns,
            vec!["date".to_string(), "memo".to_string()]
        );
    }

    #[test]
    fn descending_display_keeps_chronological_balances() {
        let records = statement_records();
        let (config, catalog) = statement_config(true, Some(100.0));
        let ledger = config.active_ledger().unwrap();

        let projection = project_ledger(&records, ledger, &config, &catalog);

        // Newest first, balances unchanged from the chronological pass.
        assert_eq!(projection.rows[0].row, 0);
        assert_eq!(balance_of(&projection.rows[0]), 130.0);
        assert_eq!(projection.rows[1].row, 1);
        assert_eq!(balance_of(&projection.rows[1]), 150.0);

        let initial = projection.initial_balance.unwrap();
        assert_eq!(initial.position, InitialBalancePosition::Bottom);
    }

    #[test]
    fn no_initial_balance_row_without_a_configured_opening() {
        let records = statement_records();
        let (config, catalog) = statement_config(false, None);
        let ledger = config.active_ledger().unwrap();

        let projection = project_ledger(&records, ledger, &config, &catalog);
        assert_eq!(projection.initial_balance, None);
        assert_eq!(balance_of(&projection.rows[0]), 50.0);
        assert_eq!(balance_of(&projection.rows[1]), 30.0);
    }

    #[test]
    fn repeated_projection_is_idempotent() {
        let records = statement_records();
        let (config, catalog) = statement_config(true, Some(100.0));
        let ledger = config.active_ledger().unwrap();

        let first = project_ledger(&records, ledger, &config, &catalog);
        let second = project_ledger(&records, ledger, &config, &catalog);
        assert_eq!(first, second);
    }
}
