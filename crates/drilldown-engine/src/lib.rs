#![forbid(unsafe_code)]
#![deny(unreachable_patterns)]

//! Data-transformation engine for interactive drill-down tables.
//!
//! Flat records plus a grouping/aggregation configuration go in; two mutually
//! exclusive projections come out, both consumed by an external view
//! renderer:
//! - a hierarchical group tree with per-node aggregates
//!   ([`build_group_tree`]), when a grouping sequence is active
//! - a flat chronological ledger with running balances ([`project_ledger`]),
//!   when no grouping sequence is active and a ledger is registered
//!
//! Grand totals ([`grand_totals`]) are shared by both paths, and
//! [`generate_permutations`] bounds the menu of alternate grouping sequences
//! a host can offer.
//!
//! Everything is synchronous and recomputed from scratch per render call;
//! the engine holds no state between invocations beyond the caller's
//! [`drilldown_model::RecordSet`], whose rows [`build_group_tree`] sorts in
//! place. Missing or malformed data degrades silently (see
//! [`error::ConfigError`] for the one condition that does not).

pub mod aggregate;
pub mod compare;
pub mod display;
pub mod error;
pub mod ledger;
pub mod permute;
pub mod sort;
pub mod tree;

pub use aggregate::{
    aggregate_rows, grand_totals, AggregatePolicy, AggregateValue, GrandTotals, TotalColumn,
};
pub use compare::natural_compare;
pub use error::ConfigError;
pub use ledger::{
    project_ledger, InitialBalancePosition, InitialBalanceRow, LedgerProjection, LedgerRow,
};
pub use permute::{generate_permutations, PERMUTATION_MENU_LIMIT};
pub use sort::{sort_records, sort_row_indices};
pub use tree::{build_group_tree, clamp_drill_level, sanitize_id_part, Children, GroupNode};
