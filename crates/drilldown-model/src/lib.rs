#![forbid(unsafe_code)]

//! Core in-memory data model for drill-down table views.
//!
//! A drill-down view is driven by three kinds of input, all supplied fresh on
//! every render cycle:
//! - a [`RecordSet`]: flat records as header names plus row-major scalar cells
//! - a [`FieldCatalog`]: per-field display and aggregation metadata
//! - a [`DrillConfig`]: which columns to show, which to total, the active
//!   grouping sequence, and any registered ledger views
//!
//! The transformation engine (the `drilldown-engine` crate) consumes these and
//! produces group trees, ledger projections and grand totals for an external
//! view renderer. Nothing here is persisted; the model types exist for the
//! duration of a render call and serialize to a stable camelCase shape for
//! hosts that move them across an IPC boundary.

pub mod config;
pub mod fields;
pub mod records;
pub mod value;

pub use config::{DrillConfig, LedgerSpec, SortKey};
pub use fields::{BalanceBehavior, FieldCatalog, FieldMeta, Formatter};
pub use records::{Field, RecordSet};
pub use value::{KeyPart, Scalar};
