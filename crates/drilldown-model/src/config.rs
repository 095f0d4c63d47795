use serde::{Deserialize, Serialize};
use std::fmt;

/// One key of a multi-key sort. The wire form is the field name with an
/// optional leading `-` marking a descending key (`"date"` / `"-date"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortKey {
    pub field: String,
    pub descending: bool,
}

impl SortKey {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix('-') {
            Some(field) => Self::descending(field),
            None => Self::ascending(raw),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descending {
            write!(f, "-{}", self.field)
        } else {
            f.write_str(&self.field)
        }
    }
}

impl From<&str> for SortKey {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<String> for SortKey {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl Serialize for SortKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SortKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// A named flat (non-grouped) view with its own sort and display columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LedgerSpec {
    pub label: String,
    pub sort: Vec<SortKey>,
    pub cols: Vec<String>,
}

impl LedgerSpec {
    /// A ledger displays newest-first when its primary sort key descends.
    pub fn is_descending(&self) -> bool {
        self.sort.first().is_some_and(|k| k.descending)
    }
}

/// The view configuration supplied by the host on every render cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DrillConfig {
    /// Plain display columns, in presentation order.
    pub columns: Vec<String>,
    /// Total columns aggregated at every group level and in grand totals.
    pub totals: Vec<String>,
    /// Grouping sequence; its length is the tree depth. Empty means no
    /// grouping (ledger or flat mode).
    pub group_order: Vec<String>,
    pub ledgers: Vec<LedgerSpec>,
    pub show_grand_totals: bool,
}

impl Default for DrillConfig {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            totals: Vec::new(),
            group_order: Vec::new(),
            ledgers: Vec::new(),
            show_grand_totals: true,
        }
    }
}

impl DrillConfig {
    /// The first registered ledger is active exactly when no grouping
    /// sequence is set.
    pub fn active_ledger(&self) -> Option<&LedgerSpec> {
        if self.group_order.is_empty() {
            self.ledgers.first()
        } else {
            None
        }
    }

    /// Display columns for a ledger view: the ledger's own columns with any
    /// configured total columns removed (totals already render through the
    /// running-balance cells). A ledger without columns inherits the view's.
    pub fn ledger_display_columns(&self, ledger: &LedgerSpec) -> Vec<String> {
        if ledger.cols.is_empty() {
            return self.columns.clone();
        }
        ledger
            .cols
            .iter()
            .filter(|c| !self.totals.contains(c))
            .cloned()
            .collect()
    }

    pub fn depth(&self) -> usize {
        self.group_order.len()
    }
}
