use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::value::Scalar;

static BLANK: Scalar = Scalar::Blank;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: String,
    pub index: usize,
}

/// Flat record collection: normalized header names plus row-major cells.
///
/// The engine owns the record set for the duration of a render cycle and may
/// reorder its rows in place; repeated renders over unchanged rows and
/// configuration are idempotent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSet {
    pub fields: Vec<Field>,
    pub rows: Vec<Vec<Scalar>>,
}

impl RecordSet {
    /// Normalizes header captions into non-empty, unique (case-insensitive)
    /// field names:
    /// - Trim leading/trailing whitespace.
    /// - If the caption is empty after trimming, assign `Column{n}` where `n`
    ///   is the 1-based ordinal of the blank column in the header row.
    /// - If a caption collides with a previous caption (case-insensitive),
    ///   append `" (2)"`, `" (3)"`, ... until the name is unique.
    fn normalize_field_names(headers: &[String]) -> Vec<String> {
        let mut out = Vec::with_capacity(headers.len());
        let mut used_folded: HashSet<String> = HashSet::with_capacity(headers.len());
        let mut blank_counter = 0usize;

        for header in headers {
            let mut base = header.trim().to_string();

            if base.is_empty() {
                blank_counter += 1;
                base = format!("Column{blank_counter}");
            }

            let mut name = base.clone();
            if used_folded.contains(&name.to_ascii_lowercase()) {
                let mut suffix = 2usize;
                loop {
                    name = format!("{base} ({suffix})");
                    let folded = name.to_ascii_lowercase();
                    if !used_folded.contains(&folded) {
                        break;
                    }
                    suffix += 1;
                }
            }

            used_folded.insert(name.to_ascii_lowercase());
            out.push(name);
        }

        out
    }

    pub fn new(headers: Vec<String>, rows: Vec<Vec<Scalar>>) -> Self {
        let normalized = Self::normalize_field_names(&headers);
        let fields = normalized
            .into_iter()
            .enumerate()
            .map(|(index, name)| Field { name, index })
            .collect();
        Self { fields, rows }
    }

    /// Builds a record set from a rectangular range whose first row holds the
    /// header captions.
    pub fn from_range(range: &[Vec<Scalar>]) -> Self {
        let Some((headers, rows)) = range.split_first() else {
            return Self::default();
        };
        let captions: Vec<String> = headers.iter().map(Scalar::display_string).collect();
        Self::new(captions, rows.to_vec())
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().find(|f| f.name == name).map(|f| f.index)
    }

    /// Cell accessor; rows shorter than the header row read as blank.
    pub fn value(&self, row: usize, field: usize) -> &Scalar {
        self.rows
            .get(row)
            .and_then(|r| r.get(field))
            .unwrap_or(&BLANK)
    }

    pub fn value_by_name(&self, row: usize, name: &str) -> &Scalar {
        match self.field_index(name) {
            Some(field) => self.value(row, field),
            None => &BLANK,
        }
    }

    pub fn row(&self, row: usize) -> &[Scalar] {
        self.rows.get(row).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn rows_mut(&mut self) -> &mut Vec<Vec<Scalar>> {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
