//! Display-support helpers for the view renderer.
//!
//! Data only: these produce the strings and presence flags a renderer binds
//! into cells; no markup is built here.

use drilldown_model::{FieldCatalog, RecordSet, Scalar};

use crate::aggregate::AggregateValue;

/// Formats a number with comma thousands grouping and a fixed decimal count
/// (`1234.5` with 2 decimals renders as `"1,234.50"`).
pub fn format_number(value: f64, decimals: u8) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let formatted = format!("{:.*}", decimals as usize, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut out = String::with_capacity(formatted.len() + int_part.len() / 3 + 1);
    if value < 0.0 {
        out.push('-');
    }
    for (pos, ch) in int_part.chars().enumerate() {
        if pos > 0 && (int_part.len() - pos) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Renders an aggregate the way the table shows it: scalars formatted as
/// numbers, keyed subtotals joined as `"{amount} {key}"` pairs, an empty
/// keyed aggregate as `"-"`.
pub fn format_aggregate(value: &AggregateValue, decimals: u8) -> String {
    match value {
        AggregateValue::Scalar(n) => format_number(*n, decimals),
        AggregateValue::Keyed(buckets) => {
            if buckets.is_empty() {
                return "-".to_string();
            }
            buckets
                .iter()
                .map(|(key, amount)| format!("{} {}", format_number(*amount, decimals), key))
                .collect::<Vec<_>>()
                .join(", ")
        }
    }
}

/// Formats one record cell, honoring the field's configured formatter when
/// present; numbers otherwise render through [`format_number`] at the
/// field's decimal precision.
pub fn format_cell(records: &RecordSet, row: usize, field: &str, catalog: &FieldCatalog) -> String {
    let value = records.value_by_name(row, field);
    if let Some(formatter) = catalog.formatter(field) {
        return formatter(value, records.row(row));
    }
    match value {
        Scalar::Number(n) => format_number(*n, catalog.decimals(field)),
        other => other.display_string(),
    }
}

/// Which letters A-Z start at least one value of `field`, for the A-Z jump
/// bar next to a grouped table. Pair order is always the full alphabet.
pub fn az_index(records: &RecordSet, field: &str) -> Vec<(char, bool)> {
    let mut present = [false; 26];
    if let Some(idx) = records.field_index(field) {
        for row in 0..records.len() {
            let display = records.value(row, idx).display_string();
            if let Some(first) = display.chars().next() {
                for upper in first.to_uppercase() {
                    if upper.is_ascii_uppercase() {
                        present[(upper as u8 - b'A') as usize] = true;
                    }
                }
            }
        }
    }
    ('A'..='Z').zip(present).collect()
}
