//! Stable multi-key record sorting over string-coerced values.

use std::cmp::Ordering;

use drilldown_model::{RecordSet, Scalar, SortKey};

use crate::compare::natural_compare;

/// Sorts the record set's rows in place by the given keys: successive keys
/// break ties, fully-equal rows keep their original relative order. A key
/// naming an unknown field coerces every row to `""` for that key (equal),
/// so it neither reorders nor fails.
pub fn sort_records(records: &mut RecordSet, keys: &[SortKey]) {
    if keys.is_empty() {
        return;
    }
    let resolved = resolve_keys(records, keys);
    records
        .rows_mut()
        .sort_by(|a, b| compare_rows(a, b, &resolved));
}

/// Stable sort of row indices under the same contract as [`sort_records`],
/// leaving the record set itself untouched. Used where row identity must
/// survive the sort (the ledger's two passes index the same rows in two
/// different orders).
pub fn sort_row_indices(records: &RecordSet, indices: &mut [usize], keys: &[SortKey]) {
    if keys.is_empty() {
        return;
    }
    let resolved = resolve_keys(records, keys);
    indices.sort_by(|&a, &b| compare_rows(records.row(a), records.row(b), &resolved));
}

fn resolve_keys(records: &RecordSet, keys: &[SortKey]) -> Vec<(Option<usize>, bool)> {
    keys.iter()
        .map(|k| (records.field_index(&k.field), k.descending))
        .collect()
}

fn compare_rows(a: &[Scalar], b: &[Scalar], keys: &[(Option<usize>, bool)]) -> Ordering {
    for (field, descending) in keys {
        let ord = natural_compare(&sort_string(a, *field), &sort_string(b, *field));
        let ord = if *descending { ord.reverse() } else { ord };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

fn sort_string(row: &[Scalar], field: Option<usize>) -> String {
    field
        .and_then(|idx| row.get(idx))
        .map(Scalar::display_string)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    use drilldown_model::RecordSet;
    use pretty_assertions::assert_eq;

    fn inventory() -> RecordSet {
        RecordSet::new(
            vec!["item".to_string(), "warehouse".to_string(), "qty".to_string()],
            vec![
                vec!["Item 10".into(), "South".into(), 1.into()],
                vec!["Item 2".into(), "north".into(), 2.into()],
                vec!["item 2".into(), "North".into(), 3.into()],
                vec!["Item 1".into(), "South".into(), 4.into()],
            ],
        )
    }

    fn column(records: &RecordSet, field: &str) -> Vec<String> {
        let idx = records.field_index(field).unwrap();
        (0..records.len())
            .map(|row| records.value(row, idx).display_string())
            .collect()
    }

    #[test]
    fn sorts_naturally_by_successive_keys() {
        let mut records = inventory();
        sort_records(
            &mut records,
            &[SortKey::ascending("warehouse"), SortKey::ascending("item")],
        );
        assert_eq!(column(&records, "qty"), vec!["2", "3", "4", "1"]);
    }

    #[test]
    fn descending_keys_reverse_within_their_level() {
        let mut records = inventory();
        sort_records(
            &mut records,
            &[SortKey::descending("warehouse"), SortKey::ascending("item")],
        );
        assert_eq!(column(&records, "qty"), vec!["4", "1", "2", "3"]);
    }

    #[test]
    fn equal_keys_keep_original_order() {
        let mut records = inventory();
        // "Item 2" and "item 2" fold equal; row qty=2 was inserted first.
        sort_records(&mut records, &[SortKey::ascending("item")]);
        assert_eq!(column(&records, "qty"), vec!["4", "2", "3", "1"]);
    }

    #[test]
    fn unknown_sort_fields_leave_order_untouched() {
        let mut records = inventory();
        let before = column(&records, "qty");
        sort_records(&mut records, &[SortKey::ascending("missing")]);
        assert_eq!(column(&records, "qty"), before);
    }

    #[test]
    fn index_sort_leaves_rows_in_place() {
        let records = inventory();
        let mut indices: Vec<usize> = (0..records.len()).collect();
        sort_row_indices(&records, &mut indices, &[SortKey::ascending("item")]);
        assert_eq!(indices, vec![3, 1, 2, 0]);
        assert_eq!(column(&records, "qty"), vec!["1", "2", "3", "4"]);
    }
}
