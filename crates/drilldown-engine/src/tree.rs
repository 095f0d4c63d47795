//! Hierarchical group-tree construction.
//!
//! Records are sorted by the grouping sequence, then recursively partitioned
//! one level at a time. Buckets keep post-sort encounter order (grouping
//! never re-sorts or re-buckets alphabetically), every node aggregates the
//! full record set beneath it, and node ids are stable sanitized composites
//! of the ancestor key chain.

use std::collections::{BTreeMap, HashMap, HashSet};

use drilldown_model::{DrillConfig, FieldCatalog, KeyPart, RecordSet, SortKey};
use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::aggregate::{aggregate_rows, AggregateValue, TotalColumn};
use crate::error::ConfigError;
use crate::sort::sort_records;

/// What hangs beneath a group node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum Children {
    /// Nested groups at the next level.
    Groups(Vec<GroupNode>),
    /// Leaf record rows (indices into the sorted record set).
    Records(Vec<usize>),
    /// Single-record innermost group: the node row doubles as the record
    /// row, avoiding a redundant twin leaf.
    Collapsed(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupNode {
    /// Display value of the grouping key at this level.
    pub key: String,
    /// Depth index; 0 is the outermost grouping field.
    pub level: usize,
    /// Sanitized composite id derived from the chain of ancestor key values.
    pub id: String,
    pub parent_id: Option<String>,
    /// First bucket at its level (first-of-group styling hook).
    pub first: bool,
    /// Per-total aggregates over every record beneath this node.
    pub aggregates: BTreeMap<String, AggregateValue>,
    /// Distinct descendant values for toggles-up display columns, in
    /// encounter order.
    pub rollups: BTreeMap<String, Vec<String>>,
    pub children: Children,
}

/// Builds the group tree for the configured grouping sequence, sorting the
/// records in place first. An empty sequence builds nothing (ledger or flat
/// mode applies instead).
pub fn build_group_tree(
    records: &mut RecordSet,
    config: &DrillConfig,
    catalog: &FieldCatalog,
) -> Result<Vec<GroupNode>, ConfigError> {
    if config.group_order.is_empty() {
        return Ok(Vec::new());
    }

    let mut group_fields = Vec::with_capacity(config.group_order.len());
    for name in &config.group_order {
        let idx = records
            .field_index(name)
            .ok_or_else(|| ConfigError::UnknownGroupField(name.clone()))?;
        group_fields.push(idx);
    }

    let sort_keys: Vec<SortKey> = config
        .group_order
        .iter()
        .map(|name| SortKey::ascending(name.as_str()))
        .collect();
    sort_records(records, &sort_keys);

    let columns: Vec<TotalColumn> = config
        .totals
        .iter()
        .map(|name| TotalColumn::resolve(records, name, catalog))
        .collect();
    let rollup_fields: Vec<(String, usize)> = config
        .columns
        .iter()
        .filter(|c| catalog.toggles_up(c))
        .filter_map(|c| records.field_index(c).map(|idx| (c.clone(), idx)))
        .collect();

    let rows: Vec<usize> = (0..records.len()).collect();
    Ok(build_level(
        records,
        &rows,
        &group_fields,
        0,
        "",
        None,
        &columns,
        &rollup_fields,
    ))
}

#[allow(clippy::too_many_arguments)]
fn build_level(
    records: &RecordSet,
    rows: &[usize],
    group_fields: &[usize],
    level: usize,
    parent_path: &str,
    parent_id: Option<&str>,
    columns: &[TotalColumn],
    rollup_fields: &[(String, usize)],
) -> Vec<GroupNode> {
    let field = group_fields[level];

    // Partition in encounter order over the already-sorted rows.
    let mut order: Vec<KeyPart> = Vec::new();
    let mut buckets: HashMap<KeyPart, Vec<usize>> = HashMap::new();
    for &row in rows {
        let key = records.value(row, field).to_key_part();
        buckets
            .entry(key.clone())
            .or_insert_with(|| {
                order.push(key.clone());
                Vec::new()
            })
            .push(row);
    }

    let mut nodes = Vec::with_capacity(order.len());
    for (i, key) in order.iter().enumerate() {
        let bucket = &buckets[key];
        let key_display = key.display_string();

        let sanitized = sanitize_id_part(&key_display);
        let path = if parent_path.is_empty() {
            sanitized
        } else {
            format!("{parent_path}_{sanitized}")
        };
        let id = format!("row_{path}");

        let mut aggregates = BTreeMap::new();
        for column in columns {
            aggregates.insert(column.name.clone(), aggregate_rows(records, bucket, column));
        }

        let mut rollups = BTreeMap::new();
        for (name, idx) in rollup_fields {
            rollups.insert(name.clone(), distinct_values(records, bucket, *idx));
        }

        let children = if level + 1 < group_fields.len() {
            Children::Groups(build_level(
                records,
                bucket,
                group_fields,
                level + 1,
                &path,
                Some(id.as_str()),
                columns,
                rollup_fields,
            ))
        } else if let [only] = bucket.as_slice() {
            Children::Collapsed(*only)
        } else {
            Children::Records(bucket.clone())
        };

        nodes.push(GroupNode {
            key: key_display,
            level,
            id,
            parent_id: parent_id.map(str::to_string),
            first: i == 0,
            aggregates,
            rollups,
            children,
        });
    }
    nodes
}

fn distinct_values(records: &RecordSet, rows: &[usize], field: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for &row in rows {
        let value = records.value(row, field).display_string();
        if seen.insert(value.clone()) {
            out.push(value);
        }
    }
    out
}

/// Reduces a key value to the safe identifier alphabet `[A-Za-z0-9_-]`:
/// accents are stripped (NFKD, combining marks dropped), everything else
/// non-alphanumeric becomes `_`.
pub fn sanitize_id_part(value: &str) -> String {
    value
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Clamps a requested collapse/expand level to `[0, depth]`, where `depth`
/// (the grouping sequence length) is the fully-expanded leaf level.
pub fn clamp_drill_level(level: isize, depth: usize) -> usize {
    if level < 0 {
        return 0;
    }
    (level as usize).min(depth)
}

#[cfg(test)]
mod tests {
    use super::*;

    use drilldown_model::{FieldMeta, Scalar};
    use pretty_assertions::assert_eq;

    fn region_records() -> RecordSet {
        RecordSet::new(
            vec!["region".to_string(), "amt".to_string()],
            vec![
                vec!["East".into(), 5.into()],
                vec!["East".into(), 3.into()],
                vec!["West".into(), 2.into()],
            ],
        )
    }

    fn region_config() -> DrillConfig {
        DrillConfig {
            totals: vec!["amt".to_string()],
            group_order: vec!["region".to_string()],
            ..DrillConfig::default()
        }
    }

    fn scalar_aggregate(node: &GroupNode, column: &str) -> f64 {
        match node.aggregates.get(column) {
            Some(AggregateValue::Scalar(n)) => *n,
            other => panic!("expected scalar aggregate, got {other:?}"),
        }
    }

    #[test]
    fn groups_and_aggregates_by_region() {
        let mut records = region_records();
        let tree =
            build_group_tree(&mut records, &region_config(), &FieldCatalog::new()).unwrap();

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].key, "East");
        assert_eq!(scalar_aggregate(&tree[0], "amt"), 8.0);
        assert_eq!(tree[1].key, "West");
        assert_eq!(scalar_aggregate(&tree[1], "amt"), 2.0);

        assert!(tree[0].first);
        assert!(!tree[1].first);
        assert_eq!(tree[0].children, Children::Records(vec![0, 1]));
        // A single-record group at the innermost level collapses.
        assert_eq!(tree[1].children, Children::Collapsed(2));
    }

    #[test]
    fn node_aggregates_equal_the_sum_over_children() {
        let mut records = RecordSet::new(
            vec![
                "warehouse".to_string(),
                "category".to_string(),
                "qty".to_string(),
            ],
            vec![
                vec!["Main".into(), "Tools".into(), 4.into()],
                vec!["Main".into(), "Paint".into(), 6.into()],
                vec!["Annex".into(), "Tools".into(), 1.into()],
                vec!["Main".into(), "Tools".into(), 9.into()],
            ],
        );
        let config = DrillConfig {
            totals: vec!["qty".to_string()],
            group_order: vec!["warehouse".to_string(), "category".to_string()],
            ..DrillConfig::default()
        };
        let tree = build_group_tree(&mut records, &config, &FieldCatalog::new()).unwrap();

        for node in &tree {
            let Children::Groups(children) = &node.children else {
                panic!("level-0 nodes must nest");
            };
            let child_sum: f64 = children.iter().map(|c| scalar_aggregate(c, "qty")).sum();
            assert_eq!(scalar_aggregate(node, "qty"), child_sum);
            for child in children {
                assert_eq!(child.level, 1);
                assert_eq!(child.parent_id.as_deref(), Some(node.id.as_str()));
            }
        }

        let total: f64 = tree.iter().map(|n| scalar_aggregate(n, "qty")).sum();
        assert_eq!(total, 20.0);
    }

    #[test]
    fn buckets_follow_encounter_order_after_sort() {
        let mut records = RecordSet::new(
            vec!["item".to_string()],
            vec![
                vec!["Item 10".into()],
                vec!["Item 2".into()],
                vec!["Item 1".into()],
            ],
        );
        let config = DrillConfig {
            group_order: vec!["item".to_string()],
            ..DrillConfig::default()
        };
        let tree = build_group_tree(&mut records, &config, &FieldCatalog::new()).unwrap();
        let keys: Vec<&str> = tree.iter().map(|n| n.key.as_str()).collect();
        assert_eq!(keys, vec!["Item 1", "Item 2", "Item 10"]);
    }

    #[test]
    fn blank_keys_form_their_own_group() {
        let mut records = RecordSet::new(
            vec!["region".to_string(), "amt".to_string()],
            vec![
                vec!["East".into(), 2.into()],
                vec![Scalar::Blank, 1.into()],
            ],
        );
        let tree =
            build_group_tree(&mut records, &region_config(), &FieldCatalog::new()).unwrap();
        assert_eq!(tree.len(), 2);
        // Blank coerces to "" for sorting, so the blank group surfaces first.
        assert_eq!(tree[0].key, "(blank)");
        assert_eq!(scalar_aggregate(&tree[0], "amt"), 1.0);
        assert_eq!(tree[1].key, "East");
    }

    #[test]
    fn ids_are_sanitized_ancestor_chains() {
        let mut records = RecordSet::new(
            vec!["region".to_string(), "city".to_string()],
            vec![vec!["São Paulo / SP".into(), "Osasco".into()]],
        );
        let config = DrillConfig {
            group_order: vec!["region".to_string(), "city".to_string()],
            ..DrillConfig::default()
        };
        let tree = build_group_tree(&mut records, &config, &FieldCatalog::new()).unwrap();

        assert_eq!(tree[0].id, "row_Sao_Paulo___SP");
        let Children::Groups(children) = &tree[0].children else {
            panic!("expected nested city level");
        };
        assert_eq!(children[0].id, "row_Sao_Paulo___SP_Osasco");
        assert_eq!(children[0].parent_id.as_deref(), Some("row_Sao_Paulo___SP"));
        assert_eq!(tree[0].parent_id, None);
    }

    #[test]
    fn toggles_up_columns_roll_distinct_values_upward() {
        let mut records = RecordSet::new(
            vec!["region".to_string(), "status".to_string(), "amt".to_string()],
            vec![
                vec!["East".into(), "open".into(), 5.into()],
                vec!["East".into(), "closed".into(), 3.into()],
                vec!["East".into(), "open".into(), 1.into()],
            ],
        );
        let mut catalog = FieldCatalog::new();
        catalog.insert(
            "status",
            FieldMeta {
                toggles_up: true,
                ..FieldMeta::default()
            },
        );
        let config = DrillConfig {
            columns: vec!["status".to_string()],
            totals: vec!["amt".to_string()],
            group_order: vec!["region".to_string()],
            ..DrillConfig::default()
        };
        let tree = build_group_tree(&mut records, &config, &catalog).unwrap();
        assert_eq!(
            tree[0].rollups.get("status"),
            Some(&vec!["open".to_string(), "closed".to_string()])
        );
    }

    #[test]
    fn unknown_group_field_is_a_config_error() {
        let mut records = region_records();
        let config = DrillConfig {
            group_order: vec!["reigon".to_string()],
            ..DrillConfig::default()
        };
        assert_eq!(
            build_group_tree(&mut records, &config, &FieldCatalog::new()),
            Err(ConfigError::UnknownGroupField("reigon".to_string()))
        );
    }

    #[test]
    fn empty_group_order_builds_nothing() {
        let mut records = region_records();
        let tree =
            build_group_tree(&mut records, &DrillConfig::default(), &FieldCatalog::new()).unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn drill_levels_clamp_to_the_valid_range() {
        let config = DrillConfig {
            group_order: vec!["warehouse".to_string(), "category".to_string()],
            ..DrillConfig::default()
        };
        assert_eq!(clamp_drill_level(-3, config.depth()), 0);
        assert_eq!(clamp_drill_level(0, config.depth()), 0);
        assert_eq!(clamp_drill_level(2, config.depth()), 2);
        assert_eq!(clamp_drill_level(7, config.depth()), 2);
    }

    #[test]
    fn group_node_serde_roundtrips() {
        let mut records = region_records();
        let tree =
            build_group_tree(&mut records, &region_config(), &FieldCatalog::new()).unwrap();
        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json[0]["key"], "East");
        assert_eq!(json[1]["children"]["type"], "collapsed");
        let decoded: Vec<GroupNode> = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, tree);
    }
}
