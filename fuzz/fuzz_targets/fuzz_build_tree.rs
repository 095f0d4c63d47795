#![no_main]

use libfuzzer_sys::fuzz_target;

use drilldown_engine::{build_group_tree, grand_totals, AggregateValue, Children, GroupNode};
use drilldown_model::{DrillConfig, FieldCatalog, RecordSet, Scalar};

/// Keep record sets small; tree shape, not volume, is what this explores.
const MAX_ROWS: usize = 64;

fn scalar_from(byte: u8) -> Scalar {
    match byte % 4 {
        0 => Scalar::Blank,
        1 => Scalar::Number(f64::from(byte)),
        2 => Scalar::Text(format!("k{}", byte % 7)),
        _ => Scalar::Bool(byte % 2 == 0),
    }
}

fn scalar_sum(node: &GroupNode) -> f64 {
    match node.aggregates.get("amt") {
        Some(AggregateValue::Scalar(n)) => *n,
        _ => 0.0,
    }
}

fn check_consistency(node: &GroupNode) {
    if let Children::Groups(children) = &node.children {
        let child_sum: f64 = children.iter().map(scalar_sum).sum();
        assert!((scalar_sum(node) - child_sum).abs() < 1e-6);
        for child in children {
            check_consistency(child);
        }
    }
}

fuzz_target!(|data: &[u8]| {
    let rows: Vec<Vec<Scalar>> = data
        .chunks(3)
        .take(MAX_ROWS)
        .map(|chunk| {
            let a = chunk.first().copied().unwrap_or(0);
            let b = chunk.get(1).copied().unwrap_or(0);
            let amt = chunk.get(2).copied().unwrap_or(0);
            vec![scalar_from(a), scalar_from(b), Scalar::Number(f64::from(amt))]
        })
        .collect();
    let mut records = RecordSet::new(
        vec!["outer".to_string(), "inner".to_string(), "amt".to_string()],
        rows,
    );

    let config = DrillConfig {
        totals: vec!["amt".to_string()],
        group_order: vec!["outer".to_string(), "inner".to_string()],
        ..DrillConfig::default()
    };
    let catalog = FieldCatalog::new();

    let tree = build_group_tree(&mut records, &config, &catalog)
        .expect("known fields cannot fail resolution");
    for node in &tree {
        check_consistency(node);
    }

    let totals = grand_totals(&records, &config.totals, &catalog);
    let tree_sum: f64 = tree.iter().map(scalar_sum).sum();
    if let Some(AggregateValue::Scalar(total)) = totals.get("amt") {
        assert!((tree_sum - total).abs() < 1e-6);
    }
});
