#![no_main]

use libfuzzer_sys::fuzz_target;
use std::cmp::Ordering;

/// Bound inputs so folding (NFKD expansion) stays cheap per iteration.
const MAX_SIDE_BYTES: usize = 512;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // First byte picks the split point between the two compared strings.
    let split = 1 + (data[0] as usize) % data.len();
    let (left, right) = data.split_at(split);
    let left = &left[..left.len().min(MAX_SIDE_BYTES)];
    let right = &right[..right.len().min(MAX_SIDE_BYTES)];

    let a = String::from_utf8_lossy(left);
    let b = String::from_utf8_lossy(right);

    let ab = drilldown_engine::natural_compare(&a, &b);
    let ba = drilldown_engine::natural_compare(&b, &a);
    assert_eq!(ab, ba.reverse(), "comparator must be antisymmetric");
    assert_eq!(
        drilldown_engine::natural_compare(&a, &a),
        Ordering::Equal,
        "comparator must be reflexive"
    );

    // The id sanitizer must always land in the safe identifier alphabet.
    let id = drilldown_engine::sanitize_id_part(&a);
    assert!(id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'));
});
