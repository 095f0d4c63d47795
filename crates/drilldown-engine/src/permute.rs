//! Bounded permutation enumeration for alternate grouping sequences.

/// Default size of the alternate-ordering menu offered to callers.
pub const PERMUTATION_MENU_LIMIT: usize = 9;

/// Generates up to `limit` distinct permutations of `[0..n)` by in-place
/// backtracking, short-circuiting as soon as the limit is reached rather
/// than enumerating all `n!` candidates.
pub fn generate_permutations(n: usize, limit: usize) -> Vec<Vec<usize>> {
    let mut results = Vec::new();
    if n == 0 || limit == 0 {
        return results;
    }
    let mut items: Vec<usize> = (0..n).collect();
    permute_from(&mut items, 0, limit, &mut results);
    results
}

fn permute_from(items: &mut Vec<usize>, start: usize, limit: usize, out: &mut Vec<Vec<usize>>) {
    if out.len() >= limit {
        return;
    }
    if start + 1 >= items.len() {
        out.push(items.clone());
        return;
    }
    for i in start..items.len() {
        items.swap(start, i);
        permute_from(items, start + 1, limit, out);
        items.swap(start, i);
        if out.len() >= limit {
            return;
        }
    }
}
