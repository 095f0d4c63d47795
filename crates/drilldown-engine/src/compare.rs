//! Natural string comparison: case-insensitive, accent-insensitive and
//! numeric-aware, so `"Item 2"` orders before `"Item 10"`.
//!
//! This is the base comparator for every multi-key sort in the engine. It is
//! a total order consistent with equality: `Equal` is returned exactly for
//! strings that are equivalent after folding (case and accents ignored,
//! digit runs compared by numeric value).

use std::cmp::Ordering;
use std::iter::Peekable;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Compares two strings under the folded, numeric-aware ordering.
pub fn natural_compare(a: &str, b: &str) -> Ordering {
    if a.is_ascii() && b.is_ascii() {
        return compare_folded(
            a.chars().map(|c| c.to_ascii_uppercase()).peekable(),
            b.chars().map(|c| c.to_ascii_uppercase()).peekable(),
        );
    }
    compare_folded(fold(a).peekable(), fold(b).peekable())
}

/// NFKD-decomposes, strips combining marks (accents) and uppercases.
/// Fullwidth and otherwise decorated digits normalize to ASCII digits here,
/// which is what lets the numeric chunking below see them.
fn fold(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_uppercase)
}

fn compare_folded<I, J>(mut a: Peekable<I>, mut b: Peekable<J>) -> Ordering
where
    I: Iterator<Item = char>,
    J: Iterator<Item = char>,
{
    loop {
        match (a.peek().copied(), b.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                if x.is_ascii_digit() && y.is_ascii_digit() {
                    let ord = compare_digit_runs(&mut a, &mut b);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                } else {
                    a.next();
                    b.next();
                    match x.cmp(&y) {
                        Ordering::Equal => continue,
                        ord => return ord,
                    }
                }
            }
        }
    }
}

/// Consumes one maximal digit run from each side and compares them as
/// integers: leading zeros are ignored, then run length decides, then the
/// digits themselves. Runs of equal numeric value compare equal (`"01"` and
/// `"1"` tie) and the walk continues after them.
fn compare_digit_runs<I, J>(a: &mut Peekable<I>, b: &mut Peekable<J>) -> Ordering
where
    I: Iterator<Item = char>,
    J: Iterator<Item = char>,
{
    let run_a = take_digit_run(a);
    let run_b = take_digit_run(b);

    let digits_a = run_a.trim_start_matches('0');
    let digits_b = run_b.trim_start_matches('0');

    match digits_a.len().cmp(&digits_b.len()) {
        Ordering::Equal => digits_a.cmp(digits_b),
        ord => ord,
    }
}

fn take_digit_run<I>(iter: &mut Peekable<I>) -> String
where
    I: Iterator<Item = char>,
{
    let mut run = String::new();
    while let Some(c) = iter.peek().copied() {
        if !c.is_ascii_digit() {
            break;
        }
        run.push(c);
        iter.next();
    }
    run
}
