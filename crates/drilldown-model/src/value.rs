use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Scalar value held by a record cell.
///
/// This is the canonical serde format for record data and engine output
/// payloads: a tagged enum in the shape `{ "type": "...", "value": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum Scalar {
    Blank,
    Number(f64),
    /// A calendar date coming from source data.
    ///
    /// Kept typed so ledger sorting and grouping can compare dates as dates;
    /// hosts convert to their own display form in the rendering layer.
    Date(NaiveDate),
    Text(String),
    Bool(bool),
}

impl Scalar {
    /// Returns a canonical bit pattern for numeric grouping keys.
    ///
    /// `0.0` and `-0.0` group as the same item, and all NaN payloads are
    /// treated as the same item.
    pub fn canonical_number_bits(n: f64) -> u64 {
        if n == 0.0 {
            return 0.0_f64.to_bits();
        }
        if n.is_nan() {
            return f64::NAN.to_bits();
        }
        n.to_bits()
    }

    /// Converts this value into a typed key part suitable for grouping and
    /// sorting. A blank cell forms its own distinct group key.
    pub fn to_key_part(&self) -> KeyPart {
        match self {
            Scalar::Blank => KeyPart::Blank,
            Scalar::Number(n) => KeyPart::Number(Self::canonical_number_bits(*n)),
            Scalar::Date(d) => KeyPart::Date(*d),
            Scalar::Text(s) => KeyPart::Text(s.clone()),
            Scalar::Bool(b) => KeyPart::Bool(*b),
        }
    }

    /// Returns a display-oriented string for this value (not a stable
    /// serialization). Blanks display as the empty string.
    pub fn display_string(&self) -> String {
        match self {
            Scalar::Blank => String::new(),
            Scalar::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            Scalar::Date(d) => d.to_string(),
            Scalar::Text(s) => s.clone(),
            Scalar::Bool(b) => {
                if *b {
                    "TRUE".to_string()
                } else {
                    "FALSE".to_string()
                }
            }
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric coercion used by aggregation: numbers as-is, numeric text
    /// parses, booleans count as 0/1. Dates and blanks are non-numeric, and
    /// callers treat `None` as a zero contribution.
    pub fn coerce_number(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => Some(*n),
            Scalar::Text(s) => s.trim().parse::<f64>().ok(),
            Scalar::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Scalar::Blank | Scalar::Date(_) => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Scalar::Blank)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Number(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Number(f64::from(value))
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

/// Typed grouping/bucketing key derived from a [`Scalar`].
///
/// Numbers are stored through their canonical bit pattern so keys are
/// hashable; text keys compare case-insensitively with a deterministic
/// case-sensitive tiebreak so the ordering stays total.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum KeyPart {
    Blank,
    Number(u64),
    Date(NaiveDate),
    Text(String),
    Bool(bool),
}

fn cmp_text_case_insensitive(a: &str, b: &str) -> Ordering {
    if a.is_ascii() && b.is_ascii() {
        return cmp_ascii_case_insensitive(a, b);
    }

    let mut a_iter = a.chars().flat_map(|c| c.to_uppercase());
    let mut b_iter = b.chars().flat_map(|c| c.to_uppercase());
    loop {
        match (a_iter.next(), b_iter.next()) {
            (Some(ac), Some(bc)) => match ac.cmp(&bc) {
                Ordering::Equal => continue,
                ord => return ord,
            },
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (None, None) => return Ordering::Equal,
        }
    }
}

fn cmp_ascii_case_insensitive(a: &str, b: &str) -> Ordering {
    let mut a_iter = a.as_bytes().iter();
    let mut b_iter = b.as_bytes().iter();
    loop {
        match (a_iter.next(), b_iter.next()) {
            (Some(&ac), Some(&bc)) => {
                let ac = ac.to_ascii_uppercase();
                let bc = bc.to_ascii_uppercase();
                match ac.cmp(&bc) {
                    Ordering::Equal => continue,
                    ord => return ord,
                }
            }
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (None, None) => return Ordering::Equal,
        }
    }
}

impl KeyPart {
    fn kind_rank(&self) -> u8 {
        match self {
            KeyPart::Number(_) => 0,
            KeyPart::Date(_) => 1,
            KeyPart::Text(_) => 2,
            KeyPart::Bool(_) => 3,
            KeyPart::Blank => 4,
        }
    }

    /// Human-friendly string representation of a group key.
    ///
    /// Blank keys render as a literal `"(blank)"` label rather than an empty
    /// cell, so a null-keyed group stays visible and addressable.
    pub fn display_string(&self) -> String {
        match self {
            KeyPart::Blank => "(blank)".to_string(),
            KeyPart::Number(bits) => Scalar::Number(f64::from_bits(*bits)).display_string(),
            KeyPart::Date(d) => d.to_string(),
            KeyPart::Text(s) => s.clone(),
            KeyPart::Bool(b) => {
                if *b {
                    "TRUE".to_string()
                } else {
                    "FALSE".to_string()
                }
            }
        }
    }
}

impl PartialOrd for KeyPart {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for KeyPart {
    fn cmp(&self, other: &Self) -> Ordering {
        let rank_cmp = self.kind_rank().cmp(&other.kind_rank());
        if rank_cmp != Ordering::Equal {
            // Fixed cross-type ordering: numbers/dates, then text, then
            // booleans, blanks last, regardless of sort direction.
            return rank_cmp;
        }

        match (self, other) {
            (KeyPart::Blank, KeyPart::Blank) => Ordering::Equal,
            (KeyPart::Number(a), KeyPart::Number(b)) => {
                let a = f64::from_bits(*a);
                let b = f64::from_bits(*b);
                a.total_cmp(&b)
            }
            (KeyPart::Date(a), KeyPart::Date(b)) => a.cmp(b),
            (KeyPart::Text(a), KeyPart::Text(b)) => {
                let ord = cmp_text_case_insensitive(a, b);
                if ord != Ordering::Equal {
                    ord
                } else {
                    a.cmp(b)
                }
            }
            (KeyPart::Bool(a), KeyPart::Bool(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}
