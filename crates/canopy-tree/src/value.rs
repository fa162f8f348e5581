use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A single dataset cell.
///
/// Numbers compare by bit pattern (with `-0.0` folded into `0.0`), so
/// `Value` is a valid hash key and equality is reflexive.
#[derive(Debug, Clone)]
pub enum Value {
    /// A numeric cell.
    Number(f64),
    /// A boolean cell.
    Bool(bool),
    /// Any other cell, kept verbatim.
    Text(String),
}

impl Value {
    /// Infer a typed value from a raw CSV field.
    ///
    /// `true`/`false` in any case become [`Value::Bool`], finite floats become
    /// [`Value::Number`], and everything else (including the empty string)
    /// stays [`Value::Text`].
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("true") {
            return Value::Bool(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return Value::Bool(false);
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Value::Number(n),
            _ => Value::Text(raw.to_string()),
        }
    }

    /// Return the numeric payload, if this is a number.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Return the boolean payload, if this is a boolean.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Return the text payload, if this is text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Return `true` for finite numbers.
    #[must_use]
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(n) if n.is_finite())
    }

    /// Return `true` for booleans.
    #[must_use]
    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }
}

fn number_bits(n: f64) -> u64 {
    if n == 0.0 { 0 } else { n.to_bits() }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => number_bits(*a) == number_bits(*b),
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Number(n) => number_bits(*n).hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Text(s) => s.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

/// Count occurrences of each distinct value, in first-seen order.
pub(crate) fn value_counts<'a>(values: impl Iterator<Item = &'a Value>) -> Vec<(Value, usize)> {
    let mut slots: HashMap<&'a Value, usize> = HashMap::new();
    let mut counts: Vec<(Value, usize)> = Vec::new();
    for value in values {
        match slots.get(value) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                slots.insert(value, counts.len());
                counts.push((value.clone(), 1));
            }
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::{Value, value_counts};

    #[test]
    fn parse_numbers() {
        assert_eq!(Value::parse("85"), Value::Number(85.0));
        assert_eq!(Value::parse(" 71.5 "), Value::Number(71.5));
        assert_eq!(Value::parse("-3e2"), Value::Number(-300.0));
    }

    #[test]
    fn parse_booleans_any_case() {
        assert_eq!(Value::parse("TRUE"), Value::Bool(true));
        assert_eq!(Value::parse("false"), Value::Bool(false));
    }

    #[test]
    fn parse_non_finite_stays_text() {
        assert_eq!(Value::parse("NaN"), Value::Text("NaN".into()));
        assert_eq!(Value::parse("inf"), Value::Text("inf".into()));
        assert_eq!(Value::parse(""), Value::Text(String::new()));
    }

    #[test]
    fn negative_zero_equals_zero() {
        assert_eq!(Value::Number(-0.0), Value::Number(0.0));
    }

    #[test]
    fn variants_never_equal() {
        assert_ne!(Value::Number(1.0), Value::Bool(true));
        assert_ne!(Value::Text("1".into()), Value::Number(1.0));
    }

    #[test]
    fn display_round_trips_through_parse() {
        for v in [Value::Number(85.0), Value::Number(0.25), Value::Bool(true)] {
            assert_eq!(Value::parse(&v.to_string()), v);
        }
    }

    #[test]
    fn counts_keep_first_seen_order() {
        let values: Vec<Value> = ["b", "a", "b", "c", "a", "b"].into_iter().map(Value::from).collect();
        let counts = value_counts(values.iter());
        assert_eq!(
            counts,
            vec![
                (Value::from("b"), 3),
                (Value::from("a"), 2),
                (Value::from("c"), 1),
            ]
        );
    }
}
