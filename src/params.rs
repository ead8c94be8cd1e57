//! Named parameter points and the schemas they are drawn from.

use std::fmt;

use num_rational::Rational64;
use serde::Serialize;

/// Value bound to one free parameter of an algorithm.
///
/// Ordering is what the optimizer uses to break ties: integers and fractions by magnitude,
/// choices by their position in the schema.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ParameterValue {
    Integer(u64),
    Fraction(Rational64),
    Choice { index: usize, label: &'static str },
}

impl ParameterValue {
    pub fn as_integer(&self) -> Option<u64> {
        match self {
            ParameterValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_fraction(&self) -> Option<Rational64> {
        match self {
            ParameterValue::Fraction(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_choice(&self) -> Option<&'static str> {
        match self {
            ParameterValue::Choice { label, .. } => Some(label),
            _ => None,
        }
    }
}

impl From<u64> for ParameterValue {
    fn from(value: u64) -> Self {
        ParameterValue::Integer(value)
    }
}

impl From<Rational64> for ParameterValue {
    fn from(value: Rational64) -> Self {
        ParameterValue::Fraction(value)
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Integer(v) => write!(f, "{}", v),
            ParameterValue::Fraction(v) => write!(f, "{}", v),
            ParameterValue::Choice { label, .. } => write!(f, "{}", label),
        }
    }
}

/// An ordered assignment of values to named parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ParameterPoint {
    entries: Vec<(&'static str, ParameterValue)>,
}

impl ParameterPoint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &'static str, value: impl Into<ParameterValue>) -> Self {
        self.push(name, value.into());
        self
    }

    /// Convenience for choice-valued parameters given by label; the index is resolved when the
    /// point is checked against a schema.
    pub fn with_choice(mut self, name: &'static str, label: &'static str) -> Self {
        self.push(name, ParameterValue::Choice { index: 0, label });
        self
    }

    pub fn push(&mut self, name: &'static str, value: ParameterValue) {
        self.entries.push((name, value));
    }

    pub fn pop(&mut self) -> Option<(&'static str, ParameterValue)> {
        self.entries.pop()
    }

    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    pub fn integer(&self, name: &str) -> Option<u64> {
        self.get(name).and_then(ParameterValue::as_integer)
    }

    pub fn fraction(&self, name: &str) -> Option<Rational64> {
        self.get(name).and_then(ParameterValue::as_fraction)
    }

    pub fn choice(&self, name: &str) -> Option<&'static str> {
        self.get(name).and_then(ParameterValue::as_choice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(&'static str, ParameterValue)> {
        self.entries.iter()
    }
}

impl fmt::Display for ParameterPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", name, value)?;
        }
        Ok(())
    }
}

/// Per-parameter domain. Bounds are inclusive; an inverted range is an empty domain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Domain {
    Integer { min: u64, max: u64 },
    /// The fractions `k / denominator` for `min_numerator ≤ k ≤ max_numerator`.
    Fraction {
        denominator: i64,
        min_numerator: i64,
        max_numerator: i64,
    },
    Choice(&'static [&'static str]),
}

impl Domain {
    pub fn len(&self) -> usize {
        match self {
            Domain::Integer { min, max } => max
                .checked_sub(*min)
                .map_or(0, |span| span.saturating_add(1) as usize),
            Domain::Fraction {
                denominator,
                min_numerator,
                max_numerator,
            } => {
                if *denominator <= 0 || max_numerator < min_numerator {
                    0
                } else {
                    (max_numerator - min_numerator + 1) as usize
                }
            }
            Domain::Choice(labels) => labels.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Domain values in ascending order.
    pub fn values(&self) -> Vec<ParameterValue> {
        if self.is_empty() {
            return Vec::new();
        }
        match self {
            Domain::Integer { min, max } => (*min..=*max).map(ParameterValue::Integer).collect(),
            Domain::Fraction {
                denominator,
                min_numerator,
                max_numerator,
            } => (*min_numerator..=*max_numerator)
                .map(|k| ParameterValue::Fraction(Rational64::new(k, *denominator)))
                .collect(),
            Domain::Choice(labels) => labels
                .iter()
                .enumerate()
                .map(|(index, label)| ParameterValue::Choice { index, label })
                .collect(),
        }
    }

    /// Canonical form of `value` inside this domain, if it belongs to it.
    pub fn canonicalize(&self, value: &ParameterValue) -> Option<ParameterValue> {
        match (self, value) {
            (Domain::Integer { min, max }, ParameterValue::Integer(v)) => {
                (min <= v && v <= max).then_some(ParameterValue::Integer(*v))
            }
            (
                Domain::Fraction {
                    denominator,
                    min_numerator,
                    max_numerator,
                },
                ParameterValue::Fraction(v),
            ) => {
                if *denominator <= 0 {
                    return None;
                }
                let scaled = v * Rational64::from_integer(*denominator);
                let numerator = scaled.to_integer();
                (scaled.is_integer() && *min_numerator <= numerator && numerator <= *max_numerator)
                    .then_some(ParameterValue::Fraction(*v))
            }
            (Domain::Choice(labels), ParameterValue::Choice { label, .. }) => labels
                .iter()
                .position(|l| l == label)
                .map(|index| ParameterValue::Choice {
                    index,
                    label: labels[index],
                }),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub domain: Domain,
}

/// Ordered free parameters of an algorithm. Lexicographic order over points follows the
/// declaration order here.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParameterSchema {
    specs: Vec<ParameterSpec>,
}

impl ParameterSchema {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &'static str, domain: Domain) -> Self {
        self.specs.push(ParameterSpec { name, domain });
        self
    }

    pub fn specs(&self) -> &[ParameterSpec] {
        &self.specs
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.specs.iter().map(|s| s.name).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Number of points in the full grid, saturating.
    pub fn grid_size(&self) -> usize {
        self.specs
            .iter()
            .fold(1usize, |acc, s| acc.saturating_mul(s.domain.len()))
    }

    /// Reorders `point` into schema order and checks every value against its domain.
    pub fn canonicalize(&self, point: &ParameterPoint) -> Result<ParameterPoint, String> {
        if point.len() != self.specs.len() {
            return Err(format!(
                "expected parameters [{}], got [{}]",
                self.names().join(", "),
                point
            ));
        }
        let mut canonical = ParameterPoint::new();
        for spec in &self.specs {
            let value = point
                .get(spec.name)
                .ok_or_else(|| format!("missing parameter {}", spec.name))?;
            let value = spec
                .domain
                .canonicalize(value)
                .ok_or_else(|| format!("{} = {} outside its domain", spec.name, value))?;
            canonical.push(spec.name, value);
        }
        Ok(canonical)
    }
}
