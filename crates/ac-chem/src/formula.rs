//! Elemental composition of chemical formulas.

use std::collections::BTreeMap;
use std::fmt;

/// Element symbol -> atom count for one formula.
///
/// Two formulas are considered the same species when their compositions are
/// equal, regardless of how the formula was written (`H2O`, `H2O1`, `OH2`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementalComposition {
    counts: BTreeMap<String, u32>,
}

impl ElementalComposition {
    /// Tokenize a formula into element counts.
    ///
    /// An element symbol is an uppercase letter optionally followed by one
    /// lowercase letter; a trailing integer is its count (1 when omitted).
    /// Repeated symbols accumulate. Any other character (charge signs,
    /// parentheses, a bare lowercase letter) is skipped.
    pub fn parse(formula: &str) -> Self {
        let mut counts: BTreeMap<String, u32> = BTreeMap::new();
        let mut chars = formula.chars().peekable();

        while let Some(c) = chars.next() {
            if !c.is_ascii_uppercase() {
                continue;
            }

            let mut symbol = String::from(c);
            if let Some(&next) = chars.peek() {
                if next.is_ascii_lowercase() {
                    symbol.push(next);
                    chars.next();
                }
            }

            let mut digits = String::new();
            while let Some(&d) = chars.peek() {
                if !d.is_ascii_digit() {
                    break;
                }
                digits.push(d);
                chars.next();
            }
            let count = if digits.is_empty() {
                1
            } else {
                digits.parse().unwrap_or(u32::MAX)
            };

            let entry = counts.entry(symbol).or_insert(0);
            *entry = entry.saturating_add(count);
        }

        Self { counts }
    }

    pub fn count(&self, symbol: &str) -> u32 {
        self.counts.get(symbol).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.counts.iter().map(|(s, n)| (s.as_str(), *n))
    }
}

impl fmt::Display for ElementalComposition {
    /// Hill-like rendering with explicit counts, e.g. `C1H4`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (symbol, count) in &self.counts {
            write!(f, "{symbol}{count}")?;
        }
        Ok(())
    }
}

/// Element counts of `formula`.
pub fn element_count(formula: &str) -> ElementalComposition {
    ElementalComposition::parse(formula)
}
