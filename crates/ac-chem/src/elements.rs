//! Element abundance tables, canonical ordering, and element selection.

use crate::error::{ChemError, ChemResult};
use tracing::debug;

/// Symbol of the free-electron pseudo-element used for charge balance.
pub const FREE_ELECTRON: &str = "e-";

/// Elements that lead every table, in this relative order.
const LEADING: [&str; 3] = ["H", "He", "O"];

/// Solar reference abundances, log10 on the H = 12 scale.
///
/// Stored already in canonical order.
pub const SOLAR_ABUNDANCES: [(&str, f64); 28] = [
    ("H", 12.00),
    ("He", 10.93),
    ("O", 8.69),
    ("Al", 6.45),
    ("Ar", 6.40),
    ("C", 8.43),
    ("Ca", 6.34),
    ("Cl", 5.50),
    ("Co", 4.99),
    ("Cr", 5.64),
    ("Cu", 4.19),
    ("F", 4.56),
    ("Fe", 7.50),
    ("Ge", 3.65),
    ("K", 5.03),
    ("Mg", 7.60),
    ("Mn", 5.43),
    ("N", 7.83),
    ("Na", 6.24),
    ("Ne", 7.93),
    ("Ni", 6.22),
    ("P", 5.41),
    ("S", 7.12),
    ("Si", 7.51),
    ("Ti", 4.95),
    ("V", 3.93),
    ("Zn", 4.56),
    (FREE_ELECTRON, 13.1139),
];

/// Standard atomic weight [g/mol] for the elements the solar table knows about.
pub fn atomic_weight(symbol: &str) -> Option<f64> {
    let weight = match symbol {
        "H" => 1.008,
        "He" => 4.0026,
        "O" => 15.999,
        "Al" => 26.982,
        "Ar" => 39.948,
        "C" => 12.011,
        "Ca" => 40.078,
        "Cl" => 35.45,
        "Co" => 58.933,
        "Cr" => 51.996,
        "Cu" => 63.546,
        "F" => 18.998,
        "Fe" => 55.845,
        "Ge" => 72.630,
        "K" => 39.098,
        "Mg" => 24.305,
        "Mn" => 54.938,
        "N" => 14.007,
        "Na" => 22.990,
        "Ne" => 20.180,
        "Ni" => 58.693,
        "P" => 30.974,
        "S" => 32.06,
        "Si" => 28.085,
        "Ti" => 47.867,
        "V" => 50.942,
        "Zn" => 65.38,
        FREE_ELECTRON => 5.485_799e-4,
        _ => return None,
    };
    Some(weight)
}

/// Reorder parallel element/abundance sequences into canonical order.
///
/// H, He and O lead (in that order, whichever are present), the free electron
/// goes last, and every other element keeps its input position relative to the rest.
pub fn normalize_order<S: AsRef<str>>(
    elements: &[S],
    abundances: &[f64],
) -> ChemResult<(Vec<String>, Vec<f64>)> {
    if elements.len() != abundances.len() {
        return Err(ChemError::LengthMismatch {
            what: "elements and abundances",
            left: elements.len(),
            right: abundances.len(),
        });
    }

    Ok(canonical_order(elements)
        .into_iter()
        .map(|i| (elements[i].as_ref().to_string(), abundances[i]))
        .unzip())
}

/// Index permutation that puts `elements` into canonical order.
fn canonical_order<S: AsRef<str>>(elements: &[S]) -> Vec<usize> {
    let position = |symbol: &str| elements.iter().position(|e| e.as_ref() == symbol);

    let head: Vec<usize> = LEADING.iter().filter_map(|s| position(s)).collect();
    let tail = position(FREE_ELECTRON);

    let mut order = head.clone();
    order.extend((0..elements.len()).filter(|i| !head.contains(i) && Some(*i) != tail));
    order.extend(tail);
    order
}

/// Ordered (symbol, log10 abundance) table with unique symbols in canonical order.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementTable {
    entries: Vec<(String, f64)>,
}

impl ElementTable {
    /// The built-in solar reference table.
    pub fn solar() -> Self {
        Self {
            entries: SOLAR_ABUNDANCES
                .iter()
                .map(|(s, a)| (s.to_string(), *a))
                .collect(),
        }
    }

    /// Build a table from parallel sequences, normalizing the order.
    ///
    /// Fails on length mismatch or duplicate symbols.
    pub fn from_parallel<S: AsRef<str>>(elements: &[S], abundances: &[f64]) -> ChemResult<Self> {
        let (elements, abundances) = normalize_order(elements, abundances)?;
        for (i, symbol) in elements.iter().enumerate() {
            if elements[..i].contains(symbol) {
                return Err(ChemError::Config {
                    what: format!("duplicate element symbol '{symbol}'"),
                });
            }
        }
        Ok(Self {
            entries: elements.into_iter().zip(abundances).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.entries.iter().map(|(s, a)| (s.as_str(), *a))
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.entries.iter().map(|(s, _)| s.as_str()).collect()
    }

    pub fn abundances(&self) -> Vec<f64> {
        self.entries.iter().map(|(_, a)| *a).collect()
    }

    /// Log abundance of `symbol`, if present.
    pub fn abundance(&self, symbol: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, a)| *a)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.abundance(symbol).is_some()
    }

    /// Keep only the requested elements (see [`select_elements`]).
    pub fn select<S: AsRef<str>>(&self, selection: Option<&[S]>) -> Self {
        select_elements(selection, self)
    }
}

impl Default for ElementTable {
    fn default() -> Self {
        Self::solar()
    }
}

/// Filter `reference` down to the requested symbols.
///
/// `None` returns the reference unchanged. Requested symbols missing from the
/// reference are dropped without error; reference abundances are kept and the
/// result is put back into canonical order.
pub fn select_elements<S: AsRef<str>>(
    selection: Option<&[S]>,
    reference: &ElementTable,
) -> ElementTable {
    let Some(selection) = selection else {
        return reference.clone();
    };

    let mut entries: Vec<(String, f64)> = Vec::with_capacity(selection.len());
    for symbol in selection.iter().map(AsRef::as_ref) {
        if entries.iter().any(|(s, _)| s == symbol) {
            continue;
        }
        match reference.abundance(symbol) {
            Some(abundance) => entries.push((symbol.to_string(), abundance)),
            None => debug!(element = symbol, "dropping element absent from reference table"),
        }
    }

    let symbols: Vec<&str> = entries.iter().map(|(s, _)| s.as_str()).collect();
    let order = canonical_order(&symbols);
    ElementTable {
        entries: order.into_iter().map(|i| entries[i].clone()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixes_scrambled_order() {
        let elements = ["O", "He", "H", "e-", "C", "N"];
        let abundances = [0.01, 0.24, 0.74, 0.05, 0.01, 0.01];

        let (e, a) = normalize_order(&elements, &abundances).unwrap();
        assert_eq!(e, ["H", "He", "O", "C", "N", "e-"]);
        assert_eq!(a, [0.74, 0.24, 0.01, 0.01, 0.01, 0.05]);
    }

    #[test]
    fn canonical_order_unchanged() {
        let elements = ["H", "He", "O", "C", "N"];
        let abundances = [0.74, 0.24, 0.01, 0.01, 0.01];

        let (e, a) = normalize_order(&elements, &abundances).unwrap();
        assert_eq!(e, elements);
        assert_eq!(a, abundances);
    }

    #[test]
    fn missing_leaders_are_skipped() {
        let (e, _) = normalize_order(&["C", "e-", "He", "N"], &[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(e, ["He", "C", "N", "e-"]);
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let err = normalize_order(&["H", "He"], &[1.0]).unwrap_err();
        assert!(matches!(err, ChemError::LengthMismatch { left: 2, right: 1, .. }));
    }

    #[test]
    fn solar_table_is_canonical() {
        let solar = ElementTable::solar();
        let symbols = solar.symbols();
        assert_eq!(&symbols[..3], &["H", "He", "O"]);
        assert_eq!(symbols.last(), Some(&FREE_ELECTRON));

        let renormalized = ElementTable::from_parallel(&symbols, &solar.abundances()).unwrap();
        assert_eq!(renormalized, solar);
    }

    #[test]
    fn every_solar_element_has_a_weight() {
        for (symbol, _) in SOLAR_ABUNDANCES {
            assert!(atomic_weight(symbol).is_some(), "no weight for {symbol}");
        }
        assert_eq!(atomic_weight("Xx"), None);
    }

    #[test]
    fn duplicate_symbols_are_rejected() {
        let err = ElementTable::from_parallel(&["H", "C", "C"], &[12.0, 8.0, 8.1]).unwrap_err();
        assert!(matches!(err, ChemError::Config { .. }));
    }

    #[test]
    fn select_none_returns_reference() {
        let solar = ElementTable::solar();
        assert_eq!(select_elements::<&str>(None, &solar), solar);
    }

    #[test]
    fn select_subset_keeps_reference_values() {
        let solar = ElementTable::solar();
        let picked = solar.select(Some(&["H", "He", "O", "C", "N"][..]));

        assert_eq!(picked.symbols(), ["H", "He", "O", "C", "N"]);
        assert_eq!(picked.abundance("C"), Some(8.43));
        assert_eq!(picked.abundance("N"), Some(7.83));
    }

    #[test]
    fn select_drops_unknown_and_reorders() {
        let solar = ElementTable::solar();
        let picked = solar.select(Some(&["N", "Xx", "O", "e-", "H", "Unobtainium"][..]));
        assert_eq!(picked.symbols(), ["H", "O", "N", "e-"]);
    }
}
