//! Species naming: mapping backend formula labels onto host canonical names.

use crate::formula::ElementalComposition;

/// Canonical names of the active absorbers a retrieval host usually carries
/// cross-sections for. Used when the caller does not provide its own list.
pub const DEFAULT_CANONICAL_SPECIES: [&str; 44] = [
    "H2O", "CO2", "CO", "CH4", "NH3", "HCN", "C2H2", "C2H4", "C2H6", "H2S", "PH3", "SO2", "SO3",
    "OH", "NO", "NO2", "N2O", "O2", "O3", "TiO", "VO", "FeH", "CrH", "MgH", "CaH", "SiO", "AlO",
    "SH", "CS", "CN", "CH", "NH", "HCl", "HF", "KCl", "NaCl", "Na", "K", "Fe", "Ti", "H2", "He",
    "N2", "SiH4",
];

/// Host canonical names paired with their parsed compositions.
#[derive(Debug, Clone)]
pub struct CanonicalCatalog {
    entries: Vec<(String, ElementalComposition)>,
}

impl CanonicalCatalog {
    pub fn new<S: AsRef<str>>(names: &[S]) -> Self {
        Self {
            entries: names
                .iter()
                .map(|n| (n.as_ref().to_string(), ElementalComposition::parse(n.as_ref())))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First canonical name whose composition equals that of `formula`.
    pub fn find(&self, formula: &str) -> Option<&str> {
        let target = ElementalComposition::parse(formula);
        self.entries
            .iter()
            .find(|(_, comp)| *comp == target)
            .map(|(name, _)| name.as_str())
    }

    /// Canonical name for `formula`, or the formula itself when nothing matches.
    pub fn canonical_name(&self, formula: &str) -> String {
        self.find(formula).unwrap_or(formula).to_string()
    }
}

impl Default for CanonicalCatalog {
    fn default() -> Self {
        Self::new(&DEFAULT_CANONICAL_SPECIES)
    }
}

/// Rename each backend species to the first canonical name with the same
/// elemental composition. Unmatched labels pass through; order and length
/// follow `native`.
pub fn reconcile_species<C: AsRef<str>, N: AsRef<str>>(canonical: &[C], native: &[N]) -> Vec<String> {
    let catalog = CanonicalCatalog::new(canonical);
    native
        .iter()
        .map(|label| catalog.canonical_name(label.as_ref()))
        .collect()
}
