//! End-to-end tests of the chemistry facade.
//!
//! The frozen-speciation backend stands in for the native engine, so values are
//! checked for physical plausibility rather than equilibrium accuracy.

use ac_chem::{
    ChemError, ChemResult, ChemistryConfig, DEFAULT_CANONICAL_SPECIES, EquilibriumBackend,
    EquilibriumChemistry, EquilibriumSession, FrozenSpeciationBackend, FrozenSpeciationSession,
    SolverInput, SolverOutput, SolverParameters, SolverStatus,
};
use std::cell::{Cell, RefCell};
use std::path::Path;
use std::rc::Rc;
use tempfile::TempDir;

const HHE_OCN: [&str; 5] = ["H", "He", "O", "C", "N"];

/// A data directory holding empty logK datasets.
fn data_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    for name in ["logK_wo_ions.dat", "logK.dat", "logK_extended.dat"] {
        std::fs::write(dir.path().join(name), "").unwrap();
    }
    dir
}

fn config(dir: &TempDir) -> ChemistryConfig {
    ChemistryConfig {
        data_dir: dir.path().to_path_buf(),
        ..Default::default()
    }
}

fn frozen(config: &ChemistryConfig) -> ChemResult<EquilibriumChemistry<FrozenSpeciationSession>> {
    EquilibriumChemistry::new(&FrozenSpeciationBackend, config, &DEFAULT_CANONICAL_SPECIES)
}

fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    let step = (stop - start) / (n - 1) as f64;
    (0..n).map(|i| start + step * i as f64).collect()
}

#[test]
fn default_construction_has_gases() {
    let dir = data_dir();
    let chem = frozen(&config(&dir)).unwrap();
    assert!(!chem.gases().is_empty());
    assert!(chem.mix_profile().is_none());
}

#[test]
fn selection_reduces_gases() {
    let dir = data_dir();
    let all = frozen(&config(&dir)).unwrap();
    let some = frozen(&config(&dir).with_selected_elements(&HHE_OCN)).unwrap();

    assert!(!some.gases().is_empty());
    assert!(all.gases().len() > some.gases().len());
    assert_eq!(some.gases(), ["H2", "He", "H2O", "CH4", "NH3"]);
}

#[test]
fn logk_variants_construct() {
    let dir = data_dir();
    let variants = [(false, false), (true, false), (false, true), (true, true)];
    let gases: Vec<Vec<String>> = variants
        .iter()
        .map(|&(with_ions, extended_logk)| {
            let cfg = ChemistryConfig {
                with_ions,
                extended_logk,
                ..config(&dir)
            };
            frozen(&cfg).unwrap().gases().to_vec()
        })
        .collect();

    assert!(gases.iter().all(|g| !g.is_empty()));
    assert_eq!(gases[2], gases[3]);
}

#[test]
fn ratio_elements_override_baseline() {
    let dir = data_dir();
    let chem = frozen(&config(&dir).with_ratios(&["C", "N"], &[0.1, 0.2])).unwrap();

    assert_eq!(chem.ratio("C"), Some(0.1));
    assert_eq!(chem.ratio("N"), Some(0.2));
}

#[test]
fn metallicity_parameter_roundtrip() {
    let dir = data_dir();
    let mut chem = frozen(&config(&dir).with_metallicity(0.1)).unwrap();

    assert_eq!(chem.metallicity(), 0.1);
    chem.set_metallicity(0.2).unwrap();
    assert_eq!(chem.metallicity(), 0.2);
    assert_eq!(chem.get_param("metallicity").unwrap(), 0.2);

    chem.set_param("metallicity", 0.3).unwrap();
    assert_eq!(chem.metallicity(), 0.3);
}

#[test]
fn ratio_parameters_are_independent() {
    let dir = data_dir();
    let mut chem = frozen(&config(&dir).with_ratios(&["C", "N"], &[0.1, 0.2])).unwrap();

    let names = chem.fit_params().names();
    for expected in ["C_O_ratio", "N_O_ratio", "S_O_ratio"] {
        assert!(names.contains(&expected), "missing {expected}");
    }

    assert_eq!(chem.get_param("C_O_ratio").unwrap(), 0.1);
    assert_eq!(chem.get_param("N_O_ratio").unwrap(), 0.2);

    chem.set_param("C_O_ratio", 0.3).unwrap();
    assert_eq!(chem.ratio("C"), Some(0.3));
    assert_eq!(chem.get_param("C_O_ratio").unwrap(), 0.3);
    assert_eq!(chem.ratio("N"), Some(0.2));

    let elements: Vec<String> = chem.state().ratios().elements().map(str::to_string).collect();
    let mut written = Vec::new();
    for (i, element) in elements.iter().enumerate() {
        let name = format!("{element}_O_ratio");
        chem.set_param(&name, 0.01 + 0.03 * i as f64).unwrap();
        written.push(chem.get_param(&name).unwrap());
    }
    for (element, value) in elements.iter().zip(&written) {
        assert_eq!(chem.ratio(element), Some(*value));
    }
}

#[test]
fn unknown_parameter_is_an_error() {
    let dir = data_dir();
    let mut chem = frozen(&config(&dir)).unwrap();
    assert!(matches!(
        chem.get_param("Xx_O_ratio"),
        Err(ChemError::UnknownParameter { .. })
    ));
    assert!(chem.set_param("bogus", 1.0).is_err());
}

#[test]
fn compute_profiles() {
    let dir = data_dir();
    let mut chem = frozen(&config(&dir).with_selected_elements(&HHE_OCN)).unwrap();

    let temperature = linspace(2000.0, 1000.0, 10);
    let pressure = linspace(1e6, 1e-4, 10);
    chem.initialize_chemistry(&temperature, &pressure).unwrap();

    let mix = chem.mix_profile().unwrap();
    assert_eq!(mix.shape(), (chem.gases().len(), 10));
    for column in mix.column_iter() {
        assert!((column.sum() - 1.0).abs() < 1e-9);
    }

    let mu = chem.mu_profile().unwrap();
    assert_eq!(mu.len(), 10);
    for amu in mu.iter().map(|m| m * 6.022e26) {
        assert!((amu - 2.3).abs() < 0.15, "mu = {amu} amu");
    }
    assert_eq!(chem.last_status(), Some(SolverStatus::Success));
}

#[test]
fn mismatched_profiles_rejected() {
    let dir = data_dir();
    let mut chem = frozen(&config(&dir).with_selected_elements(&HHE_OCN)).unwrap();
    let err = chem.initialize_chemistry(&[1000.0, 900.0], &[1e5]).unwrap_err();
    assert!(matches!(err, ChemError::InvalidArg { .. }));
    assert!(chem.mix_profile().is_none());
}

#[test]
fn construction_errors() {
    let dir = data_dir();

    let ratios = config(&dir).with_ratios(&["C", "N"], &[0.1]);
    assert!(matches!(frozen(&ratios).unwrap_err(), ChemError::LengthMismatch { .. }));

    let missing = config(&dir).with_species_datafile("/no/such/logK.dat");
    assert!(matches!(frozen(&missing).unwrap_err(), ChemError::MissingFile { .. }));

    let no_oxygen = config(&dir).with_selected_elements(&["H", "He", "C"]);
    assert!(matches!(frozen(&no_oxygen).unwrap_err(), ChemError::Config { .. }));

    let abundances = ChemistryConfig {
        elements_abundance_file: Some(Path::new("/no/such/abund.dat").to_path_buf()),
        ..config(&dir)
    };
    assert!(matches!(frozen(&abundances).unwrap_err(), ChemError::MissingFile { .. }));
}

/// Records every abundance vector and solver input it sees; fails or
/// drops mean molecular weights on demand.
#[derive(Debug)]
struct RecordingSession {
    inner: FrozenSpeciationSession,
    pushed: Rc<RefCell<Vec<Vec<f64>>>>,
    inputs: Rc<RefCell<Vec<SolverInput>>>,
    fail: Rc<Cell<bool>>,
    short_mu: Rc<Cell<bool>>,
    configured: Rc<Cell<Option<SolverParameters>>>,
}

impl EquilibriumSession for RecordingSession {
    fn element_count(&self) -> usize {
        self.inner.element_count()
    }
    fn element_symbol(&self, index: usize) -> Option<&str> {
        self.inner.element_symbol(index)
    }
    fn element_abundance(&self, index: usize) -> Option<f64> {
        self.inner.element_abundance(index)
    }
    fn gas_species_count(&self) -> usize {
        self.inner.gas_species_count()
    }
    fn gas_species_symbol(&self, index: usize) -> Option<&str> {
        self.inner.gas_species_symbol(index)
    }
    fn set_element_abundances(&mut self, abundances: &[f64]) -> ChemResult<()> {
        self.pushed.borrow_mut().push(abundances.to_vec());
        self.inner.set_element_abundances(abundances)
    }
    fn configure(&mut self, params: &SolverParameters) {
        self.configured.set(Some(*params));
    }
    fn calc_densities(
        &mut self,
        input: &SolverInput,
        output: &mut SolverOutput,
    ) -> ChemResult<SolverStatus> {
        self.inputs.borrow_mut().push(input.clone());
        if self.fail.get() {
            return Err(ChemError::Backend {
                message: "engine crashed".into(),
            });
        }
        let status = self.inner.calc_densities(input, output)?;
        if self.short_mu.get() {
            output.mean_molecular_weight.pop();
        }
        Ok(status)
    }
}

#[derive(Default)]
struct RecordingBackend {
    pushed: Rc<RefCell<Vec<Vec<f64>>>>,
    inputs: Rc<RefCell<Vec<SolverInput>>>,
    fail: Rc<Cell<bool>>,
    short_mu: Rc<Cell<bool>>,
    configured: Rc<Cell<Option<SolverParameters>>>,
}

impl EquilibriumBackend for RecordingBackend {
    type Session = RecordingSession;

    fn name(&self) -> &str {
        "recording"
    }

    fn construct(
        &self,
        abundance_file: &Path,
        species_datafile: &Path,
        verbosity: u32,
    ) -> ChemResult<RecordingSession> {
        Ok(RecordingSession {
            inner: FrozenSpeciationBackend.construct(abundance_file, species_datafile, verbosity)?,
            pushed: Rc::clone(&self.pushed),
            inputs: Rc::clone(&self.inputs),
            fail: Rc::clone(&self.fail),
            short_mu: Rc::clone(&self.short_mu),
            configured: Rc::clone(&self.configured),
        })
    }
}

#[test]
fn doubling_metallicity_doubles_metals() {
    let dir = data_dir();
    let backend = RecordingBackend::default();
    let mut chem = EquilibriumChemistry::new(
        &backend,
        &config(&dir).with_selected_elements(&HHE_OCN),
        &DEFAULT_CANONICAL_SPECIES,
    )
    .unwrap();

    chem.initialize_chemistry(&[1500.0], &[1e5]).unwrap();
    chem.set_param("metallicity", 2.0).unwrap();
    chem.initialize_chemistry(&[1500.0], &[1e5]).unwrap();

    let pushed = backend.pushed.borrow();
    assert_eq!(pushed.len(), 2);
    let (before, after) = (&pushed[0], &pushed[1]);
    assert_eq!(before[0], 1.0);
    assert_eq!(before[0], after[0]);
    assert_eq!(before[1], after[1]);
    for i in 2..before.len() {
        assert!((after[i] / before[i] - 2.0).abs() < 1e-12);
    }
    assert_eq!(chem.last_abundances(), after.as_slice());
}

#[test]
fn solver_parameters_are_forwarded() {
    let dir = data_dir();
    let backend = RecordingBackend::default();
    let mut cfg = config(&dir).with_selected_elements(&HHE_OCN);
    cfg.solver.max_chem_iter = 1000;
    EquilibriumChemistry::new(&backend, &cfg, &DEFAULT_CANONICAL_SPECIES).unwrap();

    let forwarded = backend.configured.get().unwrap();
    assert_eq!(forwarded.max_chem_iter, 1000);
    assert_eq!(forwarded.max_press_iter, 100);
}

#[test]
fn failed_solve_keeps_previous_profiles() {
    let dir = data_dir();
    let backend = RecordingBackend::default();
    let mut chem = EquilibriumChemistry::new(
        &backend,
        &config(&dir).with_selected_elements(&HHE_OCN),
        &DEFAULT_CANONICAL_SPECIES,
    )
    .unwrap();

    chem.initialize_chemistry(&[1500.0, 1000.0], &[1e5, 1e3]).unwrap();
    let mix = chem.mix_profile().unwrap().clone();
    let mu = chem.mu_profile().unwrap().clone();

    backend.fail.set(true);
    chem.set_param("metallicity", 1.5).unwrap();
    let err = chem.initialize_chemistry(&[1200.0], &[1e4]).unwrap_err();
    assert!(matches!(err, ChemError::Backend { .. }));

    assert_eq!(chem.mix_profile().unwrap(), &mix);
    assert_eq!(chem.mu_profile().unwrap(), &mu);
}

fn recording(
    backend: &RecordingBackend,
    dir: &TempDir,
) -> EquilibriumChemistry<RecordingSession> {
    EquilibriumChemistry::new(
        backend,
        &config(dir).with_selected_elements(&HHE_OCN),
        &DEFAULT_CANONICAL_SPECIES,
    )
    .unwrap()
}

#[test]
fn backend_receives_bar_and_kelvin_gas_phase_input() {
    let dir = data_dir();
    let backend = RecordingBackend::default();
    let mut chem = recording(&backend, &dir);

    chem.initialize_chemistry(&[1500.0, 900.0], &[1e5, 3.3e3]).unwrap();

    let inputs = backend.inputs.borrow();
    assert_eq!(inputs.len(), 1);
    let input = &inputs[0];
    assert_eq!(input.temperature, [1500.0, 900.0]);
    assert_eq!(input.pressure.len(), 2);
    assert!((input.pressure[0] - 1.0).abs() < 1e-12);
    assert!((input.pressure[1] - 0.033).abs() < 1e-12);
    assert!(!input.equilibrium_condensation);
    assert!(!input.rainout_condensation);
}

#[test]
fn short_mean_molecular_weight_is_rejected() {
    let dir = data_dir();
    let backend = RecordingBackend::default();
    let mut chem = recording(&backend, &dir);

    backend.short_mu.set(true);
    let err = chem.initialize_chemistry(&[1500.0, 1000.0], &[1e5, 1e3]).unwrap_err();
    assert!(matches!(err, ChemError::Backend { .. }));
    assert!(chem.mix_profile().is_none());
    assert!(chem.mu_profile().is_none());
    assert!(chem.last_output().is_none());
}

#[test]
fn facade_setters_reject_non_positive_values() {
    let dir = data_dir();
    let mut chem = frozen(&config(&dir).with_selected_elements(&HHE_OCN)).unwrap();

    assert!(chem.set_metallicity(0.0).is_err());
    assert!(chem.set_h_he_ratio(-0.1).is_err());
    assert!(chem.set_param("metallicity", f64::NAN).is_err());
    assert!(chem.set_param("C_O_ratio", -1.0).is_err());
    assert_eq!(chem.metallicity(), 1.0);
}
