//! Fitting parameters exposed to an external optimizer.
//!
//! Each parameter is a named, bounded scalar with a getter and a setter that
//! act on an [`AbundanceState`]. The registry is built once per chemistry
//! instance and keeps registration order.

use crate::error::{ChemError, ChemResult};
use crate::ratios::AbundanceState;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bounds of every `<element>_O_ratio` parameter.
pub const RATIO_BOUNDS: (f64, f64) = (1e-12, 0.1);

/// Default metallicity bounds.
pub const DEFAULT_METALLICITY_BOUNDS: (f64, f64) = (0.2, 2.0);

/// Bounds of the He/H parameter.
pub const H_HE_BOUNDS: (f64, f64) = (0.01, 1.0);

pub const METALLICITY_PARAM: &str = "metallicity";
pub const H_HE_PARAM: &str = "h_he_ratio";

/// How the optimizer should sample a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamScale {
    #[default]
    Linear,
    Log,
}

impl ParamScale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Log => "log",
        }
    }
}

impl fmt::Display for ParamScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type ParamGetter = Box<dyn Fn(&AbundanceState) -> f64 + Send + Sync>;
pub type ParamSetter = Box<dyn Fn(&mut AbundanceState, f64) -> ChemResult<()> + Send + Sync>;

/// One fitting parameter.
pub struct FitParam {
    name: String,
    latex: String,
    description: String,
    getter: ParamGetter,
    setter: ParamSetter,
    scale: ParamScale,
    default_fit: bool,
    bounds: (f64, f64),
}

impl FitParam {
    pub fn new(
        name: impl Into<String>,
        latex: impl Into<String>,
        getter: ParamGetter,
        setter: ParamSetter,
        scale: ParamScale,
        default_fit: bool,
        bounds: (f64, f64),
    ) -> Self {
        let name = name.into();
        Self {
            description: name.clone(),
            name,
            latex: latex.into(),
            getter,
            setter,
            scale,
            default_fit,
            bounds,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn latex(&self) -> &str {
        &self.latex
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn scale(&self) -> ParamScale {
        self.scale
    }

    pub fn default_fit(&self) -> bool {
        self.default_fit
    }

    pub fn bounds(&self) -> (f64, f64) {
        self.bounds
    }

    pub fn get(&self, state: &AbundanceState) -> f64 {
        (self.getter)(state)
    }

    pub fn set(&self, state: &mut AbundanceState, value: f64) -> ChemResult<()> {
        (self.setter)(state, value)
    }
}

impl fmt::Debug for FitParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FitParam")
            .field("name", &self.name)
            .field("latex", &self.latex)
            .field("scale", &self.scale)
            .field("default_fit", &self.default_fit)
            .field("bounds", &self.bounds)
            .finish_non_exhaustive()
    }
}

/// Metallicity, bound directly to the state's metallicity scalar.
pub fn metallicity_param(bounds: (f64, f64), scale: ParamScale, default_fit: bool) -> FitParam {
    FitParam::new(
        METALLICITY_PARAM,
        "Z",
        Box::new(|state| state.metallicity()),
        Box::new(|state, value| state.set_metallicity(value)),
        scale,
        default_fit,
        bounds,
    )
    .with_description("Metallicity scaling of O and every ratio element")
}

/// He abundance relative to H.
pub fn h_he_param() -> FitParam {
    FitParam::new(
        H_HE_PARAM,
        "He/H",
        Box::new(|state| state.h_he_ratio()),
        Box::new(|state, value| state.set_h_he_ratio(value)),
        ParamScale::Linear,
        false,
        H_HE_BOUNDS,
    )
    .with_description("He/H ratio")
}

/// `<element>_O_ratio`, bound to that element's entry only.
pub fn ratio_param(element: &str) -> FitParam {
    let read_key = element.to_string();
    let write_key = element.to_string();
    FitParam::new(
        format!("{element}_O_ratio"),
        format!("[{element}/O]"),
        Box::new(move |state| state.ratio(&read_key).unwrap_or(f64::NAN)),
        Box::new(move |state, value| state.set_ratio(&write_key, value)),
        ParamScale::Log,
        false,
        RATIO_BOUNDS,
    )
    .with_description(format!("{element}/O ratio"))
}

/// Ordered name -> parameter registry.
#[derive(Debug, Default)]
pub struct FitParamRegistry {
    params: Vec<FitParam>,
}

impl FitParamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metallicity, He/H (only when He is in the session), then one ratio
    /// parameter per ratio element of `state`.
    pub fn for_state(
        state: &AbundanceState,
        metallicity_bounds: (f64, f64),
        metallicity_scale: ParamScale,
    ) -> ChemResult<Self> {
        let mut registry = Self::new();
        registry.register(metallicity_param(metallicity_bounds, metallicity_scale, false))?;
        if state.elements().iter().any(|e| e == "He") {
            registry.register(h_he_param())?;
        }
        for element in state.ratios().elements() {
            registry.register(ratio_param(element))?;
        }
        Ok(registry)
    }

    /// Add a parameter. Names must be unique.
    pub fn register(&mut self, param: FitParam) -> ChemResult<()> {
        if self.contains(param.name()) {
            return Err(ChemError::Config {
                what: format!("fitting parameter '{}' registered twice", param.name()),
            });
        }
        self.params.push(param);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&FitParam> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Like [`get`](Self::get), but unknown names are an error.
    pub fn require(&self, name: &str) -> ChemResult<&FitParam> {
        self.get(name).ok_or_else(|| ChemError::UnknownParameter {
            name: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> Vec<&str> {
        self.params.iter().map(|p| p.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FitParam> + '_ {
        self.params.iter()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::ratios::RatioOverrides;
    use crate::elements::ElementTable;
    use ac_core::log_abundance_to_linear;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn writes_stay_isolated(values in prop::collection::vec(0.01_f64..0.99, 24)) {
            let solar = ElementTable::solar();
            let elements: Vec<String> = solar.symbols().iter().map(|s| s.to_string()).collect();
            let baseline: Vec<f64> = solar.abundances().into_iter().map(log_abundance_to_linear).collect();
            let mut state = AbundanceState::new(&elements, &baseline, None, 1.0, RatioOverrides::default()).unwrap();
            let registry = FitParamRegistry::for_state(&state, DEFAULT_METALLICITY_BOUNDS, ParamScale::Linear).unwrap();

            let ratio_elements: Vec<String> = state.ratios().elements().map(str::to_string).collect();
            prop_assert_eq!(ratio_elements.len(), 24);

            let mut written = Vec::new();
            for (element, value) in ratio_elements.iter().zip(&values) {
                let param = registry.require(&format!("{element}_O_ratio")).unwrap();
                param.set(&mut state, *value).unwrap();
                written.push(param.get(&state));
            }

            for (element, value) in ratio_elements.iter().zip(&written) {
                prop_assert_eq!(state.ratio(element), Some(*value));
                let param = registry.require(&format!("{element}_O_ratio")).unwrap();
                prop_assert_eq!(param.get(&state), *value);
            }
        }
    }
}
