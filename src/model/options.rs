use super::context::NumberContext;
use super::entity::Limits;
use super::integration::Integrations;
use super::presolve::PresolveRules;
use crate::solver::{ConvexSettings, SettingsError};
use derive_builder::Builder;

/// Direction of optimisation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sense {
    #[default]
    Minimise,
    Maximise,
}

/// Options passed to [`Model::new`](crate::model::Model::new).
///
/// Use [`ModelOptionsBuilder`] to construct an options object with
/// non-default values.
#[derive(Builder, Debug, Clone)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct ModelOptions {
    /// presolve rules, applied in ascending order
    #[builder(default = "PresolveRules::standard()")]
    pub presolve_rules: PresolveRules,

    /// solver integrations, tried in order
    #[builder(default = "Integrations::standard()")]
    pub integrations: Integrations,

    /// magnitudes treated as "no limit" or zero by the bound setters
    #[builder(default)]
    pub limits: Limits,

    /// rounding used when comparing bounds during presolve
    #[builder(default = "NumberContext::feasibility()")]
    pub feasibility: NumberContext,

    /// rounding applied to reported solution values
    #[builder(default = "NumberContext::solution()")]
    pub solution: NumberContext,

    /// maximum number of presolve sweeps
    #[builder(default = "64")]
    pub presolve_max_sweeps: u32,

    /// run presolve before solving
    #[builder(default = "true")]
    pub presolve_enable: bool,

    /// settings forwarded to the numeric solvers
    #[builder(default = "ConvexSettings::default()")]
    pub convex: ConvexSettings<f64>,
}

impl Default for ModelOptions {
    fn default() -> ModelOptions {
        ModelOptionsBuilder::default().build().unwrap()
    }
}

impl From<SettingsError> for ModelOptionsBuilderError {
    fn from(e: SettingsError) -> Self {
        ModelOptionsBuilderError::ValidationError(e.to_string())
    }
}

/// Automatic pre-build options validation
impl ModelOptionsBuilder {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if let Some(ref limits) = self.limits {
            if limits.smallest.is_sign_negative() || limits.largest <= limits.smallest {
                return Err(SettingsError::BadFieldValue("limits"));
            }
        }
        if let Some(ref convex) = self.convex {
            convex.validate()?;
        }
        if let Some(0) = self.presolve_max_sweeps {
            return Err(SettingsError::BadFieldValue("presolve_max_sweeps"));
        }
        Ok(())
    }
}

#[test]
fn test_model_options() {
    let options = ModelOptions::default();
    assert!(options.presolve_enable);
    assert!(options.presolve_rules.contains("one-remaining"));
    assert!(!options.presolve_rules.contains("similar-expressions"));

    let result = ModelOptionsBuilder::default()
        .presolve_max_sweeps(0)
        .build();
    assert!(result.is_err());
}
