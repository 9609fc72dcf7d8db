use crate::algebra::*;
use derive_builder::Builder;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Error type returned by settings validation
pub enum SettingsError {
    /// A field holds a value outside of its legal range
    #[error("Bad value for field {0}")]
    BadFieldValue(&'static str),
    /// A field was changed that can only be set at solver construction
    #[error("Field {0} is immutable after solver construction")]
    ImmutableSetting(&'static str),
}

/// Settings for the convex (quadratic) solver family.
///
/// Use [`ConvexSettingsBuilder`] to construct a settings object with
/// non-default values.

#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(build_fn(validate = "Self::prebuild_check"))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ConvexSettings<T: FloatT> {
    ///maximum number of active-set iterations
    #[builder(default = "10_000")]
    pub max_iter: u32,

    ///maximum run time (seconds)
    #[builder(default = "f64::INFINITY")]
    pub time_limit: f64,

    ///verbose printing
    #[builder(default = "false")]
    pub verbose: bool,

    ///check symmetry and semidefiniteness of Q and the rank of the
    ///equality constraints before solving
    #[builder(default = "false")]
    pub validate: bool,

    ///absolute tolerance on constraint violation
    #[builder(default = "(1e-9).as_T()")]
    pub tol_feas: T,

    ///relative size below which a step is considered zero
    #[builder(default = "(1e-12).as_T()")]
    pub tol_step: T,

    ///multipliers more negative than this release their constraint
    #[builder(default = "(1e-10).as_T()")]
    pub tol_multiplier: T,

    ///step denominators at or below this (relative) size are ignored in the ratio test
    #[builder(default = "(1e-12).as_T()")]
    pub tol_ratio: T,

    ///relative symmetry tolerance used when validating Q
    #[builder(default = "(1e-10).as_T()")]
    pub tol_symmetry: T,

    ///relative diagonal shift used when Q is only semidefinite
    #[builder(default = "(1e-12).as_T()")]
    pub diagonal_patch: T,

    ///force (`Some(true)`) or forbid (`Some(false)`) the iterative
    ///active-set variant.  `None` picks by problem size
    #[builder(default = "None")]
    pub iterative: Option<bool>,

    ///problem size (variables + inequalities) from which the iterative
    ///variant is chosen automatically
    #[builder(default = "512")]
    pub iterative_threshold: usize,

    ///maximum conjugate gradient iterations per subproblem (0 = twice the system size)
    #[builder(default = "0")]
    pub cg_max_iter: u32,

    ///relative residual tolerance for conjugate gradient
    #[builder(default = "(1e-13).as_T()")]
    pub cg_tol: T,

    ///enable Jacobi scaling of the Schur complement
    #[builder(default = "true")]
    pub schur_scaling_enable: bool,

    ///minimum diagonal spread at which Schur scaling is applied
    #[builder(default = "(10.0).as_T()")]
    pub schur_scaling_min_spread: T,

    ///maximum diagonal spread at which Schur scaling is applied
    #[builder(default = "(1e12).as_T()")]
    pub schur_scaling_max_spread: T,

    ///Schur complement diagonal floor, relative to its largest diagonal entry
    #[builder(default = "(1e-14).as_T()")]
    pub schur_diagonal_floor: T,

    ///enable a small ridge on the dual block of the full KKT system
    #[builder(default = "false")]
    pub dual_regularization_enable: bool,

    ///constraint row norm spread above which the ridge is applied
    #[builder(default = "(1e4).as_T()")]
    pub dual_regularization_threshold: T,

    ///ridge size per unit of row norm spread
    #[builder(default = "(1e-14).as_T()")]
    pub dual_regularization_scale: T,

    ///enable extended precision refinement of the solution
    #[builder(default = "false")]
    pub extended_precision_enable: bool,

    ///extended precision residual target
    #[builder(default = "(1e-14).as_T()")]
    pub extended_precision_target: T,

    ///maximum number of refinement passes
    #[builder(default = "12")]
    pub extended_precision_max_iter: u32,

    ///use a single zoom factor for primal and dual corrections
    #[builder(default = "true")]
    pub extended_precision_combined_zoom: bool,

    ///geometric growth of the zoom factor between passes
    #[builder(default = "(1e4).as_T()")]
    pub zoom_growth: T,

    ///largest zoom factor
    #[builder(default = "(1e12).as_T()")]
    pub zoom_max: T,

    ///number of failed correction solves tolerated before stopping
    #[builder(default = "3")]
    pub zoom_retry_max: u32,
}

impl<T> Default for ConvexSettings<T>
where
    T: FloatT,
{
    fn default() -> ConvexSettings<T> {
        ConvexSettingsBuilder::<T>::default().build().unwrap()
    }
}

macro_rules! check_immutable_setting {
    ($self:expr, $prev:expr, $field:ident) => {
        if $self.$field != $prev.$field {
            return Err(SettingsError::ImmutableSetting(stringify!($field)));
        }
    };
}

macro_rules! check_positive {
    ($value:expr, $field:literal) => {
        if !($value > T::zero()) {
            return Err(SettingsError::BadFieldValue($field));
        }
    };
}

impl<T> ConvexSettings<T>
where
    T: FloatT,
{
    /// Checks that numerical values are in their legal ranges.
    pub fn validate(&self) -> Result<(), SettingsError> {
        check_positive!(self.tol_feas, "tol_feas");
        check_positive!(self.tol_step, "tol_step");
        check_positive!(self.tol_multiplier, "tol_multiplier");
        check_positive!(self.tol_ratio, "tol_ratio");
        check_positive!(self.cg_tol, "cg_tol");
        check_positive!(self.extended_precision_target, "extended_precision_target");
        if self.diagonal_patch < T::zero() {
            return Err(SettingsError::BadFieldValue("diagonal_patch"));
        }
        if self.time_limit.is_nan() || self.time_limit < 0.0 {
            return Err(SettingsError::BadFieldValue("time_limit"));
        }
        if self.iterative_threshold == 0 {
            return Err(SettingsError::BadFieldValue("iterative_threshold"));
        }
        if self.schur_scaling_min_spread > self.schur_scaling_max_spread {
            return Err(SettingsError::BadFieldValue("schur_scaling_min_spread"));
        }
        if !(self.zoom_growth > T::one()) {
            return Err(SettingsError::BadFieldValue("zoom_growth"));
        }
        if !(self.zoom_max >= T::one()) {
            return Err(SettingsError::BadFieldValue("zoom_max"));
        }
        Ok(())
    }

    /// Checks that a settings object is a legal update for a solver that
    /// has already been constructed.  Choices that select the solver
    /// variant may not change.
    pub fn validate_as_update(&self, prev: &Self) -> Result<(), SettingsError> {
        self.validate()?;

        check_immutable_setting!(self, prev, iterative);
        check_immutable_setting!(self, prev, iterative_threshold);
        check_immutable_setting!(self, prev, extended_precision_enable);

        Ok(())
    }
}

// pre build checker (for auto-validation when using the builder)

impl From<SettingsError> for ConvexSettingsBuilderError {
    fn from(e: SettingsError) -> Self {
        ConvexSettingsBuilderError::ValidationError(e.to_string())
    }
}

/// Automatic pre-build settings validation
impl<T> ConvexSettingsBuilder<T>
where
    T: FloatT,
{
    pub fn prebuild_check(&self) -> Result<(), SettingsError> {
        if let Some(growth) = self.zoom_growth {
            if !(growth > T::one()) {
                return Err(SettingsError::BadFieldValue("zoom_growth"));
            }
        }
        if let Some(0) = self.iterative_threshold {
            return Err(SettingsError::BadFieldValue("iterative_threshold"));
        }
        if let Some(tol) = self.tol_feas {
            if !(tol > T::zero()) {
                return Err(SettingsError::BadFieldValue("tol_feas"));
            }
        }
        Ok(())
    }
}

#[test]
fn test_settings_validate() {
    let settings = ConvexSettings::<f64>::default();
    assert!(settings.validate().is_ok());

    let bad = ConvexSettingsBuilder::<f64>::default()
        .zoom_growth(0.5)
        .build();
    assert!(bad.is_err());

    let mut updated = settings.clone();
    updated.tol_feas = 1e-7;
    assert!(updated.validate_as_update(&settings).is_ok());
    updated.extended_precision_enable = true;
    assert_eq!(
        updated.validate_as_update(&settings),
        Err(SettingsError::ImmutableSetting("extended_precision_enable"))
    );
}
