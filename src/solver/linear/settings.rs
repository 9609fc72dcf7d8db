use crate::algebra::*;
use crate::solver::SettingsError;
use derive_builder::Builder;

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Settings for the embedded dense simplex solver

#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(build_fn(validate = "Self::validate"))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LinearSettings<T: FloatT> {
    ///maximum number of pivots over both phases
    #[builder(default = "50_000")]
    pub max_iter: u32,

    ///entries at or below this size are never chosen as pivots
    #[builder(default = "(1e-11).as_T()")]
    pub tol_pivot: T,

    ///reduced costs above minus this value count as nonnegative
    #[builder(default = "(1e-11).as_T()")]
    pub tol_optimality: T,

    ///largest phase one objective accepted as feasible, relative to the
    ///right hand side magnitude
    #[builder(default = "(1e-9).as_T()")]
    pub tol_feas: T,
}

impl<T> Default for LinearSettings<T>
where
    T: FloatT,
{
    fn default() -> LinearSettings<T> {
        LinearSettingsBuilder::<T>::default().build().unwrap()
    }
}

impl<T> LinearSettings<T>
where
    T: FloatT,
{
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.tol_pivot > T::zero()) {
            return Err(SettingsError::BadFieldValue("tol_pivot"));
        }
        if !(self.tol_optimality > T::zero()) {
            return Err(SettingsError::BadFieldValue("tol_optimality"));
        }
        if !(self.tol_feas > T::zero()) {
            return Err(SettingsError::BadFieldValue("tol_feas"));
        }
        Ok(())
    }

    /// Simplex settings matching the tolerances of a convex solve
    pub(crate) fn from_convex(settings: &crate::solver::ConvexSettings<T>) -> Self {
        Self {
            tol_feas: settings.tol_feas,
            ..Self::default()
        }
    }
}

impl From<SettingsError> for LinearSettingsBuilderError {
    fn from(e: SettingsError) -> Self {
        LinearSettingsBuilderError::ValidationError(e.to_string())
    }
}

impl<T> LinearSettingsBuilder<T>
where
    T: FloatT,
{
    pub fn validate(&self) -> Result<(), SettingsError> {
        if let Some(tol) = self.tol_pivot {
            if !(tol > T::zero()) {
                return Err(SettingsError::BadFieldValue("tol_pivot"));
            }
        }
        Ok(())
    }
}
