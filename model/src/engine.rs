use log::debug;
use ndarray::{Array1, Array2, ArrayView2};

use crate::{
    artifact::{Artifact, FORMAT_VERSION, ScalerArtifact},
    error::PredictErr,
    features::Features,
};

/// Anything able to turn a sample matrix into one prediction per row.
pub trait Regressor: Send + Sync {
    /// Returns the amount of features each sample must have.
    fn n_features(&self) -> usize;

    /// Returns the ordered feature names the model was fitted with, if it recorded them.
    fn feature_names(&self) -> Option<&[String]>;

    /// Predicts the target for every row of `features`.
    ///
    /// # Arguments
    /// * `features` - The samples, bare or labeled.
    ///
    /// # Returns
    /// One prediction per row in row order, or a `PredictErr` if the input doesn't
    /// fit the model.
    fn predict(&self, features: &Features) -> Result<Array1<f64>, PredictErr>;
}

#[derive(Debug, Clone, PartialEq)]
struct Scaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl Scaler {
    fn transform(&self, x: ArrayView2<f64>) -> Array2<f64> {
        (&x - &self.mean) / &self.scale
    }
}

/// An ordinary least squares model, optionally preceded by a standard scaler.
///
/// Immutable once built, every instance has passed `Artifact::validate`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    feature_names: Option<Vec<String>>,
    scaler: Option<Scaler>,
    coefficients: Array1<f64>,
    intercept: f64,
}

impl TryFrom<Artifact> for LinearModel {
    type Error = String;

    fn try_from(artifact: Artifact) -> Result<Self, Self::Error> {
        artifact.validate()?;

        let Artifact {
            feature_names,
            scaler,
            coefficients,
            intercept,
            ..
        } = artifact;

        let scaler = scaler.map(|ScalerArtifact { mean, scale }| Scaler {
            mean: Array1::from(mean),
            scale: Array1::from(scale),
        });

        Ok(Self {
            feature_names,
            scaler,
            coefficients: Array1::from(coefficients),
            intercept,
        })
    }
}

impl From<&LinearModel> for Artifact {
    fn from(model: &LinearModel) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            feature_names: model.feature_names.clone(),
            scaler: model.scaler.as_ref().map(|s| ScalerArtifact {
                mean: s.mean.to_vec(),
                scale: s.scale.to_vec(),
            }),
            coefficients: model.coefficients.to_vec(),
            intercept: model.intercept,
        }
    }
}

impl Regressor for LinearModel {
    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn predict(&self, features: &Features) -> Result<Array1<f64>, PredictErr> {
        let x = features.values();
        if x.nrows() == 0 {
            return Ok(Array1::zeros(0));
        }

        if x.ncols() != self.n_features() {
            return Err(PredictErr::ShapeMismatch {
                got: x.ncols(),
                expected: self.n_features(),
            });
        }

        match (features.columns(), self.feature_names()) {
            (Some(got), Some(expected)) if got != expected => {
                return Err(PredictErr::SchemaMismatch {
                    got: got.to_vec(),
                    expected: expected.to_vec(),
                });
            }
            (None, Some(expected)) => {
                debug!("input has no feature names, model was fitted with {expected:?}")
            }
            (Some(_), None) => debug!("model was fitted without feature names, ignoring labels"),
            _ => {}
        }

        let y = match &self.scaler {
            Some(scaler) => scaler.transform(x).dot(&self.coefficients),
            None => x.dot(&self.coefficients),
        };

        Ok(y + self.intercept)
    }
}
