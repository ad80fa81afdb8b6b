use serde::{Deserialize, Serialize};

/// The only artifact layout this crate knows how to read.
pub const FORMAT_VERSION: u32 = 1;

/// The on-disk representation of a fitted linear regression.
///
/// This is plain data, nothing is checked until it's turned into a `LinearModel`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub format_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaler: Option<ScalerArtifact>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

/// Per-feature standardization applied before the linear map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerArtifact {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl Artifact {
    /// Creates a new unscaled, unnamed `Artifact` at the current format version.
    ///
    /// # Arguments
    /// * `coefficients` - One weight per feature.
    /// * `intercept` - The bias term.
    pub fn linear(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            feature_names: None,
            scaler: None,
            coefficients,
            intercept,
        }
    }

    pub fn with_feature_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.feature_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_scaler(mut self, mean: Vec<f64>, scale: Vec<f64>) -> Self {
        self.scaler = Some(ScalerArtifact { mean, scale });
        self
    }

    /// Checks every structural constraint of the artifact.
    ///
    /// # Returns
    /// A human readable reason if the artifact can't describe a usable model.
    pub fn validate(&self) -> Result<(), String> {
        if self.format_version != FORMAT_VERSION {
            return Err(format!(
                "unsupported format version {} (expected {FORMAT_VERSION})",
                self.format_version
            ));
        }

        let n = self.coefficients.len();
        if n == 0 {
            return Err("the model has no coefficients".into());
        }

        if let Some(i) = self.coefficients.iter().position(|c| !c.is_finite()) {
            return Err(format!("coefficient {i} is not finite"));
        }

        if !self.intercept.is_finite() {
            return Err("intercept is not finite".into());
        }

        if let Some(names) = &self.feature_names {
            if names.len() != n {
                return Err(format!(
                    "{} feature name(s) for {n} coefficient(s)",
                    names.len()
                ));
            }
        }

        if let Some(ScalerArtifact { mean, scale }) = &self.scaler {
            if mean.len() != n || scale.len() != n {
                return Err(format!(
                    "scaler has {} mean(s) and {} scale(s) for {n} coefficient(s)",
                    mean.len(),
                    scale.len()
                ));
            }

            if let Some(i) = mean.iter().position(|m| !m.is_finite()) {
                return Err(format!("scaler mean {i} is not finite"));
            }

            if let Some(i) = scale.iter().position(|s| !s.is_finite() || *s == 0.0) {
                return Err(format!("scaler scale {i} must be finite and non-zero"));
            }
        }

        Ok(())
    }
}
