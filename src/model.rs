//! Pre-trained answered-call predictors, one per horizon.
//!
//! Models are loaded once at startup and only ever read afterwards.
use crate::error::{DashboardError, Result};
use crate::types::{CallRecord, FeatureVector, Horizon};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Anything that maps a feature vector to a predicted count.
pub trait Regressor: fmt::Debug {
    fn predict(&self, features: &FeatureVector) -> f64;
}

/// Ordinary least-squares model as exported by the training notebook.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearModel {
    pub fn from_json(path: &Path, text: &str) -> Result<Self> {
        let model: LinearModel =
            serde_json::from_str(text).map_err(|e| DashboardError::ModelLoad {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        if model.coefficients.len() != FeatureVector::LEN {
            return Err(DashboardError::ModelShape {
                path: path.to_path_buf(),
                found: model.coefficients.len(),
            });
        }
        Ok(model)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| DashboardError::ModelLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_json(path, &text)
    }
}

impl Regressor for LinearModel {
    fn predict(&self, features: &FeatureVector) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(features.0.iter())
                .map(|(c, x)| c * x)
                .sum::<f64>()
    }
}

pub fn artifact_path(dir: &Path, horizon: Horizon) -> PathBuf {
    dir.join(format!("telesales_model_{}.json", horizon.artifact_suffix()))
}

/// The three horizon models.
#[derive(Debug)]
pub struct ModelSet {
    weekly: Box<dyn Regressor>,
    monthly: Box<dyn Regressor>,
    yearly: Box<dyn Regressor>,
}

impl ModelSet {
    pub fn new(
        weekly: Box<dyn Regressor>,
        monthly: Box<dyn Regressor>,
        yearly: Box<dyn Regressor>,
    ) -> Self {
        Self {
            weekly,
            monthly,
            yearly,
        }
    }

    /// Load all three artifacts from `dir`. Any failure is fatal for the caller.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let load = |h: Horizon| -> Result<Box<dyn Regressor>> {
            let path = artifact_path(dir, h);
            let model = LinearModel::load(&path)?;
            debug!(horizon = %h, path = %path.display(), "model loaded");
            Ok(Box::new(model))
        };
        let set = Self::new(
            load(Horizon::Weekly)?,
            load(Horizon::Monthly)?,
            load(Horizon::Yearly)?,
        );
        info!(dir = %dir.display(), "prediction models ready");
        Ok(set)
    }

    pub fn get(&self, horizon: Horizon) -> &dyn Regressor {
        match horizon {
            Horizon::Weekly => self.weekly.as_ref(),
            Horizon::Monthly => self.monthly.as_ref(),
            Horizon::Yearly => self.yearly.as_ref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub horizon: Horizon,
    pub features: FeatureVector,
    /// Model output truncated toward zero.
    pub answered_calls: i64,
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Predicted Answered Calls for {}: {}",
            self.horizon.next_period(),
            self.answered_calls
        )
    }
}

/// Feature vector of the last row in the view.
pub fn latest_features(view: &[CallRecord], year: i32) -> Result<FeatureVector> {
    view.last()
        .map(FeatureVector::from_record)
        .ok_or(DashboardError::NoData { year })
}

pub fn predict(
    models: &ModelSet,
    horizon: Horizon,
    view: &[CallRecord],
    year: i32,
) -> Result<Prediction> {
    let features = latest_features(view, year)?;
    let raw = models.get(horizon).predict(&features);
    if !raw.is_finite() {
        return Err(DashboardError::InvalidPrediction(raw));
    }
    debug!(horizon = %horizon, raw, "prediction computed");
    Ok(Prediction {
        horizon,
        features,
        answered_calls: raw.trunc() as i64,
    })
}
