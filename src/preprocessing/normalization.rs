//! Нормализация данных обученными скейлерами

#![allow(non_snake_case)]

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Проверка входа перед transform/predict: ширина и конечность значений.
pub(crate) fn check_input(estimator: &'static str, expected: usize, X: &Array2<f64>) -> ModelResult<()> {
    if X.ncols() != expected {
        return Err(ModelError::FeatureMismatch {
            estimator,
            expected,
            got: X.ncols(),
        });
    }
    if X.iter().any(|v| v.is_nan()) {
        return Err(ModelError::Invalid("Input X contains NaN.".to_string()));
    }
    if X.iter().any(|v| v.is_infinite()) {
        return Err(ModelError::Invalid(
            "Input X contains infinity or a value too large for dtype('float64').".to_string(),
        ));
    }
    Ok(())
}

fn check_finite(name: &str, values: &[f64]) -> ModelResult<()> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(ModelError::Invalid(format!("{} contains non-finite values", name)));
    }
    Ok(())
}

/// Min-max нормализация в диапазон, заданный при обучении.
///
/// Хранит уже вычисленные `min_` и `scale_` из scikit-learn:
/// `X * scale + min`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    pub min: Vec<f64>,
    pub scale: Vec<f64>,
}

impl MinMaxScaler {
    pub fn n_features(&self) -> usize {
        self.scale.len()
    }

    pub fn validate(&self) -> ModelResult<()> {
        if self.scale.is_empty() {
            return Err(ModelError::Invalid("MinMaxScaler has no features".to_string()));
        }
        if self.min.len() != self.scale.len() {
            return Err(ModelError::Invalid(format!(
                "MinMaxScaler min has {} entries but scale has {}",
                self.min.len(),
                self.scale.len()
            )));
        }
        check_finite("MinMaxScaler min", &self.min)?;
        check_finite("MinMaxScaler scale", &self.scale)
    }

    pub fn transform(&self, X: &Array2<f64>) -> ModelResult<Array2<f64>> {
        check_input("MinMaxScaler", self.n_features(), X)?;

        let mut scaled = X.clone();
        for mut row in scaled.rows_mut() {
            for (i, val) in row.iter_mut().enumerate() {
                *val = *val * self.scale[i] + self.min[i];
            }
        }

        Ok(scaled)
    }
}

/// Стандартизация: (X - mean) / scale.
///
/// `mean == None` соответствует `with_mean=False`, `scale == None` - `with_std=False`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    #[serde(default)]
    pub mean: Option<Vec<f64>>,
    #[serde(default)]
    pub scale: Option<Vec<f64>>,
}

impl StandardScaler {
    pub fn n_features(&self) -> Option<usize> {
        self.mean
            .as_ref()
            .or(self.scale.as_ref())
            .map(|v| v.len())
    }

    pub fn validate(&self) -> ModelResult<()> {
        match (&self.mean, &self.scale) {
            (None, None) => {
                return Err(ModelError::Invalid(
                    "StandardScaler has neither mean nor scale".to_string(),
                ))
            }
            (Some(mean), Some(scale)) if mean.len() != scale.len() => {
                return Err(ModelError::Invalid(format!(
                    "StandardScaler mean has {} entries but scale has {}",
                    mean.len(),
                    scale.len()
                )))
            }
            _ => {}
        }
        if let Some(mean) = &self.mean {
            check_finite("StandardScaler mean", mean)?;
        }
        if let Some(scale) = &self.scale {
            check_finite("StandardScaler scale", scale)?;
        }
        Ok(())
    }

    pub fn transform(&self, X: &Array2<f64>) -> ModelResult<Array2<f64>> {
        if let Some(n) = self.n_features() {
            check_input("StandardScaler", n, X)?;
        }

        let mut standardized = X.clone();
        for mut row in standardized.rows_mut() {
            for (i, val) in row.iter_mut().enumerate() {
                if let Some(mean) = &self.mean {
                    *val -= mean[i];
                }
                if let Some(scale) = &self.scale {
                    // Избегаем деления на ноль
                    let s = if scale[i].abs() < 1e-10 { 1.0 } else { scale[i] };
                    *val /= s;
                }
            }
        }

        Ok(standardized)
    }
}
