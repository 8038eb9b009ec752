//! Конвейер рекомендаций: проверка формы -> скейлеры -> модель -> метка

#![allow(non_snake_case)]

use std::collections::HashMap;

use crate::artifacts::Artifacts;
use crate::error::{AdvisorError, ModelError};
use crate::models::resolve_crop_name;
use crate::types::{FeatureVector, Recommendation, FEATURE_FIELDS, N_FEATURES};

/// Поля отправленной формы: имя -> сырой текст.
pub type FormData = HashMap<String, String>;

/// Контекст приложения: обученные артефакты, загруженные один раз при старте.
#[derive(Debug, Clone, Default)]
pub struct CropAdvisor {
    artifacts: Artifacts,
}

impl CropAdvisor {
    pub fn new(artifacts: Artifacts) -> Self {
        Self { artifacts }
    }

    pub fn artifacts(&self) -> &Artifacts {
        &self.artifacts
    }

    /// Поля проверяются по порядку, первая ошибка прерывает разбор.
    pub fn parse_features(form: &FormData) -> Result<FeatureVector, AdvisorError> {
        let mut values = [0.0; N_FEATURES];

        for (slot, field) in values.iter_mut().zip(FEATURE_FIELDS) {
            let raw = form.get(field).map(String::as_str).unwrap_or("");
            if raw.trim().is_empty() {
                return Err(AdvisorError::MissingValue { field });
            }
            *slot = raw
                .trim()
                .parse::<f64>()
                .map_err(|_| AdvisorError::InvalidNumber {
                    field,
                    raw: raw.to_string(),
                })?;
        }

        Ok(FeatureVector::from_values(values))
    }

    pub fn advise(&self, form: &FormData) -> Result<Recommendation, AdvisorError> {
        let (Some(model), Some(standard), Some(minmax)) = (
            self.artifacts.model.as_ref(),
            self.artifacts.standard_scaler.as_ref(),
            self.artifacts.minmax_scaler.as_ref(),
        ) else {
            return Err(AdvisorError::NotConfigured);
        };

        let features = Self::parse_features(form)?;
        let X = features.to_row();

        // Порядок как при обучении: MinMax -> Standard
        let X_scaled = minmax
            .transform(&X)
            .and_then(|X| standard.transform(&X))
            .map_err(AdvisorError::Scaling)?;

        let raw = model
            .predict(&X_scaled)
            .map_err(AdvisorError::Prediction)?
            .into_iter()
            .next()
            .ok_or_else(|| {
                AdvisorError::Prediction(ModelError::Invalid(
                    "model returned no prediction".to_string(),
                ))
            })?;

        let recommendation = match resolve_crop_name(&raw, self.artifacts.label_encoder.as_ref()) {
            Some(name) => Recommendation::Crop { name, raw },
            None => Recommendation::Undetermined { raw },
        };
        Ok(recommendation)
    }

    /// Текст результата для страницы. Ошибки не пробрасываются наружу.
    pub fn recommend(&self, form: &FormData) -> String {
        match self.advise(form) {
            Ok(recommendation) => {
                tracing::debug!("Recommendation: {:?}", recommendation);
                recommendation.to_string()
            }
            Err(e @ AdvisorError::NotConfigured) => {
                tracing::warn!("Prediction requested without artifacts loaded");
                e.to_string()
            }
            Err(e) => {
                tracing::info!("Prediction request rejected: {}", e);
                e.to_string()
            }
        }
    }
}
