//! Загрузка обученных артефактов при старте
//!
//! Отсутствующий или испорченный файл не прерывает запуск: слот остаётся
//! пустым, а ошибка конфигурации всплывёт при первом предсказании.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ArtifactError, ModelResult};
use crate::models::{Classifier, LabelEncoder};
use crate::preprocessing::{MinMaxScaler, StandardScaler};
use crate::types::N_FEATURES;

pub const MODEL_FILE: &str = "model.json";
pub const STANDARD_SCALER_FILE: &str = "standscaler.json";
pub const MINMAX_SCALER_FILE: &str = "minmaxscaler.json";
pub const LABEL_ENCODER_FILE: &str = "label_encoder.json";

/// Объект, который можно прочитать из JSON и проверить на целостность.
pub trait Artifact: DeserializeOwned {
    const KIND: &'static str;

    fn validate(&self) -> ModelResult<()>;
}

impl Artifact for Classifier {
    const KIND: &'static str = "Model";

    fn validate(&self) -> ModelResult<()> {
        Classifier::validate(self)
    }
}

impl Artifact for StandardScaler {
    const KIND: &'static str = "Standard scaler";

    fn validate(&self) -> ModelResult<()> {
        StandardScaler::validate(self)
    }
}

impl Artifact for MinMaxScaler {
    const KIND: &'static str = "MinMax scaler";

    fn validate(&self) -> ModelResult<()> {
        MinMaxScaler::validate(self)
    }
}

impl Artifact for LabelEncoder {
    const KIND: &'static str = "Label encoder";

    fn validate(&self) -> ModelResult<()> {
        LabelEncoder::validate(self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub standard_scaler: PathBuf,
    pub minmax_scaler: PathBuf,
    pub label_encoder: PathBuf,
}

impl ArtifactPaths {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            model: dir.join(MODEL_FILE),
            standard_scaler: dir.join(STANDARD_SCALER_FILE),
            minmax_scaler: dir.join(MINMAX_SCALER_FILE),
            label_encoder: dir.join(LABEL_ENCODER_FILE),
        }
    }
}

pub fn read_artifact<T: Artifact>(path: &Path) -> Result<T, ArtifactError> {
    let json = fs::read_to_string(path)?;
    let artifact: T = serde_json::from_str(&json)?;
    artifact.validate()?;
    Ok(artifact)
}

/// Чтение артефакта без паники: любая проблема -> `None` и запись в лог.
pub fn load_optional<T: Artifact>(path: &Path) -> Option<T> {
    if !path.exists() {
        tracing::warn!("File not found: {}", path.display());
        return None;
    }

    match read_artifact(path) {
        Ok(artifact) => {
            tracing::info!("{} loaded from {}", T::KIND, path.display());
            Some(artifact)
        }
        Err(e) => {
            tracing::error!("Failed to load {}: {}", path.display(), e);
            None
        }
    }
}

/// Все обученные объекты процесса. Только чтение после старта.
#[derive(Debug, Clone, Default)]
pub struct Artifacts {
    pub model: Option<Classifier>,
    pub standard_scaler: Option<StandardScaler>,
    pub minmax_scaler: Option<MinMaxScaler>,
    pub label_encoder: Option<LabelEncoder>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArtifactStatus {
    pub model: bool,
    pub standard_scaler: bool,
    pub minmax_scaler: bool,
    pub label_encoder: bool,
}

impl Artifacts {
    pub fn load(paths: &ArtifactPaths) -> Self {
        let artifacts = Self {
            model: load_optional(&paths.model),
            standard_scaler: load_optional(&paths.standard_scaler),
            minmax_scaler: load_optional(&paths.minmax_scaler),
            label_encoder: load_optional(&paths.label_encoder),
        };
        artifacts.warn_on_width_mismatch();
        artifacts
    }

    pub fn is_ready(&self) -> bool {
        self.model.is_some() && self.standard_scaler.is_some() && self.minmax_scaler.is_some()
    }

    pub fn status(&self) -> ArtifactStatus {
        ArtifactStatus {
            model: self.model.is_some(),
            standard_scaler: self.standard_scaler.is_some(),
            minmax_scaler: self.minmax_scaler.is_some(),
            label_encoder: self.label_encoder.is_some(),
        }
    }

    // Несовпадение ширины не мешает старту, но каждый запрос закончится ошибкой
    fn warn_on_width_mismatch(&self) {
        let widths = [
            (MinMaxScaler::KIND, self.minmax_scaler.as_ref().map(|s| s.n_features())),
            (
                StandardScaler::KIND,
                self.standard_scaler.as_ref().and_then(|s| s.n_features()),
            ),
            (Classifier::KIND, self.model.as_ref().map(|m| m.n_features())),
        ];
        for (kind, width) in widths {
            if let Some(width) = width.filter(|&w| w != N_FEATURES) {
                tracing::warn!(
                    "{} expects {} features, but the form provides {}",
                    kind,
                    width,
                    N_FEATURES
                );
            }
        }
    }
}
