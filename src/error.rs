//! Ошибки загрузки артефактов, моделей и конвейера рекомендаций

use thiserror::Error;

/// Ошибки применения обученных объектов (скейлеры, классификатор, энкодер).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("X has {got} features, but {estimator} is expecting {expected} features as input.")]
    FeatureMismatch {
        estimator: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("y contains previously unseen labels: [{0}]")]
    UnseenLabel(i64),

    #[error("{0}")]
    Invalid(String),
}

/// Ошибки чтения артефакта с диска.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("inconsistent artifact: {0}")]
    Invalid(#[from] ModelError),
}

/// Ошибки обработки одной отправки формы.
/// `Display` каждого варианта - это текст, который видит пользователь.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AdvisorError {
    #[error(
        "Server configuration error: model or scaler not loaded. \
         Ensure model.json, standscaler.json and minmaxscaler.json exist in the artifact directory."
    )]
    NotConfigured,

    #[error("Please provide a value for {field}.")]
    MissingValue { field: &'static str },

    #[error("Invalid numeric value for {field}: '{raw}'")]
    InvalidNumber { field: &'static str, raw: String },

    #[error("Error while scaling features: {0}")]
    Scaling(ModelError),

    #[error("Error during model prediction: {0}")]
    Prediction(ModelError),
}

pub type ModelResult<T> = Result<T, ModelError>;
