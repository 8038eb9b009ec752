//! Преобразование сырого выхода модели в название культуры

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::types::Prediction;

/// Коды 1..=22 из исходной разметки датасета (Crop Recommendation).
pub const CROP_TABLE: [(i64, &str); 22] = [
    (1, "Rice"),
    (2, "Maize"),
    (3, "Jute"),
    (4, "Cotton"),
    (5, "Coconut"),
    (6, "Papaya"),
    (7, "Orange"),
    (8, "Apple"),
    (9, "Muskmelon"),
    (10, "Watermelon"),
    (11, "Grapes"),
    (12, "Mango"),
    (13, "Banana"),
    (14, "Pomegranate"),
    (15, "Lentil"),
    (16, "Blackgram"),
    (17, "Mungbean"),
    (18, "Mothbeans"),
    (19, "Pigeonpeas"),
    (20, "Kidneybeans"),
    (21, "Chickpea"),
    (22, "Coffee"),
];

pub fn crop_for_code(code: i64) -> Option<&'static str> {
    CROP_TABLE
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// Обученный LabelEncoder: `classes[code]` - имя класса.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    pub classes: Vec<String>,
}

impl LabelEncoder {
    pub fn validate(&self) -> ModelResult<()> {
        if self.classes.is_empty() {
            return Err(ModelError::Invalid("LabelEncoder has no classes".to_string()));
        }
        Ok(())
    }

    pub fn inverse_transform(&self, code: i64) -> ModelResult<&str> {
        usize::try_from(code)
            .ok()
            .and_then(|idx| self.classes.get(idx))
            .map(String::as_str)
            .ok_or(ModelError::UnseenLabel(code))
    }
}

fn from_encoder(prediction: &Prediction, encoder: Option<&LabelEncoder>) -> Option<String> {
    let encoder = encoder?;
    let decoded = match prediction.as_code() {
        Some(code) => encoder.inverse_transform(code).map(str::to_string),
        None => Err(ModelError::Invalid(format!(
            "model output {:?} is not an integer code",
            prediction.to_string()
        ))),
    };

    match decoded {
        Ok(name) => Some(name),
        Err(e) => {
            tracing::warn!("Label encoder inverse transform failed: {}", e);
            None
        }
    }
}

fn from_text(prediction: &Prediction) -> Option<String> {
    prediction.as_text().map(str::to_string)
}

fn from_table(prediction: &Prediction) -> Option<String> {
    prediction
        .as_code()
        .and_then(crop_for_code)
        .map(str::to_string)
}

/// Цепочка: энкодер -> строковый выход модели -> статическая таблица.
/// Пустое имя останавливает цепочку и считается неразрешённым.
pub fn resolve_crop_name(prediction: &Prediction, encoder: Option<&LabelEncoder>) -> Option<String> {
    from_encoder(prediction, encoder)
        .or_else(|| from_text(prediction))
        .or_else(|| from_table(prediction))
        .filter(|name| !name.is_empty())
}
