/// Типы данных для модуля рекомендаций

use std::fmt;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Имена полей формы в порядке, в котором обучались скейлеры и модель.
/// Написание ("Phosporus", "Ph") должно совпадать с разметкой формы.
pub const FEATURE_FIELDS: [&str; 7] = [
    "Nitrogen",
    "Phosporus",
    "Potassium",
    "Temperature",
    "Humidity",
    "Ph",
    "Rainfall",
];

pub const N_FEATURES: usize = FEATURE_FIELDS.len();

/// Один набор измерений почвы и климата.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub ph: f64,
    pub rainfall: f64,
}

impl FeatureVector {
    pub fn from_values(values: [f64; N_FEATURES]) -> Self {
        let [nitrogen, phosphorus, potassium, temperature, humidity, ph, rainfall] = values;
        Self {
            nitrogen,
            phosphorus,
            potassium,
            temperature,
            humidity,
            ph,
            rainfall,
        }
    }

    pub fn values(&self) -> [f64; N_FEATURES] {
        [
            self.nitrogen,
            self.phosphorus,
            self.potassium,
            self.temperature,
            self.humidity,
            self.ph,
            self.rainfall,
        ]
    }

    /// Матрица (1, 7) для скейлеров и классификатора
    pub fn to_row(&self) -> Array2<f64> {
        let values = self.values();
        Array2::from_shape_fn((1, N_FEATURES), |(_, j)| values[j])
    }
}

/// Сырой выход классификатора: целочисленный код, число с плавающей точкой
/// (классы, обученные на float-столбце) или строковая категория.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Prediction {
    Code(i64),
    Number(f64),
    Label(String),
}

impl Prediction {
    /// Интерпретация как целого числа ("7" тоже считается кодом).
    /// Дробная часть отбрасывается, NaN и бесконечность кодом не являются.
    pub fn as_code(&self) -> Option<i64> {
        match self {
            Prediction::Code(code) => Some(*code),
            Prediction::Number(value) if value.is_finite() => Some(value.trunc() as i64),
            Prediction::Number(_) => None,
            Prediction::Label(label) => label.trim().parse().ok(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Prediction::Code(_) | Prediction::Number(_) => None,
            Prediction::Label(label) => Some(label),
        }
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prediction::Code(code) => write!(f, "{}", code),
            // 1.0 печатается как "1.0", как его вернула модель
            Prediction::Number(value) => write!(f, "{:?}", value),
            Prediction::Label(label) => write!(f, "{}", label),
        }
    }
}

/// Итог успешного прохода конвейера.
#[derive(Debug, Clone, PartialEq)]
pub enum Recommendation {
    Crop { name: String, raw: Prediction },
    Undetermined { raw: Prediction },
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::Crop { name, .. } => {
                write!(f, "{} is the best crop to be cultivated right there.", name)
            }
            Recommendation::Undetermined { raw } => write!(
                f,
                "Sorry, could not determine the best crop. Model output: {}",
                raw
            ),
        }
    }
}
