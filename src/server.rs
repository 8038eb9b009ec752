//! HTTP слой: форма, предсказание, health

use std::sync::Arc;

use askama::Template;
use axum::{
    extract::State,
    response::{Html, Json},
    routing::{get, post},
    Form, Router,
};
use serde::Serialize;

use crate::advisor::{CropAdvisor, FormData};
use crate::artifacts::ArtifactStatus;
use crate::types::FEATURE_FIELDS;

#[derive(Clone)]
pub struct AppState {
    pub advisor: Arc<CropAdvisor>,
}

impl AppState {
    pub fn new(advisor: CropAdvisor) -> Self {
        Self {
            advisor: Arc::new(advisor),
        }
    }
}

/// Поле формы для шаблона
pub struct FieldView<'a> {
    pub name: &'static str,
    pub label: &'static str,
    pub value: &'a str,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate<'a> {
    pub fields: Vec<FieldView<'a>>,
    pub result: Option<&'a str>,
}

const FIELD_LABELS: [&str; 7] = [
    "Nitrogen",
    "Phosphorus",
    "Potassium",
    "Temperature (°C)",
    "Humidity (%)",
    "pH",
    "Rainfall (mm)",
];

pub fn render_page(result: Option<&str>, form: &FormData) -> Html<String> {
    let fields = FEATURE_FIELDS
        .iter()
        .zip(FIELD_LABELS)
        .map(|(&name, label)| FieldView {
            name,
            label,
            value: form.get(name).map(String::as_str).unwrap_or(""),
        })
        .collect();

    let template = IndexTemplate { fields, result };
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template error: {}", e);
        format!("Template error: {}", e)
    }))
}

pub async fn index() -> Html<String> {
    render_page(None, &FormData::new())
}

/// Повторяющееся поле: берётся первое значение.
pub fn first_values(pairs: Vec<(String, String)>) -> FormData {
    let mut form = FormData::new();
    for (name, value) in pairs {
        form.entry(name).or_insert(value);
    }
    form
}

pub async fn predict(
    State(state): State<AppState>,
    form: Option<Form<Vec<(String, String)>>>,
) -> Html<String> {
    // Тело не в form-urlencoded: считаем, что полей нет
    let form = form.map(|Form(pairs)| first_values(pairs)).unwrap_or_default();
    tracing::info!("Predict request: {} fields", form.len());

    let result = state.advisor.recommend(&form);
    render_page(Some(&result), &form)
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub artifacts: ArtifactStatus,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let artifacts = state.advisor.artifacts();
    Json(HealthResponse {
        status: if artifacts.is_ready() { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        artifacts: artifacts.status(),
    })
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict))
        .route("/health", get(health))
        .with_state(state)
}
