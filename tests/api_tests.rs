// Интеграционные тесты HTTP слоя: артефакты с диска -> роутер -> HTML

use std::fs;
use std::path::{Path, PathBuf};

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt; // for oneshot

use crop_advisor::artifacts::{
    LABEL_ENCODER_FILE, MINMAX_SCALER_FILE, MODEL_FILE, STANDARD_SCALER_FILE,
};
use crop_advisor::{create_router, AppState, ArtifactPaths, Artifacts, CropAdvisor};

// Диапазоны признаков датасета: N, P, K, temperature, humidity, ph, rainfall
const RANGES: [(f64, f64); 7] = [
    (0.0, 140.0),
    (5.0, 145.0),
    (5.0, 205.0),
    (8.83, 43.68),
    (14.26, 99.98),
    (3.5, 9.94),
    (20.21, 298.56),
];

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "crop-advisor-api-{}-{}",
        name,
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_json(dir: &Path, file: &str, value: Value) {
    fs::write(dir.join(file), serde_json::to_string_pretty(&value).unwrap()).unwrap();
}

/// Скейлеры и дерево: rainfall выше середины диапазона -> Rice (1),
/// иначе temperature выше середины -> Maize (2), иначе Kidneybeans (20).
fn write_mandatory_artifacts(dir: &Path) {
    let scale: Vec<f64> = RANGES.iter().map(|(lo, hi)| 1.0 / (hi - lo)).collect();
    let min: Vec<f64> = RANGES
        .iter()
        .zip(&scale)
        .map(|((lo, _), s)| -lo * s)
        .collect();
    write_json(dir, MINMAX_SCALER_FILE, json!({ "min": min, "scale": scale }));
    let mean = vec![0.5; 7];
    let std = vec![0.25; 7];
    write_json(dir, STANDARD_SCALER_FILE, json!({ "mean": mean, "scale": std }));
    write_json(
        dir,
        MODEL_FILE,
        json!({
            "kind": "decision_tree",
            "classes": [1, 2, 20],
            "n_features_in": 7,
            "tree": {
                "children_left":  [1, 3, -1, -1, -1],
                "children_right": [2, 4, -1, -1, -1],
                "feature":        [6, 3, -2, -2, -2],
                "threshold":      [0.0, 0.0, -2.0, -2.0, -2.0],
                "value": [
                    [10.0, 10.0, 10.0],
                    [0.0, 10.0, 10.0],
                    [10.0, 0.0, 0.0],
                    [0.0, 0.0, 10.0],
                    [0.0, 10.0, 0.0]
                ]
            }
        }),
    );
}

fn app_from_dir(dir: &Path) -> Router {
    let artifacts = Artifacts::load(&ArtifactPaths::in_dir(dir));
    create_router(AppState::new(CropAdvisor::new(artifacts)))
}

fn form_body(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

fn sample(rainfall: &str, temperature: &str) -> Vec<(&'static str, String)> {
    vec![
        ("Nitrogen", "90".to_string()),
        ("Phosporus", "42".to_string()),
        ("Potassium", "43".to_string()),
        ("Temperature", temperature.to_string()),
        ("Humidity", "82".to_string()),
        ("Ph", "6.5".to_string()),
        ("Rainfall", rainfall.to_string()),
    ]
}

async fn post_predict(app: Router, body: String) -> (StatusCode, String) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/predict")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    (status, body_text(response).await)
}

async fn body_text(response: axum::response::Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    String::from_utf8(body.to_vec()).expect("Body is not UTF-8")
}

fn encode(fields: &[(&'static str, String)]) -> String {
    let pairs: Vec<(&str, &str)> = fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
    form_body(&pairs)
}

#[tokio::test]
async fn index_renders_empty_form() {
    let dir = scratch_dir("index");
    write_mandatory_artifacts(&dir);
    let app = app_from_dir(&dir);

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    for field in crop_advisor::FEATURE_FIELDS {
        assert!(html.contains(&format!("name=\"{}\"", field)), "missing input {}", field);
    }
    assert!(html.contains("action=\"/predict\""));
    assert!(!html.contains("id=\"result\""));
}

#[tokio::test]
async fn predict_resolves_crops_through_tree() {
    let dir = scratch_dir("tree");
    write_mandatory_artifacts(&dir);
    let app = app_from_dir(&dir);

    let cases = [
        ("202.93", "20.8", "Rice is the best crop to be cultivated right there."),
        ("65.0", "30.0", "Maize is the best crop to be cultivated right there."),
        ("65.0", "20.0", "Kidneybeans is the best crop to be cultivated right there."),
    ];
    for (rainfall, temperature, expected) in cases {
        let (status, html) =
            post_predict(app.clone(), encode(&sample(rainfall, temperature))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains(expected), "expected {:?} in page", expected);
    }
}

#[tokio::test]
async fn label_encoder_overrides_table() {
    let dir = scratch_dir("encoder");
    write_mandatory_artifacts(&dir);
    // код 1 -> "rice" только если энкодер не используется; индекс 1 в classes - "maize"
    write_json(
        &dir,
        LABEL_ENCODER_FILE,
        json!({ "classes": ["apple", "maize", "rice"] }),
    );
    let app = app_from_dir(&dir);

    let (_, html) = post_predict(app, encode(&sample("202.93", "20.8"))).await;
    assert!(html.contains("maize is the best crop to be cultivated right there."));
}

#[tokio::test]
async fn missing_model_reports_configuration_error() {
    let dir = scratch_dir("unconfigured");
    write_mandatory_artifacts(&dir);
    fs::remove_file(dir.join(MODEL_FILE)).unwrap();
    let app = app_from_dir(&dir);

    let (status, html) = post_predict(app, "Nitrogen=abc".to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Server configuration error: model or scaler not loaded."));
}

#[tokio::test]
async fn validation_messages_are_rendered() {
    let dir = scratch_dir("validation");
    write_mandatory_artifacts(&dir);
    let app = app_from_dir(&dir);

    let mut fields = sample("202.93", "20.8");
    fields[5].1 = String::new();
    let (_, html) = post_predict(app.clone(), encode(&fields)).await;
    assert!(html.contains("Please provide a value for Ph."));

    let mut fields = sample("202.93", "20.8");
    fields[1].1 = "abc".to_string();
    let (_, html) = post_predict(app.clone(), encode(&fields)).await;
    assert!(html.contains("Invalid numeric value for Phosporus: "));
    assert!(html.contains("abc"));

    // без тела формы - первое поле отсутствует
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/predict")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Please provide a value for Nitrogen."));
}

#[tokio::test]
async fn repeated_field_uses_first_value() {
    let dir = scratch_dir("repeated");
    write_mandatory_artifacts(&dir);
    let app = app_from_dir(&dir);

    let valid = encode(&sample("202.93", "20.8"));
    let (_, html) = post_predict(app.clone(), format!("{}&Nitrogen=abc", valid)).await;
    assert!(html.contains("Rice is the best crop to be cultivated right there."));

    let (_, html) = post_predict(app, format!("Nitrogen=abc&{}", valid)).await;
    assert!(html.contains("Invalid numeric value for Nitrogen: "));
}

#[tokio::test]
async fn submitted_values_are_escaped() {
    let dir = scratch_dir("escape");
    write_mandatory_artifacts(&dir);
    let app = app_from_dir(&dir);

    let mut fields = sample("202.93", "20.8");
    fields[0].1 = "%3Cscript%3Ealert(1)%3C%2Fscript%3E".to_string();
    let (_, html) = post_predict(app, encode(&fields)).await;
    assert!(html.contains("Invalid numeric value for Nitrogen: "));
    assert!(!html.contains("<script>alert(1)</script>"));
}

#[tokio::test]
async fn health_reports_artifact_slots() {
    let dir = scratch_dir("health");
    write_mandatory_artifacts(&dir);
    let app = app_from_dir(&dir);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["artifacts"]["model"], true);
    assert_eq!(body["artifacts"]["label_encoder"], false);
}

#[tokio::test]
async fn predictions_are_deterministic() {
    let dir = scratch_dir("deterministic");
    write_mandatory_artifacts(&dir);
    let app = app_from_dir(&dir);

    let (_, first) = post_predict(app.clone(), encode(&sample("120.0", "25.0"))).await;
    for _ in 0..5 {
        let (_, again) = post_predict(app.clone(), encode(&sample("120.0", "25.0"))).await;
        assert_eq!(again, first);
    }
}
