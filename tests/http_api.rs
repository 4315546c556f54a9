use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use power_ts::data::sample::{SampleConfig, write_sample_file};
use power_ts::domain::DatasetConfig;
use power_ts::server::{AppState, router};

/// 40 days of hourly readings (960 rows).
fn sample_dataset(missing_prob: f64) -> (tempfile::TempDir, DatasetConfig) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("power.csv");
    let cfg = SampleConfig {
        start: NaiveDate::from_ymd_opt(2007, 1, 1).unwrap(),
        days: 40,
        step_minutes: 60,
        missing_prob,
        ..SampleConfig::default()
    };
    write_sample_file(&path, &cfg).unwrap();
    (dir, DatasetConfig { path, ..DatasetConfig::default() })
}

fn app_for(config: DatasetConfig) -> Router {
    router(AppState::new(config))
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let resp = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

const ANALYTICAL: [&str; 5] = [
    "/data-info",
    "/plot-energy",
    "/seasonal-decomposition",
    "/arima-forecast",
    "/sarima-forecast",
];

#[tokio::test]
async fn analytical_endpoints_need_a_loaded_dataset() {
    let (_dir, config) = sample_dataset(0.05);
    let app = app_for(config);
    for uri in ANALYTICAL {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["detail"], "Dataset is not loaded.", "{uri}");
    }
}

#[tokio::test]
async fn missing_file_is_a_client_error() {
    let app = app_for(DatasetConfig {
        path: "/nonexistent/power.csv".into(),
        ..DatasetConfig::default()
    });
    let (status, body) = get(&app, "/fetch-dataset").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "File does not exist.");

    let (status, _) = get(&app, "/plot-energy").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn fetch_is_idempotent_across_row_limits() {
    let (_dir, config) = sample_dataset(0.05);
    let app = app_for(config);

    let (status, first) = get(&app, "/fetch-dataset?row_limit=3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["message"], "Dataset loaded successfully.");
    assert_eq!(first["rows_in_preview"], 3);
    assert_eq!(first["rows_in_total"], 960);
    assert_eq!(first["preview_data"].as_array().unwrap().len(), 3);
    assert_eq!(first["preview_data"][0]["Date"], "2007-01-01T00:00:00");
    assert_eq!(first["preview_data"][0]["Time"], "00:00:00");

    let (_, second) = get(&app, "/fetch-dataset?row_limit=10").await;
    assert_eq!(second["rows_in_preview"], 10);
    assert_eq!(second["rows_in_total"], first["rows_in_total"]);

    let (_, default) = get(&app, "/fetch-dataset").await;
    assert_eq!(default["rows_in_preview"], 5);
    let (_, zero) = get(&app, "/fetch-dataset?row_limit=0").await;
    assert_eq!(zero["rows_in_preview"], 5);
}

#[tokio::test]
async fn negative_row_limit_drops_trailing_rows() {
    let (_dir, config) = sample_dataset(0.05);
    let app = app_for(config);
    let (status, body) = get(&app, "/fetch-dataset?row_limit=-2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rows_in_preview"], 958);
    assert_eq!(body["rows_in_total"], 960);
    assert_eq!(body["preview_data"].as_array().unwrap().len(), 958);
}

#[tokio::test]
async fn malformed_row_limit_is_a_json_client_error() {
    let (_dir, config) = sample_dataset(0.05);
    let app = app_for(config);
    let (status, body) = get(&app, "/fetch-dataset?row_limit=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().starts_with("Failed to deserialize query string"));
}

#[tokio::test]
async fn infinite_readings_fail_instead_of_leaking_nulls() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("inf.csv");
    let start = NaiveDate::from_ymd_opt(2007, 1, 1).unwrap();
    let mut csv = String::from("Date,Global_active_power\n");
    for i in 0..800u64 {
        let day = start.checked_add_days(chrono::Days::new(i)).unwrap();
        let value = if i == 400 { "inf".to_string() } else { format!("{:.3}", 1.0 + (i % 7) as f64 * 0.1) };
        csv.push_str(&format!("{},{value}\n", day.format("%d/%m/%Y")));
    }
    std::fs::write(&path, csv).unwrap();

    let app = app_for(DatasetConfig { path, ..DatasetConfig::default() });
    let (status, _) = get(&app, "/fetch-dataset").await;
    assert_eq!(status, StatusCode::OK);

    let cases = [
        ("/seasonal-decomposition", "Failed to perform seasonal decomposition."),
        ("/plot-energy", "Failed to fetch energy data."),
    ];
    for (uri, detail) in cases {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert_eq!(body["detail"], detail, "{uri}");
    }
}

#[tokio::test]
async fn health_reports_whether_the_dataset_is_loaded() {
    let (_dir, config) = sample_dataset(0.0);
    let app = app_for(config);
    let (status, before) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(before["status"], "alive");
    assert_eq!(before["dataset_loaded"], false);

    get(&app, "/fetch-dataset").await;
    let (_, after) = get(&app, "/health").await;
    assert_eq!(after["dataset_loaded"], true);
}

#[tokio::test]
async fn analytical_endpoints_after_load() {
    let (_dir, config) = sample_dataset(0.05);
    let app = app_for(config);
    let (status, _) = get(&app, "/fetch-dataset").await;
    assert_eq!(status, StatusCode::OK);

    // `?` dropouts keep every measurement column textual, so there is
    // nothing to describe; the numeric paths still coerce the target.
    let (status, info) = get(&app, "/data-info").await;
    assert_eq!(status, StatusCode::OK);
    assert!(info["info"].as_str().unwrap().contains("Global_active_power"));
    assert!(info["description"].as_object().unwrap().is_empty());

    let (status, plot) = get(&app, "/plot-energy").await;
    assert_eq!(status, StatusCode::OK);
    let x = plot["x"].as_array().unwrap();
    assert_eq!(x.len(), 40);
    assert_eq!(plot["y"].as_array().unwrap().len(), 40);
    assert_eq!(x[0], "2007-01-01");
    assert_eq!(x[39], "2007-02-09");

    let (status, dec) = get(&app, "/seasonal-decomposition").await;
    assert_eq!(status, StatusCode::OK);
    let n = dec["x"].as_array().unwrap().len();
    assert!(n > 730 && n <= 960);
    for key in ["trend", "seasonal", "residual"] {
        assert_eq!(dec[key].as_array().unwrap().len(), n, "{key}");
    }
    assert_eq!(dec["trend"][0], 0.0);

    let (status, arima) = get(&app, "/arima-forecast").await;
    assert_eq!(status, StatusCode::OK);
    let train = arima["train"]["y"].as_array().unwrap().len();
    let test = arima["test"]["y"].as_array().unwrap().len();
    assert_eq!(train, (train + test) * 4 / 5);
    assert_eq!(arima["forecast"]["y"].as_array().unwrap().len(), test);
    assert_eq!(arima["forecast"]["x"], arima["test"]["x"]);

    let (status, sarima) = get(&app, "/sarima-forecast").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sarima["historical"]["x"].as_array().unwrap().len(), 960);
    let fx = sarima["forecast"]["x"].as_array().unwrap();
    assert_eq!(fx.len(), 15);
    assert_eq!(fx[0], "2007-02-10");
    assert_eq!(fx[14], "2007-02-24");
}

#[tokio::test]
async fn data_info_describes_numeric_columns() {
    let (_dir, config) = sample_dataset(0.0);
    let app = app_for(config);
    get(&app, "/fetch-dataset").await;

    let (status, info) = get(&app, "/data-info").await;
    assert_eq!(status, StatusCode::OK);
    let text = info["info"].as_str().unwrap();
    assert!(text.starts_with("Rows: 960 (0 to 959)"));
    assert!(text.contains("960 non-null"));

    let description = info["description"].as_object().unwrap();
    assert!(description.get("Date").is_none());
    assert!(description.get("Time").is_none());
    assert_eq!(description["Voltage"]["count"], 960.0);
    for key in ["count", "mean", "std", "min", "25%", "50%", "75%", "max"] {
        assert!(description["Global_active_power"][key].is_number(), "{key}");
    }
}

#[tokio::test]
async fn model_failures_use_fixed_messages() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tiny.csv");
    std::fs::write(
        &path,
        "Date,Time,Global_active_power\n1/1/2007,00:00:00,1.0\n2/1/2007,00:00:00,2.0\n",
    )
    .unwrap();
    let app = app_for(DatasetConfig { path, ..DatasetConfig::default() });
    let (status, _) = get(&app, "/fetch-dataset").await;
    assert_eq!(status, StatusCode::OK);

    let cases = [
        ("/seasonal-decomposition", "Failed to perform seasonal decomposition."),
        ("/arima-forecast", "Failed to perform ARIMA forecasting."),
        ("/sarima-forecast", "Failed to perform SARIMA forecasting."),
    ];
    for (uri, detail) in cases {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert_eq!(body["detail"], detail, "{uri}");
    }

    let (status, plot) = get(&app, "/plot-energy").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(plot["y"], serde_json::json!([1.0, 2.0]));
}

#[tokio::test]
async fn responses_allow_any_origin() {
    let app = app_for(DatasetConfig::default());
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("origin", "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
}
