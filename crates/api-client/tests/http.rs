use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{TimeZone, Utc};
use serde_json::{Value, json};

use cosmicface_api::{AnalyzeCompatibilityRequest, AnalyzeImageRequest, SaveAnalysisRequest};
use cosmicface_api_client::{BackendError, FunctionsClient, GeminiClient, InlineImage};
use cosmicface_core::{AnalysisKind, testing};

type Seen = Arc<Mutex<Vec<(String, Value)>>>;

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn recording(name: &'static str, reply: Value) -> axum::routing::MethodRouter<Seen> {
    post(move |State(seen): State<Seen>, Json(body): Json<Value>| {
        let reply = reply.clone();
        async move {
            seen.lock().unwrap().push((name.to_string(), body));
            Json(reply)
        }
    })
}

fn functions_client(base: &str) -> FunctionsClient {
    FunctionsClient::new(base, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn analyze_image_routes_by_kind_and_unwraps_data() {
    let seen: Seen = Arc::default();
    let data: Value = serde_json::from_str(testing::LIFE_MAP_JSON).unwrap();
    let app = Router::new()
        .route(
            "/analyzeLifeMap",
            recording("analyzeLifeMap", json!({ "success": true, "data": data })),
        )
        .with_state(seen.clone());
    let base = serve(app).await;

    let got = functions_client(&base)
        .analyze_image(&AnalyzeImageRequest {
            image_base64: "aGVsbG8=".into(),
            analysis_type: AnalysisKind::LifeMap,
            user_id: Some("u1".into()),
        })
        .await
        .unwrap();

    assert_eq!(got["personalityScores"]["openness"], 88);
    let calls = seen.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "analyzeLifeMap");
    assert_eq!(calls[0].1["analysisType"], "life-map");
    assert_eq!(calls[0].1["imageBase64"], "aGVsbG8=");
}

#[tokio::test]
async fn success_false_is_rejected() {
    let seen: Seen = Arc::default();
    let app = Router::new()
        .route(
            "/analyzeCompatibility",
            recording(
                "analyzeCompatibility",
                json!({ "success": false, "error": "quota exceeded" }),
            ),
        )
        .with_state(seen.clone());
    let base = serve(app).await;

    let err = functions_client(&base)
        .analyze_compatibility(&AnalyzeCompatibilityRequest {
            image1_base64: "YQ==".into(),
            image2_base64: "Yg==".into(),
            user_id: None,
        })
        .await
        .unwrap_err();

    match err {
        BackendError::Rejected { message, .. } => assert_eq!(message, "quota exceeded"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn http_error_status_is_reported() {
    let app = Router::new().route(
        "/analyzeImage",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let base = serve(app).await;

    let err = functions_client(&base)
        .analyze_image(&AnalyzeImageRequest {
            image_base64: "aGk=".into(),
            analysis_type: AnalysisKind::DailyInsight,
            user_id: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, BackendError::Status { status: 500, .. }), "{err}");
}

#[tokio::test]
async fn slow_backend_times_out() {
    let app = Router::new().route(
        "/analyzeImage",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(json!({ "success": true, "data": {} }))
        }),
    );
    let base = serve(app).await;

    let client = FunctionsClient::new(&base, Duration::from_millis(100)).unwrap();
    let err = client
        .analyze_image(&AnalyzeImageRequest {
            image_base64: "aGk=".into(),
            analysis_type: AnalysisKind::DailyInsight,
            user_id: None,
        })
        .await
        .unwrap_err();

    assert!(err.is_timeout(), "{err}");
}

#[tokio::test]
async fn history_is_returned_newest_first() {
    let seen: Seen = Arc::default();
    let payload: Value = serde_json::from_str(testing::COMPATIBILITY_JSON).unwrap();
    let app = Router::new()
        .route(
            "/getUserHistory",
            recording(
                "getUserHistory",
                json!([
                    { "id": "old", "analysisType": "compatibility", "result": payload, "timestamp": "2026-01-01T00:00:00Z" },
                    { "id": "new", "analysisType": "compatibility", "result": payload, "timestamp": "2026-03-01T00:00:00Z" }
                ]),
            ),
        )
        .with_state(seen.clone());
    let base = serve(app).await;

    let entries = functions_client(&base).history("u1").await.unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].id, "new");
    assert_eq!(seen.lock().unwrap()[0].1["userId"], "u1");
}

#[tokio::test]
async fn save_sends_camel_case_body() {
    let seen: Seen = Arc::default();
    let app = Router::new()
        .route(
            "/saveAnalysisResult",
            recording("saveAnalysisResult", json!({ "success": true })),
        )
        .with_state(seen.clone());
    let base = serve(app).await;

    functions_client(&base)
        .save_analysis(&SaveAnalysisRequest {
            user_id: "u1".into(),
            analysis_type: AnalysisKind::DailyInsight,
            result: json!({ "k": 1 }),
            timestamp: Utc.with_ymd_and_hms(2026, 10, 1, 9, 30, 0).unwrap(),
        })
        .await
        .unwrap();

    let calls = seen.lock().unwrap();
    assert_eq!(calls[0].1["userId"], "u1");
    assert_eq!(calls[0].1["analysisType"], "daily-insight");
    assert!(calls[0].1["timestamp"].as_str().unwrap().starts_with("2026-10-01T09:30:00"));
}

#[tokio::test]
async fn gemini_returns_first_candidate_text() {
    let seen: Seen = Arc::default();
    let reply_text = testing::in_markdown_fence(testing::DAILY_INSIGHT_JSON);
    let app = Router::new()
        .route(
            "/models/{model}",
            recording(
                "generateContent",
                json!({ "candidates": [{ "content": { "parts": [{ "text": reply_text }] } }] }),
            ),
        )
        .with_state(seen.clone());
    let base = serve(app).await;

    let client = GeminiClient::new(&base, "gemini-1.5-flash", "test-key", Duration::from_secs(5)).unwrap();
    let text = client
        .generate(
            AnalysisKind::DailyInsight,
            &[InlineImage {
                mime_type: "image/jpeg".into(),
                data: "aGk=".into(),
            }],
        )
        .await
        .unwrap();

    assert_eq!(text, reply_text);
    let calls = seen.lock().unwrap();
    let parts = &calls[0].1["contents"][0]["parts"];
    assert_eq!(parts[1]["inline_data"]["mime_type"], "image/jpeg");
    assert_eq!(calls[0].1["generationConfig"]["temperature"], 0.7);
}

#[tokio::test]
async fn gemini_without_candidates_is_an_empty_reply() {
    let app = Router::new().route("/models/{model}", post(|| async { Json(json!({ "candidates": [] })) }));
    let base = serve(app).await;

    let client = GeminiClient::new(&base, "gemini-1.5-flash", "k", Duration::from_secs(5)).unwrap();
    let err = client.generate(AnalysisKind::LifeMap, &[]).await.unwrap_err();
    assert!(matches!(err, BackendError::EmptyReply { .. }), "{err}");
}
