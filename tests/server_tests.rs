use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use timetable_solver::server::{AppState, router};
use timetable_solver::transport::{Chunk, reassemble};
use tower::ServiceExt;

fn dataset() -> Value {
    json!({
        "Operating Systems": {"title": "Operating Systems", "code": "CS330", "class": [
            {"classes": [{"misc": [
                {"day": "Monday", "start": 540, "end": 660, "seatsAvailable": 10, "instructor": "Dr. Tan"}
            ]}]},
            {"classes": [{"misc": [
                {"day": "Saturday", "start": 540, "end": 660, "seatsAvailable": 10, "instructor": "Dr. Wong"}
            ]}]},
            {"classes": [{"misc": [
                {"day": "Friday", "start": 540, "end": 660, "seatsAvailable": 0, "instructor": "Dr. Lee"}
            ]}]}
        ]},
        "Networks": {"title": "Networks", "code": "CS340", "class": [
            {"classes": [{"misc": [
                {"day": "Tuesday", "start": 600, "end": 720, "seatsAvailable": 5, "instructor": "Dr. Ong"}
            ]}]}
        ]}
    })
}

fn avoid_saturday() -> Value {
    json!({
        "filters": [{"id": "daysofweek", "rank": 1}, {"id": "instructor", "rank": 2}],
        "daysOfWeek": {"days": [{"day": "saturday", "rank": 1}]}
    })
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    send_text(app, method, uri, body.map(|body| body.to_string())).await
}

async fn send_text(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<String>,
) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

// day of the first meeting of `code` in each combination
fn days_of(combinations: &Value, code: &str) -> Vec<String> {
    combinations
        .as_array()
        .unwrap()
        .iter()
        .map(|c| {
            let entry = c["courses"]
                .as_array()
                .unwrap()
                .iter()
                .find(|entry| entry["code"] == code)
                .unwrap();
            let meeting = &entry["option"]["classes"][0]["misc"][0];
            meeting["day"].as_str().unwrap().to_string()
        })
        .collect()
}

#[tokio::test]
async fn generate_then_reprioritize() {
    let app = router(AppState::new(64));

    let (status, body) = send(
        &app,
        "POST",
        "/v1/timetable/generate",
        Some(json!({"dataset": dataset(), "filters": avoid_saturday()})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["report"]["candidates"], 3);
    assert_eq!(body["report"]["feasible"], 2);
    assert_eq!(days_of(&body["combinations"], "CS330"), ["Monday", "Saturday"]);
    assert_eq!(body["weights"][0]["id"], "daysofweek");

    let (status, body) = send(
        &app,
        "POST",
        "/v1/timetable/priorities",
        Some(json!({
            "filters": [{"id": "daysofweek", "rank": 1}],
            "daysOfWeek": {"days": [{"day": "monday", "rank": 1}]}
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(days_of(&body["combinations"], "CS330"), ["Saturday", "Monday"]);
    assert_eq!(days_of(&body["combinations"], "CS340"), ["Tuesday", "Tuesday"]);

    let (status, body) = send(&app, "GET", "/v1/timetable/instructors", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(["Dr. Ong", "Dr. Tan", "Dr. Wong"]));
}

#[tokio::test]
async fn chunks_reassemble_to_the_ranked_set() {
    let app = router(AppState::new(64));
    let (status, generated) = send(
        &app,
        "POST",
        "/v1/timetable/generate",
        Some(json!({"dataset": dataset(), "filters": avoid_saturday()})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, first) = send(&app, "GET", "/v1/timetable/chunks/0", None).await;
    assert_eq!(status, StatusCode::OK);
    let first: Chunk = serde_json::from_value(first).unwrap();
    assert!(first.total > 1);

    let mut chunks = vec![first.clone()];
    for index in 1..first.total {
        let (status, chunk) = send(&app, "GET", &format!("/v1/timetable/chunks/{index}"), None).await;
        assert_eq!(status, StatusCode::OK);
        chunks.push(serde_json::from_value(chunk).unwrap());
    }
    let whole: Value = reassemble(chunks).unwrap();
    assert_eq!(whole, generated["combinations"]);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/v1/timetable/chunks/{}", first.total),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reranking_before_generation_conflicts() {
    let app = router(AppState::new(1_000_000));
    let (status, _) = send(&app, "POST", "/v1/timetable/priorities", Some(avoid_saturday())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = send(&app, "GET", "/v1/timetable/chunks/0", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn duplicate_filters_are_rejected() {
    let app = router(AppState::new(1_000_000));
    let (status, _) = send(
        &app,
        "POST",
        "/v1/timetable/generate",
        Some(json!({
            "dataset": dataset(),
            "filters": {"filters": [{"id": "time", "rank": 1}, {"id": "time", "rank": 2}]}
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn all_conflicting_is_an_empty_success() {
    let app = router(AppState::new(1_000_000));
    let clash = json!({"title": "X", "code": "X1", "class": [
        {"classes": [{"misc": [{"day": "Monday", "start": 540, "end": 600, "seatsAvailable": 1}]}]}
    ]});
    let (status, body) = send(
        &app,
        "POST",
        "/v1/timetable/generate",
        Some(json!({"dataset": {"x": clash, "y": clash}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["report"]["feasible"], 0);
    assert_eq!(body["combinations"], json!([]));
}

#[tokio::test]
async fn unconstrained_combinations_and_ingest() {
    let app = router(AppState::new(1_000_000));
    let (status, body) = send(&app, "POST", "/v1/timetable/combinations", Some(dataset())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);
    assert!(body[0].get("fitness").is_none());

    let (status, body) = send(
        &app,
        "POST",
        "/v1/courses/ingest",
        Some(json!([{
            "title": "Compilers",
            "code": "CS450",
            "rows": [
                {"Status": "Open", "Days and Times": "Monday 9:00AM to 10:30AM", "Available Seats": "7", "Instructor": "Dr. Goh"},
                {"Status": "Closed", "Days and Times": "Tuesday 9:00AM to 10:30AM", "Available Seats": "0"}
            ]
        }])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let options = body["Compilers"]["class"].as_array().unwrap();
    assert_eq!(options.len(), 1);
    assert_eq!(
        options[0]["classes"][0]["misc"][0],
        json!({"day": "Monday", "start": 540, "end": 630, "seatsAvailable": 7, "instructor": "Dr. Goh"})
    );
}

#[tokio::test]
async fn request_key_order_is_course_order() {
    let app = router(AppState::new(1_000_000));
    let body = r#"{
        "Zoology": {"title": "Zoology", "code": "BI210", "class": [
            {"classes": [{"misc": [{"day": "Monday", "start": 540, "end": 600}]}]}
        ]},
        "Algebra": {"title": "Algebra", "code": "MA110", "class": [
            {"classes": [{"misc": [{"day": "Tuesday", "start": 540, "end": 600}]}]}
        ]}
    }"#;
    let (status, body) = send_text(
        &app,
        "POST",
        "/v1/timetable/combinations",
        Some(body.to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let codes: Vec<&str> = body[0]["courses"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, ["BI210", "MA110"]);
}
