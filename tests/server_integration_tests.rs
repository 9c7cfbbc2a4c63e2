use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use http_body_util::BodyExt;
use serde_json::Value;
use t2_scoreboard::{
    Config, FontRegistry, ScoreboardService,
    server::{PLAYER_COUNT_HEADER, router},
    testing_utils::{MockStatusSource, TestDataBuilder},
};
use tower::ServiceExt;

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

fn app(source: &MockStatusSource) -> Router {
    router(ScoreboardService::new(
        source.clone(),
        FontRegistry::empty(),
        &Config::default(),
    ))
}

fn source() -> MockStatusSource {
    MockStatusSource::new(vec![TestDataBuilder::server_record(
        "Discord PUB",
        "Katabatic",
        &[
            ("Storm", 40, &[("Blaze", 30), ("Pyro", 12), ("Ash", 4)]),
            ("Inferno", 34, &[("Frost", 25), ("Chill", 9)]),
        ],
    )])
}

async fn get(app: Router, uri: &str, accept: Option<&str>) -> Response<Body> {
    let mut request = Request::builder().uri(uri);
    if let Some(accept) = accept {
        request = request.header(header::ACCEPT, accept);
    }
    app.oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

fn header_value<'a>(response: &'a Response<Body>, name: &str) -> &'a str {
    response.headers()[name].to_str().unwrap()
}

#[tokio::test]
async fn test_root_returns_fresh_png() {
    let response = get(app(&source()), "/", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_value(&response, "content-type"), "image/png");
    assert_eq!(header_value(&response, "cache-control"), "no-cache");
    assert_eq!(header_value(&response, PLAYER_COUNT_HEADER), "5");
    assert!(body_bytes(response).await.starts_with(PNG_SIGNATURE));
}

#[tokio::test]
async fn test_timestamped_request_is_immutable() {
    let response = get(app(&source()), "/?t=1700000000&padding=4", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(header_value(&response, "cache-control").contains("immutable"));
}

#[tokio::test]
async fn test_empty_timestamp_is_treated_as_absent() {
    let response = get(app(&source()), "/?t=", None).await;
    assert_eq!(header_value(&response, "cache-control"), "no-cache");
}

#[tokio::test]
async fn test_json_response_carries_roster_rows_and_image() {
    let response = get(app(&source()), "/", Some("application/json")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(header_value(&response, "content-type").starts_with("application/json"));

    let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["map"], "Katabatic");
    assert_eq!(json["playerCount"], 5);
    assert_eq!(json["gameTeams"].as_array().unwrap().len(), 2);

    let rows = json["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0][0]["name"], "Blaze");
    assert_eq!(rows[0][1]["name"], "Frost");
    assert!(rows[2][1].is_null());

    let image = BASE64.decode(json["image"].as_str().unwrap()).unwrap();
    assert!(image.starts_with(PNG_SIGNATURE));
}

#[tokio::test]
async fn test_path_timestamp_sets_disposition() {
    let response = get(app(&source()), "/1700000000/image.png", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header_value(&response, "content-disposition"),
        "inline; filename=\"t2-server-1700000000.png\""
    );
    assert!(header_value(&response, "cache-control").contains("immutable"));
}

#[tokio::test]
async fn test_path_and_query_timestamps_share_snapshot() {
    let source = source();
    let app = app(&source);

    let from_query = body_bytes(get(app.clone(), "/?t=42", None).await).await;
    source.set_records(vec![TestDataBuilder::server_record(
        "Discord PUB",
        "Katabatic",
        &[],
    )]);
    let from_path = body_bytes(get(app, "/42/image.png", None).await).await;

    assert_eq!(from_query, from_path);
    assert_eq!(source.fetch_count(), 1);
}

#[tokio::test]
async fn test_font_test_returns_png() {
    let response = get(app(&source()), "/font-test", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_value(&response, "content-type"), "image/png");
    assert!(body_bytes(response).await.starts_with(PNG_SIGNATURE));
}

#[tokio::test]
async fn test_upstream_failure_is_plain_500() {
    let source = source();
    source.set_failing(true);
    let response = get(app(&source), "/", None).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(header_value(&response, "content-type"), "text/plain");
    let body = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(body.contains("503"), "{body}");
}

#[tokio::test]
async fn test_invalid_server_filter_is_500() {
    let response = get(app(&source()), "/?serverName=%28", None).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_unknown_server_is_500() {
    let response = get(app(&source()), "/?serverName=Nowhere", None).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
