//! HTTP surface: the scoreboard image, its JSON form and the font test.

use axum::{Json, Router};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::Config;
use crate::constants::cache::{FRESH_CACHE_CONTROL, IMMUTABLE_CACHE_CONTROL};
use crate::constants::image::CONTENT_TYPE as PNG_CONTENT_TYPE;
use crate::data_fetcher::api::create_http_client;
use crate::data_fetcher::cache::Snapshot;
use crate::data_fetcher::{HttpStatusSource, Player, Roster, StatusSource, player_grid};
use crate::error::AppError;
use crate::scoreboard::{FontRegistry, Padding};
use crate::service::ScoreboardService;

pub const PLAYER_COUNT_HEADER: &str = "server-player-count";

#[derive(Debug, Default, Deserialize)]
pub struct ScoreboardQuery {
    #[serde(rename = "serverName")]
    pub server_name: Option<String>,
    pub padding: Option<String>,
    pub t: Option<String>,
}

/// JSON form of `GET /`: the roster, its player grid and the image.
#[derive(Serialize)]
struct ScoreboardJson<'a> {
    #[serde(flatten)]
    roster: &'a Roster,
    rows: Vec<Vec<Option<&'a Player>>>,
    image: String,
}

/// Any failure becomes a 500 carrying the error text.
pub struct ApiError(String);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err.to_string())
    }
}

impl From<Arc<AppError>> for ApiError {
    fn from(err: Arc<AppError>) -> Self {
        ApiError(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("Request failed: {}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain")],
            self.0,
        )
            .into_response()
    }
}

/// Builds the application router around `service`.
pub fn router<S: StatusSource>(service: ScoreboardService<S>) -> Router {
    Router::new()
        .route("/", get(scoreboard::<S>))
        .route("/:timestamp/image.png", get(scoreboard_image::<S>))
        .route("/font-test", get(font_test::<S>))
        .with_state(service)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}

async fn scoreboard<S: StatusSource>(
    State(service): State<ScoreboardService<S>>,
    Query(query): Query<ScoreboardQuery>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let padding = Padding::parse_or_default(query.padding.as_deref());
    let timestamp = query.t.as_deref().filter(|t| !t.is_empty());
    let snapshot = service
        .snapshot(query.server_name.as_deref(), padding, timestamp)
        .await?;
    let cache_control = cache_control(timestamp.is_some());

    if accepts_json(&headers) {
        let body = ScoreboardJson {
            roster: &snapshot.roster,
            rows: player_grid(&snapshot.roster).rows,
            image: BASE64.encode(&snapshot.image),
        };
        return Ok(([(header::CACHE_CONTROL, cache_control)], Json(body)).into_response());
    }

    Ok(image_response(&snapshot, cache_control))
}

async fn scoreboard_image<S: StatusSource>(
    State(service): State<ScoreboardService<S>>,
    Path(timestamp): Path<String>,
    Query(query): Query<ScoreboardQuery>,
) -> Result<Response, ApiError> {
    let padding = Padding::parse_or_default(query.padding.as_deref());
    let snapshot = service
        .snapshot(query.server_name.as_deref(), padding, Some(&timestamp))
        .await?;

    let mut response = image_response(&snapshot, cache_control(true));
    let disposition = format!(
        "inline; filename=\"t2-server-{}.png\"",
        sanitize_filename(&timestamp)
    );
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        response
            .headers_mut()
            .insert(header::CONTENT_DISPOSITION, value);
    }
    Ok(response)
}

async fn font_test<S: StatusSource>(
    State(service): State<ScoreboardService<S>>,
) -> Result<Response, ApiError> {
    let image = service.font_test().await?;
    Ok(([(header::CONTENT_TYPE, PNG_CONTENT_TYPE)], image).into_response())
}

fn image_response(snapshot: &Snapshot, cache_control: HeaderValue) -> Response {
    (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(PNG_CONTENT_TYPE)),
            (header::CACHE_CONTROL, cache_control),
            (
                header::HeaderName::from_static(PLAYER_COUNT_HEADER),
                HeaderValue::from(snapshot.roster.player_count),
            ),
        ],
        snapshot.image.clone(),
    )
        .into_response()
}

fn cache_control(immutable: bool) -> HeaderValue {
    HeaderValue::from_static(if immutable {
        IMMUTABLE_CACHE_CONTROL
    } else {
        FRESH_CACHE_CONTROL
    })
}

/// Whether the client asked for JSON rather than the image.
fn accepts_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|accept| {
            accept.split(',').any(|media| {
                media
                    .split(';')
                    .next()
                    .is_some_and(|kind| kind.trim().eq_ignore_ascii_case("application/json"))
            })
        })
}

fn sanitize_filename(token: &str) -> String {
    token
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect()
}

/// Loads fonts, wires the upstream source and serves until the process
/// is stopped.
pub async fn serve(config: &Config) -> Result<(), AppError> {
    let client = create_http_client(config.http_timeout_seconds)
        .map_err(|e| AppError::config_error(format!("Failed to build HTTP client: {e}")))?;
    let source = HttpStatusSource::new(client, &config.status_url);
    let fonts = FontRegistry::load(&config.fonts);
    let service = ScoreboardService::new(source, fonts, config);
    let app = router(service);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{addr} (status source {})", config.status_url);
    axum::serve(listener, app).await?;
    Ok(())
}
