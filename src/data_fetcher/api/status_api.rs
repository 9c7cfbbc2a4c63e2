//! Upstream game-server status fetching

use reqwest::Client;
use serde_json::Value;
use std::future::Future;
use tracing::{debug, error, info, instrument};

use crate::data_fetcher::models::Roster;
use crate::data_fetcher::roster::{build_roster, select_server};
use crate::error::AppError;

/// Anything that can list the raw server records the scoreboard is built
/// from. The HTTP implementation is [`HttpStatusSource`]; tests substitute
/// in-memory sources.
pub trait StatusSource: Send + Sync + 'static {
    fn fetch_servers(&self) -> impl Future<Output = Result<Vec<Value>, AppError>> + Send;
}

/// Fetches the server list with a single GET. No retries: a failed request
/// fails every caller waiting on it.
#[derive(Debug, Clone)]
pub struct HttpStatusSource {
    client: Client,
    url: String,
}

impl HttpStatusSource {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl StatusSource for HttpStatusSource {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch_servers(&self) -> Result<Vec<Value>, AppError> {
        info!("Fetching server status from {}", self.url);

        let response = self.client.get(&self.url).send().await.map_err(|e| {
            error!("Request failed for URL {}: {}", self.url, e);
            AppError::UpstreamFetch(e)
        })?;

        let status = response.status();
        debug!("Response status: {status}");
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("Unknown error");
            error!("HTTP {} - {} (URL: {})", status.as_u16(), reason, self.url);
            return Err(AppError::upstream_status(status.as_u16(), reason, &self.url));
        }

        let body = response.text().await?;
        debug!("Response length: {} bytes", body.len());

        match serde_json::from_str::<Value>(&body)? {
            Value::Array(records) => {
                info!("Received {} server records", records.len());
                Ok(records)
            }
            other => {
                let preview: String = other.to_string().chars().take(200).collect();
                error!("Status response is not a list: {preview}");
                Err(AppError::malformed("Server status response is not a list"))
            }
        }
    }
}

/// Fetches the server list, picks the server matching `filter` and builds
/// its roster.
#[instrument(skip(source))]
pub async fn fetch_roster<S: StatusSource>(
    source: &S,
    filter: Option<&str>,
) -> Result<Roster, AppError> {
    let records = source.fetch_servers().await?;
    let server = select_server(&records, filter)?;
    build_roster(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_fetcher::api::http_client::create_test_http_client;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    fn status_body() -> Value {
        json!([
            {
                "info_hostname": "TacoServer Dev",
                "info_map": "Katabatic",
                "info_maptype": "CTF",
                "info_players": []
            },
            {
                "info_hostname": "Discord PUB",
                "info_map": "Sun &amp; Dried",
                "info_maptype": "LakRabbit",
                "info_players": [
                    { "name": "", "score": 0,
                      "0": { "name": "bravo", "score": 4 },
                      "1": { "name": "alpha", "score": 9 } }
                ]
            }
        ])
    }

    async fn mock_status(template: ResponseTemplate) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json"))
            .respond_with(template)
            .mount(&mock_server)
            .await;
        mock_server
    }

    #[tokio::test]
    async fn test_fetch_roster_selects_matching_server() {
        let mock_server = mock_status(ResponseTemplate::new(200).set_body_json(status_body())).await;
        let source = HttpStatusSource::new(
            create_test_http_client(),
            format!("{}/json", mock_server.uri()),
        );

        let roster = fetch_roster(&source, Some("^Discord PUB$")).await.unwrap();
        assert_eq!(roster.map, "Sun & Dried");
        assert_eq!(roster.game_type, "LakRabbit");
        assert_eq!(roster.game_teams[0].players[0].name, "alpha");
        assert_eq!(roster.player_count, 2);
    }

    #[tokio::test]
    async fn test_fetch_roster_without_filter_uses_first_server() {
        let mock_server = mock_status(ResponseTemplate::new(200).set_body_json(status_body())).await;
        let source = HttpStatusSource::new(
            create_test_http_client(),
            format!("{}/json", mock_server.uri()),
        );

        let roster = fetch_roster(&source, None).await.unwrap();
        assert_eq!(roster.map, "Katabatic");
        assert!(!roster.has_players());
    }

    #[tokio::test]
    async fn test_server_error_status() {
        let mock_server = mock_status(ResponseTemplate::new(503)).await;
        let source = HttpStatusSource::new(
            create_test_http_client(),
            format!("{}/json", mock_server.uri()),
        );

        let err = source.fetch_servers().await.unwrap_err();
        assert!(matches!(err, AppError::UpstreamStatus { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_invalid_json_is_parse_error() {
        let mock_server = mock_status(ResponseTemplate::new(200).set_body_string("<html>")).await;
        let source = HttpStatusSource::new(
            create_test_http_client(),
            format!("{}/json", mock_server.uri()),
        );

        let err = source.fetch_servers().await.unwrap_err();
        assert!(matches!(err, AppError::UpstreamParse(_)));
    }

    #[tokio::test]
    async fn test_non_list_body_is_malformed() {
        let mock_server =
            mock_status(ResponseTemplate::new(200).set_body_json(json!({ "servers": [] }))).await;
        let source = HttpStatusSource::new(
            create_test_http_client(),
            format!("{}/json", mock_server.uri()),
        );

        let err = source.fetch_servers().await.unwrap_err();
        assert!(err.is_malformed());
    }
}
