// src/api/client.rs
//! HTTP client for the player lookup API.
//!
//! A thin wrapper around reqwest: it builds the request URL, attaches the
//! configured headers, and hands the raw response to the parser. TLS
//! certificate verification is always on and plain http is refused.

use super::parser::parse_player_response;
use super::PlayerRepository;
use crate::config::FetchSettings;
use crate::constants::PLAYERS_PATH_SEGMENT;
use crate::error::{AppError, FetchFailure};
use crate::model::EntityRecord;
use crate::types::{PlayerId, ValidationError};
use reqwest::header::HeaderMap;
use reqwest::{Client, Request, Response};
use std::time::Duration;
use url::Url;

/// Connect phase never waits longer than this, even with a long request timeout.
const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// A thin wrapper around reqwest Client for player lookups.
#[derive(Clone)]
pub struct PlayerHttpClient {
    client: Client,
    base_url: Url,
    headers: HeaderMap,
}

impl PlayerHttpClient {
    /// Creates a client from validated fetch settings.
    pub fn new(settings: &FetchSettings) -> Result<Self, AppError> {
        let base_url = settings.base_url.clone();
        if base_url.scheme() != "https" || base_url.cannot_be_a_base() {
            return Err(ValidationError::InvalidUrl {
                url: settings.base_url.to_string(),
                reason: "the player API must be an https URL with a host".to_string(),
            }
            .into());
        }

        let client = Client::builder()
            .https_only(true)
            .timeout(settings.timeout)
            .connect_timeout(settings.timeout.min(MAX_CONNECT_TIMEOUT))
            .build()?;

        log::debug!(
            "Player API client ready: {} ({} headers, timeout {:?})",
            base_url,
            settings.headers.len(),
            settings.timeout
        );

        Ok(Self {
            client,
            base_url,
            headers: settings.headers.clone(),
        })
    }

    /// `<base-url>/players/<id>`, with the identifier encoded as one path segment.
    pub fn player_url(&self, id: &PlayerId) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push(PLAYERS_PATH_SEGMENT)
                .push(id.as_str());
        }
        url
    }

    /// The GET request for one player, with the configured header set attached.
    pub fn player_request(&self, id: &PlayerId) -> Result<Request, FetchFailure> {
        self.client
            .get(self.player_url(id))
            .headers(self.headers.clone())
            .build()
            .map_err(|e| FetchFailure::transport(id.clone(), describe_transport_error(&e)))
    }

    /// Makes a GET request for one player.
    async fn get(&self, id: &PlayerId) -> Result<Response, FetchFailure> {
        let request = self.player_request(id)?;
        log::debug!("GET {}", request.url());

        self.client
            .execute(request)
            .await
            .map_err(|e| FetchFailure::transport(id.clone(), describe_transport_error(&e)))
    }
}

#[async_trait::async_trait]
impl PlayerRepository for PlayerHttpClient {
    async fn fetch_player(&self, id: &PlayerId) -> Result<EntityRecord, FetchFailure> {
        let response = self.get(id).await?;
        let result = extract_response_text(id, response).await?;
        log::debug!("{} answered {}", result.url, result.status);
        parse_player_response(id, result)
    }
}

/// Result of an HTTP operation with response metadata.
#[derive(Debug)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: reqwest::StatusCode,
    pub url: String,
}

/// Reads the response body.
///
/// A body that cannot be read is a transport failure on a success status;
/// on an error status the status itself is what gets reported.
pub async fn extract_response_text(
    id: &PlayerId,
    response: Response,
) -> Result<ApiResponse<String>, FetchFailure> {
    let status = response.status();
    let url = response.url().to_string();

    let data = match response.text().await {
        Ok(text) => text,
        Err(e) if status.is_success() => {
            return Err(FetchFailure::transport(
                id.clone(),
                describe_transport_error(&e),
            ))
        }
        Err(e) => {
            log::debug!("Could not read error body from {}: {}", url, e);
            String::new()
        }
    };

    Ok(ApiResponse { data, status, url })
}

/// reqwest's top-level message is generic; the useful part is in the source chain.
fn describe_transport_error(error: &reqwest::Error) -> String {
    let mut message = if error.is_timeout() {
        format!("timed out: {}", error)
    } else {
        error.to_string()
    };

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = std::error::Error::source(cause);
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_base_url;
    use crate::error::FetchFailureReason;

    fn client_for(base: &str) -> PlayerHttpClient {
        let settings = FetchSettings {
            timeout: Duration::from_secs(2),
            ..FetchSettings::new(parse_base_url(base).unwrap())
        };
        PlayerHttpClient::new(&settings).unwrap()
    }

    fn id(value: &str) -> PlayerId {
        PlayerId::new(value).unwrap()
    }

    #[test]
    fn builds_player_url_under_base() {
        let client = client_for("https://api.prizepicks.com");
        assert_eq!(
            client.player_url(&id("212314")).as_str(),
            "https://api.prizepicks.com/players/212314"
        );
    }

    #[test]
    fn keeps_base_path_prefix() {
        let client = client_for("https://proxy.example/api/v2/");
        assert_eq!(
            client.player_url(&id("a")).as_str(),
            "https://proxy.example/api/v2/players/a"
        );
    }

    #[test]
    fn identifier_is_a_single_encoded_segment() {
        let client = client_for("https://api.example");
        assert_eq!(
            client.player_url(&id("a b/../c")).as_str(),
            "https://api.example/players/a%20b%2F..%2Fc"
        );
        assert_eq!(
            client.player_url(&id("...")).as_str(),
            "https://api.example/players/..."
        );
    }

    #[test]
    fn request_carries_configured_headers() {
        let mut settings = FetchSettings::new(parse_base_url("https://api.example").unwrap());
        settings.headers =
            FetchSettings::request_headers(&["Origin: https://example.test".to_string()]).unwrap();
        let client = PlayerHttpClient::new(&settings).unwrap();

        let request = client.player_request(&id("212314")).unwrap();

        assert_eq!(*request.method(), reqwest::Method::GET);
        assert_eq!(request.url().path(), "/players/212314");
        assert_eq!(request.headers()["origin"], "https://example.test");
        assert_eq!(request.headers()["accept"], "application/json");
        assert!(request.headers().contains_key("user-agent"));
    }

    fn http_response(status: u16, body: &'static str) -> Response {
        Response::from(
            ::http::Response::builder()
                .status(status)
                .body(body)
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn success_body_is_read_and_decoded() {
        let body = r#"{"data":{"id":"a","type":"new_player","attributes":{
            "name":"X","position":"G","team":"LAC","team_name":"Lunar Owls",
            "market":"Lunar Owls","image_url":null,"league":"UNRIVALED",
            "updated_at":"2025-01-30","created_at":"2025-01-10"}}}"#;

        let result = extract_response_text(&id("a"), http_response(200, body))
            .await
            .unwrap();
        assert_eq!(result.status, reqwest::StatusCode::OK);

        let record = parse_player_response(&id("a"), result).unwrap();
        assert_eq!(record.name, "X");
        assert_eq!(record.image_url, "");
    }

    #[tokio::test]
    async fn error_status_body_is_kept_for_the_failure_detail() {
        let result = extract_response_text(&id("b"), http_response(404, "no such player"))
            .await
            .unwrap();
        assert_eq!(result.status, reqwest::StatusCode::NOT_FOUND);
        assert_eq!(result.data, "no such player");

        let failure = parse_player_response(&id("b"), result).unwrap_err();
        assert_eq!(failure.reason.status(), Some(404));
        assert!(failure.to_string().contains("no such player"));
    }

    #[test]
    fn refuses_plain_http() {
        let settings = FetchSettings::new(Url::parse("http://api.example").unwrap());
        assert!(PlayerHttpClient::new(&settings).is_err());
    }

    #[tokio::test]
    async fn connection_failure_is_transport_failure() {
        // Nothing listens on port 1; the connection is refused before TLS starts.
        let client = client_for("https://127.0.0.1:1");

        let failure = client.fetch_player(&id("a")).await.unwrap_err();

        assert_eq!(failure.identifier, id("a"));
        assert!(matches!(failure.reason, FetchFailureReason::Transport { .. }));
    }
}
