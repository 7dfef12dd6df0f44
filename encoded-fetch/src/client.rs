//! HTTP transport for fetch slots
//!
//! [`HttpClient`] issues the GETs the coordinator asks for, parses bodies
//! according to the slot's [`ExpectedType`] and maps every failure to a
//! [`FetchError`].

use crate::error::{FetchError, Result};
use crate::types::{ExpectedType, FetchResponse, FetchedValue};
use async_trait::async_trait;
use encoded_config::HttpSettings;
use reqwest::header::{ACCEPT, ETAG};
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Something that can perform one slot request.
///
/// Implemented by [`HttpClient`]; tests substitute their own.
#[async_trait]
pub trait HttpFetcher: Send + Sync + 'static {
    async fn fetch(&self, url: &str, expected: ExpectedType) -> Result<FetchResponse>;
}

/// reqwest-backed fetcher with an optional base URL for relative paths.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Option<Url>,
}

impl HttpClient {
    /// Client built from default [`HttpSettings`].
    pub fn new() -> Result<Self> {
        Self::with_config(&HttpSettings::default())
    }

    /// Client with the configured timeout, redirect limit, user agent and
    /// base URL.
    pub fn with_config(settings: &HttpSettings) -> Result<Self> {
        let base_url = settings.base_url()?;
        let client = Client::builder()
            .timeout(settings.timeout())
            .redirect(reqwest::redirect::Policy::limited(
                settings.max_redirects as usize,
            ))
            .user_agent(settings.user_agent.as_str())
            .build()
            .map_err(FetchError::ClientBuild)?;

        debug!(base_url = ?base_url.as_ref().map(Url::as_str), "http client ready");
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Absolute URLs pass through; relative ones are joined onto the base URL.
    pub fn resolve_url(&self, url: &str) -> Result<Url> {
        let invalid = |message: String| FetchError::InvalidUrl {
            url: url.to_string(),
            message,
        };

        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(url::ParseError::RelativeUrlWithoutBase) => match &self.base_url {
                Some(base) => base.join(url).map_err(|e| invalid(e.to_string()))?,
                None => return Err(invalid("relative URL and no base URL configured".into())),
            },
            Err(e) => return Err(invalid(e.to_string())),
        };

        match parsed.scheme() {
            "http" | "https" => Ok(parsed),
            scheme => Err(invalid(format!("unsupported scheme '{scheme}'"))),
        }
    }

    /// GET `url` and parse the body as `expected`.
    #[instrument(skip(self))]
    pub async fn get(&self, url: &str, expected: ExpectedType) -> Result<FetchResponse> {
        let resolved = self.resolve_url(url)?;
        debug!(url = %resolved, "sending request");

        let response = self
            .client
            .get(resolved.clone())
            .header(ACCEPT, expected.accept())
            .send()
            .await
            .map_err(|source| FetchError::Network {
                url: resolved.to_string(),
                source,
            })?;

        Self::handle_response_status(response.status(), resolved.as_str())?;

        let etag = response
            .headers()
            .get(ETAG)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let value = Self::read_body(response, expected, resolved.as_str()).await?;

        info!(url = %resolved, "fetched");
        Ok(FetchResponse { value, etag })
    }

    fn handle_response_status(status: StatusCode, url: &str) -> Result<()> {
        if status.is_success() {
            return Ok(());
        }
        warn!(status = status.as_u16(), url, "request failed");
        Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
            reason: status.canonical_reason(),
        })
    }

    async fn read_body(
        response: Response,
        expected: ExpectedType,
        url: &str,
    ) -> Result<FetchedValue> {
        let body = response.bytes().await.map_err(|source| FetchError::Network {
            url: url.to_string(),
            source,
        })?;

        match expected {
            ExpectedType::Json => serde_json::from_slice(&body)
                .map(FetchedValue::Json)
                .map_err(|e| FetchError::Parse {
                    url: url.to_string(),
                    message: e.to_string(),
                }),
            ExpectedType::Text => String::from_utf8(body.to_vec())
                .map(FetchedValue::Text)
                .map_err(|e| FetchError::Parse {
                    url: url.to_string(),
                    message: e.to_string(),
                }),
            ExpectedType::Blob => Ok(FetchedValue::Blob(body)),
        }
    }
}

#[async_trait]
impl HttpFetcher for HttpClient {
    async fn fetch(&self, url: &str, expected: ExpectedType) -> Result<FetchResponse> {
        self.get(url, expected).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> HttpClient {
        let settings = HttpSettings {
            base_url: Some(server.uri()),
            timeout_secs: 5,
            ..HttpSettings::default()
        };
        HttpClient::with_config(&settings).unwrap()
    }

    #[tokio::test]
    async fn test_get_json_with_accept_header() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/experiments/ENCSR000AKS/"))
            .and(header("accept", "application/json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"@type": ["Experiment", "Dataset", "Item"]})),
            )
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let response = client
            .get("/experiments/ENCSR000AKS/", ExpectedType::Json)
            .await
            .unwrap();

        assert_eq!(
            response.value,
            FetchedValue::Json(json!({"@type": ["Experiment", "Dataset", "Item"]}))
        );
        assert!(response.etag.is_none());
    }

    #[tokio::test]
    async fn test_get_text_and_etag() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/files/ENCFF001/@@download/ENCFF001.txt"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("chr1\t100\t200")
                    .insert_header("ETag", "\"v1\""),
            )
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let response = client
            .get("/files/ENCFF001/@@download/ENCFF001.txt", ExpectedType::Text)
            .await
            .unwrap();

        assert_eq!(response.value, FetchedValue::Text("chr1\t100\t200".into()));
        assert_eq!(response.etag.as_deref(), Some("\"v1\""));
    }

    #[tokio::test]
    async fn test_get_blob() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bin"))
            .and(header("accept", "*/*"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8, 159, 146, 150]))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let url = format!("{}/bin", mock_server.uri());
        let response = client.get(&url, ExpectedType::Blob).await.unwrap();

        assert_eq!(
            response.value.as_bytes().map(|b| b.as_ref()),
            Some(&[0u8, 159, 146, 150][..])
        );
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing/"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({"@type": ["HTTPNotFound", "Error"]})),
            )
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let err = client.get("/missing/", ExpectedType::Json).await.unwrap_err();

        assert_eq!(err.status_code(), Some(404));
        assert_eq!(err.to_payload().title, "404 Not Found");
    }

    #[tokio::test]
    async fn test_unparseable_json_is_an_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        let err = client.get("/broken", ExpectedType::Json).await.unwrap_err();
        assert!(matches!(err, FetchError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let client = HttpClient::new().unwrap();
        let err = client
            .get("http://127.0.0.1:9/unreachable", ExpectedType::Json)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Network { .. }));
        assert_eq!(err.to_payload().code, None);
    }

    #[test]
    fn test_resolve_url() {
        let settings = HttpSettings {
            base_url: Some("https://www.encodeproject.org/".into()),
            ..HttpSettings::default()
        };
        let client = HttpClient::with_config(&settings).unwrap();

        assert_eq!(
            client.resolve_url("/search/?type=Experiment").unwrap().as_str(),
            "https://www.encodeproject.org/search/?type=Experiment"
        );
        assert_eq!(
            client.resolve_url("http://localhost:6543/a/").unwrap().as_str(),
            "http://localhost:6543/a/"
        );
        assert!(matches!(
            client.resolve_url("ftp://example.org/file"),
            Err(FetchError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_relative_url_without_base() {
        let client = HttpClient::new().unwrap();
        assert!(matches!(
            client.resolve_url("/search/"),
            Err(FetchError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let settings = HttpSettings {
            base_url: Some("not a url".into()),
            ..HttpSettings::default()
        };
        assert!(matches!(
            HttpClient::with_config(&settings),
            Err(FetchError::Config(_))
        ));
    }
}
