//! Token service backed by the Heimdall REST API.

use crate::TokenService;
use async_trait::async_trait;
use heimdall_core::error::{ErrorBody, HeimdallError, HeimdallResult};
use heimdall_core::{AccessToken, AccessTokenPage, Query};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

/// Resource path of access tokens under the API base URL.
const ACCESS_TOKENS_PATH: &str = "/v1/api/access-tokens";

/// Talks to `{base}/v1/api/access-tokens` over HTTP/JSON.
///
/// No request timeout is set: a call lasts as long as the transport allows.
///
/// ```ignore
/// let service = HttpTokenService::connect("http://localhost:9090")?
///     .with_credentials("admin", "admin");
/// let page = service.list(&Query::default()).await?;
/// ```
#[derive(Clone)]
pub struct HttpTokenService {
    client: Client,
    endpoint: String,
    credentials: Option<(String, String)>,
}

impl HttpTokenService {
    pub fn connect(api_url: &str) -> HeimdallResult<Self> {
        if api_url.is_empty() {
            return Err(HeimdallError::InvalidInput("API URL must not be empty".into()));
        }

        let parsed = Url::parse(api_url)
            .map_err(|e| HeimdallError::InvalidInput(format!("Invalid API URL {api_url}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(HeimdallError::InvalidInput(format!(
                "Unsupported scheme in API URL: {}",
                parsed.scheme()
            )));
        }

        let endpoint = format!("{}{ACCESS_TOKENS_PATH}", api_url.trim_end_matches('/'));
        tracing::info!(endpoint = %endpoint, "token service configured");

        Ok(Self {
            client: Client::new(),
            endpoint,
            credentials: None,
        })
    }

    /// Attach basic-auth credentials to every request.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    /// Collection URL, e.g. `http://host/v1/api/access-tokens`.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn item_url(&self, id: u64) -> String {
        format!("{}/{id}", self.endpoint)
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some((user, pass)) => req.basic_auth(user, Some(pass)),
            None => req,
        }
    }

    /// Send a request and map non-2xx responses to `HeimdallError::Api`.
    async fn execute(&self, req: RequestBuilder) -> HeimdallResult<Response> {
        let resp = self
            .authorize(req)
            .send()
            .await
            .map_err(|e| HeimdallError::Transport(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let text = resp.text().await.unwrap_or_default();
        let body = ErrorBody::parse(&text);
        tracing::debug!(status = status.as_u16(), body = %text, "token service rejected request");

        Err(HeimdallError::Api {
            status: status.as_u16(),
            body,
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, req: RequestBuilder) -> HeimdallResult<T> {
        let text = self
            .execute(req)
            .await?
            .text()
            .await
            .map_err(|e| HeimdallError::Transport(e.to_string()))?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Like `fetch`, for writes. A 2xx answer without a body (e.g. `201` with
    /// only a `Location` header) yields the token that was sent.
    async fn write(&self, req: RequestBuilder, sent: &AccessToken) -> HeimdallResult<AccessToken> {
        let text = self
            .execute(req)
            .await?
            .text()
            .await
            .map_err(|e| HeimdallError::Transport(e.to_string()))?;
        if text.trim().is_empty() {
            tracing::debug!("token service accepted write without a body");
            return Ok(sent.clone());
        }
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl TokenService for HttpTokenService {
    async fn list(&self, query: &Query) -> HeimdallResult<AccessTokenPage> {
        tracing::debug!(offset = query.offset, limit = query.limit, "listing access tokens");

        let req = self
            .client
            .get(&self.endpoint)
            .query(&[("offset", query.offset), ("limit", query.limit)]);
        let page: AccessTokenPage = self.fetch(req).await?;

        tracing::debug!(tokens = page.len(), total = ?page.total_elements, "listed access tokens");
        Ok(page)
    }

    async fn get(&self, id: u64) -> HeimdallResult<AccessToken> {
        tracing::debug!(id, "fetching access token");
        self.fetch(self.client.get(self.item_url(id))).await
    }

    async fn create(&self, token: &AccessToken) -> HeimdallResult<AccessToken> {
        tracing::debug!(code = ?token.code, "creating access token");
        self.write(self.client.post(&self.endpoint).json(token), token).await
    }

    async fn update(&self, token: &AccessToken) -> HeimdallResult<AccessToken> {
        let id = token.require_id()?;
        tracing::debug!(id, "updating access token");
        self.write(self.client.put(self.item_url(id)).json(token), token).await
    }

    async fn delete(&self, id: u64) -> HeimdallResult<()> {
        tracing::debug!(id, "deleting access token");
        self.execute(self.client.delete(self.item_url(id))).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heimdall_core::AppRef;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn connect_rejects_bad_urls() {
        assert!(matches!(
            HttpTokenService::connect(""),
            Err(HeimdallError::InvalidInput(_))
        ));
        assert!(HttpTokenService::connect("not a url").is_err());
        assert!(HttpTokenService::connect("ftp://example.com").is_err());
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        let service = HttpTokenService::connect("http://localhost:9090/").unwrap();
        assert_eq!(service.endpoint(), "http://localhost:9090/v1/api/access-tokens");
    }

    #[tokio::test]
    async fn list_sends_offset_and_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/api/access-tokens"))
            .and(query_param("offset", "20"))
            .and(query_param("limit", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{ "id": 1, "code": "a" }, { "id": 2, "code": "b" }],
                "totalElements": 22
            })))
            .expect(1)
            .mount(&server)
            .await;

        let service = HttpTokenService::connect(&server.uri()).unwrap();
        let page = service.list(&Query { offset: 20, limit: 5 }).await.unwrap();

        assert_eq!(page.len(), 2);
        assert_eq!(page.total_elements, Some(22));
        assert_eq!(page.content[1].code.as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn create_posts_json_with_basic_auth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/api/access-tokens"))
            // admin:secret
            .and(header("authorization", "Basic YWRtaW46c2VjcmV0"))
            .and(body_json(json!({ "code": "abc", "app": { "id": 3 } })))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({ "id": 9, "code": "abc", "app": { "id": 3 } })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let service = HttpTokenService::connect(&server.uri())
            .unwrap()
            .with_credentials("admin", "secret");
        let token = AccessToken {
            code: Some("abc".into()),
            app: Some(AppRef::new(3)),
            ..AccessToken::default()
        };

        let created = service.create(&token).await.unwrap();
        assert_eq!(created.id, Some(9));
    }

    #[tokio::test]
    async fn validation_failure_carries_status_and_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/api/access-tokens"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "timestamp": "2026-10-19T10:00:00",
                "code": 400,
                "exception": "BadRequestException",
                "message": "Access token already exists",
                "path": "/v1/api/access-tokens"
            })))
            .mount(&server)
            .await;

        let service = HttpTokenService::connect(&server.uri()).unwrap();
        let err = service.create(&AccessToken::default()).await.unwrap_err();

        assert!(err.is_validation());
        assert_eq!(err.body_message(), Some("Access token already exists"));
    }

    #[tokio::test]
    async fn validation_message_survives_array_timestamp() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/api/access-tokens"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "timestamp": [2026, 10, 19, 10, 0, 0, 123000000],
                "code": 400,
                "exception": "BadRequestException",
                "message": "bad name",
                "path": "/v1/api/access-tokens"
            })))
            .mount(&server)
            .await;

        let service = HttpTokenService::connect(&server.uri()).unwrap();
        let err = service.create(&AccessToken::default()).await.unwrap_err();

        assert!(err.is_validation());
        assert_eq!(err.body_message(), Some("bad name"));
    }

    #[tokio::test]
    async fn create_without_response_body_returns_sent_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/api/access-tokens"))
            .respond_with(
                ResponseTemplate::new(201).insert_header("location", "/v1/api/access-tokens/9"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let service = HttpTokenService::connect(&server.uri()).unwrap();
        let token = AccessToken {
            code: Some("abc".into()),
            ..AccessToken::default()
        };

        assert_eq!(service.create(&token).await.unwrap(), token);
    }

    #[tokio::test]
    async fn update_with_no_content_returns_sent_token() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v1/api/access-tokens/7"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let service = HttpTokenService::connect(&server.uri()).unwrap();
        let token = AccessToken {
            id: Some(7),
            status: Some("INACTIVE".into()),
            ..AccessToken::default()
        };

        assert_eq!(service.update(&token).await.unwrap(), token);
    }

    #[tokio::test]
    async fn garbled_write_response_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/api/access-tokens"))
            .respond_with(ResponseTemplate::new(201).set_body_string("<html>created</html>"))
            .mount(&server)
            .await;

        let service = HttpTokenService::connect(&server.uri()).unwrap();
        let err = service.create(&AccessToken::default()).await.unwrap_err();
        assert!(matches!(err, HeimdallError::Decode(_)));
    }

    #[tokio::test]
    async fn non_json_error_body_is_dropped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/api/access-tokens/4"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let service = HttpTokenService::connect(&server.uri()).unwrap();
        let err = service.get(4).await.unwrap_err();

        assert_eq!(err.status(), Some(502));
        assert_eq!(err.body_message(), None);
    }

    #[tokio::test]
    async fn update_puts_to_item_url() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v1/api/access-tokens/7"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "id": 7, "status": "INACTIVE" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let service = HttpTokenService::connect(&server.uri()).unwrap();
        let token = AccessToken {
            id: Some(7),
            status: Some("INACTIVE".into()),
            ..AccessToken::default()
        };

        let updated = service.update(&token).await.unwrap();
        assert_eq!(updated.status.as_deref(), Some("INACTIVE"));
    }

    #[tokio::test]
    async fn update_without_id_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let service = HttpTokenService::connect(&server.uri()).unwrap();
        let err = service.update(&AccessToken::default()).await.unwrap_err();
        assert!(matches!(err, HeimdallError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn delete_accepts_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v1/api/access-tokens/3"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let service = HttpTokenService::connect(&server.uri()).unwrap();
        service.delete(3).await.unwrap();
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_error() {
        // Port 9 (discard) is closed on test hosts.
        let service = HttpTokenService::connect("http://127.0.0.1:9").unwrap();
        let err = service.get(1).await.unwrap_err();
        assert!(matches!(err, HeimdallError::Transport(_)));
        assert_eq!(err.status(), None);
    }
}
