//! REST client for entry resources: `GET/POST /{resource}`, `PUT/DELETE /{resource}/{id}`.

use crate::error::{ApiError, ErrorBody};
use crate::field_errors::ValidationFailure;
use crate::record::{EntryRecord, Payload};
use crate::settings::ClientSettings;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, RwLock};

/// Optional filters for listing a resource.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ListParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Operations the entry manager needs from the backend.
#[async_trait]
pub trait EntryApi: Send + Sync {
    async fn list(&self, resource: &str, params: &ListParams) -> Result<Vec<EntryRecord>, ApiError>;
    async fn create(&self, resource: &str, payload: &Payload) -> Result<EntryRecord, ApiError>;
    async fn update(&self, resource: &str, id: i64, payload: &Payload) -> Result<EntryRecord, ApiError>;
    async fn delete(&self, resource: &str, id: i64) -> Result<(), ApiError>;
}

/// Called after a 401, once the client has dropped its token.
pub type UnauthorizedHandler = Arc<dyn Fn() + Send + Sync>;

pub struct HttpEntryApi {
    base_url: String,
    client: Client,
    token: RwLock<Option<String>>,
    on_unauthorized: Option<UnauthorizedHandler>,
}

impl HttpEntryApi {
    pub fn new(settings: &ClientSettings) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self {
            base_url: settings.api_url.trim_end_matches('/').to_string(),
            client,
            token: RwLock::new(settings.token.clone()),
            on_unauthorized: None,
        })
    }

    pub fn with_unauthorized_handler(mut self, handler: UnauthorizedHandler) -> Self {
        self.on_unauthorized = Some(handler);
        self
    }

    pub fn set_auth_token(&self, token: Option<String>) {
        *self.token.write().unwrap_or_else(|p| p.into_inner()) = token;
    }

    pub fn auth_token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(|p| p.into_inner()).clone()
    }

    fn url(&self, resource: &str, id: Option<i64>) -> String {
        match id {
            Some(id) => format!("{}/{}/{}", self.base_url, resource, id),
            None => format!("{}/{}", self.base_url, resource),
        }
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let rb = self.client.request(method, url);
        match self.auth_token() {
            Some(token) => rb.bearer_auth(token),
            None => rb,
        }
    }

    async fn send<T: DeserializeOwned>(&self, rb: RequestBuilder) -> Result<T, ApiError> {
        let bytes = self.execute(rb).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn execute(&self, rb: RequestBuilder) -> Result<Vec<u8>, ApiError> {
        let response = rb.send().await?;
        let status = response.status();
        let url = response.url().to_string();
        let bytes = response.bytes().await?.to_vec();
        if status.is_success() {
            tracing::debug!(%url, status = status.as_u16(), "api response");
            return Ok(bytes);
        }

        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap_or_default();
        match status {
            StatusCode::UNAUTHORIZED => {
                tracing::warn!(%url, "unauthorized; clearing session token");
                self.set_auth_token(None);
                if let Some(handler) = &self.on_unauthorized {
                    handler();
                }
                Err(ApiError::Unauthorized(body))
            }
            StatusCode::UNPROCESSABLE_ENTITY => {
                match serde_json::from_slice::<ValidationFailure>(&bytes) {
                    Ok(failure) => {
                        tracing::debug!(%url, items = failure.detail.len(), "validation failure");
                        Err(ApiError::Validation(failure))
                    }
                    Err(_) => Err(ApiError::Status {
                        status: status.as_u16(),
                        body,
                    }),
                }
            }
            _ => {
                tracing::warn!(%url, status = status.as_u16(), "api error");
                Err(ApiError::Status {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}

#[async_trait]
impl EntryApi for HttpEntryApi {
    async fn list(&self, resource: &str, params: &ListParams) -> Result<Vec<EntryRecord>, ApiError> {
        let rb = self
            .request(Method::GET, &self.url(resource, None))
            .query(params);
        self.send(rb).await
    }

    async fn create(&self, resource: &str, payload: &Payload) -> Result<EntryRecord, ApiError> {
        let rb = self
            .request(Method::POST, &self.url(resource, None))
            .json(payload);
        self.send(rb).await
    }

    async fn update(&self, resource: &str, id: i64, payload: &Payload) -> Result<EntryRecord, ApiError> {
        let rb = self
            .request(Method::PUT, &self.url(resource, Some(id)))
            .json(payload);
        self.send(rb).await
    }

    async fn delete(&self, resource: &str, id: i64) -> Result<(), ApiError> {
        let rb = self.request(Method::DELETE, &self.url(resource, Some(id)));
        self.execute(rb).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn api(server: &MockServer, token: Option<&str>) -> HttpEntryApi {
        HttpEntryApi::new(&ClientSettings {
            api_url: server.uri(),
            timeout: Duration::from_secs(5),
            token: token.map(str::to_string),
            stale_time: Duration::ZERO,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn list_sends_token_and_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .and(header("authorization", "Bearer secret"))
            .and(query_param("start_date", "2024-03-01"))
            .and(query_param("limit", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 2, "local_date": "2024-03-02", "sleep_hours": 6.5 },
                { "id": 1, "local_date": "2024-03-01", "sleep_hours": 8 }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let params = ListParams {
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            limit: Some(50),
            ..Default::default()
        };
        let rows = api(&server, Some("secret")).list("health", &params).await.unwrap();
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![2, 1]);
        assert_eq!(rows[0].field("sleep_hours"), Some(&json!(6.5)));
    }

    #[tokio::test]
    async fn create_posts_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/finance"))
            .and(body_json(json!({ "timezone": "UTC", "income": 100.0, "notes": null })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 11, "timezone": "UTC", "income": 100.0, "notes": null
            })))
            .mount(&server)
            .await;

        let mut payload = Payload::new();
        payload.insert("timezone".into(), json!("UTC"));
        payload.insert("income".into(), json!(100.0));
        payload.insert("notes".into(), serde_json::Value::Null);
        let created = api(&server, None).create("finance", &payload).await.unwrap();
        assert_eq!(created.id, 11);
    }

    #[tokio::test]
    async fn structured_422_becomes_validation_error() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/health/4"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "detail": [{ "loc": ["body", "wellbeing"], "msg": "Input should be less than or equal to 10", "type": "less_than_equal" }]
            })))
            .mount(&server)
            .await;

        let err = api(&server, None)
            .update("health", 4, &Payload::new())
            .await
            .unwrap_err();
        match err {
            ApiError::Validation(f) => {
                assert_eq!(f.field_errors().get("wellbeing"), Some("Input should be less than or equal to 10"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn plain_422_keeps_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/health"))
            .respond_with(
                ResponseTemplate::new(422).set_body_json(json!({ "detail": "Invalid timezone 'Mars/Base'" })),
            )
            .mount(&server)
            .await;

        let err = api(&server, None).create("health", &Payload::new()).await.unwrap_err();
        assert_eq!(err.status(), Some(422));
        assert_eq!(crate::field_errors::error_message(&err), "Invalid timezone 'Mars/Base'");
    }

    #[tokio::test]
    async fn unauthorized_clears_token_and_notifies_handler() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/learning/9"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "detail": "Could not validate credentials" })),
            )
            .mount(&server)
            .await;

        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let client = api(&server, Some("expired")).with_unauthorized_handler(Arc::new(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        }));
        let err = client.delete("learning", 9).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
        assert_eq!(client.auth_token(), None);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn delete_ignores_response_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/health/3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "deleted" })))
            .expect(1)
            .mount(&server)
            .await;

        api(&server, None).delete("health", 3).await.unwrap();
    }

    #[tokio::test]
    async fn server_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let err = api(&server, None)
            .list("health", &ListParams::default())
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert_eq!(crate::field_errors::error_message(&err), "request failed with status code 503");
    }
}
