//! HTTP plumbing shared by the remote tables and the remote auth backend.

use std::time::Duration;

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::{StoreError, StoreResult};

/// `Prefer` header asking the hosted store to echo written rows.
pub(crate) const RETURN_REPRESENTATION: &str = "return=representation";

/// Client for the hosted store's REST and auth endpoints.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: Client,
    base: Url,
    api_key: String,
}

/// Error bodies come in a few shapes depending on the endpoint.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
    code: Option<serde_json::Value>,
}

impl ErrorBody {
    fn text(&self) -> Option<&str> {
        self.message
            .as_deref()
            .or(self.msg.as_deref())
            .or(self.error_description.as_deref())
            .or(self.error.as_deref())
    }

    /// Postgres unique violation.
    fn is_unique_violation(&self) -> bool {
        matches!(&self.code, Some(serde_json::Value::String(code)) if code == "23505")
    }
}

impl RestClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> StoreResult<Self> {
        let mut base = Url::parse(base_url)
            .map_err(|e| StoreError::InvalidConfig(format!("remote url '{base_url}': {e}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        HeaderValue::from_str(api_key)
            .map_err(|_| StoreError::InvalidConfig("remote key is not a valid header".to_string()))?;

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::InvalidConfig(e.to_string()))?;

        Ok(RestClient {
            http,
            base,
            api_key: api_key.to_string(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `{base}/rest/v1/{table}`
    pub(crate) fn rest_url(&self, table: &str) -> StoreResult<Url> {
        self.join(&format!("rest/v1/{table}"))
    }

    /// `{base}/auth/v1/{path}`
    pub(crate) fn auth_url(&self, path: &str) -> StoreResult<Url> {
        self.join(&format!("auth/v1/{path}"))
    }

    fn join(&self, path: &str) -> StoreResult<Url> {
        self.base
            .join(path)
            .map_err(|e| StoreError::InvalidConfig(e.to_string()))
    }

    /// Request carrying the API key, and the user's token when given.
    pub(crate) fn request(&self, method: Method, url: Url, token: Option<&str>) -> RequestBuilder {
        debug!(%method, path = url.path(), "Remote store request");
        let bearer = token.unwrap_or(&self.api_key);
        self.http
            .request(method, url)
            .header("apikey", &self.api_key)
            .header(AUTHORIZATION, format!("Bearer {bearer}"))
    }

    /// Sends the request and decodes a JSON body.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> StoreResult<T> {
        let response = check(request.send().await?).await?;
        Ok(response.json::<T>().await?)
    }

    /// Sends the request and discards the body.
    pub(crate) async fn send_empty(&self, request: RequestBuilder) -> StoreResult<()> {
        check(request.send().await?).await?;
        Ok(())
    }

    /// True when the hosted store answers at all (any non-5xx status).
    pub async fn ping(&self) -> bool {
        let Ok(url) = self.rest_url("") else {
            return false;
        };
        match self.request(Method::GET, url, None).send().await {
            Ok(response) => !response.status().is_server_error(),
            Err(_) => false,
        }
    }
}

/// Turns non-success statuses into [`StoreError`]s.
pub(crate) async fn check(response: Response) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let parsed: ErrorBody = serde_json::from_str(&body).unwrap_or_default();
    let message = parsed
        .text()
        .map(str::to_string)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());

    debug!(status = status.as_u16(), %message, "Remote store error");

    Err(match status {
        StatusCode::UNAUTHORIZED => StoreError::Unauthorized,
        StatusCode::CONFLICT => StoreError::duplicate("record", message),
        _ if parsed.is_unique_violation() => StoreError::duplicate("record", message),
        _ => StoreError::Remote {
            status: status.as_u16(),
            message,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_keep_base_path() {
        let client =
            RestClient::new("https://store.example.com/project", "key", Duration::from_secs(5))
                .unwrap();
        assert_eq!(
            client.rest_url("products").unwrap().as_str(),
            "https://store.example.com/project/rest/v1/products"
        );
        assert_eq!(
            client.auth_url("token").unwrap().as_str(),
            "https://store.example.com/project/auth/v1/token"
        );
    }

    #[test]
    fn test_invalid_url_is_config_error() {
        let err = RestClient::new("not a url", "key", Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, StoreError::InvalidConfig(_)));
    }
}
