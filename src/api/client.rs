//! HTTP plumbing shared by every service handle.

use std::time::Duration;

use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

use super::auth::{AuthorizedKey, IamTokenSource};
use crate::error::ProviderError;

/// Public API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.double.cloud";

/// Token exchange endpoint.
pub const DEFAULT_AUTH_ENDPOINT: &str = "https://auth.double.cloud/oauth/token";

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Truncate a response body and strip control characters before logging it.
pub(crate) fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!(
            "{}... [truncated, {} bytes total]",
            &body[..end],
            body.len()
        )
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| c.is_control(), "")
}

/// Extract the `message` of an API error body, falling back to the sanitized body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| sanitize_for_log(body))
}

/// Settings for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// API base URL.
    pub endpoint: String,
    /// Token exchange URL.
    pub auth_endpoint: String,
    /// Delay between operation status polls.
    pub poll_interval: Duration,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            auth_endpoint: DEFAULT_AUTH_ENDPOINT.to_string(),
            poll_interval: Duration::from_secs(5),
            user_agent: format!("terraform-provider-doublecloud/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientOptions {
    /// Set the API base URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the token exchange URL.
    pub fn with_auth_endpoint(mut self, auth_endpoint: impl Into<String>) -> Self {
        self.auth_endpoint = auth_endpoint.into();
        self
    }

    /// Set the operation poll interval.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Report the provider version in the `User-Agent` header.
    pub fn with_provider_version(mut self, version: &str) -> Self {
        self.user_agent = format!("terraform-provider-doublecloud/{}", version);
        self
    }
}

/// Authenticated DoubleCloud API client.
pub struct ApiClient {
    http: Client,
    base_url: String,
    tokens: IamTokenSource,
    poll_interval: Duration,
}

impl ApiClient {
    /// Build a client for the given key.
    pub fn new(key: AuthorizedKey, options: ClientOptions) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .user_agent(options.user_agent.as_str())
            .build()?;
        let tokens = IamTokenSource::new(key, options.auth_endpoint, http.clone())?;

        Ok(Self {
            http,
            base_url: options.endpoint.trim_end_matches('/').to_string(),
            tokens,
            poll_interval: options.poll_interval,
        })
    }

    /// Delay between operation status polls.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ProviderError> {
        self.request(Method::GET, path, &[], None::<&()>).await
    }

    pub(crate) async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ProviderError> {
        self.request(Method::POST, path, &[], Some(body)).await
    }

    pub(crate) async fn patch<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ProviderError> {
        self.request(Method::PATCH, path, &[], Some(body)).await
    }

    pub(crate) async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ProviderError> {
        self.request(Method::PUT, path, &[], Some(body)).await
    }

    pub(crate) async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ProviderError> {
        self.request(Method::DELETE, path, &[], None::<&()>).await
    }

    /// Fetch every page of a project-scoped list call.
    ///
    /// `field` names the array in each page; paging follows `nextPageToken`.
    pub(crate) async fn list_all<T: DeserializeOwned>(
        &self,
        path: &str,
        project_id: &str,
        field: &str,
    ) -> Result<Vec<T>, ProviderError> {
        let mut items = Vec::new();
        let mut page_token = String::new();

        loop {
            let mut query = vec![("projectId", project_id.to_string())];
            if !page_token.is_empty() {
                query.push(("pageToken", page_token.clone()));
            }

            let page: Value = self.request(Method::GET, path, &query, None::<&()>).await?;
            if let Some(values) = page.get(field).filter(|v| !v.is_null()) {
                items.extend(serde_json::from_value::<Vec<T>>(values.clone())?);
            }

            match page.get("nextPageToken").and_then(Value::as_str) {
                Some(token) if !token.is_empty() => page_token = token.to_string(),
                _ => break,
            }
        }

        Ok(items)
    }

    async fn request<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<T, ProviderError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "API request");

        let token = self.tokens.token().await?;
        let mut request = self.http.request(method.clone(), &url).bearer_auth(token);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            // only a sanitized, truncated body is logged
            error!(%method, %url, status = status.as_u16(), body = %sanitize_for_log(&text), "API error");
            return Err(ProviderError::from_status(
                status.as_u16(),
                error_message(&text),
            ));
        }

        let text = if text.trim().is_empty() { "null" } else { text.as_str() };
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_truncates() {
        let body = "x".repeat(500);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.starts_with(&"x".repeat(200)));
        assert!(sanitized.contains("truncated, 500 bytes total"));

        assert_eq!(sanitize_for_log("line\nbreak"), "linebreak");
    }

    #[test]
    fn test_error_message() {
        assert_eq!(
            error_message(r#"{"code": 5, "message": "cluster not found"}"#),
            "cluster not found"
        );
        assert_eq!(error_message("upstream timeout"), "upstream timeout");
    }

    #[test]
    fn test_options() {
        let options = ClientOptions::default()
            .with_endpoint("http://127.0.0.1:9000/")
            .with_provider_version("1.2.3")
            .with_poll_interval(Duration::from_millis(10));
        assert_eq!(options.auth_endpoint, DEFAULT_AUTH_ENDPOINT);
        assert_eq!(options.user_agent, "terraform-provider-doublecloud/1.2.3");
        assert_eq!(options.poll_interval, Duration::from_millis(10));
    }
}
