//! The one HTTP client every service goes through.

use std::sync::{Arc, RwLock};

use harvest_common::api_error::ApiErrorBody;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{ClientError, Result};

/// Backend client. Clones share the bearer token.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            token: Arc::new(RwLock::new(None)),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_token(&self, token: Option<String>) {
        if let Ok(mut slot) = self.token.write() {
            *slot = token;
        }
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().ok().and_then(|t| t.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        debug!(%method, path, "api request");
        let req = self.http.request(method, self.url(path));
        match self.token() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        decode(send(self.request(Method::GET, path)).await?)
    }

    pub async fn get_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        decode(send(self.request(Method::GET, path).query(query)).await?)
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        decode(send(self.request(Method::POST, path).json(body)).await?)
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        decode(send(self.request(Method::PUT, path).json(body)).await?)
    }

    pub async fn put_query<B, Q, T>(&self, path: &str, query: &Q, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        decode(send(self.request(Method::PUT, path).query(query).json(body)).await?)
    }

    /// Any 2xx counts as success; the body is ignored.
    pub async fn delete(&self, path: &str) -> Result<()> {
        send(self.request(Method::DELETE, path)).await.map(|_| ())
    }
}

/// Send a request and return the body of a 2xx response.
pub(crate) async fn send(req: RequestBuilder) -> Result<String> {
    let resp = req.send().await.map_err(|e| {
        warn!("transport error: {e}");
        ClientError::Transport(e)
    })?;
    let status = resp.status();
    let text = resp.text().await?;
    if status.is_success() {
        return Ok(text);
    }
    let body = ApiErrorBody::parse(&text).unwrap_or_default();
    warn!(status = status.as_u16(), message = ?body.message(), "api error");
    Err(ClientError::Api {
        status: status.as_u16(),
        body,
    })
}

/// Decode JSON; an empty body decodes as `null` so `()` and `Option<T>`
/// responses work.
pub(crate) fn decode<T: DeserializeOwned>(text: String) -> Result<T> {
    let text = if text.trim().is_empty() { "null" } else { text.as_str() };
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let api = ApiClient::new("http://localhost:8080/api/");
        assert_eq!(api.base_url(), "http://localhost:8080/api");
        assert_eq!(api.url("/batches/1"), "http://localhost:8080/api/batches/1");
        assert_eq!(api.url("products"), "http://localhost:8080/api/products");
    }

    #[test]
    fn test_token_shared_between_clones() {
        let a = ApiClient::new("http://x");
        let b = a.clone();
        a.set_token(Some("t".into()));
        assert_eq!(b.token().as_deref(), Some("t"));
        b.set_token(None);
        assert!(!a.is_authenticated());
    }

    #[test]
    fn test_decode_empty_body() {
        let unit: () = decode(String::new()).unwrap();
        assert_eq!(unit, ());
        let n: Option<u32> = decode("  ".to_string()).unwrap();
        assert_eq!(n, None);
    }
}
