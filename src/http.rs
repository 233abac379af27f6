//! Request plumbing shared by the admin and retail-catalog clients.
//!
//! Every call carries the same JSON header set and the client's cookie jar.
//! A response other than HTTP 200 is never an error here: the caller supplies
//! the value to fall back to (`[]`, `None`, `false`, `0`). Only transport and
//! decode failures come back as [`ApiError`].
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, Request, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

/// Header carrying the retail-catalog API subscription key.
pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid endpoint {0}")]
    InvalidUrl(String),
    #[error("invalid header value for {0}")]
    InvalidHeader(&'static str),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Clone)]
pub struct HttpCore {
    http: Client,
    base_url: Url,
}

impl fmt::Debug for HttpCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpCore")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpCore {
    /// Build a client rooted at `base_url`, attaching `subscription_key` to
    /// every request when present.
    pub fn new(base_url: Url, subscription_key: Option<&str>) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = subscription_key {
            let mut value = HeaderValue::from_str(key)
                .map_err(|_| ApiError::InvalidHeader(SUBSCRIPTION_KEY_HEADER))?;
            value.set_sensitive(true);
            headers.insert(SUBSCRIPTION_KEY_HEADER, value);
        }

        let http = Client::builder()
            .user_agent(concat!("vp-admin/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .cookie_store(true)
            .no_proxy()
            .build()?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve `path` under the base URL and append URL-encoded query pairs.
    pub fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, ApiError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|_| ApiError::InvalidUrl(path.to_string()))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter());
        }
        Ok(url)
    }

    pub fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<RequestBuilder, ApiError> {
        let url = self.endpoint(path, query)?;
        Ok(self.http.request(method, url))
    }

    /// Build (without sending) a request; used to inspect what goes on the wire.
    pub fn build<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<Request, ApiError> {
        let mut builder = self.request(method, path, query)?;
        if let Some(body) = body {
            builder = builder.json(body);
        }
        Ok(builder.build()?)
    }

    async fn execute(&self, request: Request) -> Result<reqwest::Response, ApiError> {
        debug!(method = %request.method(), url = %request.url(), "sending request");
        let res = self.http.execute(request).await?;
        if res.status() != StatusCode::OK {
            warn!(status = %res.status(), url = %res.url(), "non-200 response; using default");
        }
        Ok(res)
    }

    /// Send and decode a JSON body, or return `default` on any non-200 status.
    pub async fn json_or<B, T>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
        default: T,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.build(method, path, query, body)?;
        let res = self.execute(request).await?;
        if res.status() != StatusCode::OK {
            return Ok(default);
        }
        Ok(res.json::<T>().await?)
    }

    /// GET shorthand for [`HttpCore::json_or`].
    pub async fn get_json_or<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        default: T,
    ) -> Result<T, ApiError> {
        self.json_or::<(), T>(Method::GET, path, query, None, default)
            .await
    }

    /// Plain-text body, or `None` on a non-200 status.
    pub async fn text<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<Option<String>, ApiError> {
        let request = self.build(method, path, query, body)?;
        let res = self.execute(request).await?;
        if res.status() != StatusCode::OK {
            return Ok(None);
        }
        Ok(Some(res.text().await?))
    }

    /// Endpoints answering with a bare `true`/`false` body.
    pub async fn flag(&self, path: &str, query: &[(&str, &str)]) -> Result<bool, ApiError> {
        let body = self.text::<()>(Method::GET, path, query, None).await?;
        Ok(body.as_deref().map(str::trim) == Some("true"))
    }

    /// DELETE endpoints answering with the number of affected rows.
    pub async fn delete_count(&self, path: &str, query: &[(&str, &str)]) -> Result<i64, ApiError> {
        let body = self.text::<()>(Method::DELETE, path, query, None).await?;
        Ok(body
            .as_deref()
            .and_then(|b| b.trim().parse::<i64>().ok())
            .unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn core(key: Option<&str>) -> HttpCore {
        HttpCore::new(Url::parse("https://portal.example.com/root/").unwrap(), key).unwrap()
    }

    #[test]
    fn endpoint_joins_and_encodes_query() {
        let url = core(None)
            .endpoint(
                "api/VpItem/v1/GetVpUserByEmail",
                &[("email", "a+b@example.com")],
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://portal.example.com/root/api/VpItem/v1/GetVpUserByEmail?email=a%2Bb%40example.com"
        );
    }

    #[test]
    fn build_attaches_json_body() {
        let req = core(None)
            .build(
                Method::POST,
                "api/VpItem/v1/UpdateStores",
                &[],
                Some(&serde_json::json!([{"StoreID": 1}])),
            )
            .unwrap();
        assert_eq!(req.method(), Method::POST);
        let body = req.body().and_then(|b| b.as_bytes()).unwrap();
        assert_eq!(body, br#"[{"StoreID":1}]"#);
    }

    #[test]
    fn rejects_unprintable_subscription_key() {
        let err = HttpCore::new(
            Url::parse("https://portal.example.com/").unwrap(),
            Some("bad\nkey"),
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidHeader(_)));
    }
}
