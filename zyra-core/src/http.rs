//! HTTP client abstraction for catalog integrations.
//!
//! Catalog clients talk to their APIs through [`HttpClient`] so tests can feed
//! canned responses without touching the network. The default implementation
//! wraps reqwest.
//!
//! # Example Usage:
//! ``
//! use crate::http::{HttpClient, DefaultHttpClient};
//!
//! // In production code
//! let spotify = SpotifyClient::new(Arc::new(DefaultHttpClient::new()), creds);
//!
//! // In tests, a canned implementation
//! let spotify = SpotifyClient::new(Arc::new(CannedHttp::default()), creds);
//! ``

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest;

use crate::Error;

/// Status and body of a finished request. Non-2xx statuses are not errors at
/// this layer; callers map them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, url: &str, headers: HashMap<String, String>) -> Result<HttpResponse, Error>;

    /// `application/x-www-form-urlencoded` POST.
    async fn post_form(
        &self,
        url: &str,
        headers: HashMap<String, String>,
        form: &[(&str, &str)],
    ) -> Result<HttpResponse, Error>;
}

#[derive(Clone)]
pub struct DefaultHttpClient {
    client: reqwest::Client,
}

impl DefaultHttpClient {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(15))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client }
    }
}

impl Default for DefaultHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for DefaultHttpClient {
    async fn get(&self, url: &str, headers: HashMap<String, String>) -> Result<HttpResponse, Error> {
        let mut request = self.client.get(url);
        for (key, value) in headers {
            request = request.header(&key, value);
        }
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }

    async fn post_form(
        &self,
        url: &str,
        headers: HashMap<String, String>,
        form: &[(&str, &str)],
    ) -> Result<HttpResponse, Error> {
        let mut request = self.client.post(url).form(form);
        for (key, value) in headers {
            request = request.header(&key, value);
        }
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}
