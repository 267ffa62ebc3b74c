//! Outbound transport to the host.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use shared::error::TransportError;
use url::Url;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Raw host answer; status checking and decoding happen in the bridge.
#[derive(Debug, Clone)]
pub struct HostResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HostResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait HostTransport: Send + Sync {
    /// Posts an already-encoded JSON body to the request named `request`.
    async fn post(&self, request: &str, body: Vec<u8>) -> Result<HostResponse, TransportError>;
}

pub struct HttpTransport {
    http: Client,
    endpoint: Url,
}

impl HttpTransport {
    pub fn new(endpoint: Url, timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|err| TransportError::unreachable("<client>", err.to_string()))?;
        Ok(Self {
            http,
            endpoint: with_trailing_slash(endpoint),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn request_url(&self, request: &str) -> Result<Url, TransportError> {
        self.endpoint
            .join(request)
            .map_err(|err| TransportError::unreachable(request, format!("invalid request url: {err}")))
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[async_trait]
impl HostTransport for HttpTransport {
    async fn post(&self, request: &str, body: Vec<u8>) -> Result<HostResponse, TransportError> {
        let url = self.request_url(request)?;
        let response = self
            .http
            .post(url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|err| TransportError::unreachable(request, err.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|err| TransportError::unreachable(request, err.to_string()))?;
        Ok(HostResponse {
            status,
            body: body.to_vec(),
        })
    }
}

/// Transport for bridges that have no host attached. Every request fails.
pub struct MissingHostTransport;

#[async_trait]
impl HostTransport for MissingHostTransport {
    async fn post(&self, request: &str, _body: Vec<u8>) -> Result<HostResponse, TransportError> {
        Err(TransportError::unreachable(
            request,
            "no host transport configured",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_urls_append_to_endpoint_path() {
        let transport = HttpTransport::new(
            Url::parse("https://tournament-ui/nui").expect("url"),
            None,
        )
        .expect("transport");

        assert_eq!(
            transport.request_url("closeTournament").expect("join").as_str(),
            "https://tournament-ui/nui/closeTournament"
        );
    }

    #[test]
    fn success_range_is_2xx() {
        let ok = HostResponse {
            status: 204,
            body: Vec::new(),
        };
        let failed = HostResponse {
            status: 500,
            body: Vec::new(),
        };
        assert!(ok.is_success());
        assert!(!failed.is_success());
    }
}
