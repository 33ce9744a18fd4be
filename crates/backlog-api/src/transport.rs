//! Transport seam
//!
//! The client hands fully described requests to a `Transport`. Production code
//! uses `HttpTransport` over reqwest; tests substitute a scripted mock.

use async_trait::async_trait;
use url::Url;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::request::{ApiRequest, ApiResponse};
use crate::Result;

#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one HTTP exchange. Any status code is a successful exchange;
    /// only transport failures are errors.
    async fn send(&self, request: &ApiRequest, bearer: Option<&str>) -> Result<ApiResponse>;
}

pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ClientError::Network(format!("client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Base path + request path + query, the way the request was described.
    fn endpoint(&self, request: &ApiRequest) -> Url {
        let mut url = self.base_url.clone();
        let path = format!(
            "{}{}",
            self.base_url.path().trim_end_matches('/'),
            request.path()
        );
        url.set_path(&path);
        url.set_query(None);

        if !request.query().is_empty() {
            url.query_pairs_mut().extend_pairs(request.query());
        }

        url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest, bearer: Option<&str>) -> Result<ApiResponse> {
        let url = self.endpoint(request);
        let mut builder = self.client.request(request.method().into(), url);

        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(network_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(network_error)?;

        tracing::debug!(
            method = %request.method(),
            path = %request.path(),
            status,
            "HTTP exchange"
        );

        Ok(ApiResponse::new(status, body.to_vec()))
    }
}

fn network_error(e: reqwest::Error) -> ClientError {
    let kind = if e.is_timeout() {
        "timeout"
    } else if e.is_connect() {
        "connect"
    } else if e.is_request() {
        "request"
    } else if e.is_body() || e.is_decode() {
        "body"
    } else {
        "unknown"
    };

    ClientError::Network(format!("{}: {}", kind, e))
}
