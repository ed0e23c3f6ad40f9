//! Transport capability
//!
//! Everything the token manager and the API client need from the network:
//! a form POST and an authenticated GET, both answering with parsed JSON.

use reqwest::{Client, Response};
use serde_json::Value;
use tracing::debug;

use crate::error::TransportError;

pub trait Transport {
    fn post_form(
        &self,
        path: &str,
        form: &[(&str, String)],
    ) -> impl std::future::Future<Output = Result<Value, TransportError>> + Send;

    fn get_json(
        &self,
        path_and_query: &str,
        bearer: &str,
    ) -> impl std::future::Future<Output = Result<Value, TransportError>> + Send;
}

impl<T: Transport> Transport for &T {
    fn post_form(
        &self,
        path: &str,
        form: &[(&str, String)],
    ) -> impl std::future::Future<Output = Result<Value, TransportError>> + Send {
        (**self).post_form(path, form)
    }

    fn get_json(
        &self,
        path_and_query: &str,
        bearer: &str,
    ) -> impl std::future::Future<Output = Result<Value, TransportError>> + Send {
        (**self).get_json(path_and_query, bearer)
    }
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    fn url(&self, path: &str) -> Result<reqwest::Url, TransportError> {
        let raw = format!("{}{}", self.base_url, path);
        reqwest::Url::parse(&raw).map_err(|e| TransportError::InvalidUrl(format!("{}: {}", raw, e)))
    }
}

impl Transport for HttpTransport {
    async fn post_form(&self, path: &str, form: &[(&str, String)]) -> Result<Value, TransportError> {
        let url = self.url(path)?;
        debug!("POST {}", url);
        let response = self.client.post(url).form(form).send().await?;
        read_json(response).await
    }

    async fn get_json(&self, path_and_query: &str, bearer: &str) -> Result<Value, TransportError> {
        let url = self.url(path_and_query)?;
        debug!("GET {}", url);
        let response = self.client.get(url).bearer_auth(bearer).send().await?;
        read_json(response).await
    }
}

async fn read_json(response: Response) -> Result<Value, TransportError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(TransportError::Status { status, body });
    }
    serde_json::from_str(&body).map_err(|e| TransportError::Decode(e.to_string()))
}
