//! HTTP client for the authoritative fq-server endpoints

use async_trait::async_trait;
use fq_common::api::{
    CalculateRequest, CalculateResponse, ErrorResponse, HealthResponse, MaterialListing,
    PATH_CALCULATE, PATH_HEALTH, PATH_MATERIALS, PATH_ORDERS, PATH_PARAMETERS,
};
use fq_common::catalog::{Catalog, Material};
use fq_common::config::ClientSettings;
use fq_common::order::{OrderDraft, OrderWithItems};
use fq_common::params::{flatten_grouped, GroupedParameters};
use fq_common::{Error, ParameterSnapshot, PartConfiguration, PriceBreakdown, Result};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::pricer::AuthoritativePricer;

const USER_AGENT: &str = concat!("fabquote-client/", env!("CARGO_PKG_VERSION"));

/// Talks to one fq-server instance
#[derive(Debug, Clone)]
pub struct HttpPricingClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpPricingClient {
    /// Create a client; every request is bounded by `settings.request_timeout`
    pub fn new(settings: &ClientSettings) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: settings.server_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        let response = self
            .http_client
            .get(self.url(PATH_HEALTH))
            .send()
            .await
            .map_err(request_error)?;
        decode(response).await
    }

    /// Active materials as listed by the server
    pub async fn list_materials(&self) -> Result<Vec<MaterialListing>> {
        let response = self
            .http_client
            .get(self.url(PATH_MATERIALS))
            .send()
            .await
            .map_err(request_error)?;
        decode(response).await
    }

    /// Server catalog in the shape the local engine consumes
    pub async fn fetch_catalog(&self) -> Result<Catalog> {
        let listings = self.list_materials().await?;
        Ok(Catalog::new(listings.into_iter().map(Material::from).collect()))
    }

    /// Grouped parameter set, as shown in the admin panel
    pub async fn fetch_parameters(&self) -> Result<GroupedParameters> {
        let response = self
            .http_client
            .get(self.url(PATH_PARAMETERS))
            .send()
            .await
            .map_err(request_error)?;
        decode(response).await
    }

    /// Submit a cart for checkout; the server re-prices every item
    pub async fn submit_order(&self, draft: &OrderDraft) -> Result<OrderWithItems> {
        let response = self
            .http_client
            .post(self.url(PATH_ORDERS))
            .json(draft)
            .send()
            .await
            .map_err(request_error)?;
        decode(response).await
    }
}

#[async_trait]
impl AuthoritativePricer for HttpPricingClient {
    async fn calculate(&self, config: &PartConfiguration) -> Result<PriceBreakdown> {
        debug!(
            material = %config.material_id,
            thickness = %config.thickness_label,
            quantity = config.quantity,
            "Requesting authoritative quote"
        );

        let response = self
            .http_client
            .post(self.url(PATH_CALCULATE))
            .json(&CalculateRequest::from(config))
            .send()
            .await
            .map_err(request_error)?;
        let quote: CalculateResponse = decode(response).await?;

        Ok(quote.breakdown())
    }

    async fn fetch_snapshot(&self) -> Result<ParameterSnapshot> {
        let grouped = self.fetch_parameters().await?;
        Ok(flatten_grouped(&grouped))
    }
}

/// Failures before a response arrives are all retryable from the caller's view
fn request_error(e: reqwest::Error) -> Error {
    Error::Transient(e.to_string())
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<T>()
            .await
            .map_err(|e| Error::Internal(format!("Malformed response body: {}", e)));
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.error)
        .unwrap_or(body);

    Err(status_error(status, message))
}

fn status_error(status: StatusCode, message: String) -> Error {
    match status {
        StatusCode::BAD_REQUEST => Error::Validation(message),
        StatusCode::NOT_FOUND => Error::NotFound(message),
        s if s.is_server_error() => Error::Transient(format!("HTTP {}: {}", s.as_u16(), message)),
        s => Error::Internal(format!("HTTP {}: {}", s.as_u16(), message)),
    }
}
