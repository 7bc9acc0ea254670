use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Request};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ReportError, Result};
use crate::model::{ApiErrorBody, PriceResponse, QuoteResponse, SourcesResponse, SwapQuoteRequest};

pub const PRICE_PATH: &str = "/swap/permit2/price";
pub const QUOTE_PATH: &str = "/swap/permit2/quote";
pub const SOURCES_PATH: &str = "/sources";

const API_KEY_HEADER: &str = "0x-api-key";
const API_VERSION_HEADER: &str = "0x-version";
const API_VERSION: &str = "v2";

/// The aggregator operations the reports depend on.
pub(crate) trait SwapApi {
    async fn price(&self, request: &SwapQuoteRequest) -> Result<PriceResponse>;
    async fn quote(&self, request: &SwapQuoteRequest) -> Result<QuoteResponse>;
    async fn sources(&self, chain_id: u64) -> Result<SourcesResponse>;
}

/// HTTP client for the 0x swap API. One instance is shared by every report;
/// the API key and version headers are attached to each request.
#[derive(Clone)]
pub struct ZeroExClient {
    http: Client,
    headers: HeaderMap,
    base_url: String,
}

impl ZeroExClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut key = HeaderValue::from_str(api_key)
            .map_err(|e| ReportError::Config(format!("API key is not a valid header value: {e}")))?;
        key.set_sensitive(true);
        headers.insert(API_KEY_HEADER, key);
        headers.insert(API_VERSION_HEADER, HeaderValue::from_static(API_VERSION));

        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| ReportError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            headers,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    // nothing is sent here, so a failure is a malformed url or header
    fn get<Q: Serialize + ?Sized>(&self, path: &'static str, query: &Q) -> Result<Request> {
        self.http
            .get(self.endpoint(path))
            .headers(self.headers.clone())
            .query(query)
            .build()
            .map_err(|e| ReportError::Config(format!("cannot build request for {path}: {e}")))
    }

    pub fn price_request(&self, request: &SwapQuoteRequest) -> Result<Request> {
        self.get(PRICE_PATH, &request.query_pairs())
    }

    pub fn quote_request(&self, request: &SwapQuoteRequest) -> Result<Request> {
        self.get(QUOTE_PATH, &request.query_pairs())
    }

    pub fn sources_request(&self, chain_id: u64) -> Result<Request> {
        self.get(SOURCES_PATH, &[("chainId", chain_id.to_string())])
    }

    async fn execute<T: DeserializeOwned>(&self, endpoint: &'static str, request: Request) -> Result<T> {
        log::info!("GET {}", request.url());
        let response = self
            .http
            .execute(request)
            .await
            .map_err(|source| ReportError::Network { endpoint, source })?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| ReportError::Network { endpoint, source })?;
        log::debug!("{endpoint} responded {status} ({} bytes)", body.len());
        decode_body(endpoint, status.as_u16(), &body)
    }
}

/// Maps a raw HTTP response onto the typed schema or the matching error.
fn decode_body<T: DeserializeOwned>(endpoint: &'static str, status: u16, body: &str) -> Result<T> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<ApiErrorBody>(body)
            .ok()
            .and_then(|b| b.describe())
            .unwrap_or_else(|| body.trim().to_string());
        return Err(ReportError::Api {
            endpoint,
            status,
            message,
        });
    }
    serde_json::from_str(body).map_err(|source| ReportError::DataContract { endpoint, source })
}

impl SwapApi for ZeroExClient {
    async fn price(&self, request: &SwapQuoteRequest) -> Result<PriceResponse> {
        let req = self.price_request(request)?;
        self.execute(PRICE_PATH, req).await
    }

    async fn quote(&self, request: &SwapQuoteRequest) -> Result<QuoteResponse> {
        let req = self.quote_request(request)?;
        self.execute(QUOTE_PATH, req).await
    }

    async fn sources(&self, chain_id: u64) -> Result<SourcesResponse> {
        let req = self.sources_request(chain_id)?;
        self.execute(SOURCES_PATH, req).await
    }
}
