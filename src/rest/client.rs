//! Wavefleet REST API client implementation.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;
use tracing::debug;

use crate::auth::{ApiToken, TokenProvider, resolve_token_with};
use crate::error::{ApiError, WavefleetError};
use crate::rest::data::{
    AllData, Device, DeviceHistory, FrequencyHistory, HistoryRequest, LatestData,
    LatestDataRequest, TrackHistory, WaveHistory, WindHistory,
};
use crate::rest::endpoints::WAVEFLEET_BASE_URL;
use crate::rest::traits::WavefleetClient;
use crate::types::{DateRange, SensorReading};

/// Default number of Spotters queried at once by fleet-wide requests.
const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// How the token is attached to requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthScheme {
    /// `token: <token>` header, as the Wavefleet API documents.
    #[default]
    TokenHeader,
    /// `Authorization: Bearer <token>` header.
    Bearer,
}

/// The Wavefleet REST API client.
///
/// The client holds one token for its whole life and is cheap to clone;
/// clones share the underlying connection pool.
///
/// # Example
///
/// ```rust,no_run
/// use wavefleet_api_client::rest::{LatestDataRequest, WavefleetRestClient};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     // Token from WF_API_TOKEN or ~/sofar_api.env
///     let client = WavefleetRestClient::new()?;
///
///     let request = LatestDataRequest::new("SPOT-30344R").include_wind_data(true);
///     let latest = client.get_latest_data(&request).await?;
///     println!("Latest waves: {:?}", latest.waves.last());
///
///     Ok(())
/// }
/// ```
///
/// With an explicit token:
///
/// ```rust,no_run
/// use wavefleet_api_client::rest::WavefleetRestClient;
/// use wavefleet_api_client::types::DateRange;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = WavefleetRestClient::builder().token("my_token").build()?;
///
///     let range = DateRange::new("2023-05-02", "2023-05-10")?;
///     let data = client.get_wave_data(&range, None).await?;
///     println!("{} wave records", data.waves.len());
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct WavefleetRestClient {
    http_client: ClientWithMiddleware,
    base_url: String,
    token: ApiToken,
    auth_scheme: AuthScheme,
    max_concurrency: usize,
    devices: Option<Arc<Vec<Device>>>,
}

impl WavefleetRestClient {
    /// Create a new client with default settings.
    ///
    /// The token is read from `WF_API_TOKEN` or `~/sofar_api.env`.
    pub fn new() -> Result<Self, WavefleetError> {
        Self::builder().build()
    }

    /// Create a new client with an explicit token.
    pub fn with_token(token: impl Into<String>) -> Result<Self, WavefleetError> {
        Self::builder().token(token).build()
    }

    /// Create a new client builder.
    pub fn builder() -> WavefleetRestClientBuilder {
        WavefleetRestClientBuilder::new()
    }

    /// The token this client authenticates with.
    pub fn token(&self) -> &ApiToken {
        &self.token
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub(crate) fn preset_devices(&self) -> Option<&[Device]> {
        self.devices.as_deref().map(Vec::as_slice)
    }

    /// Make an authenticated GET request with query parameters.
    pub(crate) async fn get<T, Q>(&self, endpoint: &str, params: &Q) -> Result<T, WavefleetError>
    where
        T: serde::de::DeserializeOwned,
        Q: serde::Serialize + ?Sized,
    {
        let query_string = serde_urlencoded::to_string(params)
            .map_err(|e| WavefleetError::validation(e.to_string()))?;
        let url = if query_string.is_empty() {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}{}?{}", self.base_url, endpoint, query_string)
        };

        debug!(endpoint, query = %query_string, "GET");

        let request = self.http_client.get(&url);
        let request = match self.auth_scheme {
            AuthScheme::TokenHeader => request.header("token", self.token.expose_secret()),
            AuthScheme::Bearer => request.header(
                AUTHORIZATION,
                format!("Bearer {}", self.token.expose_secret()),
            ),
        };
        let response = request.send().await?;

        self.parse_response(response).await
    }

    /// Parse a response from the Wavefleet API.
    ///
    /// Successful responses wrap their payload as `{"data": ...}`.
    async fn parse_response<T>(&self, response: reqwest::Response) -> Result<T, WavefleetError>
    where
        T: serde::de::DeserializeOwned,
    {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(WavefleetError::Api(ApiError::from_body(status.as_u16(), &body)));
        }

        let parsed: WavefleetResponse<T> = serde_json::from_str(&body).map_err(|e| {
            WavefleetError::Parsing(format!("Failed to parse response: {}. Body: {}", e, body))
        })?;

        Ok(parsed.data)
    }
}

impl std::fmt::Debug for WavefleetRestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WavefleetRestClient")
            .field("base_url", &self.base_url)
            .field("auth_scheme", &self.auth_scheme)
            .field("max_concurrency", &self.max_concurrency)
            .field("preset_devices", &self.devices.as_ref().map(|d| d.len()))
            .finish()
    }
}

/// Builder for [`WavefleetRestClient`].
pub struct WavefleetRestClientBuilder {
    base_url: String,
    token: Option<String>,
    token_provider: Option<Arc<dyn TokenProvider>>,
    auth_scheme: AuthScheme,
    user_agent: Option<String>,
    timeout: Option<Duration>,
    max_concurrency: usize,
    devices: Option<Vec<Device>>,
}

impl WavefleetRestClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            base_url: WAVEFLEET_BASE_URL.to_string(),
            token: None,
            token_provider: None,
            auth_scheme: AuthScheme::default(),
            user_agent: None,
            timeout: None,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            devices: None,
        }
    }

    /// Set the base URL (useful for testing with a mock server).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Use this token instead of looking one up.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Consult this provider before the environment and the token file.
    pub fn token_provider(mut self, provider: Arc<dyn TokenProvider>) -> Self {
        self.token_provider = Some(provider);
        self
    }

    /// Set how the token is sent.
    pub fn auth_scheme(mut self, scheme: AuthScheme) -> Self {
        self.auth_scheme = scheme;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Set a timeout applied to every request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set how many Spotters fleet-wide queries fetch at once.
    pub fn max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max.max(1);
        self
    }

    /// Use a known device listing instead of querying the `devices` endpoint.
    pub fn devices(mut self, devices: Vec<Device>) -> Self {
        self.devices = Some(devices);
        self
    }

    /// Build the client.
    ///
    /// Resolves the token (explicit, then the custom provider, then
    /// `WF_API_TOKEN`, then `~/sofar_api.env`). No request is sent.
    pub fn build(self) -> Result<WavefleetRestClient, WavefleetError> {
        let token = resolve_token_with(self.token.as_deref(), self.token_provider.as_deref())?;

        let base_url = self.base_url.trim_end_matches('/').to_string();
        url::Url::parse(&base_url)?;

        // Build default headers.
        let mut headers = HeaderMap::new();
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("wavefleet-api-client/{}", env!("CARGO_PKG_VERSION")));
        let header_value = HeaderValue::from_str(&user_agent)
            .unwrap_or_else(|_| HeaderValue::from_static("wavefleet-api-client"));
        headers.insert(USER_AGENT, header_value);

        let mut reqwest_builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = self.timeout {
            reqwest_builder = reqwest_builder.timeout(timeout);
        }
        let reqwest_client = reqwest_builder.build()?;

        let client = ClientBuilder::new(reqwest_client)
            .with(TracingMiddleware::default())
            .build();

        Ok(WavefleetRestClient {
            http_client: client,
            base_url,
            token,
            auth_scheme: self.auth_scheme,
            max_concurrency: self.max_concurrency,
            devices: self.devices.map(Arc::new),
        })
    }
}

impl Default for WavefleetRestClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Internal response wrapper for Wavefleet API responses.
#[derive(Debug, serde::Deserialize)]
struct WavefleetResponse<T> {
    data: T,
}

// WavefleetClient trait implementation.

impl WavefleetClient for WavefleetRestClient {
    async fn get_devices(&self) -> Result<Vec<Device>, WavefleetError> {
        WavefleetRestClient::get_devices(self).await
    }

    async fn get_device_history(
        &self,
        request: &HistoryRequest,
    ) -> Result<DeviceHistory, WavefleetError> {
        WavefleetRestClient::get_device_history(self, request).await
    }

    async fn get_latest_data(
        &self,
        request: &LatestDataRequest,
    ) -> Result<LatestData, WavefleetError> {
        WavefleetRestClient::get_latest_data(self, request).await
    }

    async fn get_sensor_data(
        &self,
        spotter_id: &str,
        range: &DateRange,
    ) -> Result<Vec<SensorReading>, WavefleetError> {
        WavefleetRestClient::get_sensor_data(self, spotter_id, range).await
    }

    async fn get_wave_data(
        &self,
        range: &DateRange,
        spotter_id: Option<&str>,
    ) -> Result<WaveHistory, WavefleetError> {
        WavefleetRestClient::get_wave_data(self, range, spotter_id).await
    }

    async fn get_wind_data(
        &self,
        range: &DateRange,
        spotter_id: Option<&str>,
    ) -> Result<WindHistory, WavefleetError> {
        WavefleetRestClient::get_wind_data(self, range, spotter_id).await
    }

    async fn get_track_data(
        &self,
        range: &DateRange,
        spotter_id: Option<&str>,
    ) -> Result<TrackHistory, WavefleetError> {
        WavefleetRestClient::get_track_data(self, range, spotter_id).await
    }

    async fn get_frequency_data(
        &self,
        range: &DateRange,
        spotter_id: Option<&str>,
    ) -> Result<FrequencyHistory, WavefleetError> {
        WavefleetRestClient::get_frequency_data(self, range, spotter_id).await
    }

    async fn get_all_data(
        &self,
        range: &DateRange,
        spotter_id: Option<&str>,
    ) -> Result<AllData, WavefleetError> {
        WavefleetRestClient::get_all_data(self, range, spotter_id).await
    }
}
