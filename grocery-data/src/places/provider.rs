//! Blocking `PlacesSearch` implementation over the Nearby Search endpoint.
//!
//! The [`PlacesSearch`] trait is synchronous so the store manager can run
//! on a plain thread. This provider bridges to the async `reqwest` client
//! by blocking on a Tokio runtime it owns.

use std::time::Duration;

use grocery_core::{
    DEFAULT_SEARCH_RADIUS_METERS, LocationFix, PlaceCandidate, PlacesSearch, PlacesSearchError,
};
use log::debug;
use reqwest::Client;
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use url::Url;

use super::google::NearbySearchResponse;

/// Error type for [`HttpPlacesSearch`] construction failures.
#[derive(Debug, Error)]
pub enum ProviderBuildError {
    /// The configured base URL cannot host the search endpoint.
    #[error("invalid places base URL {url:?}: {reason}")]
    InvalidBaseUrl {
        /// The rejected URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Default Google Maps API host.
pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com";

/// Default place type filter.
pub const DEFAULT_PLACE_TYPE: &str = "grocery_or_supermarket";

/// Default user agent for places requests.
pub const DEFAULT_USER_AGENT: &str = "grocery-reminder/0.1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const ENDPOINT_SEGMENTS: [&str; 5] = ["maps", "api", "place", "nearbysearch", "json"];

/// Configuration for [`HttpPlacesSearch`].
#[derive(Clone)]
pub struct HttpPlacesSearchConfig {
    /// Scheme and host of the places service.
    pub base_url: String,
    /// API key sent with every request.
    pub api_key: String,
    /// Search radius in meters.
    pub radius_meters: f64,
    /// Place type filter, e.g. `grocery_or_supermarket`.
    pub place_type: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl std::fmt::Debug for HttpPlacesSearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPlacesSearchConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("radius_meters", &self.radius_meters)
            .field("place_type", &self.place_type)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl Default for HttpPlacesSearchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_key: String::new(),
            radius_meters: DEFAULT_SEARCH_RADIUS_METERS,
            place_type: DEFAULT_PLACE_TYPE.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpPlacesSearchConfig {
    /// Create a configuration for the public Google endpoint.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Point requests at a different host, e.g. a local mock.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the search radius.
    #[must_use]
    pub const fn with_radius_meters(mut self, radius_meters: f64) -> Self {
        self.radius_meters = radius_meters;
        self
    }

    /// Set the place type filter.
    #[must_use]
    pub fn with_place_type(mut self, place_type: impl Into<String>) -> Self {
        self.place_type = place_type.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Nearby-places search over HTTP.
///
/// # Runtime behaviour
///
/// Outside any Tokio runtime the provider blocks on its own current-thread
/// runtime. Inside a multi-threaded runtime it uses that runtime's handle
/// with [`tokio::task::block_in_place`]. Inside a `current_thread` runtime
/// it falls back to its own runtime, which can deadlock if the caller's
/// runtime drives IO this request depends on.
///
/// The API key never appears in returned errors or log lines.
pub struct HttpPlacesSearch {
    client: Client,
    config: HttpPlacesSearchConfig,
    endpoint: Url,
    runtime: Runtime,
}

impl std::fmt::Debug for HttpPlacesSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPlacesSearch")
            .field("config", &self.config)
            .field("endpoint", &self.endpoint.as_str())
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish_non_exhaustive()
    }
}

impl HttpPlacesSearch {
    /// Create a provider for the public endpoint with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(HttpPlacesSearchConfig::new(api_key))
    }

    /// Create a provider with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is unusable or the HTTP client or
    /// Tokio runtime fails to build.
    pub fn with_config(config: HttpPlacesSearchConfig) -> Result<Self, ProviderBuildError> {
        let endpoint = build_endpoint(&config.base_url)?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ProviderBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            endpoint,
            runtime,
        })
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &HttpPlacesSearchConfig {
        &self.config
    }

    /// Build the search URL for `fix`, without the API key.
    ///
    /// The query carries `location=lat,lng`, `radius` and `type`.
    fn search_url(&self, fix: &LocationFix) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair(
                "location",
                &format!("{},{}", fix.latitude(), fix.longitude()),
            )
            .append_pair("radius", &self.config.radius_meters.to_string())
            .append_pair("type", &self.config.place_type);
        url
    }

    async fn search_async(&self, fix: &LocationFix) -> Result<Vec<PlaceCandidate>, PlacesSearchError> {
        let public_url = self.search_url(fix);
        let mut request_url = public_url.clone();
        request_url
            .query_pairs_mut()
            .append_pair("key", &self.config.api_key);
        debug!("searching nearby places: {public_url}");

        let response = self
            .client
            .get(request_url)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(err, public_url.as_str()))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(err, public_url.as_str()))?;

        let body: NearbySearchResponse =
            response
                .json()
                .await
                .map_err(|err| PlacesSearchError::ParseError {
                    message: err.without_url().to_string(),
                })?;

        Self::convert_response(body)
    }

    /// Convert a reqwest error to a `PlacesSearchError`.
    ///
    /// The error's own URL is stripped since it carries the API key.
    fn convert_reqwest_error(&self, error: reqwest::Error, url: &str) -> PlacesSearchError {
        if error.is_timeout() {
            return PlacesSearchError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        let status = error.status();
        let message = error.without_url().to_string();
        if let Some(status) = status {
            return PlacesSearchError::HttpError {
                url: url.to_owned(),
                status: status.as_u16(),
                message,
            };
        }

        PlacesSearchError::NetworkError {
            url: url.to_owned(),
            message,
        }
    }

    fn convert_response(
        response: NearbySearchResponse,
    ) -> Result<Vec<PlaceCandidate>, PlacesSearchError> {
        if !response.is_success() {
            return Err(PlacesSearchError::ServiceError {
                status: response.status,
                message: response.error_message.unwrap_or_default(),
            });
        }
        debug!("places service returned {} results", response.results.len());
        Ok(response
            .results
            .into_iter()
            .map(PlaceCandidate::from)
            .collect())
    }
}

fn build_endpoint(base_url: &str) -> Result<Url, ProviderBuildError> {
    let invalid = |reason: String| ProviderBuildError::InvalidBaseUrl {
        url: base_url.to_owned(),
        reason,
    };
    let mut endpoint = Url::parse(base_url).map_err(|err| invalid(err.to_string()))?;
    endpoint
        .path_segments_mut()
        .map_err(|()| invalid("URL cannot be a base".to_owned()))?
        .pop_if_empty()
        .extend(ENDPOINT_SEGMENTS);
    endpoint.set_query(None);
    Ok(endpoint)
}

impl PlacesSearch for HttpPlacesSearch {
    /// Search for places around `fix`.
    ///
    /// # Runtime requirements
    ///
    /// When called from within an existing Tokio runtime, the runtime must
    /// be multi-threaded. See the type-level docs for the fallback.
    fn search_nearby(&self, fix: &LocationFix) -> Result<Vec<PlaceCandidate>, PlacesSearchError> {
        let future = self.search_async(fix);
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }
}
