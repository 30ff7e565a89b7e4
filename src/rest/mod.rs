//! Wavefleet REST API client.
//!
//! Provides access to the Wavefleet data endpoints.
//!
//! # Trait-based API
//!
//! The [`WavefleetClient`] trait abstracts the REST API operations, enabling:
//! - Mock implementations for testing
//! - Fleet helpers generic over the client
//!
//! ```rust,ignore
//! use wavefleet_api_client::rest::{WavefleetClient, WavefleetRestClient};
//!
//! async fn count<C: WavefleetClient>(client: &C) -> Result<usize, wavefleet_api_client::WavefleetError> {
//!     Ok(client.get_devices().await?.len())
//! }
//! ```

mod client;
pub mod data;
pub mod endpoints;
mod traits;

pub use client::{AuthScheme, WavefleetRestClient, WavefleetRestClientBuilder};
pub use data::{
    AllData, Device, DeviceHistory, FrequencyHistory, HistoryRequest, LatestData,
    LatestDataRequest, TrackHistory, WaveHistory, WindHistory,
};
pub use traits::WavefleetClient;
