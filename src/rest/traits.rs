//! Trait definition for the Wavefleet REST API client.
//!
//! This module provides the `WavefleetClient` trait which abstracts the API
//! operations, so that fleet helpers such as
//! [`get_and_update_spotters`](crate::spotter::get_and_update_spotters) can run
//! against the real client or against an in-memory implementation in tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use wavefleet_api_client::rest::{LatestDataRequest, WavefleetClient};
//!
//! async fn battery<C: WavefleetClient>(client: &C, id: &str) -> wavefleet_api_client::Result<Option<f64>> {
//!     let latest = client.get_latest_data(&LatestDataRequest::new(id)).await?;
//!     Ok(latest.battery_power)
//! }
//! ```

use std::future::Future;

use crate::error::WavefleetError;
use crate::rest::data::{
    AllData, Device, DeviceHistory, FrequencyHistory, HistoryRequest, LatestData,
    LatestDataRequest, TrackHistory, WaveHistory, WindHistory,
};
use crate::types::{DateRange, SensorReading};

/// Trait defining the Wavefleet API operations.
///
/// All methods are async and return `Result<T, WavefleetError>`.
pub trait WavefleetClient: Send + Sync {
    /// List the devices visible to the token.
    fn get_devices(&self) -> impl Future<Output = Result<Vec<Device>, WavefleetError>> + Send;

    /// Get the historical data of one Spotter.
    fn get_device_history(
        &self,
        request: &HistoryRequest,
    ) -> impl Future<Output = Result<DeviceHistory, WavefleetError>> + Send;

    /// Get the latest data of one Spotter.
    fn get_latest_data(
        &self,
        request: &LatestDataRequest,
    ) -> impl Future<Output = Result<LatestData, WavefleetError>> + Send;

    /// Get the readings of sensors attached to a Spotter.
    fn get_sensor_data(
        &self,
        spotter_id: &str,
        range: &DateRange,
    ) -> impl Future<Output = Result<Vec<SensorReading>, WavefleetError>> + Send;

    /// Get wave data.
    fn get_wave_data(
        &self,
        range: &DateRange,
        spotter_id: Option<&str>,
    ) -> impl Future<Output = Result<WaveHistory, WavefleetError>> + Send;

    /// Get wind data.
    fn get_wind_data(
        &self,
        range: &DateRange,
        spotter_id: Option<&str>,
    ) -> impl Future<Output = Result<WindHistory, WavefleetError>> + Send;

    /// Get track data.
    fn get_track_data(
        &self,
        range: &DateRange,
        spotter_id: Option<&str>,
    ) -> impl Future<Output = Result<TrackHistory, WavefleetError>> + Send;

    /// Get spectra.
    fn get_frequency_data(
        &self,
        range: &DateRange,
        spotter_id: Option<&str>,
    ) -> impl Future<Output = Result<FrequencyHistory, WavefleetError>> + Send;

    /// Get waves, wind, track and spectra together.
    fn get_all_data(
        &self,
        range: &DateRange,
        spotter_id: Option<&str>,
    ) -> impl Future<Output = Result<AllData, WavefleetError>> + Send;
}
