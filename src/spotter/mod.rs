//! Spotter devices and fleet-wide refresh.
//!
//! A [`Spotter`] holds the most recent telemetry fetched for one device.
//! [`get_and_update_spotters`] builds one per listed device and refreshes
//! them concurrently.

mod fleet;

pub use fleet::{FleetRefresh, RefreshFailure, get_and_update_spotters};

use time::OffsetDateTime;
use tracing::debug;

use crate::error::WavefleetError;
use crate::rest::{
    Device, DeviceHistory, HistoryRequest, LatestData, LatestDataRequest, WavefleetClient,
};
use crate::types::{
    BarometerReading, DateRange, FrequencyData, SensorReading, SurfaceTempReading, TrackReading,
    WaveReading, WindReading,
};

/// A Spotter buoy and the telemetry last fetched for it.
///
/// Fields stay `None` until a refresh fills them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Spotter {
    /// Spotter id, e.g. `SPOT-30344R`.
    pub id: String,
    pub name: Option<String>,
    /// Battery charge in percent.
    pub battery_power: Option<f64>,
    pub battery_voltage: Option<f64>,
    pub solar_voltage: Option<f64>,
    /// Relative humidity inside the hull, in percent.
    pub humidity: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Time of the last GPS fix.
    pub timestamp: Option<OffsetDateTime>,
    pub wave: Option<WaveReading>,
    pub wind: Option<WindReading>,
    pub track: Option<TrackReading>,
    /// `None` until fetched; then whether the device captures spectra.
    pub frequency: Option<FrequencyData>,
    pub surface_temp: Option<SurfaceTempReading>,
    pub barometer: Option<BarometerReading>,
    pub sensor_data: Option<Vec<SensorReading>>,
    /// Result of the last [`Spotter::grab_data`] call.
    pub history: Option<DeviceHistory>,
    /// When [`Spotter::update`] last succeeded.
    pub last_refreshed: Option<OffsetDateTime>,
}

impl Spotter {
    /// A Spotter known only by its id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// A Spotter from a device listing entry.
    pub fn from_device(device: Device) -> Self {
        Self {
            id: device.spotter_id,
            name: device.name,
            ..Self::default()
        }
    }

    /// Fetch the latest data (wind and spectra included) and store it.
    pub async fn update<C: WavefleetClient>(&mut self, client: &C) -> Result<(), WavefleetError> {
        let request = LatestDataRequest::new(&self.id)
            .include_wind_data(true)
            .include_frequency_data(true);
        let latest = client.get_latest_data(&request).await?;
        self.apply_latest(latest);
        self.last_refreshed = Some(OffsetDateTime::now_utc());
        debug!(spotter_id = %self.id, "Spotter updated");
        Ok(())
    }

    /// Store a latest-data response, keeping the newest reading per category.
    pub fn apply_latest(&mut self, latest: LatestData) {
        if latest.spotter_name.is_some() {
            self.name = latest.spotter_name;
        }
        self.battery_power = latest.battery_power.or(self.battery_power);
        self.battery_voltage = latest.battery_voltage.or(self.battery_voltage);
        self.solar_voltage = latest.solar_voltage.or(self.solar_voltage);
        self.humidity = latest.humidity.or(self.humidity);

        if let Some(track) = latest.track.into_iter().last() {
            self.latitude = track.latitude;
            self.longitude = track.longitude;
            self.timestamp = Some(track.timestamp);
            self.track = Some(track);
        }
        if let Some(wave) = latest.waves.into_iter().last() {
            self.wave = Some(wave);
        }
        if let Some(wind) = latest.wind.into_iter().last() {
            self.wind = Some(wind);
        }
        if let Some(temp) = latest.surface_temp.into_iter().last() {
            self.surface_temp = Some(temp);
        }
        if let Some(pressure) = latest.barometer_data.into_iter().last() {
            self.barometer = Some(pressure);
        }
        self.frequency = Some(latest.frequency_data);
    }

    /// A history request for this Spotter, to be narrowed by the caller.
    pub fn history_request(&self, range: DateRange) -> HistoryRequest {
        HistoryRequest::new(&self.id, range)
    }

    /// Fetch historical data for this Spotter and keep it in [`Spotter::history`].
    pub async fn grab_data<C: WavefleetClient>(
        &mut self,
        client: &C,
        request: &HistoryRequest,
    ) -> Result<&DeviceHistory, WavefleetError> {
        if request.spotter_id != self.id {
            return Err(WavefleetError::validation(format!(
                "history request for {} used on spotter {}",
                request.spotter_id, self.id
            )));
        }
        let history = client.get_device_history(request).await?;
        Ok(&*self.history.insert(history))
    }

    /// Fetch sensor readings for this Spotter and keep them in [`Spotter::sensor_data`].
    pub async fn grab_sensor_data<C: WavefleetClient>(
        &mut self,
        client: &C,
        range: &DateRange,
    ) -> Result<&[SensorReading], WavefleetError> {
        let readings = client.get_sensor_data(&self.id, range).await?;
        Ok(self.sensor_data.insert(readings).as_slice())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_apply_latest_keeps_newest_readings() {
        let latest: LatestData = serde_json::from_value(json!({
            "spotterId": "SPOT-30344R",
            "spotterName": "Pier 39",
            "batteryPower": 93.0,
            "humidity": 18.0,
            "waves": [
                { "significantWaveHeight": 1.1, "timestamp": "2023-05-02T00:00:00Z" },
                { "significantWaveHeight": 1.4, "timestamp": "2023-05-02T00:30:00Z" }
            ],
            "wind": [],
            "track": [
                { "latitude": 37.81, "longitude": -122.41, "timestamp": "2023-05-02T00:30:00Z" }
            ]
        }))
        .unwrap();

        let mut spotter = Spotter::new("SPOT-30344R");
        spotter.apply_latest(latest);

        assert_eq!(spotter.name.as_deref(), Some("Pier 39"));
        assert_eq!(spotter.battery_power, Some(93.0));
        assert_eq!(spotter.wave.as_ref().unwrap().significant_wave_height, Some(1.4));
        assert!(spotter.wind.is_none());
        assert_eq!(spotter.latitude, Some(37.81));
        assert_eq!(spotter.frequency, Some(FrequencyData::NotEnabled));
    }

    #[test]
    fn test_apply_latest_surface_temp_and_barometer() {
        let latest: LatestData = serde_json::from_value(json!({
            "spotterId": "SPOT-30344R",
            "waves": [],
            "track": [{ "latitude": null, "longitude": null, "timestamp": "2023-05-02T00:30:00Z" }],
            "surfaceTemp": [
                { "degrees": 14.8, "timestamp": "2023-05-02T00:00:00Z" },
                { "degrees": 15.1, "timestamp": "2023-05-02T00:30:00Z" }
            ],
            "barometerData": [
                { "value": 1012.6, "units": "hPa", "timestamp": "2023-05-02T00:30:00Z" }
            ]
        }))
        .unwrap();

        let mut spotter = Spotter::new("SPOT-30344R");
        spotter.latitude = Some(37.81);
        spotter.apply_latest(latest);

        assert_eq!(spotter.surface_temp.as_ref().unwrap().degrees, Some(15.1));
        let barometer = spotter.barometer.as_ref().unwrap();
        assert_eq!(barometer.value, Some(1012.6));
        assert_eq!(barometer.units.as_deref(), Some("hPa"));
        assert!(spotter.latitude.is_none());
        assert!(spotter.track.is_some());
    }

    #[test]
    fn test_from_device_keeps_name() {
        let spotter = Spotter::from_device(Device {
            spotter_id: "SPOT-1".to_string(),
            name: Some("North buoy".to_string()),
        });
        assert_eq!(spotter.id, "SPOT-1");
        assert_eq!(spotter.name.as_deref(), Some("North buoy"));
        assert!(spotter.last_refreshed.is_none());
    }
}
