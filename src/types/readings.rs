//! Telemetry records reported by Spotters.
//!
//! Each category of data has its own record type. Every record carries a
//! timestamp and, when the API reports it, the position the reading was
//! taken at. Records gathered across several devices are tagged with the
//! id of the Spotter that produced them.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Common access to the fields every reading has.
pub trait Reading {
    /// Time the reading was taken.
    fn timestamp(&self) -> OffsetDateTime;

    /// Id of the Spotter that produced the reading, if tagged.
    fn spotter_id(&self) -> Option<&str>;

    /// Tag the reading with the Spotter that produced it.
    fn set_spotter_id(&mut self, spotter_id: &str);
}

macro_rules! impl_reading {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Reading for $ty {
                fn timestamp(&self) -> OffsetDateTime {
                    self.timestamp
                }

                fn spotter_id(&self) -> Option<&str> {
                    self.spotter_id.as_deref()
                }

                fn set_spotter_id(&mut self, spotter_id: &str) {
                    self.spotter_id = Some(spotter_id.to_string());
                }
            }
        )+
    };
}

/// Bulk wave parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaveReading {
    /// Significant wave height in meters.
    #[serde(default)]
    pub significant_wave_height: Option<f64>,
    /// Peak period in seconds.
    #[serde(default)]
    pub peak_period: Option<f64>,
    /// Mean period in seconds.
    #[serde(default)]
    pub mean_period: Option<f64>,
    /// Peak direction in degrees (coming from, clockwise from north).
    #[serde(default)]
    pub peak_direction: Option<f64>,
    /// Directional spread at the peak, in degrees.
    #[serde(default)]
    pub peak_directional_spread: Option<f64>,
    /// Mean direction in degrees.
    #[serde(default)]
    pub mean_direction: Option<f64>,
    /// Mean directional spread in degrees.
    #[serde(default)]
    pub mean_directional_spread: Option<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spotter_id: Option<String>,
}

/// Wind estimate derived from the sea surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindReading {
    /// Wind speed in m/s.
    #[serde(default)]
    pub speed: Option<f64>,
    /// Wind direction in degrees.
    #[serde(default)]
    pub direction: Option<f64>,
    /// Sea surface roughness id used by the estimate.
    #[serde(default)]
    pub seasurface_id: Option<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spotter_id: Option<String>,
}

/// A GPS fix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackReading {
    /// `None` when the fix has no position.
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spotter_id: Option<String>,
}

/// A wave spectrum.
///
/// All vectors are indexed by frequency bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyReading {
    /// Bin center frequencies in Hz.
    #[serde(default)]
    pub frequency: Vec<f64>,
    /// Bin widths in Hz.
    #[serde(default)]
    pub df: Vec<f64>,
    /// Variance density in m²/Hz.
    #[serde(default)]
    pub variance_density: Vec<f64>,
    #[serde(default)]
    pub a1: Vec<f64>,
    #[serde(default)]
    pub b1: Vec<f64>,
    #[serde(default)]
    pub a2: Vec<f64>,
    #[serde(default)]
    pub b2: Vec<f64>,
    #[serde(default)]
    pub direction: Vec<f64>,
    #[serde(default)]
    pub directional_spread: Vec<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spotter_id: Option<String>,
}

impl FrequencyReading {
    /// Number of frequency bins in the spectrum.
    pub fn bins(&self) -> usize {
        self.frequency.len()
    }
}

/// Sea surface temperature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceTempReading {
    /// Temperature in degrees Celsius.
    #[serde(default)]
    pub degrees: Option<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spotter_id: Option<String>,
}

/// Barometric pressure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarometerReading {
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub units: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spotter_id: Option<String>,
}

/// A reading from a sensor attached to a Spotter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    /// Port the sensor is attached to.
    pub sensor_position: u32,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub units: Option<String>,
    /// Physical quantity, e.g. `"temperature"`.
    #[serde(default, rename = "unit_type")]
    pub unit_type: Option<String>,
    /// Sensor-specific name of the value.
    #[serde(default, rename = "data_type_name")]
    pub data_type_name: Option<String>,
    /// Bristlemouth node the reading came through, for mesh-attached sensors.
    #[serde(default, rename = "bristlemouth_node_id")]
    pub bristlemouth_node_id: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spotter_id: Option<String>,
}

impl_reading!(
    WaveReading,
    WindReading,
    TrackReading,
    FrequencyReading,
    SurfaceTempReading,
    BarometerReading,
    SensorReading,
);

/// Spectral data of a device.
///
/// Devices only report spectra once spectral capture has been enabled on
/// them. A device without it omits the category altogether, which is
/// [`FrequencyData::NotEnabled`]; an enabled device with nothing in the
/// requested window is `Captured` with no readings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(
    from = "Option<Vec<FrequencyReading>>",
    into = "Option<Vec<FrequencyReading>>"
)]
pub enum FrequencyData {
    /// Spectral capture is enabled; these are the spectra.
    Captured(Vec<FrequencyReading>),
    /// The device is not configured for spectral capture.
    #[default]
    NotEnabled,
}

impl FrequencyData {
    /// Whether the device reported spectral data at all.
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Captured(_))
    }

    /// The spectra, empty when capture is not enabled.
    pub fn readings(&self) -> &[FrequencyReading] {
        match self {
            Self::Captured(readings) => readings,
            Self::NotEnabled => &[],
        }
    }

    /// Take the spectra, empty when capture is not enabled.
    pub fn into_readings(self) -> Vec<FrequencyReading> {
        match self {
            Self::Captured(readings) => readings,
            Self::NotEnabled => Vec::new(),
        }
    }
}

impl From<Option<Vec<FrequencyReading>>> for FrequencyData {
    fn from(value: Option<Vec<FrequencyReading>>) -> Self {
        match value {
            Some(readings) => Self::Captured(readings),
            None => Self::NotEnabled,
        }
    }
}

impl From<FrequencyData> for Option<Vec<FrequencyReading>> {
    fn from(value: FrequencyData) -> Self {
        match value {
            FrequencyData::Captured(readings) => Some(readings),
            FrequencyData::NotEnabled => None,
        }
    }
}
