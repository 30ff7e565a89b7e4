//! Wavefleet REST API endpoint constants.

/// Base URL for the Wavefleet REST API.
pub const WAVEFLEET_BASE_URL: &str = "https://api.sofarocean.com/api";

/// Devices visible to the token.
pub const DEVICES: &str = "/devices";
/// Historical wave, wind, track and spectral data.
pub const WAVE_DATA: &str = "/wave-data";
/// Most recent data of one Spotter.
pub const LATEST_DATA: &str = "/latest-data";
/// Readings of attached sensors.
pub const SENSOR_DATA: &str = "/sensor-data";

/// Maximum number of records per category the wave-data endpoint returns.
pub const MAX_PAGE_LIMIT: u32 = 500;
