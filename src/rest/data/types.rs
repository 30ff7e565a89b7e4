//! Request and response types for the Wavefleet data endpoints.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::WavefleetError;
use crate::types::date_range::format_instant;
use crate::types::{
    BarometerReading, DateRange, FrequencyData, FrequencyReading, Reading, SurfaceTempReading,
    TrackReading, WaveReading, WindReading,
};

/// A device visible to the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Spotter id, e.g. `SPOT-30344R`.
    pub spotter_id: String,
    /// Name given to the device, if any.
    #[serde(default)]
    pub name: Option<String>,
}

impl Device {
    /// A device known only by its id.
    pub fn new(spotter_id: impl Into<String>) -> Self {
        Self {
            spotter_id: spotter_id.into(),
            name: None,
        }
    }
}

/// Payload of the `devices` endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct DeviceList {
    #[serde(default)]
    pub devices: Vec<Device>,
}

/// Request for the historical data of one Spotter.
///
/// Waves are included by default; other categories have to be asked for.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRequest {
    /// Spotter to query.
    pub spotter_id: String,
    /// Dates to cover.
    pub range: DateRange,
    /// Records per category per page, at most 500.
    pub limit: Option<u32>,
    /// Include wave statistics.
    pub include_waves: bool,
    /// Include wind estimates.
    pub include_wind: bool,
    /// Include GPS fixes.
    pub include_track: bool,
    /// Include wave spectra.
    pub include_frequency_data: bool,
    /// Include a1/b1/a2/b2 with spectra.
    pub include_directional_moments: bool,
    /// Include sea surface temperature.
    pub include_surface_temp: bool,
    /// Include barometric pressure.
    pub include_barometer: bool,
}

impl HistoryRequest {
    /// Create a request for the wave data of one Spotter.
    pub fn new(spotter_id: impl Into<String>, range: DateRange) -> Self {
        Self {
            spotter_id: spotter_id.into(),
            range,
            limit: None,
            include_waves: true,
            include_wind: false,
            include_track: false,
            include_frequency_data: false,
            include_directional_moments: false,
            include_surface_temp: false,
            include_barometer: false,
        }
    }

    /// Set the page size.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn waves(mut self, include: bool) -> Self {
        self.include_waves = include;
        self
    }

    pub fn wind(mut self, include: bool) -> Self {
        self.include_wind = include;
        self
    }

    pub fn track(mut self, include: bool) -> Self {
        self.include_track = include;
        self
    }

    /// Include spectra along with their directional moments.
    pub fn frequency(mut self, include: bool) -> Self {
        self.include_frequency_data = include;
        self.include_directional_moments = include;
        self
    }

    pub fn surface_temp(mut self, include: bool) -> Self {
        self.include_surface_temp = include;
        self
    }

    pub fn barometer(mut self, include: bool) -> Self {
        self.include_barometer = include;
        self
    }

    /// The same categories and range for another Spotter.
    pub(crate) fn for_spotter(&self, spotter_id: &str) -> Self {
        Self {
            spotter_id: spotter_id.to_string(),
            ..self.clone()
        }
    }
}

/// Query string of one `wave-data` page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WaveDataQuery<'a> {
    spotter_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_date: Option<String>,
    limit: u32,
    include_waves: bool,
    include_wind_data: bool,
    include_track: bool,
    include_frequency_data: bool,
    include_directional_moments: bool,
    include_surface_temp_data: bool,
    include_barometer_data: bool,
}

impl<'a> WaveDataQuery<'a> {
    pub(crate) fn new(
        request: &'a HistoryRequest,
        start: Option<OffsetDateTime>,
        limit: u32,
    ) -> Result<Self, WavefleetError> {
        Ok(Self {
            spotter_id: &request.spotter_id,
            start_date: start.map(format_instant).transpose()?,
            end_date: request.range.end_instant().map(format_instant).transpose()?,
            limit,
            include_waves: request.include_waves,
            include_wind_data: request.include_wind,
            include_track: request.include_track,
            include_frequency_data: request.include_frequency_data,
            include_directional_moments: request.include_directional_moments,
            include_surface_temp_data: request.include_surface_temp,
            include_barometer_data: request.include_barometer,
        })
    }
}

/// Query string of a `sensor-data` request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SensorDataQuery<'a> {
    pub spotter_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

impl<'a> SensorDataQuery<'a> {
    pub(crate) fn new(spotter_id: &'a str, range: &DateRange) -> Result<Self, WavefleetError> {
        Ok(Self {
            spotter_id,
            start_date: range.start_instant().map(format_instant).transpose()?,
            end_date: range.end_instant().map(format_instant).transpose()?,
        })
    }
}

/// Request for the latest data of one Spotter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestDataRequest {
    pub spotter_id: String,
    pub include_wind_data: bool,
    pub include_directional_moments: bool,
    pub include_frequency_data: bool,
    pub include_surface_temp_data: bool,
    pub include_barometer_data: bool,
}

impl LatestDataRequest {
    /// Create a request for the latest waves and track of a Spotter.
    pub fn new(spotter_id: impl Into<String>) -> Self {
        Self {
            spotter_id: spotter_id.into(),
            include_wind_data: false,
            include_directional_moments: false,
            include_frequency_data: false,
            include_surface_temp_data: false,
            include_barometer_data: false,
        }
    }

    pub fn include_wind_data(mut self, include: bool) -> Self {
        self.include_wind_data = include;
        self
    }

    /// Include the latest spectrum along with its directional moments.
    pub fn include_frequency_data(mut self, include: bool) -> Self {
        self.include_frequency_data = include;
        self.include_directional_moments = include;
        self
    }

    pub fn include_surface_temp_data(mut self, include: bool) -> Self {
        self.include_surface_temp_data = include;
        self
    }

    pub fn include_barometer_data(mut self, include: bool) -> Self {
        self.include_barometer_data = include;
        self
    }
}

/// Historical data of one Spotter, as returned by `wave-data`.
///
/// Categories that were not requested come back empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceHistory {
    #[serde(default)]
    pub spotter_id: String,
    #[serde(default)]
    pub spotter_name: Option<String>,
    #[serde(default)]
    pub waves: Vec<WaveReading>,
    #[serde(default)]
    pub wind: Vec<WindReading>,
    #[serde(default)]
    pub track: Vec<TrackReading>,
    #[serde(default)]
    pub frequency_data: FrequencyData,
    #[serde(default)]
    pub surface_temp: Vec<SurfaceTempReading>,
    #[serde(default)]
    pub barometer_data: Vec<BarometerReading>,
}

impl DeviceHistory {
    /// Where the next page starts, if any category filled this one.
    ///
    /// The earliest last-timestamp among full categories, so that no
    /// category skips records.
    pub(crate) fn next_page_start(&self, limit: usize) -> Option<OffsetDateTime> {
        [
            full_page_end(&self.waves, limit),
            full_page_end(&self.wind, limit),
            full_page_end(&self.track, limit),
            full_page_end(self.frequency_data.readings(), limit),
            full_page_end(&self.surface_temp, limit),
            full_page_end(&self.barometer_data, limit),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Append a later page, keeping only records not already held.
    ///
    /// A page starts at the last timestamp of the previous one, so records
    /// sharing that timestamp are compared by value.
    ///
    /// Returns the number of records added.
    pub(crate) fn append_page(&mut self, page: DeviceHistory) -> usize {
        let mut added = append_newer(&mut self.waves, page.waves);
        added += append_newer(&mut self.wind, page.wind);
        added += append_newer(&mut self.track, page.track);
        added += append_newer(&mut self.surface_temp, page.surface_temp);
        added += append_newer(&mut self.barometer_data, page.barometer_data);

        match (&mut self.frequency_data, page.frequency_data) {
            (FrequencyData::Captured(held), FrequencyData::Captured(more)) => {
                added += append_newer(held, more);
            }
            (held @ FrequencyData::NotEnabled, more @ FrequencyData::Captured(_)) => {
                added += more.readings().len();
                *held = more;
            }
            (_, FrequencyData::NotEnabled) => {}
        }
        added
    }

    /// Tag every reading with this history's Spotter id.
    pub(crate) fn tag_readings(&mut self) {
        let id = self.spotter_id.clone();
        tag(&mut self.waves, &id);
        tag(&mut self.wind, &id);
        tag(&mut self.track, &id);
        if let FrequencyData::Captured(readings) = &mut self.frequency_data {
            tag(readings, &id);
        }
        tag(&mut self.surface_temp, &id);
        tag(&mut self.barometer_data, &id);
    }
}

fn full_page_end<R: Reading>(page: &[R], limit: usize) -> Option<OffsetDateTime> {
    if page.len() >= limit {
        page.last().map(Reading::timestamp)
    } else {
        None
    }
}

fn append_newer<R: Reading + PartialEq>(held: &mut Vec<R>, page: Vec<R>) -> usize {
    let Some(last) = held.last().map(Reading::timestamp) else {
        let added = page.len();
        held.extend(page);
        return added;
    };
    // Held records at the boundary timestamp start here.
    let boundary = held
        .iter()
        .rposition(|r| r.timestamp() < last)
        .map_or(0, |i| i + 1);

    let before = held.len();
    for reading in page {
        let timestamp = reading.timestamp();
        let keep = timestamp > last
            || (timestamp == last && !held[boundary..].contains(&reading));
        if keep {
            held.push(reading);
        }
    }
    held.len() - before
}

pub(crate) fn tag<R: Reading>(readings: &mut [R], spotter_id: &str) {
    for reading in readings.iter_mut().filter(|r| r.spotter_id().is_none()) {
        reading.set_spotter_id(spotter_id);
    }
}

/// Latest data of one Spotter, as returned by `latest-data`.
///
/// Always carries the `waves`, `wind`, `track` and `frequencyData` keys;
/// `frequencyData` is `null` when the device does not capture spectra.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestData {
    #[serde(default)]
    pub spotter_id: String,
    #[serde(default)]
    pub spotter_name: Option<String>,
    /// Battery charge in percent.
    #[serde(default)]
    pub battery_power: Option<f64>,
    #[serde(default)]
    pub battery_voltage: Option<f64>,
    #[serde(default)]
    pub solar_voltage: Option<f64>,
    /// Relative humidity inside the hull, in percent.
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub waves: Vec<WaveReading>,
    #[serde(default)]
    pub wind: Vec<WindReading>,
    #[serde(default)]
    pub track: Vec<TrackReading>,
    #[serde(default)]
    pub frequency_data: FrequencyData,
    #[serde(default)]
    pub surface_temp: Vec<SurfaceTempReading>,
    #[serde(default)]
    pub barometer_data: Vec<BarometerReading>,
}

/// Wave records of one or more Spotters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WaveHistory {
    pub waves: Vec<WaveReading>,
}

/// Wind records of one or more Spotters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WindHistory {
    pub wind: Vec<WindReading>,
}

/// Track records of one or more Spotters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackHistory {
    pub track: Vec<TrackReading>,
}

/// Spectra of one or more Spotters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyHistory {
    pub frequency: Vec<FrequencyReading>,
    /// Queried Spotters that are not configured for spectral capture.
    #[serde(default)]
    pub not_enabled: Vec<String>,
}

/// All four data categories of one or more Spotters.
///
/// Serializes to exactly the keys `waves`, `wind`, `track` and `frequency`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AllData {
    pub waves: Vec<WaveReading>,
    pub wind: Vec<WindReading>,
    pub track: Vec<TrackReading>,
    pub frequency: Vec<FrequencyReading>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn track(ts: &str) -> TrackReading {
        serde_json::from_value(json!({ "latitude": 0.0, "longitude": 0.0, "timestamp": ts }))
            .unwrap()
    }

    fn wind(ts: &str, source: f64) -> WindReading {
        serde_json::from_value(json!({ "speed": 5.0, "seasurfaceId": source, "timestamp": ts }))
            .unwrap()
    }

    fn wave(ts: &str) -> WaveReading {
        serde_json::from_value(json!({ "significantWaveHeight": 1.0, "timestamp": ts })).unwrap()
    }

    #[test]
    fn test_next_page_start_uses_earliest_full_category() {
        let history = DeviceHistory {
            waves: vec![wave("2023-05-02T00:00:00Z"), wave("2023-05-02T06:00:00Z")],
            track: vec![track("2023-05-02T00:00:00Z"), track("2023-05-02T03:00:00Z")],
            wind: vec![],
            ..Default::default()
        };

        let next = history.next_page_start(2).unwrap();
        assert_eq!(next, time::macros::datetime!(2023-05-02 3:00 UTC));
        assert!(history.next_page_start(3).is_none());
    }

    #[test]
    fn test_append_page_skips_seen_records() {
        let mut history = DeviceHistory {
            waves: vec![wave("2023-05-02T00:00:00Z"), wave("2023-05-02T06:00:00Z")],
            track: vec![track("2023-05-02T00:00:00Z"), track("2023-05-02T03:00:00Z")],
            ..Default::default()
        };
        let page = DeviceHistory {
            waves: vec![wave("2023-05-02T06:00:00Z")],
            track: vec![track("2023-05-02T03:00:00Z"), track("2023-05-02T04:00:00Z")],
            ..Default::default()
        };

        let added = history.append_page(page);
        assert_eq!(added, 1);
        assert_eq!(history.waves.len(), 2);
        assert_eq!(history.track.len(), 3);
    }

    #[test]
    fn test_append_page_keeps_distinct_records_at_boundary() {
        let boundary = "2023-05-02T03:00:00Z";
        let mut history = DeviceHistory {
            wind: vec![wind("2023-05-02T00:00:00Z", 1.0), wind(boundary, 1.0)],
            ..Default::default()
        };
        let page = DeviceHistory {
            wind: vec![
                wind(boundary, 1.0),
                wind(boundary, 2.0),
                wind("2023-05-02T04:00:00Z", 1.0),
            ],
            ..Default::default()
        };

        let added = history.append_page(page);
        assert_eq!(added, 2);
        let sources: Vec<_> = history.wind.iter().map(|w| w.seasurface_id).collect();
        assert_eq!(sources, vec![Some(1.0), Some(1.0), Some(2.0), Some(1.0)]);
    }

    #[test]
    fn test_append_page_into_empty_category() {
        let mut history = DeviceHistory::default();
        let page = DeviceHistory {
            waves: vec![wave("2023-05-02T00:00:00Z"), wave("2023-05-02T00:00:00Z")],
            ..Default::default()
        };
        assert_eq!(history.append_page(page), 2);
    }

    #[test]
    fn test_all_data_has_four_keys() {
        let value = serde_json::to_value(AllData::default()).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 4);
        for key in ["waves", "wind", "track", "frequency"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn test_latest_data_always_has_category_keys() {
        let latest: LatestData = serde_json::from_value(json!({
            "spotterId": "SPOT-1",
            "waves": [],
            "track": []
        }))
        .unwrap();
        assert!(!latest.frequency_data.is_enabled());

        let value = serde_json::to_value(&latest).unwrap();
        for key in ["waves", "wind", "track", "frequencyData"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert!(value["frequencyData"].is_null());
    }

    #[test]
    fn test_wave_data_query_params() {
        let range = DateRange::new("2023-05-02", "2023-05-10").unwrap();
        let request = HistoryRequest::new("SPOT-1", range).wind(true);
        let query = WaveDataQuery::new(&request, range.start_instant(), 500).unwrap();
        let encoded = serde_urlencoded::to_string(&query).unwrap();

        assert!(encoded.contains("spotterId=SPOT-1"));
        assert!(encoded.contains("startDate=2023-05-02T00%3A00%3A00Z"));
        assert!(encoded.contains("endDate=2023-05-11T00%3A00%3A00Z"));
        assert!(encoded.contains("includeWindData=true"));
        assert!(encoded.contains("includeTrack=false"));
    }
}
