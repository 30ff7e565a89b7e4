//! Data endpoints: device listing, history, latest data and sensor data.

mod types;

pub use types::*;
use types::{DeviceList, SensorDataQuery, WaveDataQuery, tag};

use futures_util::{StreamExt, TryStreamExt, stream};
use tracing::debug;

use crate::error::WavefleetError;
use crate::rest::WavefleetRestClient;
use crate::rest::endpoints::{DEVICES, LATEST_DATA, MAX_PAGE_LIMIT, SENSOR_DATA, WAVE_DATA};
use crate::types::{DateRange, FrequencyData, SensorReading};

fn require_spotter_id(spotter_id: &str) -> Result<&str, WavefleetError> {
    let trimmed = spotter_id.trim();
    if trimmed.is_empty() {
        Err(WavefleetError::validation("spotter id must not be empty"))
    } else {
        Ok(trimmed)
    }
}

impl WavefleetRestClient {
    /// List the devices visible to the token.
    ///
    /// Returns the listing given to the builder, if any, without a request.
    pub async fn get_devices(&self) -> Result<Vec<Device>, WavefleetError> {
        if let Some(devices) = self.preset_devices() {
            return Ok(devices.to_vec());
        }
        let list: DeviceList = self.get(DEVICES, &[] as &[(&str, &str)]).await?;
        debug!(count = list.devices.len(), "Fetched device listing");
        Ok(list.devices)
    }

    /// Get the historical data of one Spotter.
    ///
    /// Follows pages until every requested category has been read up to the
    /// end of the range.
    pub async fn get_device_history(
        &self,
        request: &HistoryRequest,
    ) -> Result<DeviceHistory, WavefleetError> {
        require_spotter_id(&request.spotter_id)?;
        let limit = request.limit.unwrap_or(MAX_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT);

        let mut start = request.range.start_instant();
        let query = WaveDataQuery::new(request, start, limit)?;
        let mut history: DeviceHistory = self.get(WAVE_DATA, &query).await?;
        let mut next = history.next_page_start(limit as usize);

        while let Some(page_start) = next {
            if start.is_some_and(|s| page_start <= s) {
                break;
            }
            start = Some(page_start);
            debug!(spotter_id = %request.spotter_id, start = %page_start, "Fetching next page");

            let query = WaveDataQuery::new(request, start, limit)?;
            let page: DeviceHistory = self.get(WAVE_DATA, &query).await?;
            next = page.next_page_start(limit as usize);
            if history.append_page(page) == 0 {
                break;
            }
        }

        if history.spotter_id.is_empty() {
            history.spotter_id = request.spotter_id.clone();
        }
        Ok(history)
    }

    /// Get the latest data of one Spotter.
    pub async fn get_latest_data(
        &self,
        request: &LatestDataRequest,
    ) -> Result<LatestData, WavefleetError> {
        require_spotter_id(&request.spotter_id)?;
        let mut latest: LatestData = self.get(LATEST_DATA, request).await?;
        if latest.spotter_id.is_empty() {
            latest.spotter_id = request.spotter_id.clone();
        }
        Ok(latest)
    }

    /// Get the readings of sensors attached to a Spotter.
    pub async fn get_sensor_data(
        &self,
        spotter_id: &str,
        range: &DateRange,
    ) -> Result<Vec<SensorReading>, WavefleetError> {
        let spotter_id = require_spotter_id(spotter_id)?;
        let query = SensorDataQuery::new(spotter_id, range)?;
        let mut readings: Vec<SensorReading> = self.get(SENSOR_DATA, &query).await?;
        tag(&mut readings, spotter_id);
        Ok(readings)
    }

    /// Get wave data for one Spotter, or all of them when `spotter_id` is `None`.
    pub async fn get_wave_data(
        &self,
        range: &DateRange,
        spotter_id: Option<&str>,
    ) -> Result<WaveHistory, WavefleetError> {
        let template = HistoryRequest::new("", *range);
        let histories = self.collect_histories(&template, spotter_id).await?;
        Ok(WaveHistory {
            waves: histories.into_iter().flat_map(|h| h.waves).collect(),
        })
    }

    /// Get wind data for one Spotter, or all of them when `spotter_id` is `None`.
    pub async fn get_wind_data(
        &self,
        range: &DateRange,
        spotter_id: Option<&str>,
    ) -> Result<WindHistory, WavefleetError> {
        let template = HistoryRequest::new("", *range).waves(false).wind(true);
        let histories = self.collect_histories(&template, spotter_id).await?;
        Ok(WindHistory {
            wind: histories.into_iter().flat_map(|h| h.wind).collect(),
        })
    }

    /// Get track data for one Spotter, or all of them when `spotter_id` is `None`.
    pub async fn get_track_data(
        &self,
        range: &DateRange,
        spotter_id: Option<&str>,
    ) -> Result<TrackHistory, WavefleetError> {
        let template = HistoryRequest::new("", *range).waves(false).track(true);
        let histories = self.collect_histories(&template, spotter_id).await?;
        Ok(TrackHistory {
            track: histories.into_iter().flat_map(|h| h.track).collect(),
        })
    }

    /// Get spectra for one Spotter, or all of them when `spotter_id` is `None`.
    ///
    /// Spotters without spectral capture are listed in
    /// [`FrequencyHistory::not_enabled`] rather than contributing nothing silently.
    pub async fn get_frequency_data(
        &self,
        range: &DateRange,
        spotter_id: Option<&str>,
    ) -> Result<FrequencyHistory, WavefleetError> {
        let template = HistoryRequest::new("", *range).waves(false).frequency(true);
        let histories = self.collect_histories(&template, spotter_id).await?;

        let mut result = FrequencyHistory::default();
        for history in histories {
            match history.frequency_data {
                FrequencyData::Captured(readings) => result.frequency.extend(readings),
                FrequencyData::NotEnabled => result.not_enabled.push(history.spotter_id),
            }
        }
        Ok(result)
    }

    /// Get waves, wind, track and spectra in one call.
    pub async fn get_all_data(
        &self,
        range: &DateRange,
        spotter_id: Option<&str>,
    ) -> Result<AllData, WavefleetError> {
        let template = HistoryRequest::new("", *range)
            .wind(true)
            .track(true)
            .frequency(true);
        let histories = self.collect_histories(&template, spotter_id).await?;

        let mut all = AllData::default();
        for history in histories {
            all.waves.extend(history.waves);
            all.wind.extend(history.wind);
            all.track.extend(history.track);
            all.frequency.extend(history.frequency_data.into_readings());
        }
        Ok(all)
    }

    /// Fetch `template` for one Spotter or for every listed one, in listing order.
    async fn collect_histories(
        &self,
        template: &HistoryRequest,
        spotter_id: Option<&str>,
    ) -> Result<Vec<DeviceHistory>, WavefleetError> {
        let ids: Vec<String> = match spotter_id {
            Some(id) => vec![require_spotter_id(id)?.to_string()],
            None => self
                .get_devices()
                .await?
                .into_iter()
                .map(|d| d.spotter_id)
                .collect(),
        };

        debug!(spotters = ids.len(), "Collecting device histories");

        stream::iter(ids)
            .map(|id| {
                let request = template.for_spotter(&id);
                async move {
                    let mut history = self.get_device_history(&request).await?;
                    history.tag_readings();
                    Ok::<_, WavefleetError>(history)
                }
            })
            .buffered(self.max_concurrency())
            .try_collect()
            .await
    }
}
