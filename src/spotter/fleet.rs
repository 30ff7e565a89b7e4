//! Refreshing every Spotter visible to a token.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::error::WavefleetError;
use crate::rest::WavefleetClient;
use crate::spotter::Spotter;

/// Outcome of [`get_and_update_spotters`].
#[derive(Debug)]
pub struct FleetRefresh {
    /// One Spotter per listed device, in listing order.
    ///
    /// Spotters whose refresh failed carry only their listing data.
    pub spotters: Vec<Spotter>,
    /// Devices whose refresh failed.
    pub failures: Vec<RefreshFailure>,
}

impl FleetRefresh {
    /// Whether every Spotter was refreshed.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Ids of the Spotters, in listing order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.spotters.iter().map(|s| s.id.as_str())
    }
}

/// A Spotter that could not be refreshed.
#[derive(Debug)]
pub struct RefreshFailure {
    /// Id of the Spotter whose refresh failed.
    pub spotter_id: String,
    /// Why it failed; [`WavefleetError::Worker`] if its task panicked.
    pub error: WavefleetError,
}

/// List the devices visible to `api` and refresh each with its latest data.
///
/// Refreshes run on separate tasks, at most `processes` at a time (`0` is
/// treated as `1`). A failed refresh is reported in
/// [`FleetRefresh::failures`] and does not affect the other devices. Only a
/// failure to list the devices fails the whole call.
pub async fn get_and_update_spotters<C>(
    api: Arc<C>,
    processes: usize,
) -> Result<FleetRefresh, WavefleetError>
where
    C: WavefleetClient + 'static,
{
    let devices = api.get_devices().await?;
    let workers = processes.max(1);
    info!(devices = devices.len(), workers, "Refreshing spotters");

    let permits = Arc::new(Semaphore::new(workers));
    let tasks: Vec<_> = devices
        .into_iter()
        .map(|device| {
            let api = Arc::clone(&api);
            let permits = Arc::clone(&permits);
            let fallback = Spotter::from_device(device.clone());
            let handle = tokio::spawn(async move {
                let _permit = permits.acquire_owned().await;
                let mut spotter = Spotter::from_device(device);
                let result = spotter.update(api.as_ref()).await;
                (spotter, result.err())
            });
            (fallback, handle)
        })
        .collect();

    let mut refresh = FleetRefresh {
        spotters: Vec::with_capacity(tasks.len()),
        failures: Vec::new(),
    };

    for (fallback, handle) in tasks {
        match handle.await {
            Ok((spotter, None)) => refresh.spotters.push(spotter),
            Ok((spotter, Some(error))) => {
                warn!(spotter_id = %spotter.id, %error, "Spotter refresh failed");
                refresh.failures.push(RefreshFailure {
                    spotter_id: spotter.id.clone(),
                    error,
                });
                refresh.spotters.push(spotter);
            }
            Err(join_error) => {
                warn!(spotter_id = %fallback.id, error = %join_error, "Spotter refresh task died");
                refresh.failures.push(RefreshFailure {
                    spotter_id: fallback.id.clone(),
                    error: WavefleetError::Worker(join_error.to_string()),
                });
                refresh.spotters.push(fallback);
            }
        }
    }

    info!(
        refreshed = refresh.spotters.len() - refresh.failures.len(),
        failed = refresh.failures.len(),
        "Spotter refresh finished"
    );
    Ok(refresh)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::error::ApiError;
    use crate::rest::{
        AllData, Device, DeviceHistory, FrequencyHistory, HistoryRequest, LatestData,
        LatestDataRequest, TrackHistory, WaveHistory, WindHistory,
    };
    use crate::types::{DateRange, SensorReading};

    /// In-memory fleet; later devices answer sooner to scramble completion order.
    #[derive(Default)]
    struct MockFleet {
        ids: Vec<&'static str>,
        failing: HashSet<&'static str>,
        panicking: HashSet<&'static str>,
        running: AtomicUsize,
        peak: AtomicUsize,
    }

    impl MockFleet {
        fn new(ids: &[&'static str]) -> Self {
            Self {
                ids: ids.to_vec(),
                ..Self::default()
            }
        }
    }

    fn unsupported<T>() -> Result<T, WavefleetError> {
        Err(WavefleetError::validation("not supported by MockFleet"))
    }

    impl WavefleetClient for MockFleet {
        async fn get_devices(&self) -> Result<Vec<Device>, WavefleetError> {
            Ok(self.ids.iter().map(|id| Device::new(*id)).collect())
        }

        async fn get_device_history(
            &self,
            _request: &HistoryRequest,
        ) -> Result<DeviceHistory, WavefleetError> {
            unsupported()
        }

        async fn get_latest_data(
            &self,
            request: &LatestDataRequest,
        ) -> Result<LatestData, WavefleetError> {
            let id = request.spotter_id.as_str();
            let position = self.ids.iter().position(|i| *i == id).unwrap_or(0);

            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            let delay = (self.ids.len() - position) as u64 * 5;
            tokio::time::sleep(Duration::from_millis(delay)).await;
            self.running.fetch_sub(1, Ordering::SeqCst);

            if self.panicking.contains(id) {
                panic!("worker crashed for {id}");
            }
            if self.failing.contains(id) {
                return Err(WavefleetError::Api(ApiError::new(404, "Spotter not found")));
            }
            Ok(LatestData {
                spotter_id: id.to_string(),
                spotter_name: Some(format!("name-{id}")),
                battery_power: Some(90.0),
                ..LatestData::default()
            })
        }

        async fn get_sensor_data(
            &self,
            _spotter_id: &str,
            _range: &DateRange,
        ) -> Result<Vec<SensorReading>, WavefleetError> {
            unsupported()
        }

        async fn get_wave_data(
            &self,
            _range: &DateRange,
            _spotter_id: Option<&str>,
        ) -> Result<WaveHistory, WavefleetError> {
            unsupported()
        }

        async fn get_wind_data(
            &self,
            _range: &DateRange,
            _spotter_id: Option<&str>,
        ) -> Result<WindHistory, WavefleetError> {
            unsupported()
        }

        async fn get_track_data(
            &self,
            _range: &DateRange,
            _spotter_id: Option<&str>,
        ) -> Result<TrackHistory, WavefleetError> {
            unsupported()
        }

        async fn get_frequency_data(
            &self,
            _range: &DateRange,
            _spotter_id: Option<&str>,
        ) -> Result<FrequencyHistory, WavefleetError> {
            unsupported()
        }

        async fn get_all_data(
            &self,
            _range: &DateRange,
            _spotter_id: Option<&str>,
        ) -> Result<AllData, WavefleetError> {
            unsupported()
        }
    }

    #[tokio::test]
    async fn test_refresh_keeps_listing_order() {
        let ids = ["SPOT-A", "SPOT-B", "SPOT-C", "SPOT-D"];
        let api = Arc::new(MockFleet::new(&ids));

        let refresh = get_and_update_spotters(api, 2).await.unwrap();

        assert!(refresh.is_complete());
        assert_eq!(refresh.ids().collect::<Vec<_>>(), ids);
        for spotter in &refresh.spotters {
            assert_eq!(spotter.name, Some(format!("name-{}", spotter.id)));
            assert!(spotter.last_refreshed.is_some());
        }
    }

    #[tokio::test]
    async fn test_refresh_bounded_by_processes() {
        let ids = ["SPOT-A", "SPOT-B", "SPOT-C", "SPOT-D", "SPOT-E"];
        let api = Arc::new(MockFleet::new(&ids));

        get_and_update_spotters(Arc::clone(&api), 2).await.unwrap();
        assert!(api.peak.load(Ordering::SeqCst) <= 2);

        let api = Arc::new(MockFleet::new(&ids));
        get_and_update_spotters(Arc::clone(&api), 0).await.unwrap();
        assert_eq!(api.peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refresh_isolates_failures() {
        let mut fleet = MockFleet::new(&["SPOT-A", "SPOT-B", "SPOT-C"]);
        fleet.failing.insert("SPOT-B");
        let api = Arc::new(fleet);

        let refresh = get_and_update_spotters(api, 3).await.unwrap();

        assert_eq!(refresh.spotters.len(), 3);
        assert_eq!(refresh.failures.len(), 1);
        assert_eq!(refresh.failures[0].spotter_id, "SPOT-B");
        assert_eq!(refresh.failures[0].error.status(), Some(404));
        assert!(refresh.spotters[1].last_refreshed.is_none());
        assert!(refresh.spotters[0].last_refreshed.is_some());
        assert!(refresh.spotters[2].last_refreshed.is_some());
    }

    #[tokio::test]
    async fn test_refresh_reports_crashed_worker() {
        let mut fleet = MockFleet::new(&["SPOT-A", "SPOT-B"]);
        fleet.panicking.insert("SPOT-A");
        let api = Arc::new(fleet);

        let refresh = get_and_update_spotters(api, 2).await.unwrap();

        assert_eq!(refresh.ids().collect::<Vec<_>>(), ["SPOT-A", "SPOT-B"]);
        assert_eq!(refresh.failures.len(), 1);
        assert!(matches!(refresh.failures[0].error, WavefleetError::Worker(_)));
        assert!(refresh.spotters[1].last_refreshed.is_some());
    }

    #[tokio::test]
    async fn test_refresh_empty_fleet() {
        let api = Arc::new(MockFleet::new(&[]));
        let refresh = get_and_update_spotters(api, 4).await.unwrap();
        assert!(refresh.spotters.is_empty());
        assert!(refresh.is_complete());
    }
}
