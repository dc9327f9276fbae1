//! Application-shell session state.
//!
//! Holds the resolved location, unit preference, forecast bundle and an
//! explicit readiness state, mutated only through defined transitions. Each
//! location change spawns one cancellable fetch task; a superseded task is
//! aborted, and an epoch guard keeps a stale response from ever updating
//! displayed data even if it slips past the abort.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::helpers::Units;
use crate::services::openweather::{ForecastBundle, ForecastProvider};

/// Explicit readiness state for the forecast view.
///
/// Data is displayable only in `Ready`, which requires both a resolved
/// location and a fetched bundle. Upstream failure is `Failed`, not a
/// perpetual `Loading`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Readiness {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
}

/// A resolved location driving the session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionLocation {
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Default)]
struct SessionState {
    location: Option<SessionLocation>,
    units: Units,
    readiness: Readiness,
    bundle: Option<ForecastBundle>,
    /// Incremented on every location change; fetch results apply only when
    /// their epoch still matches.
    epoch: u64,
}

/// Session shell: location / units / readiness, with one cancellable
/// in-flight fetch at a time.
pub struct Session {
    state: Arc<Mutex<SessionState>>,
    provider: Arc<dyn ForecastProvider>,
    inflight: Mutex<Option<JoinHandle<()>>>,
}

impl Session {
    pub fn new(provider: Arc<dyn ForecastProvider>) -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState::default())),
            provider,
            inflight: Mutex::new(None),
        }
    }

    /// Replace the session location and start fetching its bundle.
    ///
    /// The previous in-flight fetch (if any) is aborted; its result could no
    /// longer apply anyway because the epoch has moved on.
    pub async fn set_location(&self, location: SessionLocation) {
        let epoch = {
            let mut state = self.state.lock().await;
            state.epoch += 1;
            state.location = Some(location.clone());
            state.bundle = None;
            state.readiness = Readiness::Loading;
            state.epoch
        };

        if let Some(superseded) = self.inflight.lock().await.take() {
            superseded.abort();
        }

        let state = Arc::clone(&self.state);
        let provider = Arc::clone(&self.provider);
        let handle = tokio::spawn(async move {
            let result = provider.fetch(location.latitude, location.longitude).await;
            let mut state = state.lock().await;
            if state.epoch != epoch {
                // Superseded while in flight; drop the stale result.
                return;
            }
            match result {
                Ok(bundle) => {
                    state.bundle = Some(bundle);
                    state.readiness = Readiness::Ready;
                }
                Err(e) => {
                    tracing::warn!("Forecast fetch failed: {}", e);
                    state.readiness = Readiness::Failed;
                }
            }
        });

        *self.inflight.lock().await = Some(handle);
    }

    /// Change the unit preference. Re-render only: the bundle, location and
    /// readiness are untouched and no fetch is started.
    pub async fn set_units(&self, units: Units) {
        self.state.lock().await.units = units;
    }

    pub async fn readiness(&self) -> Readiness {
        self.state.lock().await.readiness
    }

    pub async fn units(&self) -> Units {
        self.state.lock().await.units
    }

    pub async fn location(&self) -> Option<SessionLocation> {
        self.state.lock().await.location.clone()
    }

    pub async fn bundle(&self) -> Option<ForecastBundle> {
        self.state.lock().await.bundle.clone()
    }

    /// Wait for the current in-flight fetch (if any) to finish or be aborted.
    pub async fn settled(&self) {
        let handle = self.inflight.lock().await.take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use crate::services::openweather::sample_bundle;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Scripted provider: latency keyed by latitude, call counting, and an
    /// optional permanent failure mode.
    struct ScriptedProvider {
        calls: AtomicUsize,
        slow_lat: f64,
        fail: bool,
    }

    impl ScriptedProvider {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                slow_lat: f64::NAN,
                fail: false,
            }
        }

        fn slow_for(mut self, lat: f64) -> Self {
            self.slow_lat = lat;
            self
        }

        fn failing(mut self) -> Self {
            self.fail = true;
            self
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ForecastProvider for ScriptedProvider {
        async fn fetch(&self, lat: f64, lon: f64) -> Result<ForecastBundle, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if lat == self.slow_lat {
                tokio::time::sleep(Duration::from_millis(500)).await;
            } else {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            if self.fail {
                return Err(AppError::Upstream("provider down".to_string()));
            }
            let mut bundle = sample_bundle();
            bundle.lat = lat;
            bundle.lon = lon;
            Ok(bundle)
        }
    }

    fn location(name: &str, lat: f64) -> SessionLocation {
        SessionLocation {
            address: name.to_string(),
            latitude: lat,
            longitude: 0.0,
        }
    }

    #[tokio::test]
    async fn test_starts_idle() {
        let session = Session::new(Arc::new(ScriptedProvider::new()));
        assert_eq!(session.readiness().await, Readiness::Idle);
        assert!(session.bundle().await.is_none());
    }

    #[tokio::test]
    async fn test_fetch_completes_to_ready() {
        let provider = Arc::new(ScriptedProvider::new());
        let session = Session::new(provider.clone());

        session.set_location(location("Oslo", 59.9)).await;
        assert_eq!(session.readiness().await, Readiness::Loading);

        session.settled().await;
        assert_eq!(session.readiness().await, Readiness::Ready);
        assert_eq!(session.bundle().await.unwrap().lat, 59.9);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_unit_toggle_does_not_refetch() {
        let provider = Arc::new(ScriptedProvider::new());
        let session = Session::new(provider.clone());

        session.set_location(location("Oslo", 59.9)).await;
        session.settled().await;
        assert_eq!(provider.call_count(), 1);

        session.set_units(Units::Imperial).await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(provider.call_count(), 1);
        assert_eq!(session.units().await, Units::Imperial);
        assert_eq!(session.readiness().await, Readiness::Ready);
        assert!(session.bundle().await.is_some());
    }

    #[tokio::test]
    async fn test_superseding_location_discards_stale_fetch() {
        let provider = Arc::new(ScriptedProvider::new().slow_for(1.0));
        let session = Session::new(provider.clone());

        session.set_location(location("Slowtown", 1.0)).await;
        session.set_location(location("Fastville", 2.0)).await;
        session.settled().await;

        // Give the aborted first fetch time to have resolved, had it survived.
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(session.readiness().await, Readiness::Ready);
        let bundle = session.bundle().await.unwrap();
        assert_eq!(bundle.lat, 2.0);
        assert_eq!(session.location().await.unwrap().address, "Fastville");
    }

    #[tokio::test]
    async fn test_upstream_failure_is_failed_not_loading() {
        let session = Session::new(Arc::new(ScriptedProvider::new().failing()));

        session.set_location(location("Oslo", 59.9)).await;
        session.settled().await;

        assert_eq!(session.readiness().await, Readiness::Failed);
        assert!(session.bundle().await.is_none());
    }

    #[tokio::test]
    async fn test_new_location_resets_bundle_and_loads() {
        let provider = Arc::new(ScriptedProvider::new());
        let session = Session::new(provider.clone());

        session.set_location(location("Oslo", 59.9)).await;
        session.settled().await;

        session.set_location(location("Bergen", 60.4)).await;
        assert_eq!(session.readiness().await, Readiness::Loading);
        assert!(session.bundle().await.is_none());

        session.settled().await;
        assert_eq!(session.bundle().await.unwrap().lat, 60.4);
        assert_eq!(provider.call_count(), 2);
    }
}
