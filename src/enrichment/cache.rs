//! Process-wide enrichment cache.
//!
//! The first `resolve` runs the geolocation read (bounded by
//! `GeoOptions::timeout`) and falls back to the timezone on denial, absence or
//! timeout. Concurrent first callers await the same in-flight resolution, and
//! every later caller gets the memoized snapshot without touching either source.

use super::device::classify_user_agent;
use super::provider::{
    EnvironmentProbe, GeoOptions, GeolocationProvider, SystemProbe, UnavailableGeolocation,
};
use super::snapshot::{EnrichmentSnapshot, LocationContext};
use crate::defaults;
use std::sync::{Arc, OnceLock};
use tokio::sync::OnceCell;

static GLOBAL_CACHE: OnceLock<Arc<EnrichmentCache>> = OnceLock::new();

pub struct EnrichmentCache {
    probe: Arc<dyn EnvironmentProbe>,
    geolocation: Arc<dyn GeolocationProvider>,
    options: GeoOptions,
    snapshot: OnceCell<Arc<EnrichmentSnapshot>>,
}

impl std::fmt::Debug for EnrichmentCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnrichmentCache")
            .field("options", &self.options)
            .field("resolved", &self.snapshot.initialized())
            .finish()
    }
}

impl EnrichmentCache {
    pub fn new(
        probe: Arc<dyn EnvironmentProbe>,
        geolocation: Arc<dyn GeolocationProvider>,
    ) -> Self {
        Self {
            probe,
            geolocation,
            options: GeoOptions::default(),
            snapshot: OnceCell::new(),
        }
    }

    pub fn with_options(mut self, options: GeoOptions) -> Self {
        self.options = options;
        self
    }

    /// Shared cache for the whole process.
    ///
    /// Uses [`SystemProbe`] and no geolocation unless [`Self::install_global`]
    /// ran first.
    pub fn global() -> Arc<Self> {
        GLOBAL_CACHE
            .get_or_init(|| {
                Arc::new(Self::new(
                    Arc::new(SystemProbe),
                    Arc::new(UnavailableGeolocation),
                ))
            })
            .clone()
    }

    /// Install the process-wide cache. Returns the rejected cache if one was
    /// already installed or created by [`Self::global`].
    pub fn install_global(cache: Arc<Self>) -> Result<(), Arc<Self>> {
        GLOBAL_CACHE.set(cache)
    }

    /// Resolve the snapshot, at most once for the lifetime of this cache.
    pub async fn resolve(&self) -> Arc<EnrichmentSnapshot> {
        self.snapshot
            .get_or_init(|| self.resolve_uncached())
            .await
            .clone()
    }

    /// The snapshot if resolution already completed.
    pub fn peek(&self) -> Option<Arc<EnrichmentSnapshot>> {
        self.snapshot.get().cloned()
    }

    async fn resolve_uncached(&self) -> Arc<EnrichmentSnapshot> {
        let device = classify_user_agent(&self.probe.user_agent());

        let lookup = self.geolocation.current_position(&self.options);
        let location = match tokio::time::timeout(self.options.timeout, lookup).await {
            Ok(Ok(position)) => {
                tracing::debug!(target: "nudge_client::enrichment", accuracy = position.coords.accuracy, "geolocation resolved");
                LocationContext::Coordinates {
                    lat: position.coords.latitude,
                    lon: position.coords.longitude,
                    accuracy: position.coords.accuracy,
                }
            }
            Ok(Err(e)) => {
                tracing::debug!(target: "nudge_client::enrichment", reason = %e, "geolocation failed, using timezone");
                self.timezone_fallback()
            }
            Err(_) => {
                tracing::debug!(target: "nudge_client::enrichment", timeout_ms = self.options.timeout.as_millis() as u64, "geolocation timed out, using timezone");
                self.timezone_fallback()
            }
        };

        Arc::new(EnrichmentSnapshot { device, location })
    }

    fn timezone_fallback(&self) -> LocationContext {
        LocationContext::Timezone {
            timezone: self
                .probe
                .timezone()
                .unwrap_or_else(|| defaults::enrichment::TIMEZONE.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::provider::{Coordinates, GeoError, GeoPosition};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct FixedProbe {
        timezone: Option<&'static str>,
        ua_reads: AtomicUsize,
    }

    impl FixedProbe {
        fn new(timezone: Option<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                timezone,
                ua_reads: AtomicUsize::new(0),
            })
        }
    }

    impl EnvironmentProbe for FixedProbe {
        fn user_agent(&self) -> String {
            self.ua_reads.fetch_add(1, Ordering::SeqCst);
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_0) AppleWebKit/605.1.15 Version/17.0 Safari/605.1.15".into()
        }

        fn timezone(&self) -> Option<String> {
            self.timezone.map(str::to_string)
        }
    }

    enum Behaviour {
        Grant,
        Deny,
        Hang,
    }

    struct ScriptedGeo {
        behaviour: Behaviour,
        prompts: AtomicUsize,
    }

    impl ScriptedGeo {
        fn new(behaviour: Behaviour) -> Arc<Self> {
            Arc::new(Self {
                behaviour,
                prompts: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl GeolocationProvider for ScriptedGeo {
        async fn current_position(&self, _options: &GeoOptions) -> Result<GeoPosition, GeoError> {
            self.prompts.fetch_add(1, Ordering::SeqCst);
            // Suspend so concurrent callers overlap with this resolution.
            tokio::time::sleep(Duration::from_millis(10)).await;
            match self.behaviour {
                Behaviour::Grant => Ok(GeoPosition {
                    coords: Coordinates {
                        latitude: 51.5,
                        longitude: -0.12,
                        accuracy: 20.0,
                    },
                }),
                Behaviour::Deny => Err(GeoError::PermissionDenied),
                Behaviour::Hang => std::future::pending().await,
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn granted_position_is_cached() {
        let geo = ScriptedGeo::new(Behaviour::Grant);
        let cache = EnrichmentCache::new(FixedProbe::new(Some("Europe/London")), geo.clone());

        let first = cache.resolve().await;
        let second = cache.resolve().await;

        assert_eq!(first.geo(), Some((51.5, -0.12, 20.0)));
        assert!(first.timezone().is_none());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(geo.prompts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn denial_degrades_to_timezone() {
        let cache = EnrichmentCache::new(
            FixedProbe::new(Some("America/Chicago")),
            ScriptedGeo::new(Behaviour::Deny),
        );
        let snapshot = cache.resolve().await;
        assert_eq!(snapshot.timezone(), Some("America/Chicago"));
        assert_eq!(snapshot.device.os, crate::enrichment::OperatingSystem::MacOs);
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_lookup_times_out_to_default_timezone() {
        let geo = ScriptedGeo::new(Behaviour::Hang);
        let cache = EnrichmentCache::new(FixedProbe::new(None), geo.clone())
            .with_options(GeoOptions::default().with_timeout(Duration::from_secs(5)));

        let snapshot = cache.resolve().await;
        assert_eq!(snapshot.timezone(), Some("UTC"));

        cache.resolve().await;
        assert_eq!(geo.prompts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_first_calls_are_coalesced() {
        let probe = FixedProbe::new(Some("Asia/Tokyo"));
        let geo = ScriptedGeo::new(Behaviour::Deny);
        let cache = EnrichmentCache::new(probe.clone(), geo.clone());

        assert!(cache.peek().is_none());
        let (a, b) = tokio::join!(cache.resolve(), cache.resolve());

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(geo.prompts.load(Ordering::SeqCst), 1);
        assert_eq!(probe.ua_reads.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&cache.peek().unwrap(), &a));
    }

    #[test]
    fn global_is_shared() {
        assert!(Arc::ptr_eq(
            &EnrichmentCache::global(),
            &EnrichmentCache::global()
        ));
    }
}
