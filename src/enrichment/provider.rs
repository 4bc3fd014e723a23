//! Injected capabilities: environment signals and geolocation.

use crate::defaults;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Synchronous environment signals.
pub trait EnvironmentProbe: Send + Sync {
    fn user_agent(&self) -> String;

    /// IANA timezone identifier, if the environment reports one.
    fn timezone(&self) -> Option<String>;
}

/// Reads signals from process environment variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProbe;

impl EnvironmentProbe for SystemProbe {
    fn user_agent(&self) -> String {
        std::env::var(defaults::enrichment::USER_AGENT_ENV)
            .unwrap_or_else(|_| defaults::http::USER_AGENT.to_string())
    }

    fn timezone(&self) -> Option<String> {
        std::env::var(defaults::enrichment::TIMEZONE_ENV)
            .ok()
            .map(|tz| tz.trim_start_matches(':').to_string())
            .filter(|tz| !tz.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
    /// Radius of uncertainty in meters.
    pub accuracy: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPosition {
    pub coords: Coordinates,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeoError {
    #[error("geolocation permission denied")]
    PermissionDenied,
    #[error("geolocation unavailable: {0}")]
    Unavailable(String),
    #[error("geolocation timed out")]
    Timeout,
}

/// Options handed to the geolocation provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoOptions {
    pub timeout: Duration,
    /// A previously obtained position younger than this may be reused
    /// instead of prompting again.
    pub maximum_age: Duration,
    pub high_accuracy: bool,
}

impl Default for GeoOptions {
    fn default() -> Self {
        Self {
            timeout: defaults::enrichment::GEO_TIMEOUT,
            maximum_age: defaults::enrichment::GEO_MAXIMUM_AGE,
            high_accuracy: false,
        }
    }
}

impl GeoOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_maximum_age(mut self, maximum_age: Duration) -> Self {
        self.maximum_age = maximum_age;
        self
    }

    pub fn with_high_accuracy(mut self, high_accuracy: bool) -> Self {
        self.high_accuracy = high_accuracy;
        self
    }
}

/// Permission-gated position lookup.
#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    async fn current_position(&self, options: &GeoOptions) -> Result<GeoPosition, GeoError>;
}

/// Provider for environments without geolocation support.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableGeolocation;

#[async_trait]
impl GeolocationProvider for UnavailableGeolocation {
    async fn current_position(&self, _options: &GeoOptions) -> Result<GeoPosition, GeoError> {
        Err(GeoError::Unavailable("no geolocation provider".into()))
    }
}
