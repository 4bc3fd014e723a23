//! Enrichment data types.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Mobile,
    Tablet,
    Desktop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperatingSystem {
    #[serde(rename = "iOS")]
    Ios,
    Android,
    Windows,
    #[serde(rename = "macOS")]
    MacOs,
    Linux,
    #[serde(rename = "unknown")]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Browser {
    Edge,
    Opera,
    Firefox,
    Chrome,
    Safari,
    #[serde(rename = "unknown")]
    Unknown,
}

/// Device classification derived from environment signals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub class: DeviceClass,
    pub os: OperatingSystem,
    pub agent: Browser,
}

/// Either precise coordinates or, when those are unavailable, the timezone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocationContext {
    Coordinates { lat: f64, lon: f64, accuracy: f64 },
    Timezone { timezone: String },
}

/// Context resolved once and attached to outgoing requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentSnapshot {
    #[serde(rename = "deviceInfo")]
    pub device: DeviceInfo,
    pub location: LocationContext,
}

impl EnrichmentSnapshot {
    /// `(lat, lon, accuracy)` if the geolocation read succeeded.
    pub fn geo(&self) -> Option<(f64, f64, f64)> {
        match &self.location {
            LocationContext::Coordinates { lat, lon, accuracy } => Some((*lat, *lon, *accuracy)),
            LocationContext::Timezone { .. } => None,
        }
    }

    /// Timezone identifier if resolution fell back to it.
    pub fn timezone(&self) -> Option<&str> {
        match &self.location {
            LocationContext::Timezone { timezone } => Some(timezone),
            LocationContext::Coordinates { .. } => None,
        }
    }
}
