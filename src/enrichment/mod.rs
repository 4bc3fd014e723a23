//! Request Enrichment
//!
//! Device, locale and (when permitted) location context attached to outgoing
//! requests. Resolution happens at most once per [`EnrichmentCache`]; the
//! environment and geolocation sources are injected so the logic runs the
//! same under tests as in an embedding application.

pub mod cache;
pub mod device;
pub mod provider;
pub mod snapshot;

pub use cache::EnrichmentCache;
pub use device::classify_user_agent;
pub use provider::{
    Coordinates, EnvironmentProbe, GeoError, GeoOptions, GeoPosition, GeolocationProvider,
    SystemProbe, UnavailableGeolocation,
};
pub use snapshot::{
    Browser, DeviceClass, DeviceInfo, EnrichmentSnapshot, LocationContext, OperatingSystem,
};
