//! Default Configuration Values
//!
//! Centralizes the default values used throughout the crate so they are
//! easy to find and adjust.

use std::time::Duration;

/// HTTP client defaults
pub mod http {
    use super::*;

    /// Default request timeout for HTTP requests.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Default connection timeout for establishing HTTP connections.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Default User-Agent string for HTTP requests.
    pub const USER_AGENT: &str = concat!("nudge-client/", env!("CARGO_PKG_VERSION"));
}

/// User-facing message defaults
pub mod messages {
    /// Shown when a failure carries no usable message at all.
    pub const FALLBACK_ERROR_MESSAGE: &str = "An unexpected error occurred";

    /// Display-time annotation for a chat message that failed to send.
    pub const FAILURE_SUFFIX: &str = " (Failed to send)";
}

/// Chat surface defaults
pub mod chat {
    use super::*;

    /// Endpoint the chat ledger posts messages to.
    pub const ENDPOINT: &str = "/api/nudge";

    /// How long a failure notice stays visible.
    pub const NOTICE_TTL: Duration = Duration::from_secs(5);
}

/// Enrichment defaults
pub mod enrichment {
    use super::*;

    /// Upper bound on a single geolocation read.
    pub const GEO_TIMEOUT: Duration = Duration::from_secs(5);

    /// A cached position younger than this is accepted without a new prompt.
    pub const GEO_MAXIMUM_AGE: Duration = Duration::from_secs(10 * 60);

    /// Timezone reported when the environment offers none.
    pub const TIMEZONE: &str = "UTC";

    /// Environment variable consulted for the user-agent string.
    pub const USER_AGENT_ENV: &str = "NUDGE_USER_AGENT";

    /// Environment variable consulted for the timezone identifier.
    pub const TIMEZONE_ENV: &str = "TZ";
}
