//! Display route a paired tablet navigates to.

use crate::registry::DeviceConfig;
use url::Url;

/// `/tablet/{room}/{secretUrl}` for one activated device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRoute {
    pub room: String,
    pub secret_url: String,
}

impl DisplayRoute {
    /// Resolve the route against the display base URL. Each value becomes a
    /// single percent-encoded path segment.
    pub fn to_url(&self, base: &Url) -> Url {
        let mut url = base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push("tablet")
                .push(&self.room)
                .push(&self.secret_url);
        }
        url
    }
}

impl From<&DeviceConfig> for DisplayRoute {
    fn from(config: &DeviceConfig) -> Self {
        Self {
            room: config.room.clone(),
            secret_url: config.secret_url.clone(),
        }
    }
}

impl std::fmt::Display for DisplayRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tablet/{}/{}", self.room, self.secret_url)
    }
}
