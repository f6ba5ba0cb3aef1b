use crate::{detection::Thresholds, site::Site};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters of a [`CloudDetector`](crate::detection::CloudDetector).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DetectorConfig {
    pub site: Site,
    pub thresholds: Thresholds,
}

#[cfg(feature = "loader")]
impl DetectorConfig {
    /// Parses a config from JSON. Missing fields take their defaults.
    ///
    /// ```json
    /// {
    ///   "site": { "latitude": 37.424107, "longitude": -122.174199, "meridian": -120.0 },
    ///   "thresholds": { "difference": 0.2 }
    /// }
    /// ```
    pub fn from_json(json: &str) -> Result<Self, crate::error::Error> {
        let config: Self = serde_json::from_str(json)?;
        config.site.validate()?;
        Ok(config)
    }

    /// Reads a JSON config file.
    pub fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self, crate::error::Error> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }
}
