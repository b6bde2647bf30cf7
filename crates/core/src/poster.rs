//! The poster generation request.
//!
//! Field names follow the public API's camelCase convention. Optional
//! location fields are cross-validated: a request must carry either a
//! coordinate pair or a city name, and a country in both cases.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

fn default_theme() -> String {
    "feature_based".to_string()
}

fn default_distance() -> u32 {
    29_000
}

fn default_orientation() -> String {
    "vertical".to_string()
}

fn default_title_pos() -> String {
    "bottom-center".to_string()
}

/// Configuration for one rendering job, immutable once the job is
/// created.
///
/// The worker treats most of these as opaque strings; no theme or
/// orientation whitelist is enforced here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PosterConfig {
    /// City to center the map on. Required unless `coords` is given.
    #[serde(default)]
    pub city: Option<String>,

    /// Country the city or coordinates belong to. Always required.
    #[serde(default)]
    pub country: Option<String>,

    /// Rendering theme name.
    #[serde(default = "default_theme")]
    pub theme: String,

    /// Map radius in meters.
    #[serde(default = "default_distance")]
    pub distance: u32,

    /// Page orientation, `vertical` or `horizontal`.
    #[serde(default = "default_orientation")]
    pub orientation: String,

    /// Explicit `lat,lng` center, overriding city geocoding.
    #[serde(default)]
    pub coords: Option<String>,

    /// Custom title printed on the poster.
    #[serde(default)]
    pub title: Option<String>,

    /// Title placement on the page.
    #[serde(default = "default_title_pos")]
    pub title_pos: String,

    /// Draw borders around the full page rather than the map area.
    #[serde(default)]
    pub full_borders: bool,
}

impl PosterConfig {
    /// Check that the request names a renderable location.
    ///
    /// With `coords` present only `country` is additionally required;
    /// otherwise both `city` and `country` must be present. Runs before
    /// any job is created, so a failure here never leaves state behind.
    pub fn validate(&self) -> Result<(), CoreError> {
        let has = |field: &Option<String>| field.as_deref().is_some_and(|s| !s.trim().is_empty());

        if has(&self.coords) {
            if !has(&self.country) {
                return Err(CoreError::Validation(
                    "country is required when using coords".to_string(),
                ));
            }
        } else if !has(&self.city) || !has(&self.country) {
            return Err(CoreError::Validation(
                "city and country are required".to_string(),
            ));
        }

        Ok(())
    }
}
