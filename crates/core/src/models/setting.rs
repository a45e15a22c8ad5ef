//! Key/value settings.

use serde::{Deserialize, Serialize};

use crate::media::resolve_image_url;
use crate::validation::optional_text;

/// Setting key holding the home page banner image.
pub const HOME_HERO_KEY: &str = "home_hero_image";

/// The home page banner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeHero {
    /// Stored reference, as uploaded.
    pub image_path: Option<String>,
    /// `image_path` resolved against the public base URL.
    pub image_url: Option<String>,
}

impl HomeHero {
    /// Build from the stored setting value.
    #[must_use]
    pub fn from_stored(value: Option<String>, public_base_url: Option<&str>) -> Self {
        let image_path = optional_text(value);
        let image_url = image_path
            .as_deref()
            .map(|path| resolve_image_url(public_base_url, path));
        Self {
            image_path,
            image_url,
        }
    }
}

/// Body of `PUT /api/settings/home-hero`. A blank or missing path clears the
/// banner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeHeroDraft {
    #[serde(alias = "imageUrl", alias = "image")]
    pub image_path: Option<String>,
}

impl HomeHeroDraft {
    /// The value to store, or `None` to clear.
    #[must_use]
    pub fn into_value(self) -> Option<String> {
        optional_text(self.image_path)
    }
}
