use serde::{Deserialize, Serialize};

/// Preview card returned for each configured link by `GET /api/links`.
///
/// Every field is always present; `image` is empty when no preview image
/// could be found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkPreviewDto {
    pub url: String,
    pub title: String,
    pub image: String,
}

/// Hand-written preview data for a site that blocks scraping or serves
/// poor Open Graph tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkOverride {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl LinkOverride {
    /// Returns `(title, image)` when both are set.
    pub fn complete(&self) -> Option<(&str, &str)> {
        match (self.title.as_deref(), self.image.as_deref()) {
            (Some(title), Some(image)) => Some((title, image)),
            _ => None,
        }
    }

    /// The override image, if set and non-empty.
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref().filter(|s| !s.is_empty())
    }
}
