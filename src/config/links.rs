use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use url::Url;

use crate::error::{ConfigError, ConfigResult};
use crate::models::LinkOverride;

const BUILTIN_LINKS: &[&str] = &[
    "https://www.furaffinity.net/user/lunathal",
    "https://bsky.app/profile/snek.dad",
    "https://x.com/lunathal",
];

// Sites that block scraping or serve bad OG data.
const BUILTIN_OVERRIDES: &[(&str, &str, &str)] = &[
    (
        "https://x.com/lunathal",
        "Twitter",
        "https://pbs.twimg.com/profile_banners/171233398/1711756556/1500x500",
    ),
    (
        "https://www.furaffinity.net/user/lunathal",
        "FurAffinity",
        "https://i.imgur.com/UQ6Lfi4.jpeg",
    ),
];

/// The ordered links shown on the page plus their hand-written overrides.
///
/// Output order of `GET /api/links` follows `links`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinkSet {
    pub links: Vec<String>,
    #[serde(default)]
    pub overrides: HashMap<String, LinkOverride>,
}

impl LinkSet {
    pub fn builtin() -> Self {
        LinkSet {
            links: BUILTIN_LINKS.iter().map(|s| s.to_string()).collect(),
            overrides: BUILTIN_OVERRIDES
                .iter()
                .map(|(url, title, image)| {
                    (
                        url.to_string(),
                        LinkOverride {
                            title: Some(title.to_string()),
                            image: Some(image.to_string()),
                        },
                    )
                })
                .collect(),
        }
    }

    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::LinksFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Parse and validate a `{"links": [...], "overrides": {...}}` document.
    pub fn from_json(raw: &str) -> ConfigResult<Self> {
        let set: LinkSet = serde_json::from_str(raw)?;
        set.validate()?;
        Ok(set)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.links.is_empty() {
            return Err(ConfigError::NoLinks);
        }
        for url in self.links.iter().chain(self.overrides.keys()) {
            Url::parse(url).map_err(|source| ConfigError::InvalidUrl {
                url: url.clone(),
                source,
            })?;
        }
        Ok(())
    }

    pub fn override_for(&self, url: &str) -> Option<&LinkOverride> {
        self.overrides.get(url)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
