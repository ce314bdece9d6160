mod extract;

pub use extract::{extract_og_data, ScrapedMetadata};

use std::sync::Arc;

use reqwest::Client as ReqwestClient;
use tokio::task::JoinSet;

use crate::config::{FetchSettings, LinkSet, OverridePolicy};
use crate::error::{ConfigError, ConfigResult, FetchError};
use crate::models::{LinkOverride, LinkPreviewDto};

/// Turns configured links into preview cards.
///
/// Cheaply cloneable: the HTTP client and the link set are shared.
#[derive(Clone)]
pub struct MetadataResolver {
    client: ReqwestClient,
    links: Arc<LinkSet>,
    override_policy: OverridePolicy,
}

impl MetadataResolver {
    pub fn new(links: LinkSet, settings: &FetchSettings) -> ConfigResult<Self> {
        let mut builder = ReqwestClient::builder().user_agent(settings.user_agent.as_str());
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(ConfigError::HttpClient)?;

        Ok(MetadataResolver {
            client,
            links: Arc::new(links),
            override_policy: settings.override_policy,
        })
    }

    pub fn links(&self) -> &LinkSet {
        &self.links
    }

    /// Resolve a single URL. Never fails: scraping errors are logged and
    /// replaced by override data or a bare card.
    pub async fn resolve(&self, url: &str) -> LinkPreviewDto {
        let link_override = self.links.override_for(url);

        if self.override_policy == OverridePolicy::ShortCircuit {
            if let Some((title, image)) = link_override.and_then(LinkOverride::complete) {
                return LinkPreviewDto {
                    url: url.to_string(),
                    title: title.to_string(),
                    image: image.to_string(),
                };
            }
        }

        match self.scrape(url).await {
            Ok(scraped) => merge_scraped(url, scraped, link_override),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    kind = e.kind(),
                    url = %url,
                    "Failed to fetch link metadata"
                );
                fallback_preview(url, link_override)
            }
        }
    }

    /// Resolve every configured link concurrently, in configuration order.
    pub async fn resolve_all(&self) -> Vec<LinkPreviewDto> {
        let mut tasks = JoinSet::new();
        for (index, url) in self.links.links.iter().enumerate() {
            let resolver = self.clone();
            let url = url.clone();
            tasks.spawn(async move { (index, resolver.resolve(&url).await) });
        }

        let mut slots: Vec<Option<LinkPreviewDto>> = vec![None; self.links.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, preview)) => slots[index] = Some(preview),
                Err(e) => tracing::error!(error = ?e, "Link resolution task failed"),
            }
        }

        slots
            .into_iter()
            .zip(&self.links.links)
            .map(|(slot, url)| {
                slot.unwrap_or_else(|| fallback_preview(url, self.links.override_for(url)))
            })
            .collect()
    }

    async fn scrape(&self, url: &str) -> Result<ScrapedMetadata, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::Network)?;

        // Some sites answer 403 with a perfectly good HTML page; it is still
        // treated as a failure.
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let html = response.text().await.map_err(FetchError::Body)?;
        Ok(extract_og_data(&html))
    }
}

/// Build a card from a successfully scraped page.
///
/// Only the image falls back to the override; the title never does.
fn merge_scraped(
    url: &str,
    scraped: ScrapedMetadata,
    link_override: Option<&LinkOverride>,
) -> LinkPreviewDto {
    let image = scraped
        .image
        .or_else(|| link_override.and_then(LinkOverride::image).map(str::to_string))
        .unwrap_or_default();

    LinkPreviewDto {
        url: url.to_string(),
        title: scraped.title.unwrap_or_else(|| url.to_string()),
        image,
    }
}

/// The card used when a page could not be scraped.
fn fallback_preview(url: &str, link_override: Option<&LinkOverride>) -> LinkPreviewDto {
    let (title, image) = match link_override {
        Some(o) => (o.title.clone(), o.image.clone()),
        None => (None, None),
    };

    LinkPreviewDto {
        url: url.to_string(),
        title: title.unwrap_or_else(|| url.to_string()),
        image: image.unwrap_or_default(),
    }
}
