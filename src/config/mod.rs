mod links;

pub use links::LinkSet;

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use strum::{Display, EnumString};

use crate::error::{ConfigError, ConfigResult};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 5;

/// When a link has a complete override, decides whether the page is fetched
/// at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum OverridePolicy {
    /// A complete override is returned as-is, with no network call.
    #[default]
    ShortCircuit,
    /// Overrides are only consulted when scraping fails or finds no image.
    FallbackOnly,
}

/// Settings for outbound page fetches.
#[derive(Clone, Debug)]
pub struct FetchSettings {
    /// `None` means requests may wait forever.
    pub timeout: Option<Duration>,
    pub user_agent: String,
    pub override_policy: OverridePolicy,
}

impl Default for FetchSettings {
    fn default() -> Self {
        FetchSettings {
            timeout: Some(Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS)),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            override_policy: OverridePolicy::default(),
        }
    }
}

/// Per-client request budget for the whole HTTP surface.
#[derive(Clone, Debug)]
pub struct RateLimitSettings {
    pub max_requests: u32,
    pub window: Duration,
    /// Reverse proxies in front of the server whose `X-Forwarded-For`
    /// entries are trusted. `0` keys clients on the peer address alone.
    pub trusted_proxy_hops: usize,
}

impl RateLimitSettings {
    /// Seconds between replenishing one request of the budget.
    pub fn replenish_interval_secs(&self) -> u64 {
        (self.window.as_secs() / u64::from(self.max_requests.max(1))).max(1)
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub is_dev: bool,
    pub allowed_origins: Vec<String>,
    pub static_dir: PathBuf,
    pub links_file: Option<PathBuf>,
    pub fetch: FetchSettings,
    pub rate_limit: RateLimitSettings,
}

impl Config {
    pub fn from_env() -> ConfigResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(var: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let timeout_secs: u64 = parse_var(&var, "FETCH_TIMEOUT_SECS", DEFAULT_FETCH_TIMEOUT_SECS)?;
        let max_requests: u32 = parse_var(&var, "RATE_LIMIT_MAX", 100)?;
        if max_requests == 0 {
            return Err(ConfigError::InvalidVar {
                name: "RATE_LIMIT_MAX",
                value: "0".into(),
            });
        }

        Ok(Config {
            server_host: var("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            server_port: parse_var(&var, "PORT", 5000)?,
            is_dev: var("APP_ENV").as_deref() != Some("production"),
            allowed_origins: var("ALLOWED_ORIGINS")
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            static_dir: var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("public")),
            links_file: var("LINKS_FILE").map(PathBuf::from),
            fetch: FetchSettings {
                timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
                user_agent: var("FETCH_USER_AGENT")
                    .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
                override_policy: parse_var(&var, "OVERRIDE_POLICY", OverridePolicy::default())?,
            },
            rate_limit: RateLimitSettings {
                max_requests,
                window: Duration::from_secs(parse_var(&var, "RATE_LIMIT_WINDOW_SECS", 900)?),
                trusted_proxy_hops: parse_var(&var, "TRUST_PROXY_HOPS", 1)?,
            },
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// The links file when one is configured, otherwise the built-in set.
    pub fn load_links(&self) -> ConfigResult<LinkSet> {
        match &self.links_file {
            Some(path) => LinkSet::from_file(path),
            None => Ok(LinkSet::builtin()),
        }
    }
}

fn parse_var<F, T>(var: &F, name: &'static str, default: T) -> ConfigResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match var(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidVar { name, value }),
        None => Ok(default),
    }
}
