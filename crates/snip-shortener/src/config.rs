use crate::error::ConfigError;
use snip_core::Token;
use std::fmt::Display;
use std::time::Duration;
use typed_builder::TypedBuilder;
use url::Url;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(6 * 60 * 60);
pub const DEFAULT_CACHE_TIMEOUT: Duration = Duration::from_millis(250);
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// The public address short URLs are served from.
///
/// Always an absolute `http`/`https` URL with a host and a path ending in
/// `/`, without query or fragment, so a token can be appended directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl(Url);

impl BaseUrl {
    pub fn parse(input: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidBaseUrl {
            url: input.to_owned(),
            reason: reason.to_owned(),
        };

        let mut url = Url::parse(input).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(invalid("missing host"));
        }

        url.set_query(None);
        url.set_fragment(None);
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(Self(url))
    }

    /// Host name, lowercased by the URL parser.
    pub fn host(&self) -> &str {
        self.0.host_str().unwrap_or_default()
    }

    /// The short URL for `token`.
    pub fn join(&self, token: &Token) -> Url {
        let mut url = self.0.clone();
        let path = format!("{}{}", self.0.path(), token.as_str());
        url.set_path(&path);
        url
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }
}

impl Display for BaseUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, TypedBuilder)]
pub struct ShortenerConfig {
    pub base_url: BaseUrl,
    /// Lifetime of every cache entry the engine writes.
    #[builder(default = DEFAULT_CACHE_TTL)]
    pub cache_ttl: Duration,
    /// Upper bound on a single cache call; exceeding it counts as a miss.
    #[builder(default = DEFAULT_CACHE_TIMEOUT)]
    pub cache_timeout: Duration,
    /// Upper bound on a single store call; exceeding it fails the request.
    #[builder(default = DEFAULT_STORE_TIMEOUT)]
    pub store_timeout: Duration,
}
