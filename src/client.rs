//! HTTP client and site configuration.
//!
//! `WikiClient` wraps a `reqwest` client with the http-cache middleware so
//! responses are cached on disk according to their cache headers, and layers
//! an in-memory query cache plus optional rate limiting on top. Every API
//! operation in the crate funnels through `wiki_request`.

use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use derive_builder::Builder;
use http_cache_reqwest::{CACacheManager, Cache, CacheMode, HttpCache, HttpCacheOptions};
use reqwest_middleware::ClientWithMiddleware;
use serde_json::Value;
use url::Url;

use crate::cache::QueryCache;
use crate::error::{Result, WikiError};
use crate::site::SiteInfo;

/// English Wikipedia, the default site.
pub const DEFAULT_API_URL: &str = "https://en.wikipedia.org/w/api.php";
/// Wikimedia fundraiser landing page, see [`WikiClient::donate_url`].
const DONATE_URL: &str =
    "https://donate.wikimedia.org/w/index.php?title=Special:FundraiserLandingPage";
/// Minimum wait between requests when rate limiting is on and no other
/// interval was given.
pub const DEFAULT_MIN_WAIT: Duration = Duration::from_millis(50);

fn default_user_agent() -> String {
    format!(
        "wiki_client/{} (https://crates.io/crates/wiki_client) BOT",
        env!("CARGO_PKG_VERSION")
    )
}

/// Configuration for a [`WikiClient`].
///
/// Built either with `WikiClientConfig::default()` or through the generated
/// `WikiClientConfigBuilder`.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct WikiClientConfig {
    /// Full URL of the `api.php` endpoint.
    #[builder(default = "DEFAULT_API_URL.to_string()")]
    pub api_url: String,
    /// Language prefix matching the `/{prefix}.` segment of the API URL.
    #[builder(default = "String::from(\"en\")")]
    pub lang: String,
    /// User-Agent header sent with every request.
    #[builder(default = "default_user_agent()")]
    pub user_agent: String,
    /// Directory for the HTTP disk cache. Defaults to `./.cache`.
    #[builder(default)]
    pub cache_path: Option<PathBuf>,
    /// Per-request timeout. `None` means no timeout.
    #[builder(default)]
    pub timeout: Option<Duration>,
}

impl Default for WikiClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            lang: String::from("en"),
            user_agent: default_user_agent(),
            cache_path: None,
            timeout: None,
        }
    }
}

/// Client for one MediaWiki site.
///
/// Query operations take `&self`; configuration changes (`set_lang`,
/// `set_user_agent`, ...) take `&mut self`.
#[derive(Debug)]
pub struct WikiClient {
    http: ClientWithMiddleware,
    config: WikiClientConfig,
    api_url: Url,
    rate_limit_wait: Option<TimeDelta>,
    last_call: Mutex<Option<DateTime<Utc>>>,
    pub(crate) query_cache: QueryCache,
    pub(crate) site_info: Mutex<Option<SiteInfo>>,
}

impl WikiClient {
    /// Create a client from a configuration.
    pub fn new(config: WikiClientConfig) -> Result<Self> {
        let api_url = Url::parse(&config.api_url)?;
        let http = build_http(&config.user_agent, config.cache_path.as_deref())?;
        Ok(Self {
            http,
            config,
            api_url,
            rate_limit_wait: None,
            last_call: Mutex::new(None),
            query_cache: QueryCache::new(),
            site_info: Mutex::new(None),
        })
    }

    /// Client for English Wikipedia with default settings.
    pub fn new_default() -> Result<Self> {
        Self::new(WikiClientConfig::default())
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    pub fn lang(&self) -> &str {
        &self.config.lang
    }

    pub fn user_agent(&self) -> &str {
        &self.config.user_agent
    }

    /// Change the User-Agent and rebuild the underlying HTTP session.
    pub fn set_user_agent<S: Into<String>>(&mut self, user_agent: S) -> Result<()> {
        self.config.user_agent = user_agent.into();
        self.reset_session()
    }

    /// Rebuild the HTTP session with the current configuration.
    pub fn reset_session(&mut self) -> Result<()> {
        self.http = build_http(&self.config.user_agent, self.config.cache_path.as_deref())?;
        Ok(())
    }

    /// Set the per-request timeout. `None` disables it.
    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.config.timeout = timeout;
    }

    /// Enable or disable rate limiting.
    ///
    /// `min_wait` is the minimum interval between requests; `None` keeps the
    /// 50 ms default. Either way the last-call stamp is reset.
    pub fn set_rate_limiting(&mut self, enabled: bool, min_wait: Option<Duration>) {
        self.rate_limit_wait = if enabled {
            let wait = min_wait.unwrap_or(DEFAULT_MIN_WAIT);
            Some(TimeDelta::from_std(wait).unwrap_or_else(|_| TimeDelta::milliseconds(50)))
        } else {
            None
        };
        if let Ok(mut last) = self.last_call.lock() {
            *last = None;
        }
    }

    /// Drop every cached query response.
    pub fn clear_cache(&self) {
        self.query_cache.clear();
    }

    /// Switch to a different MediaWiki site.
    ///
    /// The new endpoint is validated by listing its languages before the
    /// change is committed; site info is refreshed afterwards.
    pub async fn set_api_url(&mut self, api_url: &str, prefix: &str) -> Result<()> {
        let parsed = Url::parse(api_url)?;
        if self.languages_at(&parsed).await.is_err() {
            return Err(WikiError::InvalidApiUrl {
                api_url: api_url.to_string(),
            });
        }

        self.api_url = parsed;
        self.config.api_url = api_url.to_string();
        self.config.lang = prefix.to_lowercase();
        self.query_cache.clear();
        if let Ok(mut info) = self.site_info.lock() {
            *info = None;
        }
        self.site_info().await?;
        Ok(())
    }

    /// Change the language of the API being requested.
    ///
    /// Rewrites the `/{old}.` host segment of the API URL; the prefix must be
    /// one of the language codes the site lists. Clears the query cache on
    /// success, since cached titles are language specific.
    pub async fn set_lang(&mut self, prefix: &str) -> Result<()> {
        let new_prefix = prefix.to_lowercase();
        let old_prefix = self.config.lang.clone();
        let swapped = match swap_lang_prefix(self.api_url.as_str(), &old_prefix, &new_prefix) {
            Some(url) => url,
            None => {
                return Err(WikiError::Language {
                    api_url: self.api_url.to_string(),
                    old_prefix,
                    new_prefix,
                });
            }
        };

        let tmp = Url::parse(&swapped)?;
        if self.languages_at(&tmp).await.is_err() {
            return Err(WikiError::InvalidApiUrl { api_url: swapped });
        }

        self.api_url = tmp;
        self.config.api_url = swapped;
        self.config.lang = new_prefix;
        self.query_cache.clear();
        Ok(())
    }

    /// URL of the Wikimedia fundraiser landing page.
    pub fn donate_url() -> Result<Url> {
        Ok(Url::parse(DONATE_URL)?)
    }

    /// Make a request against the configured API endpoint.
    ///
    /// `format=json&formatversion=2` is always appended and `action=query`
    /// is assumed unless the params carry their own action. When `use_cache`
    /// is set, the parsed response is stored in (and served from) the
    /// in-memory query cache.
    pub(crate) async fn wiki_request(
        &self,
        params: &[(String, String)],
        use_cache: bool,
    ) -> Result<Value> {
        let url = self.api_url.clone();
        self.wiki_request_at(&url, params, use_cache).await
    }

    /// Same as `wiki_request` but against an explicit endpoint. Used while
    /// validating a URL or language switch before committing it.
    pub(crate) async fn wiki_request_at(
        &self,
        api_url: &Url,
        params: &[(String, String)],
        use_cache: bool,
    ) -> Result<Value> {
        let url = build_query_url(api_url, params);
        let key = url.to_string();

        if use_cache
            && let Some(hit) = self.query_cache.get(&key)
        {
            log::debug!("cache hit for {}", key);
            return Ok(hit);
        }

        self.rate_limit_pause().await;

        log::debug!("GET {}", url);
        let mut request = self.http.get(url);
        if let Some(timeout) = self.config.timeout {
            request = request.timeout(timeout);
        }
        let response = request.send().await?;

        if self.rate_limit_wait.is_some()
            && let Ok(mut last) = self.last_call.lock()
        {
            *last = Some(Utc::now());
        }

        let value: Value = response.json().await?;
        if use_cache {
            self.query_cache.insert(key, value.clone());
        }
        Ok(value)
    }

    /// Sleep until the configured minimum interval since the previous
    /// request has passed.
    async fn rate_limit_pause(&self) {
        let Some(wait) = self.rate_limit_wait else {
            return;
        };
        let due = self
            .last_call
            .lock()
            .ok()
            .and_then(|last| *last)
            .map(|last| last + wait);
        if let Some(due) = due {
            let now = Utc::now();
            if due > now {
                let sleep_for = (due - now).to_std().unwrap_or_default();
                tokio::time::sleep(sleep_for).await;
            }
        }
    }
}

/// Build the middleware client: plain reqwest with the configured UA, plus
/// an HTTP disk cache honoring the server's cache headers.
fn build_http(user_agent: &str, cache_path: Option<&std::path::Path>) -> Result<ClientWithMiddleware> {
    let base = reqwest::ClientBuilder::new().user_agent(user_agent).build()?;
    let cache_dir: PathBuf = cache_path
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./.cache"));
    Ok(reqwest_middleware::ClientBuilder::new(base)
        .with(Cache(HttpCache {
            mode: CacheMode::Default,
            manager: CACacheManager::new(cache_dir, true),
            options: HttpCacheOptions::default(),
        }))
        .build())
}

/// Build the request URL: base endpoint plus the standard query pairs and
/// the operation's own parameters, in a stable order (the URL doubles as the
/// query-cache key).
pub(crate) fn build_query_url(api_url: &Url, params: &[(String, String)]) -> Url {
    let mut url = api_url.clone();
    {
        let mut pairs = url.query_pairs_mut();
        pairs
            .append_pair("format", "json")
            .append_pair("formatversion", "2");
        if !params.iter().any(|(key, _)| key == "action") {
            pairs.append_pair("action", "query");
        }
        for (key, value) in params {
            pairs.append_pair(key, value);
        }
        pairs.finish();
    }
    url
}

/// Rewrite the `/{old}.` segment of an API URL to `/{new}.`, or `None` when
/// the URL does not change (no such segment, or same prefix).
pub(crate) fn swap_lang_prefix(api_url: &str, old: &str, new: &str) -> Option<String> {
    let swapped = api_url.replace(&format!("/{}.", old), &format!("/{}.", new));
    if swapped == api_url { None } else { Some(swapped) }
}

/// Owned query-pair shorthand used all over the request builders.
pub(crate) fn pair(key: &str, value: impl ToString) -> (String, String) {
    (key.to_string(), value.to_string())
}

/// Map the API `error` envelope to a crate error, when present.
///
/// The API reports its own timeouts in-band; those become `Timeout` carrying
/// the caller's query term.
pub(crate) fn api_error_of(value: &Value, context: &str) -> Option<WikiError> {
    let err = value.get("error")?;
    let info = err.get("info").and_then(Value::as_str).unwrap_or_default();
    if info == "HTTP request timed out." || info == "Pool queue is full" {
        Some(WikiError::timeout(context))
    } else {
        Some(WikiError::api(info))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn config_defaults() {
        let config = WikiClientConfig::default();
        assert_eq!(config.api_url, "https://en.wikipedia.org/w/api.php");
        assert_eq!(config.lang, "en");
        assert!(config.user_agent.starts_with("wiki_client/"));
        assert!(config.timeout.is_none());
    }

    #[test]
    fn config_builder_overrides() {
        let config = WikiClientConfigBuilder::default()
            .lang("fr")
            .api_url("https://fr.wikipedia.org/w/api.php")
            .user_agent("tester/0.1")
            .build()
            .expect("builder should fill defaults");
        assert_eq!(config.lang, "fr");
        assert_eq!(config.user_agent, "tester/0.1");
        assert!(config.cache_path.is_none());
    }

    #[test]
    fn query_url_appends_defaults_and_params() {
        let base = Url::parse(DEFAULT_API_URL).expect("base url");
        let url = build_query_url(&base, &[pair("list", "search"), pair("srsearch", "rust lang")]);
        let s = url.to_string();
        assert!(s.contains("format=json"));
        assert!(s.contains("formatversion=2"));
        assert!(s.contains("action=query"));
        assert!(s.contains("srsearch=rust+lang"));
    }

    #[test]
    fn query_url_keeps_explicit_action() {
        let base = Url::parse(DEFAULT_API_URL).expect("base url");
        let url = build_query_url(&base, &[pair("action", "opensearch"), pair("search", "tow")]);
        let s = url.to_string();
        assert!(s.contains("action=opensearch"));
        assert!(!s.contains("action=query"));
    }

    #[test]
    fn lang_prefix_swap() {
        let swapped = swap_lang_prefix("https://en.wikipedia.org/w/api.php", "en", "fr");
        assert_eq!(
            swapped.as_deref(),
            Some("https://fr.wikipedia.org/w/api.php")
        );
        // no /{prefix}. segment to rewrite
        assert!(swap_lang_prefix("https://wiki.example.org/api.php", "en", "fr").is_none());
        // same prefix is a no-op
        assert!(swap_lang_prefix("https://en.wikipedia.org/w/api.php", "en", "en").is_none());
    }

    #[test]
    fn api_error_mapping() {
        let timeout = json!({"error": {"code": "x", "info": "Pool queue is full"}});
        match api_error_of(&timeout, "rust").expect("should map") {
            WikiError::Timeout { query } => assert_eq!(query, "rust"),
            other => panic!("expected timeout, got {:?}", other),
        }

        let generic = json!({"error": {"code": "x", "info": "something else"}});
        match api_error_of(&generic, "rust").expect("should map") {
            WikiError::Api { info } => assert_eq!(info, "something else"),
            other => panic!("expected api error, got {:?}", other),
        }

        let clean = json!({"query": {}});
        assert!(api_error_of(&clean, "rust").is_none());
    }

    #[tokio::test]
    async fn rate_limit_pause_is_noop_when_disabled() {
        let client = WikiClient::new_default().expect("client");
        // no wait configured, so this returns immediately
        client.rate_limit_pause().await;
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_pause_waits_out_the_interval() {
        let mut client = WikiClient::new_default().expect("client");
        client.set_rate_limiting(true, Some(Duration::from_millis(40)));

        // a fresh stamp forces a sleep for (close to) the whole interval
        if let Ok(mut last) = client.last_call.lock() {
            *last = Some(Utc::now());
        }
        let start = tokio::time::Instant::now();
        client.rate_limit_pause().await;
        assert!(start.elapsed() >= Duration::from_millis(30));

        // toggling rate limiting resets the stamp, so the next call is free
        client.set_rate_limiting(true, Some(Duration::from_millis(40)));
        let start = tokio::time::Instant::now();
        client.rate_limit_pause().await;
        assert_eq!(start.elapsed(), Duration::ZERO);

        // a stamp older than the interval does not sleep either
        if let Ok(mut last) = client.last_call.lock() {
            *last = Some(Utc::now() - TimeDelta::milliseconds(500));
        }
        let start = tokio::time::Instant::now();
        client.rate_limit_pause().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[test]
    fn donate_url_parses() {
        let url = WikiClient::donate_url().expect("static url should parse");
        assert_eq!(url.domain(), Some("donate.wikimedia.org"));
    }

    #[test]
    fn rate_limit_toggle_resets_state() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut client = WikiClient::new_default().expect("client");
        client.set_rate_limiting(true, Some(Duration::from_millis(10)));
        assert!(client.rate_limit_wait.is_some());
        client.set_rate_limiting(false, None);
        assert!(client.rate_limit_wait.is_none());
    }
}
