//! Site metadata: API version, installed extensions, supported languages.
//!
//! Most operations only work above some MediaWiki version or with a given
//! extension installed; the gates here are checked before the request goes
//! out so callers get a precise error instead of a confusing API reply.

use std::collections::HashSet;

use url::Url;

use crate::client::{WikiClient, pair};
use crate::definitions::SiteInfoResponse;
use crate::error::{Result, WikiError};

/// Parsed `meta=siteinfo` data, fetched once per client.
#[derive(Debug, Clone)]
pub struct SiteInfo {
    /// Version string as reported, e.g. `1.43.0` (wmf suffix stripped).
    pub version: String,
    /// Major/minor pair used for feature gating.
    pub major_minor: (u32, u32),
    /// Names of the installed extensions.
    pub extensions: HashSet<String>,
}

/// Pull the version out of a `generator` string like `MediaWiki 1.43.0-wmf.5`.
pub(crate) fn parse_generator(generator: &str) -> Option<(String, (u32, u32))> {
    let token = generator.split_whitespace().nth(1)?;
    let version = token.split('-').next()?.to_string();
    let mut parts = version.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    Some((version, (major, minor)))
}

impl WikiClient {
    /// Site info for the configured endpoint, fetched on first use.
    pub async fn site_info(&self) -> Result<SiteInfo> {
        if let Ok(cached) = self.site_info.lock()
            && let Some(info) = cached.as_ref()
        {
            return Ok(info.clone());
        }

        let raw = self
            .wiki_request(
                &[pair("meta", "siteinfo"), pair("siprop", "extensions|general")],
                false,
            )
            .await?;
        let parsed: SiteInfoResponse = serde_json::from_value(raw)?;

        let generator = parsed
            .query
            .general
            .map(|g| g.generator)
            .ok_or_else(|| WikiError::api("siteinfo response carried no generator"))?;
        let (version, major_minor) = parse_generator(&generator)
            .ok_or_else(|| WikiError::api(format!("unparseable generator: {}", generator)))?;
        let extensions = parsed
            .query
            .extensions
            .unwrap_or_default()
            .into_iter()
            .map(|ext| ext.name)
            .collect();

        let info = SiteInfo {
            version,
            major_minor,
            extensions,
        };
        if let Ok(mut cached) = self.site_info.lock() {
            *cached = Some(info.clone());
        }
        Ok(info)
    }

    /// MediaWiki version of the site, e.g. `1.43.0`.
    pub async fn api_version(&self) -> Result<String> {
        Ok(self.site_info().await?.version)
    }

    /// Names of the extensions installed on the site.
    pub async fn installed_extensions(&self) -> Result<HashSet<String>> {
        Ok(self.site_info().await?.extensions)
    }

    /// Error out when the site is older than `required`.
    pub(crate) async fn require_version(
        &self,
        required: (u32, u32),
        operation: &str,
    ) -> Result<()> {
        let info = self.site_info().await?;
        if info.major_minor < required {
            return Err(WikiError::Version {
                api_url: self.api_url().to_string(),
                current: info.version,
                required: format!("{}.{}", required.0, required.1),
                operation: operation.to_string(),
            });
        }
        Ok(())
    }

    /// Error out when the site does not have `extension` installed.
    pub(crate) async fn require_extension(&self, extension: &str, operation: &str) -> Result<()> {
        let info = self.site_info().await?;
        if !info.extensions.contains(extension) {
            return Err(WikiError::MissingExtension {
                api_url: self.api_url().to_string(),
                extension: extension.to_string(),
                operation: operation.to_string(),
            });
        }
        Ok(())
    }

    /// All language prefixes the site supports, as (prefix, local name)
    /// pairs in API order. Prefixes feed [`WikiClient::set_lang`].
    pub async fn languages(&self) -> Result<Vec<(String, String)>> {
        let url = self.api_url().clone();
        self.languages_from(&url, true).await
    }

    /// Language listing against an explicit endpoint; used to validate a
    /// URL before committing a site or language switch.
    pub(crate) async fn languages_at(&self, api_url: &Url) -> Result<Vec<(String, String)>> {
        self.languages_from(api_url, false).await
    }

    async fn languages_from(&self, api_url: &Url, use_cache: bool) -> Result<Vec<(String, String)>> {
        let raw = self
            .wiki_request_at(
                api_url,
                &[pair("meta", "siteinfo"), pair("siprop", "languages")],
                use_cache,
            )
            .await?;
        let parsed: SiteInfoResponse = serde_json::from_value(raw)?;
        let languages = parsed
            .query
            .languages
            .ok_or_else(|| WikiError::api("siteinfo response carried no languages"))?;
        Ok(languages
            .into_iter()
            .map(|lang| (lang.code, lang.name))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_with_wmf_suffix() {
        let (version, major_minor) =
            parse_generator("MediaWiki 1.43.0-wmf.5").expect("should parse");
        assert_eq!(version, "1.43.0");
        assert_eq!(major_minor, (1, 43));
    }

    #[test]
    fn generator_two_part_version() {
        let (version, major_minor) = parse_generator("MediaWiki 1.16").expect("should parse");
        assert_eq!(version, "1.16");
        assert_eq!(major_minor, (1, 16));
    }

    #[test]
    fn generator_garbage_rejected() {
        assert!(parse_generator("MediaWiki").is_none());
        assert!(parse_generator("MediaWiki x.y").is_none());
    }

    #[test]
    fn version_tuple_ordering_gates_correctly() {
        // the gate is `current < required`
        assert!((1, 9) < (1, 16));
        assert!((1, 16) >= (1, 16));
        assert!((2, 0) >= (1, 25));
    }

    #[test]
    fn siteinfo_languages_parse() {
        let raw = r#"{
            "query": {
                "languages": [
                    {"code": "en", "name": "English"},
                    {"code": "fr", "name": "français"}
                ]
            }
        }"#;
        let parsed: SiteInfoResponse = serde_json::from_str(raw).expect("should parse");
        let langs: Vec<(String, String)> = parsed
            .query
            .languages
            .unwrap()
            .into_iter()
            .map(|lang| (lang.code, lang.name))
            .collect();
        assert_eq!(langs[0], ("en".to_string(), "English".to_string()));
        assert_eq!(langs[1].0, "fr");
    }
}
