//! Module-level query operations: full-text search, suggestions,
//! opensearch, prefix search, random titles and geosearch.
//!
//! Parameter sets follow the MediaWiki query API; the full-text family needs
//! MediaWiki 1.16+, opensearch 1.25+ with the OpenSearch extension, prefix
//! search 1.23+, and geosearch the GeoData extension.

use itertools::izip;

use crate::client::{WikiClient, api_error_of, pair};
use crate::definitions::{
    GeoSearchQuery, GeoSearchResponse, OpenSearchResponse, PrefixSearchResponse, RandomResponse,
    SearchResponse,
};
use crate::error::{Result, WikiError};

/// Reject empty or whitespace-only terms before they hit the API.
pub(crate) fn require_term(value: &str, what: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(WikiError::invalid_arg(format!("{} must be specified", what)));
    }
    Ok(())
}

/// Flatten a geosearch response; the shape depends on whether a `titles`
/// filter was part of the request.
fn shape_geosearch(query: GeoSearchQuery) -> Vec<String> {
    if let Some(pages) = query.pages {
        return pages
            .into_iter()
            .filter(|page| !page.missing)
            .map(|page| page.title)
            .collect();
    }
    query
        .geosearch
        .unwrap_or_default()
        .into_iter()
        .map(|entry| entry.title)
        .collect()
}

/// Zip the opensearch array columns into (title, summary, url) rows.
fn shape_opensearch(response: OpenSearchResponse) -> Vec<(String, String, String)> {
    izip!(response.1, response.2, response.3).collect()
}

impl WikiClient {
    /// Full-text search, returning up to `results` page titles.
    pub async fn search(&self, query: &str, results: u32) -> Result<Vec<String>> {
        let (titles, _) = self.search_raw(query, results, false).await?;
        Ok(titles)
    }

    /// Full-text search that also reports the search engine's spelling
    /// suggestion, when it has one.
    pub async fn search_with_suggestion(
        &self,
        query: &str,
        results: u32,
    ) -> Result<(Vec<String>, Option<String>)> {
        self.search_raw(query, results, true).await
    }

    async fn search_raw(
        &self,
        query: &str,
        results: u32,
        want_suggestion: bool,
    ) -> Result<(Vec<String>, Option<String>)> {
        self.require_version((1, 16), "search").await?;
        require_term(query, "query")?;

        let mut params = vec![
            pair("list", "search"),
            pair("srprop", ""),
            pair("srlimit", results),
            pair("srsearch", query),
        ];
        if want_suggestion {
            params.push(pair("srinfo", "suggestion"));
        }

        let raw = self.wiki_request(&params, true).await?;
        if let Some(err) = api_error_of(&raw, query) {
            return Err(err);
        }

        let parsed: SearchResponse = serde_json::from_value(raw)?;
        let titles = parsed
            .query
            .search
            .into_iter()
            .map(|hit| hit.title)
            .collect();
        let suggestion = parsed.query.searchinfo.and_then(|info| info.suggestion);
        Ok((titles, suggestion))
    }

    /// Spelling suggestion for `query`, or `None` when the engine has none.
    pub async fn suggest(&self, query: &str) -> Result<Option<String>> {
        self.require_version((1, 16), "suggest").await?;
        require_term(query, "query")?;

        let params = [
            pair("list", "search"),
            pair("srinfo", "suggestion"),
            pair("srprop", ""),
            pair("srsearch", query),
        ];
        let raw = self.wiki_request(&params, true).await?;
        if let Some(err) = api_error_of(&raw, query) {
            return Err(err);
        }

        let parsed: SearchResponse = serde_json::from_value(raw)?;
        Ok(parsed.query.searchinfo.and_then(|info| info.suggestion))
    }

    /// Search-box style suggestions conforming to the OpenSearch spec.
    ///
    /// Returns (title, summary, url) rows. When `resolve_redirects` is set
    /// the target pages are returned instead of the redirects themselves,
    /// which may yield fewer rows than `results`. Capped at 100 by the API.
    pub async fn opensearch(
        &self,
        query: &str,
        results: u32,
        resolve_redirects: bool,
    ) -> Result<Vec<(String, String, String)>> {
        self.require_version((1, 25), "opensearch").await?;
        self.require_extension("OpenSearch", "opensearch").await?;
        require_term(query, "query")?;

        let params = [
            pair("action", "opensearch"),
            pair("search", query),
            pair("limit", results.min(100)),
            pair(
                "redirects",
                if resolve_redirects { "resolve" } else { "return" },
            ),
            pair("warningsaserror", "true"),
            pair("namespace", ""),
        ];
        let raw = self.wiki_request(&params, true).await?;
        if let Some(err) = api_error_of(&raw, query) {
            return Err(err);
        }

        let parsed: OpenSearchResponse = serde_json::from_value(raw)?;
        Ok(shape_opensearch(parsed))
    }

    /// Prefix search, matching the behavior of the on-site search box.
    /// Capped at 100 by the API; article namespace only.
    pub async fn prefixsearch(&self, query: &str, results: u32) -> Result<Vec<String>> {
        self.require_version((1, 23), "prefixsearch").await?;
        require_term(query, "query")?;

        let params = [
            pair("list", "prefixsearch"),
            pair("pssearch", query),
            pair("pslimit", results.min(100)),
            pair("psnamespace", 0),
            pair("psoffset", 0),
        ];
        let raw = self.wiki_request(&params, true).await?;
        if let Some(err) = api_error_of(&raw, query) {
            return Err(err);
        }

        let parsed: PrefixSearchResponse = serde_json::from_value(raw)?;
        Ok(parsed
            .query
            .prefixsearch
            .into_iter()
            .map(|entry| entry.title)
            .collect())
    }

    /// Titles of `pages` random articles (article namespace only, so no
    /// Category or User talk pages).
    pub async fn random(&self, pages: u32) -> Result<Vec<String>> {
        self.require_version((1, 12), "random").await?;
        if pages < 1 {
            return Err(WikiError::invalid_arg("number of pages must be greater than 0"));
        }

        let params = [
            pair("list", "random"),
            pair("rnnamespace", 0),
            pair("rnlimit", pages),
        ];
        let raw = self.wiki_request(&params, false).await?;
        let parsed: RandomResponse = serde_json::from_value(raw)?;
        Ok(parsed
            .query
            .random
            .into_iter()
            .map(|entry| entry.title)
            .collect())
    }

    /// Titles of articles near the given coordinates.
    ///
    /// `radius` is in meters (the API accepts 10 to 10000). An optional
    /// `title` narrows the search to that article. Needs the GeoData
    /// extension.
    pub async fn geosearch(
        &self,
        latitude: f64,
        longitude: f64,
        title: Option<&str>,
        results: u32,
        radius: u32,
    ) -> Result<Vec<String>> {
        self.require_extension("GeoData", "geosearch").await?;

        let coord = format!("{}|{}", latitude, longitude);
        let mut params = vec![
            pair("list", "geosearch"),
            pair("gsradius", radius),
            pair("gscoord", &coord),
            pair("gslimit", results),
        ];
        if let Some(title) = title {
            params.push(pair("titles", title));
        }

        let raw = self.wiki_request(&params, true).await?;
        if let Some(err) = api_error_of(&raw, &coord) {
            return Err(err);
        }

        let parsed: GeoSearchResponse = serde_json::from_value(raw)?;
        Ok(shape_geosearch(parsed.query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_terms_rejected() {
        assert!(require_term("rust", "query").is_ok());
        assert!(require_term("", "query").is_err());
        assert!(require_term("   ", "query").is_err());
        let err = require_term("\t", "category").unwrap_err();
        assert!(format!("{}", err).contains("category must be specified"));
    }

    #[test]
    fn geosearch_plain_listing() {
        let raw = r#"{
            "geosearch": [
                {"pageid": 1, "title": "Eiffel Tower"},
                {"pageid": 2, "title": "Champ de Mars"}
            ]
        }"#;
        let query: GeoSearchQuery = serde_json::from_str(raw).expect("should parse");
        assert_eq!(
            shape_geosearch(query),
            vec!["Eiffel Tower".to_string(), "Champ de Mars".to_string()]
        );
    }

    #[test]
    fn geosearch_title_filter_skips_missing() {
        let raw = r#"{
            "pages": [
                {"pageid": 1, "title": "Eiffel Tower"},
                {"title": "Not a page", "missing": true}
            ]
        }"#;
        let query: GeoSearchQuery = serde_json::from_str(raw).expect("should parse");
        assert_eq!(shape_geosearch(query), vec!["Eiffel Tower".to_string()]);
    }

    #[test]
    fn geosearch_empty_query_body() {
        let query: GeoSearchQuery = serde_json::from_str("{}").expect("should parse");
        assert!(shape_geosearch(query).is_empty());
    }

    #[test]
    fn opensearch_rows_are_zipped() {
        let response = OpenSearchResponse(
            "tow".into(),
            vec!["Tower".into(), "Town".into()],
            vec!["a tall building".into(), "a settlement".into()],
            vec!["https://x/Tower".into(), "https://x/Town".into()],
        );
        let rows = shape_opensearch(response);
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            (
                "Tower".to_string(),
                "a tall building".to_string(),
                "https://x/Tower".to_string()
            )
        );
    }

    #[test]
    fn opensearch_uneven_columns_truncate() {
        // izip stops at the shortest column; a short url list must not panic
        let response = OpenSearchResponse(
            "q".into(),
            vec!["A".into(), "B".into()],
            vec!["a".into(), "b".into()],
            vec!["https://x/A".into()],
        );
        assert_eq!(shape_opensearch(response).len(), 1);
    }
}
