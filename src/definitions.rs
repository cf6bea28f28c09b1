//! Serde models for the MediaWiki JSON responses (formatversion=2).
//!
//! Each query shape gets its own small envelope type rather than one giant
//! struct; operations deserialize only the slice of the response they use.

use serde::{Deserialize, Serialize};

/// The `error` object the API returns instead of a `query` body.
#[derive(Debug, Deserialize, Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub info: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TitleEntry {
    pub title: String,
}

// --- list=search ---

#[derive(Debug, Deserialize, Serialize)]
pub struct SearchInfo {
    pub suggestion: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SearchQuery {
    pub searchinfo: Option<SearchInfo>,
    #[serde(default)]
    pub search: Vec<TitleEntry>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SearchResponse {
    pub query: SearchQuery,
}

// --- list=categorymembers ---

#[derive(Debug, Deserialize, Serialize)]
pub struct CategoryMember {
    pub pageid: Option<u64>,
    pub title: String,
    /// `page`, `subcat` or `file`.
    #[serde(rename = "type")]
    pub member_type: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CategoryMembersQuery {
    #[serde(default)]
    pub categorymembers: Vec<CategoryMember>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CategoryMembersResponse {
    pub query: CategoryMembersQuery,
}

// --- list=geosearch ---

#[derive(Debug, Deserialize, Serialize)]
pub struct GeoPage {
    pub pageid: Option<u64>,
    pub title: String,
    #[serde(default)]
    pub missing: bool,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct GeoSearchQuery {
    pub geosearch: Option<Vec<TitleEntry>>,
    /// Returned instead of `geosearch` when a `titles` filter is passed.
    pub pages: Option<Vec<GeoPage>>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct GeoSearchResponse {
    pub query: GeoSearchQuery,
}

// --- list=random / list=prefixsearch ---

#[derive(Debug, Deserialize, Serialize)]
pub struct RandomQuery {
    #[serde(default)]
    pub random: Vec<TitleEntry>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RandomResponse {
    pub query: RandomQuery,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PrefixSearchQuery {
    #[serde(default)]
    pub prefixsearch: Vec<TitleEntry>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PrefixSearchResponse {
    pub query: PrefixSearchQuery,
}

/// `action=opensearch` answers with a bare 4-element array:
/// the echoed query, titles, summaries and URLs.
#[derive(Debug, Deserialize)]
pub struct OpenSearchResponse(
    pub String,
    pub Vec<String>,
    pub Vec<String>,
    pub Vec<String>,
);

// --- meta=siteinfo ---

#[derive(Debug, Deserialize, Serialize)]
pub struct GeneralInfo {
    /// e.g. `MediaWiki 1.43.0-wmf.5`
    pub generator: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ExtensionInfo {
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LanguageInfo {
    pub code: String,
    /// Local language name. formatversion=2 calls this `name`.
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SiteInfoQuery {
    pub general: Option<GeneralInfo>,
    pub extensions: Option<Vec<ExtensionInfo>>,
    pub languages: Option<Vec<LanguageInfo>>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SiteInfoResponse {
    pub query: SiteInfoQuery,
}

// --- prop=info|pageprops (page load) ---

#[derive(Debug, Deserialize, Serialize)]
pub struct RedirectEntry {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct PageProps {
    pub disambiguation: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PageInfo {
    pub pageid: Option<u64>,
    pub title: Option<String>,
    #[serde(default)]
    pub missing: bool,
    pub fullurl: Option<String>,
    pub pageprops: Option<PageProps>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PageInfoQuery {
    pub redirects: Option<Vec<RedirectEntry>>,
    pub normalized: Option<Vec<RedirectEntry>>,
    #[serde(default)]
    pub pages: Vec<PageInfo>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PageInfoResponse {
    pub query: PageInfoQuery,
}

// --- prop=extracts|revisions ---

#[derive(Debug, Deserialize, Serialize)]
pub struct RevisionIds {
    pub revid: u64,
    pub parentid: u64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ExtractPage {
    pub pageid: Option<u64>,
    pub title: Option<String>,
    pub extract: Option<String>,
    pub revisions: Option<Vec<RevisionIds>>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ExtractQuery {
    #[serde(default)]
    pub pages: Vec<ExtractPage>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ExtractResponse {
    pub query: ExtractQuery,
}

// --- prop=coordinates ---

#[derive(Debug, Deserialize, Serialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CoordinatesPage {
    pub coordinates: Option<Vec<Coordinate>>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CoordinatesQuery {
    #[serde(default)]
    pub pages: Vec<CoordinatesPage>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CoordinatesResponse {
    pub query: Option<CoordinatesQuery>,
}

// --- list=backlinks (manual continuation) ---

#[derive(Debug, Deserialize, Serialize)]
pub struct BacklinksContinue {
    pub blcontinue: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct BacklinksQuery {
    #[serde(default)]
    pub backlinks: Vec<TitleEntry>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct BacklinksResponse {
    pub query: BacklinksQuery,
    #[serde(rename = "continue")]
    pub cont: Option<BacklinksContinue>,
}

// --- action=parse ---

#[derive(Debug, Deserialize, Serialize)]
pub struct SectionEntry {
    pub line: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ParseBody {
    pub title: Option<String>,
    /// Rendered page HTML. A plain string under formatversion=2.
    pub text: Option<String>,
    pub sections: Option<Vec<SectionEntry>>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ParseResponse {
    pub parse: ParseBody,
}
