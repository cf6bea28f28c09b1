//! Page retrieval and the `WikiPage` type.
//!
//! A page is resolved through `prop=info|pageprops` with server-side
//! redirect resolution; missing pages, unexpected redirects and
//! disambiguation pages surface as dedicated errors. Everything else on a
//! page (content, images, link lists...) is fetched lazily on first access
//! and cached on the struct, so the methods take `&mut self` plus the client
//! to go through.

use futures::future;
use lazy_regex::{regex, regex_captures, regex_replace_all};
use serde_json::Value;

use crate::client::{WikiClient, pair};
use crate::definitions::{
    BacklinksResponse, CoordinatesResponse, ExtractResponse, PageInfoResponse, ParseResponse,
};
use crate::error::{DisambiguationEntry, Result, WikiError};
use crate::search::require_term;

/// How a page is addressed: by title or by numeric pageid.
#[derive(Debug, Clone)]
pub enum PageLookup {
    Title(String),
    PageId(u64),
}

/// Options for [`WikiClient::page_with`].
#[derive(Debug, Clone, Copy)]
pub struct PageOptions {
    /// Let the search engine pick a valid title for the query first.
    pub auto_suggest: bool,
    /// Follow redirects instead of erroring on them.
    pub redirect: bool,
    /// Eagerly fetch the lazy properties after loading.
    pub preload: bool,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            auto_suggest: true,
            redirect: true,
            preload: false,
        }
    }
}

/// Data from one wiki page. Identity fields are filled at load time; the
/// rest is fetched on demand and cached.
#[derive(Debug, Clone, Default)]
pub struct WikiPage {
    pub pageid: u64,
    /// Canonical title after normalization and redirect resolution.
    pub title: String,
    /// The title the page was requested under.
    pub original_title: String,
    pub url: String,
    html: Option<String>,
    content: Option<String>,
    revision_id: Option<u64>,
    parent_id: Option<u64>,
    summary: Option<String>,
    images: Option<Vec<String>>,
    references: Option<Vec<String>>,
    links: Option<Vec<String>>,
    categories: Option<Vec<String>>,
    redirects: Option<Vec<String>>,
    backlinks: Option<Vec<String>>,
    coordinates: Option<Option<(f64, f64)>>,
    sections: Option<Vec<String>>,
}

impl PartialEq for WikiPage {
    fn eq(&self, other: &Self) -> bool {
        self.pageid == other.pageid && self.title == other.title && self.url == other.url
    }
}

/// Pull the disambiguation options out of a rendered disambiguation page.
///
/// Every `<li>` that is not a table-of-contents entry and carries a link
/// contributes its link text to the options and its full line text to the
/// details.
fn parse_disambiguation(html: &str) -> (Vec<String>, Vec<DisambiguationEntry>) {
    let mut options = Vec::new();
    let mut details = Vec::new();
    for item in regex!(r"(?s)<li([^>]*)>(.*?)</li>").captures_iter(html) {
        let attrs = item.get(1).map(|m| m.as_str()).unwrap_or_default();
        let body = item.get(2).map(|m| m.as_str()).unwrap_or_default();
        if attrs.contains("tocsection") {
            continue;
        }
        let Some((_, anchor_attrs, anchor_text)) =
            regex_captures!(r"(?s)<a([^>]*)>(.*?)</a>", body)
        else {
            continue;
        };
        let link_text = strip_tags(anchor_text);
        let link_title = regex_captures!(r#"title="([^"]+)""#, anchor_attrs)
            .map(|(_, title)| title.to_string())
            .unwrap_or_else(|| link_text.clone());
        options.push(link_text);
        details.push(DisambiguationEntry {
            title: link_title,
            description: strip_tags(body),
        });
    }
    (options, details)
}

/// Drop markup tags and collapse the remaining whitespace.
fn strip_tags(html: &str) -> String {
    let text = regex_replace_all!(r"<[^>]+>", html, "");
    regex_replace_all!(r"\s+", text.as_ref(), " ")
        .trim()
        .to_string()
}

/// External link URLs come back scheme-relative at times; give those a
/// scheme.
fn normalize_reference(url: &str) -> String {
    if url.starts_with("http") {
        url.to_string()
    } else {
        format!("http:{}", url)
    }
}

/// The extract parameter selecting how much of the page to return:
/// `sentences` (capped at 10 by the API) wins over `chars` (at least 1);
/// with neither, just the intro section.
fn extract_scope(sentences: u32, chars: u32) -> (String, String) {
    if sentences > 0 {
        pair("exsentences", sentences.min(10))
    } else if chars > 0 {
        pair("exchars", chars.max(1))
    } else {
        pair("exintro", "")
    }
}

/// Plain-text content of the section between `== section_title ==` and the
/// next heading. `None` when the heading is absent.
fn extract_section(content: &str, section_title: &str) -> Option<String> {
    let header = format!("== {} ==", section_title);
    let start = content.find(&header)? + header.len();
    let end = content[start..]
        .find("==")
        .map(|offset| start + offset)
        .unwrap_or(content.len());
    Some(content[start..end].trim_start_matches('=').trim().to_string())
}

impl WikiClient {
    /// Load the page for `title` with default options (auto-suggest on,
    /// redirects followed).
    pub async fn page(&self, title: &str) -> Result<WikiPage> {
        self.page_with(PageLookup::Title(title.to_string()), PageOptions::default())
            .await
    }

    /// Load the page with the given numeric pageid.
    pub async fn page_by_id(&self, pageid: u64) -> Result<WikiPage> {
        self.page_with(PageLookup::PageId(pageid), PageOptions::default())
            .await
    }

    /// Load a page with full control over lookup and options.
    pub async fn page_with(&self, lookup: PageLookup, options: PageOptions) -> Result<WikiPage> {
        let lookup = match lookup {
            PageLookup::Title(title) => {
                require_term(&title, "title")?;
                if options.auto_suggest {
                    let (results, suggestion) = self.search_with_suggestion(&title, 1).await?;
                    match suggestion.or_else(|| results.into_iter().next()) {
                        Some(resolved) => PageLookup::Title(resolved),
                        None => return Err(WikiError::page_not_found(title)),
                    }
                } else {
                    PageLookup::Title(title)
                }
            }
            by_id => by_id,
        };

        let mut page = self.load_page(lookup, options.redirect).await?;
        if options.preload {
            page.preload(self).await?;
        }
        Ok(page)
    }

    /// Resolve several titles concurrently.
    pub async fn page_batch(&self, titles: &[&str]) -> Vec<Result<WikiPage>> {
        future::join_all(titles.iter().map(|title| self.page(title))).await
    }

    /// Plain-text summary of the page matching `title`.
    ///
    /// `sentences` and `chars` behave as in [`WikiPage::get_summary`]; pass
    /// zero for both to get the intro section. Resolution runs through
    /// [`WikiClient::page`], so disambiguation and missing-page checking
    /// apply.
    pub async fn summary(&self, title: &str, sentences: u32, chars: u32) -> Result<String> {
        self.require_extension("TextExtracts", "summary").await?;
        require_term(title, "title")?;
        let page = self.page(title).await?;
        page.get_summary(self, sentences, chars).await
    }

    async fn load_page(&self, lookup: PageLookup, follow_redirect: bool) -> Result<WikiPage> {
        let original_title = match &lookup {
            PageLookup::Title(title) => Some(title.clone()),
            PageLookup::PageId(_) => None,
        };

        let mut params = vec![
            pair("prop", "info|pageprops"),
            pair("inprop", "url"),
            pair("ppprop", "disambiguation"),
            pair("redirects", ""),
        ];
        match &lookup {
            PageLookup::Title(title) => params.push(pair("titles", title)),
            PageLookup::PageId(pageid) => params.push(pair("pageids", *pageid)),
        }

        let raw = self.wiki_request(&params, false).await?;
        let parsed: PageInfoResponse = serde_json::from_value(raw)?;
        let query = parsed.query;
        let info = query
            .pages
            .into_iter()
            .next()
            .ok_or_else(|| WikiError::api("page query returned no pages"))?;

        if info.missing {
            return Err(match lookup {
                PageLookup::Title(title) => WikiError::page_not_found(title),
                PageLookup::PageId(pageid) => WikiError::pageid_not_found(pageid),
            });
        }

        // the API resolved any redirect for us; all that is left is to
        // refuse the result when following was disabled
        if let Some(redirects) = query.redirects.as_ref().filter(|r| !r.is_empty()) {
            if !follow_redirect {
                let title = original_title
                    .or_else(|| info.title.clone())
                    .unwrap_or_default();
                return Err(WikiError::Redirect { title });
            }
            log::debug!(
                "followed redirect {:?} -> {:?}",
                redirects[0].from,
                redirects[0].to
            );
        }

        let title = info
            .title
            .ok_or_else(|| WikiError::api("page info carried no title"))?;

        // only the disambiguation pageprop was requested, so its presence
        // means this is a disambiguation page
        if info.pageprops.is_some() {
            let html = self.rendered_html(&title).await?;
            let (options, details) = parse_disambiguation(&html);
            return Err(WikiError::Disambiguation {
                title,
                options,
                details,
            });
        }

        let pageid = info
            .pageid
            .ok_or_else(|| WikiError::api("page info carried no pageid"))?;
        Ok(WikiPage {
            pageid,
            original_title: original_title.unwrap_or_else(|| title.clone()),
            url: info.fullurl.unwrap_or_default(),
            title,
            ..WikiPage::default()
        })
    }

    /// Rendered HTML of a page via the parse API.
    async fn rendered_html(&self, title: &str) -> Result<String> {
        let params = [
            pair("action", "parse"),
            pair("page", title),
            pair("prop", "text"),
        ];
        let raw = self.wiki_request(&params, false).await?;
        let parsed: ParseResponse = serde_json::from_value(raw)?;
        parsed
            .parse
            .text
            .ok_or_else(|| WikiError::api("parse response carried no text"))
    }

    /// Generic continued query: keep re-issuing the request with the
    /// returned `continue` parameters merged in until none come back.
    ///
    /// With `prop` set, the named list is collected off the first page of
    /// every response; without it the page objects themselves are collected
    /// (generator queries).
    async fn continued_query(
        &self,
        base: &[(String, String)],
        prop: Option<&str>,
    ) -> Result<Vec<Value>> {
        let mut collected = Vec::new();
        let mut cont: Vec<(String, String)> = Vec::new();

        loop {
            let mut params = base.to_vec();
            params.extend(cont.clone());
            let raw = self.wiki_request(&params, false).await?;

            let Some(query) = raw.get("query") else {
                break;
            };
            let pages = query
                .get("pages")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            match prop {
                Some(prop) => {
                    if let Some(items) = pages
                        .first()
                        .and_then(|page| page.get(prop))
                        .and_then(Value::as_array)
                    {
                        collected.extend(items.iter().cloned());
                    }
                }
                None => collected.extend(pages),
            }

            match continuation_params(&raw) {
                Some(next) => cont = next,
                None => break,
            }
        }
        Ok(collected)
    }
}

/// Parameters for the follow-up request of a continued listing, taken from
/// the response's `continue` object. `None` once the listing is complete.
///
/// String tokens go out verbatim; numeric ones are rendered without quotes.
fn continuation_params(response: &Value) -> Option<Vec<(String, String)>> {
    let next = response.get("continue")?.as_object()?;
    Some(
        next.iter()
            .map(|(key, value)| {
                let rendered = value
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| value.to_string());
                (key.clone(), rendered)
            })
            .collect(),
    )
}

impl WikiPage {
    /// Plain-text content of the page, excluding images, tables and other
    /// data. Needs MediaWiki 1.11+ with TextExtracts.
    pub async fn content(&mut self, client: &WikiClient) -> Result<String> {
        if self.content.is_none() {
            client.require_version((1, 11), "content").await?;
            client.require_extension("TextExtracts", "content").await?;

            let params = [
                pair("prop", "extracts|revisions"),
                pair("explaintext", ""),
                pair("rvprop", "ids"),
                pair("titles", &self.title),
            ];
            let raw = client.wiki_request(&params, false).await?;
            let parsed: ExtractResponse = serde_json::from_value(raw)?;
            let page = parsed
                .query
                .pages
                .into_iter()
                .next()
                .ok_or_else(|| WikiError::api("extract query returned no pages"))?;

            if let Some(revision) = page.revisions.as_ref().and_then(|revs| revs.first()) {
                self.revision_id = Some(revision.revid);
                self.parent_id = Some(revision.parentid);
            }
            self.content = Some(page.extract.unwrap_or_default());
        }
        Ok(self.content.clone().unwrap_or_default())
    }

    /// Revision id of the current version of the page. Loaded together
    /// with [`WikiPage::content`].
    pub async fn revision_id(&mut self, client: &WikiClient) -> Result<u64> {
        if self.revision_id.is_none() {
            self.content(client).await?;
        }
        self.revision_id
            .ok_or_else(|| WikiError::api("page carried no revision ids"))
    }

    /// Revision id of the parent of the current revision.
    pub async fn parent_id(&mut self, client: &WikiClient) -> Result<u64> {
        if self.parent_id.is_none() {
            self.content(client).await?;
        }
        self.parent_id
            .ok_or_else(|| WikiError::api("page carried no revision ids"))
    }

    /// Intro-section summary, cached. Same as `get_summary(client, 0, 0)`.
    pub async fn summary(&mut self, client: &WikiClient) -> Result<String> {
        if self.summary.is_none() {
            let summary = self.get_summary(client, 0, 0).await?;
            self.summary = Some(summary);
        }
        Ok(self.summary.clone().unwrap_or_default())
    }

    /// Plain-text summary. `sentences` returns the first n sentences (the
    /// API caps this at 10); otherwise `chars` returns roughly the first n
    /// characters; with both zero the intro section is returned. Needs
    /// TextExtracts.
    pub async fn get_summary(
        &self,
        client: &WikiClient,
        sentences: u32,
        chars: u32,
    ) -> Result<String> {
        client
            .require_extension("TextExtracts", "get_summary")
            .await?;

        let params = [
            pair("prop", "extracts"),
            pair("explaintext", ""),
            extract_scope(sentences, chars),
            pair("titles", &self.title),
        ];
        let raw = client.wiki_request(&params, true).await?;
        let parsed: ExtractResponse = serde_json::from_value(raw)?;
        Ok(parsed
            .query
            .pages
            .into_iter()
            .next()
            .and_then(|page| page.extract)
            .unwrap_or_default())
    }

    /// Full rendered page HTML. Slow on long pages. Needs MediaWiki 1.17+.
    pub async fn html(&mut self, client: &WikiClient) -> Result<String> {
        if self.html.is_none() {
            client.require_version((1, 17), "html").await?;
            let html = client.rendered_html(&self.title).await?;
            self.html = Some(html);
        }
        Ok(self.html.clone().unwrap_or_default())
    }

    /// URLs of the images on the page.
    pub async fn images(&mut self, client: &WikiClient) -> Result<Vec<String>> {
        if self.images.is_none() {
            let base = [
                pair("generator", "images"),
                pair("gimlimit", "max"),
                pair("prop", "imageinfo"),
                pair("iiprop", "url"),
                pair("titles", &self.title),
            ];
            let pages = client.continued_query(&base, None).await?;
            let urls = pages
                .iter()
                .filter_map(|page| page.get("imageinfo"))
                .filter_map(|info| info.get(0))
                .filter_map(|first| first.get("url"))
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect();
            self.images = Some(urls);
        }
        Ok(self.images.clone().unwrap_or_default())
    }

    /// URLs of the external links on the page. May include links that are
    /// not technically cited anywhere. Needs MediaWiki 1.13+.
    pub async fn references(&mut self, client: &WikiClient) -> Result<Vec<String>> {
        if self.references.is_none() {
            client.require_version((1, 13), "references").await?;
            let base = [
                pair("prop", "extlinks"),
                pair("ellimit", "max"),
                pair("titles", &self.title),
            ];
            let items = client.continued_query(&base, Some("extlinks")).await?;
            let urls = items
                .iter()
                .filter_map(|item| item.get("url"))
                .filter_map(Value::as_str)
                .map(normalize_reference)
                .collect();
            self.references = Some(urls);
        }
        Ok(self.references.clone().unwrap_or_default())
    }

    /// Titles of the article-namespace pages this page links to.
    /// Needs MediaWiki 1.13+.
    pub async fn links(&mut self, client: &WikiClient) -> Result<Vec<String>> {
        if self.links.is_none() {
            client.require_version((1, 13), "links").await?;
            let base = [
                pair("prop", "links"),
                pair("plnamespace", 0),
                pair("pllimit", "max"),
                pair("titles", &self.title),
            ];
            let items = client.continued_query(&base, Some("links")).await?;
            self.links = Some(collect_titles(&items));
        }
        Ok(self.links.clone().unwrap_or_default())
    }

    /// Non-hidden categories of the page, without the `Category:` prefix.
    /// Needs MediaWiki 1.14+.
    pub async fn categories(&mut self, client: &WikiClient) -> Result<Vec<String>> {
        if self.categories.is_none() {
            client.require_version((1, 14), "categories").await?;
            let base = [
                pair("prop", "categories"),
                pair("cllimit", "max"),
                pair("clshow", "!hidden"),
                pair("titles", &self.title),
            ];
            let items = client.continued_query(&base, Some("categories")).await?;
            let names = collect_titles(&items)
                .into_iter()
                .map(|title| {
                    title
                        .strip_prefix("Category:")
                        .map(str::to_string)
                        .unwrap_or(title)
                })
                .collect();
            self.categories = Some(names);
        }
        Ok(self.categories.clone().unwrap_or_default())
    }

    /// Titles of all redirects pointing at this page. Needs MediaWiki 1.24+.
    pub async fn redirects(&mut self, client: &WikiClient) -> Result<Vec<String>> {
        if self.redirects.is_none() {
            client.require_version((1, 24), "redirects").await?;
            let base = [
                pair("prop", "redirects"),
                pair("rdprop", "title"),
                pair("rdlimit", "100"),
                pair("titles", &self.title),
            ];
            let items = client.continued_query(&base, Some("redirects")).await?;
            self.redirects = Some(collect_titles(&items));
        }
        Ok(self.redirects.clone().unwrap_or_default())
    }

    /// Article-namespace pages linking here, redirects excluded.
    /// Needs MediaWiki 1.9+.
    pub async fn backlinks(&mut self, client: &WikiClient) -> Result<Vec<String>> {
        if self.backlinks.is_none() {
            client.require_version((1, 9), "backlinks").await?;

            let mut titles = Vec::new();
            let mut cont: Option<String> = None;
            loop {
                let mut params = vec![
                    pair("list", "backlinks"),
                    pair("bltitle", &self.title),
                    pair("bllimit", 500),
                    pair("blfilterredir", "nonredirects"),
                    pair("blnamespace", 0),
                ];
                if let Some(value) = &cont {
                    params.push(pair("blcontinue", value));
                }
                let raw = client.wiki_request(&params, false).await?;
                let parsed: BacklinksResponse = serde_json::from_value(raw)?;
                titles.extend(parsed.query.backlinks.into_iter().map(|entry| entry.title));
                match parsed.cont {
                    Some(next) => cont = Some(next.blcontinue),
                    None => break,
                }
            }
            self.backlinks = Some(titles);
        }
        Ok(self.backlinks.clone().unwrap_or_default())
    }

    /// (latitude, longitude) of the page's primary coordinates, when it has
    /// any. Needs the GeoData extension.
    pub async fn coordinates(&mut self, client: &WikiClient) -> Result<Option<(f64, f64)>> {
        if self.coordinates.is_none() {
            client.require_extension("GeoData", "coordinates").await?;
            let params = [
                pair("prop", "coordinates"),
                pair("colimit", "max"),
                pair("titles", &self.title),
            ];
            let raw = client.wiki_request(&params, false).await?;
            let parsed: CoordinatesResponse = serde_json::from_value(raw)?;
            let coordinate = parsed
                .query
                .and_then(|query| query.pages.into_iter().next())
                .and_then(|page| page.coordinates)
                .and_then(|coords| coords.into_iter().next())
                .map(|coord| (coord.lat, coord.lon));
            self.coordinates = Some(coordinate);
        }
        Ok(self.coordinates.unwrap_or_default())
    }

    /// Section titles from the page's table of contents.
    pub async fn sections(&mut self, client: &WikiClient) -> Result<Vec<String>> {
        if self.sections.is_none() {
            let params = [
                pair("action", "parse"),
                pair("page", &self.title),
                pair("prop", "sections"),
            ];
            let raw = client.wiki_request(&params, false).await?;
            let parsed: ParseResponse = serde_json::from_value(raw)?;
            let lines = parsed
                .parse
                .sections
                .unwrap_or_default()
                .into_iter()
                .map(|section| section.line)
                .collect();
            self.sections = Some(lines);
        }
        Ok(self.sections.clone().unwrap_or_default())
    }

    /// Plain text of one section, or `None` when the heading is absent.
    ///
    /// Only the text between the heading and the next one is returned; a
    /// section made of subsections comes back (nearly) empty.
    pub async fn section(
        &mut self,
        client: &WikiClient,
        section_title: &str,
    ) -> Result<Option<String>> {
        let content = self.content(client).await?;
        Ok(extract_section(&content, section_title))
    }

    /// Eagerly fetch every lazy property, skipping the ones the site's
    /// version or extensions cannot serve.
    pub async fn preload(&mut self, client: &WikiClient) -> Result<()> {
        fn gap(err: &WikiError) -> bool {
            matches!(
                err,
                WikiError::Version { .. } | WikiError::MissingExtension { .. }
            )
        }

        macro_rules! attempt {
            ($call:expr) => {
                match $call.await {
                    Ok(_) => {}
                    Err(err) if gap(&err) => {
                        log::debug!("preload skipped a property: {}", err);
                    }
                    Err(err) => return Err(err),
                }
            };
        }

        attempt!(self.content(client));
        attempt!(self.summary(client));
        attempt!(self.images(client));
        attempt!(self.references(client));
        attempt!(self.links(client));
        attempt!(self.sections(client));
        attempt!(self.redirects(client));
        attempt!(self.coordinates(client));
        attempt!(self.backlinks(client));
        attempt!(self.categories(client));
        Ok(())
    }
}

fn collect_titles(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| item.get("title"))
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DISAMBIG_HTML: &str = r##"
        <ul>
        <li class="toclevel-1 tocsection-1"><a href="#See_also">See also</a></li>
        <li><a href="/wiki/Mercury_(planet)" title="Mercury (planet)">Mercury (planet)</a>, the planet closest to the Sun</li>
        <li><a href="/wiki/Mercury_(element)" title="Mercury (element)">Mercury (element)</a>, a metallic element</li>
        <li>An entry with no link at all</li>
        </ul>
    "##;

    #[test]
    fn disambiguation_options_and_details() {
        let (options, details) = parse_disambiguation(DISAMBIG_HTML);
        assert_eq!(options, vec!["Mercury (planet)", "Mercury (element)"]);
        assert_eq!(details.len(), 2);
        assert_eq!(details[0].title, "Mercury (planet)");
        assert_eq!(
            details[0].description,
            "Mercury (planet), the planet closest to the Sun"
        );
    }

    #[test]
    fn disambiguation_skips_toc_and_linkless_items() {
        let (options, _) = parse_disambiguation(DISAMBIG_HTML);
        assert!(!options.iter().any(|o| o.contains("See also")));
        assert!(!options.iter().any(|o| o.contains("no link")));
    }

    #[test]
    fn strip_tags_collapses_whitespace() {
        assert_eq!(strip_tags("<b>bold</b>  and \n <i>italic</i>"), "bold and italic");
        assert_eq!(strip_tags("plain"), "plain");
    }

    #[test]
    fn references_get_a_scheme() {
        assert_eq!(
            normalize_reference("//example.org/paper"),
            "http://example.org/paper"
        );
        assert_eq!(
            normalize_reference("https://example.org/paper"),
            "https://example.org/paper"
        );
    }

    #[test]
    fn extract_scope_precedence_and_clamps() {
        assert_eq!(extract_scope(3, 0), ("exsentences".into(), "3".into()));
        assert_eq!(extract_scope(25, 0), ("exsentences".into(), "10".into()));
        assert_eq!(extract_scope(0, 200), ("exchars".into(), "200".into()));
        assert_eq!(extract_scope(4, 200), ("exsentences".into(), "4".into()));
        assert_eq!(extract_scope(0, 0), ("exintro".into(), "".into()));
    }

    #[test]
    fn section_extraction() {
        let content = "intro text\n\n== History ==\nIt began long ago.\n\n== Uses ==\nMany.";
        assert_eq!(
            extract_section(content, "History").as_deref(),
            Some("It began long ago.")
        );
        assert_eq!(extract_section(content, "Uses").as_deref(), Some("Many."));
        assert!(extract_section(content, "Trivia").is_none());
    }

    #[test]
    fn section_between_subheadings_is_empty() {
        let content = "== Outer ==\n=== Inner ===\ndetail";
        assert_eq!(extract_section(content, "Outer").as_deref(), Some(""));
    }

    #[test]
    fn continuation_tokens_render_as_plain_params() {
        let response = json!({
            "query": {"pages": []},
            "continue": {
                "plcontinue": "736|0|Algorithm",
                "gimcontinue": 42,
                "continue": "||"
            }
        });
        let params = continuation_params(&response).expect("listing continues");
        assert!(params.contains(&("plcontinue".to_string(), "736|0|Algorithm".to_string())));
        // numeric tokens must not come out JSON-quoted
        assert!(params.contains(&("gimcontinue".to_string(), "42".to_string())));
        assert!(params.contains(&("continue".to_string(), "||".to_string())));
    }

    #[test]
    fn continuation_absent_ends_the_listing() {
        assert!(continuation_params(&json!({"query": {"pages": []}})).is_none());
        assert!(continuation_params(&json!({"continue": "not an object"})).is_none());
    }

    #[test]
    fn pages_compare_by_identity() {
        let a = WikiPage {
            pageid: 1,
            title: "Rust".into(),
            original_title: "rust".into(),
            url: "https://en.wikipedia.org/wiki/Rust".into(),
            ..WikiPage::default()
        };
        let mut b = a.clone();
        b.original_title = "Rust (language)".into();
        assert_eq!(a, b);
        b.pageid = 2;
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn empty_batch_resolves_to_nothing() {
        let client = crate::WikiClient::new_default().expect("client");
        assert!(client.page_batch(&[]).await.is_empty());
    }

    #[test]
    fn default_page_options() {
        let options = PageOptions::default();
        assert!(options.auto_suggest);
        assert!(options.redirect);
        assert!(!options.preload);
    }
}
