//! Error types for the wiki client.
//!
//! All failure modes surfaced by the crate live in one enum so callers can
//! match on the situation they care about (missing page, disambiguation,
//! stale MediaWiki version, transport trouble) and propagate the rest.
//!
//! Exported items:
//! - `WikiError` - main error enum.
//! - `DisambiguationEntry` - one option parsed off a disambiguation page.
//! - `Result<T>` - alias `std::result::Result<T, WikiError>`.

use std::error::Error;
use std::fmt;

/// The canonical result type used across the crate.
pub type Result<T> = std::result::Result<T, WikiError>;

/// One entry parsed from a disambiguation page listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisambiguationEntry {
    /// Title of the page the entry links to.
    pub title: String,
    /// The full text of the listing line.
    pub description: String,
}

/// Everything that can go wrong talking to a MediaWiki site.
#[derive(Debug)]
pub enum WikiError {
    /// The API returned an error envelope we have no better mapping for.
    Api {
        info: String,
    },
    /// No page matched the given title or pageid.
    PageNotFound {
        title: Option<String>,
        pageid: Option<u64>,
    },
    /// The query resolved to a disambiguation page.
    Disambiguation {
        title: String,
        /// Titles the query may refer to.
        options: Vec<String>,
        /// Structured title + line text for each option.
        details: Vec<DisambiguationEntry>,
    },
    /// A title resolved to a redirect while redirect following was disabled.
    Redirect {
        title: String,
    },
    /// The request (or the API itself) timed out.
    Timeout {
        query: String,
    },
    /// The configured URL does not answer like a MediaWiki API endpoint.
    InvalidApiUrl {
        api_url: String,
    },
    /// The API URL does not contain a `/{prefix}.` segment to rewrite.
    Language {
        api_url: String,
        old_prefix: String,
        new_prefix: String,
    },
    /// The site's MediaWiki version is too old for the requested operation.
    Version {
        api_url: String,
        current: String,
        required: String,
        operation: String,
    },
    /// The site does not have the extension the operation relies on.
    MissingExtension {
        api_url: String,
        extension: String,
        operation: String,
    },
    /// A caller-supplied argument was unusable (empty query, zero pages...).
    InvalidArgument {
        msg: String,
    },
    /// Transport-level failure out of reqwest or its middleware.
    Http {
        source: Box<dyn Error + Send + Sync + 'static>,
    },
    /// The response body was not the JSON we expected.
    Json {
        source: serde_json::Error,
    },
    /// A URL could not be built or parsed.
    Url {
        source: url::ParseError,
    },
}

impl WikiError {
    /// API error envelope with an unknown `info` string.
    pub fn api<S: Into<String>>(info: S) -> Self {
        WikiError::Api { info: info.into() }
    }

    /// Page lookup by title came up empty.
    pub fn page_not_found<S: Into<String>>(title: S) -> Self {
        WikiError::PageNotFound {
            title: Some(title.into()),
            pageid: None,
        }
    }

    /// Page lookup by pageid came up empty.
    pub fn pageid_not_found(pageid: u64) -> Self {
        WikiError::PageNotFound {
            title: None,
            pageid: Some(pageid),
        }
    }

    pub fn timeout<S: Into<String>>(query: S) -> Self {
        WikiError::Timeout {
            query: query.into(),
        }
    }

    pub fn invalid_arg<S: Into<String>>(msg: S) -> Self {
        WikiError::InvalidArgument { msg: msg.into() }
    }

    /// Short name of the error kind, handy for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            WikiError::Api { .. } => "Api",
            WikiError::PageNotFound { .. } => "PageNotFound",
            WikiError::Disambiguation { .. } => "Disambiguation",
            WikiError::Redirect { .. } => "Redirect",
            WikiError::Timeout { .. } => "Timeout",
            WikiError::InvalidApiUrl { .. } => "InvalidApiUrl",
            WikiError::Language { .. } => "Language",
            WikiError::Version { .. } => "Version",
            WikiError::MissingExtension { .. } => "MissingExtension",
            WikiError::InvalidArgument { .. } => "InvalidArgument",
            WikiError::Http { .. } => "Http",
            WikiError::Json { .. } => "Json",
            WikiError::Url { .. } => "Url",
        }
    }
}

impl fmt::Display for WikiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WikiError::Api { info } => {
                write!(f, "an unknown error occured: \"{}\"", info)
            }
            WikiError::PageNotFound { title, pageid } => match title {
                Some(t) => write!(f, "\"{}\" does not match any pages. Try another query!", t),
                None => write!(
                    f,
                    "page id \"{}\" does not match any pages. Try another id!",
                    pageid.unwrap_or_default()
                ),
            },
            WikiError::Disambiguation { title, options, .. } => {
                write!(f, "\"{}\" may refer to: \n  {}", title, options.join("\n  "))
            }
            WikiError::Redirect { title } => write!(
                f,
                "\"{}\" resulted in a redirect. Enable redirect following to resolve automatically.",
                title
            ),
            WikiError::Timeout { query } => write!(
                f,
                "searching for \"{}\" resulted in a timeout. Try again in a few seconds, and make sure you have rate limiting enabled.",
                query
            ),
            WikiError::InvalidApiUrl { api_url } => {
                write!(f, "{} is not a valid MediaWiki API URL", api_url)
            }
            WikiError::Language {
                api_url,
                old_prefix,
                new_prefix,
            } => write!(
                f,
                "unable to update {} from {} to {} since the URL does not match the '/(prefix).' pattern. For example: https://en.wikipedia.org/w/api.php",
                api_url, old_prefix, new_prefix
            ),
            WikiError::Version {
                api_url,
                current,
                required,
                operation,
            } => write!(
                f,
                "method {} requires API version {}+. URL [{}] currently supports API version {}.",
                operation, required, api_url, current
            ),
            WikiError::MissingExtension {
                api_url,
                extension,
                operation,
            } => write!(
                f,
                "method {} requires the {} extension to be available. URL [{}] currently does not have it installed.",
                operation, extension, api_url
            ),
            WikiError::InvalidArgument { msg } => write!(f, "invalid argument: {}", msg),
            WikiError::Http { source } => write!(f, "http error: {}", source),
            WikiError::Json { source } => write!(f, "json decode error: {}", source),
            WikiError::Url { source } => write!(f, "url error: {}", source),
        }
    }
}

impl Error for WikiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WikiError::Http { source } => Some(source.as_ref()),
            WikiError::Json { source } => Some(source),
            WikiError::Url { source } => Some(source),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for WikiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return WikiError::Timeout {
                query: e
                    .url()
                    .map(|u| u.to_string())
                    .unwrap_or_else(|| String::from("<request>")),
            };
        }
        WikiError::Http {
            source: Box::new(e),
        }
    }
}

impl From<reqwest_middleware::Error> for WikiError {
    fn from(e: reqwest_middleware::Error) -> Self {
        match e {
            reqwest_middleware::Error::Reqwest(inner) => inner.into(),
            other => WikiError::Http {
                source: Box::new(other),
            },
        }
    }
}

impl From<serde_json::Error> for WikiError {
    fn from(e: serde_json::Error) -> Self {
        WikiError::Json { source: e }
    }
}

impl From<url::ParseError> for WikiError {
    fn from(e: url::ParseError) -> Self {
        WikiError::Url { source: e }
    }
}
