//! Async client for the MediaWiki query API, tuned for Wikipedia.
//!
//! Search, page retrieval with redirect and disambiguation handling,
//! geosearch, category traversal, language switching, rate limiting and
//! response caching.
//!
//! ```no_run
//! use wiki_client::WikiClient;
//!
//! # async fn run() -> wiki_client::Result<()> {
//! let client = WikiClient::new_default()?;
//! let hits = client.search("Rust programming language", 5).await?;
//!
//! let mut page = client.page(&hits[0]).await?;
//! println!("{}", page.summary(&client).await?);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod category;
pub mod client;
pub mod definitions;
pub mod error;
pub mod page;
pub mod search;
pub mod site;

// Re-export the types most callers need.
pub use category::CategoryTreeNode;
pub use client::{DEFAULT_API_URL, WikiClient, WikiClientConfig, WikiClientConfigBuilder};
pub use error::{DisambiguationEntry, Result, WikiError};
pub use page::{PageLookup, PageOptions, WikiPage};
pub use site::SiteInfo;
