//! Category listing and recursive category-tree traversal.
//!
//! `categorymembers` needs MediaWiki 1.17+. `categorytree` issues one page
//! load and one member listing per category it visits; enable rate limiting
//! before walking a large tree.

use std::collections::HashMap;
use std::time::Duration;

use async_recursion::async_recursion;
use serde::Serialize;

use crate::client::{WikiClient, api_error_of, pair};
use crate::definitions::{CategoryMember, CategoryMembersResponse};
use crate::error::{Result, WikiError};
use crate::search::require_term;

/// Transient failures while walking a tree are retried this many times,
/// with a one second pause between attempts.
const TREE_FETCH_ATTEMPTS: u32 = 3;

/// One category in a tree built by [`WikiClient::categorytree`].
#[derive(Debug, Clone, Serialize)]
pub struct CategoryTreeNode {
    /// Levels below the requested root (the root itself is 0).
    pub depth: u32,
    /// Member subcategories. `None` marks subcategories cut off by the
    /// depth limit.
    #[serde(rename = "sub-categories")]
    pub sub_categories: HashMap<String, Option<CategoryTreeNode>>,
    /// Member pages of the category.
    pub links: Vec<String>,
    /// Categories the category page itself belongs to.
    #[serde(rename = "parent-categories")]
    pub parent_categories: Vec<String>,
}

/// Everything the tree walk needs to know about one category, cached so a
/// category appearing twice in the tree is only fetched once.
#[derive(Debug, Clone, Default)]
struct CategoryInfo {
    parents: Vec<String>,
    pages: Vec<String>,
    subcategories: Vec<String>,
}

/// Split raw members into page titles and subcategory names, stripping the
/// `Category:` prefix off the latter.
fn split_members(members: Vec<CategoryMember>) -> (Vec<String>, Vec<String>) {
    let mut pages = Vec::new();
    let mut subcategories = Vec::new();
    for member in members {
        match member.member_type.as_str() {
            "page" => pages.push(member.title),
            "subcat" => {
                let name = member
                    .title
                    .strip_prefix("Category:")
                    .map(str::to_string)
                    .unwrap_or(member.title);
                subcategories.push(name);
            }
            _ => {}
        }
    }
    (pages, subcategories)
}

/// Whether children at `level` fall outside a positive depth limit.
fn truncate_children(depth: i64, level: u32) -> bool {
    depth > 0 && u64::from(level) >= depth as u64
}

impl WikiClient {
    /// Pages and subcategories belonging to `category` (no `Category:`
    /// prefix on the argument).
    ///
    /// With `subcategories` set, `subcat` members are collected separately;
    /// otherwise only pages are requested and the second list stays empty.
    pub async fn categorymembers(
        &self,
        category: &str,
        results: u32,
        subcategories: bool,
    ) -> Result<(Vec<String>, Vec<String>)> {
        self.require_version((1, 17), "categorymembers").await?;
        require_term(category, "category")?;

        let params = [
            pair("list", "categorymembers"),
            pair("cmprop", "ids|title|type"),
            pair("cmtype", if subcategories { "page|subcat" } else { "page" }),
            pair("cmlimit", results),
            pair("cmtitle", format!("Category:{}", category)),
        ];
        let raw = self.wiki_request(&params, true).await?;
        if let Some(err) = api_error_of(&raw, category) {
            return Err(err);
        }

        let parsed: CategoryMembersResponse = serde_json::from_value(raw)?;
        Ok(split_members(parsed.query.categorymembers))
    }

    /// Build a category tree for each of the given root categories.
    ///
    /// `depth` limits how many levels are expanded; subcategories at the
    /// limit are recorded by name with no subtree. A depth of zero or less
    /// walks the whole tree. Expect a long run on broad categories.
    pub async fn categorytree(
        &self,
        categories: &[&str],
        depth: i64,
    ) -> Result<HashMap<String, CategoryTreeNode>> {
        let mut tree = HashMap::new();
        let mut visited: HashMap<String, CategoryInfo> = HashMap::new();
        for category in categories {
            let node = self.category_tree_node(category, depth, 0, &mut visited).await?;
            tree.insert(category.to_string(), node);
        }
        Ok(tree)
    }

    #[async_recursion]
    async fn category_tree_node(
        &self,
        category: &str,
        depth: i64,
        level: u32,
        visited: &mut HashMap<String, CategoryInfo>,
    ) -> Result<CategoryTreeNode> {
        if !visited.contains_key(category) {
            let info = self.category_info_with_retry(category).await?;
            visited.insert(category.to_string(), info);
        }
        let info = visited.get(category).cloned().unwrap_or_default();

        let mut node = CategoryTreeNode {
            depth: level,
            sub_categories: HashMap::new(),
            links: info.pages,
            parent_categories: info.parents,
        };

        if truncate_children(depth, level) {
            for sub in info.subcategories {
                node.sub_categories.insert(sub, None);
            }
        } else {
            for sub in info.subcategories {
                let child = self
                    .category_tree_node(&sub, depth, level + 1, visited)
                    .await?;
                node.sub_categories.insert(sub, Some(child));
            }
        }
        Ok(node)
    }

    /// Fetch a category's parents and members, retrying transient failures.
    /// A missing category page is final and propagates at once.
    async fn category_info_with_retry(&self, category: &str) -> Result<CategoryInfo> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.category_info(category).await {
                Ok(info) => return Ok(info),
                Err(err @ WikiError::PageNotFound { .. }) => return Err(err),
                Err(err) if attempt >= TREE_FETCH_ATTEMPTS => return Err(err),
                Err(err) => {
                    log::warn!(
                        "fetching category {:?} failed ({}), retrying",
                        category,
                        err
                    );
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }

    async fn category_info(&self, category: &str) -> Result<CategoryInfo> {
        let mut page = self.page(&format!("Category:{}", category)).await?;
        let parents = page.categories(self).await?;
        let (pages, subcategories) = self.categorymembers(category, 500, true).await?;
        Ok(CategoryInfo {
            parents,
            pages,
            subcategories,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(title: &str, member_type: &str) -> CategoryMember {
        CategoryMember {
            pageid: Some(1),
            title: title.to_string(),
            member_type: member_type.to_string(),
        }
    }

    #[test]
    fn members_split_into_pages_and_subcats() {
        let (pages, subcats) = split_members(vec![
            member("Physics", "page"),
            member("Category:Mechanics", "subcat"),
            member("File:Atom.svg", "file"),
            member("Optics", "page"),
        ]);
        assert_eq!(pages, vec!["Physics", "Optics"]);
        assert_eq!(subcats, vec!["Mechanics"]);
    }

    #[test]
    fn subcat_without_prefix_kept_as_is() {
        let (_, subcats) = split_members(vec![member("Mechanics", "subcat")]);
        assert_eq!(subcats, vec!["Mechanics"]);
    }

    #[test]
    fn depth_limit_cuts_at_level() {
        // depth 2: levels 0 and 1 expand, level 2 is recorded but not walked
        assert!(!truncate_children(2, 0));
        assert!(!truncate_children(2, 1));
        assert!(truncate_children(2, 2));
        assert!(truncate_children(2, 5));
    }

    #[test]
    fn non_positive_depth_means_unbounded() {
        assert!(!truncate_children(0, 100));
        assert!(!truncate_children(-1, 7));
    }

    #[test]
    fn tree_node_serializes_with_dashed_keys() {
        let node = CategoryTreeNode {
            depth: 1,
            sub_categories: HashMap::from([("Left".to_string(), None)]),
            links: vec!["Page".to_string()],
            parent_categories: vec!["Parent".to_string()],
        };
        let json = serde_json::to_value(&node).expect("should serialize");
        assert!(json.get("sub-categories").is_some());
        assert!(json.get("parent-categories").is_some());
        assert_eq!(json["depth"], 1);
        assert!(json["sub-categories"]["Left"].is_null());
    }
}
