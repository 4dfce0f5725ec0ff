//! Category tree construction.
//!
//! A tree build walks subcategories breadth-first from the requested roots.
//! Each category is fetched at most once per build (its page for the parent
//! categories, then its members) and the nested result is assembled from
//! those fetches afterwards.

use crate::client::MediaWiki;
use crate::error::{MediaWikiError, Result};
use crate::page::{category_title, PageRef, WikiPage};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Failed fetches tolerated per category before the build gives up
pub const MAX_FETCH_RETRIES: u32 = 10;

/// Category name -> node
pub type CategoryTree = BTreeMap<String, CategoryTreeNode>;

/// One category in a tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTreeNode {
    /// Distance from the root category
    pub depth: u32,
    /// Titles of the member pages
    pub links: Vec<String>,
    #[serde(rename = "parent-categories")]
    pub parent_categories: Vec<String>,
    /// Subcategories; `None` where the depth limit stopped expansion
    #[serde(rename = "sub-categories")]
    pub sub_categories: BTreeMap<String, Option<CategoryTreeNode>>,
}

/// One or many root categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Categories {
    One(String),
    Many(Vec<String>),
}

impl From<&str> for Categories {
    fn from(name: &str) -> Self {
        Categories::One(name.to_string())
    }
}

impl From<String> for Categories {
    fn from(name: String) -> Self {
        Categories::One(name)
    }
}

impl From<Vec<String>> for Categories {
    fn from(names: Vec<String>) -> Self {
        Categories::Many(names)
    }
}

impl From<Vec<&str>> for Categories {
    fn from(names: Vec<&str>) -> Self {
        Categories::Many(names.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for Categories {
    fn from(names: &[&str]) -> Self {
        Categories::Many(names.iter().map(|s| s.to_string()).collect())
    }
}

/// Check the arguments of a tree build and return the non-blank roots
pub fn validate(categories: &Categories, depth: Option<u32>) -> Result<Vec<String>> {
    let names: Vec<String> = match categories {
        Categories::One(name) => vec![name.clone()],
        Categories::Many(names) => names.clone(),
    };

    if names.len() == 1 && names[0].trim().is_empty() {
        return Err(MediaWikiError::Validation(format!(
            "CategoryTree: Parameter 'category' must either be a list of one or more categories or a string; provided: '{}'",
            names[0]
        )));
    }

    if depth == Some(0) {
        return Err(MediaWikiError::Validation(
            "CategoryTree: Parameter 'depth' must be either None (for the full tree) or be greater than 0"
                .to_string(),
        ));
    }

    Ok(names
        .into_iter()
        .filter(|name| !name.trim().is_empty())
        .collect())
}

/// Data fetched for one category
#[derive(Debug, Clone, Default)]
struct ResolvedCategory {
    pages: Vec<String>,
    subcategories: Vec<String>,
}

/// State of one tree build
pub struct CategoryTreeBuilder {
    /// Levels below the root to expand (None = everything)
    depth: Option<u32>,
    retry_delay: Duration,
    /// Parent categories of every category fetched so far
    parents: HashMap<String, Vec<String>>,
    /// Members of every category fetched so far
    members: HashMap<String, ResolvedCategory>,
}

impl CategoryTreeBuilder {
    pub fn new(depth: Option<u32>, retry_delay: Duration) -> Self {
        Self {
            depth,
            retry_delay,
            parents: HashMap::new(),
            members: HashMap::new(),
        }
    }

    /// Whether subcategories of a node at `level` are expanded
    fn expands(&self, level: u32) -> bool {
        self.depth.map_or(true, |depth| level < depth)
    }

    /// Fetch everything the roots need, then assemble the tree
    pub async fn build(mut self, client: &mut MediaWiki, roots: &[String]) -> Result<CategoryTree> {
        info!(roots = ?roots, depth = ?self.depth, "Building category tree");

        let mut queue: VecDeque<(String, u32)> = roots.iter().map(|r| (r.clone(), 0)).collect();
        let mut seen: HashSet<String> = roots.iter().cloned().collect();

        while let Some((category, level)) = queue.pop_front() {
            if !self.members.contains_key(&category) {
                self.resolve(client, &category).await?;
            }
            if !self.expands(level) {
                continue;
            }
            let subcategories = self
                .members
                .get(&category)
                .map(|m| m.subcategories.clone())
                .unwrap_or_default();
            for sub in subcategories {
                if seen.insert(sub.clone()) {
                    queue.push_back((sub, level + 1));
                }
            }
        }

        let mut tree = CategoryTree::new();
        for root in roots {
            let mut path = Vec::new();
            let node = self.assemble(root, 0, &mut path);
            tree.insert(root.clone(), node);
        }

        info!(
            roots = roots.len(),
            categories_fetched = self.members.len(),
            "Category tree complete"
        );
        Ok(tree)
    }

    /// Fetch a category with bounded retries
    async fn resolve(&mut self, client: &mut MediaWiki, category: &str) -> Result<()> {
        let mut attempts = 0;
        loop {
            match self.fetch(client, category).await {
                Ok(()) => return Ok(()),
                Err(e) if !e.is_retryable() => {
                    debug!(category = category, error = %e, "Category fetch is final");
                    return Err(MediaWikiError::PageNotFound(category_title(
                        client.category_prefix(),
                        category,
                    )));
                }
                Err(e) => {
                    attempts += 1;
                    if attempts > MAX_FETCH_RETRIES {
                        return Err(MediaWikiError::CategoryTree(category.to_string()));
                    }
                    warn!(
                        category = category,
                        attempt = attempts,
                        error = %e,
                        "Category fetch failed, retrying"
                    );
                    sleep(self.retry_delay).await;
                }
            }
        }
    }

    async fn fetch(&mut self, client: &mut MediaWiki, category: &str) -> Result<()> {
        let title = category_title(client.category_prefix(), category);
        let mut page = WikiPage::load(client, PageRef::Title(title), true, false).await?;
        let parents = page.categories(client).await?.to_vec();
        let members = client.categorymembers(category, None, true).await?;

        debug!(
            category = category,
            pages = members.pages.len(),
            subcategories = members.subcategories.len(),
            "Fetched category"
        );

        self.parents.insert(category.to_string(), parents);
        self.members.insert(
            category.to_string(),
            ResolvedCategory {
                pages: members.pages,
                subcategories: members.subcategories,
            },
        );
        Ok(())
    }

    /// Build the node for `category` at `level`; `path` holds its ancestors.
    ///
    /// Without a depth limit a subcategory that is already an ancestor is
    /// left as a placeholder so cycles end.
    fn assemble(&self, category: &str, level: u32, path: &mut Vec<String>) -> CategoryTreeNode {
        let resolved = self.members.get(category).cloned().unwrap_or_default();
        let mut node = CategoryTreeNode {
            depth: level,
            links: resolved.pages,
            parent_categories: self.parents.get(category).cloned().unwrap_or_default(),
            sub_categories: BTreeMap::new(),
        };

        path.push(category.to_string());
        for sub in &resolved.subcategories {
            let cycle = self.depth.is_none() && path.contains(sub);
            let child = if self.expands(level) && !cycle {
                Some(self.assemble(sub, level + 1, path))
            } else {
                None
            };
            node.sub_categories.insert(sub.clone(), child);
        }
        path.pop();

        node
    }
}
