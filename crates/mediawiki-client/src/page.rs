//! Page accessor.
//!
//! A [`WikiPage`] holds the identity of a page resolved through the API and
//! lazily fetches its categories and extracts through the owning client.

use crate::api::{Params, QueryResponse};
use crate::client::MediaWiki;
use crate::error::{check_error_response, MediaWikiError, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// How a page is addressed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRef {
    Title(String),
    PageId(u64),
}

impl PageRef {
    fn describe(&self) -> String {
        match self {
            PageRef::Title(title) => title.clone(),
            PageRef::PageId(id) => format!("Page id \"{}\"", id),
        }
    }
}

impl From<&str> for PageRef {
    fn from(title: &str) -> Self {
        PageRef::Title(title.to_string())
    }
}

impl From<String> for PageRef {
    fn from(title: String) -> Self {
        PageRef::Title(title)
    }
}

impl From<u64> for PageRef {
    fn from(pageid: u64) -> Self {
        PageRef::PageId(pageid)
    }
}

#[derive(Debug, Deserialize)]
struct PagesQuery {
    #[serde(default)]
    redirects: Vec<RedirectRecord>,
    #[serde(default)]
    pages: BTreeMap<String, PageRecord>,
}

#[derive(Debug, Deserialize)]
struct RedirectRecord {
    from: String,
}

#[derive(Debug, Deserialize)]
struct PageRecord {
    #[serde(default)]
    pageid: Option<u64>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    missing: Option<Value>,
    #[serde(default)]
    invalid: Option<Value>,
    #[serde(default)]
    redirect: Option<Value>,
    #[serde(default)]
    fullurl: Option<String>,
    #[serde(default)]
    categories: Vec<CategoryLink>,
    #[serde(default)]
    extract: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CategoryLink {
    title: String,
}

/// A page that exists on the wiki
#[derive(Debug, Clone)]
pub struct WikiPage {
    pub title: String,
    pub pageid: u64,
    pub url: Option<String>,
    /// Title the request was redirected from, if any
    pub redirected_from: Option<String>,
    categories: Option<Vec<String>>,
    summary: Option<String>,
}

impl WikiPage {
    /// Resolve a page.
    ///
    /// With `redirect` false a redirect page is an error rather than being
    /// followed. `preload` fetches categories and summary up front.
    pub async fn load(
        client: &mut MediaWiki,
        target: PageRef,
        redirect: bool,
        preload: bool,
    ) -> Result<Self> {
        let mut params = Params::new()
            .with("prop", "info|pageprops")
            .with("inprop", "url")
            .with("ppprop", "disambiguation");
        match &target {
            PageRef::Title(title) => params.insert("titles", title),
            PageRef::PageId(id) => params.insert("pageids", id),
        }
        if redirect {
            params.insert("redirects", "");
        }

        let describe = target.describe();
        let response = client.executor_mut().get(params).await?;
        check_error_response(&response, &describe)?;

        let decoded: QueryResponse<PagesQuery> = serde_json::from_value(response)?;
        let query = decoded.query;
        let record = query
            .pages
            .into_values()
            .next()
            .ok_or_else(|| MediaWikiError::PageNotFound(describe.clone()))?;

        if record.missing.is_some() || record.invalid.is_some() {
            return Err(MediaWikiError::PageNotFound(describe));
        }
        if !redirect && record.redirect.is_some() {
            return Err(MediaWikiError::Redirect(describe));
        }

        let (Some(title), Some(pageid)) = (record.title, record.pageid) else {
            return Err(MediaWikiError::PageNotFound(describe));
        };

        let mut page = Self {
            title,
            pageid,
            url: record.fullurl,
            redirected_from: query.redirects.into_iter().next().map(|r| r.from),
            categories: None,
            summary: None,
        };
        debug!(title = %page.title, pageid = page.pageid, "Loaded page");

        if preload {
            page.categories(client).await?;
            page.summary(client).await?;
        }
        Ok(page)
    }

    /// Non-hidden categories of the page, without the category prefix
    pub async fn categories(&mut self, client: &mut MediaWiki) -> Result<&[String]> {
        if self.categories.is_none() {
            let prefix = client.category_prefix().to_string();
            let title = self.title.clone();
            let params = Params::new()
                .with("prop", "categories")
                .with("cllimit", "max")
                .with("clshow", "!hidden")
                .with("titles", &self.title);

            let categories = client
                .executor_mut()
                .paginate(params, "categories", "cllimit", None, |response| {
                    check_error_response(response, &title)?;
                    let decoded: QueryResponse<PagesQuery> =
                        serde_json::from_value(response.clone())?;
                    Ok(decoded
                        .query
                        .pages
                        .into_values()
                        .flat_map(|page| page.categories)
                        .map(|link| strip_category_prefix(&prefix, &link.title))
                        .collect())
                })
                .await?;
            self.categories = Some(categories);
        }
        Ok(self.categories.as_deref().unwrap_or(&[]))
    }

    /// Plain-text introduction of the page
    pub async fn summary(&mut self, client: &mut MediaWiki) -> Result<&str> {
        if self.summary.is_none() {
            let summary = self.summarize(client, 0, 0).await?;
            self.summary = Some(summary);
        }
        Ok(self.summary.as_deref().unwrap_or_default())
    }

    /// Plain-text summary limited to `sentences`, else `chars`; with both
    /// zero the whole introduction is returned
    pub async fn summarize(
        &self,
        client: &mut MediaWiki,
        sentences: u32,
        chars: u32,
    ) -> Result<String> {
        let mut params = Params::new()
            .with("prop", "extracts")
            .with("explaintext", "")
            .with("titles", &self.title);
        if sentences > 0 {
            params.insert("exsentences", sentences.min(10));
        } else if chars > 0 {
            params.insert("exchars", chars);
        } else {
            params.insert("exintro", "");
        }

        let response = client.executor_mut().get(params).await?;
        check_error_response(&response, &self.title)?;
        let decoded: QueryResponse<PagesQuery> = serde_json::from_value(response)?;
        Ok(decoded
            .query
            .pages
            .into_values()
            .find_map(|page| page.extract)
            .unwrap_or_default())
    }
}

/// Prefix used on category page titles
pub(crate) fn category_title(prefix: &str, category: &str) -> String {
    format!("{}:{}", prefix, category)
}

/// Drop the `<prefix>:` from a category title
pub(crate) fn strip_category_prefix(prefix: &str, title: &str) -> String {
    title
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix(':'))
        .unwrap_or(title)
        .to_string()
}
