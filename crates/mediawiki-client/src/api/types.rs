//! MediaWiki API request parameters and response types.
//!
//! Responses are decoded from `serde_json::Value` into these records once the
//! error envelope has been checked.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt::Display;

/// Flat key/value request parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: &str, value: impl Display) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Display) {
        self.0.insert(key.to_string(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Merge a continuation object into the parameters
    pub fn merge_continuation(&mut self, continuation: &Map<String, Value>) {
        for (key, value) in continuation {
            let value = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            self.0.insert(key.clone(), value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// `{"query": ...}` envelope
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse<T> {
    pub query: T,
}

/// Any record that only carries a title
#[derive(Debug, Clone, Deserialize)]
pub struct TitleRecord {
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RandomQuery {
    pub random: Vec<TitleRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AllPagesQuery {
    pub allpages: Vec<TitleRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrefixSearchQuery {
    pub prefixsearch: Vec<TitleRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeoSearchQuery {
    pub geosearch: Vec<TitleRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    pub search: Vec<TitleRecord>,
    #[serde(default)]
    pub searchinfo: Option<SearchInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchInfo {
    #[serde(default)]
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryMembersQuery {
    pub categorymembers: Vec<CategoryMemberRecord>,
}

/// One entry of a `list=categorymembers` response
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryMemberRecord {
    pub title: String,
    /// `page`, `subcat` or `file`
    #[serde(rename = "type")]
    pub member_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokensQuery {
    pub tokens: LoginTokens,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginTokens {
    pub logintoken: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub login: LoginResult,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResult {
    pub result: String,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LanguagesQuery {
    pub languages: Vec<LanguageRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LanguageRecord {
    pub code: String,
    #[serde(rename = "*")]
    pub name: String,
}

/// Search hits plus the optional spelling suggestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResults {
    pub titles: Vec<String>,
    /// Only populated when a suggestion was requested
    pub suggestion: Option<String>,
}

/// One opensearch hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenSearchResult {
    pub title: String,
    pub summary: String,
    pub url: String,
}

/// Pages and subcategories of a category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMembers {
    pub pages: Vec<String>,
    /// Empty unless subcategories were requested
    pub subcategories: Vec<String>,
}

/// Geosearch request; either `title` or both coordinates must be set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoQuery {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    /// Search radius in meters
    pub radius: u32,
    /// Page to search around; takes precedence over the coordinates
    pub title: Option<String>,
    pub auto_suggest: bool,
    pub results: Option<usize>,
}

impl Default for GeoQuery {
    fn default() -> Self {
        Self {
            latitude: None,
            longitude: None,
            radius: 1000,
            title: None,
            auto_suggest: true,
            results: Some(10),
        }
    }
}

impl GeoQuery {
    pub fn coordinates(latitude: impl Into<String>, longitude: impl Into<String>) -> Self {
        Self {
            latitude: Some(latitude.into()),
            longitude: Some(longitude.into()),
            ..Default::default()
        }
    }

    pub fn around_page(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }
}
