//! Fake MediaWiki API served through wiremock.
//!
//! `FakeWiki` answers the subset of the action API the client uses from an
//! in-memory set of pages and categories. Requests are dispatched on their
//! merged query string and form body.

#![allow(dead_code)]

use mediawiki_client::{ClientConfig, MediaWiki};
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use wiremock::matchers::path_regex;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const API_PATH: &str = "/w/api.php";
pub const LOGIN_TOKEN: &str = "5e1f7c+\\";
pub const PASSWORD: &str = "hunter2";

#[derive(Debug, Clone, Default)]
pub struct FakePage {
    pub pageid: u64,
    pub extract: String,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeCategory {
    pub pages: Vec<String>,
    pub subcategories: Vec<String>,
    pub parents: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeWiki {
    pages: BTreeMap<String, FakePage>,
    categories: BTreeMap<String, FakeCategory>,
    redirects: BTreeMap<String, String>,
    suggestions: BTreeMap<String, String>,
    broken: BTreeSet<String>,
    repeat_continuation: bool,
    arrivals: Arc<Mutex<Vec<Instant>>>,
}

impl FakeWiki {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, title: &str, extract: &str, categories: &[&str]) -> Self {
        let pageid = 100 + self.pages.len() as u64;
        self.pages.insert(
            title.to_string(),
            FakePage {
                pageid,
                extract: extract.to_string(),
                categories: categories.iter().map(|c| c.to_string()).collect(),
            },
        );
        self
    }

    pub fn category(mut self, name: &str, pages: &[&str], subcategories: &[&str]) -> Self {
        let entry = self.categories.entry(name.to_string()).or_default();
        entry.pages = pages.iter().map(|p| p.to_string()).collect();
        entry.subcategories = subcategories.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn parents(mut self, name: &str, parents: &[&str]) -> Self {
        let entry = self.categories.entry(name.to_string()).or_default();
        entry.parents = parents.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn redirect(mut self, from: &str, to: &str) -> Self {
        self.redirects.insert(from.to_string(), to.to_string());
        self
    }

    pub fn suggestion(mut self, query: &str, suggestion: &str) -> Self {
        self.suggestions
            .insert(query.to_string(), suggestion.to_string());
        self
    }

    /// Member listings of this category fail with a non-JSON 500
    pub fn broken(mut self, name: &str) -> Self {
        self.categories.entry(name.to_string()).or_default();
        self.broken.insert(name.to_string());
        self
    }

    /// Every member listing hands out the same continuation token
    pub fn repeat_continuation(mut self) -> Self {
        self.repeat_continuation = true;
        self
    }

    /// Arrival times of every request, shared with the mounted responder
    pub fn arrivals(&self) -> Arc<Mutex<Vec<Instant>>> {
        Arc::clone(&self.arrivals)
    }

    fn lookup(&self, title: &str) -> Option<(u64, String)> {
        if let Some(page) = self.pages.get(title) {
            return Some((page.pageid, title.to_string()));
        }
        let name = title.strip_prefix("Category:")?;
        let index = self.categories.keys().position(|k| k == name)?;
        Some((10_000 + index as u64, title.to_string()))
    }

    fn page_record(&self, title: &str) -> (String, Value) {
        match self.lookup(title) {
            Some((pageid, title)) => {
                let ns = if title.starts_with("Category:") { 14 } else { 0 };
                (
                    pageid.to_string(),
                    json!({
                        "pageid": pageid,
                        "ns": ns,
                        "title": title,
                        "fullurl": format!("https://fake.wiki/wiki/{}", title.replace(' ', "_")),
                    }),
                )
            }
            None => (
                "-1".to_string(),
                json!({"ns": 0, "title": title, "missing": ""}),
            ),
        }
    }

    fn site_info(&self) -> Value {
        json!({
            "batchcomplete": "",
            "query": {
                "general": {
                    "generator": "MediaWiki 1.43.0-wmf.12",
                    "server": "//fake.wiki",
                    "base": "https://fake.wiki/wiki/Main_Page"
                },
                "extensions": [
                    {"name": "TextExtracts"},
                    {"name": "GeoData"},
                    {"name": "CirrusSearch"}
                ]
            }
        })
    }

    fn login(&self, params: &HashMap<String, String>) -> Value {
        let token_ok = params.get("lgtoken").map(String::as_str) == Some(LOGIN_TOKEN);
        let password_ok = params.get("lgpassword").map(String::as_str) == Some(PASSWORD);
        if token_ok && password_ok {
            json!({"login": {"result": "Success", "lguserid": 1, "lgusername": params.get("lgname")}})
        } else {
            json!({"login": {"result": "Failed", "reason": "Incorrect username or password entered."}})
        }
    }

    fn search(&self, params: &HashMap<String, String>) -> Value {
        let query = param(params, "srsearch");
        match query {
            "timeout" => return json!({"error": {"code": "timeout", "info": "HTTP request timed out."}}),
            "broken" => return json!({"error": {"code": "internal", "info": "Search backend exploded"}}),
            _ => {}
        }

        let limit = limit(params, "srlimit");
        let needle = query.to_lowercase();
        let hits: Vec<Value> = self
            .pages
            .keys()
            .filter(|title| title.to_lowercase().contains(&needle))
            .take(limit)
            .map(|title| json!({"ns": 0, "title": title}))
            .collect();

        let mut response = json!({"batchcomplete": "", "query": {"search": hits}});
        if params.contains_key("srinfo") {
            if let Some(suggestion) = self.suggestions.get(query) {
                response["query"]["searchinfo"] = json!({"suggestion": suggestion});
            }
        }
        response
    }

    fn category_members(&self, params: &HashMap<String, String>) -> ResponseTemplate {
        let title = param(params, "cmtitle");
        let name = title.strip_prefix("Category:").unwrap_or(title);
        if self.broken.contains(name) {
            return ResponseTemplate::new(500).set_body_string("Internal Server Error");
        }

        let with_subcats = param(params, "cmtype").contains("subcat");
        let members: Vec<Value> = self
            .categories
            .get(name)
            .map(|category| {
                let pages = category
                    .pages
                    .iter()
                    .map(|p| json!({"pageid": 1, "ns": 0, "title": p, "type": "page"}));
                let subcats = category
                    .subcategories
                    .iter()
                    .filter(|_| with_subcats)
                    .map(|s| json!({"pageid": 2, "ns": 14, "title": format!("Category:{}", s), "type": "subcat"}));
                pages.chain(subcats).collect()
            })
            .unwrap_or_default();

        let offset = params
            .get("cmcontinue")
            .and_then(|c| c.strip_prefix("page|"))
            .and_then(|n| n.parse::<usize>().ok())
            .unwrap_or(0);
        let limit = limit(params, "cmlimit");
        let end = (offset + limit).min(members.len());
        let batch = members.get(offset..end).map(<[Value]>::to_vec).unwrap_or_default();

        let mut response = json!({"batchcomplete": "", "query": {"categorymembers": batch}});
        if self.repeat_continuation {
            response["continue"] = json!({"cmcontinue": "page|stuck", "continue": "-||"});
        } else if end < members.len() {
            response["continue"] = json!({"cmcontinue": format!("page|{}", end), "continue": "-||"});
        }
        json_response(response)
    }

    fn parent_categories(&self, title: &str) -> Value {
        let parents: Vec<String> = match title.strip_prefix("Category:") {
            Some(name) => self
                .categories
                .get(name)
                .map(|c| c.parents.clone())
                .unwrap_or_default(),
            None => self
                .pages
                .get(title)
                .map(|p| p.categories.clone())
                .unwrap_or_default(),
        };
        let (id, mut record) = self.page_record(title);
        record["categories"] = parents
            .iter()
            .map(|p| json!({"ns": 14, "title": format!("Category:{}", p)}))
            .collect();
        json!({"batchcomplete": "", "query": {"pages": {id: record}}})
    }

    fn extract(&self, params: &HashMap<String, String>) -> Value {
        let title = param(params, "titles");
        let mut text = self
            .pages
            .get(title)
            .map(|p| p.extract.clone())
            .unwrap_or_default();
        if let Some(chars) = params.get("exchars").and_then(|c| c.parse::<usize>().ok()) {
            text = text.chars().take(chars).collect::<String>() + "...";
        } else if let Some(sentences) = params.get("exsentences").and_then(|s| s.parse::<usize>().ok()) {
            text = text
                .split_inclusive(". ")
                .take(sentences)
                .collect::<String>()
                .trim_end()
                .to_string();
        }
        let (id, mut record) = self.page_record(title);
        record["extract"] = json!(text);
        json!({"batchcomplete": "", "query": {"pages": {id: record}}})
    }

    fn page_info(&self, params: &HashMap<String, String>) -> Value {
        let title = match params.get("pageids") {
            Some(id) => self
                .pages
                .iter()
                .find(|(_, p)| p.pageid.to_string() == *id)
                .map(|(t, _)| t.clone()),
            None => Some(param(params, "titles").to_string()),
        };
        let Some(title) = title else {
            let id = param(params, "pageids");
            return json!({"query": {"pages": {id: {"pageid": id.parse::<u64>().unwrap_or(0), "missing": ""}}}});
        };

        if let Some(target) = self.redirects.get(&title) {
            if params.contains_key("redirects") {
                let (id, record) = self.page_record(target);
                return json!({
                    "batchcomplete": "",
                    "query": {
                        "redirects": [{"from": title, "to": target}],
                        "pages": {id: record}
                    }
                });
            }
            return json!({
                "batchcomplete": "",
                "query": {"pages": {"9000": {"pageid": 9000, "ns": 0, "title": title, "redirect": ""}}}
            });
        }

        let (id, record) = self.page_record(&title);
        json!({"batchcomplete": "", "query": {"pages": {id: record}}})
    }

    fn titles(&self, titles: impl Iterator<Item = String>, key: &str) -> Value {
        let list: Vec<Value> = titles.map(|t| json!({"ns": 0, "title": t})).collect();
        let mut query = serde_json::Map::new();
        query.insert(key.to_string(), Value::Array(list));
        json!({"batchcomplete": "", "query": query})
    }

    fn geosearch(&self, params: &HashMap<String, String>) -> Value {
        let limit = limit(params, "gslimit");
        if let Some(page) = params.get("gspage") {
            if !self.pages.contains_key(page) {
                return json!({"error": {"code": "invalid", "info": "Page coordinates unknown."}});
            }
            let near = self.pages.keys().filter(|t| *t != page).take(limit).cloned();
            return self.titles(near, "geosearch");
        }
        if !params.contains_key("gscoord") {
            return json!({"error": {"code": "invalid", "info": "One of the parameters gscoord, gspage, gsbbox is required"}});
        }
        self.titles(self.pages.keys().take(limit).cloned(), "geosearch")
    }

    fn opensearch(&self, params: &HashMap<String, String>) -> Value {
        let query = param(params, "search");
        let limit = limit(params, "limit");
        let needle = query.to_lowercase();
        let titles: Vec<&String> = self
            .pages
            .keys()
            .filter(|t| t.to_lowercase().starts_with(&needle))
            .take(limit)
            .collect();
        let descriptions: Vec<String> = titles
            .iter()
            .map(|t| self.pages[*t].extract.clone())
            .collect();
        let urls: Vec<String> = titles
            .iter()
            .map(|t| format!("https://fake.wiki/wiki/{}", t.replace(' ', "_")))
            .collect();
        json!([query, titles, descriptions, urls])
    }
}

impl Respond for FakeWiki {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        if let Ok(mut arrivals) = self.arrivals.lock() {
            arrivals.push(Instant::now());
        }

        let params = request_params(request);
        let action = param(&params, "action");

        let body = match action {
            "login" => self.login(&params),
            "opensearch" => self.opensearch(&params),
            _ if param(&params, "meta") == "siteinfo" => {
                if param(&params, "siprop") == "languages" {
                    json!({"query": {"languages": [
                        {"code": "de", "*": "Deutsch"},
                        {"code": "en", "*": "English"}
                    ]}})
                } else {
                    self.site_info()
                }
            }
            _ if param(&params, "meta") == "tokens" => {
                json!({"batchcomplete": "", "query": {"tokens": {"logintoken": LOGIN_TOKEN}}})
            }
            _ => match (param(&params, "list"), param(&params, "prop")) {
                ("search", _) => self.search(&params),
                ("categorymembers", _) => return self.category_members(&params),
                ("random", _) => {
                    let n = limit(&params, "rnlimit");
                    self.titles(self.pages.keys().take(n).cloned(), "random")
                }
                ("allpages", _) => {
                    let from = param(&params, "apfrom").to_string();
                    let n = limit(&params, "aplimit");
                    let titles = self.pages.keys().filter(|t| **t >= from).take(n).cloned();
                    self.titles(titles, "allpages")
                }
                ("prefixsearch", _) => {
                    let prefix = param(&params, "pssearch").to_string();
                    let n = limit(&params, "pslimit");
                    let titles = self
                        .pages
                        .keys()
                        .filter(|t| t.starts_with(&prefix))
                        .take(n)
                        .cloned();
                    self.titles(titles, "prefixsearch")
                }
                ("geosearch", _) => self.geosearch(&params),
                (_, "categories") => self.parent_categories(param(&params, "titles")),
                (_, "extracts") => self.extract(&params),
                (_, prop) if prop.starts_with("info") => self.page_info(&params),
                _ => json!({"error": {"code": "badvalue", "info": "Unrecognized request"}}),
            },
        };
        json_response(body)
    }
}

fn json_response(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

fn param<'a>(params: &'a HashMap<String, String>, key: &str) -> &'a str {
    params.get(key).map(String::as_str).unwrap_or("")
}

fn limit(params: &HashMap<String, String>, key: &str) -> usize {
    params
        .get(key)
        .and_then(|l| l.parse().ok())
        .unwrap_or(500)
}

/// Query string and form body of a request merged into one map
pub fn request_params(request: &Request) -> HashMap<String, String> {
    let mut params: HashMap<String, String> = request.url.query_pairs().into_owned().collect();
    params.extend(url::form_urlencoded::parse(&request.body).into_owned());
    params
}

/// Start a mock server answering as `wiki`
pub async fn serve(wiki: FakeWiki) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(path_regex(r"/api\.php$"))
        .respond_with(wiki)
        .mount(&server)
        .await;
    server
}

/// Client settings pointing at the mock server
pub fn config(server: &MockServer) -> ClientConfig {
    ClientConfig {
        timeout: Some(Duration::from_secs(5)),
        tree_retry_delay: Duration::from_millis(1),
        ..ClientConfig::new(format!("{}{}", server.uri(), API_PATH), "en")
    }
}

pub async fn connect(server: &MockServer) -> MediaWiki {
    MediaWiki::new(config(server))
        .await
        .expect("client should connect to the fake wiki")
}

/// Number of received requests where `key` equals `value`
pub async fn count_requests(server: &MockServer, key: &str, value: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| request_params(r).get(key).map(String::as_str) == Some(value))
        .count()
}

/// Total number of received requests
pub async fn total_requests(server: &MockServer) -> usize {
    server.received_requests().await.unwrap_or_default().len()
}

/// The fruit wiki: Fruit holds Apple and Banana plus the Citrus
/// subcategory, which holds Orange
pub fn fruit() -> FakeWiki {
    FakeWiki::new()
        .page(
            "Apple",
            "The apple is the fruit of the apple tree. It is widely grown. Apples are sweet.",
            &["Fruit"],
        )
        .page("Banana", "A banana is an elongated, edible fruit.", &["Fruit"])
        .page("Orange", "The orange is a citrus fruit.", &["Citrus"])
        .category("Fruit", &["Apple", "Banana"], &["Citrus"])
        .parents("Fruit", &["Food", "Plants"])
        .category("Citrus", &["Orange"], &[])
        .parents("Citrus", &["Fruit"])
        .suggestion("aple", "Apple")
        .redirect("Malus", "Apple")
}
