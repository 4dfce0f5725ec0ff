//! MediaWiki API client.
//!
//! [`MediaWiki`] owns the HTTP session, the rate limiter and the response
//! cache for one API endpoint. Every operation takes `&mut self`, so calls on
//! one client are strictly sequential.

use crate::api::pagination::{pull_limit, MAX_PULL};
use crate::api::{
    AllPagesQuery, CategoryMembers, CategoryMembersQuery, GeoQuery, GeoSearchQuery,
    LanguagesQuery, LoginResponse, OpenSearchResult, Params, PrefixSearchQuery, QueryResponse,
    RandomQuery, RequestExecutor, SearchQuery, SearchResults, TokensQuery,
};
use crate::cache::{optional, CacheStats, CallArgs, Operation, ResponseCache};
use crate::category_tree::{self, Categories, CategoryTree, CategoryTreeBuilder};
use crate::config::{format_api_url, normalize_category_prefix, ClientConfig, TlsVerification, VERSION};
use crate::error::{check_error_response, check_query, MediaWikiError, Result};
use crate::page::{category_title, strip_category_prefix, PageRef, WikiPage};
use crate::site_info::{self, SiteInfo};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

const ALLPAGES: Operation = Operation {
    name: "allpages",
    defaults: &[("query", ""), ("results", "10")],
};

const SEARCH: Operation = Operation {
    name: "search",
    defaults: &[("results", "10"), ("suggestion", "false")],
};

const SUGGEST: Operation = Operation {
    name: "suggest",
    defaults: &[],
};

const GEOSEARCH: Operation = Operation {
    name: "geosearch",
    defaults: &[
        ("latitude", "None"),
        ("longitude", "None"),
        ("radius", "1000"),
        ("title", "None"),
        ("auto_suggest", "true"),
        ("results", "10"),
    ],
};

const OPENSEARCH: Operation = Operation {
    name: "opensearch",
    defaults: &[("results", "10"), ("redirect", "true")],
};

const PREFIXSEARCH: Operation = Operation {
    name: "prefixsearch",
    defaults: &[("results", "10")],
};

const SUMMARY: Operation = Operation {
    name: "summary",
    defaults: &[
        ("sentences", "0"),
        ("chars", "0"),
        ("auto_suggest", "true"),
        ("redirect", "true"),
    ],
};

const WIKI_REQUEST: Operation = Operation {
    name: "wiki_request",
    defaults: &[],
};

const CATEGORYMEMBERS: Operation = Operation {
    name: "categorymembers",
    defaults: &[("results", "10"), ("subcategories", "true")],
};

/// Client for one MediaWiki API endpoint
pub struct MediaWiki {
    config: ClientConfig,
    executor: RequestExecutor,
    cache: ResponseCache,
    site_info: SiteInfo,
    /// Language code -> name, fetched on first use
    supported_languages: Option<BTreeMap<String, String>>,
    /// Language code -> endpoint reachable, probed on first use
    available_languages: Option<BTreeMap<String, bool>>,
    logged_in: bool,
}

impl MediaWiki {
    /// Connect to the endpoint described by `config`.
    ///
    /// Logs in when both username and password are configured, then
    /// resolves the site info. A failure to resolve it means the URL is not
    /// a usable MediaWiki API and is reported as [`MediaWikiError::ApiUrl`].
    pub async fn new(mut config: ClientConfig) -> Result<Self> {
        config.lang = config.lang.to_lowercase();
        config.category_prefix = normalize_category_prefix(&config.category_prefix);

        let mut executor = RequestExecutor::new(&config)?;
        let cache = ResponseCache::new(config.use_cache, config.refresh_interval);

        let logged_in = match (&config.username, &config.password) {
            (Some(username), Some(password)) => {
                login_session(&mut executor, username, password, true).await?
            }
            _ => false,
        };

        let api_url = config.api_url();
        let site_info = match site_info::resolve(&mut executor).await {
            Ok(info) => info,
            Err(e) => {
                warn!(api_url = %api_url, error = %e, "Site info could not be resolved");
                return Err(MediaWikiError::ApiUrl(api_url));
            }
        };

        Ok(Self {
            config,
            executor,
            cache,
            site_info,
            supported_languages: None,
            available_languages: None,
            logged_in,
        })
    }

    /// Connect to Wikipedia in the given language with default settings
    pub async fn wikipedia(lang: &str) -> Result<Self> {
        Self::new(ClientConfig {
            lang: lang.to_string(),
            ..Default::default()
        })
        .await
    }

    // Read-only properties

    /// Version of this library
    pub fn version(&self) -> &'static str {
        VERSION
    }

    pub fn site_info(&self) -> &SiteInfo {
        &self.site_info
    }

    /// MediaWiki version of the site, e.g. `1.43.0`
    pub fn api_version(&self) -> &str {
        &self.site_info.api_version_str
    }

    pub fn base_url(&self) -> &str {
        &self.site_info.base_url
    }

    pub fn extensions(&self) -> &[String] {
        &self.site_info.extensions
    }

    pub fn api_url(&self) -> &str {
        self.executor.api_url()
    }

    pub fn logged_in(&self) -> bool {
        self.logged_in
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub(crate) fn executor_mut(&mut self) -> &mut RequestExecutor {
        &mut self.executor
    }

    // Settings

    pub fn language(&self) -> &str {
        &self.config.lang
    }

    /// Switch language by rewriting `/<old>.` to `/<new>.` in the API URL.
    ///
    /// Cached results are dropped; URLs that do not encode the language are
    /// left unchanged.
    pub fn set_language(&mut self, lang: &str) {
        let lang = lang.to_lowercase();
        if self.config.lang == lang {
            return;
        }

        let api_url = self.executor.api_url().replace(
            &format!("/{}.", self.config.lang),
            &format!("/{}.", lang),
        );
        info!(from = %self.config.lang, to = %lang, api_url = %api_url, "Language changed");

        self.executor.set_api_url(api_url);
        self.config.lang = lang;
        self.cache.clear();
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.executor.timeout()
    }

    /// Set the per-request timeout (None = no timeout)
    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.config.timeout = timeout;
        self.executor.set_timeout(timeout);
    }

    pub fn rate_limit(&self) -> bool {
        self.executor.rate_limiter().enabled()
    }

    /// Turn rate limiting on or off; also clears the cache
    pub fn set_rate_limit(&mut self, rate_limit: bool) {
        self.config.rate_limit = rate_limit;
        self.executor.rate_limiter_mut().set_enabled(rate_limit);
        self.cache.clear();
    }

    pub fn rate_limit_min_wait(&self) -> Duration {
        self.executor.rate_limiter().min_wait()
    }

    pub fn set_rate_limit_min_wait(&mut self, min_wait: Duration) {
        self.config.rate_limit_wait = min_wait;
        self.executor.rate_limiter_mut().set_min_wait(min_wait);
    }

    pub fn category_prefix(&self) -> &str {
        &self.config.category_prefix
    }

    pub fn set_category_prefix(&mut self, prefix: &str) {
        self.config.category_prefix = normalize_category_prefix(prefix);
    }

    pub fn user_agent(&self) -> &str {
        &self.config.user_agent
    }

    /// Set the user agent; starts a new session, so any login is lost
    pub fn set_user_agent(&mut self, user_agent: &str) -> Result<()> {
        self.reconfigure_session(|config| config.user_agent = user_agent.to_string())
    }

    pub fn proxies(&self) -> Option<&BTreeMap<String, String>> {
        self.config.proxies.as_ref()
    }

    /// Set proxies per scheme; starts a new session
    pub fn set_proxies(&mut self, proxies: Option<BTreeMap<String, String>>) -> Result<()> {
        let proxies = proxies.filter(|p| !p.is_empty());
        self.reconfigure_session(|config| config.proxies = proxies)
    }

    pub fn verify_ssl(&self) -> &TlsVerification {
        &self.config.verify_ssl
    }

    /// Set TLS verification; starts a new session
    pub fn set_verify_ssl(&mut self, verify_ssl: TlsVerification) -> Result<()> {
        self.reconfigure_session(|config| config.verify_ssl = verify_ssl)
    }

    pub fn use_cache(&self) -> bool {
        self.cache.enabled()
    }

    pub fn set_use_cache(&mut self, use_cache: bool) {
        self.config.use_cache = use_cache;
        self.cache.set_enabled(use_cache);
    }

    pub fn refresh_interval(&self) -> Option<Duration> {
        self.cache.refresh_interval()
    }

    /// Recompute cached results older than `refresh_interval`
    pub fn set_refresh_interval(&mut self, refresh_interval: Option<Duration>) {
        self.cache.set_refresh_interval(refresh_interval);
        self.config.refresh_interval = self.cache.refresh_interval();
    }

    /// Drop every cached result
    pub fn clear_memoized(&mut self) {
        self.cache.clear();
    }

    /// Apply a session-level change; the old settings stay if the new
    /// session cannot be built
    fn reconfigure_session(&mut self, update: impl FnOnce(&mut ClientConfig)) -> Result<()> {
        let mut config = self.config.clone();
        update(&mut config);
        self.executor.reset_session(&config)?;
        self.config = config;
        self.logged_in = false;
        Ok(())
    }

    /// Point the client at another endpoint.
    ///
    /// Logs in if credentials are given and resolves the new site info. On
    /// failure the previous URL and language are restored and
    /// [`MediaWikiError::ApiUrl`] is returned.
    pub async fn set_api_url(
        &mut self,
        api_url: &str,
        lang: &str,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<()> {
        let old_url = self.config.url.clone();
        let old_lang = self.config.lang.clone();
        let old_api_url = self.executor.api_url().to_string();

        self.config.url = api_url.to_string();
        self.config.lang = lang.to_lowercase();
        self.executor.set_api_url(format_api_url(api_url, lang));
        self.logged_in = false;

        match self.resolve_endpoint(username, password).await {
            Ok(site_info) => {
                self.site_info = site_info;
                self.supported_languages = None;
                self.available_languages = None;
                self.cache.clear();
                Ok(())
            }
            Err(e) => {
                let attempted = self.executor.api_url().to_string();
                warn!(api_url = %attempted, error = %e, "Endpoint switch failed, restoring previous endpoint");
                self.config.url = old_url;
                self.config.lang = old_lang;
                self.executor.set_api_url(old_api_url);
                Err(MediaWikiError::ApiUrl(attempted))
            }
        }
    }

    async fn resolve_endpoint(
        &mut self,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<SiteInfo> {
        if let (Some(username), Some(password)) = (username, password) {
            self.login(username, password, true).await?;
        }
        site_info::resolve(&mut self.executor).await
    }

    // Session

    /// Log in with a bot password.
    ///
    /// Returns whether the login succeeded; with `strict` a failure is a
    /// [`MediaWikiError::Login`] carrying the server's reason instead.
    pub async fn login(&mut self, username: &str, password: &str, strict: bool) -> Result<bool> {
        self.logged_in = false;
        self.logged_in = login_session(&mut self.executor, username, password, strict).await?;
        Ok(self.logged_in)
    }

    // Raw access

    /// Issue an arbitrary API request.
    ///
    /// `format=json` is always added, and `action=query` unless the params
    /// name an action. Responses are memoized on the parameters.
    pub async fn wiki_request(&mut self, params: Params) -> Result<Value> {
        let args = CallArgs::new().arg(render_params(&params));
        let executor = &mut self.executor;
        self.cache
            .get_or_compute(&WIKI_REQUEST, &args, executor.get(params))
            .await
    }

    // Languages

    /// Language code -> language name for every language the site knows
    pub async fn supported_languages(&mut self) -> Result<&BTreeMap<String, String>> {
        if self.supported_languages.is_none() {
            let params = Params::new()
                .with("meta", "siteinfo")
                .with("siprop", "languages");
            let response = self.executor.get(params).await?;
            check_error_response(&response, "languages")?;
            let decoded: QueryResponse<LanguagesQuery> = serde_json::from_value(response)?;
            let languages = decoded
                .query
                .languages
                .into_iter()
                .map(|l| (l.code, l.name))
                .collect();
            self.supported_languages = Some(languages);
        }
        Ok(&*self.supported_languages.get_or_insert_with(BTreeMap::new))
    }

    /// Language code -> whether the same URL template answers in that
    /// language. Probes every supported language once.
    pub async fn available_languages(&mut self) -> Result<&BTreeMap<String, bool>> {
        if self.available_languages.is_none() {
            let codes: Vec<String> = self.supported_languages().await?.keys().cloned().collect();
            info!(languages = codes.len(), "Probing language endpoints");

            let mut available = BTreeMap::new();
            for code in codes {
                let config = ClientConfig {
                    lang: code.clone(),
                    username: None,
                    password: None,
                    ..self.config.clone()
                };
                let reachable = MediaWiki::new(config).await.is_ok();
                debug!(lang = %code, reachable = reachable, "Probed language");
                available.insert(code, reachable);
            }
            self.available_languages = Some(available);
        }
        Ok(&*self.available_languages.get_or_insert_with(BTreeMap::new))
    }

    // Listings

    /// Random page titles from the main namespace
    pub async fn random(&mut self, pages: usize) -> Result<Vec<String>> {
        if pages < 1 {
            return Err(MediaWikiError::Validation(
                "Number of pages must be greater than 0".to_string(),
            ));
        }

        let params = Params::new()
            .with("list", "random")
            .with("rnnamespace", 0)
            .with("rnlimit", pages);
        let response = self.executor.get(params).await?;
        check_error_response(&response, "random")?;
        let decoded: QueryResponse<RandomQuery> = serde_json::from_value(response)?;
        Ok(decoded.query.random.into_iter().map(|p| p.title).collect())
    }

    /// Page titles starting at `query` in title order
    pub async fn allpages(&mut self, query: &str, results: Option<usize>) -> Result<Vec<String>> {
        check_results(results)?;
        let args = CallArgs::new()
            .named("query", query)
            .named("results", optional(results));
        let params = Params::new()
            .with("list", "allpages")
            .with("aplimit", pull_limit(results))
            .with("apfrom", query);

        let executor = &mut self.executor;
        self.cache
            .get_or_compute(&ALLPAGES, &args, async move {
                let response = executor.get(params).await?;
                check_error_response(&response, query)?;
                let decoded: QueryResponse<AllPagesQuery> = serde_json::from_value(response)?;
                Ok(decoded.query.allpages.into_iter().map(|p| p.title).collect())
            })
            .await
    }

    /// Full-text search for page titles
    pub async fn search(
        &mut self,
        query: &str,
        results: Option<usize>,
        suggestion: bool,
    ) -> Result<SearchResults> {
        check_query(query, "Query must be specified")?;
        check_results(results)?;
        let args = CallArgs::new()
            .arg(query)
            .named("results", optional(results))
            .named("suggestion", suggestion);

        let mut params = Params::new()
            .with("list", "search")
            .with("srprop", "")
            .with("srlimit", pull_limit(results))
            .with("srsearch", query)
            .with("sroffset", 0);
        if suggestion {
            params.insert("srinfo", "suggestion");
        }

        let executor = &mut self.executor;
        self.cache
            .get_or_compute(&SEARCH, &args, async move {
                let response = executor.get(params).await?;
                check_error_response(&response, query)?;
                let decoded: QueryResponse<SearchQuery> = serde_json::from_value(response)?;
                let suggestion = if suggestion {
                    decoded.query.searchinfo.and_then(|info| info.suggestion)
                } else {
                    None
                };
                Ok(SearchResults {
                    titles: decoded.query.search.into_iter().map(|p| p.title).collect(),
                    suggestion,
                })
            })
            .await
    }

    /// Best title for `query`: the top search hit, else the spelling
    /// suggestion
    pub async fn suggest(&mut self, query: &str) -> Result<Option<String>> {
        let args = CallArgs::new().arg(query);
        if let Some(cached) = self.cache.lookup::<Option<String>>(&SUGGEST, &args)? {
            return Ok(cached);
        }

        let results = self.search(query, Some(1), true).await?;
        let title = results.titles.into_iter().next().or(results.suggestion);

        self.cache.store(&SUGGEST, &args, &title)?;
        Ok(title)
    }

    /// Titles of pages near a page or a coordinate pair
    pub async fn geosearch(&mut self, geo: GeoQuery) -> Result<Vec<String>> {
        check_results(geo.results)?;
        let args = CallArgs::new()
            .named("latitude", optional(geo.latitude.as_ref()))
            .named("longitude", optional(geo.longitude.as_ref()))
            .named("radius", geo.radius)
            .named("title", optional(geo.title.as_ref()))
            .named("auto_suggest", geo.auto_suggest)
            .named("results", optional(geo.results));
        if let Some(cached) = self.cache.lookup(&GEOSEARCH, &args)? {
            return Ok(cached);
        }

        let mut params = Params::new()
            .with("list", "geosearch")
            .with("gsradius", geo.radius)
            .with("gslimit", pull_limit(geo.results));
        let label = match &geo.title {
            Some(title) => {
                let title = if geo.auto_suggest {
                    self.suggest(title).await?.unwrap_or_else(|| title.clone())
                } else {
                    title.clone()
                };
                params.insert("gspage", &title);
                title
            }
            None => {
                let latitude = parse_coordinate(geo.latitude.as_deref())?;
                let longitude = parse_coordinate(geo.longitude.as_deref())?;
                let coord = format!("{}|{}", latitude, longitude);
                params.insert("gscoord", &coord);
                coord
            }
        };

        let response = self.executor.get(params).await?;
        check_error_response(&response, &label)?;
        let decoded: QueryResponse<GeoSearchQuery> = serde_json::from_value(response)?;
        let titles: Vec<String> = decoded.query.geosearch.into_iter().map(|p| p.title).collect();

        self.cache.store(&GEOSEARCH, &args, &titles)?;
        Ok(titles)
    }

    /// Search-box style suggestions (title, description, URL)
    pub async fn opensearch(
        &mut self,
        query: &str,
        results: Option<usize>,
        redirect: bool,
    ) -> Result<Vec<OpenSearchResult>> {
        check_query(query, "Query must be specified")?;
        check_results(results)?;
        let args = CallArgs::new()
            .arg(query)
            .named("results", optional(results))
            .named("redirect", redirect);
        let params = Params::new()
            .with("action", "opensearch")
            .with("search", query)
            .with("limit", pull_limit(results))
            .with("redirects", if redirect { "resolve" } else { "return" })
            .with("warningsaserror", "true")
            .with("namespace", "");

        let executor = &mut self.executor;
        self.cache
            .get_or_compute(&OPENSEARCH, &args, async move {
                let response = executor.get(params).await?;
                check_error_response(&response, query)?;
                let (_, titles, summaries, urls): (String, Vec<String>, Vec<String>, Vec<String>) =
                    serde_json::from_value(response)?;
                Ok(titles
                    .into_iter()
                    .enumerate()
                    .map(|(i, title)| OpenSearchResult {
                        title,
                        summary: summaries.get(i).cloned().unwrap_or_default(),
                        url: urls.get(i).cloned().unwrap_or_default(),
                    })
                    .collect())
            })
            .await
    }

    /// Titles starting with `prefix`, ranked by the search backend
    pub async fn prefixsearch(&mut self, prefix: &str, results: Option<usize>) -> Result<Vec<String>> {
        check_query(prefix, "Prefix must be specified")?;
        check_results(results)?;
        let args = CallArgs::new()
            .arg(prefix)
            .named("results", optional(results));
        let limit = match results {
            Some(n) if n <= MAX_PULL => n.to_string(),
            _ => "max".to_string(),
        };
        let params = Params::new()
            .with("list", "prefixsearch")
            .with("pssearch", prefix)
            .with("pslimit", limit)
            .with("psnamespace", 0)
            .with("psoffset", 0);

        let executor = &mut self.executor;
        self.cache
            .get_or_compute(&PREFIXSEARCH, &args, async move {
                let response = executor.get(params).await?;
                check_error_response(&response, prefix)?;
                let decoded: QueryResponse<PrefixSearchQuery> = serde_json::from_value(response)?;
                Ok(decoded.query.prefixsearch.into_iter().map(|p| p.title).collect())
            })
            .await
    }

    // Pages

    /// Load a page by title or page id.
    ///
    /// With `auto_suggest` the title is replaced by the best search match
    /// first; no match is a [`MediaWikiError::PageNotFound`].
    pub async fn page(
        &mut self,
        target: impl Into<PageRef>,
        auto_suggest: bool,
        redirect: bool,
        preload: bool,
    ) -> Result<WikiPage> {
        let mut target = target.into();
        if let PageRef::Title(title) = &target {
            if title.trim().is_empty() {
                return Err(MediaWikiError::Validation(
                    "Either a title or a pageid must be specified".to_string(),
                ));
            }
            if auto_suggest {
                match self.suggest(title).await? {
                    Some(suggested) => target = PageRef::Title(suggested),
                    None => return Err(MediaWikiError::PageNotFound(title.clone())),
                }
            }
        }
        WikiPage::load(self, target, redirect, preload).await
    }

    /// Plain-text summary of a page; see [`WikiPage::summarize`]
    pub async fn summary(
        &mut self,
        title: &str,
        sentences: u32,
        chars: u32,
        auto_suggest: bool,
        redirect: bool,
    ) -> Result<String> {
        let args = CallArgs::new()
            .arg(title)
            .named("sentences", sentences)
            .named("chars", chars)
            .named("auto_suggest", auto_suggest)
            .named("redirect", redirect);
        if let Some(cached) = self.cache.lookup(&SUMMARY, &args)? {
            return Ok(cached);
        }

        let page = self.page(title, auto_suggest, redirect, false).await?;
        let summary = page.summarize(self, sentences, chars).await?;

        self.cache.store(&SUMMARY, &args, &summary)?;
        Ok(summary)
    }

    // Categories

    /// Pages (and optionally subcategories) of a category.
    ///
    /// `results` caps the number of members returned; None pulls the whole
    /// category.
    pub async fn categorymembers(
        &mut self,
        category: &str,
        results: Option<usize>,
        subcategories: bool,
    ) -> Result<CategoryMembers> {
        check_query(category, "Category must be specified")?;
        check_results(results)?;
        let args = CallArgs::new()
            .arg(category)
            .named("results", optional(results))
            .named("subcategories", subcategories);

        let prefix = self.config.category_prefix.clone();
        let params = Params::new()
            .with("list", "categorymembers")
            .with("cmprop", "ids|title|type")
            .with(
                "cmtype",
                if subcategories { "page|subcat|file" } else { "page|file" },
            )
            .with("cmlimit", pull_limit(results))
            .with("cmtitle", category_title(&prefix, category));

        let executor = &mut self.executor;
        self.cache
            .get_or_compute(&CATEGORYMEMBERS, &args, async move {
                let records = executor
                    .paginate(params, "categorymembers", "cmlimit", results, |response| {
                        check_error_response(response, category)?;
                        let decoded: QueryResponse<CategoryMembersQuery> =
                            serde_json::from_value(response.clone())?;
                        Ok(decoded.query.categorymembers)
                    })
                    .await?;

                let mut members = CategoryMembers::default();
                for record in records {
                    match record.member_type.as_str() {
                        "page" | "file" => members.pages.push(record.title),
                        "subcat" => members
                            .subcategories
                            .push(strip_category_prefix(&prefix, &record.title)),
                        _ => {}
                    }
                }
                Ok(members)
            })
            .await
    }

    /// Build the category tree below one or more categories.
    ///
    /// `depth` limits how many levels of subcategories are expanded; None
    /// walks the whole tree.
    pub async fn categorytree(
        &mut self,
        categories: impl Into<Categories>,
        depth: Option<u32>,
    ) -> Result<CategoryTree> {
        let roots = category_tree::validate(&categories.into(), depth)?;
        CategoryTreeBuilder::new(depth, self.config.tree_retry_delay)
            .build(self, &roots)
            .await
    }
}

/// Run the two-step bot password login on the executor's session
async fn login_session(
    executor: &mut RequestExecutor,
    username: &str,
    password: &str,
    strict: bool,
) -> Result<bool> {
    let params = Params::new()
        .with("action", "query")
        .with("meta", "tokens")
        .with("type", "login");
    let response = executor.get(params).await?;
    check_error_response(&response, username)?;
    let token = serde_json::from_value::<QueryResponse<TokensQuery>>(response)
        .map(|r| r.query.tokens.logintoken)
        .map_err(|_| MediaWikiError::Login("unable to obtain a login token".to_string()))?;

    let params = Params::new()
        .with("action", "login")
        .with("lgname", username)
        .with("lgpassword", password)
        .with("lgtoken", token);
    let response = executor.post(params).await?;
    check_error_response(&response, username)?;
    let login: LoginResponse = serde_json::from_value(response)?;

    if login.login.result == "Success" {
        info!(username = username, "Logged in");
        return Ok(true);
    }

    warn!(username = username, result = %login.login.result, "Login failed");
    if strict {
        let reason = login.login.reason.unwrap_or(login.login.result);
        return Err(MediaWikiError::Login(reason));
    }
    Ok(false)
}

/// Parameters as `key=value` pairs in key order, joined with `&`
fn render_params(params: &Params) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&")
}

/// Reject a result count of zero
fn check_results(results: Option<usize>) -> Result<()> {
    if results == Some(0) {
        return Err(MediaWikiError::Validation(
            "Number of results must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

/// Validate a latitude or longitude, returning it as sent to the API
fn parse_coordinate(value: Option<&str>) -> Result<String> {
    let invalid = || {
        MediaWikiError::Validation(
            "Latitude and Longitude must be specified either as a number or in formats that can be coerced into a number"
                .to_string(),
        )
    };
    let value = value.map(str::trim).ok_or_else(invalid)?;
    match value.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => Ok(value.to_string()),
        _ => Err(invalid()),
    }
}
