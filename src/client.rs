//! The content client. [`ContentSource`] is the seam between the site and
//! the content API; [`Client`] implements it over HTTP against the
//! WordPress REST API (`{base}/wp-json/wp/v2/`).

use crate::model::{Author, Media, Page, Paginated, Post, Taxonomy, Term};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// The number of records requested per call when enumerating a whole
/// collection. This is the API's upper bound.
pub const MAX_PER_PAGE: u32 = 100;

const TOTAL_HEADER: &str = "x-wp-total";
const TOTAL_PAGES_HEADER: &str = "x-wp-totalpages";

/// Parameters for one page of the posts collection. Filters are always
/// numeric IDs; slugs are resolved before a query is built (see
/// [`crate::filter`]).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PostQuery {
    /// 1-based page number.
    pub page: u32,
    pub per_page: u32,
    pub author: Option<u64>,
    pub tag: Option<u64>,
    pub category: Option<u64>,
    pub search: Option<String>,
}

impl PostQuery {
    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.max(1).to_string()),
            ("per_page", self.per_page.to_string()),
        ];
        if let Some(author) = self.author {
            params.push(("author", author.to_string()));
        }
        if let Some(tag) = self.tag {
            params.push(("tags", tag.to_string()));
        }
        if let Some(category) = self.category {
            params.push(("categories", category.to_string()));
        }
        if let Some(search) = &self.search {
            params.push(("search", search.clone()));
        }
        params
    }
}

/// Read access to the content backend. Every method is a single logical
/// read; none of them mutate anything.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetches one page of posts matching `query`.
    async fn posts(&self, query: &PostQuery) -> Result<Paginated<Post>>;

    /// Fetches every post.
    async fn all_posts(&self) -> Result<Vec<Post>>;

    async fn post_by_slug(&self, slug: &str) -> Result<Option<Post>>;

    /// Fetches every page.
    async fn all_pages(&self) -> Result<Vec<Page>>;

    async fn page_by_slug(&self, slug: &str) -> Result<Option<Page>>;

    /// Fetches every author, or only those matching `search`.
    async fn authors(&self, search: Option<&str>) -> Result<Vec<Author>>;

    async fn author_by_id(&self, id: u64) -> Result<Author>;

    async fn author_by_slug(&self, slug: &str) -> Result<Option<Author>>;

    /// Fetches every term of `taxonomy`, or only those matching `search`.
    async fn terms(
        &self,
        taxonomy: Taxonomy,
        search: Option<&str>,
    ) -> Result<Vec<Term>>;

    async fn term_by_id(&self, taxonomy: Taxonomy, id: u64) -> Result<Term>;

    async fn term_by_slug(
        &self,
        taxonomy: Taxonomy,
        slug: &str,
    ) -> Result<Option<Term>>;

    async fn media_by_id(&self, id: u64) -> Result<Media>;
}

/// A [`ContentSource`] backed by the WordPress REST API.
pub struct Client {
    http: reqwest::Client,

    /// The API root, e.g. `https://cms.example.org/wp-json/wp/v2/`.
    api_root: Url,
}

impl Client {
    /// Constructs a client for the WordPress install at `wordpress_url`.
    pub fn new(wordpress_url: &Url, timeout: Duration) -> Result<Client> {
        Ok(Client {
            http: reqwest::Client::builder().timeout(timeout).build()?,
            api_root: api_root(wordpress_url)?,
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<(T, HeaderMap)> {
        let mut url = self.api_root.join(path)?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        debug!(%url, "content api request");

        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let headers = response.headers().clone();
        Ok((response.json::<T>().await?, headers))
    }

    async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Paginated<T>> {
        let (items, headers) = self.get::<Vec<T>>(path, params).await?;
        Ok(Paginated {
            items,
            total: header_count(&headers, TOTAL_HEADER)?,
            total_pages: header_count(&headers, TOTAL_PAGES_HEADER)?,
        })
    }

    /// Walks every page of a collection, `MAX_PER_PAGE` records at a time.
    async fn get_all<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let mut all = Vec::new();
        let mut page: u64 = 1;
        loop {
            let mut page_params = params.to_vec();
            page_params.push(("page", page.to_string()));
            page_params.push(("per_page", MAX_PER_PAGE.to_string()));
            let batch = self.get_page::<T>(path, &page_params).await?;
            let exhausted = batch.items.is_empty() || page >= batch.total_pages;
            all.extend(batch.items);
            if exhausted {
                return Ok(all);
            }
            page += 1;
        }
    }

    async fn get_by_slug<T: DeserializeOwned>(
        &self,
        path: &str,
        slug: &str,
    ) -> Result<Option<T>> {
        let (found, _) = self
            .get::<Vec<T>>(path, &[("slug", slug.to_owned())])
            .await?;
        Ok(found.into_iter().next())
    }
}

#[async_trait]
impl ContentSource for Client {
    async fn posts(&self, query: &PostQuery) -> Result<Paginated<Post>> {
        self.get_page("posts", &query.params()).await
    }

    async fn all_posts(&self) -> Result<Vec<Post>> {
        self.get_all("posts", &[]).await
    }

    async fn post_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        self.get_by_slug("posts", slug).await
    }

    async fn all_pages(&self) -> Result<Vec<Page>> {
        self.get_all("pages", &[]).await
    }

    async fn page_by_slug(&self, slug: &str) -> Result<Option<Page>> {
        self.get_by_slug("pages", slug).await
    }

    async fn authors(&self, search: Option<&str>) -> Result<Vec<Author>> {
        self.get_all("users", &search_params(search)).await
    }

    async fn author_by_id(&self, id: u64) -> Result<Author> {
        let (author, _) = self.get(&format!("users/{}", id), &[]).await?;
        Ok(author)
    }

    async fn author_by_slug(&self, slug: &str) -> Result<Option<Author>> {
        self.get_by_slug("users", slug).await
    }

    async fn terms(
        &self,
        taxonomy: Taxonomy,
        search: Option<&str>,
    ) -> Result<Vec<Term>> {
        self.get_all(taxonomy.collection(), &search_params(search))
            .await
    }

    async fn term_by_id(&self, taxonomy: Taxonomy, id: u64) -> Result<Term> {
        let (term, _) = self
            .get(&format!("{}/{}", taxonomy.collection(), id), &[])
            .await?;
        Ok(term)
    }

    async fn term_by_slug(
        &self,
        taxonomy: Taxonomy,
        slug: &str,
    ) -> Result<Option<Term>> {
        self.get_by_slug(taxonomy.collection(), slug).await
    }

    async fn media_by_id(&self, id: u64) -> Result<Media> {
        let (media, _) = self.get(&format!("media/{}", id), &[]).await?;
        Ok(media)
    }
}

/// Builds the REST API root from the WordPress base URL. NOTE: the base
/// needs a trailing slash or [`Url::join`] would replace its last path
/// segment instead of appending to it.
fn api_root(wordpress_url: &Url) -> Result<Url> {
    let mut base = wordpress_url.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join("wp-json/wp/v2/")?)
}

fn search_params(search: Option<&str>) -> Vec<(&'static str, String)> {
    match search {
        Some(search) => vec![("search", search.to_owned())],
        None => Vec::new(),
    }
}

/// Reads a numeric pagination header. A missing header counts as zero.
fn header_count(headers: &HeaderMap, name: &'static str) -> Result<u64> {
    match headers.get(name) {
        None => Ok(0),
        Some(value) => value
            .to_str()
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .ok_or_else(|| Error::Header {
                name,
                value: String::from_utf8_lossy(value.as_bytes()).into_owned(),
            }),
    }
}

/// The result of a content API call.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a failed content API call.
#[derive(Debug)]
pub enum Error {
    /// Returned when the request could not be sent or the body could not be
    /// decoded.
    Http(reqwest::Error),

    /// Returned when the API answers with a non-success status.
    Status { url: String, status: u16 },

    /// Returned when a pagination header isn't a number.
    Header { name: &'static str, value: String },

    /// Returned when an API URL can't be built.
    UrlParse(url::ParseError),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Http(err) => err.fmt(f),
            Error::Status { url, status } => {
                write!(f, "content api returned {} for `{}`", status, url)
            }
            Error::Header { name, value } => {
                write!(f, "invalid `{}` header: {:?}", name, value)
            }
            Error::UrlParse(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Http(err) => Some(err),
            Error::Status { .. } => None,
            Error::Header { .. } => None,
            Error::UrlParse(err) => Some(err),
        }
    }
}

impl From<reqwest::Error> for Error {
    /// Converts a [`reqwest::Error`] into an [`Error`]. This allows us to use
    /// the `?` operator on requests.
    fn from(err: reqwest::Error) -> Error {
        Error::Http(err)
    }
}

impl From<url::ParseError> for Error {
    /// Converts a [`url::ParseError`] into an [`Error`]. This allows us to
    /// use the `?` operator for URL joining.
    fn from(err: url::ParseError) -> Error {
        Error::UrlParse(err)
    }
}
