//! The HTTP surface: routes, handlers, response caching headers, CORS, and
//! the mapping from failures to error pages.

use crate::client::{self, ContentSource};
use crate::config::Config;
use crate::escape;
use crate::listing::{ListQuery, Listing, Scope};
use crate::model::Taxonomy;
use crate::post::{PageView, PostView};
use crate::render::{self, Theme, View};
use crate::sitemap::{self, Detail, Entry};
use crate::value::text;
use axum::extract::{Path, Query, Request, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::http::{HeaderValue, Method, StatusCode, Uri};
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use gtmpl::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, instrument};

/// Everything a handler needs. Immutable and shared across requests.
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn ContentSource>,
    pub theme: Arc<Theme>,
    pub config: Arc<Config>,
}

/// Builds the application's router.
pub fn router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", get(home))
        .route("/posts", get(list_posts))
        .route("/posts/author/{slug}", get(author_archive))
        .route("/posts/category/{slug}", get(category_archive))
        .route("/posts/tag/{slug}", get(tag_archive))
        .route("/posts/{slug}", get(show_post))
        .route("/pages/{slug}", get(show_page))
        .route("/sitemap.xml", get(sitemap_index))
        .route(sitemap::POSTS_SITEMAP, get(posts_sitemap))
        .route(sitemap::PAGES_SITEMAP, get(pages_sitemap))
        .route(sitemap::TAGS_SITEMAP, get(tags_sitemap))
        .route(sitemap::CATEGORIES_SITEMAP, get(categories_sitemap))
        .fallback(not_found);
    if state.config.admin_url().is_some() {
        router = router.route("/admin", get(admin));
    }

    let cors = cors(&state.config.allowed_dev_origins);
    router
        .layer(middleware::from_fn_with_state(state.clone(), cache_control))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// The `Cache-Control` value for successful responses.
pub fn cache_header(revalidate: Duration) -> String {
    format!(
        "public, s-maxage={}, stale-while-revalidate",
        revalidate.as_secs()
    )
}

/// Marks successful responses cacheable for the revalidation window.
async fn cache_control(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    if response.status().is_success() && !response.headers().contains_key(CACHE_CONTROL) {
        if let Ok(value) = HeaderValue::from_str(&cache_header(state.config.revalidate)) {
            response.headers_mut().insert(CACHE_CONTROL, value);
        }
    }
    response
}

fn cors(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter(|origin| origin.as_str() != "*")
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::HEAD])
}

impl AppState {
    fn source(&self) -> &dyn ContentSource {
        &*self.source
    }

    fn render(&self, view: View, title_html: &str, item: Value) -> Result<Response> {
        let html = self
            .theme
            .render(view, &self.config.site, title_html, item)?;
        Ok(Html(html).into_response())
    }

    /// Turns a handler result into a response, rendering the error page on
    /// failure.
    fn respond(&self, result: Result<Response>) -> Response {
        match result {
            Ok(response) => response,
            Err(err) => self.error_page(err),
        }
    }

    fn error_page(&self, err: Error) -> Response {
        let (status, heading, message) = match &err {
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                "Page not found",
                "The page you're looking for doesn't exist.",
            ),
            _ => {
                error!(error = %err, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong",
                    "This page couldn't be loaded. Please try again later.",
                )
            }
        };

        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("heading".to_owned(), text(heading));
        m.insert("message".to_owned(), text(message));
        match self.render(View::Error, &escape::html(heading), Value::Object(m)) {
            Ok(mut response) => {
                *response.status_mut() = status;
                response
            }
            Err(err) => {
                error!(error = %err, "Rendering error page");
                (status, heading).into_response()
            }
        }
    }

    async fn listing(&self, scope: Scope, query: ListQuery) -> Response {
        let result = async {
            let listing = Listing::build(self.source(), &self.config, &scope, &query).await?;
            self.render(
                View::Listing,
                &escape::html(&listing.heading),
                Value::from(&listing),
            )
        }
        .await;
        self.respond(result)
    }

    async fn sitemap<F>(&self, detail: Detail, entries: F) -> Response
    where
        F: std::future::Future<Output = client::Result<Vec<Entry>>>,
    {
        let result = async {
            let xml = sitemap::to_xml(&entries.await?, detail)?;
            Ok(([(CONTENT_TYPE, "application/xml")], xml).into_response())
        }
        .await;
        self.respond(result)
    }
}

async fn home() -> Redirect {
    Redirect::temporary("/posts")
}

#[instrument(skip(state))]
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Response {
    state.listing(Scope::All, query).await
}

#[instrument(skip(state))]
pub async fn author_archive(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<ListQuery>,
) -> Response {
    state.listing(Scope::Author(slug), query).await
}

#[instrument(skip(state))]
pub async fn category_archive(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<ListQuery>,
) -> Response {
    state.listing(Scope::Category(slug), query).await
}

#[instrument(skip(state))]
pub async fn tag_archive(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<ListQuery>,
) -> Response {
    state.listing(Scope::Tag(slug), query).await
}

#[instrument(skip(state))]
pub async fn show_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    uri: Uri,
) -> Response {
    let result = async {
        let post = state
            .source()
            .post_by_slug(&slug)
            .await?
            .ok_or(Error::NotFound)?;
        let view = PostView::build(state.source(), &state.config, &post, uri.path()).await;
        state.render(View::Post, &view.title_html, Value::from(&view))
    }
    .await;
    state.respond(result)
}

#[instrument(skip(state))]
pub async fn show_page(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    let result = async {
        let page = state
            .source()
            .page_by_slug(&slug)
            .await?
            .ok_or(Error::NotFound)?;
        let view = PageView::from(&page);
        state.render(View::Page, &view.title_html, Value::from(&view))
    }
    .await;
    state.respond(result)
}

#[instrument(skip(state))]
pub async fn sitemap_index(State(state): State<AppState>) -> Response {
    let domain = &state.config.site.domain;
    state
        .sitemap(Detail::Full, async {
            let posts = state.source().all_posts().await?;
            Ok::<_, client::Error>(sitemap::root_sitemap(domain, &posts, Utc::now()))
        })
        .await
}

#[instrument(skip(state))]
pub async fn posts_sitemap(State(state): State<AppState>) -> Response {
    let domain = &state.config.site.domain;
    state
        .sitemap(Detail::Full, async {
            let posts = state.source().all_posts().await?;
            Ok::<_, client::Error>(sitemap::posts_sitemap(domain, &posts, Utc::now()))
        })
        .await
}

/// Served in the minimal form: only `loc` and `lastmod`.
#[instrument(skip(state))]
pub async fn pages_sitemap(State(state): State<AppState>) -> Response {
    let domain = &state.config.site.domain;
    state
        .sitemap(Detail::Minimal, async {
            let pages = state.source().all_pages().await?;
            Ok::<_, client::Error>(sitemap::pages_sitemap(domain, &pages, Utc::now()))
        })
        .await
}

#[instrument(skip(state))]
pub async fn tags_sitemap(State(state): State<AppState>) -> Response {
    let domain = &state.config.site.domain;
    state
        .sitemap(Detail::Full, async {
            let tags = state.source().terms(Taxonomy::Tags, None).await?;
            Ok::<_, client::Error>(sitemap::tags_sitemap(domain, &tags, Utc::now()))
        })
        .await
}

#[instrument(skip(state))]
pub async fn categories_sitemap(State(state): State<AppState>) -> Response {
    let domain = &state.config.site.domain;
    state
        .sitemap(Detail::Full, async {
            let categories = state
                .source()
                .terms(Taxonomy::Categories, None)
                .await?;
            Ok::<_, client::Error>(sitemap::categories_sitemap(
                domain,
                &categories,
                Utc::now(),
            ))
        })
        .await
}

/// Sends `/admin` to the backend's dashboard.
async fn admin(State(state): State<AppState>) -> Response {
    match state.config.admin_url() {
        Some(url) => Redirect::permanent(&url).into_response(),
        None => state.respond(Err(Error::NotFound)),
    }
}

async fn not_found(State(state): State<AppState>) -> Response {
    state.respond(Err(Error::NotFound))
}

/// The result of a fallible request.
type Result<T> = std::result::Result<T, Error>;

/// Represents a failed request.
#[derive(Debug)]
pub enum Error {
    /// Returned when the content API request fails.
    Content(client::Error),

    /// Returned when a view can't be rendered.
    Render(render::Error),

    /// Returned when a sitemap can't be serialized.
    Sitemap(fmt::Error),

    /// Returned when the requested post, page or route doesn't exist.
    NotFound,
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Content(err) => write!(f, "Fetching content: {}", err),
            Error::Render(err) => write!(f, "Rendering: {}", err),
            Error::Sitemap(err) => write!(f, "Writing sitemap: {}", err),
            Error::NotFound => write!(f, "Not found"),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Content(err) => Some(err),
            Error::Render(err) => Some(err),
            Error::Sitemap(err) => Some(err),
            Error::NotFound => None,
        }
    }
}

impl From<client::Error> for Error {
    /// Converts a [`client::Error`] into an [`Error`]. This allows us to use
    /// the `?` operator on content API calls.
    fn from(err: client::Error) -> Error {
        Error::Content(err)
    }
}

impl From<fmt::Error> for Error {
    /// Converts a [`fmt::Error`] into an [`Error`]. This allows us to use the
    /// `?` operator on sitemap serialization.
    fn from(err: fmt::Error) -> Error {
        Error::Sitemap(err)
    }
}

impl From<render::Error> for Error {
    /// Converts a [`render::Error`] into an [`Error`]. This allows us to use
    /// the `?` operator on rendering.
    fn from(err: render::Error) -> Error {
        Error::Render(err)
    }
}
