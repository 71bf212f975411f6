//! Post list pages: the root `/posts` listing with its search and filter
//! form, and the author, category and tag archives. Each builds one page of
//! [`PostCard`]s plus the [`Pager`] for the rest.

use crate::card::PostCard;
use crate::client::{ContentSource, PostQuery, Result};
use crate::config::Config;
use crate::filter::{self, Kind, Selector};
use crate::model::{Author, Paginated, Post, Record, Taxonomy, Term};
use crate::pager::{Links, Pager};
use crate::share::encode_component;
use futures::future::join_all;
use serde::Deserialize;
use tracing::debug;

/// The query parameters accepted by list pages. Archives only look at
/// `page` and `search`.
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ListQuery {
    pub page: Option<String>,
    pub search: Option<String>,
    pub author: Option<String>,
    pub tag: Option<String>,
    pub category: Option<String>,
}

impl ListQuery {
    /// The requested 1-based page number. Anything that isn't a positive
    /// integer reads as the first page.
    pub fn page(&self) -> u32 {
        self.page
            .as_deref()
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .filter(|page| *page > 0)
            .unwrap_or(1)
    }

    /// The search text, if any was given.
    pub fn search(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Which posts a list page shows. Archive variants carry the slug from the
/// path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Scope {
    All,
    Author(String),
    Category(String),
    Tag(String),
}

impl Scope {
    /// The path the list lives at; pager links and the search form point
    /// here.
    pub fn path(&self) -> String {
        match self {
            Scope::All => String::from("/posts"),
            Scope::Author(slug) => format!("/posts/author/{}", encode_component(slug)),
            Scope::Category(slug) => format!("/posts/category/{}", encode_component(slug)),
            Scope::Tag(slug) => format!("/posts/tag/{}", encode_component(slug)),
        }
    }
}

/// One entry in a filter dropdown.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterOption {
    pub slug: String,
    pub name: String,
    pub selected: bool,
}

/// The filter dropdowns shown above every post list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filters {
    pub authors: Vec<FilterOption>,
    pub categories: Vec<FilterOption>,
    pub tags: Vec<FilterOption>,
}

/// One rendered page of a post list.
#[derive(Clone, Debug)]
pub struct Listing {
    pub heading: String,

    /// The count line, e.g. "12 posts found".
    pub message: String,

    /// Whether this page has no posts to show.
    pub empty: bool,
    pub path: String,
    pub search: Option<String>,
    pub filters: Filters,
    pub cards: Vec<PostCard>,
    pub pager: Option<Pager>,
}

impl Listing {
    /// Builds page `query.page()` of the list selected by `scope`.
    pub async fn build(
        source: &dyn ContentSource,
        config: &Config,
        scope: &Scope,
        query: &ListQuery,
    ) -> Result<Listing> {
        let lists = Lists::fetch(source, query.search()).await?;
        match scope {
            Scope::All => root(source, config, query, &lists).await,
            Scope::Author(slug) => {
                let author = source.author_by_slug(slug).await?;
                let filter = author.as_ref().map(|a| PostQuery {
                    author: Some(a.id),
                    ..PostQuery::default()
                });
                let name = author.map(|a| a.name).unwrap_or_else(|| slug.clone());
                let heading = format!("Posts by {}", name);
                let filters = lists.filters(Some(slug.as_str()), None, None);
                archive(source, config, scope, query, filter, heading, filters).await
            }
            Scope::Category(slug) => {
                let category = source.term_by_slug(Taxonomy::Categories, slug).await?;
                let filter = category.as_ref().map(|c| PostQuery {
                    category: Some(c.id),
                    ..PostQuery::default()
                });
                let name = category.map(|c| c.name).unwrap_or_else(|| slug.clone());
                let heading = format!("Posts in {}", name);
                let filters = lists.filters(None, Some(slug.as_str()), None);
                archive(source, config, scope, query, filter, heading, filters).await
            }
            Scope::Tag(slug) => {
                let tag = source.term_by_slug(Taxonomy::Tags, slug).await?;
                let filter = tag.as_ref().map(|t| PostQuery {
                    tag: Some(t.id),
                    ..PostQuery::default()
                });
                let name = tag.map(|t| t.name).unwrap_or_else(|| slug.clone());
                let heading = format!("Posts tagged {}", name);
                let filters = lists.filters(None, None, Some(slug.as_str()));
                archive(source, config, scope, query, filter, heading, filters).await
            }
        }
    }
}

/// The authors, categories and tags offered as filters; only those
/// matching the search text when there is one.
struct Lists {
    authors: Vec<Author>,
    categories: Vec<Term>,
    tags: Vec<Term>,
}

impl Lists {
    async fn fetch(source: &dyn ContentSource, search: Option<&str>) -> Result<Lists> {
        let (authors, categories, tags) = tokio::try_join!(
            source.authors(search),
            source.terms(Taxonomy::Categories, search),
            source.terms(Taxonomy::Tags, search),
        )?;
        Ok(Lists {
            authors,
            categories,
            tags,
        })
    }

    fn filters(&self, author: Option<&str>, category: Option<&str>, tag: Option<&str>) -> Filters {
        Filters {
            authors: options(&self.authors, author),
            categories: options(&self.categories, category),
            tags: options(&self.tags, tag),
        }
    }
}

async fn root(
    source: &dyn ContentSource,
    config: &Config,
    query: &ListQuery,
    lists: &Lists,
) -> Result<Listing> {
    let page = query.page();
    let search = query.search();
    let author = Selector::parse(query.author.as_deref());
    let category = Selector::parse(query.category.as_deref());
    let tag = Selector::parse(query.tag.as_deref());

    let (author_id, category_id, tag_id) = tokio::try_join!(
        resolve(source, Kind::Author, author.as_ref(), &lists.authors),
        resolve(
            source,
            Kind::Term(Taxonomy::Categories),
            category.as_ref(),
            &lists.categories,
        ),
        resolve(
            source,
            Kind::Term(Taxonomy::Tags),
            tag.as_ref(),
            &lists.tags,
        ),
    )?;
    debug!(?author_id, ?category_id, ?tag_id, "resolved filters");

    let posts = source
        .posts(&PostQuery {
            page,
            per_page: config.posts_per_page,
            author: author_id,
            tag: tag_id,
            category: category_id,
            search: search.map(str::to_owned),
        })
        .await?;

    let selected_author = author.as_ref().map(|s| s.ui_slug(&lists.authors));
    let selected_category = category.as_ref().map(|s| s.ui_slug(&lists.categories));
    let selected_tag = tag.as_ref().map(|s| s.ui_slug(&lists.tags));

    let cards = cards(source, config, &posts.items, selected_category.as_deref()).await;
    let links = Links::new("/posts")
        .with("category", category.as_ref().map(Selector::to_string))
        .with("author", author.as_ref().map(Selector::to_string))
        .with("tag", tag.as_ref().map(Selector::to_string))
        .with("search", search.map(str::to_owned));

    let filters = lists.filters(
        selected_author.as_deref(),
        selected_category.as_deref(),
        selected_tag.as_deref(),
    );

    Ok(listing(
        String::from("All Posts"),
        Scope::All.path(),
        search,
        filters,
        &posts,
        cards,
        page,
        &links,
    ))
}

/// Builds an archive page. `filter` is `None` when the archive's slug
/// didn't resolve, in which case the archive is empty.
async fn archive(
    source: &dyn ContentSource,
    config: &Config,
    scope: &Scope,
    query: &ListQuery,
    filter: Option<PostQuery>,
    heading: String,
    filters: Filters,
) -> Result<Listing> {
    let page = query.page();
    let search = query.search();
    let posts = match filter {
        Some(filter) => {
            source
                .posts(&PostQuery {
                    page,
                    per_page: config.posts_per_page,
                    search: search.map(str::to_owned),
                    ..filter
                })
                .await?
        }
        None => {
            debug!(?scope, "archive not found");
            Paginated::empty()
        }
    };

    let selected_category = match scope {
        Scope::Category(slug) => Some(slug.as_str()),
        _ => None,
    };
    let cards = cards(source, config, &posts.items, selected_category).await;
    let path = scope.path();
    let links = Links::new(&path).with("search", search.map(str::to_owned));
    Ok(listing(
        heading, path, search, filters, &posts, cards, page, &links,
    ))
}

#[allow(clippy::too_many_arguments)]
fn listing(
    heading: String,
    path: String,
    search: Option<&str>,
    filters: Filters,
    posts: &Paginated<Post>,
    cards: Vec<PostCard>,
    page: u32,
    links: &Links,
) -> Listing {
    let total_pages = u32::try_from(posts.total_pages).unwrap_or(u32::MAX);
    Listing {
        heading,
        message: count_line(posts.total, search.is_some()),
        empty: cards.is_empty(),
        path,
        search: search.map(str::to_owned),
        filters,
        cards,
        pager: Pager::new(page, total_pages, links),
    }
}

/// E.g. "1 post found" or "12 posts found matching your search".
fn count_line(total: u64, searching: bool) -> String {
    format!(
        "{} {} found{}",
        total,
        match total {
            1 => "post",
            _ => "posts",
        },
        match searching {
            true => " matching your search",
            false => "",
        }
    )
}

async fn resolve<R: Record>(
    source: &dyn ContentSource,
    kind: Kind,
    selector: Option<&Selector>,
    known: &[R],
) -> Result<Option<u64>> {
    match selector {
        Some(selector) => filter::resolve(source, kind, selector, known).await,
        None => Ok(None),
    }
}

async fn cards(
    source: &dyn ContentSource,
    config: &Config,
    posts: &[Post],
    selected_category: Option<&str>,
) -> Vec<PostCard> {
    let builds = posts
        .iter()
        .map(|post| PostCard::build(source, config, post, selected_category));
    join_all(builds).await
}

fn options<R: Record>(records: &[R], selected: Option<&str>) -> Vec<FilterOption> {
    records
        .iter()
        .map(|r| FilterOption {
            slug: r.slug().to_owned(),
            name: r.name().to_owned(),
            selected: selected == Some(r.slug()),
        })
        .collect()
}
