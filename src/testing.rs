//! An in-memory [`ContentSource`] for tests, with per-operation failure
//! injection and a log of the calls it served.

use crate::client::{ContentSource, Error, PostQuery, Result};
use crate::config::{Config, Environment};
use crate::model::{Author, Media, Page, Paginated, Post, Rendered, Taxonomy, Term};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;

#[derive(Default)]
pub struct FakeSource {
    pub posts: Vec<Post>,
    pub pages: Vec<Page>,
    pub authors: Vec<Author>,
    pub categories: Vec<Term>,
    pub tags: Vec<Term>,
    pub media: Vec<Media>,
    failing: HashSet<&'static str>,
    calls: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn new() -> FakeSource {
        FakeSource::default()
    }

    /// Makes every call to the named operation fail with a 500.
    pub fn failing(mut self, operation: &'static str) -> FakeSource {
        self.failing.insert(operation);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, operation: &'static str, call: String) -> Result<()> {
        self.calls.lock().unwrap().push(call.clone());
        match self.failing.contains(operation) {
            true => Err(Error::Status {
                url: call,
                status: 500,
            }),
            false => Ok(()),
        }
    }

    fn taxonomy(&self, taxonomy: Taxonomy) -> &[Term] {
        match taxonomy {
            Taxonomy::Categories => &self.categories,
            Taxonomy::Tags => &self.tags,
        }
    }
}

fn matches(name: &str, search: Option<&str>) -> bool {
    match search {
        None => true,
        Some(search) => name.to_lowercase().contains(&search.to_lowercase()),
    }
}

fn not_found(call: String) -> Error {
    Error::Status {
        url: call,
        status: 404,
    }
}

#[async_trait]
impl ContentSource for FakeSource {
    async fn posts(&self, query: &PostQuery) -> Result<Paginated<Post>> {
        self.record("posts", format!("posts {:?}", query))?;
        let matching: Vec<&Post> = self
            .posts
            .iter()
            .filter(|p| query.author.map_or(true, |a| p.author == a))
            .filter(|p| {
                query
                    .category
                    .map_or(true, |c| p.categories.contains(&c))
            })
            .filter(|p| query.tag.map_or(true, |t| p.tags.contains(&t)))
            .filter(|p| matches(&p.title.rendered, query.search.as_deref()))
            .collect();
        let per_page = query.per_page.max(1) as usize;
        let total = matching.len();
        let start = (query.page.max(1) as usize - 1) * per_page;
        Ok(Paginated {
            items: matching
                .into_iter()
                .skip(start)
                .take(per_page)
                .cloned()
                .collect(),
            total: total as u64,
            total_pages: ((total + per_page - 1) / per_page) as u64,
        })
    }

    async fn all_posts(&self) -> Result<Vec<Post>> {
        self.record("all_posts", String::from("all_posts"))?;
        Ok(self.posts.clone())
    }

    async fn post_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        self.record("post_by_slug", format!("post_by_slug {}", slug))?;
        Ok(self.posts.iter().find(|p| p.slug == slug).cloned())
    }

    async fn all_pages(&self) -> Result<Vec<Page>> {
        self.record("all_pages", String::from("all_pages"))?;
        Ok(self.pages.clone())
    }

    async fn page_by_slug(&self, slug: &str) -> Result<Option<Page>> {
        self.record("page_by_slug", format!("page_by_slug {}", slug))?;
        Ok(self.pages.iter().find(|p| p.slug == slug).cloned())
    }

    async fn authors(&self, search: Option<&str>) -> Result<Vec<Author>> {
        self.record("authors", format!("authors {:?}", search))?;
        Ok(self
            .authors
            .iter()
            .filter(|a| matches(&a.name, search))
            .cloned()
            .collect())
    }

    async fn author_by_id(&self, id: u64) -> Result<Author> {
        let call = format!("author_by_id {}", id);
        self.record("author_by_id", call.clone())?;
        self.authors
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| not_found(call))
    }

    async fn author_by_slug(&self, slug: &str) -> Result<Option<Author>> {
        self.record("author_by_slug", format!("author_by_slug {}", slug))?;
        Ok(self.authors.iter().find(|a| a.slug == slug).cloned())
    }

    async fn terms(
        &self,
        taxonomy: Taxonomy,
        search: Option<&str>,
    ) -> Result<Vec<Term>> {
        self.record("terms", format!("terms {:?} {:?}", taxonomy, search))?;
        Ok(self
            .taxonomy(taxonomy)
            .iter()
            .filter(|t| matches(&t.name, search))
            .cloned()
            .collect())
    }

    async fn term_by_id(&self, taxonomy: Taxonomy, id: u64) -> Result<Term> {
        let call = format!("term_by_id {:?} {}", taxonomy, id);
        self.record("term_by_id", call.clone())?;
        self.taxonomy(taxonomy)
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| not_found(call))
    }

    async fn term_by_slug(
        &self,
        taxonomy: Taxonomy,
        slug: &str,
    ) -> Result<Option<Term>> {
        self.record(
            "term_by_slug",
            format!("term_by_slug {:?} {}", taxonomy, slug),
        )?;
        Ok(self.taxonomy(taxonomy).iter().find(|t| t.slug == slug).cloned())
    }

    async fn media_by_id(&self, id: u64) -> Result<Media> {
        let call = format!("media_by_id {}", id);
        self.record("media_by_id", call.clone())?;
        self.media
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or_else(|| not_found(call))
    }
}

pub fn post(id: u64, slug: &str, title: &str, categories: &[u64]) -> Post {
    Post {
        id,
        slug: slug.to_owned(),
        title: Rendered::new(title),
        excerpt: Rendered::new(&format!("<p>Excerpt for {}</p>", title)),
        content: Rendered::new(&format!("<p>Body of {}</p>", title)),
        date: NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap(),
        modified: None,
        modified_gmt: None,
        featured_media: 0,
        author: 0,
        categories: categories.to_vec(),
        tags: Vec::new(),
    }
}

pub fn page(id: u64, slug: &str, title: &str) -> Page {
    Page {
        id,
        slug: slug.to_owned(),
        title: Rendered::new(title),
        content: Rendered::new(&format!("<p>{}</p>", title)),
        modified: None,
        modified_gmt: None,
    }
}

pub fn author(id: u64, slug: &str, name: &str) -> Author {
    Author {
        id,
        slug: slug.to_owned(),
        name: name.to_owned(),
    }
}

pub fn term(id: u64, slug: &str, name: &str) -> Term {
    Term {
        id,
        slug: slug.to_owned(),
        name: name.to_owned(),
    }
}

pub fn media(id: u64, source_url: &str) -> Media {
    Media {
        id,
        source_url: source_url.to_owned(),
        alt_text: String::new(),
    }
}

/// The crate's own `pressroom.yaml`, backed by `https://cms.example.org`.
pub fn config() -> Config {
    let env = Environment {
        wordpress_url: Some(String::from("https://cms.example.org")),
        ..Environment::default()
    };
    Config::from_directory(Path::new(env!("CARGO_MANIFEST_DIR")), &env).unwrap()
}
