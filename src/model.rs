//! Defines the records read from the content API: [`Post`], [`Page`],
//! [`Author`], [`Term`] (categories and tags), and [`Media`], plus the
//! [`Paginated`] wrapper returned by list endpoints. Nothing here is ever
//! written back; these are read-only projections of the backend's state.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;

/// An HTML fragment as delivered by the API (`{"rendered": "..."}`).
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Rendered {
    #[serde(default)]
    pub rendered: String,
}

impl Rendered {
    pub fn new(html: &str) -> Rendered {
        Rendered {
            rendered: html.to_owned(),
        }
    }

    /// Returns the fragment, or `None` if it's empty.
    pub fn non_empty(&self) -> Option<&str> {
        match self.rendered.trim().is_empty() {
            true => None,
            false => Some(&self.rendered),
        }
    }
}

/// A blog post.
#[derive(Deserialize, Clone, Debug)]
pub struct Post {
    pub id: u64,
    pub slug: String,

    #[serde(default)]
    pub title: Rendered,

    #[serde(default)]
    pub excerpt: Rendered,

    #[serde(default)]
    pub content: Rendered,

    /// The publication date in the site's timezone.
    pub date: NaiveDateTime,

    #[serde(default)]
    pub modified: Option<NaiveDateTime>,

    #[serde(default)]
    pub modified_gmt: Option<NaiveDateTime>,

    /// The featured media ID. The API uses `0` for "none".
    #[serde(default)]
    pub featured_media: u64,

    /// The author ID. The API uses `0` for "none".
    #[serde(default)]
    pub author: u64,

    #[serde(default)]
    pub categories: Vec<u64>,

    #[serde(default)]
    pub tags: Vec<u64>,
}

impl Post {
    pub fn featured_media_id(&self) -> Option<u64> {
        non_zero(self.featured_media)
    }

    pub fn author_id(&self) -> Option<u64> {
        non_zero(self.author)
    }

    /// The last-modified time in UTC, if the API reported one.
    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        last_modified(self.modified_gmt, self.modified)
    }
}

/// A static page (as opposed to a [`Post`]).
#[derive(Deserialize, Clone, Debug)]
pub struct Page {
    pub id: u64,
    pub slug: String,

    #[serde(default)]
    pub title: Rendered,

    #[serde(default)]
    pub content: Rendered,

    #[serde(default)]
    pub modified: Option<NaiveDateTime>,

    #[serde(default)]
    pub modified_gmt: Option<NaiveDateTime>,
}

impl Page {
    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        last_modified(self.modified_gmt, self.modified)
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct Author {
    pub id: u64,
    pub slug: String,
    pub name: String,
}

/// A category or a tag. Both taxonomies share the same shape.
#[derive(Deserialize, Clone, Debug)]
pub struct Term {
    pub id: u64,
    pub slug: String,
    pub name: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct Media {
    pub id: u64,

    #[serde(default)]
    pub source_url: String,

    #[serde(default)]
    pub alt_text: String,
}

/// Which taxonomy a [`Term`] belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Taxonomy {
    Categories,
    Tags,
}

impl Taxonomy {
    /// The API collection name, e.g. `categories`.
    pub fn collection(self) -> &'static str {
        match self {
            Taxonomy::Categories => "categories",
            Taxonomy::Tags => "tags",
        }
    }
}

/// Records that can be looked up by slug and shown by name in the filter
/// UI.
pub trait Record {
    fn id(&self) -> u64;
    fn slug(&self) -> &str;
    fn name(&self) -> &str;
}

impl Record for Author {
    fn id(&self) -> u64 {
        self.id
    }

    fn slug(&self) -> &str {
        &self.slug
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Record for Term {
    fn id(&self) -> u64 {
        self.id
    }

    fn slug(&self) -> &str {
        &self.slug
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// One page of a list endpoint along with the totals the API reports
/// out-of-band (`X-WP-Total` and `X-WP-TotalPages`).
#[derive(Clone, Debug)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub total_pages: u64,
}

impl<T> Paginated<T> {
    pub fn empty() -> Paginated<T> {
        Paginated {
            items: Vec::new(),
            total: 0,
            total_pages: 0,
        }
    }
}

fn non_zero(id: u64) -> Option<u64> {
    match id {
        0 => None,
        id => Some(id),
    }
}

fn last_modified(
    gmt: Option<NaiveDateTime>,
    local: Option<NaiveDateTime>,
) -> Option<DateTime<Utc>> {
    gmt.or(local)
        .map(|naive| Utc.from_utc_datetime(&naive))
}
