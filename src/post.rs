//! Single post and page views. Like cards, a post view degrades when its
//! auxiliary records (image, author, terms) can't be fetched.

use crate::card::{author, display_date, featured_media, or_absent};
use crate::client::ContentSource;
use crate::config::Config;
use crate::model::{Page, Post, Taxonomy, Term};
use crate::share::{encode_component, Share, ShareLinks};
use futures::future::join_all;

/// A link to a category or tag archive.
#[derive(Clone, Debug, PartialEq)]
pub struct TermLink {
    pub name: String,
    pub href: String,
}

impl TermLink {
    fn new(base: &str, term: Term) -> TermLink {
        TermLink {
            href: format!("{}/{}", base, encode_component(&term.slug)),
            name: term.name,
        }
    }
}

/// A full post.
#[derive(Clone, Debug)]
pub struct PostView {
    pub title_html: String,
    pub content_html: String,
    pub date: String,
    pub author: Option<TermLink>,
    pub categories: Vec<TermLink>,
    pub tags: Vec<TermLink>,
    pub image: Option<String>,
    pub image_alt: String,
    pub share: ShareLinks,
}

impl PostView {
    /// Builds the view of `post`, served at `path`.
    pub async fn build(
        source: &dyn ContentSource,
        config: &Config,
        post: &Post,
        path: &str,
    ) -> PostView {
        let (media, author, categories, tags) = tokio::join!(
            or_absent("featured media", featured_media(source, post)),
            or_absent("author", author(source, post)),
            terms(source, Taxonomy::Categories, &post.categories),
            terms(source, Taxonomy::Tags, &post.tags),
        );

        let image = media
            .as_ref()
            .map(|m| m.source_url.clone())
            .filter(|src| !src.is_empty() && config.allows_image(src));
        let image_alt = media
            .map(|m| m.alt_text)
            .filter(|alt| !alt.is_empty())
            .unwrap_or_else(|| post.title.rendered.clone());

        let url = config.site.url(path);
        let share = Share {
            url: &url,
            title: post.title.non_empty(),
            description: post.excerpt.non_empty(),
            image_url: image.as_deref(),
            custom_message: None,
        }
        .links();

        PostView {
            title_html: post
                .title
                .non_empty()
                .unwrap_or("Untitled Post")
                .to_owned(),
            content_html: post.content.rendered.clone(),
            date: display_date(post),
            author: author.map(|a| TermLink {
                href: format!("/posts/author/{}", encode_component(&a.slug)),
                name: a.name,
            }),
            categories: categories
                .into_iter()
                .map(|t| TermLink::new("/posts/category", t))
                .collect(),
            tags: tags
                .into_iter()
                .map(|t| TermLink::new("/posts/tag", t))
                .collect(),
            image,
            image_alt,
            share,
        }
    }
}

/// Fetches every term in `ids`, skipping the ones that fail.
async fn terms(source: &dyn ContentSource, taxonomy: Taxonomy, ids: &[u64]) -> Vec<Term> {
    join_all(ids.iter().map(|id| {
        or_absent(taxonomy.collection(), async move {
            source.term_by_id(taxonomy, *id).await.map(Some)
        })
    }))
    .await
    .into_iter()
    .flatten()
    .collect()
}

/// A static page.
#[derive(Clone, Debug, PartialEq)]
pub struct PageView {
    pub title_html: String,
    pub content_html: String,
}

impl From<&Page> for PageView {
    fn from(page: &Page) -> PageView {
        PageView {
            title_html: page.title.rendered.clone(),
            content_html: page.content.rendered.clone(),
        }
    }
}
