//! Post summary cards. A card needs three records besides the post itself
//! (featured image, author, category); each is fetched independently and a
//! failed fetch only blanks out its part of the card.

use crate::client::{self, ContentSource};
use crate::config::Config;
use crate::model::{Author, Media, Post, Taxonomy, Term};
use std::future::Future;
use tracing::{debug, warn};

/// The number of words of the excerpt shown on a card.
const EXCERPT_WORDS: usize = 12;

/// A clickable summary tile for one post. HTML fields are API-rendered
/// fragments; the rest is plain text.
#[derive(Clone, Debug, PartialEq)]
pub struct PostCard {
    pub href: String,
    pub title_html: String,
    pub excerpt_html: String,

    /// The featured image, if there is one and it's on an allowed host.
    pub image: Option<String>,
    pub image_alt: String,
    pub author: Option<String>,
    pub category: String,
    pub date: String,
}

impl PostCard {
    /// Builds the card for `post`. When `selected_category` (a slug) is given
    /// and the post is in that category, the card shows it instead of the
    /// post's first category.
    pub async fn build(
        source: &dyn ContentSource,
        config: &Config,
        post: &Post,
        selected_category: Option<&str>,
    ) -> PostCard {
        let (media, author, category) = tokio::join!(
            or_absent("featured media", featured_media(source, post)),
            or_absent("author", author(source, post)),
            or_absent("category", category(source, post, selected_category)),
        );

        PostCard {
            href: format!("/posts/{}", post.slug),
            title_html: post
                .title
                .non_empty()
                .unwrap_or("Untitled Post")
                .to_owned(),
            excerpt_html: excerpt(post),
            image: media
                .map(|m| m.source_url)
                .filter(|src| !src.is_empty() && config.allows_image(src)),
            image_alt: post
                .title
                .non_empty()
                .unwrap_or("Post thumbnail")
                .to_owned(),
            author: author.map(|a| a.name),
            category: category
                .map(|c| c.name)
                .unwrap_or_else(|| String::from("Uncategorized")),
            date: display_date(post),
        }
    }
}

/// Formats a post's date as e.g. "January 2, 2024".
pub fn display_date(post: &Post) -> String {
    post.date.format("%B %-d, %Y").to_string()
}

/// Awaits an auxiliary fetch, mapping a failure to `None` and logging it.
pub async fn or_absent<T, F>(what: &str, fetch: F) -> Option<T>
where
    F: Future<Output = client::Result<Option<T>>>,
{
    match fetch.await {
        Ok(found) => found,
        Err(err) => {
            warn!(error = %err, "Failed to fetch {}", what);
            None
        }
    }
}

pub(crate) async fn featured_media(
    source: &dyn ContentSource,
    post: &Post,
) -> client::Result<Option<Media>> {
    match post.featured_media_id() {
        Some(id) => source.media_by_id(id).await.map(Some),
        None => Ok(None),
    }
}

pub(crate) async fn author(
    source: &dyn ContentSource,
    post: &Post,
) -> client::Result<Option<Author>> {
    match post.author_id() {
        Some(id) => source.author_by_id(id).await.map(Some),
        None => Ok(None),
    }
}

/// Picks the category to show: the selected one if the post is in it,
/// otherwise the post's first category.
async fn category(
    source: &dyn ContentSource,
    post: &Post,
    selected: Option<&str>,
) -> client::Result<Option<Term>> {
    if let Some(slug) = selected {
        match source.term_by_slug(Taxonomy::Categories, slug).await {
            Ok(Some(term)) if post.categories.contains(&term.id) => {
                return Ok(Some(term));
            }
            Ok(_) => {}
            Err(err) => debug!(error = %err, slug, "ignoring selected category"),
        }
    }

    match post.categories.first() {
        Some(id) => source
            .term_by_id(Taxonomy::Categories, *id)
            .await
            .map(Some),
        None => Ok(None),
    }
}

/// The first few words of the excerpt followed by an ellipsis.
fn excerpt(post: &Post) -> String {
    match post.excerpt.non_empty() {
        None => String::from("No excerpt available"),
        Some(html) => {
            let words: Vec<&str> = html.split(' ').take(EXCERPT_WORDS).collect();
            format!("{}...", words.join(" ").trim())
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::Rendered;
    use crate::testing::{author as fake_author, config, media, post, term, FakeSource};

    fn source() -> FakeSource {
        let mut source = FakeSource::new();
        source.categories = vec![term(1, "bollywood", "Bollywood"), term(2, "sports", "Sports")];
        source.authors = vec![fake_author(5, "jane", "Jane Doe")];
        source.media = vec![
            media(9, "https://cms.example.org/uploads/cover.jpg"),
            media(10, "https://elsewhere.example.com/cover.jpg"),
        ];
        source
    }

    fn full_post() -> Post {
        let mut p = post(1, "match-day", "Match <em>Day</em>", &[1, 2]);
        p.author = 5;
        p.featured_media = 9;
        p
    }

    #[tokio::test]
    async fn test_build() {
        let card = PostCard::build(&source(), &config(), &full_post(), None).await;
        assert_eq!(
            PostCard {
                href: String::from("/posts/match-day"),
                title_html: String::from("Match <em>Day</em>"),
                excerpt_html: String::from("<p>Excerpt for Match <em>Day</em></p>..."),
                image: Some(String::from("https://cms.example.org/uploads/cover.jpg")),
                image_alt: String::from("Match <em>Day</em>"),
                author: Some(String::from("Jane Doe")),
                category: String::from("Bollywood"),
                date: String::from("January 2, 2024"),
            },
            card
        );
    }

    #[tokio::test]
    async fn test_selected_category_wins_when_post_is_in_it() {
        let card = PostCard::build(&source(), &config(), &full_post(), Some("sports")).await;
        assert_eq!("Sports", card.category);
    }

    #[tokio::test]
    async fn test_selected_category_ignored_when_post_is_not_in_it() {
        let mut p = full_post();
        p.categories = vec![1];
        let card = PostCard::build(&source(), &config(), &p, Some("sports")).await;
        assert_eq!("Bollywood", card.category);
    }

    #[tokio::test]
    async fn test_unknown_selected_category_falls_back() {
        let card = PostCard::build(&source(), &config(), &full_post(), Some("nope")).await;
        assert_eq!("Bollywood", card.category);
    }

    #[tokio::test]
    async fn test_failures_degrade() {
        let source = source()
            .failing("media_by_id")
            .failing("author_by_id")
            .failing("term_by_id")
            .failing("term_by_slug");
        let card = PostCard::build(&source, &config(), &full_post(), Some("sports")).await;
        assert_eq!(None, card.image);
        assert_eq!(None, card.author);
        assert_eq!("Uncategorized", card.category);
        assert_eq!("Match <em>Day</em>", card.title_html);
    }

    #[tokio::test]
    async fn test_missing_records() {
        let mut p = post(2, "bare", "", &[]);
        p.excerpt = Rendered::default();
        let source = source();
        let card = PostCard::build(&source, &config(), &p, None).await;
        assert_eq!("Untitled Post", card.title_html);
        assert_eq!("Post thumbnail", card.image_alt);
        assert_eq!("No excerpt available", card.excerpt_html);
        assert_eq!("Uncategorized", card.category);
        assert_eq!(None, card.image);
        // nothing to fetch
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn test_image_on_foreign_host_is_dropped() {
        let mut p = full_post();
        p.featured_media = 10;
        let card = PostCard::build(&source(), &config(), &p, None).await;
        assert_eq!(None, card.image);
    }

    #[test]
    fn test_excerpt_is_truncated() {
        let mut p = post(3, "long", "Long", &[]);
        p.excerpt = Rendered::new(
            "<p>one two three four five six seven eight nine ten eleven twelve thirteen</p>",
        );
        assert_eq!(
            "<p>one two three four five six seven eight nine ten eleven twelve...",
            excerpt(&p)
        );
    }
}
