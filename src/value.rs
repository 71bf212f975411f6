//! Conversions from views into [`Value`]s for templating. Plain-text fields
//! are HTML-escaped here; fields ending in `_html` upstream are API-rendered
//! fragments and pass through untouched. Every key a template may reference
//! is always present, with [`Value::Nil`] standing in for absent values.

use crate::card::PostCard;
use crate::config::{NavLink, Site};
use crate::escape;
use crate::listing::{FilterOption, Filters, Listing};
use crate::pager::{Item, Pager};
use crate::post::{PageView, PostView, TermLink};
use crate::share::ShareLinks;
use gtmpl::Value;
use std::collections::HashMap;

/// Escaped plain text.
pub fn text(s: &str) -> Value {
    Value::String(escape::html(s))
}

/// A trusted HTML fragment.
fn html(s: &str) -> Value {
    Value::String(s.to_owned())
}

fn optional_text(s: Option<&str>) -> Value {
    match s {
        Some(s) => text(s),
        None => Value::Nil,
    }
}

fn array<'a, T: 'a>(items: impl IntoIterator<Item = &'a T>) -> Value
where
    Value: From<&'a T>,
{
    Value::Array(items.into_iter().map(Value::from).collect())
}

fn object(pairs: Vec<(&str, Value)>) -> Value {
    let m: HashMap<String, Value> = pairs
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v))
        .collect();
    Value::Object(m)
}

impl From<&NavLink> for Value {
    fn from(link: &NavLink) -> Value {
        object(vec![
            ("label", text(&link.label)),
            ("href", text(&link.href)),
        ])
    }
}

impl From<&Site> for Value {
    fn from(site: &Site) -> Value {
        object(vec![
            ("domain", text(&site.domain)),
            ("name", text(&site.name)),
            ("description", text(&site.description)),
            ("main_nav", array(&site.main_nav)),
            ("content_nav", array(&site.content_nav)),
        ])
    }
}

impl From<&PostCard> for Value {
    fn from(card: &PostCard) -> Value {
        object(vec![
            ("href", text(&card.href)),
            ("title", html(&card.title_html)),
            ("excerpt", html(&card.excerpt_html)),
            ("image", optional_text(card.image.as_deref())),
            ("image_alt", text(&card.image_alt)),
            ("author", optional_text(card.author.as_deref())),
            ("category", text(&card.category)),
            ("date", text(&card.date)),
        ])
    }
}

impl From<&Item> for Value {
    fn from(item: &Item) -> Value {
        match item {
            Item::Page {
                number,
                href,
                active,
            } => object(vec![
                ("ellipsis", Value::Bool(false)),
                ("number", Value::String(number.to_string())),
                ("href", text(href)),
                ("active", Value::Bool(*active)),
            ]),
            Item::Ellipsis => object(vec![
                ("ellipsis", Value::Bool(true)),
                ("number", Value::Nil),
                ("href", Value::Nil),
                ("active", Value::Bool(false)),
            ]),
        }
    }
}

impl From<&Pager> for Value {
    fn from(pager: &Pager) -> Value {
        object(vec![
            ("prev", optional_text(pager.prev.as_deref())),
            ("next", optional_text(pager.next.as_deref())),
            ("items", array(&pager.items)),
        ])
    }
}

impl From<&FilterOption> for Value {
    fn from(option: &FilterOption) -> Value {
        object(vec![
            ("slug", text(&option.slug)),
            ("name", text(&option.name)),
            ("selected", Value::Bool(option.selected)),
        ])
    }
}

impl From<&Filters> for Value {
    fn from(filters: &Filters) -> Value {
        object(vec![
            ("authors", array(&filters.authors)),
            ("categories", array(&filters.categories)),
            ("tags", array(&filters.tags)),
        ])
    }
}

impl From<&Listing> for Value {
    fn from(listing: &Listing) -> Value {
        object(vec![
            ("heading", text(&listing.heading)),
            ("message", text(&listing.message)),
            ("empty", Value::Bool(listing.empty)),
            ("path", text(&listing.path)),
            ("search", text(listing.search.as_deref().unwrap_or_default())),
            ("filters", Value::from(&listing.filters)),
            ("cards", array(&listing.cards)),
            (
                "pager",
                listing.pager.as_ref().map_or(Value::Nil, Value::from),
            ),
        ])
    }
}

impl From<&TermLink> for Value {
    fn from(link: &TermLink) -> Value {
        object(vec![("name", text(&link.name)), ("href", text(&link.href))])
    }
}

impl From<&ShareLinks> for Value {
    fn from(links: &ShareLinks) -> Value {
        object(vec![
            ("twitter", text(&links.twitter)),
            ("facebook", text(&links.facebook)),
            ("linkedin", text(&links.linkedin)),
            ("whatsapp", text(&links.whatsapp)),
        ])
    }
}

impl From<&PostView> for Value {
    fn from(view: &PostView) -> Value {
        object(vec![
            ("title", html(&view.title_html)),
            ("content", html(&view.content_html)),
            ("date", text(&view.date)),
            (
                "author",
                view.author.as_ref().map_or(Value::Nil, Value::from),
            ),
            ("categories", array(&view.categories)),
            ("tags", array(&view.tags)),
            ("image", optional_text(view.image.as_deref())),
            ("image_alt", text(&view.image_alt)),
            ("share", Value::from(&view.share)),
        ])
    }
}

impl From<&PageView> for Value {
    fn from(view: &PageView) -> Value {
        object(vec![
            ("title", html(&view.title_html)),
            ("content", html(&view.content_html)),
        ])
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn field<'a>(value: &'a Value, key: &str) -> &'a Value {
        match value {
            Value::Object(m) => &m[key],
            other => panic!("not an object: {:?}", other),
        }
    }

    fn string<'a>(value: &'a Value, key: &str) -> &'a str {
        match field(value, key) {
            Value::String(s) => s,
            other => panic!("{} is not a string: {:?}", key, other),
        }
    }

    #[test]
    fn test_text_is_escaped_and_html_is_not() {
        let card = PostCard {
            href: String::from("/posts/a"),
            title_html: String::from("<em>A</em>"),
            excerpt_html: String::from("<p>x</p>..."),
            image: None,
            image_alt: String::from("<em>A</em>"),
            author: Some(String::from("Tom & Jerry")),
            category: String::from("Uncategorized"),
            date: String::from("January 2, 2024"),
        };
        let value = Value::from(&card);

        assert_eq!("<em>A</em>", string(&value, "title"));
        assert_eq!("&lt;em&gt;A&lt;/em&gt;", string(&value, "image_alt"));
        assert_eq!("Tom &amp; Jerry", string(&value, "author"));
        assert!(matches!(field(&value, "image"), Value::Nil));
    }

    #[test]
    fn test_pager_items() {
        let items = vec![
            Item::Page {
                number: 1,
                href: String::from("/posts?a=1&b=2"),
                active: true,
            },
            Item::Ellipsis,
        ];
        let value = array(&items);
        let items = match &value {
            Value::Array(items) => items,
            other => panic!("not an array: {:?}", other),
        };
        assert_eq!("1", string(&items[0], "number"));
        assert_eq!("/posts?a=1&amp;b=2", string(&items[0], "href"));
        assert!(matches!(field(&items[1], "ellipsis"), Value::Bool(true)));
        assert!(matches!(field(&items[1], "href"), Value::Nil));
    }
}
