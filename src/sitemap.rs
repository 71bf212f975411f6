//! Sitemap generation. Each `*_sitemap` function maps one kind of record to
//! [`Entry`]s; [`to_xml`] serializes them. The root sitemap lists the static
//! routes, every post, and the four per-kind sub-sitemaps.

use crate::escape::EscapeHtml;
use crate::model::{Page, Post, Term};
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt::{self, Write};

pub const POSTS_SITEMAP: &str = "/sitemap-posts.xml";
pub const PAGES_SITEMAP: &str = "/sitemap-pages.xml";
pub const TAGS_SITEMAP: &str = "/sitemap-tags.xml";
pub const CATEGORIES_SITEMAP: &str = "/sitemap-categories.xml";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeFrequency {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl fmt::Display for ChangeFrequency {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            ChangeFrequency::Always => "always",
            ChangeFrequency::Hourly => "hourly",
            ChangeFrequency::Daily => "daily",
            ChangeFrequency::Weekly => "weekly",
            ChangeFrequency::Monthly => "monthly",
            ChangeFrequency::Yearly => "yearly",
            ChangeFrequency::Never => "never",
        })
    }
}

/// One `<url>` in a sitemap.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    pub url: String,
    pub last_modified: DateTime<Utc>,
    pub change_frequency: ChangeFrequency,
    pub priority: f32,
}

impl Entry {
    fn new(
        url: String,
        last_modified: DateTime<Utc>,
        change_frequency: ChangeFrequency,
        priority: f32,
    ) -> Entry {
        Entry {
            url,
            last_modified,
            change_frequency,
            priority,
        }
    }
}

/// How much of each entry [`to_xml`] writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Detail {
    /// `loc`, `lastmod`, `changefreq` and `priority`.
    Full,

    /// Only `loc` and `lastmod`.
    Minimal,
}

pub fn posts_sitemap(domain: &str, posts: &[Post], now: DateTime<Utc>) -> Vec<Entry> {
    posts
        .iter()
        .map(|post| {
            Entry::new(
                format!("{}/posts/{}", domain, post.slug),
                post.last_modified().unwrap_or(now),
                ChangeFrequency::Weekly,
                0.7,
            )
        })
        .collect()
}

pub fn pages_sitemap(domain: &str, pages: &[Page], now: DateTime<Utc>) -> Vec<Entry> {
    pages
        .iter()
        .map(|page| {
            Entry::new(
                format!("{}/pages/{}", domain, page.slug),
                page.last_modified().unwrap_or(now),
                ChangeFrequency::Monthly,
                0.5,
            )
        })
        .collect()
}

pub fn tags_sitemap(domain: &str, tags: &[Term], now: DateTime<Utc>) -> Vec<Entry> {
    tags.iter()
        .map(|tag| {
            Entry::new(
                format!("{}/posts/tag/{}", domain, tag.slug),
                now,
                ChangeFrequency::Monthly,
                0.4,
            )
        })
        .collect()
}

pub fn categories_sitemap(
    domain: &str,
    categories: &[Term],
    now: DateTime<Utc>,
) -> Vec<Entry> {
    categories
        .iter()
        .map(|category| {
            Entry::new(
                format!("{}/posts/category/{}", domain, category.slug),
                now,
                ChangeFrequency::Monthly,
                0.6,
            )
        })
        .collect()
}

/// The root sitemap: static routes, then every post, then the sub-sitemaps.
pub fn root_sitemap(domain: &str, posts: &[Post], now: DateTime<Utc>) -> Vec<Entry> {
    use ChangeFrequency::*;

    let mut entries = vec![
        Entry::new(domain.to_owned(), now, Yearly, 1.0),
        Entry::new(format!("{}/posts", domain), now, Weekly, 0.8),
    ];
    for section in &["pages", "authors", "categories", "tags"] {
        entries.push(Entry::new(
            format!("{}/{}", domain, section),
            now,
            Monthly,
            0.5,
        ));
    }

    entries.extend(posts.iter().map(|post| {
        Entry::new(
            format!("{}/posts/{}", domain, post.slug),
            post.last_modified().unwrap_or(now),
            Weekly,
            0.5,
        )
    }));

    for (path, change_frequency) in &[
        (PAGES_SITEMAP, Monthly),
        (CATEGORIES_SITEMAP, Monthly),
        (POSTS_SITEMAP, Weekly),
        (TAGS_SITEMAP, Monthly),
    ] {
        entries.push(Entry::new(
            format!("{}{}", domain, path),
            now,
            *change_frequency,
            0.3,
        ));
    }
    entries
}

/// Serializes `entries` as a sitemap `<urlset>` document.
pub fn to_xml(entries: &[Entry], detail: Detail) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_urlset(&mut out, entries, detail)?;
    Ok(out)
}

fn write_urlset(out: &mut String, entries: &[Entry], detail: Detail) -> fmt::Result {
    writeln!(out, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
    writeln!(
        out,
        "<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">"
    )?;
    for entry in entries {
        write_entry(out, entry, detail)?;
    }
    writeln!(out, "</urlset>")
}

fn write_entry(out: &mut String, entry: &Entry, detail: Detail) -> fmt::Result {
    writeln!(out, "  <url>")?;
    writeln!(out, "    <loc>{}</loc>", EscapeHtml(&entry.url))?;
    writeln!(
        out,
        "    <lastmod>{}</lastmod>",
        entry
            .last_modified
            .to_rfc3339_opts(SecondsFormat::Millis, true)
    )?;
    if detail == Detail::Full {
        writeln!(
            out,
            "    <changefreq>{}</changefreq>",
            entry.change_frequency
        )?;
        writeln!(out, "    <priority>{}</priority>", entry.priority)?;
    }
    writeln!(out, "  </url>")
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testing::{page, post, term};
    use chrono::TimeZone;

    const DOMAIN: &str = "https://example.org";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap()
    }

    /// Pulls the text of every `<tag>` element out of `xml`.
    fn elements<'a>(xml: &'a str, tag: &str) -> Vec<&'a str> {
        let open = format!("<{}>", tag);
        let close = format!("</{}>", tag);
        xml.split(open.as_str())
            .skip(1)
            .filter_map(|rest| rest.split(close.as_str()).next())
            .collect()
    }

    #[test]
    fn test_posts_sitemap() {
        let mut modified = post(1, "hello", "Hello", &[]);
        modified.modified_gmt = Some(
            chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        );
        let entries = posts_sitemap(DOMAIN, &[modified, post(2, "bye", "Bye", &[])], now());

        assert_eq!(
            vec![
                Entry::new(
                    String::from("https://example.org/posts/hello"),
                    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                    ChangeFrequency::Weekly,
                    0.7
                ),
                Entry::new(
                    String::from("https://example.org/posts/bye"),
                    now(),
                    ChangeFrequency::Weekly,
                    0.7
                ),
            ],
            entries
        );
    }

    #[test]
    fn test_taxonomy_sitemaps() {
        let terms = vec![term(1, "rust", "Rust")];
        let tags = tags_sitemap(DOMAIN, &terms, now());
        assert_eq!("https://example.org/posts/tag/rust", tags[0].url);
        assert_eq!(0.4, tags[0].priority);
        assert_eq!(ChangeFrequency::Monthly, tags[0].change_frequency);

        let categories = categories_sitemap(DOMAIN, &terms, now());
        assert_eq!("https://example.org/posts/category/rust", categories[0].url);
        assert_eq!(0.6, categories[0].priority);
    }

    #[test]
    fn test_root_sitemap() {
        let entries = root_sitemap(DOMAIN, &[post(1, "hello", "Hello", &[])], now());
        let urls: Vec<&str> = entries.iter().map(|e| e.url.as_str()).collect();
        assert_eq!(
            vec![
                "https://example.org",
                "https://example.org/posts",
                "https://example.org/pages",
                "https://example.org/authors",
                "https://example.org/categories",
                "https://example.org/tags",
                "https://example.org/posts/hello",
                "https://example.org/sitemap-pages.xml",
                "https://example.org/sitemap-categories.xml",
                "https://example.org/sitemap-posts.xml",
                "https://example.org/sitemap-tags.xml",
            ],
            urls
        );
        assert_eq!(1.0, entries[0].priority);
        assert_eq!(ChangeFrequency::Yearly, entries[0].change_frequency);
        assert_eq!(0.5, entries[6].priority);
        assert_eq!(ChangeFrequency::Weekly, entries[9].change_frequency);
        assert!(entries[7..].iter().all(|e| e.priority == 0.3));
    }

    #[test]
    fn test_minimal_xml_matches_structured_pages() {
        let pages = vec![page(1, "about", "About"), page(2, "terms&conditions", "T&C")];
        let entries = pages_sitemap(DOMAIN, &pages, now());
        let xml = to_xml(&entries, Detail::Minimal).unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset"));
        assert!(xml.trim_end().ends_with("</urlset>"));
        assert_eq!(xml.matches("<url>").count(), xml.matches("</url>").count());
        assert!(!xml.contains("<changefreq>"));
        assert!(!xml.contains("<priority>"));

        let locs: Vec<String> = elements(&xml, "loc")
            .into_iter()
            .map(|loc| loc.replace("&amp;", "&"))
            .collect();
        let urls: Vec<String> = entries.iter().map(|e| e.url.clone()).collect();
        assert_eq!(urls, locs);
        assert_eq!(
            vec!["2024-05-06T07:08:09.000Z"; 2],
            elements(&xml, "lastmod")
        );
    }

    #[test]
    fn test_full_xml() {
        let entries = root_sitemap(DOMAIN, &[], now());
        let xml = to_xml(&entries[..1], Detail::Full).unwrap();
        assert_eq!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n  \
             <url>\n    \
             <loc>https://example.org</loc>\n    \
             <lastmod>2024-05-06T07:08:09.000Z</lastmod>\n    \
             <changefreq>yearly</changefreq>\n    \
             <priority>1</priority>\n  \
             </url>\n\
             </urlset>\n",
            xml
        );
    }
}
